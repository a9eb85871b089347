//! View switching

use crate::mail::MailView;

use super::super::App;

impl App {
    pub(crate) fn switch_view(&mut self, view: MailView) {
        if self.state.view == view {
            return;
        }

        self.dashboard.select_view(view);
        self.state.selected = 0;
        self.state.collapsed.clear();
        self.state.set_status(format!("Viewing {}", view.title()));
    }
}
