//! Action handlers for user input
//!
//! - `navigation`: selection movement and view switching
//! - `reply`: the reply popup (open, edit, send, cancel)

mod navigation;
mod reply;

use crate::input::Action;
use crate::mail::MailView;

use super::App;
use super::state::Row;

impl App {
    pub(crate) fn handle_action(&mut self, action: Action) {
        match action {
            // Navigation
            Action::Up => self.state.move_up(),
            Action::Down => self.state.move_down(),
            Action::Top => self.state.move_to_top(),
            Action::Bottom => self.state.move_to_bottom(),
            Action::ToggleGroup => self.state.toggle_selected_group(),

            // Views
            Action::NextView => self.switch_view(self.state.view.other()),
            Action::ShowInbox => self.switch_view(MailView::Inbox),
            Action::ShowSent => self.switch_view(MailView::Sent),

            Action::Refresh => {
                self.dashboard.refresh();
                self.state.set_status("Refreshing...");
            }
            Action::Quit => {} // Handled in event loop

            // Reply popup
            // Enter on a group header folds it instead
            Action::Reply if matches!(self.state.selected_row(), Some(Row::Header(_))) => {
                self.state.toggle_selected_group()
            }
            Action::Reply => self.open_reply_for_selected(),
            Action::Send => self.send_reply(),
            Action::Regenerate => self.regenerate_draft(),
            Action::Cancel => self.cancel_reply(),
        }
    }
}
