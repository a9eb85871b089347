//! Reply popup actions and draft text input

use crate::reply::ReplyError;

use super::super::App;

impl App {
    pub(crate) fn open_reply_for_selected(&mut self) {
        let Some(email) = self.state.selected_email().cloned() else {
            return;
        };

        if !self.state.is_eligible(&email) {
            self.state
                .set_status("Reply is not available for this email");
            return;
        }

        match self.dashboard.open_reply(&email) {
            Ok(()) => self.state.set_status("Generating draft..."),
            Err(e) => self.report_reply_error(e),
        }
    }

    pub(crate) fn send_reply(&mut self) {
        match self.dashboard.send() {
            Ok(()) => self.state.set_status("Sending reply..."),
            Err(e) => self.report_reply_error(e),
        }
    }

    pub(crate) fn regenerate_draft(&mut self) {
        match self.dashboard.regenerate() {
            Ok(()) => self.state.set_status("Generating draft..."),
            Err(e) => self.report_reply_error(e),
        }
    }

    pub(crate) fn cancel_reply(&mut self) {
        match self.dashboard.cancel_reply() {
            Ok(()) => self.state.set_status("Reply discarded"),
            Err(ReplyError::Busy) => self.state.set_status("Wait for the send to finish"),
            Err(e) => self.report_reply_error(e),
        }
    }

    pub(crate) fn handle_char(&mut self, c: char) {
        let Some(reply) = &self.state.reply else {
            return;
        };
        let mut draft = reply.draft.clone();
        draft.push(c);
        self.update_draft(draft);
    }

    pub(crate) fn handle_backspace(&mut self) {
        let Some(reply) = &self.state.reply else {
            return;
        };
        let mut draft = reply.draft.clone();
        draft.pop();
        self.update_draft(draft);
    }

    fn update_draft(&mut self, draft: String) {
        // Keystrokes while a call is pending are dropped
        if let Err(e) = self.dashboard.edit_draft(draft) {
            tracing::debug!("Draft edit ignored: {}", e);
        }
    }

    fn report_reply_error(&mut self, error: ReplyError) {
        match error {
            ReplyError::Validation(message) => self.state.set_error(message),
            ReplyError::Busy => self.state.set_status("Still working on the previous request"),
            other => self.state.set_error(other),
        }
    }
}
