//! Application state types
//!
//! `AppState` is a render snapshot: the event loop rebuilds it from the
//! dashboard core and hands clones to the render thread. The UI layer imports
//! from here, never from the core directly.

use std::collections::HashSet;
use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::constants::ERROR_TTL_SECS;
use crate::mail::{Email, LabelGroup, MailStats, MailView};
use crate::reply::{ReplyPhase, ReplySession};

/// Loading, error, and status message state
#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub loading: bool,
    pub error: Option<String>,
    pub error_time: Option<Instant>,
    pub message: String,
    /// Persists after the error bar expires, shown as an indicator in the status bar
    pub has_unacknowledged_error: bool,
}

impl StatusState {
    pub fn set_error(&mut self, error: impl ToString) {
        self.error = Some(error.to_string());
        self.error_time = Some(Instant::now());
        self.has_unacknowledged_error = true;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
        self.error_time = None;
    }

    /// Clear the persistent error indicator on user input
    pub fn acknowledge_error(&mut self) {
        self.has_unacknowledged_error = false;
    }

    /// Clear error if TTL expired. Returns true if error was cleared.
    pub fn clear_error_if_expired(&mut self) -> bool {
        if let Some(time) = self.error_time
            && time.elapsed().as_secs() >= ERROR_TTL_SECS
        {
            self.clear_error();
            true
        } else {
            false
        }
    }

    pub fn set_message(&mut self, msg: impl ToString) {
        self.message = msg.to_string();
    }
}

/// The reply popup as the UI sees it
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyView {
    pub message_id: String,
    pub subject: String,
    pub recipient: String,
    pub phase: ReplyPhase,
    pub draft: String,
    pub editable: bool,
    pub error: Option<String>,
}

impl From<&ReplySession> for ReplyView {
    fn from(session: &ReplySession) -> Self {
        Self {
            message_id: session.message_id.clone(),
            subject: session.email.display_subject().to_string(),
            recipient: session.email.display_from().to_string(),
            phase: session.phase,
            draft: session.draft_text.clone(),
            editable: session.is_editable(),
            error: session.error.clone(),
        }
    }
}

/// One line of the mailbox list: a group header or an email inside an expanded group
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Row<'a> {
    Header(&'a LabelGroup),
    Email(&'a Email),
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub view: MailView,
    pub inbox_count: usize,
    pub sent_count: usize,
    /// Label groups of the active view
    pub groups: Vec<LabelGroup>,
    /// Shown for the inbox only
    pub stats: Option<MailStats>,
    /// Message ids the reply action is offered for
    pub eligible: HashSet<String>,
    /// Labels whose emails are hidden
    pub collapsed: HashSet<String>,
    /// Index into [`AppState::rows`]
    pub selected: usize,
    pub reply: Option<ReplyView>,
    pub status: StatusState,
    pub last_sync: Option<DateTime<Utc>>,
    pub preview_length: usize,
    /// Backend base URL, shown in the status bar
    pub backend_url: String,
}

impl AppState {
    /// Number of email rows across all groups
    pub fn email_count(&self) -> usize {
        self.groups.iter().map(LabelGroup::len).sum()
    }

    /// Headers and visible emails in display order
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.groups.iter().flat_map(move |group| {
            let visible: &[Email] = if self.is_collapsed(&group.label) {
                &[]
            } else {
                &group.emails
            };
            std::iter::once(Row::Header(group)).chain(visible.iter().map(Row::Email))
        })
    }

    pub fn row_count(&self) -> usize {
        self.rows().count()
    }

    pub fn selected_row(&self) -> Option<Row<'_>> {
        self.rows().nth(self.selected)
    }

    pub fn selected_email(&self) -> Option<&Email> {
        match self.selected_row()? {
            Row::Email(email) => Some(email),
            Row::Header(_) => None,
        }
    }

    pub fn is_collapsed(&self, label: &str) -> bool {
        self.collapsed.contains(label)
    }

    /// Collapse or expand the group under the selection. The selection
    /// moves to the group header so it stays visible.
    pub fn toggle_selected_group(&mut self) {
        let label = match self.selected_row() {
            Some(Row::Header(group)) => group.label.clone(),
            Some(Row::Email(email)) => email.label().to_string(),
            None => return,
        };

        if !self.collapsed.remove(&label) {
            self.collapsed.insert(label.clone());
        }
        let header = self
            .rows()
            .position(|row| matches!(row, Row::Header(g) if g.label == label));
        if let Some(header) = header {
            self.selected = header;
        }
    }

    pub fn is_eligible(&self, email: &Email) -> bool {
        self.eligible.contains(&email.message_id)
    }

    pub fn move_down(&mut self) {
        let count = self.row_count();
        if count > 0 && self.selected < count - 1 {
            self.selected += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_to_top(&mut self) {
        self.selected = 0;
    }

    pub fn move_to_bottom(&mut self) {
        self.selected = self.row_count().saturating_sub(1);
    }

    /// Keep the selection inside the current rows after a listing changed them
    pub fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.row_count().saturating_sub(1));
    }

    pub fn set_error(&mut self, error: impl ToString) {
        self.status.set_error(error);
    }

    pub fn clear_error_if_expired(&mut self) -> bool {
        self.status.clear_error_if_expired()
    }

    pub fn acknowledge_error(&mut self) {
        self.status.acknowledge_error();
    }

    pub fn set_status(&mut self, msg: impl ToString) {
        self.status.set_message(msg);
    }
}
