use chrono::{DateTime, Utc};

use crate::mail::{Email, MailView};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncStatus {
    #[default]
    Idle,
    Loading,
    Error,
}

/// Both mailbox collections plus the sync status shown to the user
#[derive(Debug, Clone, Default)]
pub struct MailboxState {
    pub inbox: Vec<Email>,
    pub sent: Vec<Email>,
    pub active_view: MailView,
    pub status: SyncStatus,
    pub last_error: Option<String>,
    pub inbox_synced_at: Option<DateTime<Utc>>,
    pub sent_synced_at: Option<DateTime<Utc>>,
}

impl MailboxState {
    pub fn emails(&self, view: MailView) -> &[Email] {
        match view {
            MailView::Inbox => &self.inbox,
            MailView::Sent => &self.sent,
        }
    }

    /// Emails of the active view
    pub fn current(&self) -> &[Email] {
        self.emails(self.active_view)
    }

    pub fn synced_at(&self, view: MailView) -> Option<DateTime<Utc>> {
        match view {
            MailView::Inbox => self.inbox_synced_at,
            MailView::Sent => self.sent_synced_at,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == SyncStatus::Loading
    }

    /// Replace a whole collection with a fresh listing
    pub(super) fn replace(&mut self, view: MailView, emails: Vec<Email>) {
        let now = Some(Utc::now());
        match view {
            MailView::Inbox => {
                self.inbox = emails;
                self.inbox_synced_at = now;
            }
            MailView::Sent => {
                self.sent = emails;
                self.sent_synced_at = now;
            }
        }
    }
}
