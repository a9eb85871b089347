//! Dashboard core: the sync engine and the reply workflow behind one intent API
//!
//! Renderers call the intent methods and read state back through the
//! accessors; they own no business logic. Results from background work are
//! applied through [`Dashboard::next_update`] or [`Dashboard::pump`].

use std::sync::Arc;

use crate::backend::MailBackend;
use crate::config::Config;
use crate::mail::{Email, LabelGroup, MailStats, MailView, compute_stats, group_by_label};
use crate::reply::{ReplyError, ReplyOutcome, ReplyPhase, ReplySession, ReplyWorkflow};
use crate::sync::{MailboxState, SyncEngine, SyncOutcome};

/// A change applied by background work
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardUpdate {
    Sync(SyncOutcome),
    Reply(ReplyOutcome),
}

pub struct Dashboard<B: MailBackend> {
    sync: SyncEngine<B>,
    replies: ReplyWorkflow,
    /// Message id of the reply shown to the user
    open_reply: Option<String>,
}

impl<B: MailBackend> Dashboard<B> {
    pub fn new(backend: Arc<B>, config: &Config) -> Self {
        Self {
            sync: SyncEngine::new(Arc::clone(&backend), config.sync.clone()),
            replies: ReplyWorkflow::new(backend, &config.reply),
            open_reply: None,
        }
    }

    /// Start syncing the initial view.
    pub fn start(&mut self) {
        self.sync.start();
    }

    pub fn shutdown(&mut self) {
        self.sync.shutdown();
        self.replies.shutdown();
        self.open_reply = None;
    }

    // ---- intents ----

    /// Debounced refresh of the active view
    pub fn refresh(&mut self) {
        self.sync.refresh();
    }

    pub fn select_view(&mut self, view: MailView) {
        self.sync.set_active_view(view);
    }

    /// Open the reply popup for `email` and start generating a draft when the
    /// session is new.
    pub fn open_reply(&mut self, email: &Email) -> Result<(), ReplyError> {
        let phase = self.replies.open(email)?.phase;
        self.open_reply = Some(email.message_id.clone());
        if phase == ReplyPhase::Idle {
            self.replies.generate_draft(&email.message_id)?;
        }
        Ok(())
    }

    /// Retry draft generation for the open reply
    pub fn regenerate(&mut self) -> Result<(), ReplyError> {
        let id = self.open_reply_id()?;
        self.replies.generate_draft(&id)
    }

    pub fn edit_draft(&mut self, text: impl Into<String>) -> Result<(), ReplyError> {
        let id = self.open_reply_id()?;
        self.replies.edit_draft(&id, text)
    }

    pub fn send(&mut self) -> Result<(), ReplyError> {
        let id = self.open_reply_id()?;
        self.replies.send_reply(&id)
    }

    /// Discard the open reply and close the popup
    pub fn cancel_reply(&mut self) -> Result<(), ReplyError> {
        let id = self.open_reply_id()?;
        self.replies.cancel(&id)?;
        self.open_reply = None;
        Ok(())
    }

    // ---- readers ----

    pub fn mailbox(&self) -> &MailboxState {
        self.sync.state()
    }

    /// The reply shown to the user, if any
    pub fn reply(&self) -> Option<&ReplySession> {
        self.replies.session(self.open_reply.as_deref()?)
    }

    /// Label groups of the active view
    pub fn groups(&self) -> Vec<LabelGroup> {
        group_by_label(self.mailbox().current())
    }

    /// Statistics over the inbox
    pub fn stats(&self) -> MailStats {
        compute_stats(&self.mailbox().inbox)
    }

    pub fn is_eligible(&self, email: &Email) -> bool {
        self.replies.policy().is_eligible(email)
    }

    // ---- event pumping ----

    /// Wait for the next background result that changes state.
    pub async fn next_update(&mut self) -> DashboardUpdate {
        loop {
            let update = tokio::select! {
                Some(event) = self.sync.next_event() => {
                    self.sync.handle(event).map(DashboardUpdate::Sync)
                }
                Some(event) = self.replies.next_event() => {
                    self.replies.handle(event).map(|o| self.on_reply_outcome(o))
                }
            };
            if let Some(update) = update {
                return update;
            }
        }
    }

    /// Apply every result that is already available without waiting.
    pub fn pump(&mut self) -> Vec<DashboardUpdate> {
        let mut updates = Vec::new();
        while let Some(event) = self.sync.try_next_event() {
            updates.extend(self.sync.handle(event).map(DashboardUpdate::Sync));
        }
        while let Some(event) = self.replies.try_next_event() {
            if let Some(outcome) = self.replies.handle(event) {
                updates.push(self.on_reply_outcome(outcome));
            }
        }
        updates
    }

    fn on_reply_outcome(&mut self, outcome: ReplyOutcome) -> DashboardUpdate {
        if let ReplyOutcome::Sent { session } = &outcome {
            if self.open_reply.as_deref() == Some(session.message_id.as_str()) {
                self.open_reply = None;
            }
            self.sync.on_reply_sent(&session.message_id);
        }
        DashboardUpdate::Reply(outcome)
    }

    fn open_reply_id(&self) -> Result<String, ReplyError> {
        self.open_reply.clone().ok_or(ReplyError::NoOpenReply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;
    use crate::mail::fixtures::{email, labeled, repliable};
    use crate::reply::ReplyStage;
    use std::time::Duration;

    fn dashboard(backend: &Arc<MockBackend>) -> Dashboard<MockBackend> {
        Dashboard::new(Arc::clone(backend), &Config::default())
    }

    async fn settle(dashboard: &mut Dashboard<MockBackend>) -> Vec<DashboardUpdate> {
        let mut updates = Vec::new();
        while let Ok(update) =
            tokio::time::timeout(Duration::from_millis(1), dashboard.next_update()).await
        {
            updates.push(update);
        }
        updates
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_syncs_inbox_and_derives_views() {
        let backend = Arc::new(MockBackend::new());
        backend.set_listing(
            MailView::Inbox,
            vec![
                labeled("1", Some("spam"), 0.5),
                labeled("2", Some("business"), 1.0),
                labeled("3", Some("spam"), 0.3),
            ],
        );
        let mut dashboard = dashboard(&backend);
        dashboard.start();
        settle(&mut dashboard).await;

        let groups = dashboard.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "spam");
        assert_eq!(groups[0].len(), 2);

        let stats = dashboard.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.spam_count, 2);
        assert_eq!(stats.business_count, 1);
        assert_eq!(stats.avg_confidence_percent, 60.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_round_trip_refreshes_once() {
        let backend = Arc::new(MockBackend::new());
        backend.set_listing(MailView::Inbox, vec![repliable("m1")]);
        let mut dashboard = dashboard(&backend);
        dashboard.start();
        settle(&mut dashboard).await;
        assert_eq!(backend.list_count(MailView::Inbox), 1);

        let target = dashboard.mailbox().inbox[0].clone();
        assert!(dashboard.is_eligible(&target));
        dashboard.open_reply(&target).unwrap();
        assert_eq!(dashboard.reply().unwrap().phase, ReplyPhase::Generating);
        settle(&mut dashboard).await;
        assert_eq!(dashboard.reply().unwrap().phase, ReplyPhase::Drafted);

        dashboard.edit_draft("Thursday works for me.").unwrap();
        dashboard.send().unwrap();
        let updates = settle(&mut dashboard).await;

        assert!(
            updates
                .iter()
                .any(|u| matches!(u, DashboardUpdate::Reply(ReplyOutcome::Sent { .. })))
        );
        assert!(dashboard.reply().is_none());
        assert_eq!(backend.send_count(), 1);
        assert_eq!(backend.list_count(MailView::Inbox), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_whitespace_send_makes_no_call() {
        let backend = Arc::new(MockBackend::new());
        backend.set_listing(MailView::Inbox, vec![repliable("m1")]);
        let mut dashboard = dashboard(&backend);
        dashboard.start();
        settle(&mut dashboard).await;

        let target = dashboard.mailbox().inbox[0].clone();
        dashboard.open_reply(&target).unwrap();
        settle(&mut dashboard).await;

        dashboard.edit_draft("   ").unwrap();
        assert!(matches!(dashboard.send(), Err(ReplyError::Validation(_))));
        settle(&mut dashboard).await;
        assert_eq!(backend.send_count(), 0);
        assert_eq!(dashboard.reply().unwrap().phase, ReplyPhase::Drafted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generation_failure_then_regenerate() {
        let backend = Arc::new(MockBackend::new());
        backend.push_draft(Err(crate::backend::BackendError::Transport(
            "connection reset".to_string(),
        )));
        let mut dashboard = dashboard(&backend);

        dashboard.open_reply(&repliable("m1")).unwrap();
        settle(&mut dashboard).await;
        assert_eq!(
            dashboard.reply().unwrap().phase,
            ReplyPhase::Failed(ReplyStage::Generation)
        );

        dashboard.regenerate().unwrap();
        settle(&mut dashboard).await;
        let reply = dashboard.reply().unwrap();
        assert_eq!(reply.phase, ReplyPhase::Drafted);
        assert!(reply.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_closes_reply() {
        let backend = Arc::new(MockBackend::new());
        let mut dashboard = dashboard(&backend);

        assert_eq!(dashboard.send(), Err(ReplyError::NoOpenReply));
        dashboard.open_reply(&repliable("m1")).unwrap();
        dashboard.cancel_reply().unwrap();
        assert!(dashboard.reply().is_none());

        // Late draft for the cancelled session changes nothing
        let updates = settle(&mut dashboard).await;
        assert!(updates.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ineligible_email_is_not_opened() {
        let backend = Arc::new(MockBackend::new());
        let mut dashboard = dashboard(&backend);

        let sent = email("s1");
        assert!(!dashboard.is_eligible(&sent));
        assert!(dashboard.open_reply(&sent).is_err());
        assert!(dashboard.reply().is_none());
        assert_eq!(backend.draft_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pump_applies_ready_results() {
        let backend = Arc::new(MockBackend::new());
        backend.set_listing(MailView::Sent, vec![email("s1"), email("s2")]);
        let mut dashboard = dashboard(&backend);

        dashboard.select_view(MailView::Sent);
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        let updates = dashboard.pump();
        assert_eq!(
            updates,
            vec![DashboardUpdate::Sync(SyncOutcome::Synced {
                view: MailView::Sent,
                new_emails: vec![],
            })]
        );
        assert_eq!(dashboard.groups()[0].len(), 2);
        assert!(dashboard.pump().is_empty());
    }
}
