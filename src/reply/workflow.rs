//! Per-message reply state machine
//!
//! Sessions are keyed by message id and carry an epoch. The reply actor tags
//! every result with the `(message_id, epoch)` it was issued for; a result is
//! applied only while that exact session still waits for it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};

use super::actor::{ReplyCommand, ReplyEvent, ReplyTicket, spawn_reply_actor};
use super::session::{ReplyError, ReplyPhase, ReplySession, ReplyStage};
use crate::actor::RetryConfig;
use crate::backend::{DraftRequest, MailBackend, SendRequest};
use crate::config::ReplyConfig;
use crate::mail::{Email, ReplyPolicy};

/// What handling a reply event changed
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyOutcome {
    Drafted { message_id: String },
    DraftFailed { message_id: String, error: String },
    /// The session ended; it is returned in its final `Sent` phase
    Sent { session: ReplySession },
    SendFailed { message_id: String, error: String },
}

pub struct ReplyWorkflow {
    sessions: HashMap<String, ReplySession>,
    next_epoch: u64,
    policy: ReplyPolicy,
    cmd_tx: mpsc::Sender<ReplyCommand>,
    event_rx: mpsc::Receiver<ReplyEvent>,
}

impl ReplyWorkflow {
    pub fn new<B: MailBackend>(backend: Arc<B>, config: &ReplyConfig) -> Self {
        let retry = RetryConfig::new(
            config.max_retries,
            Duration::from_secs(2),
            Duration::from_secs(30),
        );
        let handle = spawn_reply_actor(backend, retry);
        Self {
            sessions: HashMap::new(),
            next_epoch: 0,
            policy: ReplyPolicy::from_config(config),
            cmd_tx: handle.cmd_tx,
            event_rx: handle.event_rx,
        }
    }

    pub fn policy(&self) -> &ReplyPolicy {
        &self.policy
    }

    pub fn session(&self, message_id: &str) -> Option<&ReplySession> {
        self.sessions.get(message_id)
    }

    #[cfg(test)]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Start a reply for `email`, or return the session already open for it.
    pub fn open(&mut self, email: &Email) -> Result<&ReplySession, ReplyError> {
        if !self.policy.is_eligible(email) {
            // The UI only offers replies for eligible emails
            tracing::error!("Reply requested for ineligible email {}", email.message_id);
            return Err(ReplyError::NotEligible(email.message_id.clone()));
        }

        let epoch = &mut self.next_epoch;
        let session = self
            .sessions
            .entry(email.message_id.clone())
            .or_insert_with(|| {
                *epoch += 1;
                tracing::debug!("Opened reply session {} #{}", email.message_id, *epoch);
                ReplySession::new(email.clone(), *epoch)
            });
        Ok(session)
    }

    /// Request a draft from the backend.
    pub fn generate_draft(&mut self, message_id: &str) -> Result<(), ReplyError> {
        let session = self.session_for(message_id)?;
        match session.phase {
            ReplyPhase::Idle | ReplyPhase::Failed(ReplyStage::Generation) => {}
            phase if phase.is_busy() => return Err(ReplyError::Busy),
            phase => {
                return Err(ReplyError::InvalidPhase {
                    action: "generate a draft",
                    phase,
                });
            }
        }

        let command = ReplyCommand::Generate {
            ticket: ticket(session),
            request: DraftRequest::for_email(&session.email),
        };
        self.dispatch(command)?;

        let session = self.session_mut(message_id)?;
        session.phase = ReplyPhase::Generating;
        session.error = None;
        Ok(())
    }

    /// Replace the draft text verbatim. Empty text is allowed here and only
    /// rejected on send.
    pub fn edit_draft(&mut self, message_id: &str, text: impl Into<String>) -> Result<(), ReplyError> {
        let session = self.session_mut(message_id)?;
        if !session.is_editable() {
            return Err(ReplyError::InvalidPhase {
                action: "edit the draft",
                phase: session.phase,
            });
        }
        session.draft_text = text.into();
        Ok(())
    }

    pub fn send_reply(&mut self, message_id: &str) -> Result<(), ReplyError> {
        let session = self.session_for(message_id)?;
        if session.phase.is_busy() {
            return Err(ReplyError::Busy);
        }
        if session.draft_text.trim().is_empty() {
            return Err(ReplyError::Validation("Reply cannot be empty".to_string()));
        }
        if !session.is_editable() {
            return Err(ReplyError::InvalidPhase {
                action: "send",
                phase: session.phase,
            });
        }

        let command = ReplyCommand::Send {
            ticket: ticket(session),
            request: SendRequest {
                message_id: session.message_id.clone(),
                draft_text: session.draft_text.clone(),
                subject: session.email.subject.clone().unwrap_or_default(),
            },
        };
        self.dispatch(command)?;

        let session = self.session_mut(message_id)?;
        session.phase = ReplyPhase::Sending;
        session.error = None;
        Ok(())
    }

    /// Discard a session. Not allowed while a send is pending.
    pub fn cancel(&mut self, message_id: &str) -> Result<(), ReplyError> {
        let session = self.session_for(message_id)?;
        if session.phase == ReplyPhase::Sending {
            return Err(ReplyError::Busy);
        }
        self.sessions.remove(message_id);
        tracing::debug!("Cancelled reply session {}", message_id);
        Ok(())
    }

    /// Stop the reply actor; pending results are dropped.
    pub fn shutdown(&mut self) {
        // A full queue drops the command; the actor then exits when the
        // workflow and its `cmd_tx` are dropped. Late results find no session.
        if self.cmd_tx.try_send(ReplyCommand::Shutdown).is_err() {
            tracing::debug!("Reply actor queue full at shutdown");
        }
        self.sessions.clear();
    }

    pub async fn next_event(&mut self) -> Option<ReplyEvent> {
        self.event_rx.recv().await
    }

    pub fn try_next_event(&mut self) -> Option<ReplyEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Apply an actor result to the session it was issued for.
    pub fn handle(&mut self, event: ReplyEvent) -> Option<ReplyOutcome> {
        let ticket = event.ticket();
        let expected = match event {
            ReplyEvent::Drafted { .. } | ReplyEvent::DraftFailed { .. } => ReplyPhase::Generating,
            ReplyEvent::Sent { .. } | ReplyEvent::SendFailed { .. } => ReplyPhase::Sending,
        };
        let current = self
            .sessions
            .get(&ticket.message_id)
            .is_some_and(|s| s.epoch == ticket.epoch && s.phase == expected);
        if !current {
            tracing::debug!(
                "Discarding stale reply result for {} #{}",
                ticket.message_id,
                ticket.epoch
            );
            return None;
        }

        match event {
            ReplyEvent::Drafted { ticket, draft } => {
                let session = self.sessions.get_mut(&ticket.message_id)?;
                session.phase = ReplyPhase::Drafted;
                session.draft_text = draft;
                session.error = None;
                Some(ReplyOutcome::Drafted {
                    message_id: ticket.message_id,
                })
            }
            ReplyEvent::DraftFailed { ticket, error } => {
                let session = self.sessions.get_mut(&ticket.message_id)?;
                session.phase = ReplyPhase::Failed(ReplyStage::Generation);
                session.error = Some(error.clone());
                Some(ReplyOutcome::DraftFailed {
                    message_id: ticket.message_id,
                    error,
                })
            }
            ReplyEvent::Sent { ticket } => {
                let mut session = self.sessions.remove(&ticket.message_id)?;
                session.phase = ReplyPhase::Sent;
                tracing::info!("Reply to {} sent", ticket.message_id);
                Some(ReplyOutcome::Sent { session })
            }
            ReplyEvent::SendFailed { ticket, error } => {
                let session = self.sessions.get_mut(&ticket.message_id)?;
                session.phase = ReplyPhase::Failed(ReplyStage::Send);
                session.error = Some(error.clone());
                Some(ReplyOutcome::SendFailed {
                    message_id: ticket.message_id,
                    error,
                })
            }
        }
    }

    fn session_for(&self, message_id: &str) -> Result<&ReplySession, ReplyError> {
        self.sessions
            .get(message_id)
            .ok_or_else(|| ReplyError::UnknownSession(message_id.to_string()))
    }

    fn session_mut(&mut self, message_id: &str) -> Result<&mut ReplySession, ReplyError> {
        self.sessions
            .get_mut(message_id)
            .ok_or_else(|| ReplyError::UnknownSession(message_id.to_string()))
    }

    fn dispatch(&self, command: ReplyCommand) -> Result<(), ReplyError> {
        self.cmd_tx.try_send(command).map_err(|e| match e {
            TrySendError::Full(_) => ReplyError::Busy,
            TrySendError::Closed(_) => ReplyError::ActorStopped,
        })
    }
}

fn ticket(session: &ReplySession) -> ReplyTicket {
    ReplyTicket {
        message_id: session.message_id.clone(),
        epoch: session.epoch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;
    use crate::backend::{BackendError, SendReceipt};
    use crate::constants::SEND_FAILED_FALLBACK;
    use crate::mail::MailView;
    use crate::mail::fixtures::{labeled, repliable};

    fn workflow(backend: &Arc<MockBackend>) -> ReplyWorkflow {
        ReplyWorkflow::new(Arc::clone(backend), &ReplyConfig::default())
    }

    async fn next_outcome(workflow: &mut ReplyWorkflow) -> Option<ReplyOutcome> {
        let event = workflow.next_event().await?;
        workflow.handle(event)
    }

    /// Open a session and drive it to `Drafted`
    async fn drafted(workflow: &mut ReplyWorkflow, id: &str) {
        workflow.open(&repliable(id)).unwrap();
        workflow.generate_draft(id).unwrap();
        assert!(matches!(
            next_outcome(workflow).await,
            Some(ReplyOutcome::Drafted { .. })
        ));
    }

    #[tokio::test]
    async fn test_open_rejects_ineligible_email() {
        let backend = Arc::new(MockBackend::new());
        let mut workflow = workflow(&backend);

        let spam = labeled("s1", Some("Spam"), 0.99);
        assert_eq!(
            workflow.open(&spam).unwrap_err(),
            ReplyError::NotEligible("s1".to_string())
        );

        let mut sent = repliable("s2");
        sent.kind = Some(MailView::Sent);
        assert!(workflow.open(&sent).is_err());
        assert_eq!(workflow.session_count(), 0);
    }

    #[tokio::test]
    async fn test_open_returns_existing_session() {
        let backend = Arc::new(MockBackend::new());
        let mut workflow = workflow(&backend);

        let epoch = workflow.open(&repliable("m1")).unwrap().epoch;
        workflow.generate_draft("m1").unwrap();
        let again = workflow.open(&repliable("m1")).unwrap();

        assert_eq!(again.epoch, epoch);
        assert_eq!(again.phase, ReplyPhase::Generating);
    }

    #[tokio::test]
    async fn test_generate_sends_subject_and_body() {
        let backend = Arc::new(MockBackend::new());
        let mut workflow = workflow(&backend);
        drafted(&mut workflow, "m1").await;

        let session = workflow.session("m1").unwrap();
        assert_eq!(session.phase, ReplyPhase::Drafted);
        assert_eq!(
            session.draft_text,
            "Thanks for your email. I'll get back to you soon."
        );

        let request = backend.draft_calls.lock().unwrap()[0].clone();
        assert_eq!(request.email_text, "Subject m1\n\nCan we meet on Thursday?");
        assert_eq!(request.label, "business");
        assert_eq!(request.confidence, 0.9);
    }

    #[tokio::test]
    async fn test_generation_failure_then_retry() {
        let backend = Arc::new(MockBackend::new());
        backend.push_draft(Err(BackendError::Status {
            status: 500,
            message: Some("classifier offline".to_string()),
        }));
        backend.push_draft(Ok("Happy to help.".to_string()));
        let mut workflow = workflow(&backend);

        workflow.open(&repliable("m1")).unwrap();
        workflow.generate_draft("m1").unwrap();
        next_outcome(&mut workflow).await;

        let session = workflow.session("m1").unwrap();
        assert_eq!(session.phase, ReplyPhase::Failed(ReplyStage::Generation));
        assert_eq!(
            session.error.as_deref(),
            Some("Failed to generate draft: classifier offline")
        );

        workflow.generate_draft("m1").unwrap();
        assert_eq!(workflow.session("m1").unwrap().error, None);
        next_outcome(&mut workflow).await;

        let session = workflow.session("m1").unwrap();
        assert_eq!(session.phase, ReplyPhase::Drafted);
        assert_eq!(session.draft_text, "Happy to help.");
        assert_eq!(session.error, None);
    }

    #[tokio::test]
    async fn test_busy_while_generating() {
        let backend = Arc::new(MockBackend::new());
        let mut workflow = workflow(&backend);
        workflow.open(&repliable("m1")).unwrap();
        workflow.generate_draft("m1").unwrap();

        assert_eq!(workflow.generate_draft("m1"), Err(ReplyError::Busy));
        assert_eq!(workflow.send_reply("m1"), Err(ReplyError::Busy));
    }

    #[tokio::test]
    async fn test_whitespace_draft_is_rejected_without_remote_call() {
        let backend = Arc::new(MockBackend::new());
        let mut workflow = workflow(&backend);
        drafted(&mut workflow, "m1").await;

        workflow.edit_draft("m1", "  \n\t ").unwrap();
        assert!(matches!(
            workflow.send_reply("m1"),
            Err(ReplyError::Validation(_))
        ));
        assert_eq!(workflow.session("m1").unwrap().phase, ReplyPhase::Drafted);

        tokio::task::yield_now().await;
        assert_eq!(backend.send_count(), 0);
    }

    #[tokio::test]
    async fn test_edit_requires_a_draft() {
        let backend = Arc::new(MockBackend::new());
        let mut workflow = workflow(&backend);
        workflow.open(&repliable("m1")).unwrap();

        assert!(matches!(
            workflow.edit_draft("m1", "text"),
            Err(ReplyError::InvalidPhase { .. })
        ));
        assert_eq!(
            workflow.edit_draft("nope", "text"),
            Err(ReplyError::UnknownSession("nope".to_string()))
        );
    }

    #[tokio::test]
    async fn test_successful_send_discards_session() {
        let backend = Arc::new(MockBackend::new());
        let mut workflow = workflow(&backend);
        drafted(&mut workflow, "m1").await;
        workflow.edit_draft("m1", "Thursday works.").unwrap();

        workflow.send_reply("m1").unwrap();
        assert_eq!(workflow.session("m1").unwrap().phase, ReplyPhase::Sending);

        match next_outcome(&mut workflow).await {
            Some(ReplyOutcome::Sent { session }) => {
                assert_eq!(session.message_id, "m1");
                assert_eq!(session.phase, ReplyPhase::Sent);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(workflow.session("m1").is_none());

        let request = backend.send_calls.lock().unwrap()[0].clone();
        assert_eq!(request.message_id, "m1");
        assert_eq!(request.draft_text, "Thursday works.");
        assert_eq!(request.subject, "Subject m1");
    }

    #[tokio::test]
    async fn test_failed_send_preserves_draft() {
        let backend = Arc::new(MockBackend::new());
        backend.push_send(Ok(SendReceipt {
            success: false,
            error: Some("Gmail token expired".to_string()),
        }));
        let mut workflow = workflow(&backend);
        drafted(&mut workflow, "m1").await;
        workflow.edit_draft("m1", "See you then.").unwrap();
        workflow.send_reply("m1").unwrap();
        next_outcome(&mut workflow).await;

        let session = workflow.session("m1").unwrap();
        assert_eq!(session.phase, ReplyPhase::Failed(ReplyStage::Send));
        assert_eq!(session.error.as_deref(), Some("Gmail token expired"));
        assert_eq!(session.draft_text, "See you then.");

        // Retry from failed(send) is allowed, edits too
        workflow.edit_draft("m1", "See you then!").unwrap();
        workflow.send_reply("m1").unwrap();
        assert!(matches!(
            next_outcome(&mut workflow).await,
            Some(ReplyOutcome::Sent { .. })
        ));
    }

    #[tokio::test]
    async fn test_send_transport_error_shows_fallback() {
        let backend = Arc::new(MockBackend::new());
        backend.push_send(Err(BackendError::Transport(
            "error sending request".to_string(),
        )));
        let mut workflow = workflow(&backend);
        drafted(&mut workflow, "m1").await;
        workflow.edit_draft("m1", "On my way.").unwrap();
        workflow.send_reply("m1").unwrap();
        next_outcome(&mut workflow).await;

        let session = workflow.session("m1").unwrap();
        assert_eq!(session.phase, ReplyPhase::Failed(ReplyStage::Send));
        assert_eq!(session.error.as_deref(), Some(SEND_FAILED_FALLBACK));
        assert_eq!(session.draft_text, "On my way.");
    }

    #[tokio::test]
    async fn test_shutdown_drops_sessions_and_late_results() {
        let backend = Arc::new(MockBackend::new());
        let mut workflow = workflow(&backend);
        workflow.open(&repliable("m1")).unwrap();
        workflow.generate_draft("m1").unwrap();

        workflow.shutdown();
        assert_eq!(workflow.session_count(), 0);

        // The actor exits and closes the event channel; anything it sent
        // before that has no session to land in
        while let Some(event) = workflow.next_event().await {
            assert_eq!(workflow.handle(event), None);
        }
    }

    #[tokio::test]
    async fn test_cancel_blocked_while_sending() {
        let backend = Arc::new(MockBackend::new());
        let mut workflow = workflow(&backend);
        drafted(&mut workflow, "m1").await;
        workflow.send_reply("m1").unwrap();

        assert_eq!(workflow.cancel("m1"), Err(ReplyError::Busy));
    }

    #[tokio::test]
    async fn test_result_after_cancel_is_discarded() {
        let backend = Arc::new(MockBackend::new());
        let mut workflow = workflow(&backend);
        workflow.open(&repliable("m1")).unwrap();
        workflow.generate_draft("m1").unwrap();
        workflow.cancel("m1").unwrap();

        let event = workflow.next_event().await.unwrap();
        assert_eq!(workflow.handle(event), None);
        assert!(workflow.session("m1").is_none());
    }

    #[tokio::test]
    async fn test_result_for_reopened_session_is_discarded() {
        let backend = Arc::new(MockBackend::new());
        let mut workflow = workflow(&backend);
        workflow.open(&repliable("m1")).unwrap();
        workflow.generate_draft("m1").unwrap();
        workflow.cancel("m1").unwrap();
        let epoch = workflow.open(&repliable("m1")).unwrap().epoch;

        // The old draft belongs to the previous epoch
        let event = workflow.next_event().await.unwrap();
        assert_eq!(workflow.handle(event), None);

        let session = workflow.session("m1").unwrap();
        assert_eq!(session.epoch, epoch);
        assert_eq!(session.phase, ReplyPhase::Idle);
        assert!(session.draft_text.is_empty());
    }

    #[tokio::test]
    async fn test_sessions_do_not_interfere() {
        let backend = Arc::new(MockBackend::new());
        backend.push_draft(Ok("draft for a".to_string()));
        backend.push_draft(Err(BackendError::Timeout));
        let mut workflow = workflow(&backend);

        workflow.open(&repliable("a")).unwrap();
        workflow.generate_draft("a").unwrap();
        next_outcome(&mut workflow).await;

        workflow.open(&repliable("b")).unwrap();
        workflow.generate_draft("b").unwrap();
        next_outcome(&mut workflow).await;

        let a = workflow.session("a").unwrap();
        let b = workflow.session("b").unwrap();
        assert_eq!(a.phase, ReplyPhase::Drafted);
        assert_eq!(a.draft_text, "draft for a");
        assert_eq!(b.phase, ReplyPhase::Failed(ReplyStage::Generation));
        assert!(b.draft_text.is_empty());
        assert_ne!(a.epoch, b.epoch);
    }
}
