use thiserror::Error;

use crate::mail::Email;

/// Which remote call a failed session failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStage {
    Generation,
    Send,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyPhase {
    Idle,
    Generating,
    Drafted,
    Sending,
    Sent,
    Failed(ReplyStage),
}

impl ReplyPhase {
    /// A remote call for the session is pending
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Generating | Self::Sending)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Ready",
            Self::Generating => "Generating draft...",
            Self::Drafted => "Draft ready",
            Self::Sending => "Sending...",
            Self::Sent => "Sent",
            Self::Failed(ReplyStage::Generation) => "Draft failed",
            Self::Failed(ReplyStage::Send) => "Send failed",
        }
    }
}

/// Reply in progress for one message
#[derive(Debug, Clone, PartialEq)]
pub struct ReplySession {
    pub message_id: String,
    /// Snapshot of the email the session was opened for
    pub email: Email,
    pub phase: ReplyPhase,
    pub draft_text: String,
    pub error: Option<String>,
    /// Identity of this session; results tagged with another epoch are stale
    pub epoch: u64,
}

impl ReplySession {
    pub(super) fn new(email: Email, epoch: u64) -> Self {
        Self {
            message_id: email.message_id.clone(),
            email,
            phase: ReplyPhase::Idle,
            draft_text: String::new(),
            error: None,
            epoch,
        }
    }

    /// The draft can be edited in the current phase
    pub fn is_editable(&self) -> bool {
        matches!(
            self.phase,
            ReplyPhase::Drafted | ReplyPhase::Failed(ReplyStage::Send)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplyError {
    #[error("email {0} is not eligible for a reply")]
    NotEligible(String),

    #[error("{0}")]
    Validation(String),

    #[error("a request for this reply is already in progress")]
    Busy,

    #[error("cannot {action} while {phase:?}")]
    InvalidPhase {
        action: &'static str,
        phase: ReplyPhase,
    },

    #[error("no reply in progress for {0}")]
    UnknownSession(String),

    #[error("no reply is open")]
    NoOpenReply,

    #[error("reply worker stopped")]
    ActorStopped,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::fixtures::repliable;

    #[test]
    fn test_new_session_is_idle() {
        let session = ReplySession::new(repliable("m1"), 4);
        assert_eq!(session.message_id, "m1");
        assert_eq!(session.phase, ReplyPhase::Idle);
        assert!(session.draft_text.is_empty());
        assert!(!session.is_editable());
        assert_eq!(session.epoch, 4);
    }

    #[test]
    fn test_busy_phases() {
        assert!(ReplyPhase::Generating.is_busy());
        assert!(ReplyPhase::Sending.is_busy());
        assert!(!ReplyPhase::Drafted.is_busy());
        assert!(!ReplyPhase::Failed(ReplyStage::Send).is_busy());
    }

    #[test]
    fn test_invalid_phase_message() {
        let err = ReplyError::InvalidPhase {
            action: "send",
            phase: ReplyPhase::Idle,
        };
        assert_eq!(err.to_string(), "cannot send while Idle");
    }
}
