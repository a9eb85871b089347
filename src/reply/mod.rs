//! Reply workflow: draft generation, editing and sending per message

mod actor;
mod session;
mod workflow;

pub use actor::ReplyEvent;
pub use session::{ReplyError, ReplyPhase, ReplySession, ReplyStage};
pub use workflow::{ReplyOutcome, ReplyWorkflow};
