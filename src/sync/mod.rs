mod engine;
mod state;
pub mod timer;

pub use engine::{SyncEngine, SyncEvent, SyncOutcome};
pub use state::{MailboxState, SyncStatus};
