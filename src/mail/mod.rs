pub mod eligibility;
#[cfg(test)]
pub mod fixtures;
pub mod group;
pub mod types;

pub use eligibility::ReplyPolicy;
pub use group::{LabelGroup, MailStats, compute_stats, display_label, group_by_label};
pub use types::{Email, MailView, Priority, Sentiment};
