//! Reply eligibility policy

use crate::config::ReplyConfig;

use super::types::{Email, MailView};

/// Decides which emails may enter the reply workflow
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyPolicy {
    pub min_confidence: f64,
    /// Lowercased labels that never get a reply
    pub blocked_labels: Vec<String>,
}

impl Default for ReplyPolicy {
    fn default() -> Self {
        Self::from_config(&ReplyConfig::default())
    }
}

impl ReplyPolicy {
    pub fn from_config(config: &ReplyConfig) -> Self {
        Self {
            min_confidence: config.min_confidence,
            blocked_labels: config
                .blocked_labels
                .iter()
                .map(|l| l.to_lowercase())
                .collect(),
        }
    }

    /// True iff the email is an inbox message with a repliable label, enough
    /// confidence, and a sender different from the recipient.
    pub fn is_eligible(&self, email: &Email) -> bool {
        if email.kind != Some(MailView::Inbox) {
            return false;
        }

        let label = email
            .predicted_label
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();
        if self.blocked_labels.contains(&label) {
            return false;
        }

        if email.confidence_or_zero() < self.min_confidence {
            return false;
        }

        email.from != email.to
    }
}

/// Eligibility under the default policy
#[cfg(test)]
pub fn is_eligible_for_reply(email: &Email) -> bool {
    ReplyPolicy::default().is_eligible(email)
}
