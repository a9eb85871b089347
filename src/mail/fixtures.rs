//! Email builders shared by unit tests

use super::types::{Email, MailView};

pub fn email(id: &str) -> Email {
    Email {
        message_id: id.to_string(),
        subject: None,
        from: None,
        to: None,
        body: None,
        cleaned_text: None,
        predicted_label: None,
        confidence: None,
        sentiment: None,
        priority: None,
        kind: None,
    }
}

pub fn labeled(id: &str, label: Option<&str>, confidence: f64) -> Email {
    Email {
        predicted_label: label.map(str::to_string),
        confidence: Some(confidence),
        ..email(id)
    }
}

/// An inbox email that passes the default reply policy
pub fn repliable(id: &str) -> Email {
    Email {
        subject: Some(format!("Subject {}", id)),
        body: Some("Can we meet on Thursday?".to_string()),
        from: Some("alice@example.com".to_string()),
        to: Some("me@example.com".to_string()),
        kind: Some(MailView::Inbox),
        ..labeled(id, Some("business"), 0.9)
    }
}
