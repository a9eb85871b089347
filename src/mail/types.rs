use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{NO_CONTENT, SUMMARY_SENTENCES, UNKNOWN_LABEL};

/// One of the two top-level mailbox partitions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailView {
    #[default]
    Inbox,
    Sent,
}

impl MailView {
    pub const ALL: [MailView; 2] = [MailView::Inbox, MailView::Sent];

    /// Backend listing endpoint segment for this view
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Inbox => "pull",
            Self::Sent => "sent",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Inbox => "Inbox",
            Self::Sent => "Sent",
        }
    }

    pub fn other(self) -> Self {
        match self {
            Self::Inbox => Self::Sent,
            Self::Sent => Self::Inbox,
        }
    }
}

impl fmt::Display for MailView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inbox => f.write_str("inbox"),
            Self::Sent => f.write_str("sent"),
        }
    }
}

impl std::str::FromStr for MailView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inbox" => Ok(Self::Inbox),
            "sent" => Ok(Self::Sent),
            other => Err(format!("unknown view '{}' (expected inbox or sent)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Neutral => "Neutral",
            Self::Negative => "Negative",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// A classified message as returned by the backend listings.
///
/// Emails are never edited after they are fetched; a sync replaces the
/// whole collection instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    pub message_id: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub cleaned_text: Option<String>,
    #[serde(default)]
    pub predicted_label: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Partition the message was listed from
    #[serde(rename = "type", default)]
    pub kind: Option<MailView>,
}

impl Email {
    /// Group key: the predicted label as stored, or "Unknown"
    pub fn label(&self) -> &str {
        self.predicted_label.as_deref().unwrap_or(UNKNOWN_LABEL)
    }

    pub fn confidence_or_zero(&self) -> f64 {
        self.confidence.unwrap_or(0.0)
    }

    pub fn priority(&self) -> Priority {
        self.priority.unwrap_or_default()
    }

    pub fn display_subject(&self) -> &str {
        match self.subject.as_deref() {
            Some(s) if !s.trim().is_empty() => s,
            _ => "(No Subject)",
        }
    }

    pub fn display_from(&self) -> &str {
        self.from.as_deref().unwrap_or("Unknown")
    }

    /// Text sent to the draft generator: subject and body separated by a blank line
    pub fn reply_source_text(&self) -> String {
        format!(
            "{}\n\n{}",
            self.subject.as_deref().unwrap_or_default(),
            self.body.as_deref().unwrap_or_default()
        )
    }

    /// Whether this message should be shown with a warning badge
    pub fn needs_attention(&self) -> bool {
        self.priority() == Priority::High || self.sentiment == Some(Sentiment::Negative)
    }

    /// Single-line body preview truncated to `max_chars`
    pub fn preview(&self, max_chars: usize) -> String {
        match self.body.as_deref() {
            Some(body) => one_line(body, max_chars),
            None => NO_CONTENT.to_string(),
        }
    }

    /// First sentences of the body, split on runs of `.`, `!` and `?`
    pub fn summary(&self) -> Option<String> {
        let body = self.body.as_deref()?;
        let sentences: Vec<String> = body
            .split(['.', '!', '?'])
            .filter(|piece| !piece.is_empty())
            .take(SUMMARY_SENTENCES)
            .map(|piece| piece.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|sentence| !sentence.is_empty())
            .collect();

        (!sentences.is_empty()).then(|| format!("{}.", sentences.join(". ")))
    }

    /// The classifier's cleaned text on one line, if it sent any
    pub fn processed_text(&self, max_chars: usize) -> Option<String> {
        let text = self.cleaned_text.as_deref()?;
        (!text.trim().is_empty()).then(|| one_line(text, max_chars))
    }
}

/// Whitespace flattened to spaces, cut after `max_chars` with "..."
fn one_line(text: &str, max_chars: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    if flat.chars().count() > max_chars {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        flat
    }
}
