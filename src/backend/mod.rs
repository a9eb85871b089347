//! Classification backend: listings, draft generation and sending
//!
//! The core only talks to [`MailBackend`]; [`HttpBackend`] is the production
//! implementation over the backend's JSON API.

mod client;
mod error;
#[cfg(test)]
pub mod mock;

use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::mail::{Email, MailView};

pub use client::HttpBackend;
pub use error::BackendError;

/// Input for the "compose reply" call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftRequest {
    pub email_text: String,
    pub label: String,
    pub confidence: f64,
}

impl DraftRequest {
    pub fn for_email(email: &Email) -> Self {
        Self {
            email_text: email.reply_source_text(),
            label: email.predicted_label.clone().unwrap_or_default(),
            confidence: email.confidence_or_zero(),
        }
    }
}

/// Input for the "send reply" call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendRequest {
    pub message_id: String,
    pub draft_text: String,
    pub subject: String,
}

/// Result body of the "send reply" call
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SendReceipt {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Remote operations the sync engine and reply workflow depend on
pub trait MailBackend: Send + Sync + 'static {
    /// List the most recent `limit` messages of a view, newest first
    fn list(
        &self,
        view: MailView,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Email>, BackendError>> + Send;

    /// Ask the backend to compose a reply draft
    fn generate_reply(
        &self,
        request: DraftRequest,
    ) -> impl Future<Output = Result<String, BackendError>> + Send;

    fn send_reply(
        &self,
        request: SendRequest,
    ) -> impl Future<Output = Result<SendReceipt, BackendError>> + Send;
}
