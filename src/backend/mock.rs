//! In-memory backend that records calls and replays scripted results

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use super::{BackendError, DraftRequest, MailBackend, SendReceipt, SendRequest};
use crate::mail::{Email, MailView};

#[derive(Default)]
pub struct MockBackend {
    listings: Mutex<HashMap<MailView, Vec<Email>>>,
    list_failure: Mutex<Option<BackendError>>,
    drafts: Mutex<VecDeque<Result<String, BackendError>>>,
    sends: Mutex<VecDeque<Result<SendReceipt, BackendError>>>,
    /// Simulated latency per call, applied with `tokio::time::sleep`
    pub latency: Mutex<Duration>,
    pub list_calls: Mutex<Vec<MailView>>,
    pub draft_calls: Mutex<Vec<DraftRequest>>,
    pub send_calls: Mutex<Vec<SendRequest>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_listing(&self, view: MailView, emails: Vec<Email>) {
        self.listings.lock().unwrap().insert(view, emails);
    }

    /// Fail every listing with `error` until cleared with `None`
    pub fn fail_listings(&self, error: Option<BackendError>) {
        *self.list_failure.lock().unwrap() = error;
    }

    pub fn push_draft(&self, result: Result<String, BackendError>) {
        self.drafts.lock().unwrap().push_back(result);
    }

    pub fn push_send(&self, result: Result<SendReceipt, BackendError>) {
        self.sends.lock().unwrap().push_back(result);
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = latency;
    }

    pub fn list_count(&self, view: MailView) -> usize {
        self.list_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|v| **v == view)
            .count()
    }

    pub fn draft_count(&self) -> usize {
        self.draft_calls.lock().unwrap().len()
    }

    pub fn send_count(&self) -> usize {
        self.send_calls.lock().unwrap().len()
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

impl MailBackend for MockBackend {
    async fn list(&self, view: MailView, _limit: usize) -> Result<Vec<Email>, BackendError> {
        self.list_calls.lock().unwrap().push(view);
        self.simulate_latency().await;

        if let Some(err) = self.list_failure.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self
            .listings
            .lock()
            .unwrap()
            .get(&view)
            .cloned()
            .unwrap_or_default())
    }

    async fn generate_reply(&self, request: DraftRequest) -> Result<String, BackendError> {
        self.draft_calls.lock().unwrap().push(request);
        self.simulate_latency().await;

        let scripted = self.drafts.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok("Thanks for your email. I'll get back to you soon.".to_string()))
    }

    async fn send_reply(&self, request: SendRequest) -> Result<SendReceipt, BackendError> {
        self.send_calls.lock().unwrap().push(request);
        self.simulate_latency().await;

        let scripted = self.sends.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| {
            Ok(SendReceipt {
                success: true,
                ..SendReceipt::default()
            })
        })
    }
}
