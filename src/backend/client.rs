//! HTTP client for the classification backend

use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;

use super::{BackendError, DraftRequest, MailBackend, SendReceipt, SendRequest};
use crate::config::BackendConfig;
use crate::mail::{Email, MailView};

/// Backend client over the `/api/email` JSON endpoints
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct DraftResponse {
    draft: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/email/{}", self.base_url, path)
    }
}

/// Turn a non-2xx response into a [`BackendError`], keeping the body's
/// `error` field when the backend sent one.
async fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.json::<ErrorBody>().await.ok();
    Err(status_error(status, body))
}

fn status_error(status: StatusCode, body: Option<ErrorBody>) -> BackendError {
    let message = body
        .and_then(|body| body.error)
        .filter(|e| !e.trim().is_empty());

    if status == StatusCode::TOO_MANY_REQUESTS {
        BackendError::RateLimited(message)
    } else {
        BackendError::Status {
            status: status.as_u16(),
            message,
        }
    }

}

impl MailBackend for HttpBackend {
    async fn list(&self, view: MailView, limit: usize) -> Result<Vec<Email>, BackendError> {
        tracing::debug!("Listing {} (limit {})", view, limit);

        let response = self
            .client
            .get(self.url(view.endpoint()))
            .query(&[("limit", limit)])
            .send()
            .await?;

        let emails = check_status(response).await?.json::<Vec<Email>>().await?;
        Ok(emails)
    }

    async fn generate_reply(&self, request: DraftRequest) -> Result<String, BackendError> {
        let response = self
            .client
            .post(self.url("reply"))
            .json(&request)
            .send()
            .await?;

        let body = check_status(response).await?.json::<DraftResponse>().await?;
        Ok(body.draft)
    }

    async fn send_reply(&self, request: SendRequest) -> Result<SendReceipt, BackendError> {
        let response = self
            .client
            .post(self.url("send_reply"))
            .json(&request)
            .send()
            .await?;

        let receipt = check_status(response).await?.json::<SendReceipt>().await?;
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_strips_trailing_slash() {
        let backend = HttpBackend::new(&BackendConfig {
            url: "http://localhost:8000/".to_string(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(
            backend.url(MailView::Inbox.endpoint()),
            "http://localhost:8000/api/email/pull"
        );
        assert_eq!(
            backend.url("send_reply"),
            "http://localhost:8000/api/email/send_reply"
        );
    }

    fn body(json: &str) -> Option<ErrorBody> {
        serde_json::from_str(json).ok()
    }

    #[test]
    fn test_too_many_requests_is_rate_limited() {
        let err = status_error(StatusCode::TOO_MANY_REQUESTS, None);
        assert!(err.is_rate_limited());
        assert_eq!(err, BackendError::RateLimited(None));

        let err = status_error(StatusCode::TOO_MANY_REQUESTS, body(r#"{"error":"quota"}"#));
        assert_eq!(err, BackendError::RateLimited(Some("quota".to_string())));
    }

    #[test]
    fn test_error_field_is_surfaced() {
        let err = status_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            body(r#"{"error":"Gmail auth expired"}"#),
        );
        assert_eq!(
            err,
            BackendError::Status {
                status: 500,
                message: Some("Gmail auth expired".to_string()),
            }
        );
        assert!(!err.is_rate_limited());
    }

    #[test]
    fn test_missing_error_field_falls_back_to_status() {
        for body in [None, body("{}"), body(r#"{"error":null}"#), body(r#"{"error":"  "}"#)] {
            let err = status_error(StatusCode::INTERNAL_SERVER_ERROR, body);
            assert_eq!(err.backend_message(), None);
            assert_eq!(err.user_message(), "Internal Server Error");
        }
        let err = status_error(StatusCode::BAD_GATEWAY, None);
        assert_eq!(err.to_string(), "HTTP 502");
    }
}
