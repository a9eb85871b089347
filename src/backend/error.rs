use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a backend call, reduced to what the client can act on
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    #[error("{0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    /// Non-2xx response; `message` is the body's `error` field when present
    #[error("{}", describe_status(.status, .message))]
    Status { status: u16, message: Option<String> },

    #[error("rate limited: {}", describe_rate_limit(.0))]
    RateLimited(Option<String>),

    #[error("invalid response: {0}")]
    Decode(String),
}

fn describe_status(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(message) => format!("{} (HTTP {})", message, status),
        None => format!("HTTP {}", status),
    }
}

fn describe_rate_limit(message: &Option<String>) -> &str {
    message.as_deref().unwrap_or("too many requests")
}

impl BackendError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }

    /// The `error` field the backend put in a failed response, if any
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } | Self::RateLimited(message) => message.as_deref(),
            _ => None,
        }
    }

    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message: None, status } => StatusCode::from_u16(*status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .map(str::to_string)
                .unwrap_or_else(|| self.to_string()),
            other => other
                .backend_message()
                .map(str::to_string)
                .unwrap_or_else(|| other.to_string()),
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_and_user_message() {
        let err = BackendError::Status {
            status: 500,
            message: Some("Gmail auth expired".to_string()),
        };
        assert_eq!(err.to_string(), "Gmail auth expired (HTTP 500)");
        assert_eq!(err.user_message(), "Gmail auth expired");
        assert_eq!(err.backend_message(), Some("Gmail auth expired"));
        assert!(!err.is_rate_limited());
    }

    #[test]
    fn test_status_without_body_message() {
        let err = BackendError::Status {
            status: 500,
            message: None,
        };
        assert_eq!(err.to_string(), "HTTP 500");
        assert_eq!(err.user_message(), "Internal Server Error");
        assert_eq!(err.backend_message(), None);
    }

    #[test]
    fn test_rate_limited_classification() {
        let err = BackendError::RateLimited(Some("slow down".to_string()));
        assert!(err.is_rate_limited());
        assert_eq!(err.to_string(), "rate limited: slow down");
        assert_eq!(err.user_message(), "slow down");

        let bare = BackendError::RateLimited(None);
        assert_eq!(bare.user_message(), "rate limited: too many requests");
    }

    #[test]
    fn test_transport_has_no_backend_message() {
        let err = BackendError::Transport("connection reset".to_string());
        assert_eq!(err.backend_message(), None);
        assert_eq!(err.user_message(), "connection reset");
    }
}
