//! Application-wide constants for tuning and configuration
//!
//! Centralizes magic numbers to make them discoverable and configurable.

/// Number of most recent messages requested per listing.
pub const DEFAULT_LIST_LIMIT: usize = 15;

/// Interval in seconds between automatic re-syncs of the active view.
pub const REFRESH_INTERVAL_SECS: u64 = 30;

/// Debounce window for manual refresh requests in milliseconds.
/// Rapid presses inside this window collapse to a single listing call.
pub const REFRESH_DEBOUNCE_MS: u64 = 300;

/// Minimum classifier confidence for an email to be offered a reply.
pub const MIN_REPLY_CONFIDENCE: f64 = 0.7;

/// Labels that never get a reply, compared case-insensitively.
pub const BLOCKED_REPLY_LABELS: &[&str] = &["spam", "promotion", "promotions"];

/// Group key used for emails without a predicted label.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Default backend base URL (matches the backend's local dev server).
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// HTTP request timeout in seconds for backend calls.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Fallback shown when a send fails without an error from the backend.
pub const SEND_FAILED_FALLBACK: &str = "Failed to send reply: check mail account authorization";

/// Capacity of the command/event channels between core and tasks.
pub const CHANNEL_CAPACITY: usize = 64;

/// Error message display duration in seconds before auto-dismiss.
pub const ERROR_TTL_SECS: u64 = 5;

/// Spinner animation frame duration in milliseconds.
pub const SPINNER_FRAME_MS: u128 = 80;

/// Number of body characters shown in the email list preview.
pub const PREVIEW_LENGTH: usize = 120;

/// Placeholder for emails without a body.
pub const NO_CONTENT: &str = "No message content available";

/// Sentences of the body shown as the summary in the preview pane.
pub const SUMMARY_SENTENCES: usize = 3;

/// Characters of the classifier's cleaned text shown in the preview pane.
pub const PROCESSED_TEXT_CHARS: usize = 300;

/// Minimum terminal width for showing the preview pane beside the list.
pub const MIN_SPLIT_VIEW_WIDTH: u16 = 90;

/// Selected row is kept at 1/N of the visible list height when scrolling.
pub const SCROLL_TARGET_FRACTION: usize = 3;
