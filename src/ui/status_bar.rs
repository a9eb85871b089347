//! Status bar rendering with sync indicator and last-sync time

use chrono::{DateTime, Local, Utc};
use ratatui::{
    Frame,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::Paragraph,
};
use unicode_width::UnicodeWidthStr;

use super::theme::{Theme, symbols};
use crate::constants::SPINNER_FRAME_MS;

/// Status bar info for rendering
pub struct StatusInfo<'a> {
    pub view: &'a str,
    pub total: usize,
    pub loading: bool,
    pub last_sync: Option<DateTime<Utc>>,
    pub backend: &'a str,
    pub status_message: Option<&'a str>,
    /// Whether there's an unacknowledged error (show indicator)
    pub has_error: bool,
}

pub fn status_bar(frame: &mut Frame, area: Rect, info: &StatusInfo) {
    let style = Theme::status_bar();
    let width = area.width as usize;

    let (indicator, indicator_style) = if info.loading {
        (format!(" {} ", spinner_char()), Theme::status_syncing())
    } else if info.has_error {
        (format!(" {} ", symbols::DISCONNECTED), Theme::status_error())
    } else {
        (format!(" {} ", symbols::CONNECTED), Theme::status_connected())
    };

    let view_info = format!("{} ", info.view);
    let total = info.total.to_string();

    let status_msg = match info.status_message {
        Some(msg) if !msg.is_empty() => format!("{} │ ", msg),
        _ => String::new(),
    };
    let sync_info = match info.last_sync {
        Some(ts) => format!("{} │ ", format_relative_time(ts)),
        None => String::new(),
    };
    let backend = format!("{} ", info.backend);

    let left_width = indicator.width() + view_info.width() + total.width();
    let right_width = status_msg.width() + sync_info.width() + backend.width();
    let padding = " ".repeat(width.saturating_sub(left_width + right_width));

    let line = Line::from(vec![
        Span::styled(indicator, indicator_style),
        Span::styled(view_info, style),
        Span::styled(total, style.add_modifier(Modifier::BOLD)),
        Span::styled(padding, style),
        Span::styled(status_msg, Theme::status_info()),
        Span::styled(sync_info, Theme::status_info()),
        Span::styled(backend, style),
    ]);

    frame.render_widget(Paragraph::new(line).style(style), area);
}

/// Format a timestamp as relative time (e.g., "2m ago", "1h ago")
pub fn format_relative_time(then: DateTime<Utc>) -> String {
    let diff = Utc::now().signed_duration_since(then);

    if diff.num_seconds() < 60 {
        "just now".to_string()
    } else if diff.num_minutes() < 60 {
        format!("{}m ago", diff.num_minutes())
    } else if diff.num_hours() < 24 {
        format!("{}h ago", diff.num_hours())
    } else {
        then.with_timezone(&Local).format("%b %d").to_string()
    }
}

/// Get an animated spinner character for loading states
pub fn spinner_char() -> char {
    const FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
    let millis = Utc::now().timestamp_millis().unsigned_abs() as u128;
    FRAMES[(millis / SPINNER_FRAME_MS) as usize % FRAMES.len()]
}
