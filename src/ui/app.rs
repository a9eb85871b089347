//! Top-level frame layout

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::app::state::AppState;

use super::mailbox::{render_main, render_stats, render_tabs};
use super::reply::render_reply_popup;
use super::status_bar::{StatusInfo, status_bar};
use super::widgets::{error_bar, help_bar};

pub fn render(frame: &mut Frame, state: &AppState) {
    let show_stats = state.stats.is_some();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                     // Status bar
            Constraint::Length(1),                     // View tabs
            Constraint::Length(u16::from(show_stats)), // Inbox statistics
            Constraint::Min(0),                        // List + preview
            Constraint::Length(1),                     // Help bar or error
        ])
        .split(frame.area());

    let info = StatusInfo {
        view: state.view.title(),
        total: state.email_count(),
        loading: state.status.loading,
        last_sync: state.last_sync,
        backend: &state.backend_url,
        status_message: Some(state.status.message.as_str()),
        has_error: state.status.has_unacknowledged_error,
    };
    status_bar(frame, chunks[0], &info);

    render_tabs(frame, chunks[1], state);
    if let Some(stats) = &state.stats {
        render_stats(frame, chunks[2], stats);
    }
    render_main(frame, chunks[3], state);

    if let Some(error) = &state.status.error {
        error_bar(frame, chunks[4], error);
    } else if state.reply.is_none() {
        let hints = &[
            ("j/k", "nav"),
            ("Tab", "inbox/sent"),
            ("Space", "fold"),
            ("r", "refresh"),
            ("R", "reply"),
            ("q", "quit"),
        ];
        help_bar(frame, chunks[4], hints);
    }

    // Reply popup (rendered last so it appears on top)
    if let Some(reply) = &state.reply {
        render_reply_popup(frame, frame.area(), reply);
    }
}
