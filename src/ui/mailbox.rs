//! Mailbox screen: view tabs, inbox statistics, label-grouped list and preview

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::state::{AppState, Row};
use crate::constants::{
    MIN_SPLIT_VIEW_WIDTH, NO_CONTENT, PROCESSED_TEXT_CHARS, SCROLL_TARGET_FRACTION,
};
use crate::mail::{Email, LabelGroup, MailStats, MailView, Sentiment, display_label};

use super::status_bar::spinner_char;
use super::theme::{Theme, borders, symbols, with_selection_bg};
use super::widgets::{sanitize_text, truncate_string};

pub fn render_tabs(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut spans = vec![Span::raw(" ")];
    for (i, view) in MailView::ALL.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", Theme::text_muted()));
        }
        let count = match view {
            MailView::Inbox => state.inbox_count,
            MailView::Sent => state.sent_count,
        };
        let style = if view == state.view {
            Theme::tab_active()
        } else {
            Theme::tab()
        };
        spans.push(Span::styled(
            format!("{} {} ({})", i + 1, view.title(), count),
            style,
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn render_stats(frame: &mut Frame, area: Rect, stats: &MailStats) {
    let line = Line::from(vec![
        Span::styled(" Total ", Theme::text_muted()),
        Span::styled(stats.total.to_string(), Theme::count()),
        Span::styled("  Spam ", Theme::text_muted()),
        Span::styled(stats.spam_count.to_string(), Theme::count()),
        Span::styled("  Business ", Theme::text_muted()),
        Span::styled(stats.business_count.to_string(), Theme::count()),
        Span::styled("  Avg confidence ", Theme::text_muted()),
        Span::styled(
            format!("{:.1}%", stats.avg_confidence_percent),
            Theme::count(),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

pub fn render_main(frame: &mut Frame, area: Rect, state: &AppState) {
    if area.width >= MIN_SPLIT_VIEW_WIDTH {
        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);
        render_list(frame, split[0], state, true);
        render_preview(frame, split[1], state);
    } else {
        render_list(frame, area, state, false);
    }
}

fn render_list(frame: &mut Frame, area: Rect, state: &AppState, show_border: bool) {
    let inner = if show_border {
        let block = Block::default()
            .borders(Borders::RIGHT)
            .border_style(Theme::border());
        let inner = block.inner(area);
        frame.render_widget(block, area);
        inner
    } else {
        area
    };

    if state.groups.is_empty() {
        let msg = if state.status.loading {
            format!("{} Loading emails...", spinner_char())
        } else {
            format!("No emails in {}. Press r to refresh.", state.view.title())
        };
        let paragraph = Paragraph::new(msg)
            .style(Theme::text_muted())
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, inner);
        return;
    }

    let width = inner.width as usize;
    let mut lines: Vec<Line> = Vec::new();
    let mut selected_line = 0;

    for (index, row) in state.rows().enumerate() {
        let is_selected = index == state.selected;
        if is_selected {
            selected_line = lines.len();
        }
        match row {
            Row::Header(group) => lines.push(group_header(state, group, is_selected)),
            Row::Email(email) => {
                let (header, preview) = email_lines(email, state, is_selected, width);
                lines.push(header);
                lines.push(preview);
            }
        }
    }

    // Keep the selection near the top third of the list
    let visible = inner.height as usize;
    let target = visible / SCROLL_TARGET_FRACTION;
    let scroll = selected_line
        .saturating_sub(target)
        .min(lines.len().saturating_sub(visible));

    let paragraph = Paragraph::new(lines).scroll((scroll.min(u16::MAX as usize) as u16, 0));
    frame.render_widget(paragraph, inner);
}

fn group_header(state: &AppState, group: &LabelGroup, selected: bool) -> Line<'static> {
    let marker = if state.is_collapsed(&group.label) {
        symbols::GROUP_COLLAPSED
    } else {
        symbols::GROUP_EXPANDED
    };
    Line::from(vec![
        Span::styled(marker, with_selection_bg(Theme::text_muted(), selected)),
        Span::styled(
            display_label(&group.label),
            with_selection_bg(Theme::label(), selected),
        ),
        Span::styled(
            format!(" ({})", group.len()),
            with_selection_bg(Theme::text_muted(), selected),
        ),
    ])
}

/// Two lines per email: sender, subject and badges, then a body preview
fn email_lines(
    email: &Email,
    state: &AppState,
    selected: bool,
    width: usize,
) -> (Line<'static>, Line<'static>) {
    let base = if selected {
        Theme::selected_bold()
    } else {
        Theme::text()
    };

    let attention = if email.needs_attention() {
        Span::styled(
            format!(" {}", symbols::ATTENTION),
            with_selection_bg(Theme::text_error(), selected),
        )
    } else {
        Span::styled("  ", base)
    };
    let replyable = if state.is_eligible(email) {
        Span::styled(
            format!("{} ", symbols::REPLYABLE),
            with_selection_bg(Theme::text_accent(), selected),
        )
    } else {
        Span::styled("  ", base)
    };

    let confidence = format!(" {:.0}%", email.confidence_or_zero() * 100.0);
    let sentiment = email
        .sentiment
        .map(|s| format!(" {}", s.as_str()))
        .unwrap_or_default();
    let from = truncate_string(email.display_from(), 24);

    let fixed = 4 + from.chars().count() + 2 + confidence.len() + sentiment.len();
    let subject = truncate_string(
        &sanitize_text(email.display_subject()),
        width.saturating_sub(fixed).max(8),
    );

    let header = Line::from(vec![
        attention,
        replyable,
        Span::styled(from, base),
        Span::styled("  ", base),
        Span::styled(subject, with_selection_bg(Theme::text_secondary(), selected)),
        Span::styled(confidence, with_selection_bg(Theme::count(), selected)),
        Span::styled(
            sentiment,
            with_selection_bg(sentiment_style(email.sentiment), selected),
        ),
    ]);

    let preview_width = state.preview_length.min(width.saturating_sub(4));
    let preview = Line::from(vec![
        Span::styled("    ", with_selection_bg(Style::default(), selected)),
        Span::styled(
            sanitize_text(&email.preview(preview_width)),
            with_selection_bg(Theme::text_muted(), selected),
        ),
    ]);

    (header, preview)
}

fn section_title(title: &'static str) -> Line<'static> {
    Line::from(Span::styled(title, Theme::label()))
}

fn sentiment_style(sentiment: Option<Sentiment>) -> Style {
    match sentiment {
        Some(Sentiment::Positive) => Theme::text_success(),
        Some(Sentiment::Negative) => Theme::text_error(),
        _ => Theme::text_muted(),
    }
}

fn render_preview(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(borders::panel())
        .border_style(Theme::border())
        .title(Span::styled(" Preview ", Theme::text_secondary()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let email = match state.selected_row() {
        Some(Row::Email(email)) => email,
        Some(Row::Header(group)) => {
            let verb = if state.is_collapsed(&group.label) {
                "expand"
            } else {
                "collapse"
            };
            let lines = vec![
                Line::from(Span::styled(display_label(&group.label), Theme::label())),
                Line::from(Span::styled(
                    format!("{} emails", group.len()),
                    Theme::text_secondary(),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    format!("Space or Enter to {}", verb),
                    Theme::text_muted(),
                )),
            ];
            frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
            return;
        }
        None => {
            let hints = vec![
                Line::from(Span::styled("No email selected", Theme::text_secondary())),
                Line::from(""),
                Line::from(Span::styled("j/k to navigate", Theme::text_muted())),
            ];
            frame.render_widget(Paragraph::new(hints).alignment(Alignment::Center), inner);
            return;
        }
    };

    let field = |name: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<10}", name), Theme::text_muted()),
            Span::styled(value, Theme::text()),
        ])
    };

    let mut lines = vec![
        field("From:", email.display_from().to_string()),
        field("To:", email.to.clone().unwrap_or_default()),
        field("Subject:", sanitize_text(email.display_subject())),
        field(
            "Label:",
            format!(
                "{} ({:.0}%)",
                display_label(email.label()),
                email.confidence_or_zero() * 100.0
            ),
        ),
    ];
    if let Some(sentiment) = email.sentiment {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<10}", "Sentiment:"), Theme::text_muted()),
            Span::styled(sentiment.as_str(), sentiment_style(Some(sentiment))),
        ]));
    }
    if email.needs_attention() {
        lines.push(Line::from(Span::styled(
            "Needs attention",
            Theme::text_warning(),
        )));
    }
    if state.is_eligible(email) {
        lines.push(Line::from(vec![
            Span::styled("R", Theme::help_key()),
            Span::styled(" to draft a reply", Theme::text_muted()),
        ]));
    } else {
        let marker = if email.kind == Some(MailView::Sent) {
            "Sent"
        } else {
            "Review only"
        };
        lines.push(Line::from(Span::styled(marker, Theme::text_muted())));
    }

    lines.push(Line::from(""));
    lines.push(section_title("Summary"));
    let summary = email
        .summary()
        .map(|s| sanitize_text(&s))
        .unwrap_or_else(|| NO_CONTENT.to_string());
    lines.push(Line::from(Span::styled(summary, Theme::text())));

    if let Some(processed) = email.processed_text(PROCESSED_TEXT_CHARS) {
        lines.push(Line::from(""));
        lines.push(section_title("Processed Text"));
        lines.push(Line::from(Span::styled(
            sanitize_text(&processed),
            Theme::text_secondary(),
        )));
    }

    lines.push(Line::from(""));
    lines.push(section_title("Message"));
    let body = email
        .body
        .as_deref()
        .map(sanitize_text)
        .unwrap_or_else(|| NO_CONTENT.to_string());
    lines.extend(body.lines().map(|l| Line::from(l.to_string())));

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, inner);
}
