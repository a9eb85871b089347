//! Reply popup: draft editor over the mailbox screen

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::state::ReplyView;
use crate::reply::{ReplyPhase, ReplyStage};

use super::components::centered_rect_constrained;
use super::status_bar::spinner_char;
use super::theme::{Theme, borders};
use super::widgets::{help_bar, sanitize_text, truncate_string};

pub fn render_reply_popup(frame: &mut Frame, area: Rect, reply: &ReplyView) {
    let popup = centered_rect_constrained(area, 40, 90, 12, 24);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(borders::popup())
        .border_style(Theme::border_focused())
        .title(Span::styled(
            format!(
                " Reply: {} ",
                truncate_string(&reply.subject, popup.width.saturating_sub(12) as usize)
            ),
            Theme::text_accent(),
        ));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // To + phase
            Constraint::Length(1), // Separator
            Constraint::Min(3),    // Draft
            Constraint::Length(if reply.error.is_some() { 2 } else { 0 }),
            Constraint::Length(1), // Hints
        ])
        .split(inner);

    let phase_style = match reply.phase {
        ReplyPhase::Failed(_) => Theme::text_error(),
        ReplyPhase::Drafted => Theme::text_success(),
        _ => Theme::text_warning(),
    };
    let phase = if reply.phase.is_busy() {
        format!("{} {}", spinner_char(), reply.phase.label())
    } else {
        reply.phase.label().to_string()
    };
    let header = Line::from(vec![
        Span::styled("To: ", Theme::text_muted()),
        Span::styled(reply.recipient.clone(), Theme::text()),
        Span::styled("  │  ", Theme::text_muted()),
        Span::styled(phase, phase_style),
    ]);
    frame.render_widget(Paragraph::new(header), chunks[0]);

    let separator = "─".repeat(chunks[1].width as usize);
    frame.render_widget(
        Paragraph::new(separator).style(Theme::border()),
        chunks[1],
    );

    render_draft(frame, chunks[2], reply);

    if let Some(error) = &reply.error {
        let paragraph = Paragraph::new(sanitize_text(error))
            .style(Theme::text_error())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, chunks[3]);
    }

    help_bar(frame, chunks[4], hints(reply.phase));
}

fn render_draft(frame: &mut Frame, area: Rect, reply: &ReplyView) {
    if reply.phase == ReplyPhase::Generating {
        let waiting = Paragraph::new(format!("{} Writing a draft...", spinner_char()))
            .style(Theme::text_muted());
        frame.render_widget(waiting, area);
        return;
    }

    let style = if reply.editable {
        Theme::text()
    } else {
        Theme::text_muted()
    };

    let mut lines: Vec<Line> = reply
        .draft
        .split('\n')
        .map(|l| Line::from(Span::styled(l.to_string(), style)))
        .collect();
    if reply.editable && let Some(last) = lines.last_mut() {
        last.spans.push(Span::styled("│", Theme::text_accent()));
    }

    // Follow the cursor at the end of the draft
    let overflow = lines.len().saturating_sub(area.height as usize);
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((overflow.min(u16::MAX as usize) as u16, 0));
    frame.render_widget(paragraph, area);
}

fn hints(phase: ReplyPhase) -> &'static [(&'static str, &'static str)] {
    match phase {
        ReplyPhase::Drafted | ReplyPhase::Failed(ReplyStage::Send) => {
            &[("Type", "edit"), ("^S", "send"), ("Esc", "discard")]
        }
        ReplyPhase::Failed(ReplyStage::Generation) | ReplyPhase::Idle => {
            &[("^G", "regenerate"), ("Esc", "discard")]
        }
        ReplyPhase::Sending => &[("", "sending...")],
        ReplyPhase::Generating | ReplyPhase::Sent => &[("Esc", "discard")],
    }
}
