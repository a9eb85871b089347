//! Bars shared by every screen, plus text helpers

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::theme::Theme;

pub fn error_bar(frame: &mut Frame, area: Rect, message: &str) {
    let paragraph = Paragraph::new(format!(" Error: {} ", message)).style(Theme::error_bar());
    frame.render_widget(paragraph, area);
}

/// Key hints, dropping trailing hints that do not fit the width
pub fn help_bar(frame: &mut Frame, area: Rect, hints: &[(&str, &str)]) {
    let available_width = area.width as usize;

    // " key desc │ " per hint
    let mut total_width = 0;
    let mut hints_to_show = 0;
    for (i, (key, desc)) in hints.iter().enumerate() {
        let separator = if i + 1 < hints.len() { 3 } else { 1 };
        let width = key.width() + 2 + desc.width() + separator;
        if total_width + width > available_width {
            break;
        }
        total_width += width;
        hints_to_show += 1;
    }
    hints_to_show = hints_to_show.max(1).min(hints.len());

    let mut spans: Vec<Span> = Vec::new();
    for (i, (key, desc)) in hints.iter().take(hints_to_show).enumerate() {
        spans.push(Span::styled(format!(" {} ", key), Theme::help_key()));
        spans.push(Span::styled(desc.to_string(), Theme::help_desc()));
        if i + 1 < hints_to_show {
            spans.push(Span::styled(" │ ", Theme::text_muted()));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Fit `s` into `max_width` terminal columns, marking a cut with an ellipsis
pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let budget = max_width.saturating_sub(1);
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    if max_width > 0 {
        out.push('…');
    }
    out
}

/// Strip ANSI CSI sequences; other control characters except newline and tab become spaces
pub fn sanitize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_escape = false;
    let mut prev = '\0';

    for c in text.chars() {
        if in_escape {
            // CSI ends at its final byte
            in_escape = !c.is_ascii_alphabetic();
        } else if prev == '\x1b' && c == '[' {
            in_escape = true;
        } else if c != '\x1b' {
            let keep = !c.is_control() || matches!(c, '\n' | '\t');
            out.push(if keep { c } else { ' ' });
        }
        prev = c;
    }

    out
}
