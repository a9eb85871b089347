use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};

use super::keybindings::{Action, KeyBindings};
use crate::app::state::AppState;

#[derive(Debug, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Quit,
    Action(Action),
    Char(char),
    Backspace,
}

pub fn handle_input(event: Event, state: &AppState, bindings: &KeyBindings) -> InputResult {
    match event {
        Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
            handle_key(key_event, state, bindings)
        }
        _ => InputResult::Continue,
    }
}

fn handle_key(key: KeyEvent, state: &AppState, bindings: &KeyBindings) -> InputResult {
    // The reply popup is modal and captures typing
    if is_reply_mode(state) {
        return handle_reply_input(key, bindings);
    }

    if let Some(action) = bindings.get(&key) {
        return match action {
            Action::Quit => InputResult::Quit,
            // Popup-only actions do nothing on the mailbox screen
            Action::Send | Action::Regenerate | Action::Cancel => InputResult::Continue,
            action => InputResult::Action(action),
        };
    }

    InputResult::Continue
}

fn is_reply_mode(state: &AppState) -> bool {
    state.reply.is_some()
}

fn handle_reply_input(key: KeyEvent, bindings: &KeyBindings) -> InputResult {
    // Control keys first (Ctrl-S, Ctrl-G, Esc, Ctrl-C)
    if let Some(action) = bindings.get(&key) {
        match action {
            Action::Send | Action::Regenerate | Action::Cancel => {
                return InputResult::Action(action);
            }
            Action::Quit if key.code != KeyCode::Char('q') => return InputResult::Quit,
            _ => {}
        }
    }

    match key.code {
        KeyCode::Char(c) => InputResult::Char(c),
        KeyCode::Backspace => InputResult::Backspace,
        KeyCode::Enter => InputResult::Char('\n'),
        _ => InputResult::Continue,
    }
}
