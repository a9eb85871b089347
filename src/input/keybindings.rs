use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Up,
    Down,
    Top,
    Bottom,
    /// Collapse or expand the label group under the selection
    ToggleGroup,
    NextView,
    ShowInbox,
    ShowSent,
    Quit,
    Refresh,
    /// Open the reply popup for the selected email
    Reply,
    Send,
    Regenerate,
    Cancel,
}

/// Key map for the mailbox screen. The reply popup captures text input and
/// only consults the map for its control keys.
pub struct KeyBindings {
    bindings: HashMap<KeyEvent, Action>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

/// Default key map, grouped the way the help bar presents it
const DEFAULT_BINDINGS: &[(KeyCode, KeyModifiers, Action)] = &[
    // Movement: vim keys and arrows
    (KeyCode::Char('j'), KeyModifiers::NONE, Action::Down),
    (KeyCode::Char('k'), KeyModifiers::NONE, Action::Up),
    (KeyCode::Down, KeyModifiers::NONE, Action::Down),
    (KeyCode::Up, KeyModifiers::NONE, Action::Up),
    (KeyCode::Char('g'), KeyModifiers::NONE, Action::Top),
    (KeyCode::Char('G'), KeyModifiers::SHIFT, Action::Bottom),
    (KeyCode::Home, KeyModifiers::NONE, Action::Top),
    (KeyCode::End, KeyModifiers::NONE, Action::Bottom),
    (KeyCode::Char(' '), KeyModifiers::NONE, Action::ToggleGroup),
    // Inbox / Sent
    (KeyCode::Tab, KeyModifiers::NONE, Action::NextView),
    (KeyCode::Char('1'), KeyModifiers::NONE, Action::ShowInbox),
    (KeyCode::Char('2'), KeyModifiers::NONE, Action::ShowSent),
    (KeyCode::Char('q'), KeyModifiers::NONE, Action::Quit),
    (KeyCode::Char('c'), KeyModifiers::CONTROL, Action::Quit),
    (KeyCode::Char('r'), KeyModifiers::NONE, Action::Refresh),
    (KeyCode::F(5), KeyModifiers::NONE, Action::Refresh),
    (KeyCode::Char('R'), KeyModifiers::SHIFT, Action::Reply),
    (KeyCode::Enter, KeyModifiers::NONE, Action::Reply),
    // Only meaningful while the reply popup is open
    (KeyCode::Char('s'), KeyModifiers::CONTROL, Action::Send),
    (KeyCode::Char('g'), KeyModifiers::CONTROL, Action::Regenerate),
    (KeyCode::Esc, KeyModifiers::NONE, Action::Cancel),
];

impl KeyBindings {
    pub fn new() -> Self {
        let bindings = DEFAULT_BINDINGS
            .iter()
            .map(|&(code, modifiers, action)| (KeyEvent::new(code, modifiers), action))
            .collect();
        Self { bindings }
    }

    pub fn get(&self, event: &KeyEvent) -> Option<Action> {
        self.bindings.get(event).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn shift_key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::SHIFT)
    }

    fn ctrl_key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn key_code(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_navigation_bindings() {
        let bindings = KeyBindings::new();

        assert_eq!(bindings.get(&key('j')), Some(Action::Down));
        assert_eq!(bindings.get(&key_code(KeyCode::Up)), Some(Action::Up));
        assert_eq!(bindings.get(&key('q')), Some(Action::Quit));
        assert_eq!(bindings.get(&key(' ')), Some(Action::ToggleGroup));
    }

    #[test]
    fn test_view_and_reply_bindings() {
        let bindings = KeyBindings::new();

        assert_eq!(bindings.get(&key_code(KeyCode::Tab)), Some(Action::NextView));
        assert_eq!(bindings.get(&key('2')), Some(Action::ShowSent));
        assert_eq!(bindings.get(&key('r')), Some(Action::Refresh));
        assert_eq!(bindings.get(&shift_key('R')), Some(Action::Reply));
        assert_eq!(bindings.get(&ctrl_key('s')), Some(Action::Send));
        assert_eq!(bindings.get(&ctrl_key('x')), None);
    }
}
