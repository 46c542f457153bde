//! Input events delivered to a session by its host.
//!
//! Hosts translate whatever their transport produces (crossterm events,
//! SSH channel bytes) into these types, so the session logic never sees a
//! transport-specific representation.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Up,
    Down,
    Left,
    Right,
    Enter,
    Tab,
    BackTab,
    Esc,
    Backspace,
    PageUp,
    PageDown,
    Home,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub code: KeyCode,
    pub ctrl: bool,
}

impl Key {
    pub const fn new(code: KeyCode) -> Self {
        Self { code, ctrl: false }
    }

    pub const fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self {
            code: KeyCode::Char(c),
            ctrl: true,
        }
    }

    pub fn is_char(&self, c: char) -> bool {
        !self.ctrl && self.code == KeyCode::Char(c)
    }

    pub fn is_ctrl(&self, c: char) -> bool {
        self.ctrl && self.code == KeyCode::Char(c)
    }
}

impl From<KeyCode> for Key {
    fn from(code: KeyCode) -> Self {
        Key::new(code)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "ctrl+")?;
        }
        match self.code {
            KeyCode::Char(' ') => write!(f, "space"),
            KeyCode::Char(c) => write!(f, "{}", c),
            KeyCode::Up => write!(f, "up"),
            KeyCode::Down => write!(f, "down"),
            KeyCode::Left => write!(f, "left"),
            KeyCode::Right => write!(f, "right"),
            KeyCode::Enter => write!(f, "enter"),
            KeyCode::Tab => write!(f, "tab"),
            KeyCode::BackTab => write!(f, "shift+tab"),
            KeyCode::Esc => write!(f, "esc"),
            KeyCode::Backspace => write!(f, "backspace"),
            KeyCode::PageUp => write!(f, "pgup"),
            KeyCode::PageDown => write!(f, "pgdown"),
            KeyCode::Home => write!(f, "home"),
            KeyCode::End => write!(f, "end"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Key(Key),
    Resize { width: u16, height: u16 },
}

impl From<Key> for SessionEvent {
    fn from(key: Key) -> Self {
        SessionEvent::Key(key)
    }
}

/// Which pane currently consumes navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pane {
    #[default]
    Sidebar,
    Content,
}

impl Pane {
    pub fn toggle(self) -> Self {
        match self {
            Pane::Sidebar => Pane::Content,
            Pane::Content => Pane::Sidebar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display_matches_legend_names() {
        assert_eq!(Key::ctrl('c').to_string(), "ctrl+c");
        assert_eq!(Key::char(' ').to_string(), "space");
        assert_eq!(Key::new(KeyCode::PageDown).to_string(), "pgdown");
        assert_eq!(Key::char('q').to_string(), "q");
    }

    #[test]
    fn test_char_helpers_respect_ctrl() {
        assert!(Key::char('d').is_char('d'));
        assert!(!Key::ctrl('d').is_char('d'));
        assert!(Key::ctrl('d').is_ctrl('d'));
    }

    #[test]
    fn test_pane_toggle_round_trip() {
        assert_eq!(Pane::default(), Pane::Sidebar);
        assert_eq!(Pane::Sidebar.toggle(), Pane::Content);
        assert_eq!(Pane::Sidebar.toggle().toggle(), Pane::Sidebar);
    }
}
