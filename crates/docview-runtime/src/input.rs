//! Decoding of terminal input bytes received on a session channel.
//!
//! Clients send keys the way a terminal emulator produces them: printable
//! UTF-8, C0 control bytes and CSI/SS3 escape sequences.

use docview_types::{Key, KeyCode, SessionEvent};

const ESC: u8 = 0x1b;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Data,
    Escape,
    Csi,
    Ss3,
}

/// Incremental decoder from client bytes to session events.
///
/// Sequences split across reads are carried over, except a lone ESC at the
/// end of a read, which is taken as the Esc key.
#[derive(Debug, Default)]
pub struct InputDecoder {
    state: State,
    csi: Vec<u8>,
    utf8: Vec<u8>,
    after_cr: bool,
}

impl InputDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, bytes: &[u8]) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        for &byte in bytes {
            self.byte(byte, &mut events);
        }
        if self.state == State::Escape {
            self.state = State::Data;
            events.push(key(KeyCode::Esc));
        }
        events
    }

    fn byte(&mut self, byte: u8, events: &mut Vec<SessionEvent>) {
        match self.state {
            State::Data => self.data(byte, events),
            State::Escape => match byte {
                b'[' => {
                    self.csi.clear();
                    self.state = State::Csi;
                }
                b'O' => self.state = State::Ss3,
                ESC => events.push(key(KeyCode::Esc)),
                _ => {
                    events.push(key(KeyCode::Esc));
                    self.state = State::Data;
                    self.data(byte, events);
                }
            },
            State::Csi => {
                if (0x40..=0x7e).contains(&byte) {
                    self.state = State::Data;
                    if let Some(code) = csi_key(&self.csi, byte) {
                        events.push(key(code));
                    }
                } else if self.csi.len() < 16 {
                    self.csi.push(byte);
                } else {
                    self.state = State::Data;
                }
            }
            State::Ss3 => {
                self.state = State::Data;
                if let Some(code) = final_key(byte) {
                    events.push(key(code));
                }
            }
        }
    }

    fn data(&mut self, byte: u8, events: &mut Vec<SessionEvent>) {
        let after_cr = std::mem::take(&mut self.after_cr);
        match byte {
            ESC => self.state = State::Escape,
            b'\r' => {
                self.after_cr = true;
                events.push(key(KeyCode::Enter));
            }
            // Some clients end a line with CR LF or CR NUL.
            b'\n' | 0 if after_cr => {}
            b'\n' => events.push(key(KeyCode::Enter)),
            b'\t' => events.push(key(KeyCode::Tab)),
            0x08 | 0x7f => events.push(key(KeyCode::Backspace)),
            0x01..=0x1a => {
                let c = char::from(b'a' + byte - 1);
                events.push(SessionEvent::Key(Key::ctrl(c)));
            }
            0x20..=0x7e => events.push(SessionEvent::Key(Key::char(char::from(byte)))),
            0x80..=0xfe => self.utf8_byte(byte, events),
            _ => {}
        }
    }

    fn utf8_byte(&mut self, byte: u8, events: &mut Vec<SessionEvent>) {
        self.utf8.push(byte);
        match std::str::from_utf8(&self.utf8) {
            Ok(text) => {
                events.extend(text.chars().map(|c| SessionEvent::Key(Key::char(c))));
                self.utf8.clear();
            }
            Err(err) if err.error_len().is_some() || self.utf8.len() >= 4 => self.utf8.clear(),
            Err(_) => {}
        }
    }
}

fn key(code: KeyCode) -> SessionEvent {
    SessionEvent::Key(Key::new(code))
}

fn final_key(byte: u8) -> Option<KeyCode> {
    match byte {
        b'A' => Some(KeyCode::Up),
        b'B' => Some(KeyCode::Down),
        b'C' => Some(KeyCode::Right),
        b'D' => Some(KeyCode::Left),
        b'H' => Some(KeyCode::Home),
        b'F' => Some(KeyCode::End),
        _ => None,
    }
}

fn csi_key(params: &[u8], final_byte: u8) -> Option<KeyCode> {
    match final_byte {
        b'Z' => Some(KeyCode::BackTab),
        b'~' => {
            let first = params.split(|b| *b == b';').next().unwrap_or_default();
            match first {
                b"1" | b"7" => Some(KeyCode::Home),
                b"4" | b"8" => Some(KeyCode::End),
                b"5" => Some(KeyCode::PageUp),
                b"6" => Some(KeyCode::PageDown),
                _ => None,
            }
        }
        other => final_key(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(events: &[SessionEvent]) -> Vec<String> {
        events
            .iter()
            .map(|event| match event {
                SessionEvent::Key(key) => key.to_string(),
                other => format!("{:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_printable_keys() {
        let mut decoder = InputDecoder::new();
        assert_eq!(keys(&decoder.feed(b"jkq/")), vec!["j", "k", "q", "/"]);
    }

    #[test]
    fn test_escape_sequences() {
        let mut decoder = InputDecoder::new();
        let events = decoder.feed(b"\x1b[A\x1b[B\x1bOC\x1b[D\x1b[5~\x1b[6~\x1b[H\x1b[4~");
        assert_eq!(
            keys(&events),
            vec!["up", "down", "right", "left", "pgup", "pgdown", "home", "end"]
        );
    }

    #[test]
    fn test_sequence_split_across_reads() {
        let mut decoder = InputDecoder::new();
        assert!(decoder.feed(b"\x1b[").is_empty());
        assert_eq!(keys(&decoder.feed(b"B")), vec!["down"]);
    }

    #[test]
    fn test_lone_escape_is_esc_key() {
        let mut decoder = InputDecoder::new();
        assert_eq!(keys(&decoder.feed(b"\x1b")), vec!["esc"]);
    }

    #[test]
    fn test_line_endings_and_controls() {
        let mut decoder = InputDecoder::new();
        let events = decoder.feed(b"\r\n\r\0\n\t\x03\x15\x04 ");
        assert_eq!(
            keys(&events),
            vec!["enter", "enter", "enter", "tab", "ctrl+c", "ctrl+u", "ctrl+d", "space"]
        );
    }

    #[test]
    fn test_utf8_split_across_reads() {
        let mut decoder = InputDecoder::new();
        let bytes = "é".as_bytes();
        assert!(decoder.feed(&bytes[..1]).is_empty());
        assert_eq!(
            decoder.feed(&bytes[1..]),
            vec![SessionEvent::Key(Key::char('é'))]
        );
    }
}
