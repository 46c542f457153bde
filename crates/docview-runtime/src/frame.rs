//! Full-frame ANSI encoding of a rendered screen.
//!
//! Remote sessions have no ratatui backend, so the frame buffer is walked
//! cell by cell and written as crossterm commands into a byte vector that
//! is sent to the client in one write.

use std::io;

use docview_engine::{SessionState, Theme, buffer_lines, render_to_buffer};
use ratatui::buffer::Buffer;
use ratatui::crossterm::{
    cursor::{Hide, MoveTo, Show},
    queue,
    style::{
        Attribute, Color as TermColor, Print, ResetColor, SetAttribute, SetBackgroundColor,
        SetForegroundColor,
    },
    terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::style::{Color, Modifier};
use unicode_width::UnicodeWidthStr;

pub struct Frame {
    buffer: Buffer,
}

impl Frame {
    pub fn from_buffer(buffer: Buffer) -> Self {
        Self { buffer }
    }

    /// Render the session at its current geometry.
    pub fn render(state: &SessionState, theme: &Theme) -> Self {
        Self::from_buffer(render_to_buffer(state, theme))
    }

    pub fn width(&self) -> u16 {
        self.buffer.area.width
    }

    pub fn height(&self) -> u16 {
        self.buffer.area.height
    }

    pub fn to_plain_lines(&self) -> Vec<String> {
        buffer_lines(&self.buffer)
    }

    /// Encode the frame. `clear` wipes the screen first, which is needed
    /// after a resize so nothing outside the new frame survives.
    pub fn to_ansi(&self, clear: bool) -> io::Result<Vec<u8>> {
        let mut out = Vec::with_capacity(usize::from(self.width()) * usize::from(self.height()) * 2);
        if clear {
            queue!(out, Clear(ClearType::All))?;
        }
        queue!(out, MoveTo(0, 0))?;

        let area = self.buffer.area;
        let mut current: Option<(Color, Color, Modifier)> = None;

        for y in area.top()..area.bottom() {
            if y > area.top() {
                queue!(out, Print("\r\n"))?;
            }
            let mut skip = 0usize;
            for x in area.left()..area.right() {
                if skip > 0 {
                    skip -= 1;
                    continue;
                }
                let cell = &self.buffer[(x, y)];
                let style = (cell.fg, cell.bg, cell.modifier);
                if current != Some(style) {
                    write_style(&mut out, style)?;
                    current = Some(style);
                }
                let symbol = cell.symbol();
                skip = symbol.width().saturating_sub(1);
                queue!(out, Print(symbol))?;
            }
        }

        queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;
        Ok(out)
    }
}

fn write_style(out: &mut Vec<u8>, (fg, bg, modifier): (Color, Color, Modifier)) -> io::Result<()> {
    queue!(
        out,
        SetAttribute(Attribute::Reset),
        SetForegroundColor(TermColor::from(fg)),
        SetBackgroundColor(TermColor::from(bg))
    )?;
    for (flag, attribute) in [
        (Modifier::BOLD, Attribute::Bold),
        (Modifier::DIM, Attribute::Dim),
        (Modifier::ITALIC, Attribute::Italic),
        (Modifier::UNDERLINED, Attribute::Underlined),
        (Modifier::SLOW_BLINK, Attribute::SlowBlink),
        (Modifier::RAPID_BLINK, Attribute::RapidBlink),
        (Modifier::REVERSED, Attribute::Reverse),
        (Modifier::HIDDEN, Attribute::Hidden),
        (Modifier::CROSSED_OUT, Attribute::CrossedOut),
    ] {
        if modifier.contains(flag) {
            queue!(out, SetAttribute(attribute))?;
        }
    }
    Ok(())
}

/// Bytes that switch a fresh connection into full-screen mode.
pub fn enter_screen() -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    queue!(out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
    Ok(out)
}

/// Bytes that restore the client's screen before disconnecting.
pub fn leave_screen() -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    queue!(out, SetAttribute(Attribute::Reset), ResetColor, Show, LeaveAlternateScreen)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::layout::Rect;
    use ratatui::style::Style;

    fn buffer() -> Buffer {
        let mut buf = Buffer::empty(Rect::new(0, 0, 6, 2));
        buf.set_string(0, 0, "ab", Style::default().fg(Color::Rgb(0x7D, 0x56, 0xF4)));
        buf.set_string(0, 1, "cd", Style::default());
        buf
    }

    #[test]
    fn test_plain_lines() {
        let frame = Frame::from_buffer(buffer());
        assert_eq!(frame.to_plain_lines(), vec!["ab", "cd"]);
        assert_eq!((frame.width(), frame.height()), (6, 2));
    }

    #[test]
    fn test_ansi_encoding() -> io::Result<()> {
        let ansi = String::from_utf8_lossy(&Frame::from_buffer(buffer()).to_ansi(false)?).to_string();
        assert!(ansi.starts_with("\x1b[1;1H"));
        assert!(ansi.contains("38;2;125;86;244"));
        assert!(ansi.contains("ab"));
        assert_eq!(ansi.matches("\r\n").count(), 1);
        assert!(!ansi.contains("\x1b[2J"));
        Ok(())
    }

    #[test]
    fn test_named_and_indexed_colors() -> io::Result<()> {
        let mut buf = Buffer::empty(Rect::new(0, 0, 2, 1));
        buf.set_string(0, 0, "r", Style::default().fg(Color::Red));
        buf.set_string(1, 0, "i", Style::default().fg(Color::Indexed(240)));
        let ansi = String::from_utf8_lossy(&Frame::from_buffer(buf).to_ansi(false)?).to_string();
        assert!(ansi.contains("38;5;1m"));
        assert!(ansi.contains("38;5;240m"));
        Ok(())
    }

    #[test]
    fn test_clear_on_resize() -> io::Result<()> {
        let ansi = String::from_utf8_lossy(&Frame::from_buffer(buffer()).to_ansi(true)?).to_string();
        assert!(ansi.starts_with("\x1b[2J"));
        Ok(())
    }

    #[test]
    fn test_empty_frame() -> io::Result<()> {
        let frame = Frame::from_buffer(Buffer::empty(Rect::new(0, 0, 0, 0)));
        assert!(frame.to_plain_lines().is_empty());
        assert!(!frame.to_ansi(false)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_screen_mode_bytes() -> io::Result<()> {
        let enter = String::from_utf8_lossy(&enter_screen()?).to_string();
        assert!(enter.contains("\x1b[?1049h"));
        let leave = String::from_utf8_lossy(&leave_screen()?).to_string();
        assert!(leave.contains("\x1b[?1049l"));
        Ok(())
    }
}
