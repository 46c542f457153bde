//! Colors, styles and glyphs shared by every session.
//!
//! Built once from configuration at startup and handed to the renderer by
//! reference; nothing in the render path reads ambient globals.

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyphs {
    pub cursor: &'static str,
    pub expanded: &'static str,
    pub collapsed: &'static str,
    pub document: &'static str,
}

impl Default for Glyphs {
    fn default() -> Self {
        Self {
            cursor: "❯ ",
            expanded: "▾",
            collapsed: "▸",
            document: "•",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub accent: Color,
    pub muted: Color,
    pub code: Color,
    pub glyphs: Glyphs,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Rgb(0x7D, 0x56, 0xF4),
            muted: Color::Indexed(240),
            code: Color::Rgb(0xE5, 0xC0, 0x7B),
            glyphs: Glyphs::default(),
        }
    }
}

impl Theme {
    pub fn border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.accent)
        } else {
            Style::default().fg(self.muted)
        }
    }

    pub fn title(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn selected(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn cursor(&self) -> Style {
        Style::default().add_modifier(Modifier::REVERSED)
    }

    pub fn directory(&self) -> Style {
        Style::default().add_modifier(Modifier::BOLD)
    }

    pub fn help(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn heading(&self, level: u8) -> Style {
        let style = Style::default().add_modifier(Modifier::BOLD);
        match level {
            1 => style.fg(self.accent).add_modifier(Modifier::UNDERLINED),
            2 => style.fg(self.accent),
            _ => style,
        }
    }

    pub fn code(&self) -> Style {
        Style::default().fg(self.code)
    }

    pub fn quote(&self) -> Style {
        Style::default().fg(self.muted).add_modifier(Modifier::ITALIC)
    }

    pub fn link(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::UNDERLINED)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(Color::Red)
    }
}
