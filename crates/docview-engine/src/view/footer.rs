use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::theme::Theme;

pub const HELP_LEGEND: &str = "↑/k up • ↓/j down • enter open • tab switch pane • q quit";

/// One-line help legend with the scroll position on the right.
pub struct FooterView<'a> {
    scroll_percent: u16,
    theme: &'a Theme,
}

impl<'a> FooterView<'a> {
    pub fn new(scroll_percent: u16, theme: &'a Theme) -> Self {
        Self {
            scroll_percent,
            theme,
        }
    }
}

impl<'a> Widget for FooterView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }

        let chunks = Layout::horizontal([Constraint::Min(0), Constraint::Length(5)]).split(area);

        Paragraph::new(Line::from(Span::styled(HELP_LEGEND, self.theme.help())))
            .render(chunks[0], buf);
        Paragraph::new(Line::from(Span::styled(
            format!("{}%", self.scroll_percent),
            self.theme.help(),
        )))
        .alignment(Alignment::Right)
        .render(chunks[1], buf);
    }
}
