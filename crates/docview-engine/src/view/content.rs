use docview_types::Pane;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::Span,
    widgets::{Block, BorderType, Borders, Padding, Paragraph, Widget},
};

use crate::session::SessionState;
use crate::theme::Theme;

/// Document pane: the visible window of the scroll viewport.
pub struct ContentView<'a> {
    state: &'a SessionState,
    theme: &'a Theme,
}

impl<'a> ContentView<'a> {
    pub fn new(state: &'a SessionState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }
}

impl<'a> Widget for ContentView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }

        let focused = self.state.focus() == Pane::Content;
        let title = self.state.selected_name().unwrap_or("No document");
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(self.theme.border(focused))
            .title(Span::styled(format!(" {} ", title), self.theme.title()))
            .padding(Padding::horizontal(2));

        // Lines are pre-wrapped, so the paragraph only clips.
        let visible = self.state.viewport().visible().to_vec();
        Paragraph::new(visible).block(block).render(area, buf);
    }
}
