use docview_types::Pane;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState, Padding, StatefulWidget, Widget},
};

use crate::projector::VisibleRow;
use crate::session::SessionState;
use crate::theme::{Glyphs, Theme};

/// Navigator pane: the projected rows of the document tree.
pub struct SidebarView<'a> {
    state: &'a SessionState,
    theme: &'a Theme,
}

impl<'a> SidebarView<'a> {
    pub fn new(state: &'a SessionState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }
}

impl<'a> Widget for SidebarView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }

        let focused = self.state.focus() == Pane::Sidebar;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(self.theme.border(focused))
            .title(Span::styled(" Documents ", self.theme.title()))
            .padding(Padding::horizontal(1));

        let rows = self.state.rows();
        let items: Vec<ListItem> = rows
            .iter()
            .map(|row| ListItem::new(row_line(row, self.theme)))
            .collect();

        let selected = (!rows.is_empty()).then_some(self.state.cursor());
        let mut list_state = ListState::default().with_selected(selected);
        let highlight = if focused {
            self.theme.cursor()
        } else {
            Style::default()
        };

        let list = List::new(items)
            .block(block)
            .highlight_symbol(self.theme.glyphs.cursor)
            .highlight_style(highlight);
        StatefulWidget::render(list, area, buf, &mut list_state);
    }
}

fn row_line(row: &VisibleRow<'_>, theme: &Theme) -> Line<'static> {
    let style = if row.is_selected {
        theme.selected()
    } else if row.node.is_dir {
        theme.directory()
    } else {
        Style::default()
    };
    Line::from(Span::styled(row_label(row, &theme.glyphs), style))
}

/// `"  ▾ name"`: two columns per depth, then the enumerator glyph.
pub fn row_label(row: &VisibleRow<'_>, glyphs: &Glyphs) -> String {
    let glyph = match (row.node.is_dir, row.is_expanded) {
        (true, true) => glyphs.expanded,
        (true, false) => glyphs.collapsed,
        (false, _) => glyphs.document,
    };
    format!("{}{} {}", "  ".repeat(row.depth), glyph, row.node.name)
}
