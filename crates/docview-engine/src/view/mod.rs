//! Frame composition: sidebar and content side by side, footer below.
//!
//! Views borrow the session state and the theme and only map them onto
//! ratatui widgets. Every view returns early on an empty area, so any
//! terminal size, including 0x0, renders without panicking.

mod content;
mod footer;
mod sidebar;

pub use content::ContentView;
pub use footer::{FooterView, HELP_LEGEND};
pub use sidebar::{SidebarView, row_label};

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

use crate::layout::ScreenLayout;
use crate::session::SessionState;
use crate::theme::Theme;

pub struct ScreenView<'a> {
    state: &'a SessionState,
    theme: &'a Theme,
}

impl<'a> ScreenView<'a> {
    pub fn new(state: &'a SessionState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }
}

impl<'a> Widget for ScreenView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }

        let layout = ScreenLayout::compute(area, self.state.layout_config());
        SidebarView::new(self.state, self.theme).render(layout.sidebar, buf);
        ContentView::new(self.state, self.theme).render(layout.content, buf);
        FooterView::new(self.state.viewport().scroll_percent(), self.theme)
            .render(layout.footer, buf);
    }
}

/// Render the whole screen at the session's current size.
pub fn render_to_buffer(state: &SessionState, theme: &Theme) -> Buffer {
    let (width, height) = state.size();
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    ScreenView::new(state, theme).render(area, &mut buf);
    buf
}

/// Text content of each buffer row, trailing blanks trimmed.
pub fn buffer_lines(buf: &Buffer) -> Vec<String> {
    let area = buf.area;
    (area.top()..area.bottom())
        .map(|y| {
            let mut line = String::new();
            let mut skip = 0usize;
            for x in area.left()..area.right() {
                if skip > 0 {
                    skip -= 1;
                    continue;
                }
                let symbol = buf[(x, y)].symbol();
                skip = symbol.width().saturating_sub(1);
                line.push_str(symbol);
            }
            line.trim_end().to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docview_types::{DocumentNode, Key, KeyCode, SessionEvent};
    use crate::content::{ContentStatus, RenderedContent};
    use crate::layout::LayoutConfig;
    use ratatui::text::Line;
    use std::sync::Arc;

    fn tree() -> Arc<DocumentNode> {
        Arc::new(DocumentNode::dir(
            "docs",
            "docs",
            vec![
                DocumentNode::file("work.md", "docs/work.md"),
                DocumentNode::dir(
                    "skills",
                    "docs/skills",
                    vec![
                        DocumentNode::file("a.md", "docs/skills/a.md"),
                        DocumentNode::file("b.md", "docs/skills/b.md"),
                    ],
                ),
            ],
        ))
    }

    fn state_at(width: u16, height: u16) -> SessionState {
        let state = SessionState::new(tree(), LayoutConfig::default());
        let (mut state, _) = state.update(&SessionEvent::Resize { width, height });
        state.apply_content(
            RenderedContent {
                lines: vec![Line::from("# Skills"), Line::from(""), Line::from("body")],
                status: ContentStatus::Rendered,
            },
            true,
        );
        state
    }

    #[test]
    fn test_screen_composition() {
        let state = state_at(80, 12);
        let lines = buffer_lines(&render_to_buffer(&state, &Theme::default()));

        assert_eq!(lines.len(), 12);
        assert!(lines[0].starts_with("╭ Documents "));
        assert!(lines[0].contains("╭ a.md "));
        assert!(lines[1].starts_with("│   ▾ skills"));
        assert!(lines[2].starts_with("│ ❯   • a.md"));
        assert!(lines[3].starts_with("│     • b.md"));
        assert!(lines[4].starts_with("│   • work.md"));
        assert!(lines[1].contains("│  # Skills"));
        assert!(lines[3].contains("│  body"));
        assert!(lines[11].starts_with(HELP_LEGEND));
        assert!(lines[11].ends_with("100%"));
    }

    #[test]
    fn test_sidebar_rows_have_cursor_and_glyphs() {
        let state = state_at(80, 12);
        let labels: Vec<String> = state
            .rows()
            .iter()
            .map(|row| row_label(row, &Theme::default().glyphs))
            .collect();
        insta::assert_debug_snapshot!(labels, @r#"
        [
            "▾ skills",
            "  • a.md",
            "  • b.md",
            "• work.md",
        ]
        "#);
    }

    #[test]
    fn test_focus_moves_border_color() {
        let theme = Theme::default();
        let state = state_at(80, 12);
        let buf = render_to_buffer(&state, &theme);
        assert_eq!(buf[(0, 0)].fg, theme.accent);
        assert_eq!(buf[(32, 0)].fg, theme.muted);

        let (state, _) = state.update(&SessionEvent::Key(Key::new(KeyCode::Tab)));
        let buf = render_to_buffer(&state, &theme);
        assert_eq!(buf[(0, 0)].fg, theme.muted);
        assert_eq!(buf[(32, 0)].fg, theme.accent);
    }

    #[test]
    fn test_zero_and_tiny_sizes_do_not_panic() {
        let theme = Theme::default();
        for (width, height) in [(0, 0), (0, 10), (10, 0), (1, 1), (3, 2), (33, 3)] {
            let state = state_at(width, height);
            let buf = render_to_buffer(&state, &theme);
            assert_eq!(buffer_lines(&buf).len(), usize::from(height));
        }
    }
}
