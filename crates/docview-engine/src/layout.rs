//! Screen geometry: how the terminal is split between sidebar, content and
//! footer, and which wrap width the content renderer gets.
//!
//! All arithmetic saturates. A zero-sized terminal produces zero-sized
//! regions, never an underflow.

use ratatui::layout::Rect;

/// Sidebar border plus one column of padding on each side.
pub const SIDEBAR_FRAME: u16 = 4;
/// Content border plus two columns of padding on each side.
pub const CONTENT_FRAME_H: u16 = 6;
/// Content top and bottom border.
pub const CONTENT_FRAME_V: u16 = 2;
pub const FOOTER_HEIGHT: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Columns available to sidebar rows, excluding border and padding.
    pub sidebar_width: u16,
    /// Ceiling for the content wrap width.
    pub max_content_width: u16,
    /// Floor for the content wrap width.
    pub min_wrap_width: u16,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            sidebar_width: 28,
            max_content_width: 100,
            min_wrap_width: 10,
        }
    }
}

impl LayoutConfig {
    /// `max(min_wrap, min(max_content, inner_width))`
    pub fn wrap_width(&self, content_inner_width: u16) -> u16 {
        content_inner_width
            .min(self.max_content_width)
            .max(self.min_wrap_width)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenLayout {
    pub sidebar: Rect,
    pub content: Rect,
    pub footer: Rect,
}

impl ScreenLayout {
    pub fn compute(area: Rect, config: &LayoutConfig) -> Self {
        let footer_height = FOOTER_HEIGHT.min(area.height);
        let body_height = area.height - footer_height;

        let sidebar_width = config
            .sidebar_width
            .saturating_add(SIDEBAR_FRAME)
            .min(area.width);
        let content_width = area.width - sidebar_width;

        Self {
            sidebar: Rect::new(area.x, area.y, sidebar_width, body_height),
            content: Rect::new(area.x + sidebar_width, area.y, content_width, body_height),
            footer: Rect::new(area.x, area.y + body_height, area.width, footer_height),
        }
    }

    pub fn for_size(width: u16, height: u16, config: &LayoutConfig) -> Self {
        Self::compute(Rect::new(0, 0, width, height), config)
    }

    /// Columns inside the content border and padding.
    pub fn content_inner_width(&self) -> u16 {
        self.content.width.saturating_sub(CONTENT_FRAME_H)
    }

    /// Rows inside the content border; this is the scroll viewport height.
    pub fn content_inner_height(&self) -> u16 {
        self.content.height.saturating_sub(CONTENT_FRAME_V)
    }
}
