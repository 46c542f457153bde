use docview_types::{Key, KeyCode};
use ratatui::text::Line;

/// Vertically scrollable buffer of pre-wrapped lines.
///
/// The offset always stays within `0..=max_offset()`, including after the
/// content or the height changes.
#[derive(Debug, Clone, Default)]
pub struct ScrollViewport {
    lines: Vec<Line<'static>>,
    offset: usize,
    height: usize,
}

impl ScrollViewport {
    pub fn new(height: usize) -> Self {
        Self {
            lines: Vec::new(),
            offset: 0,
            height,
        }
    }

    pub fn set_content(&mut self, lines: Vec<Line<'static>>) {
        self.lines = lines;
        self.clamp();
    }

    pub fn set_height(&mut self, height: usize) {
        self.height = height;
        self.clamp();
    }

    pub fn lines(&self) -> &[Line<'static>] {
        &self.lines
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn max_offset(&self) -> usize {
        self.lines.len().saturating_sub(self.height)
    }

    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset.min(self.max_offset());
    }

    pub fn goto_top(&mut self) {
        self.offset = 0;
    }

    pub fn goto_bottom(&mut self) {
        self.offset = self.max_offset();
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.set_offset(self.offset.saturating_add(n));
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(n);
    }

    /// Apply a navigation key. Returns true when the offset moved.
    pub fn handle_key(&mut self, key: &Key) -> bool {
        let before = self.offset;
        let page = self.height.max(1);
        let half = (self.height / 2).max(1);

        match key.code {
            KeyCode::Up => self.scroll_up(1),
            KeyCode::Down => self.scroll_down(1),
            KeyCode::PageUp => self.scroll_up(page),
            KeyCode::PageDown => self.scroll_down(page),
            KeyCode::Home => self.goto_top(),
            KeyCode::End => self.goto_bottom(),
            KeyCode::Char(c) if key.ctrl => match c {
                'u' => self.scroll_up(half),
                'd' => self.scroll_down(half),
                _ => {}
            },
            KeyCode::Char(c) => match c {
                'k' => self.scroll_up(1),
                'j' => self.scroll_down(1),
                'b' => self.scroll_up(page),
                'f' | ' ' => self.scroll_down(page),
                'u' => self.scroll_up(half),
                'd' => self.scroll_down(half),
                'g' => self.goto_top(),
                'G' => self.goto_bottom(),
                _ => {}
            },
            _ => {}
        }

        self.offset != before
    }

    /// Lines currently inside the window.
    pub fn visible(&self) -> &[Line<'static>] {
        let end = self.offset.saturating_add(self.height).min(self.lines.len());
        &self.lines[self.offset.min(end)..end]
    }

    pub fn scroll_percent(&self) -> u16 {
        let total = self.lines.len();
        if total == 0 {
            return 0;
        }
        if total <= self.height {
            return 100;
        }
        let seen = (self.offset + self.height) * 100 / total;
        seen.min(100) as u16
    }

    fn clamp(&mut self) {
        self.offset = self.offset.min(self.max_offset());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(lines: usize, height: usize) -> ScrollViewport {
        let mut viewport = ScrollViewport::new(height);
        viewport.set_content((0..lines).map(|i| Line::from(format!("line {}", i))).collect());
        viewport
    }

    #[test]
    fn test_offset_is_bounded() {
        let mut v = viewport(30, 10);
        assert!(!v.handle_key(&Key::new(KeyCode::Up)));
        assert!(v.handle_key(&Key::new(KeyCode::End)));
        assert_eq!(v.offset(), 20);
        assert!(!v.handle_key(&Key::char('j')));
        assert_eq!(v.offset(), 20);
        assert!(v.handle_key(&Key::char('g')));
        assert_eq!(v.offset(), 0);
    }

    #[test]
    fn test_page_and_half_page() {
        let mut v = viewport(100, 10);
        v.handle_key(&Key::char(' '));
        assert_eq!(v.offset(), 10);
        v.handle_key(&Key::ctrl('d'));
        assert_eq!(v.offset(), 15);
        v.handle_key(&Key::char('u'));
        assert_eq!(v.offset(), 10);
        v.handle_key(&Key::new(KeyCode::PageUp));
        assert_eq!(v.offset(), 0);
    }

    #[test]
    fn test_unknown_key_does_not_move() {
        let mut v = viewport(100, 10);
        assert!(!v.handle_key(&Key::char('x')));
        assert!(!v.handle_key(&Key::new(KeyCode::Left)));
    }

    #[test]
    fn test_shrinking_content_clamps_offset() {
        let mut v = viewport(100, 10);
        v.goto_bottom();
        v.set_content(vec![Line::from("only")]);
        assert_eq!(v.offset(), 0);
        assert_eq!(v.visible().len(), 1);
    }

    #[test]
    fn test_growing_height_clamps_offset() {
        let mut v = viewport(20, 5);
        v.goto_bottom();
        assert_eq!(v.offset(), 15);
        v.set_height(18);
        assert_eq!(v.offset(), 2);
        assert_eq!(v.visible().len(), 18);
    }

    #[test]
    fn test_zero_height_shows_nothing() {
        let mut v = viewport(5, 0);
        v.goto_bottom();
        assert!(v.visible().is_empty());
        assert_eq!(v.offset(), 5);
    }

    #[test]
    fn test_scroll_percent() {
        assert_eq!(ScrollViewport::new(10).scroll_percent(), 0);
        assert_eq!(viewport(5, 10).scroll_percent(), 100);
        let mut v = viewport(40, 10);
        assert_eq!(v.scroll_percent(), 25);
        v.goto_bottom();
        assert_eq!(v.scroll_percent(), 100);
    }
}
