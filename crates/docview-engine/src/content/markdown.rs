//! Markdown to styled terminal lines.
//!
//! Output is already wrapped to the requested width, so the content pane can
//! scroll it line by line without re-wrapping.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::theme::Theme;

#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    theme: Theme,
}

impl MarkdownRenderer {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn render(&self, source: &str, width: u16) -> Vec<Line<'static>> {
        let mut writer = Writer::new(&self.theme, usize::from(width.max(1)));
        for event in Parser::new_ext(source, options()) {
            writer.event(event);
        }
        writer.finish()
    }
}

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[derive(Debug, Clone, Copy)]
enum ListKind {
    Bullet,
    Ordered(u64),
}

#[derive(Debug)]
struct ListLevel {
    kind: ListKind,
    marker_width: usize,
}

struct Writer<'t> {
    theme: &'t Theme,
    width: usize,
    lines: Vec<Line<'static>>,
    inline: Vec<Span<'static>>,
    styles: Vec<Style>,
    quote_depth: usize,
    lists: Vec<ListLevel>,
    pending_marker: Option<String>,
    code_block: Option<String>,
    links: Vec<String>,
    table_cell: usize,
}

impl<'t> Writer<'t> {
    fn new(theme: &'t Theme, width: usize) -> Self {
        Self {
            theme,
            width,
            lines: Vec::new(),
            inline: Vec::new(),
            styles: Vec::new(),
            quote_depth: 0,
            lists: Vec::new(),
            pending_marker: None,
            code_block: None,
            links: Vec::new(),
            table_cell: 0,
        }
    }

    fn event(&mut self, event: Event<'_>) {
        if self.code_block.is_some() {
            match event {
                Event::Text(text) => {
                    if let Some(code) = self.code_block.as_mut() {
                        code.push_str(&text);
                    }
                }
                Event::End(TagEnd::CodeBlock) => {
                    let code = self.code_block.take().unwrap_or_default();
                    self.push_code(&code);
                    self.blank();
                }
                _ => {}
            }
            return;
        }

        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                let style = self.style().patch(self.theme.code());
                self.inline.push(Span::styled(code.to_string(), style));
            }
            Event::SoftBreak => self.text(" "),
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                let rule = "─".repeat(self.width.min(80));
                self.lines.push(Line::from(Span::styled(rule, self.theme.help())));
                self.blank();
            }
            Event::TaskListMarker(done) => self.text(if done { "[x] " } else { "[ ] " }),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush();
                let level = heading_level(level);
                self.styles.push(self.theme.heading(level));
                let marker = format!("{} ", "#".repeat(usize::from(level)));
                self.text(&marker);
            }
            Tag::BlockQuote(_) => {
                self.flush();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(_) => {
                self.flush();
                self.code_block = Some(String::new());
            }
            Tag::List(start) => {
                self.flush();
                let kind = match start {
                    Some(n) => ListKind::Ordered(n),
                    None => ListKind::Bullet,
                };
                self.lists.push(ListLevel {
                    kind,
                    marker_width: 0,
                });
            }
            Tag::Item => {
                self.flush();
                if let Some(level) = self.lists.last_mut() {
                    let marker = match &mut level.kind {
                        ListKind::Bullet => "• ".to_string(),
                        ListKind::Ordered(n) => {
                            let marker = format!("{}. ", n);
                            *n += 1;
                            marker
                        }
                    };
                    level.marker_width = marker.width();
                    self.pending_marker = Some(marker);
                }
            }
            Tag::Emphasis => self.styles.push(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.styles.push(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => self
                .styles
                .push(Style::default().add_modifier(Modifier::CROSSED_OUT)),
            Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. } => {
                self.styles.push(self.theme.link());
                self.links.push(dest_url.to_string());
            }
            Tag::Table(_) => self.flush(),
            Tag::TableHead => {
                self.table_cell = 0;
                self.styles.push(Style::default().add_modifier(Modifier::BOLD));
            }
            Tag::TableRow => self.table_cell = 0,
            Tag::TableCell => {
                if self.table_cell > 0 {
                    self.inline.push(Span::styled(" │ ", self.theme.help()));
                }
                self.table_cell += 1;
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush();
                self.blank();
            }
            TagEnd::Heading(_) => {
                self.flush();
                self.styles.pop();
                self.blank();
            }
            TagEnd::BlockQuote(_) => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.blank();
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::Item => {
                self.flush();
                self.pending_marker = None;
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.styles.pop();
            }
            TagEnd::Link | TagEnd::Image => {
                self.styles.pop();
                if let Some(dest) = self.links.pop()
                    && !dest.is_empty()
                    && !dest.starts_with('#')
                {
                    self.inline
                        .push(Span::styled(format!(" ({})", dest), self.theme.help()));
                }
            }
            TagEnd::TableHead => {
                self.flush();
                self.styles.pop();
            }
            TagEnd::TableRow => self.flush(),
            TagEnd::Table => self.blank(),
            _ => {}
        }
    }

    fn style(&self) -> Style {
        let base = if self.quote_depth > 0 {
            self.theme.quote()
        } else {
            Style::default()
        };
        self.styles.iter().fold(base, |acc, style| acc.patch(*style))
    }

    fn text(&mut self, text: &str) {
        let style = self.style();
        self.inline.push(Span::styled(text.to_string(), style));
    }

    fn prefixes(&mut self) -> (String, String) {
        let quote = "│ ".repeat(self.quote_depth);
        let outer: usize = self
            .lists
            .iter()
            .rev()
            .skip(1)
            .map(|level| level.marker_width)
            .sum();
        let indent = format!("{}{}", quote, " ".repeat(outer));

        let inner = self.lists.last().map(|level| level.marker_width).unwrap_or(0);
        let continuation = format!("{}{}", indent, " ".repeat(inner));
        let first = match self.pending_marker.take() {
            Some(marker) => format!("{}{}", indent, marker),
            None => continuation.clone(),
        };
        (first, continuation)
    }

    /// Wrap the pending inline spans into output lines.
    fn flush(&mut self) {
        if self.inline.is_empty() && self.pending_marker.is_none() {
            return;
        }

        let (first, continuation) = self.prefixes();
        let available = self.width.saturating_sub(first.width()).max(1);
        let spans = std::mem::take(&mut self.inline);

        for (index, wrapped) in wrap_spans(&spans, available).into_iter().enumerate() {
            let prefix = if index == 0 { &first } else { &continuation };
            let mut line = Vec::with_capacity(wrapped.len() + 1);
            if !prefix.is_empty() {
                line.push(Span::styled(prefix.clone(), self.theme.help()));
            }
            line.extend(wrapped);
            self.lines.push(Line::from(line));
        }
    }

    fn push_code(&mut self, code: &str) {
        let prefix = format!("{}  ", "│ ".repeat(self.quote_depth));
        let available = self.width.saturating_sub(prefix.width()).max(1);
        let style = self.theme.code();

        for source_line in code.lines() {
            let mut rest = source_line;
            loop {
                let (head, tail) = split_at_width(rest, available);
                self.lines.push(Line::from(vec![
                    Span::styled(prefix.clone(), self.theme.help()),
                    Span::styled(head.to_string(), style),
                ]));
                if tail.is_empty() {
                    break;
                }
                rest = tail;
            }
        }
    }

    fn blank(&mut self) {
        if self.lines.last().is_some_and(|line| line.width() > 0) {
            self.lines.push(Line::default());
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        if let Some(code) = self.code_block.take() {
            self.push_code(&code);
        }
        self.flush();
        while self.lines.last().is_some_and(|line| line.width() == 0) {
            self.lines.pop();
        }
        self.lines
    }
}

/// Greedy word wrap that keeps span styles intact.
fn wrap_spans(spans: &[Span<'static>], width: usize) -> Vec<Vec<Span<'static>>> {
    let mut lines: Vec<Vec<Span<'static>>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut current_width = 0usize;

    for span in spans {
        for token in tokenize(&span.content) {
            if token.chars().all(char::is_whitespace) {
                if current_width == 0 {
                    continue;
                }
                if current_width + 1 > width {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0;
                    continue;
                }
                push_piece(&mut current, " ", span.style);
                current_width += 1;
                continue;
            }

            if current_width > 0 && current_width + token.width() > width {
                trim_trailing_space(&mut current);
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }

            let mut rest = token;
            while rest.width() > width - current_width {
                let (head, tail) = split_at_width(rest, width - current_width);
                push_piece(&mut current, head, span.style);
                lines.push(std::mem::take(&mut current));
                current_width = 0;
                rest = tail;
            }
            if !rest.is_empty() {
                push_piece(&mut current, rest, span.style);
                current_width += rest.width();
            }
        }
    }

    trim_trailing_space(&mut current);
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;

    for (index, c) in text.char_indices() {
        let is_space = c.is_whitespace();
        if in_space.is_some_and(|prev| prev != is_space) {
            tokens.push(&text[start..index]);
            start = index;
        }
        in_space = Some(is_space);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

/// Split off the longest prefix no wider than `max` columns. Always takes at
/// least one character so callers make progress.
fn split_at_width(text: &str, max: usize) -> (&str, &str) {
    let mut used = 0usize;
    for (index, c) in text.char_indices() {
        let w = c.width().unwrap_or(0);
        if used + w > max && index > 0 {
            return text.split_at(index);
        }
        used += w;
    }
    (text, "")
}

fn push_piece(line: &mut Vec<Span<'static>>, piece: &str, style: Style) {
    if let Some(last) = line.last_mut()
        && last.style == style
    {
        last.content.to_mut().push_str(piece);
        return;
    }
    line.push(Span::styled(piece.to_string(), style));
}

fn trim_trailing_space(line: &mut Vec<Span<'static>>) {
    while let Some(last) = line.last_mut() {
        let trimmed = last.content.trim_end();
        if trimmed.is_empty() {
            line.pop();
            continue;
        }
        if trimmed.len() != last.content.len() {
            last.content = trimmed.to_string().into();
        }
        break;
    }
}
