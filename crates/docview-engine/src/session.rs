//! Per-session view model and its transition function.
//!
//! A `SessionState` is owned by exactly one host task. Hosts feed it
//! `SessionEvent`s one at a time through [`SessionState::update`], act on the
//! returned [`Command`] (reload content, redraw, disconnect) and never touch
//! the state in between.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use docview_types::{DocumentNode, Key, KeyCode, Pane, SessionEvent};
use tracing::{debug, trace};

use crate::content::{ContentPipeline, RenderedContent, ScrollViewport};
use crate::layout::{LayoutConfig, ScreenLayout};
use crate::projector::{ExpansionSet, VisibleRow, find_first_document, flatten, position_of, project};

/// Side effect requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Nothing changed; do not redraw.
    None,
    Render,
    /// Re-read and re-render the selected document, then redraw.
    Reload { reset_scroll: bool },
    Quit,
}

impl Command {
    /// Combine two commands, keeping the strongest.
    pub fn merge(self, other: Command) -> Command {
        match (self, other) {
            (Command::Quit, _) | (_, Command::Quit) => Command::Quit,
            (Command::Reload { reset_scroll: a }, Command::Reload { reset_scroll: b }) => {
                Command::Reload {
                    reset_scroll: a || b,
                }
            }
            (reload @ Command::Reload { .. }, _) | (_, reload @ Command::Reload { .. }) => reload,
            (Command::Render, _) | (_, Command::Render) => Command::Render,
            (Command::None, Command::None) => Command::None,
        }
    }

    pub fn needs_render(&self) -> bool {
        !matches!(self, Command::None | Command::Quit)
    }
}

#[derive(Debug, Clone)]
pub struct SessionState {
    tree: Arc<DocumentNode>,
    layout_config: LayoutConfig,
    expansion: ExpansionSet,
    cursor: usize,
    selected: Option<PathBuf>,
    focus: Pane,
    width: u16,
    height: u16,
    layout: ScreenLayout,
    viewport: ScrollViewport,
    initialized: bool,
    quit: bool,
}

impl SessionState {
    pub fn new(tree: Arc<DocumentNode>, layout_config: LayoutConfig) -> Self {
        Self {
            tree,
            layout_config,
            expansion: ExpansionSet::new(),
            cursor: 0,
            selected: None,
            focus: Pane::Sidebar,
            width: 0,
            height: 0,
            layout: ScreenLayout::default(),
            viewport: ScrollViewport::new(0),
            initialized: false,
            quit: false,
        }
    }

    /// Apply one input event, returning the next state and the side effect
    /// the host must perform.
    pub fn update(mut self, event: &SessionEvent) -> (Self, Command) {
        let mut command = Command::None;
        if !self.initialized {
            command = self.initialize();
        }

        let handled = match event {
            SessionEvent::Key(key) => self.handle_key(key),
            SessionEvent::Resize { width, height } => self.resize(*width, *height),
        };
        let command = command.merge(handled);

        trace!(?event, ?command, cursor = self.cursor, focus = ?self.focus, "session transition");
        (self, command)
    }

    /// Auto-select the first document and open its ancestors.
    fn initialize(&mut self) -> Command {
        self.initialized = true;
        self.selected = find_first_document(&self.tree, &mut self.expansion);
        self.cursor = match &self.selected {
            Some(path) => position_of(&flatten(&self.tree, &self.expansion), path).unwrap_or(0),
            None => 0,
        };
        Command::Reload { reset_scroll: true }
    }

    fn handle_key(&mut self, key: &Key) -> Command {
        if key.is_ctrl('c') || key.is_char('q') {
            self.quit = true;
            return Command::Quit;
        }
        if key.code == KeyCode::Tab && !key.ctrl {
            self.focus = self.focus.toggle();
            return Command::Render;
        }

        match self.focus {
            Pane::Sidebar => self.handle_sidebar_key(key),
            Pane::Content => {
                if self.viewport.handle_key(key) {
                    Command::Render
                } else {
                    Command::None
                }
            }
        }
    }

    fn handle_sidebar_key(&mut self, key: &Key) -> Command {
        if key.ctrl {
            return Command::None;
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
                Command::Render
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let count = self.row_count();
                if count > 0 {
                    self.cursor = (self.cursor + 1).min(count - 1);
                }
                Command::Render
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.activate_cursor_row(),
            _ => Command::None,
        }
    }

    fn activate_cursor_row(&mut self) -> Command {
        let target = flatten(&self.tree, &self.expansion)
            .get(self.cursor)
            .map(|row| (row.node.path.clone(), row.node.is_dir));

        match target {
            Some((path, true)) => {
                let expanded = self.expansion.toggle(&path);
                debug!(path = %path.display(), expanded, "toggled directory");
                // The cursor index is kept as is, even if it now names a
                // different row.
                self.cursor = self.cursor.min(self.row_count().saturating_sub(1));
                Command::Render
            }
            Some((path, false)) => {
                debug!(path = %path.display(), "selected document");
                self.selected = Some(path);
                Command::Reload { reset_scroll: true }
            }
            None => Command::None,
        }
    }

    fn resize(&mut self, width: u16, height: u16) -> Command {
        debug!(width, height, "resize");
        self.width = width;
        self.height = height;
        self.layout = ScreenLayout::for_size(width, height, &self.layout_config);
        self.viewport
            .set_height(usize::from(self.layout.content_inner_height()));
        Command::Reload {
            reset_scroll: false,
        }
    }

    /// Install freshly rendered content. The scroll offset returns to the
    /// top only when the document changed.
    pub fn apply_content(&mut self, content: RenderedContent, reset_scroll: bool) {
        self.viewport.set_content(content.lines);
        if reset_scroll {
            self.viewport.goto_top();
        }
    }

    /// Reload for hosts that read documents inline. `read` gets the
    /// selected path and the pipeline's byte limit.
    pub fn reload<R>(&mut self, pipeline: &ContentPipeline, reset_scroll: bool, read: R)
    where
        R: FnOnce(&Path, u64) -> io::Result<Vec<u8>>,
    {
        let content = pipeline.load_with(self.selected_path(), self.wrap_width(), read);
        self.apply_content(content, reset_scroll);
    }

    /// Visible sidebar rows annotated with cursor and selection.
    pub fn rows(&self) -> Vec<VisibleRow<'_>> {
        project(
            &self.tree,
            &self.expansion,
            self.cursor,
            self.selected_path(),
        )
    }

    pub fn row_count(&self) -> usize {
        flatten(&self.tree, &self.expansion).len()
    }

    pub fn wrap_width(&self) -> u16 {
        self.layout_config
            .wrap_width(self.layout.content_inner_width())
    }

    pub fn tree(&self) -> &DocumentNode {
        &self.tree
    }

    pub fn expansion(&self) -> &ExpansionSet {
        &self.expansion
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected_path(&self) -> Option<&Path> {
        self.selected.as_deref()
    }

    pub fn selected_name(&self) -> Option<&str> {
        let path = self.selected.as_deref()?;
        self.tree.find(path).map(|node| node.name.as_str())
    }

    pub fn focus(&self) -> Pane {
        self.focus
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn layout_config(&self) -> &LayoutConfig {
        &self.layout_config
    }

    pub fn layout(&self) -> &ScreenLayout {
        &self.layout
    }

    pub fn viewport(&self) -> &ScrollViewport {
        &self.viewport
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }
}
