//! Session view model for docview.
//!
//! Everything here is transport-agnostic: hosts load the document tree with
//! [`loader::load_tree`], create one [`SessionState`] per connection, feed it
//! events and draw it with [`view::ScreenView`].

pub mod content;
pub mod layout;
pub mod loader;
pub mod projector;
pub mod session;
pub mod theme;
pub mod view;

pub use content::{ContentPipeline, ContentStatus, MarkdownRenderer, RenderedContent, ScrollViewport};
pub use layout::{LayoutConfig, ScreenLayout};
pub use loader::{DocumentFilter, load_tree};
pub use projector::{ExpansionSet, VisibleRow, find_first_document, flatten, project};
pub use session::{Command, SessionState};
pub use theme::Theme;
pub use view::{ScreenView, buffer_lines, render_to_buffer};
