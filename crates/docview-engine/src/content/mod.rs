//! Content pipeline: read the selected document and turn it into wrapped,
//! styled lines for the scroll viewport.
//!
//! Failures never escape as errors. A missing selection, an unreadable file
//! or a renderer failure all come back as a placeholder the content pane can
//! show like any other document.

mod markdown;
mod viewport;

pub use markdown::MarkdownRenderer;
pub use viewport::ScrollViewport;

use std::any::Any;
use std::fs::File;
use std::io::{self, Read};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use ratatui::text::Line;
use tracing::{error, warn};

use crate::theme::Theme;

pub const NO_SELECTION: &str = "No document selected.";
pub const READ_ERROR_PREFIX: &str = "Error reading file: ";
pub const RENDER_ERROR_PREFIX: &str = "Error rendering markdown: ";

/// Default cap on bytes read from a single document.
pub const DEFAULT_MAX_BYTES: u64 = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentStatus {
    NoSelection,
    Rendered,
    ReadFailed,
    RenderFailed,
}

#[derive(Debug, Clone)]
pub struct RenderedContent {
    pub lines: Vec<Line<'static>>,
    pub status: ContentStatus,
}

impl RenderedContent {
    pub fn is_failure(&self) -> bool {
        matches!(
            self.status,
            ContentStatus::ReadFailed | ContentStatus::RenderFailed
        )
    }

    pub fn plain_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct ContentPipeline {
    renderer: MarkdownRenderer,
    theme: Theme,
    max_bytes: u64,
}

impl Default for ContentPipeline {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

impl ContentPipeline {
    pub fn new(theme: Theme) -> Self {
        Self {
            renderer: MarkdownRenderer::new(theme.clone()),
            theme,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes.max(1);
        self
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Read `path` synchronously and render it at `wrap_width`.
    pub fn load_and_render(&self, path: Option<&Path>, wrap_width: u16) -> RenderedContent {
        self.load_with(path, wrap_width, read_document)
    }

    /// Like `load_and_render`, with the read delegated to `read`, which
    /// receives the path and the byte limit.
    pub fn load_with<R>(&self, path: Option<&Path>, wrap_width: u16, read: R) -> RenderedContent
    where
        R: FnOnce(&Path, u64) -> io::Result<Vec<u8>>,
    {
        match path {
            None => self.no_selection(),
            Some(path) => {
                let bytes = read(path, self.max_bytes);
                self.render_loaded(path, bytes, wrap_width)
            }
        }
    }

    /// Render the outcome of a read performed elsewhere (the remote host
    /// reads on the blocking pool under a timeout).
    pub fn render_loaded(
        &self,
        path: &Path,
        bytes: io::Result<Vec<u8>>,
        wrap_width: u16,
    ) -> RenderedContent {
        match bytes {
            Ok(bytes) => self.render_bytes(path, &bytes, wrap_width),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read document");
                self.read_failure(&err.to_string())
            }
        }
    }

    pub fn no_selection(&self) -> RenderedContent {
        RenderedContent {
            lines: vec![Line::styled(NO_SELECTION, self.theme.help())],
            status: ContentStatus::NoSelection,
        }
    }

    pub fn read_failure(&self, reason: &str) -> RenderedContent {
        RenderedContent {
            lines: vec![Line::styled(
                format!("{}{}", READ_ERROR_PREFIX, reason),
                self.theme.error(),
            )],
            status: ContentStatus::ReadFailed,
        }
    }

    fn render_failure(&self, reason: &str) -> RenderedContent {
        RenderedContent {
            lines: vec![Line::styled(
                format!("{}{}", RENDER_ERROR_PREFIX, reason),
                self.theme.error(),
            )],
            status: ContentStatus::RenderFailed,
        }
    }

    fn render_bytes(&self, path: &Path, bytes: &[u8], wrap_width: u16) -> RenderedContent {
        let truncated = bytes.len() as u64 >= self.max_bytes;
        let text = match decode(bytes, truncated) {
            Ok(text) => text,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "document is not valid UTF-8");
                return self.render_failure(&err.to_string());
            }
        };

        match panic::catch_unwind(AssertUnwindSafe(|| self.renderer.render(text, wrap_width))) {
            Ok(lines) => RenderedContent {
                lines,
                status: ContentStatus::Rendered,
            },
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                error!(path = %path.display(), reason = %reason, "markdown renderer panicked");
                self.render_failure(&reason)
            }
        }
    }
}

/// Read at most `max_bytes` from `path`.
pub fn read_document(path: &Path, max_bytes: u64) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut bytes = Vec::new();
    file.take(max_bytes).read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// A read cut at the byte cap may end mid-character; keep the valid prefix
/// in that case only.
fn decode(bytes: &[u8], truncated: bool) -> std::result::Result<&str, std::str::Utf8Error> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) if truncated && err.error_len().is_none() => {
            Ok(std::str::from_utf8(&bytes[..err.valid_up_to()]).unwrap_or_default())
        }
        Err(err) => Err(err),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "renderer panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_no_selection_placeholder() {
        let content = ContentPipeline::default().load_and_render(None, 40);
        assert_eq!(content.status, ContentStatus::NoSelection);
        assert_eq!(content.plain_lines(), vec![NO_SELECTION]);
    }

    #[test]
    fn test_missing_file_is_inline_failure() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("gone.md");
        let content = ContentPipeline::default().load_and_render(Some(path.as_path()), 40);

        assert!(content.is_failure());
        assert_eq!(content.status, ContentStatus::ReadFailed);
        assert!(content.plain_lines()[0].starts_with(READ_ERROR_PREFIX));
        Ok(())
    }

    #[test]
    fn test_renders_document() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("doc.md");
        fs::write(&path, "# Hello\n\nbody text")?;

        let content = ContentPipeline::default().load_and_render(Some(path.as_path()), 40);
        assert_eq!(content.status, ContentStatus::Rendered);
        assert_eq!(content.plain_lines(), vec!["# Hello", "", "body text"]);
        Ok(())
    }

    #[test]
    fn test_invalid_utf8_is_render_failure() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("bad.md");
        fs::write(&path, [b'o', b'k', 0xff, 0xfe, b'!'])?;

        let content = ContentPipeline::default().load_and_render(Some(path.as_path()), 40);
        assert_eq!(content.status, ContentStatus::RenderFailed);
        assert!(content.plain_lines()[0].starts_with(RENDER_ERROR_PREFIX));
        Ok(())
    }

    #[test]
    fn test_read_is_capped_at_char_boundary() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("big.md");
        // "é" is two bytes; a 3-byte cap cuts the second one in half.
        fs::write(&path, "éé")?;

        let pipeline = ContentPipeline::default().with_max_bytes(3);
        let content = pipeline.load_and_render(Some(path.as_path()), 40);
        assert_eq!(content.status, ContentStatus::Rendered);
        assert_eq!(content.plain_lines(), vec!["é"]);
        Ok(())
    }

    #[test]
    fn test_render_loaded_reports_reason() {
        let err = io::Error::new(io::ErrorKind::TimedOut, "timed out after 2000ms");
        let content =
            ContentPipeline::default().render_loaded(Path::new("slow.md"), Err(err), 40);
        assert_eq!(
            content.plain_lines(),
            vec!["Error reading file: timed out after 2000ms"]
        );
    }
}
