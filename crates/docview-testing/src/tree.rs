//! Temporary document trees for loader and host tests.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[derive(Debug, Clone)]
enum Entry {
    File { path: PathBuf, content: String },
    Dir(PathBuf),
}

/// Builder for a directory of documents.
///
/// # Example
/// ```no_run
/// use docview_testing::DocTree;
///
/// let docs = DocTree::new()
///     .file("work.md", "# Work")
///     .file("skills/rust.md", "# Rust")
///     .dir("empty")
///     .build()
///     .unwrap();
/// assert!(docs.path("skills/rust.md").exists());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocTree {
    entries: Vec<Entry>,
}

impl DocTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file; parent directories are created as needed.
    pub fn file(mut self, rel: impl AsRef<Path>, content: impl Into<String>) -> Self {
        self.entries.push(Entry::File {
            path: rel.as_ref().to_path_buf(),
            content: content.into(),
        });
        self
    }

    pub fn dir(mut self, rel: impl AsRef<Path>) -> Self {
        self.entries.push(Entry::Dir(rel.as_ref().to_path_buf()));
        self
    }

    /// Materialize the tree in a fresh temporary directory.
    pub fn build(self) -> Result<DocFixture> {
        let temp = TempDir::new().context("Failed to create temp dir")?;
        let root = temp.path().join("docs");
        fs::create_dir_all(&root)?;
        write_entries(&root, &self.entries)?;
        Ok(DocFixture { _temp: temp, root })
    }

    /// Materialize the tree under an existing directory.
    pub fn build_in(self, root: &Path) -> Result<()> {
        fs::create_dir_all(root)?;
        write_entries(root, &self.entries)
    }
}

fn write_entries(root: &Path, entries: &[Entry]) -> Result<()> {
    for entry in entries {
        match entry {
            Entry::File { path, content } => {
                let full = root.join(path);
                if let Some(parent) = full.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&full, content)
                    .with_context(|| format!("Failed to write {}", full.display()))?;
            }
            Entry::Dir(path) => fs::create_dir_all(root.join(path))?,
        }
    }
    Ok(())
}

/// A built document tree. The directory is removed on drop.
#[derive(Debug)]
pub struct DocFixture {
    _temp: TempDir,
    root: PathBuf,
}

impl DocFixture {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.root.join(rel)
    }
}
