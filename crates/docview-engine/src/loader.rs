//! Builds the immutable document tree from a directory on disk.

use docview_types::{DocumentNode, Error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use walkdir::WalkDir;

/// Decides which files count as documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFilter {
    extensions: Vec<String>,
}

impl DocumentFilter {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self { extensions }
    }

    pub fn markdown() -> Self {
        Self::new(["md", "markdown"])
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .is_some_and(|ext| self.extensions.iter().any(|allowed| *allowed == ext))
    }
}

impl Default for DocumentFilter {
    fn default() -> Self {
        Self::markdown()
    }
}

/// Load the document tree rooted at `root`.
///
/// Hidden entries and non-document files are dropped, unreadable entries are
/// skipped, and every level is sorted directories-first. Directories are kept
/// even when they contain no documents.
pub fn load_tree(root: &Path, filter: &DocumentFilter) -> Result<DocumentNode> {
    let metadata = match fs::metadata(root) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(Error::RootNotFound(root.to_path_buf()));
        }
        Err(err) => return Err(Error::Io(err)),
    };

    if !metadata.is_dir() {
        return Err(Error::NotADirectory(root.to_path_buf()));
    }

    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| root.display().to_string());

    let children = read_children(root, filter);
    let tree = DocumentNode::dir(name, root, children);

    tracing::debug!(
        root = %root.display(),
        documents = tree.document_count(),
        "loaded document tree"
    );

    Ok(tree)
}

fn read_children(dir: &Path, filter: &DocumentFilter) -> Vec<DocumentNode> {
    let mut children = Vec::new();

    // Symlinks are never followed into directories, which keeps the tree acyclic.
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(dir = %dir.display(), error = %err, "skipping unreadable entry");
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }

        let path = entry.path();
        let file_type = entry.file_type();

        if file_type.is_dir() {
            children.push(DocumentNode::dir(name, path, read_children(path, filter)));
        } else if is_document_file(path, file_type) && filter.accepts(path) {
            children.push(DocumentNode::file(name, path));
        }
    }

    children
}

fn is_document_file(path: &Path, file_type: fs::FileType) -> bool {
    if file_type.is_symlink() {
        return fs::metadata(path).map(|m| m.is_file()).unwrap_or(false);
    }
    file_type.is_file()
}
