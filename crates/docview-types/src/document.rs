use serde::Serialize;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// A directory or document in the loaded tree.
///
/// `path` doubles as the node's identity: it is unique across the tree and is
/// the key sessions use to remember which directories are expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentNode {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DocumentNode>,
}

impl DocumentNode {
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_dir: false,
            children: Vec::new(),
        }
    }

    /// Build a directory node. Children are sorted into display order.
    pub fn dir(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        children: Vec<DocumentNode>,
    ) -> Self {
        let mut node = Self {
            name: name.into(),
            path: path.into(),
            is_dir: true,
            children,
        };
        node.children.sort_by(compare_entries);
        node
    }

    /// Look up a node by path anywhere below (and including) this one.
    pub fn find(&self, path: &Path) -> Option<&DocumentNode> {
        if self.path == path {
            return Some(self);
        }
        // Paths are hierarchical, so only descend into the matching branch.
        if !path.starts_with(&self.path) {
            return None;
        }
        self.children.iter().find_map(|child| child.find(path))
    }

    /// Number of document (non-directory) nodes in this subtree.
    pub fn document_count(&self) -> usize {
        if !self.is_dir {
            return 1;
        }
        self.children.iter().map(DocumentNode::document_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Display ordering: directories before files, then by name.
pub fn compare_entries(a: &DocumentNode, b: &DocumentNode) -> Ordering {
    b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name))
}
