//! Projects the document tree into the flat list of rows the sidebar shows.
//!
//! The projection is recomputed on every cursor, expansion or selection
//! change. It only walks directories that are expanded, so its cost follows
//! the number of visible rows rather than the size of the tree.

use docview_types::DocumentNode;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Per-session record of which directories are open, keyed by node path.
///
/// Paths with no entry are collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionSet {
    entries: HashMap<PathBuf, bool>,
}

impl ExpansionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, path: &Path) -> bool {
        self.entries.get(path).copied().unwrap_or(false)
    }

    pub fn set(&mut self, path: impl Into<PathBuf>, expanded: bool) {
        self.entries.insert(path.into(), expanded);
    }

    pub fn expand(&mut self, path: impl Into<PathBuf>) {
        self.set(path, true);
    }

    /// Flip the entry for `path` and return the new state.
    pub fn toggle(&mut self, path: &Path) -> bool {
        let expanded = !self.is_expanded(path);
        self.set(path, expanded);
        expanded
    }

    /// Paths currently marked expanded, in no particular order.
    pub fn expanded_paths(&self) -> impl Iterator<Item = &Path> {
        self.entries
            .iter()
            .filter(|(_, expanded)| **expanded)
            .map(|(path, _)| path.as_path())
    }

    pub fn expanded_count(&self) -> usize {
        self.expanded_paths().count()
    }
}

/// One displayable sidebar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRow<'a> {
    pub node: &'a DocumentNode,
    pub depth: usize,
    pub is_expanded: bool,
    pub is_cursor: bool,
    pub is_selected: bool,
}

/// Pre-order listing of the root's descendants, skipping the contents of
/// collapsed directories. The root itself is never emitted.
pub fn flatten<'a>(root: &'a DocumentNode, expansion: &ExpansionSet) -> Vec<VisibleRow<'a>> {
    let mut rows = Vec::new();
    push_rows(&root.children, 0, expansion, &mut rows);
    rows
}

fn push_rows<'a>(
    nodes: &'a [DocumentNode],
    depth: usize,
    expansion: &ExpansionSet,
    rows: &mut Vec<VisibleRow<'a>>,
) {
    for node in nodes {
        let is_expanded = node.is_dir && expansion.is_expanded(&node.path);
        rows.push(VisibleRow {
            node,
            depth,
            is_expanded,
            is_cursor: false,
            is_selected: false,
        });
        if is_expanded {
            push_rows(&node.children, depth + 1, expansion, rows);
        }
    }
}

/// `flatten` plus the cursor and selection markers for one session.
pub fn project<'a>(
    root: &'a DocumentNode,
    expansion: &ExpansionSet,
    cursor: usize,
    selected: Option<&Path>,
) -> Vec<VisibleRow<'a>> {
    let mut rows = flatten(root, expansion);
    for (index, row) in rows.iter_mut().enumerate() {
        row.is_cursor = index == cursor;
        row.is_selected = !row.node.is_dir && selected == Some(row.node.path.as_path());
    }
    rows
}

/// Index of the row showing `path`, if it is currently visible.
pub fn position_of(rows: &[VisibleRow<'_>], path: &Path) -> Option<usize> {
    rows.iter().position(|row| row.node.path == path)
}

/// Result of the depth-first search for the first document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstDocument {
    pub path: PathBuf,
    /// Directories between the root and the document, outermost first.
    pub ancestors: Vec<PathBuf>,
}

impl FirstDocument {
    pub fn expand_ancestors(&self, expansion: &mut ExpansionSet) {
        for dir in &self.ancestors {
            expansion.expand(dir.clone());
        }
    }
}

/// Depth-first search, in stored child order, for the first document.
pub fn locate_first_document(root: &DocumentNode) -> Option<FirstDocument> {
    if !root.is_dir {
        return Some(FirstDocument {
            path: root.path.clone(),
            ancestors: Vec::new(),
        });
    }
    first_in(&root.children)
}

fn first_in(nodes: &[DocumentNode]) -> Option<FirstDocument> {
    for node in nodes {
        if !node.is_dir {
            return Some(FirstDocument {
                path: node.path.clone(),
                ancestors: Vec::new(),
            });
        }
        if let Some(mut found) = first_in(&node.children) {
            found.ancestors.insert(0, node.path.clone());
            return Some(found);
        }
    }
    None
}

/// Find the first document and open every directory leading to it.
///
/// Returns `None` for a tree without documents, leaving `expansion` untouched.
pub fn find_first_document(root: &DocumentNode, expansion: &mut ExpansionSet) -> Option<PathBuf> {
    let found = locate_first_document(root)?;
    found.expand_ancestors(expansion);
    Some(found.path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str) -> DocumentNode {
        let name = path.rsplit('/').next().unwrap_or(path);
        DocumentNode::file(name, path)
    }

    fn dir(path: &str, children: Vec<DocumentNode>) -> DocumentNode {
        let name = path.rsplit('/').next().unwrap_or(path);
        DocumentNode::dir(name, path, children)
    }

    /// `{work.md, skills/{a.md, b.md}}`
    fn resume_tree() -> DocumentNode {
        dir(
            "docs",
            vec![
                file("docs/work.md"),
                dir("docs/skills", vec![file("docs/skills/a.md"), file("docs/skills/b.md")]),
            ],
        )
    }

    fn deep_tree() -> DocumentNode {
        dir(
            "root",
            vec![
                dir(
                    "root/a",
                    vec![
                        dir(
                            "root/a/b",
                            vec![
                                dir("root/a/b/c", vec![file("root/a/b/c/deep.md")]),
                                dir("root/a/b/sibling", vec![file("root/a/b/sibling/x.md")]),
                            ],
                        ),
                        dir("root/a/other", vec![file("root/a/other/y.md")]),
                    ],
                ),
                file("root/top.md"),
            ],
        )
    }

    fn labels(rows: &[VisibleRow<'_>]) -> Vec<String> {
        rows.iter()
            .map(|row| format!("{}{}", "  ".repeat(row.depth), row.node.name))
            .collect()
    }

    #[test]
    fn test_flatten_collapsed_tree_shows_top_level_only() {
        let tree = resume_tree();
        let rows = flatten(&tree, &ExpansionSet::new());
        assert_eq!(labels(&rows), vec!["skills", "work.md"]);
        assert!(rows.iter().all(|row| row.depth == 0));
    }

    #[test]
    fn test_flatten_never_shows_descendants_of_collapsed_dirs() {
        let tree = deep_tree();
        let mut expansion = ExpansionSet::new();
        expansion.expand("root/a");
        // b is collapsed; c being "expanded" must not leak its children.
        expansion.expand("root/a/b/c");
        expansion.set("root/a/other", false);

        let rows = flatten(&tree, &expansion);
        assert_eq!(labels(&rows), vec!["a", "  b", "  other", "top.md"]);
        assert!(
            !rows
                .iter()
                .any(|row| row.node.path.starts_with("root/a/b/c"))
        );
    }

    #[test]
    fn test_flatten_is_preorder_with_depth() {
        let tree = deep_tree();
        let mut expansion = ExpansionSet::new();
        for path in ["root/a", "root/a/b", "root/a/b/c", "root/a/b/sibling", "root/a/other"] {
            expansion.expand(path);
        }

        let rows = flatten(&tree, &expansion);
        insta::assert_debug_snapshot!(labels(&rows), @r#"
        [
            "a",
            "  b",
            "    c",
            "      deep.md",
            "    sibling",
            "      x.md",
            "  other",
            "    y.md",
            "top.md",
        ]
        "#);
    }

    #[test]
    fn test_find_first_document_in_empty_tree() {
        let tree = dir("root", vec![dir("root/a", vec![dir("root/a/b", vec![])])]);
        let mut expansion = ExpansionSet::new();

        assert_eq!(find_first_document(&tree, &mut expansion), None);
        assert_eq!(expansion, ExpansionSet::new());
    }

    #[test]
    fn test_find_first_document_expands_only_ancestors() {
        let tree = deep_tree();
        let mut expansion = ExpansionSet::new();

        let found = find_first_document(&tree, &mut expansion);
        assert_eq!(found, Some(PathBuf::from("root/a/b/c/deep.md")));

        let mut expanded: Vec<&Path> = expansion.expanded_paths().collect();
        expanded.sort();
        assert_eq!(
            expanded,
            vec![Path::new("root/a"), Path::new("root/a/b"), Path::new("root/a/b/c")]
        );
        assert!(!expansion.is_expanded(Path::new("root/a/b/sibling")));
        assert!(!expansion.is_expanded(Path::new("root/a/other")));
    }

    #[test]
    fn test_find_first_document_prefers_directories_by_sort_order() {
        let tree = resume_tree();
        let mut expansion = ExpansionSet::new();

        let found = find_first_document(&tree, &mut expansion).unwrap();
        assert_eq!(found, PathBuf::from("docs/skills/a.md"));

        let rows = project(&tree, &expansion, 1, Some(found.as_path()));
        assert_eq!(labels(&rows), vec!["skills", "  a.md", "  b.md", "work.md"]);
        assert!(rows[0].is_expanded);
        assert!(rows[1].is_cursor && rows[1].is_selected);
        assert_eq!(position_of(&rows, &found), Some(1));
    }

    #[test]
    fn test_find_first_document_skips_empty_directories() {
        let tree = dir(
            "root",
            vec![dir("root/empty", vec![]), dir("root/full", vec![file("root/full/z.md")])],
        );
        let located = locate_first_document(&tree).unwrap();
        assert_eq!(located.path, PathBuf::from("root/full/z.md"));
        assert_eq!(located.ancestors, vec![PathBuf::from("root/full")]);
    }

    #[test]
    fn test_toggle_twice_restores_rows() {
        let tree = deep_tree();
        let mut expansion = ExpansionSet::new();
        expansion.expand("root/a");
        let before: Vec<String> = labels(&flatten(&tree, &expansion));

        assert!(expansion.toggle(Path::new("root/a/b")));
        assert_ne!(labels(&flatten(&tree, &expansion)), before);
        assert!(!expansion.toggle(Path::new("root/a/b")));
        assert_eq!(labels(&flatten(&tree, &expansion)), before);
    }

    #[test]
    fn test_project_marks_selection_only_on_files() {
        let tree = resume_tree();
        let rows = project(&tree, &ExpansionSet::new(), 0, Some(Path::new("docs/skills")));
        assert!(rows[0].is_cursor);
        assert!(!rows[0].is_selected);
    }
}
