//! Tree model: nodes, statuses, and aggregate counts.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Change status of a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileStatus {
    Added,
    Deleted,
    Modified,
    Renamed,
    Unchanged,
}

impl FileStatus {
    /// Get a single-character representation.
    pub fn as_char(&self) -> char {
        match self {
            FileStatus::Added => 'A',
            FileStatus::Deleted => 'D',
            FileStatus::Modified => 'M',
            FileStatus::Renamed => 'R',
            FileStatus::Unchanged => ' ',
        }
    }

    /// Whether this status represents a change.
    pub fn is_changed(&self) -> bool {
        !matches!(self, FileStatus::Unchanged)
    }
}

/// Node in the merged directory tree.
///
/// Each node is owned exactly once by its parent; lookup happens by
/// flattening, never through back-references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    /// Display name (file or directory name).
    pub name: String,
    /// Path relative to the compared roots (stable sort key).
    pub path: String,
    /// Whether this is a directory.
    pub is_dir: bool,
    /// Change status. `None` for directories without changed
    /// descendants; directory statuses are always derived, never set
    /// independently.
    pub status: Option<FileStatus>,
    /// Child nodes, directories first, then alphabetical.
    pub children: Vec<TreeNode>,
    /// Previous relative path, set on renamed files.
    pub old_path: Option<String>,
    /// Absolute path on the left side (absent for added files).
    pub left_path: Option<PathBuf>,
    /// Absolute path on the right side (absent for deleted files).
    pub right_path: Option<PathBuf>,
    /// Error encountered while reading this subtree, if any. Errored
    /// subtrees are excluded from the aggregate counts.
    pub read_error: Option<String>,
}

impl TreeNode {
    /// Create a file node.
    pub fn file(name: impl Into<String>, path: impl Into<String>, status: FileStatus) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_dir: false,
            status: Some(status),
            children: Vec::new(),
            old_path: None,
            left_path: None,
            right_path: None,
            read_error: None,
        }
    }

    /// Create a directory node with no status yet.
    pub fn directory(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_dir: true,
            status: None,
            children: Vec::new(),
            old_path: None,
            left_path: None,
            right_path: None,
            read_error: None,
        }
    }

    /// Whether this node or any descendant carries a change.
    pub fn has_changes(&self) -> bool {
        if !self.is_dir {
            return self.status.map(|s| s.is_changed()).unwrap_or(false);
        }
        self.status.is_some() || self.children.iter().any(TreeNode::has_changes)
    }

    /// Sort children recursively: directories first, then
    /// alphabetical by name (case-sensitive).
    pub fn sort_recursive(&mut self) {
        sort_nodes(&mut self.children);
    }

    fn collect_changed(&self, out: &mut Vec<FileEntry>) {
        if self.is_dir {
            for child in &self.children {
                child.collect_changed(out);
            }
        } else if let Some(status) = self.status {
            if status.is_changed() {
                out.push(FileEntry {
                    path: self.path.clone(),
                    name: self.name.clone(),
                    status,
                    old_path: self.old_path.clone(),
                    left_path: self.left_path.clone(),
                    right_path: self.right_path.clone(),
                });
            }
        }
    }
}

/// Sort nodes in display order: directories first, then alphabetical
/// by name (case-sensitive), recursively.
pub(crate) fn sort_nodes(nodes: &mut [TreeNode]) {
    nodes.sort_by(|a, b| match (a.is_dir, b.is_dir) {
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        _ => a.name.cmp(&b.name),
    });
    for node in nodes.iter_mut() {
        node.sort_recursive();
    }
}

/// Collect the changed file leaves of a node list in display order.
pub(crate) fn collect_changed(nodes: &[TreeNode]) -> Vec<FileEntry> {
    let mut out = Vec::new();
    for node in nodes {
        node.collect_changed(&mut out);
    }
    out
}

/// Flattened changed-leaf view of the tree, used for navigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path relative to the compared roots.
    pub path: String,
    /// File name.
    pub name: String,
    /// Change status (never `Unchanged`).
    pub status: FileStatus,
    /// Previous relative path, set on renamed files.
    pub old_path: Option<String>,
    /// Absolute path on the left side.
    pub left_path: Option<PathBuf>,
    /// Absolute path on the right side.
    pub right_path: Option<PathBuf>,
}

/// Aggregate change counts, accumulated during the walk.
///
/// Files inside errored subtrees are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSummary {
    pub added: usize,
    pub deleted: usize,
    pub modified: usize,
    pub renamed: usize,
}

impl TreeSummary {
    /// Total number of changed files.
    pub fn total_changes(&self) -> usize {
        self.added + self.deleted + self.modified + self.renamed
    }

    pub(crate) fn count(&mut self, status: FileStatus) {
        match status {
            FileStatus::Added => self.added += 1,
            FileStatus::Deleted => self.deleted += 1,
            FileStatus::Modified => self.modified += 1,
            FileStatus::Renamed => self.renamed += 1,
            FileStatus::Unchanged => {}
        }
    }
}
