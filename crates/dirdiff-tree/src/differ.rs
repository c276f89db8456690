//! Lock-step directory walk producing the merged change tree.

use crate::compare;
use crate::model::{collect_changed, sort_nodes, FileEntry, FileStatus, TreeNode, TreeSummary};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while comparing directory roots.
///
/// Failures below the roots never surface here; they attach to the
/// affected node instead (`TreeNode::read_error`).
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("directory not found: {0}")]
    NotFound(PathBuf),
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result of comparing two directory roots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirDiff {
    /// Top-level nodes of the merged tree.
    pub tree: Vec<TreeNode>,
    /// Aggregate change counts.
    pub summary: TreeSummary,
}

impl DirDiff {
    /// Changed file leaves in display order, for navigation.
    pub fn changed_files(&self) -> Vec<FileEntry> {
        collect_changed(&self.tree)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Dir,
    File,
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// Compare two directory roots.
///
/// Walks both roots in lock-step, unioning child names at each level.
/// A name present on one side only is wholly added or deleted,
/// descendants included. Files present on both sides are compared by
/// content. After the walk, deleted and added files with identical
/// content collapse into renamed entries.
pub fn diff_trees(left_root: &Path, right_root: &Path) -> Result<DirDiff, TreeError> {
    for root in [left_root, right_root] {
        let meta = std::fs::metadata(root).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => TreeError::NotFound(root.to_path_buf()),
            _ => TreeError::Io(e),
        })?;
        if !meta.is_dir() {
            return Err(TreeError::NotADirectory(root.to_path_buf()));
        }
    }

    debug!(
        "comparing {} against {}",
        left_root.display(),
        right_root.display()
    );

    let mut summary = TreeSummary::default();
    let mut tree = diff_dir(left_root, right_root, "", &mut summary)?;
    detect_renames(&mut tree, &mut summary);
    refresh_dir_status(&mut tree);
    sort_nodes(&mut tree);

    Ok(DirDiff { tree, summary })
}

fn list_dir(dir: &Path) -> io::Result<BTreeMap<String, Kind>> {
    let mut out = BTreeMap::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let kind = if entry.file_type()?.is_dir() {
            Kind::Dir
        } else {
            Kind::File
        };
        out.insert(entry.file_name().to_string_lossy().into_owned(), kind);
    }
    Ok(out)
}

fn diff_dir(
    left: &Path,
    right: &Path,
    rel: &str,
    summary: &mut TreeSummary,
) -> io::Result<Vec<TreeNode>> {
    let left_entries = list_dir(left)?;
    let right_entries = list_dir(right)?;

    let names: BTreeSet<&String> = left_entries.keys().chain(right_entries.keys()).collect();

    let mut nodes = Vec::new();
    for name in names {
        let child_rel = join_rel(rel, name);
        let left_path = left.join(name);
        let right_path = right.join(name);

        match (
            left_entries.get(name).copied(),
            right_entries.get(name).copied(),
        ) {
            (Some(kind), None) => {
                nodes.push(one_side(&left_path, &child_rel, name, kind, Side::Left, summary));
            }
            (None, Some(kind)) => {
                nodes.push(one_side(&right_path, &child_rel, name, kind, Side::Right, summary));
            }
            (Some(Kind::Dir), Some(Kind::Dir)) => {
                let mut node = TreeNode::directory(name, &child_rel);
                node.left_path = Some(left_path.clone());
                node.right_path = Some(right_path.clone());
                match diff_dir(&left_path, &right_path, &child_rel, summary) {
                    Ok(children) => node.children = children,
                    Err(err) => {
                        warn!("failed to read {}: {}", child_rel, err);
                        node.read_error = Some(err.to_string());
                    }
                }
                nodes.push(node);
            }
            (Some(Kind::File), Some(Kind::File)) => {
                let mut node = TreeNode::file(name, &child_rel, FileStatus::Unchanged);
                node.left_path = Some(left_path.clone());
                node.right_path = Some(right_path.clone());
                match compare::files_differ(&left_path, &right_path) {
                    Ok(true) => {
                        node.status = Some(FileStatus::Modified);
                        summary.count(FileStatus::Modified);
                    }
                    Ok(false) => {}
                    Err(err) => {
                        warn!("failed to compare {}: {}", child_rel, err);
                        node.status = None;
                        node.read_error = Some(err.to_string());
                    }
                }
                nodes.push(node);
            }
            // Type mismatch at the same name: the old entity was
            // removed and a new one added, never a modification.
            (Some(left_kind), Some(right_kind)) => {
                nodes.push(one_side(
                    &left_path, &child_rel, name, left_kind, Side::Left, summary,
                ));
                nodes.push(one_side(
                    &right_path, &child_rel, name, right_kind, Side::Right, summary,
                ));
            }
            (None, None) => unreachable!("name came from one of the listings"),
        }
    }

    Ok(nodes)
}

/// Build a wholly added or deleted subtree from a single side.
fn one_side(
    path: &Path,
    rel: &str,
    name: &str,
    kind: Kind,
    side: Side,
    summary: &mut TreeSummary,
) -> TreeNode {
    let status = match side {
        Side::Left => FileStatus::Deleted,
        Side::Right => FileStatus::Added,
    };

    let mut node = match kind {
        Kind::File => {
            summary.count(status);
            TreeNode::file(name, rel, status)
        }
        Kind::Dir => {
            let mut node = TreeNode::directory(name, rel);
            node.status = Some(status);
            match list_dir(path) {
                Ok(entries) => {
                    for (child_name, child_kind) in entries {
                        node.children.push(one_side(
                            &path.join(&child_name),
                            &join_rel(rel, &child_name),
                            &child_name,
                            child_kind,
                            side,
                            summary,
                        ));
                    }
                }
                Err(err) => {
                    warn!("failed to read {}: {}", rel, err);
                    node.read_error = Some(err.to_string());
                }
            }
            node
        }
    };

    match side {
        Side::Left => node.left_path = Some(path.to_path_buf()),
        Side::Right => node.right_path = Some(path.to_path_buf()),
    }
    node
}

/// Pair deleted files with added files of identical content and
/// collapse each pair into one renamed node at the new path.
fn detect_renames(nodes: &mut Vec<TreeNode>, summary: &mut TreeSummary) {
    let mut deleted = Vec::new();
    let mut added = Vec::new();
    collect_leaves(nodes, &mut deleted, &mut added);
    if deleted.is_empty() || added.is_empty() {
        return;
    }

    let mut pairs: Vec<(String, String, PathBuf)> = Vec::new();
    let mut taken = HashSet::new();
    for (old_rel, old_abs) in &deleted {
        for (idx, (new_rel, new_abs)) in added.iter().enumerate() {
            if taken.contains(&idx) {
                continue;
            }
            // Only byte-identical content pairs; unreadable
            // candidates simply do not pair.
            if let Ok(false) = compare::files_differ(old_abs, new_abs) {
                debug!("rename detected: {} -> {}", old_rel, new_rel);
                pairs.push((old_rel.clone(), new_rel.clone(), old_abs.clone()));
                taken.insert(idx);
                break;
            }
        }
    }
    if pairs.is_empty() {
        return;
    }

    let removed: HashSet<&str> = pairs.iter().map(|(old, _, _)| old.as_str()).collect();
    prune_deleted(nodes, &removed);
    for (old_rel, new_rel, old_abs) in &pairs {
        mark_renamed(nodes, new_rel, old_rel, old_abs);
        summary.added -= 1;
        summary.deleted -= 1;
        summary.renamed += 1;
    }
}

fn collect_leaves(
    nodes: &[TreeNode],
    deleted: &mut Vec<(String, PathBuf)>,
    added: &mut Vec<(String, PathBuf)>,
) {
    for node in nodes {
        if node.is_dir {
            collect_leaves(&node.children, deleted, added);
            continue;
        }
        match node.status {
            Some(FileStatus::Deleted) => {
                if let Some(path) = &node.left_path {
                    deleted.push((node.path.clone(), path.clone()));
                }
            }
            Some(FileStatus::Added) => {
                if let Some(path) = &node.right_path {
                    added.push((node.path.clone(), path.clone()));
                }
            }
            _ => {}
        }
    }
}

fn prune_deleted(nodes: &mut Vec<TreeNode>, removed: &HashSet<&str>) {
    nodes.retain(|n| {
        n.is_dir || n.status != Some(FileStatus::Deleted) || !removed.contains(n.path.as_str())
    });
    for node in nodes.iter_mut() {
        prune_deleted(&mut node.children, removed);
    }
}

fn mark_renamed(nodes: &mut [TreeNode], new_rel: &str, old_rel: &str, old_abs: &Path) -> bool {
    for node in nodes.iter_mut() {
        if node.is_dir {
            if mark_renamed(&mut node.children, new_rel, old_rel, old_abs) {
                return true;
            }
        } else if node.path == new_rel {
            node.status = Some(FileStatus::Renamed);
            node.old_path = Some(old_rel.to_string());
            node.left_path = Some(old_abs.to_path_buf());
            return true;
        }
    }
    false
}

/// Recompute derived statuses for directories present on both sides.
///
/// One-sided directories keep Added/Deleted: the directory itself
/// came or went. Runs after the rename pass so a directory never
/// reports a change it no longer contains.
fn refresh_dir_status(nodes: &mut [TreeNode]) {
    for node in nodes.iter_mut() {
        if !node.is_dir {
            continue;
        }
        refresh_dir_status(&mut node.children);
        if node.left_path.is_some() && node.right_path.is_some() {
            let changed = node.children.iter().any(TreeNode::has_changes);
            node.status = changed.then_some(FileStatus::Modified);
        }
    }
}

fn join_rel(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn find<'a>(nodes: &'a [TreeNode], path: &str) -> Option<&'a TreeNode> {
        for node in nodes {
            if node.path == path {
                return Some(node);
            }
            if let Some(found) = find(&node.children, path) {
                return Some(found);
            }
        }
        None
    }

    #[test]
    fn test_identical_trees_have_no_changes() {
        let left = TempDir::new().unwrap();
        let right = TempDir::new().unwrap();
        for root in [left.path(), right.path()] {
            write(root, "src/main.rs", "fn main() {}\n");
            write(root, "README.md", "# readme\n");
        }

        let diff = diff_trees(left.path(), right.path()).unwrap();
        assert_eq!(diff.summary, TreeSummary::default());
        assert!(diff.changed_files().is_empty());

        let src = find(&diff.tree, "src").unwrap();
        assert_eq!(src.status, None);
        let main = find(&diff.tree, "src/main.rs").unwrap();
        assert_eq!(main.status, Some(FileStatus::Unchanged));
    }

    #[test]
    fn test_added_file_has_no_left_path() {
        let left = TempDir::new().unwrap();
        let right = TempDir::new().unwrap();
        write(right.path(), "new.txt", "fresh\n");

        let diff = diff_trees(left.path(), right.path()).unwrap();
        assert_eq!(diff.summary.added, 1);
        assert_eq!(diff.summary.deleted, 0);
        assert_eq!(diff.summary.modified, 0);

        let node = find(&diff.tree, "new.txt").unwrap();
        assert_eq!(node.status, Some(FileStatus::Added));
        assert!(node.left_path.is_none());
        assert!(node.right_path.is_some());
    }

    #[test]
    fn test_deleted_file_has_no_right_path() {
        let left = TempDir::new().unwrap();
        let right = TempDir::new().unwrap();
        write(left.path(), "gone.txt", "old\n");

        let diff = diff_trees(left.path(), right.path()).unwrap();
        assert_eq!(diff.summary.deleted, 1);

        let node = find(&diff.tree, "gone.txt").unwrap();
        assert_eq!(node.status, Some(FileStatus::Deleted));
        assert!(node.right_path.is_none());
    }

    #[test]
    fn test_modified_by_content_not_metadata() {
        let left = TempDir::new().unwrap();
        let right = TempDir::new().unwrap();
        write(left.path(), "x.txt", "hello");
        write(right.path(), "x.txt", "hello world");

        let diff = diff_trees(left.path(), right.path()).unwrap();
        assert_eq!(diff.summary.modified, 1);
        let entries = diff.changed_files();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, FileStatus::Modified);
        assert!(entries[0].left_path.is_some() && entries[0].right_path.is_some());
    }

    #[test]
    fn test_one_sided_directory_is_wholly_classified() {
        let left = TempDir::new().unwrap();
        let right = TempDir::new().unwrap();
        write(right.path(), "pkg/a.rs", "a\n");
        write(right.path(), "pkg/sub/b.rs", "b\n");

        let diff = diff_trees(left.path(), right.path()).unwrap();
        assert_eq!(diff.summary.added, 2);

        let pkg = find(&diff.tree, "pkg").unwrap();
        assert_eq!(pkg.status, Some(FileStatus::Added));
        assert_eq!(
            find(&diff.tree, "pkg/sub/b.rs").unwrap().status,
            Some(FileStatus::Added)
        );
    }

    #[test]
    fn test_type_mismatch_is_delete_then_add() {
        let left = TempDir::new().unwrap();
        let right = TempDir::new().unwrap();
        write(left.path(), "thing", "a file\n");
        write(right.path(), "thing/inner.txt", "now a directory\n");

        let diff = diff_trees(left.path(), right.path()).unwrap();
        assert_eq!(diff.summary.deleted, 1);
        assert_eq!(diff.summary.added, 1);

        let twins: Vec<&TreeNode> = diff.tree.iter().filter(|n| n.name == "thing").collect();
        assert_eq!(twins.len(), 2);
        // Directories sort first.
        assert!(twins[0].is_dir);
        assert_eq!(twins[0].status, Some(FileStatus::Added));
        assert!(!twins[1].is_dir);
        assert_eq!(twins[1].status, Some(FileStatus::Deleted));
    }

    #[test]
    fn test_exact_content_rename_collapses_pair() {
        let left = TempDir::new().unwrap();
        let right = TempDir::new().unwrap();
        write(left.path(), "old_name.txt", "same content\n");
        write(right.path(), "docs/new_name.txt", "same content\n");

        let diff = diff_trees(left.path(), right.path()).unwrap();
        assert_eq!(diff.summary.renamed, 1);
        assert_eq!(diff.summary.added, 0);
        assert_eq!(diff.summary.deleted, 0);
        assert_eq!(diff.summary.total_changes(), 1);

        assert!(find(&diff.tree, "old_name.txt").is_none());
        let node = find(&diff.tree, "docs/new_name.txt").unwrap();
        assert_eq!(node.status, Some(FileStatus::Renamed));
        assert_eq!(node.old_path.as_deref(), Some("old_name.txt"));
        assert!(node.left_path.is_some() && node.right_path.is_some());
    }

    #[test]
    fn test_different_content_does_not_pair_as_rename() {
        let left = TempDir::new().unwrap();
        let right = TempDir::new().unwrap();
        write(left.path(), "a.txt", "one\n");
        write(right.path(), "b.txt", "two\n");

        let diff = diff_trees(left.path(), right.path()).unwrap();
        assert_eq!(diff.summary.renamed, 0);
        assert_eq!(diff.summary.added, 1);
        assert_eq!(diff.summary.deleted, 1);
    }

    #[test]
    fn test_directory_status_follows_descendants() {
        let left = TempDir::new().unwrap();
        let right = TempDir::new().unwrap();
        write(left.path(), "src/lib.rs", "old\n");
        write(right.path(), "src/lib.rs", "new\n");
        write(left.path(), "docs/guide.md", "stable\n");
        write(right.path(), "docs/guide.md", "stable\n");

        let diff = diff_trees(left.path(), right.path()).unwrap();
        assert_eq!(
            find(&diff.tree, "src").unwrap().status,
            Some(FileStatus::Modified)
        );
        assert_eq!(find(&diff.tree, "docs").unwrap().status, None);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let right = TempDir::new().unwrap();
        let err = diff_trees(Path::new("/nonexistent/left"), right.path()).unwrap_err();
        assert!(matches!(err, TreeError::NotFound(_)));
    }

    #[test]
    fn test_navigation_order_matches_tree_order() {
        let left = TempDir::new().unwrap();
        let right = TempDir::new().unwrap();
        write(right.path(), "b.txt", "b\n");
        write(right.path(), "sub/a.txt", "a\n");

        let diff = diff_trees(left.path(), right.path()).unwrap();
        let paths: Vec<String> = diff.changed_files().into_iter().map(|e| e.path).collect();
        // Directories sort before top-level files.
        assert_eq!(paths, vec!["sub/a.txt".to_string(), "b.txt".to_string()]);
    }
}
