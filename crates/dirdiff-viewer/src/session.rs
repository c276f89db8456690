//! Session facade: the operations the presentation layer consumes.

use crate::result::{build_diff_result, DiffResult};
use dirdiff_render::{check_tool_available, DiffOptions, RenderError, RenderInvoker, DEFAULT_TOOL};
use dirdiff_tree::{diff_trees, FileEntry, TreeError, TreeNode};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Errors surfaced at the session boundary.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not text content: {0}")]
    NotUtf8(PathBuf),
}

/// Result of a directory-pair comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTreeResult {
    /// Merged tree, one node per path.
    pub tree: Vec<TreeNode>,
    /// Changed files in navigation order.
    pub files: Vec<FileEntry>,
    pub total_changes: usize,
    pub added: usize,
    pub deleted: usize,
    pub modified: usize,
    pub renamed: usize,
}

/// One viewer session.
///
/// The tree and every diff result are immutable snapshots replaced
/// wholesale; a generation counter makes sure a render that was
/// superseded while in flight is discarded instead of surfacing a
/// stale diff for the wrong file.
pub struct DiffSession {
    invoker: RenderInvoker,
    generation: AtomicU64,
}

impl DiffSession {
    /// Create a session, probing for the external highlighter.
    pub async fn detect() -> Self {
        Self::with_invoker(RenderInvoker::detect().await)
    }

    /// Create a session around a specific invoker.
    pub fn with_invoker(invoker: RenderInvoker) -> Self {
        Self {
            invoker,
            generation: AtomicU64::new(0),
        }
    }

    /// Compare two directory roots.
    ///
    /// Fails if either root is unreadable; failures below the roots
    /// are embedded per-node and excluded from the counts. Walks the
    /// filesystem synchronously — call it off any UI-blocking path
    /// (e.g. inside `spawn_blocking`).
    pub fn get_file_tree(
        &self,
        left_dir: &Path,
        right_dir: &Path,
    ) -> Result<FileTreeResult, SessionError> {
        let diff = diff_trees(left_dir, right_dir)?;
        let files = diff.changed_files();
        let summary = diff.summary;
        Ok(FileTreeResult {
            tree: diff.tree,
            files,
            total_changes: summary.total_changes(),
            added: summary.added,
            deleted: summary.deleted,
            modified: summary.modified,
            renamed: summary.renamed,
        })
    }

    /// Render the diff for one file pair.
    ///
    /// Returns `Ok(None)` when a newer request superseded this one
    /// while it ran; the caller simply drops it.
    pub async fn get_diff(
        &self,
        left: Option<&Path>,
        right: Option<&Path>,
        options: &DiffOptions,
    ) -> Result<Option<DiffResult>, SessionError> {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let raw = self.invoker.render(left, right, options).await?;
        if self.generation.load(Ordering::SeqCst) != token {
            debug!("discarding stale render {token}");
            return Ok(None);
        }
        let both_sides = left.is_some() && right.is_some();
        Ok(Some(build_diff_result(raw, options, both_sides)))
    }

    /// Probe for the external highlighter. Absence is `false`, never
    /// an error.
    pub async fn check_tool_available(&self) -> bool {
        check_tool_available(DEFAULT_TOOL).await
    }

    /// Read a file as text, for previews outside the diff pipeline.
    pub fn read_raw_file(&self, path: &Path) -> Result<String, SessionError> {
        let bytes = std::fs::read(path)?;
        String::from_utf8(bytes).map_err(|_| SessionError::NotUtf8(path.to_path_buf()))
    }
}
