//! # dirdiff-viewer
//!
//! Core of a directory diff viewer: compares two directory trees,
//! classifies every path, and renders a navigable, syntax-highlighted
//! diff for any changed file by piping a built-in unified diff
//! through the external `delta` highlighter and converting its
//! terminal-color output into structured markup.
//!
//! The crate is designed to be **instrumented**: it exposes a small
//! session API and emits immutable snapshots (a file tree, a diff
//! result), leaving window chrome, key handling and styling to the
//! embedding presentation layer.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dirdiff_viewer::{DiffOptions, DiffSession};
//! use std::path::Path;
//!
//! let session = DiffSession::detect().await;
//!
//! // Once per directory-pair selection:
//! let tree = session.get_file_tree(Path::new("old"), Path::new("new"))?;
//! println!("{} changed files", tree.total_changes);
//!
//! // Once per selected file (or option toggle):
//! let entry = &tree.files[0];
//! let result = session
//!     .get_diff(entry.left_path.as_deref(), entry.right_path.as_deref(), &DiffOptions::default())
//!     .await?;
//! ```

mod result;
mod session;

pub use result::DiffResult;
pub use session::{DiffSession, FileTreeResult, SessionError};

// Re-export the types the session API speaks in.
pub use dirdiff_markup::Hunk;
pub use dirdiff_render::{
    DeltaHighlighter, DiffOptions, Highlighter, PlainHighlighter, RenderInvoker,
};
pub use dirdiff_tree::{FileEntry, FileStatus, TreeNode, TreeSummary};
