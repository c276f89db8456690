//! Directory tree comparison.
//!
//! Walks two directory roots in lock-step and produces a merged tree
//! in which every path carries a change status (added, deleted,
//! modified, renamed, unchanged). The tree is rebuilt wholesale for
//! every pair of roots; nothing is patched incrementally.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! let diff = dirdiff_tree::diff_trees(Path::new("old"), Path::new("new"))?;
//! for entry in diff.changed_files() {
//!     println!("{} {}", entry.status.as_char(), entry.path);
//! }
//! # Ok::<(), dirdiff_tree::TreeError>(())
//! ```

pub mod compare;
mod differ;
mod model;

pub use differ::{diff_trees, DirDiff, TreeError};
pub use model::{FileEntry, FileStatus, TreeNode, TreeSummary};
