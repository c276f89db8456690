//! Render pipeline errors.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while producing a raw diff stream.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("nothing to diff: both sides absent")]
    NothingToDiff,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to launch highlighter: {0}")]
    Launch(#[source] std::io::Error),
    #[error("highlighter timed out after {0:?}")]
    Timeout(Duration),
    #[error("highlighter exited with {code:?}: {stderr}")]
    ToolFailed { code: Option<i32>, stderr: String },
    #[error("highlighter produced invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
