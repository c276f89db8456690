//! Raw diff rendering for a single file pair.
//!
//! A unified diff is always generated in-process with a line diff;
//! when the external highlighter is available the text is piped
//! through it for word-level styling, driven so that its output
//! stays structurally identical to the input (every line keeps its
//! `+`/`-`/`@@` prefix). The highlighter is an untrusted, optional
//! capability: absence, launch failure, unexpected exit and timeout
//! all degrade to the unstyled text with an advisory flag.

mod error;
mod highlight;
mod invoker;
mod options;
mod unified;

pub use error::RenderError;
pub use highlight::{check_tool_available, DeltaHighlighter, Highlighter, PlainHighlighter, DEFAULT_TOOL};
pub use invoker::{RawContent, RawDiff, RenderInvoker};
pub use options::DiffOptions;
pub use unified::unified_diff_text;
