//! Diff stream markup.
//!
//! Converts the raw output of a diff highlighter — text interleaved
//! with terminal styling escape sequences — into structured, styled
//! lines, and derives the presentation layouts from them: rendered
//! markup, an aligned two-column view, and a hunk index for
//! navigation.
//!
//! The converter never fails: malformed, truncated, or unrecognized
//! escape sequences are absorbed silently and plain text always
//! survives, because highlighter output is not trusted input.

mod columns;
mod convert;
mod hunks;
mod render;
mod types;

pub use columns::{split_columns, ColumnCell, SideBySide};
pub use convert::convert_stream;
pub use hunks::{index_hunks, Hunk};
pub use render::{escape_text, render_columns, render_markup};
pub use types::{Color, LineKind, MarkupLine, NamedColor, StyledRun, TextStyle};
