//! View options for a single diff render.

use serde::{Deserialize, Serialize};

/// Options controlling how one file pair is rendered.
///
/// Toggling any field invalidates the previous result for the
/// selected file; results are never cached across toggles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Render two aligned columns instead of one unified stream.
    pub side_by_side: bool,
    /// Include an ordinal gutter.
    pub line_numbers: bool,
    /// Omit unchanged context beyond a small window.
    pub collapsed: bool,
    /// Make whitespace-only changes visible.
    pub show_whitespace: bool,
}
