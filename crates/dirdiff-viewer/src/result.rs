//! Diff result assembly from the raw render pipeline.

use dirdiff_markup::{
    convert_stream, index_hunks, render_columns, render_markup, split_columns, Hunk,
};
use dirdiff_render::{DiffOptions, RawContent, RawDiff};
use serde::{Deserialize, Serialize};

/// Rendered diff for one file pair.
///
/// Rebuilt wholesale on every file selection or option change and
/// never cached across option toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffResult {
    /// Unified markup stream.
    pub markup: String,
    /// Left (old) column markup; present only when a side-by-side
    /// layout was requested and both sides exist.
    pub left_markup: Option<String>,
    /// Right (new) column markup, mirror of `left_markup`.
    pub right_markup: Option<String>,
    /// Whether the pair differs at all.
    pub has_changes: bool,
    /// Navigable hunk start positions, in order.
    pub hunks: Vec<Hunk>,
    /// Number of navigable hunks; always `hunks.len()`.
    pub hunk_count: usize,
    /// The external highlighter could not be used; the markup is the
    /// unstyled built-in diff.
    pub used_fallback: bool,
    /// Binary sentinel: non-text content, no markup body.
    pub is_binary: bool,
}

pub(crate) fn build_diff_result(
    raw: RawDiff,
    options: &DiffOptions,
    both_sides: bool,
) -> DiffResult {
    let text = match raw.content {
        RawContent::Binary => {
            return DiffResult {
                markup: String::new(),
                left_markup: None,
                right_markup: None,
                has_changes: raw.has_changes,
                hunks: Vec::new(),
                hunk_count: 0,
                used_fallback: raw.used_fallback,
                is_binary: true,
            }
        }
        RawContent::Text(text) => text,
    };

    let lines = convert_stream(&text);
    let hunks = index_hunks(&lines);
    let markup = render_markup(&lines, options.line_numbers);

    let (left_markup, right_markup) = if options.side_by_side && both_sides {
        let side = split_columns(&lines);
        let (left, right) = render_columns(&side, options.line_numbers);
        (Some(left), Some(right))
    } else {
        (None, None)
    };

    DiffResult {
        markup,
        left_markup,
        right_markup,
        has_changes: raw.has_changes,
        hunk_count: hunks.len(),
        hunks,
        used_fallback: raw.used_fallback,
        is_binary: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text_raw(stream: &str) -> RawDiff {
        RawDiff {
            content: RawContent::Text(stream.to_string()),
            has_changes: !stream.is_empty(),
            used_fallback: false,
        }
    }

    #[test]
    fn test_hunk_count_matches_markup() {
        let raw = text_raw("@@ -1,1 +1,1 @@\n-a\n+b\n");
        let result = build_diff_result(raw, &DiffOptions::default(), true);
        assert!(result.has_changes);
        assert_eq!(result.hunk_count, 1);
        assert_eq!(result.hunk_count, result.hunks.len());
        assert_eq!(result.hunks[0].row, 0);
        assert!(result.markup.contains("line removed"));
        assert!(result.markup.contains("line added"));
    }

    #[test]
    fn test_side_by_side_needs_both_sides() {
        let options = DiffOptions {
            side_by_side: true,
            ..DiffOptions::default()
        };

        let result = build_diff_result(text_raw("+new file\n"), &options, false);
        assert!(result.left_markup.is_none());
        assert!(result.right_markup.is_none());

        let result = build_diff_result(text_raw("-a\n+b\n"), &options, true);
        assert!(result.left_markup.is_some());
        assert!(result.right_markup.is_some());
    }

    #[test]
    fn test_unified_only_by_default() {
        let result = build_diff_result(text_raw("-a\n+b\n"), &DiffOptions::default(), true);
        assert!(result.left_markup.is_none());
        assert!(result.right_markup.is_none());
        assert!(!result.markup.is_empty());
    }

    #[test]
    fn test_binary_sentinel_has_no_markup_body() {
        let raw = RawDiff {
            content: RawContent::Binary,
            has_changes: true,
            used_fallback: false,
        };
        let result = build_diff_result(raw, &DiffOptions::default(), true);
        assert!(result.is_binary);
        assert!(result.markup.is_empty());
        assert_eq!(result.hunk_count, 0);
        assert!(result.has_changes);
    }
}
