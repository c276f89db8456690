//! Hunk index: change-run start positions for navigation.

use crate::types::{LineKind, MarkupLine};
use serde::{Deserialize, Serialize};

/// A contiguous change region, identified by its starting row in the
/// converted stream. Navigation only; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    /// Row index of the hunk's start: the `@@` separator that
    /// introduced it, or the first changed line when none did.
    pub row: usize,
}

/// Scan converted markup for hunk starts.
///
/// A boundary is recorded at each explicit `@@` separator and at the
/// first changed line following context; consecutive changed lines
/// share a hunk. This is a best-effort heuristic over rendered
/// markup, not over original line numbers.
pub fn index_hunks(lines: &[MarkupLine]) -> Vec<Hunk> {
    let mut hunks = Vec::new();
    let mut in_change = false;
    let mut pending_header: Option<usize> = None;

    for (row, line) in lines.iter().enumerate() {
        match line.kind {
            LineKind::HunkHeader => {
                pending_header = Some(row);
                in_change = false;
            }
            LineKind::Added | LineKind::Removed => {
                if !in_change {
                    hunks.push(Hunk {
                        row: pending_header.take().unwrap_or(row),
                    });
                    in_change = true;
                }
            }
            LineKind::Context => in_change = false,
        }
    }

    hunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::convert_stream;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_changes_means_no_hunks() {
        let lines = convert_stream(" one\n two\n three\n");
        assert!(index_hunks(&lines).is_empty());
    }

    #[test]
    fn test_consecutive_changes_share_a_hunk() {
        let lines = convert_stream(" ctx\n-a\n-b\n+c\n ctx\n");
        let hunks = index_hunks(&lines);
        assert_eq!(hunks, vec![Hunk { row: 1 }]);
    }

    #[test]
    fn test_separator_starts_the_hunk() {
        let lines = convert_stream("@@ -1,2 +1,2 @@\n-a\n+b\n");
        let hunks = index_hunks(&lines);
        assert_eq!(hunks, vec![Hunk { row: 0 }]);
    }

    #[test]
    fn test_two_regions_two_hunks() {
        let lines = convert_stream("@@ -1,3 +1,3 @@\n-a\n+b\n ctx\n@@ -9,2 +9,2 @@\n ctx\n-x\n+y\n");
        let hunks = index_hunks(&lines);
        assert_eq!(hunks.len(), 2);
        assert_eq!(hunks[0].row, 0);
        assert_eq!(hunks[1].row, 4);
    }

    #[test]
    fn test_change_after_context_without_separator() {
        let lines = convert_stream(" ctx\n+added\n ctx\n+again\n");
        let hunks = index_hunks(&lines);
        assert_eq!(hunks, vec![Hunk { row: 1 }, Hunk { row: 3 }]);
    }
}
