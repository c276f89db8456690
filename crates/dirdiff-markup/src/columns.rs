//! Two-column (old/new) layout derived from converted markup.

use crate::types::{LineKind, MarkupLine};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static HUNK_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@@ -(\d+)(?:,\d+)? \+(\d+)(?:,\d+)? @@").unwrap());

/// Parse an `@@ -a,b +c,d @@` separator into its start lines.
pub(crate) fn parse_hunk_header(plain: &str) -> Option<(u32, u32)> {
    let caps = HUNK_HEADER.captures(plain)?;
    let old = caps.get(1)?.as_str().parse().ok()?;
    let new = caps.get(2)?.as_str().parse().ok()?;
    Some((old, new))
}

/// Tracks old/new line ordinals across a converted stream, seeded by
/// each `@@` separator.
#[derive(Debug, Default)]
pub(crate) struct LineCounter {
    old: u32,
    new: u32,
}

impl LineCounter {
    pub(crate) fn new() -> Self {
        Self { old: 1, new: 1 }
    }

    pub(crate) fn header(&mut self, plain: &str) {
        if let Some((old, new)) = parse_hunk_header(plain) {
            self.old = old;
            self.new = new;
        }
    }

    pub(crate) fn context(&mut self) -> (u32, u32) {
        let pair = (self.old, self.new);
        self.old += 1;
        self.new += 1;
        pair
    }

    pub(crate) fn removed(&mut self) -> u32 {
        let old = self.old;
        self.old += 1;
        old
    }

    pub(crate) fn added(&mut self) -> u32 {
        let new = self.new;
        self.new += 1;
        new
    }
}

/// One row cell in a column. An empty cell (`line: None`) is the
/// placeholder that keeps the opposite column's row aligned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCell {
    /// The line shown in this cell, absent for placeholder rows.
    pub line: Option<MarkupLine>,
    /// Source line ordinal (old side in the left column, new side in
    /// the right). Absent for placeholders and separators.
    pub number: Option<u32>,
}

impl ColumnCell {
    fn filled(line: MarkupLine, number: Option<u32>) -> Self {
        Self {
            line: Some(line),
            number,
        }
    }

    fn placeholder() -> Self {
        Self {
            line: None,
            number: None,
        }
    }
}

/// Aligned old/new column streams. Both columns always hold the same
/// number of rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SideBySide {
    pub left: Vec<ColumnCell>,
    pub right: Vec<ColumnCell>,
}

impl SideBySide {
    /// Number of aligned rows.
    pub fn row_count(&self) -> usize {
        debug_assert_eq!(self.left.len(), self.right.len());
        self.left.len()
    }
}

/// Derive the two-column layout from a converted stream.
///
/// Context and separator lines appear in both columns at the same
/// row. A removal run immediately followed by an addition run is a
/// changed region: its lines pair up row-wise (left=old, right=new),
/// and whichever run is longer fills the other column with
/// placeholders. Unpaired removals and additions mirror with a
/// placeholder on the opposite side.
pub fn split_columns(lines: &[MarkupLine]) -> SideBySide {
    let mut counter = LineCounter::new();
    let mut side = SideBySide::default();

    let mut i = 0;
    while i < lines.len() {
        let line = &lines[i];
        match line.kind {
            LineKind::HunkHeader => {
                counter.header(&line.plain_text());
                side.left.push(ColumnCell::filled(line.clone(), None));
                side.right.push(ColumnCell::filled(line.clone(), None));
                i += 1;
            }
            LineKind::Context => {
                let (old, new) = counter.context();
                side.left.push(ColumnCell::filled(line.clone(), Some(old)));
                side.right.push(ColumnCell::filled(line.clone(), Some(new)));
                i += 1;
            }
            LineKind::Removed => {
                let removed_start = i;
                while i < lines.len() && lines[i].kind == LineKind::Removed {
                    i += 1;
                }
                let added_start = i;
                while i < lines.len() && lines[i].kind == LineKind::Added {
                    i += 1;
                }
                let removed = &lines[removed_start..added_start];
                let added = &lines[added_start..i];

                for row in 0..removed.len().max(added.len()) {
                    side.left.push(match removed.get(row) {
                        Some(line) => ColumnCell::filled(line.clone(), Some(counter.removed())),
                        None => ColumnCell::placeholder(),
                    });
                    side.right.push(match added.get(row) {
                        Some(line) => ColumnCell::filled(line.clone(), Some(counter.added())),
                        None => ColumnCell::placeholder(),
                    });
                }
            }
            LineKind::Added => {
                side.left.push(ColumnCell::placeholder());
                side.right
                    .push(ColumnCell::filled(line.clone(), Some(counter.added())));
                i += 1;
            }
        }
    }

    debug_assert_eq!(side.left.len(), side.right.len());
    side
}
