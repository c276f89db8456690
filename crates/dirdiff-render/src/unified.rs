//! Built-in unified diff generation.
//!
//! Produces the text stream the highlighter styles: `@@` separators
//! and ` `/`+`/`-` prefixed body lines, no file headers. Identical
//! inputs produce an empty stream.

use similar::{ChangeTag, TextDiff};
use std::fmt::Write;

/// Context lines kept around each change when collapsed.
const COLLAPSED_CONTEXT: usize = 3;

/// Generate unified diff text for two file contents.
///
/// With `collapsed`, unchanged context beyond a three-line window is
/// omitted and each change region gets its own `@@` separator;
/// otherwise the whole file appears as context in a single region.
pub fn unified_diff_text(old: &str, new: &str, collapsed: bool) -> String {
    let diff = TextDiff::from_lines(old, new);
    if collapsed {
        grouped_diff(&diff)
    } else {
        full_diff(&diff)
    }
}

fn grouped_diff(diff: &TextDiff<'_, '_, '_, str>) -> String {
    let mut out = String::new();
    for group in diff.grouped_ops(COLLAPSED_CONTEXT) {
        let first = &group[0];
        let last = &group[group.len() - 1];
        let (old_start, old_count) = header_range(
            first.old_range().start,
            last.old_range().end - first.old_range().start,
        );
        let (new_start, new_count) = header_range(
            first.new_range().start,
            last.new_range().end - first.new_range().start,
        );
        let _ = writeln!(
            out,
            "@@ -{},{} +{},{} @@",
            old_start, old_count, new_start, new_count
        );

        for op in &group {
            for change in diff.iter_changes(op) {
                push_change(&mut out, change.tag(), change.value());
            }
        }
    }
    out
}

fn full_diff<'a>(diff: &TextDiff<'a, 'a, 'a, str>) -> String {
    let mut body = String::new();
    let mut old_count = 0usize;
    let mut new_count = 0usize;
    let mut changed = false;

    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Equal => {
                old_count += 1;
                new_count += 1;
            }
            ChangeTag::Delete => {
                old_count += 1;
                changed = true;
            }
            ChangeTag::Insert => {
                new_count += 1;
                changed = true;
            }
        }
        push_change(&mut body, change.tag(), change.value());
    }

    if !changed {
        return String::new();
    }

    let (old_start, old_count) = header_range(0, old_count);
    let (new_start, new_count) = header_range(0, new_count);
    format!(
        "@@ -{},{} +{},{} @@\n{}",
        old_start, old_count, new_start, new_count, body
    )
}

fn push_change(out: &mut String, tag: ChangeTag, value: &str) {
    let sign = match tag {
        ChangeTag::Equal => ' ',
        ChangeTag::Delete => '-',
        ChangeTag::Insert => '+',
    };
    out.push(sign);
    out.push_str(value.strip_suffix('\n').unwrap_or(value));
    out.push('\n');
}

/// Convert a zero-based range into unified-header numbering: one-based
/// starts, except an empty range which anchors to the line before it.
fn header_range(start: usize, count: usize) -> (usize, usize) {
    if count == 0 {
        (start, 0)
    } else {
        (start + 1, count)
    }
}
