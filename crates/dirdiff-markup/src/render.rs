//! Render converted lines to markup text.
//!
//! The markup vocabulary is deliberately small: one `<div>` per line
//! carrying its kind as a class, one `<span>` per styled run. Named
//! and palette colors become class tokens, truecolor becomes an
//! inline style. All text is escaped so it renders as data.

use crate::columns::{ColumnCell, LineCounter, SideBySide};
use crate::types::{Color, LineKind, MarkupLine, StyledRun};
use std::fmt::Write;

/// Escape markup-significant characters.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

fn kind_class(kind: LineKind) -> &'static str {
    match kind {
        LineKind::Context => "context",
        LineKind::Added => "added",
        LineKind::Removed => "removed",
        LineKind::HunkHeader => "hunk-header",
    }
}

fn push_span(out: &mut String, run: &StyledRun) {
    if run.style.is_plain() {
        out.push_str(&escape_text(&run.text));
        return;
    }

    let mut classes = Vec::new();
    let mut css = Vec::new();
    match run.style.fg {
        Some(Color::Named(name)) => classes.push(format!("fg-{}", name.as_str())),
        Some(Color::Palette256(index)) => classes.push(format!("fg-256-{index}")),
        Some(Color::Rgb(r, g, b)) => css.push(format!("color:#{r:02x}{g:02x}{b:02x}")),
        None => {}
    }
    match run.style.bg {
        Some(Color::Named(name)) => classes.push(format!("bg-{}", name.as_str())),
        Some(Color::Palette256(index)) => classes.push(format!("bg-256-{index}")),
        Some(Color::Rgb(r, g, b)) => {
            css.push(format!("background-color:#{r:02x}{g:02x}{b:02x}"))
        }
        None => {}
    }
    for (on, token) in [
        (run.style.bold, "bold"),
        (run.style.faint, "faint"),
        (run.style.italic, "italic"),
        (run.style.underline, "underline"),
    ] {
        if on {
            classes.push(token.to_string());
        }
    }

    out.push_str("<span");
    if !classes.is_empty() {
        let _ = write!(out, " class=\"{}\"", classes.join(" "));
    }
    if !css.is_empty() {
        let _ = write!(out, " style=\"{}\"", css.join(";"));
    }
    out.push('>');
    out.push_str(&escape_text(&run.text));
    out.push_str("</span>");
}

fn push_gutter(out: &mut String, number: Option<u32>) {
    match number {
        Some(n) => {
            let _ = write!(out, "<span class=\"lineno\">{n}</span>");
        }
        None => out.push_str("<span class=\"lineno\"></span>"),
    }
}

fn push_line(
    out: &mut String,
    line: &MarkupLine,
    numbers: Option<(Option<u32>, Option<u32>)>,
) {
    let _ = write!(out, "<div class=\"line {}\">", kind_class(line.kind));
    if let Some((old, new)) = numbers {
        push_gutter(out, old);
        push_gutter(out, new);
    }
    for run in &line.runs {
        push_span(out, run);
    }
    out.push_str("</div>");
}

/// Render the unified stream. With `line_numbers`, each line gets an
/// old/new ordinal gutter tracked from the `@@` separators.
pub fn render_markup(lines: &[MarkupLine], line_numbers: bool) -> String {
    let mut counter = LineCounter::new();
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let numbers = if line_numbers {
            Some(match line.kind {
                LineKind::HunkHeader => {
                    counter.header(&line.plain_text());
                    (None, None)
                }
                LineKind::Context => {
                    let (old, new) = counter.context();
                    (Some(old), Some(new))
                }
                LineKind::Removed => (Some(counter.removed()), None),
                LineKind::Added => (None, Some(counter.added())),
            })
        } else {
            None
        };
        push_line(&mut out, line, numbers);
    }
    out
}

fn render_column(cells: &[ColumnCell], line_numbers: bool) -> String {
    let mut out = String::new();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        match &cell.line {
            Some(line) => {
                let _ = write!(out, "<div class=\"line {}\">", kind_class(line.kind));
                // One ordinal per column cell.
                if line_numbers {
                    push_gutter(&mut out, cell.number);
                }
                for run in &line.runs {
                    push_span(&mut out, run);
                }
                out.push_str("</div>");
            }
            None => out.push_str("<div class=\"line filler\"></div>"),
        }
    }
    out
}

/// Render both columns of a side-by-side layout.
pub fn render_columns(side: &SideBySide, line_numbers: bool) -> (String, String) {
    (
        render_column(&side.left, line_numbers),
        render_column(&side.right, line_numbers),
    )
}
