//! Escape-sequence conversion: raw highlighter output to styled lines.
//!
//! A single pass over the stream maintains one explicit state object
//! with the active style attributes. Styling sequences update it,
//! reset sequences clear it, and every newline closes the open run
//! and clears the state — no attribute persists across lines, which
//! matches how diff highlighters emit self-contained per-line
//! styling. Anything the tokenizer cannot parse is absorbed without
//! ever reaching the output or the state.

use crate::types::{Color, LineKind, MarkupLine, NamedColor, StyledRun, TextStyle};
use ansi_parser::{AnsiParser, AnsiSequence, Output};
use log::trace;

/// Convert a raw stream into classified, styled lines.
///
/// Never fails; a stream without escape sequences comes back as its
/// own lines, unstyled.
pub fn convert_stream(raw: &str) -> Vec<MarkupLine> {
    let mut converter = Converter::default();
    for block in raw.ansi_parse() {
        match block {
            Output::TextBlock(text) => converter.push_text(text),
            Output::Escape(AnsiSequence::SetGraphicsMode(params)) => converter.set_graphics(&params),
            // Cursor movement and the like carry no styling; inert.
            Output::Escape(other) => trace!("ignoring non-styling sequence {:?}", other),
        }
    }
    converter.finish()
}

/// Classify a line by the plain text the highlighter preserved.
fn classify(plain: &str) -> LineKind {
    if plain.starts_with("@@") {
        LineKind::HunkHeader
    } else if plain.starts_with('+') {
        LineKind::Added
    } else if plain.starts_with('-') {
        LineKind::Removed
    } else {
        LineKind::Context
    }
}

#[derive(Default)]
struct Converter {
    state: SgrState,
    current_text: String,
    runs: Vec<StyledRun>,
    lines: Vec<MarkupLine>,
    /// Inside an escape sequence the tokenizer passed through as
    /// text (unrecognized or truncated); absorbed until terminated.
    absorbing: bool,
}

impl Converter {
    fn push_text(&mut self, text: &str) {
        for c in text.chars() {
            if self.absorbing {
                if c == '\n' {
                    self.absorbing = false;
                    self.end_line();
                } else if c.is_ascii_alphabetic() {
                    self.absorbing = false;
                }
                continue;
            }
            match c {
                '\x1b' => self.absorbing = true,
                '\n' => self.end_line(),
                '\r' => {}
                c => self.current_text.push(c),
            }
        }
    }

    fn set_graphics(&mut self, params: &[u8]) {
        self.flush_run();
        self.state.apply(params);
    }

    fn flush_run(&mut self) {
        if self.current_text.is_empty() {
            return;
        }
        self.runs.push(StyledRun {
            text: std::mem::take(&mut self.current_text),
            style: self.state.style(),
        });
    }

    fn end_line(&mut self) {
        self.flush_run();
        let runs = std::mem::take(&mut self.runs);
        let plain: String = runs.iter().map(|run| run.text.as_str()).collect();
        self.lines.push(MarkupLine {
            kind: classify(&plain),
            runs,
        });
        self.state.reset();
    }

    fn finish(mut self) -> Vec<MarkupLine> {
        // Implicitly close unterminated trailing state.
        self.flush_run();
        if !self.runs.is_empty() {
            self.end_line();
        }
        self.lines
    }
}

/// Active SGR attributes, built fresh per conversion call.
#[derive(Debug, Clone, Default)]
struct SgrState {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
    faint: bool,
    italic: bool,
    underline: bool,
}

impl SgrState {
    fn reset(&mut self) {
        *self = SgrState::default();
    }

    fn style(&self) -> TextStyle {
        TextStyle {
            fg: self.fg,
            bg: self.bg,
            bold: self.bold,
            faint: self.faint,
            italic: self.italic,
            underline: self.underline,
        }
    }

    /// Apply one SGR parameter list. Unknown codes leave the state
    /// untouched; a malformed extended-color tail ends the list.
    fn apply(&mut self, params: &[u8]) {
        if params.is_empty() {
            self.reset();
            return;
        }
        let mut i = 0;
        while i < params.len() {
            let code = params[i];
            match code {
                0 => self.reset(),
                1 => self.bold = true,
                2 => self.faint = true,
                3 => self.italic = true,
                4 => self.underline = true,
                22 => {
                    self.bold = false;
                    self.faint = false;
                }
                23 => self.italic = false,
                24 => self.underline = false,
                30..=37 => self.fg = Some(Color::Named(NamedColor::from_index(code - 30))),
                39 => self.fg = None,
                40..=47 => self.bg = Some(Color::Named(NamedColor::from_index(code - 40))),
                49 => self.bg = None,
                90..=97 => self.fg = Some(Color::Named(NamedColor::from_index(code - 90 + 8))),
                100..=107 => self.bg = Some(Color::Named(NamedColor::from_index(code - 100 + 8))),
                38 | 48 => match extended_color(&params[i + 1..]) {
                    Some((color, consumed)) => {
                        if code == 38 {
                            self.fg = Some(color);
                        } else {
                            self.bg = Some(color);
                        }
                        i += consumed;
                    }
                    None => {
                        trace!("malformed extended color tail: {:?}", &params[i..]);
                        return;
                    }
                },
                _ => {}
            }
            i += 1;
        }
    }
}

/// Decode the tail of a `38;…`/`48;…` extended-color parameter:
/// `5;n` palette or `2;r;g;b` truecolor. Returns the color and how
/// many parameters were consumed.
fn extended_color(rest: &[u8]) -> Option<(Color, usize)> {
    match rest.first()? {
        5 => Some((Color::Palette256(*rest.get(1)?), 2)),
        2 => Some((
            Color::Rgb(*rest.get(1)?, *rest.get(2)?, *rest.get(3)?),
            4,
        )),
        _ => None,
    }
}
