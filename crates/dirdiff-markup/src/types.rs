//! Type definitions for converted diff markup.

use serde::{Deserialize, Serialize};

/// A line of converted markup: its classified kind and styled runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupLine {
    /// Classified line kind.
    pub kind: LineKind,
    /// Styled runs making up the line, in order.
    pub runs: Vec<StyledRun>,
}

impl MarkupLine {
    /// The line's text without any styling.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    /// Whether this line is part of a change run.
    pub fn is_changed(&self) -> bool {
        matches!(self.kind, LineKind::Added | LineKind::Removed)
    }
}

/// Kind of a converted line.
///
/// Classification is by plain-text prefix; the stream this crate
/// consumes carries hunk bodies only, never `---`/`+++` file headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineKind {
    /// Unchanged context.
    Context,
    /// Added line (`+`).
    Added,
    /// Removed line (`-`).
    Removed,
    /// `@@` separator between change regions.
    HunkHeader,
}

/// A run of text with one active style.
///
/// Run boundaries occur only at attribute changes or line breaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledRun {
    /// The text content.
    pub text: String,
    /// Active style attributes.
    pub style: TextStyle,
}

impl StyledRun {
    /// Create an unstyled run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
        }
    }
}

/// Style attributes active for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Foreground color.
    pub fg: Option<Color>,
    /// Background color.
    pub bg: Option<Color>,
    /// Bold text.
    pub bold: bool,
    /// Faint/dim text.
    pub faint: bool,
    /// Italic text.
    pub italic: bool,
    /// Underlined text.
    pub underline: bool,
}

impl TextStyle {
    /// Whether no attribute is set.
    pub fn is_plain(&self) -> bool {
        *self == TextStyle::default()
    }
}

/// Color in one of the three terminal color modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    /// 24-bit RGB color.
    Rgb(u8, u8, u8),
    /// 256-color palette index.
    Palette256(u8),
    /// Named ANSI color (0-15).
    Named(NamedColor),
}

/// Standard ANSI named colors (0-15).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl NamedColor {
    /// Map a 0-15 palette index to its named color.
    pub(crate) fn from_index(index: u8) -> Self {
        match index {
            0 => NamedColor::Black,
            1 => NamedColor::Red,
            2 => NamedColor::Green,
            3 => NamedColor::Yellow,
            4 => NamedColor::Blue,
            5 => NamedColor::Magenta,
            6 => NamedColor::Cyan,
            7 => NamedColor::White,
            8 => NamedColor::BrightBlack,
            9 => NamedColor::BrightRed,
            10 => NamedColor::BrightGreen,
            11 => NamedColor::BrightYellow,
            12 => NamedColor::BrightBlue,
            13 => NamedColor::BrightMagenta,
            14 => NamedColor::BrightCyan,
            _ => NamedColor::BrightWhite,
        }
    }

    /// Stable lowercase name used in markup classes.
    pub fn as_str(&self) -> &'static str {
        match self {
            NamedColor::Black => "black",
            NamedColor::Red => "red",
            NamedColor::Green => "green",
            NamedColor::Yellow => "yellow",
            NamedColor::Blue => "blue",
            NamedColor::Magenta => "magenta",
            NamedColor::Cyan => "cyan",
            NamedColor::White => "white",
            NamedColor::BrightBlack => "bright-black",
            NamedColor::BrightRed => "bright-red",
            NamedColor::BrightGreen => "bright-green",
            NamedColor::BrightYellow => "bright-yellow",
            NamedColor::BrightBlue => "bright-blue",
            NamedColor::BrightMagenta => "bright-magenta",
            NamedColor::BrightCyan => "bright-cyan",
            NamedColor::BrightWhite => "bright-white",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_joins_runs() {
        let line = MarkupLine {
            kind: LineKind::Added,
            runs: vec![StyledRun::plain("+let "), StyledRun::plain("x = 1;")],
        };
        assert_eq!(line.plain_text(), "+let x = 1;");
        assert!(line.is_changed());
    }

    #[test]
    fn test_named_color_round_trip() {
        assert_eq!(NamedColor::from_index(1), NamedColor::Red);
        assert_eq!(NamedColor::from_index(9), NamedColor::BrightRed);
        assert_eq!(NamedColor::from_index(1).as_str(), "red");
    }

    #[test]
    fn test_default_style_is_plain() {
        assert!(TextStyle::default().is_plain());
        let styled = TextStyle {
            bold: true,
            ..TextStyle::default()
        };
        assert!(!styled.is_plain());
    }
}
