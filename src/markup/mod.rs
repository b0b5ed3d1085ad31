//! Caption markup model
//!
//! Captions carry a tiny inline markup subset: `<b>`, `<i>`, `<u>` and `<br>`.
//! The parser turns markup into [`LogicalLine`]s made of [`StyledRun`]s; the
//! layout engine never sees tags.

pub mod parser;

pub use parser::parse;

use std::fmt;

/// Set of text style flags applied to a run
///
/// The domain only ever has three flags, so this is a plain bit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StyleSet(u8);

impl StyleSet {
    pub const BOLD: StyleSet = StyleSet(0b001);
    pub const ITALIC: StyleSet = StyleSet(0b010);
    pub const UNDERLINE: StyleSet = StyleSet(0b100);

    /// No styles applied
    pub const fn plain() -> Self {
        StyleSet(0)
    }

    pub const fn with(self, other: StyleSet) -> Self {
        StyleSet(self.0 | other.0)
    }

    pub const fn contains(self, other: StyleSet) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_bold(self) -> bool {
        self.contains(Self::BOLD)
    }

    pub fn is_italic(self) -> bool {
        self.contains(Self::ITALIC)
    }

    pub fn is_underline(self) -> bool {
        self.contains(Self::UNDERLINE)
    }

    pub fn is_plain(self) -> bool {
        self.0 == 0
    }

    /// Styles that select a different font face.
    ///
    /// Underline is a decoration drawn by the renderer, so two runs that only
    /// differ in underline share a face.
    pub fn face(self) -> Self {
        StyleSet(self.0 & (Self::BOLD.0 | Self::ITALIC.0))
    }
}

impl fmt::Display for StyleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_plain() {
            return write!(f, "plain");
        }
        let names: Vec<&str> = [
            (Self::BOLD, "bold"),
            (Self::ITALIC, "italic"),
            (Self::UNDERLINE, "underline"),
        ]
        .iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| *name)
        .collect();
        write!(f, "{}", names.join("+"))
    }
}

/// A span of caption text sharing one style set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledRun {
    pub text: String,
    pub styles: StyleSet,
}

impl StyledRun {
    pub fn new(text: impl Into<String>, styles: StyleSet) -> Self {
        Self {
            text: text.into(),
            styles,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, StyleSet::plain())
    }
}

/// Text between two explicit line breaks, before width-based wrapping
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogicalLine {
    pub runs: Vec<StyledRun>,
}

impl LogicalLine {
    pub fn new(runs: Vec<StyledRun>) -> Self {
        Self { runs }
    }

    /// True when the line has no runs or only whitespace.
    ///
    /// Blank lines still take up one line of vertical space.
    pub fn is_blank(&self) -> bool {
        self.runs.iter().all(|run| run.text.trim().is_empty())
    }
}

/// True when none of the lines carries visible text
pub fn has_visible_text(lines: &[LogicalLine]) -> bool {
    lines.iter().any(|line| !line.is_blank())
}
