//! Caption layout: wrapping logical lines and choosing a font size
//!
//! Everything here is measured through a [`FontProvider`](crate::rendering::FontProvider),
//! so layout never touches pixels.

pub mod breaker;
pub mod optimizer;

pub use breaker::{break_line, split_words};
pub use optimizer::{optimize, size_ceiling};

use crate::markup::StyleSet;

/// Pixel geometry of a caption band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandGeometry {
    pub width: u32,
    pub height: u32,
    /// Margin applied on both the left and the right edge
    pub margin_x: u32,
    pub margin_top: u32,
    pub margin_bottom: u32,
}

impl BandGeometry {
    pub fn available_width(&self) -> f32 {
        self.width.saturating_sub(self.margin_x.saturating_mul(2)) as f32
    }

    pub fn available_height(&self) -> u32 {
        self.height
            .saturating_sub(self.margin_top)
            .saturating_sub(self.margin_bottom)
    }
}

/// A measured word or whitespace unit
#[derive(Debug, Clone, PartialEq)]
pub struct RenderableWord {
    pub text: String,
    pub styles: StyleSet,
    pub width: f32,
    pub ascent: u32,
    pub descent: u32,
}

impl RenderableWord {
    pub fn is_whitespace(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }
}

/// One rendered row of caption text
#[derive(Debug, Clone, PartialEq)]
pub struct SubLine {
    pub words: Vec<RenderableWord>,
    /// Largest ascent plus largest descent among the words
    pub height: u32,
    /// Distance from the row's top to the shared baseline
    pub max_ascent: u32,
    /// A single word is wider than the available width
    pub overflows: bool,
}

impl SubLine {
    /// Vertical space left by an empty logical line
    pub fn blank(height: u32) -> Self {
        Self {
            words: Vec::new(),
            height,
            max_ascent: 0,
            overflows: false,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.words.is_empty()
    }

    pub fn width(&self) -> f32 {
        self.words.iter().map(|word| word.width).sum()
    }

    pub fn text(&self) -> String {
        self.words.iter().map(|word| word.text.as_str()).collect()
    }
}

/// Font size and wrapped rows of a caption that fits its band
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub font_size: u32,
    pub sub_lines: Vec<SubLine>,
}

impl Layout {
    pub fn total_height(&self) -> u32 {
        self.sub_lines.iter().map(|line| line.height).sum()
    }
}

/// Outcome of the font-size search
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutResult {
    Fits(Layout),
    /// No visible text, or even the smallest size overflows the band
    NoFit,
}

impl LayoutResult {
    pub fn layout(&self) -> Option<&Layout> {
        match self {
            LayoutResult::Fits(layout) => Some(layout),
            LayoutResult::NoFit => None,
        }
    }

    pub fn font_size(&self) -> Option<u32> {
        self.layout().map(|layout| layout.font_size)
    }
}
