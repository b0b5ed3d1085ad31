use crate::engine::config::FontFamily;
use crate::markup::StyleSet;
use ab_glyph::{Font, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FontError {
    #[error("No usable {styles} face for font family {family}")]
    Unavailable { family: FontFamily, styles: StyleSet },

    #[error("Invalid font data in {0}")]
    InvalidFont(PathBuf),
}

/// A concrete face request: family, face styles and pixel size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceKey {
    pub family: FontFamily,
    pub styles: StyleSet,
    pub size: u32,
}

impl FaceKey {
    /// Underline is a decoration, so it is dropped from the key.
    pub fn new(family: FontFamily, styles: StyleSet, size: u32) -> Self {
        Self {
            family,
            styles: styles.face(),
            size,
        }
    }

    pub fn scale(&self) -> PxScale {
        PxScale::from(self.size as f32)
    }
}

/// Vertical metrics of a face at one size, in whole pixels
///
/// `descent` is stored as a positive distance below the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontMetrics {
    pub ascent: u32,
    pub descent: u32,
}

impl FontMetrics {
    pub fn line_height(&self) -> u32 {
        self.ascent + self.descent
    }
}

/// Measurement and rasterization of caption text
///
/// Layout only needs widths and vertical metrics; painting goes through the
/// same provider so measured and drawn text agree. Implementations are shared
/// across threads when a batch of captions is processed in parallel.
pub trait FontProvider: Send + Sync {
    fn metrics(&self, key: FaceKey) -> Result<FontMetrics, FontError>;

    /// Advance width of `text` laid out on one line
    fn text_width(&self, key: FaceKey, text: &str) -> Result<f32, FontError>;

    /// Paint `text` with its top-left corner at `(x, y)`; the baseline sits at
    /// `y + metrics(key).ascent`.
    fn draw_text(
        &self,
        canvas: &mut RgbaImage,
        color: Rgba<u8>,
        x: i32,
        y: i32,
        key: FaceKey,
        text: &str,
    ) -> Result<(), FontError>;
}

pub fn calculate_string_width<F: Font>(font: &F, text: &str, font_size: f32) -> f32 {
    let scaled_font = font.as_scaled(PxScale::from(font_size));

    let mut width = 0.0;
    let mut previous = None;
    for c in text.chars() {
        let glyph_id = scaled_font.glyph_id(c);
        if let Some(previous) = previous {
            width += scaled_font.kern(previous, glyph_id);
        }
        width += scaled_font.h_advance(glyph_id);
        previous = Some(glyph_id);
    }
    width
}

pub fn get_font_metrics<F: Font>(font: &F, font_size: f32) -> FontMetrics {
    let metrics = font.as_scaled(PxScale::from(font_size));

    FontMetrics {
        ascent: metrics.ascent().ceil().max(0.0) as u32,
        descent: (-metrics.descent()).ceil().max(0.0) as u32,
    }
}
