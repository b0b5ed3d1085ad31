//! Deterministic font provider for unit tests
//!
//! Every glyph is a solid box: regular glyphs advance half the font size,
//! bold glyphs 0.6 of it, whitespace a quarter. Ascent equals the size and
//! descent is a quarter of it.

use super::font::{FaceKey, FontError, FontMetrics, FontProvider};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

pub(crate) struct BlockFonts;

impl BlockFonts {
    fn advance(key: FaceKey, c: char) -> f32 {
        let size = key.size as f32;
        if c.is_whitespace() {
            size * 0.25
        } else if key.styles.is_bold() {
            size * 0.6
        } else {
            size * 0.5
        }
    }
}

impl FontProvider for BlockFonts {
    fn metrics(&self, key: FaceKey) -> Result<FontMetrics, FontError> {
        Ok(FontMetrics {
            ascent: key.size,
            descent: key.size / 4,
        })
    }

    fn text_width(&self, key: FaceKey, text: &str) -> Result<f32, FontError> {
        Ok(text.chars().map(|c| Self::advance(key, c)).sum())
    }

    fn draw_text(
        &self,
        canvas: &mut RgbaImage,
        color: Rgba<u8>,
        x: i32,
        y: i32,
        key: FaceKey,
        text: &str,
    ) -> Result<(), FontError> {
        let mut pen_x = x as f32;
        for c in text.chars() {
            let advance = Self::advance(key, c);
            let width = advance.floor() as u32;
            if !c.is_whitespace() && width > 0 && key.size > 0 {
                let rect = Rect::at(pen_x as i32, y).of_size(width, key.size);
                draw_filled_rect_mut(canvas, rect, color);
            }
            pen_x += advance;
        }
        Ok(())
    }
}

/// Provider whose measurements always fail
pub(crate) struct BrokenFonts;

impl FontProvider for BrokenFonts {
    fn metrics(&self, key: FaceKey) -> Result<FontMetrics, FontError> {
        Err(FontError::Unavailable {
            family: key.family,
            styles: key.styles,
        })
    }

    fn text_width(&self, key: FaceKey, _text: &str) -> Result<f32, FontError> {
        Err(FontError::Unavailable {
            family: key.family,
            styles: key.styles,
        })
    }

    fn draw_text(
        &self,
        _canvas: &mut RgbaImage,
        _color: Rgba<u8>,
        _x: i32,
        _y: i32,
        key: FaceKey,
        _text: &str,
    ) -> Result<(), FontError> {
        Err(FontError::Unavailable {
            family: key.family,
            styles: key.styles,
        })
    }
}
