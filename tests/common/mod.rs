//! Fixed-pitch font provider so pipeline tests need no font files.
//!
//! Regular glyphs advance half the size, bold glyphs 0.6, whitespace a
//! quarter. Ascent is the size, descent a quarter of it; glyphs paint as
//! solid boxes.

use caption_band::rendering::{FaceKey, FontError, FontMetrics, FontProvider};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

pub struct FixedPitchFonts;

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

impl FontProvider for FixedPitchFonts {
    fn metrics(&self, key: FaceKey) -> Result<FontMetrics, FontError> {
        Ok(FontMetrics {
            ascent: key.size,
            descent: key.size / 4,
        })
    }

    fn text_width(&self, key: FaceKey, text: &str) -> Result<f32, FontError> {
        Ok(text.chars().map(|c| advance(key, c)).sum())
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
            let step = advance(key, c);
            let width = step.floor() as u32;
            if !c.is_whitespace() && width > 0 && key.size > 0 {
                draw_filled_rect_mut(
                    canvas,
                    Rect::at(pen_x as i32, y).of_size(width, key.size),
                    color,
                );
            }
            pen_x += step;
        }
        Ok(())
    }
}
