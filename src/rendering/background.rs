//! Caption band background
//!
//! The band is a flat translucent fill whose inner edge (the one facing the
//! middle of the image) fades in over `transition_proportion` of its height.

use crate::engine::config::Position;
use image::{Rgba, RgbaImage};
use tracing::debug;

/// Number of rows covered by the fade for a band of `band_height` rows
pub fn transition_rows(band_height: u32, transition_proportion: f32) -> u32 {
    let rows = (band_height as f64 * transition_proportion as f64).round();
    (rows.max(0.0) as u32).min(band_height)
}

/// Alpha of the `step`-th row into a fade of `rows` rows, counting from the
/// transparent edge.
fn ramp_alpha(base_alpha: u8, step: u32, rows: u32) -> u8 {
    if rows <= 1 {
        return 0;
    }
    let factor = step as f64 / (rows - 1) as f64;
    (base_alpha as f64 * factor).round() as u8
}

/// Fill `surface` with the band background.
///
/// A bottom band fades in from its top row; a top band fades out toward its
/// bottom row. With no transition the whole band is flat.
pub fn paint_band(
    surface: &mut RgbaImage,
    color: Rgba<u8>,
    position: Position,
    transition_proportion: f32,
) {
    let (width, height) = surface.dimensions();
    for pixel in surface.pixels_mut() {
        *pixel = color;
    }

    let rows = transition_rows(height, transition_proportion);
    if rows == 0 || height == 0 {
        return;
    }
    debug!(rows, ?position, alpha = color[3], "painting band transition");

    let [r, g, b, a] = color.0;
    for step in 0..rows {
        let alpha = ramp_alpha(a, step, rows);
        let y = match position {
            Position::Bottom => step,
            Position::Top => height - 1 - step,
        };
        for x in 0..width {
            surface.put_pixel(x, y, Rgba([r, g, b, alpha]));
        }
    }
}

/// Allocate and paint a band surface
pub fn new_band(
    width: u32,
    height: u32,
    color: Rgba<u8>,
    position: Position,
    transition_proportion: f32,
) -> RgbaImage {
    let mut surface = RgbaImage::new(width, height);
    paint_band(&mut surface, color, position, transition_proportion);
    surface
}
