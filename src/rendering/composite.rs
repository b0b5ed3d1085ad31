use image::{Rgba, RgbaImage};

/// Source-over blend of `top` onto `bottom` (straight alpha), rounded to the
/// nearest channel value. An opaque `bottom` stays opaque.
pub fn blend_over(bottom: Rgba<u8>, top: Rgba<u8>) -> Rgba<u8> {
    let top_alpha = top[3] as u32;
    let bottom_alpha = bottom[3] as u32;
    if top_alpha == 255 {
        return top;
    }
    if top_alpha == 0 {
        return bottom;
    }

    // Alpha weights scaled by 255 so the arithmetic stays in integers.
    let top_weight = top_alpha * 255;
    let bottom_weight = bottom_alpha * (255 - top_alpha);
    let total = top_weight + bottom_weight;
    if total == 0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |index: usize| {
        let sum = top[index] as u32 * top_weight + bottom[index] as u32 * bottom_weight;
        ((sum + total / 2) / total) as u8
    };
    Rgba([
        channel(0),
        channel(1),
        channel(2),
        ((total + 127) / 255) as u8,
    ])
}

/// Copy of `source` with `band` alpha-blended over it, band top at `origin_y`
pub fn composite_band(source: &RgbaImage, band: &RgbaImage, origin_y: u32) -> RgbaImage {
    let mut result = source.clone();
    let (width, height) = result.dimensions();

    for (x, y, pixel) in band.enumerate_pixels() {
        let target_y = origin_y.saturating_add(y);
        if x >= width || target_y >= height {
            continue;
        }
        let below = *result.get_pixel(x, target_y);
        result.put_pixel(x, target_y, blend_over(below, *pixel));
    }
    result
}

/// `band` placed on a fully transparent canvas of the given size
pub fn isolate_band(width: u32, height: u32, band: &RgbaImage, origin_y: u32) -> RgbaImage {
    let canvas = RgbaImage::new(width, height);
    composite_band(&canvas, band, origin_y)
}
