use super::font::{FaceKey, FontError, FontProvider};
use crate::engine::config::FontFamily;
use crate::layout::{BandGeometry, Layout, SubLine};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_line_segment_mut;

/// Underline offset below the baseline, in pixels
const UNDERLINE_OFFSET: i32 = 2;

/// Top edge of the first row so the text block sits centered in the
/// available height
pub fn block_top(layout: &Layout, geometry: &BandGeometry) -> u32 {
    let total = layout.total_height();
    let available = geometry.available_height();
    let padding = if total > 0 && total < available {
        (available - total) / 2
    } else {
        0
    };
    geometry.margin_top + padding
}

/// Left edge of a row centered in the available width, never left of the
/// margin
pub fn row_left(sub_line: &SubLine, geometry: &BandGeometry) -> i32 {
    let slack = geometry.available_width() - sub_line.width();
    let offset = (slack / 2.0).floor() as i32;
    (geometry.margin_x as i32 + offset).max(geometry.margin_x as i32)
}

/// Paint every row of `layout` onto the band surface.
pub fn render_text(
    surface: &mut RgbaImage,
    layout: &Layout,
    family: FontFamily,
    geometry: &BandGeometry,
    color: Rgba<u8>,
    fonts: &dyn FontProvider,
) -> Result<(), FontError> {
    let mut current_y = block_top(layout, geometry) as i32;

    for sub_line in &layout.sub_lines {
        if sub_line.is_blank() {
            current_y += sub_line.height as i32;
            continue;
        }

        let baseline = current_y + sub_line.max_ascent as i32;
        let mut pen_x = row_left(sub_line, geometry) as f32;

        for word in &sub_line.words {
            let key = FaceKey::new(family, word.styles, layout.font_size);
            let top = baseline - word.ascent as i32;
            fonts.draw_text(surface, color, pen_x.round() as i32, top, key, &word.text)?;

            // Segment ends are inclusive, so the last pixel is width - 1 in.
            if word.styles.is_underline() && word.width >= 1.0 {
                let underline_y = (baseline + UNDERLINE_OFFSET) as f32;
                draw_line_segment_mut(
                    surface,
                    (pen_x, underline_y),
                    (pen_x + word.width - 1.0, underline_y),
                    color,
                );
            }
            pen_x += word.width;
        }

        current_y += sub_line.height as i32;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::RenderableWord;
    use crate::markup::StyleSet;
    use crate::rendering::testing::BlockFonts;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    fn geometry() -> BandGeometry {
        BandGeometry {
            width: 100,
            height: 60,
            margin_x: 10,
            margin_top: 10,
            margin_bottom: 10,
        }
    }

    fn word(text: &str, styles: StyleSet, size: u32) -> RenderableWord {
        let per_char = if styles.is_bold() { 0.6 } else { 0.5 };
        RenderableWord {
            text: text.to_string(),
            styles,
            width: text.chars().count() as f32 * size as f32 * per_char,
            ascent: size,
            descent: size / 4,
        }
    }

    fn row(words: Vec<RenderableWord>) -> SubLine {
        let max_ascent = words.iter().map(|w| w.ascent).max().unwrap_or(0);
        let max_descent = words.iter().map(|w| w.descent).max().unwrap_or(0);
        SubLine {
            words,
            height: max_ascent + max_descent,
            max_ascent,
            overflows: false,
        }
    }

    #[test]
    fn test_block_is_vertically_centered() {
        // available 40, one 10px row -> 15px padding
        let layout = Layout {
            font_size: 8,
            sub_lines: vec![row(vec![word("ab", StyleSet::plain(), 8)])],
        };
        assert_eq!(layout.total_height(), 10);
        assert_eq!(block_top(&layout, &geometry()), 25);
    }

    #[test]
    fn test_block_without_slack_starts_at_margin() {
        let layout = Layout {
            font_size: 32,
            sub_lines: vec![row(vec![word("ab", StyleSet::plain(), 32)])],
        };
        assert_eq!(layout.total_height(), 40);
        assert_eq!(block_top(&layout, &geometry()), 10);
    }

    #[test]
    fn test_rows_are_centered_independently() {
        let narrow = row(vec![word("ab", StyleSet::plain(), 10)]);
        let wide = row(vec![word("abcdefgh", StyleSet::plain(), 10)]);
        // available width 80
        assert_eq!(row_left(&narrow, &geometry()), 10 + 35);
        assert_eq!(row_left(&wide, &geometry()), 10 + 20);
    }

    #[test]
    fn test_overwide_row_is_clamped_to_margin() {
        let huge = row(vec![word("abcdefghijklmnopqrstuvwxyz", StyleSet::plain(), 10)]);
        assert_eq!(row_left(&huge, &geometry()), 10);
    }

    #[test]
    fn test_glyphs_land_inside_centered_box() {
        let layout = Layout {
            font_size: 8,
            sub_lines: vec![row(vec![word("ab", StyleSet::plain(), 8)])],
        };
        let mut surface = RgbaImage::new(100, 60);
        render_text(&mut surface, &layout, FontFamily::Montserrat, &geometry(), WHITE, &BlockFonts)
            .unwrap();

        // row width 8, left = 10 + 36 = 46; top = 25, glyph boxes 8px tall
        assert_eq!(surface.get_pixel(46, 25), &WHITE);
        assert_eq!(surface.get_pixel(53, 32), &WHITE);
        assert_eq!(surface.get_pixel(45, 25), &CLEAR);
        assert_eq!(surface.get_pixel(46, 24), &CLEAR);
        assert_eq!(surface.get_pixel(54, 25), &CLEAR);
    }

    #[test]
    fn test_underline_spans_word_width_below_baseline() {
        let layout = Layout {
            font_size: 8,
            sub_lines: vec![row(vec![word("ab", StyleSet::UNDERLINE, 8)])],
        };
        let mut surface = RgbaImage::new(100, 60);
        render_text(&mut surface, &layout, FontFamily::Montserrat, &geometry(), WHITE, &BlockFonts)
            .unwrap();

        // baseline = 25 + 8 = 33, underline at 35 covering x=46..=53
        let underlined: Vec<u32> = (0..100)
            .filter(|&x| surface.get_pixel(x, 35) == &WHITE)
            .collect();
        assert_eq!(underlined, (46..54).collect::<Vec<u32>>());
        assert_eq!(surface.get_pixel(45, 35), &CLEAR);
        assert_eq!(surface.get_pixel(54, 35), &CLEAR);
        assert_eq!(surface.get_pixel(50, 34), &CLEAR);
    }

    #[test]
    fn test_mixed_faces_share_a_baseline() {
        let small = RenderableWord {
            ascent: 6,
            ..word("a", StyleSet::plain(), 8)
        };
        let layout = Layout {
            font_size: 8,
            sub_lines: vec![row(vec![word("a", StyleSet::plain(), 8), small])],
        };
        let mut surface = RgbaImage::new(100, 60);
        render_text(&mut surface, &layout, FontFamily::Montserrat, &geometry(), WHITE, &BlockFonts)
            .unwrap();

        // second glyph is drawn 2px lower so both sit on the same baseline
        let left = row_left(&layout.sub_lines[0], &geometry()) as u32;
        let top = block_top(&layout, &geometry());
        assert_eq!(surface.get_pixel(left, top), &WHITE);
        assert_eq!(surface.get_pixel(left + 4, top), &CLEAR);
        assert_eq!(surface.get_pixel(left + 4, top + 2), &WHITE);
    }

    #[test]
    fn test_blank_rows_advance_without_drawing() {
        let layout = Layout {
            font_size: 8,
            sub_lines: vec![SubLine::blank(10), row(vec![word("a", StyleSet::plain(), 8)])],
        };
        let mut surface = RgbaImage::new(100, 60);
        render_text(&mut surface, &layout, FontFamily::Montserrat, &geometry(), WHITE, &BlockFonts)
            .unwrap();

        // total 20 in 40 -> top 20, blank row takes 20..30, glyph starts at 30
        let drawn: Vec<u32> = (0..60)
            .filter(|&y| (0..100).any(|x| surface.get_pixel(x, y)[3] > 0))
            .collect();
        assert_eq!(drawn.first(), Some(&30));
    }
}
