use super::{break_line, BandGeometry, Layout, LayoutResult};
use crate::engine::config::{FontFamily, SizeSearch, MAX_FONT_SIZE};
use crate::markup::{has_visible_text, LogicalLine};
use crate::rendering::font::{FontError, FontProvider};
use tracing::debug;

/// Largest font size worth trying for a band
pub fn size_ceiling(geometry: &BandGeometry) -> u32 {
    geometry.height.min(geometry.width).min(MAX_FONT_SIZE)
}

/// Wrap every logical line at `font_size`; `None` when the result does not
/// fit the band.
fn layout_at(
    lines: &[LogicalLine],
    family: FontFamily,
    font_size: u32,
    geometry: &BandGeometry,
    fonts: &dyn FontProvider,
) -> Result<Option<Layout>, FontError> {
    let available_width = geometry.available_width();
    let available_height = geometry.available_height();

    let mut sub_lines = Vec::new();
    let mut total_height = 0u32;

    for line in lines {
        let wrapped = break_line(line, font_size, family, available_width, fonts)?;
        if wrapped.is_empty() || wrapped.iter().any(|sub_line| sub_line.overflows) {
            debug!(font_size, "a word does not fit the band width");
            return Ok(None);
        }
        total_height += wrapped.iter().map(|sub_line| sub_line.height).sum::<u32>();
        if total_height > available_height {
            debug!(font_size, total_height, available_height, "text too tall");
            return Ok(None);
        }
        sub_lines.extend(wrapped);
    }

    Ok(Some(Layout {
        font_size,
        sub_lines,
    }))
}

fn linear_search(
    lines: &[LogicalLine],
    family: FontFamily,
    geometry: &BandGeometry,
    fonts: &dyn FontProvider,
    ceiling: u32,
) -> Result<Option<Layout>, FontError> {
    let mut best = None;
    for font_size in 1..=ceiling {
        match layout_at(lines, family, font_size, geometry, fonts)? {
            Some(layout) => best = Some(layout),
            None => break,
        }
    }
    Ok(best)
}

fn binary_search(
    lines: &[LogicalLine],
    family: FontFamily,
    geometry: &BandGeometry,
    fonts: &dyn FontProvider,
    ceiling: u32,
) -> Result<Option<Layout>, FontError> {
    let Some(mut best) = layout_at(lines, family, 1, geometry, fonts)? else {
        return Ok(None);
    };

    // Invariant: size `low` fits, every size above `high` fails.
    let (mut low, mut high) = (1, ceiling);
    while low < high {
        let mid = low + (high - low + 1) / 2;
        match layout_at(lines, family, mid, geometry, fonts)? {
            Some(layout) => {
                low = mid;
                best = layout;
            }
            None => high = mid - 1,
        }
    }
    Ok(Some(best))
}

/// Find the largest font size at which every logical line wraps inside the
/// band's available area.
///
/// Returns [`LayoutResult::NoFit`] when there is no visible text or when even
/// size 1 does not fit; callers then render the background alone.
pub fn optimize(
    lines: &[LogicalLine],
    family: FontFamily,
    geometry: &BandGeometry,
    fonts: &dyn FontProvider,
    search: SizeSearch,
) -> Result<LayoutResult, FontError> {
    if !has_visible_text(lines) {
        debug!("no visible caption text, skipping layout");
        return Ok(LayoutResult::NoFit);
    }

    let ceiling = size_ceiling(geometry);
    if ceiling == 0 {
        return Ok(LayoutResult::NoFit);
    }

    let best = match search {
        SizeSearch::Linear => linear_search(lines, family, geometry, fonts, ceiling)?,
        SizeSearch::Binary => binary_search(lines, family, geometry, fonts, ceiling)?,
    };

    Ok(match best {
        Some(layout) => {
            debug!(
                font_size = layout.font_size,
                rows = layout.sub_lines.len(),
                "caption layout chosen"
            );
            LayoutResult::Fits(layout)
        }
        None => LayoutResult::NoFit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse;
    use crate::rendering::testing::BlockFonts;
    use proptest::prelude::*;

    fn geometry(width: u32, height: u32) -> BandGeometry {
        BandGeometry {
            width,
            height,
            margin_x: 0,
            margin_top: 0,
            margin_bottom: 0,
        }
    }

    fn run(markup: &str, geometry: &BandGeometry, search: SizeSearch) -> LayoutResult {
        optimize(&parse(markup), FontFamily::Montserrat, geometry, &BlockFonts, search).unwrap()
    }

    #[test]
    fn test_height_bound_picks_largest_size() {
        // One short word; line height is size + size/4, so 100px allows 80.
        let result = run("hi", &geometry(1000, 100), SizeSearch::Linear);
        assert_eq!(result.font_size(), Some(80));
    }

    #[test]
    fn test_width_bound_picks_largest_size() {
        // "abcd" is 2 * size wide; 100px wide band allows 50.
        let result = run("abcd", &geometry(100, 1000), SizeSearch::Linear);
        assert_eq!(result.font_size(), Some(50));
    }

    #[test]
    fn test_ceiling_bounds_search() {
        let geometry = geometry(5000, 5000);
        assert_eq!(size_ceiling(&geometry), MAX_FONT_SIZE);
        let result = run("x", &geometry, SizeSearch::Linear);
        assert_eq!(result.font_size(), Some(MAX_FONT_SIZE));
    }

    #[test]
    fn test_chosen_layout_fits_available_height() {
        let geometry = BandGeometry {
            width: 300,
            height: 200,
            margin_x: 15,
            margin_top: 20,
            margin_bottom: 20,
        };
        let result = run("the quick brown fox<br>jumps over<br><br>the lazy dog", &geometry, SizeSearch::Linear);
        let layout = result.layout().expect("text should fit");
        assert!(layout.total_height() <= geometry.available_height());
        assert!(layout
            .sub_lines
            .iter()
            .all(|line| line.width() - trailing_space(line) <= geometry.available_width()));

        let bigger = layout_at(
            &parse("the quick brown fox<br>jumps over<br><br>the lazy dog"),
            FontFamily::Montserrat,
            layout.font_size + 1,
            &geometry,
            &BlockFonts,
        )
        .unwrap();
        assert!(bigger.is_none());
    }

    fn trailing_space(line: &crate::layout::SubLine) -> f32 {
        line.words
            .iter()
            .rev()
            .take_while(|word| word.is_whitespace())
            .map(|word| word.width)
            .sum()
    }

    #[test]
    fn test_blank_lines_consume_height() {
        let without = run("a<br>b", &geometry(1000, 100), SizeSearch::Linear);
        let with = run("a<br><br>b", &geometry(1000, 100), SizeSearch::Linear);
        assert!(with.font_size().unwrap() < without.font_size().unwrap());
        assert_eq!(with.layout().unwrap().sub_lines.len(), 3);
    }

    #[test]
    fn test_no_visible_text_is_no_fit() {
        assert_eq!(run("", &geometry(100, 100), SizeSearch::Linear), LayoutResult::NoFit);
        assert_eq!(run("  <br> ", &geometry(100, 100), SizeSearch::Binary), LayoutResult::NoFit);
    }

    #[test]
    fn test_size_one_failure_is_no_fit() {
        // Zero-height text area.
        let geometry = BandGeometry {
            width: 100,
            height: 10,
            margin_x: 0,
            margin_top: 5,
            margin_bottom: 5,
        };
        assert_eq!(run("text", &geometry, SizeSearch::Linear), LayoutResult::NoFit);
        assert_eq!(run("text", &geometry, SizeSearch::Binary), LayoutResult::NoFit);
    }

    #[test]
    fn test_zero_sized_band_is_no_fit() {
        assert_eq!(run("text", &geometry(100, 0), SizeSearch::Linear), LayoutResult::NoFit);
    }

    #[test]
    fn test_wrapping_happens_before_shrinking() {
        // Side by side the words need 2.25 * size of width, stacked only
        // 1 * size. A tall narrow band wraps them and keeps growing.
        let result = run("ab cd", &geometry(60, 1000), SizeSearch::Linear);
        let layout = result.layout().unwrap();
        assert_eq!(layout.sub_lines.len(), 2);
        assert_eq!(layout.font_size, 60);
    }

    #[test]
    fn test_measurement_failure_is_an_error() {
        use crate::rendering::testing::BrokenFonts;
        let result = optimize(
            &parse("x"),
            FontFamily::Montserrat,
            &geometry(100, 100),
            &BrokenFonts,
            SizeSearch::Linear,
        );
        assert!(result.is_err());
    }

    proptest! {
        #[test]
        fn prop_binary_search_matches_linear_scan(
            words in proptest::collection::vec("[a-z]{1,9}", 1..8),
            breaks in proptest::collection::vec(any::<bool>(), 8),
            width in 10u32..400,
            height in 10u32..400,
        ) {
            let mut markup = String::new();
            for (index, word) in words.iter().enumerate() {
                if index > 0 {
                    markup.push_str(if breaks[index] { "<br>" } else { " " });
                }
                markup.push_str(word);
            }
            let geometry = geometry(width, height);
            let linear = run(&markup, &geometry, SizeSearch::Linear);
            let binary = run(&markup, &geometry, SizeSearch::Binary);
            prop_assert_eq!(linear, binary);
        }
    }
}
