//! Caption pipeline: parse → optimize → paint background → render text →
//! composite.
//!
//! A caption that cannot be fitted is still a success: the band is painted
//! and the text is left out.

use crate::engine::config::{CaptionStyle, SizeSearch};
use crate::engine::error::CaptionError;
use crate::layout::{optimize, LayoutResult};
use crate::markup::{has_visible_text, parse};
use crate::rendering::{composite_band, isolate_band, new_band, render_text, FontProvider};
use image::RgbaImage;
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Surfaces produced for one caption text, all sized like the source image
#[derive(Debug, Clone)]
pub struct CaptionOutput {
    /// Chosen font size, `None` when no text was drawn
    pub font_size: Option<u32>,
    /// Source image with the band background only
    pub background_only: RgbaImage,
    /// Caption text alone on a transparent canvas
    pub text_only: RgbaImage,
    /// Source image with background and text
    pub final_combined: RgbaImage,
}

pub struct Captioner<P> {
    fonts: P,
    search: SizeSearch,
}

impl<P: FontProvider> Captioner<P> {
    pub fn new(fonts: P) -> Self {
        Self {
            fonts,
            search: SizeSearch::default(),
        }
    }

    pub fn with_search(mut self, search: SizeSearch) -> Self {
        self.search = search;
        self
    }

    pub fn fonts(&self) -> &P {
        &self.fonts
    }

    /// Lay out `markup` for an image of the given size without painting.
    pub fn layout(
        &self,
        markup: &str,
        style: &CaptionStyle,
        image_width: u32,
        image_height: u32,
    ) -> Result<LayoutResult, CaptionError> {
        style.validate()?;
        let geometry = style.band_geometry(image_width, image_height);
        let lines = parse(markup);
        Ok(optimize(
            &lines,
            style.font_family,
            &geometry,
            &self.fonts,
            self.search,
        )?)
    }

    /// Caption one text over `source`.
    pub fn caption(
        &self,
        source: &RgbaImage,
        markup: &str,
        style: &CaptionStyle,
    ) -> Result<CaptionOutput, CaptionError> {
        style.validate()?;
        let (width, height) = source.dimensions();
        if width == 0 || height == 0 {
            return Err(CaptionError::ImageSource(format!(
                "source image is empty ({}x{})",
                width, height
            )));
        }

        let geometry = style.band_geometry(width, height);
        let origin_y = style.band_origin_y(height, geometry.height);
        debug!(?geometry, origin_y, "caption band geometry");

        let lines = parse(markup);
        let result = optimize(
            &lines,
            style.font_family,
            &geometry,
            &self.fonts,
            self.search,
        )?;

        let background = new_band(
            geometry.width,
            geometry.height,
            style.background_rgba(),
            style.text_position,
            style.transition_proportion,
        );
        let mut band = background.clone();
        let mut text_band = RgbaImage::new(geometry.width, geometry.height);

        match result.layout() {
            Some(layout) => {
                let color = style.text_rgba();
                render_text(&mut band, layout, style.font_family, &geometry, color, &self.fonts)?;
                render_text(
                    &mut text_band,
                    layout,
                    style.font_family,
                    &geometry,
                    color,
                    &self.fonts,
                )?;
                info!(
                    font_size = layout.font_size,
                    rows = layout.sub_lines.len(),
                    "caption rendered"
                );
            }
            None if has_visible_text(&lines) => {
                info!("caption text does not fit the band, rendering background only");
            }
            None => debug!("no caption text, rendering background only"),
        }

        Ok(CaptionOutput {
            font_size: result.font_size(),
            background_only: composite_band(source, &background, origin_y),
            text_only: isolate_band(width, height, &text_band, origin_y),
            final_combined: composite_band(source, &band, origin_y),
        })
    }
}

impl<P: FontProvider> Captioner<P> {
    /// Caption every text over the same source image in parallel.
    ///
    /// Results keep the order of `texts`; a failing text does not affect the
    /// others.
    pub fn caption_batch<S: AsRef<str> + Sync>(
        &self,
        source: &RgbaImage,
        texts: &[S],
        style: &CaptionStyle,
    ) -> Vec<Result<CaptionOutput, CaptionError>> {
        texts
            .par_iter()
            .enumerate()
            .map(|(index, text)| {
                let result = self.caption(source, text.as_ref(), style);
                if let Err(err) = &result {
                    warn!(index, error = %err, "caption failed");
                }
                result
            })
            .collect()
    }
}
