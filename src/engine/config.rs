// Caption configuration
// Defaults mirror what callers get when they only send an image and a text.

use crate::engine::color::{parse_rgba_or, DEFAULT_BACKGROUND, DEFAULT_TEXT};
use crate::engine::error::CaptionError;
use crate::layout::BandGeometry;
use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper bound of the font-size search, in pixels
pub const MAX_FONT_SIZE: u32 = 200;

/// Font families the caption service ships faces for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    Montserrat,
    Nunito,
    Poppins,
    Roboto,
}

impl FontFamily {
    pub const ALL: [FontFamily; 4] = [
        FontFamily::Montserrat,
        FontFamily::Nunito,
        FontFamily::Poppins,
        FontFamily::Roboto,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FontFamily::Montserrat => "Montserrat",
            FontFamily::Nunito => "Nunito",
            FontFamily::Poppins => "Poppins",
            FontFamily::Roboto => "Roboto",
        }
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FontFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FontFamily::ALL
            .into_iter()
            .find(|family| family.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown font family '{}'", s))
    }
}

/// Image edge the caption band is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Top,
    #[default]
    Bottom,
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Position::Top),
            "bottom" => Ok(Position::Bottom),
            other => Err(format!("unknown text position '{}'", other)),
        }
    }
}

/// How the optimizer walks candidate font sizes
///
/// Both strategies return the same size; binary search just probes fewer
/// candidates on large bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeSearch {
    #[default]
    Linear,
    Binary,
}

impl FromStr for SizeSearch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(SizeSearch::Linear),
            "binary" => Ok(SizeSearch::Binary),
            other => Err(format!("unknown size search '{}'", other)),
        }
    }
}

/// Visual parameters of a caption band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionStyle {
    pub font_family: FontFamily,

    pub text_position: Position,

    /// Band height as a fraction of the image height, in (0, 1]
    pub background_height: f32,

    /// `rgba(r, g, b, a)`; malformed values fall back to translucent black
    pub background_color: String,

    /// Caption text color, same notation as the background
    pub text_color: String,

    /// Total horizontal margin as a percentage of the image width, split
    /// evenly between both sides
    pub margin_horizontal: u32,

    /// Top margin as a percentage of the band height
    pub margin_top: u32,

    /// Bottom margin as a percentage of the band height
    pub margin_bottom: u32,

    /// Fraction of the band height used for the transparent-to-opaque ramp
    pub transition_proportion: f32,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_family: FontFamily::Montserrat,
            text_position: Position::Bottom,
            background_height: 0.4,
            background_color: "rgba(0, 0, 0, 180)".to_string(),
            text_color: "rgba(255, 255, 255, 255)".to_string(),
            margin_horizontal: 10,
            margin_top: 10,
            margin_bottom: 10,
            transition_proportion: 0.2,
        }
    }
}

impl CaptionStyle {
    pub fn validate(&self) -> Result<(), CaptionError> {
        if !(self.background_height > 0.0 && self.background_height <= 1.0) {
            return Err(CaptionError::InvalidConfig(format!(
                "background_height must be in (0, 1], got {}",
                self.background_height
            )));
        }
        if !(0.0..=1.0).contains(&self.transition_proportion) {
            return Err(CaptionError::InvalidConfig(format!(
                "transition_proportion must be in [0, 1], got {}",
                self.transition_proportion
            )));
        }
        if self.margin_horizontal > 100 {
            return Err(CaptionError::InvalidConfig(format!(
                "margin_horizontal must be at most 100 percent, got {}",
                self.margin_horizontal
            )));
        }
        Ok(())
    }

    pub fn background_rgba(&self) -> Rgba<u8> {
        parse_rgba_or(&self.background_color, DEFAULT_BACKGROUND)
    }

    pub fn text_rgba(&self) -> Rgba<u8> {
        parse_rgba_or(&self.text_color, DEFAULT_TEXT)
    }

    /// Pixel geometry of the band for an image of the given size
    pub fn band_geometry(&self, image_width: u32, image_height: u32) -> BandGeometry {
        let band_height = (image_height as f64 * self.background_height as f64) as u32;
        let margin_x = (self.margin_horizontal as f64 / 100.0 * image_width as f64 / 2.0) as u32;
        let margin_top = (self.margin_top as f64 / 100.0 * band_height as f64) as u32;
        let margin_bottom = (self.margin_bottom as f64 / 100.0 * band_height as f64) as u32;

        BandGeometry {
            width: image_width,
            height: band_height.min(image_height),
            margin_x,
            margin_top,
            margin_bottom,
        }
    }

    /// Row of the source image where the band's top edge lands
    pub fn band_origin_y(&self, image_height: u32, band_height: u32) -> u32 {
        match self.text_position {
            Position::Bottom => image_height.saturating_sub(band_height),
            Position::Top => 0,
        }
    }
}
