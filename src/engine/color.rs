//! `rgba(r, g, b, a)` color strings
//!
//! Alpha accepts both notations seen in the wild: `0`–`255` and `0.0`–`1.0`.
//! A value is treated as fractional only when it is written with a decimal
//! point and lies inside `0.0..=1.0`, so `rgba(0,0,0,1.0)` is opaque while
//! `rgba(0,0,0,1)` is almost transparent.

use image::Rgba;
use thiserror::Error;
use tracing::warn;

/// Translucent black used when a background color cannot be parsed
pub const DEFAULT_BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 180]);

/// Caption text color when none (or garbage) is configured
pub const DEFAULT_TEXT: Rgba<u8> = Rgba([255, 255, 255, 255]);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColorError {
    #[error("Invalid RGBA string format: {0}")]
    Format(String),

    #[error("RGBA string must have 4 parts (r, g, b, a), got {0}")]
    ComponentCount(usize),

    #[error("Invalid color component: {0}")]
    Component(String),
}

fn parse_component(raw: &str) -> Result<f64, ColorError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ColorError::Component(raw.trim().to_string()))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ColorError::Component(raw.trim().to_string()))
    }
}

fn clamp_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn parse_alpha(raw: &str) -> Result<u8, ColorError> {
    let text = raw.trim();
    let value = parse_component(text)?;
    let fractional = text.contains('.') && (0.0..=1.0).contains(&value);
    if fractional {
        Ok(clamp_channel(value * 255.0))
    } else {
        Ok(clamp_channel(value))
    }
}

/// Parse an `rgba(r, g, b, a)` string, clamping every channel into `0..=255`.
pub fn parse_rgba(input: &str) -> Result<Rgba<u8>, ColorError> {
    let lowered = input.trim().to_ascii_lowercase();
    let inner = lowered
        .strip_prefix("rgba(")
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| ColorError::Format(input.to_string()))?;

    let parts: Vec<&str> = inner.split(',').collect();
    if parts.len() != 4 {
        return Err(ColorError::ComponentCount(parts.len()));
    }

    let r = clamp_channel(parse_component(parts[0])?);
    let g = clamp_channel(parse_component(parts[1])?);
    let b = clamp_channel(parse_component(parts[2])?);
    let a = parse_alpha(parts[3])?;

    Ok(Rgba([r, g, b, a]))
}

/// Parse a color, logging and substituting `fallback` on malformed input.
pub fn parse_rgba_or(input: &str, fallback: Rgba<u8>) -> Rgba<u8> {
    match parse_rgba(input) {
        Ok(color) => color,
        Err(err) => {
            warn!(input, error = %err, "unusable color string, using fallback {:?}", fallback.0);
            fallback
        }
    }
}
