use crate::rendering::font::FontError;
use thiserror::Error;

/// Failure of a single caption request
///
/// A layout where no font size fits is not an error; it renders a
/// background-only band instead.
#[derive(Error, Debug)]
pub enum CaptionError {
    #[error("Image source unavailable: {0}")]
    ImageSource(String),

    #[error("Invalid caption configuration: {0}")]
    InvalidConfig(String),

    #[error("Font error: {0}")]
    Font(#[from] FontError),

    #[error("Image encoding failed: {0}")]
    Encode(String),
}

impl From<image::ImageError> for CaptionError {
    fn from(err: image::ImageError) -> Self {
        CaptionError::Encode(err.to_string())
    }
}
