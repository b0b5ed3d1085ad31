//! Loading caption inputs: source images and JSON request files.

use crate::engine::config::{CaptionStyle, SizeSearch};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Unsupported image source: {0}")]
    UnsupportedSource(String),

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("Request parse error: {0}")]
    Request(String),
}

/// Caption text of a request: one markup string or several
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CaptionTexts {
    One(String),
    Many(Vec<String>),
}

impl Default for CaptionTexts {
    fn default() -> Self {
        CaptionTexts::One(String::new())
    }
}

impl CaptionTexts {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            CaptionTexts::One(text) => vec![text],
            CaptionTexts::Many(texts) => texts,
        }
    }
}

/// A captioning job read from a JSON file
///
/// ```json
/// { "image": "photo.jpg", "text": ["<b>Hi</b>", "there"], "text_position": "top" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptionRequest {
    #[serde(default, alias = "image_url")]
    pub image: Option<String>,

    #[serde(default)]
    pub text: CaptionTexts,

    #[serde(default)]
    pub search: Option<SizeSearch>,

    #[serde(flatten)]
    pub style: CaptionStyle,
}

impl CaptionRequest {
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        serde_json::from_str(json).map_err(|e| LoadError::Request(e.to_string()))
    }
}

/// Read a [`CaptionRequest`] from a JSON file.
pub fn load_request(path: &Path) -> Result<CaptionRequest, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound(path.to_path_buf()));
    }
    let json = std::fs::read_to_string(path)
        .map_err(|e| LoadError::Request(format!("{}: {}", path.display(), e)))?;
    CaptionRequest::from_json(&json)
}

/// Decode the source image at `source` into RGBA.
///
/// Only local files are supported; remote URLs are rejected.
pub fn load_image(source: &str) -> Result<RgbaImage, LoadError> {
    if source.starts_with("http://") || source.starts_with("https://") {
        return Err(LoadError::UnsupportedSource(source.to_string()));
    }

    let path = Path::new(source);
    if !path.exists() {
        return Err(LoadError::FileNotFound(path.to_path_buf()));
    }

    let image = image::open(path)
        .map_err(|e| LoadError::ImageDecode(format!("{}: {}", path.display(), e)))?
        .to_rgba8();
    debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "source image loaded"
    );
    Ok(image)
}
