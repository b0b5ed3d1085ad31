//! Encoding caption surfaces for callers: PNG files on disk or a JSON batch
//! response with base64 PNG payloads.

use crate::engine::error::CaptionError;
use crate::pipeline::CaptionOutput;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::{Path, PathBuf};

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CaptionError> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

pub fn encode_png_base64(image: &RgbaImage) -> Result<String, CaptionError> {
    Ok(STANDARD.encode(encode_png(image)?))
}

/// One entry of a batch response, in the order the texts were given
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageEntry {
    Captioned {
        success: bool,
        font_size: Option<u32>,
        background_only: String,
        text_only: String,
        final_combined: String,
    },
    Failed {
        success: bool,
        error: String,
    },
}

impl ImageEntry {
    pub fn failed(error: impl ToString) -> Self {
        ImageEntry::Failed {
            success: false,
            error: error.to_string(),
        }
    }

    pub fn from_output(output: &CaptionOutput) -> Result<Self, CaptionError> {
        Ok(ImageEntry::Captioned {
            success: true,
            font_size: output.font_size,
            background_only: encode_png_base64(&output.background_only)?,
            text_only: encode_png_base64(&output.text_only)?,
            final_combined: encode_png_base64(&output.final_combined)?,
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ImageEntry::Captioned { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub images: Vec<ImageEntry>,
}

impl BatchResponse {
    /// Encode every result; an encoding failure only fails its own entry.
    pub fn from_results(results: &[Result<CaptionOutput, CaptionError>]) -> Self {
        let images = results
            .iter()
            .map(|result| match result {
                Ok(output) => ImageEntry::from_output(output).unwrap_or_else(ImageEntry::failed),
                Err(err) => ImageEntry::failed(err),
            })
            .collect();
        Self { images }
    }
}

/// File names used for the `index`-th caption (zero-based)
pub fn output_paths(dir: &Path, index: usize) -> [PathBuf; 3] {
    let number = index + 1;
    [
        dir.join(format!("text_{:02}_background.png", number)),
        dir.join(format!("text_{:02}_text.png", number)),
        dir.join(format!("text_{:02}_combined.png", number)),
    ]
}

/// Write the three surfaces of one caption as PNG files into `dir`.
pub fn write_outputs(
    dir: &Path,
    index: usize,
    output: &CaptionOutput,
) -> Result<Vec<PathBuf>, CaptionError> {
    std::fs::create_dir_all(dir)
        .map_err(|err| CaptionError::Encode(format!("{}: {}", dir.display(), err)))?;

    let images = [
        &output.background_only,
        &output.text_only,
        &output.final_combined,
    ];
    let paths = output_paths(dir, index);
    for (image, path) in images.iter().zip(paths.iter()) {
        image.save_with_format(path, ImageFormat::Png)?;
    }
    Ok(paths.to_vec())
}
