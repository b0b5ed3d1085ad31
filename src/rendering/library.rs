//! Font faces loaded from a local font directory
//!
//! The directory follows the Google Fonts checkout layout:
//! `<root>/<Family>/static/<Family>-<Style>.ttf` (Poppins ships its static
//! faces at the family root). Faces are read lazily and kept for the life of
//! the library; vertical metrics are additionally memoized process-wide since
//! the optimizer asks for them once per word per candidate size.

use super::font::{
    calculate_string_width, get_font_metrics, FaceKey, FontError, FontMetrics, FontProvider,
};
use crate::engine::config::FontFamily;
use crate::markup::StyleSet;
use ab_glyph::FontVec;
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

/// Directory searched when no font root is configured
pub const DEFAULT_FONTS_DIR: &str = "google-fonts";

/// Family used when a requested family has no usable regular face
pub const FALLBACK_FAMILY: FontFamily = FontFamily::Montserrat;

lazy_static! {
    static ref METRICS_CACHE: RwLock<HashMap<(PathBuf, u32), FontMetrics>> =
        RwLock::new(HashMap::new());
}

fn style_name(styles: StyleSet) -> &'static str {
    match (styles.is_bold(), styles.is_italic()) {
        (true, true) => "BoldItalic",
        (true, false) => "Bold",
        (false, true) => "Italic",
        (false, false) => "Regular",
    }
}

type LoadedFace = (PathBuf, Arc<FontVec>);

pub struct FontLibrary {
    root: PathBuf,
    faces: RwLock<HashMap<PathBuf, Option<Arc<FontVec>>>>,
}

impl FontLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            faces: RwLock::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the face file for a family and style set
    pub fn face_path(&self, family: FontFamily, styles: StyleSet) -> PathBuf {
        let file_name = format!("{}-{}.ttf", family.name(), style_name(styles));
        let family_dir = self.root.join(family.name());
        match family {
            FontFamily::Poppins => family_dir.join(file_name),
            _ => family_dir.join("static").join(file_name),
        }
    }

    fn load_face(&self, path: &Path) -> Option<Arc<FontVec>> {
        if let Some(cached) = self
            .faces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
        {
            return cached.clone();
        }

        let loaded = match std::fs::read(path) {
            Ok(bytes) => match FontVec::try_from_vec(bytes) {
                Ok(font) => Some(Arc::new(font)),
                Err(_) => {
                    warn!(error = %FontError::InvalidFont(path.to_path_buf()), "skipping font face");
                    None
                }
            },
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read font face");
                None
            }
        };

        // Two threads may load the same face concurrently; either copy is fine.
        self.faces
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_path_buf(), loaded.clone());
        loaded
    }

    /// Resolve a face, falling back to the family's regular face and then to
    /// the default family's regular face.
    fn resolve(&self, family: FontFamily, styles: StyleSet) -> Result<LoadedFace, FontError> {
        let mut candidates = vec![self.face_path(family, styles)];
        let family_regular = self.face_path(family, StyleSet::plain());
        if !candidates.contains(&family_regular) {
            candidates.push(family_regular);
        }
        let default_regular = self.face_path(FALLBACK_FAMILY, StyleSet::plain());
        if !candidates.contains(&default_regular) {
            candidates.push(default_regular);
        }

        for (attempt, path) in candidates.into_iter().enumerate() {
            if let Some(font) = self.load_face(&path) {
                if attempt > 0 {
                    debug!(%family, %styles, path = %path.display(), "using fallback face");
                }
                return Ok((path, font));
            }
        }

        Err(FontError::Unavailable { family, styles })
    }
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::new(DEFAULT_FONTS_DIR)
    }
}

impl FontProvider for FontLibrary {
    fn metrics(&self, key: FaceKey) -> Result<FontMetrics, FontError> {
        let (path, font) = self.resolve(key.family, key.styles)?;
        let cache_key = (path, key.size);

        if let Some(metrics) = METRICS_CACHE
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&cache_key)
        {
            return Ok(*metrics);
        }

        let metrics = get_font_metrics(font.as_ref(), key.size as f32);
        METRICS_CACHE
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(cache_key, metrics);
        Ok(metrics)
    }

    fn text_width(&self, key: FaceKey, text: &str) -> Result<f32, FontError> {
        let (_, font) = self.resolve(key.family, key.styles)?;
        Ok(calculate_string_width(font.as_ref(), text, key.size as f32))
    }

    fn draw_text(
        &self,
        canvas: &mut RgbaImage,
        color: Rgba<u8>,
        x: i32,
        y: i32,
        key: FaceKey,
        text: &str,
    ) -> Result<(), FontError> {
        let (_, font) = self.resolve(key.family, key.styles)?;
        draw_text_mut(canvas, color, x, y, key.scale(), font.as_ref(), text);
        Ok(())
    }
}
