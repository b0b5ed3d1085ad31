pub mod background;
pub mod composite;
pub mod font;
pub mod library;
pub mod text;

#[cfg(test)]
pub(crate) mod testing;

pub use background::{new_band, paint_band};
pub use composite::{composite_band, isolate_band};
pub use font::{FaceKey, FontError, FontMetrics, FontProvider};
pub use library::FontLibrary;
pub use text::render_text;
