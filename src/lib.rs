//! Caption bands for still images.
//!
//! Styled caption markup is parsed into lines, wrapped at the largest font
//! size that fits a translucent band, and composited onto the source image.

pub mod engine;
pub mod input;
pub mod layout;
pub mod logging;
pub mod markup;
pub mod output;
pub mod pipeline;
pub mod rendering;

pub use engine::{CaptionError, CaptionStyle, FontFamily, Position, SizeSearch};
pub use input::{load_image, load_request, CaptionRequest, LoadError};
pub use layout::{Layout, LayoutResult};
pub use markup::{parse, LogicalLine, StyleSet, StyledRun};
pub use output::{BatchResponse, ImageEntry};
pub use pipeline::{CaptionOutput, Captioner};
pub use rendering::{FontLibrary, FontProvider};
