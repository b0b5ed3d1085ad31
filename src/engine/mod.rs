pub mod color;
pub mod config;
pub mod error;

pub use color::{parse_rgba, parse_rgba_or, ColorError};
pub use config::{CaptionStyle, FontFamily, Position, SizeSearch, MAX_FONT_SIZE};
pub use error::CaptionError;
