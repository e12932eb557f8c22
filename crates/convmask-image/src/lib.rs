#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// image representation for image processing purposes.
pub mod image;

/// Error types for the image module.
pub mod error;

/// Random access color queries over decoded images.
pub mod pixel;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
pub use crate::pixel::{PixelSource, Rgba16, Sample16};
