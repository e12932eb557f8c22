#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
///
/// Defines [`error::IoError`] variants for file access, encoding/decoding
/// failures, and kernel file parsing.
pub mod error;

/// Detection of the container format of an encoded image.
pub mod format;

/// High-level image reading and writing functions.
///
/// See [`functional::read_image_any`] for automatic format detection.
pub mod functional;

/// JPEG image encoding and decoding.
pub mod jpeg;

/// Parsing of text kernel files.
pub mod kernel;

/// PNG image encoding and decoding.
pub mod png;

/// Internal utility functions for image bit depth conversion.
mod conv_utils;

pub use crate::error::IoError;
pub use crate::format::ImageFormat;
pub use crate::functional::{read_image_any, write_image, EncodeOptions, GenericImage};
pub use crate::kernel::{parse_kernel, read_kernel_file};
