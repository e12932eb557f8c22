//! Filter operations
//!
//! This module provides the 2D convolution of an image with a user-defined
//! kernel.

/// Errors raised by filter operations.
mod error;
pub use error::FilterError;

/// The convolution kernel.
mod kernel;
pub use kernel::Kernel;

/// Predefined kernels.
pub mod kernels;

/// The convolution engine.
mod convolution;
pub use convolution::*;
