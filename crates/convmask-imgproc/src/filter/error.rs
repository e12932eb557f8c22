use convmask_image::ImageError;

use crate::parallel::ParallelError;

/// An error type for the filter module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FilterError {
    /// The kernel rows do not all have the same length.
    #[error("Invalid kernel shape: row {row} has {found} weights, expected {expected}")]
    InvalidKernelShape {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },

    /// The kernel has no weights at all.
    #[error("Kernel must contain at least one weight")]
    EmptyKernel,

    /// The center pixel of a neighborhood could not be read from the source.
    #[error("Center pixel ({0}, {1}) is not available in the source image")]
    CenterPixelUnavailable(usize, usize),

    /// Source and destination sizes differ.
    #[error("Image size mismatch: source {0}x{1}, destination {2}x{3}")]
    ImageSizeMismatch(usize, usize, usize, usize),

    /// The pass was already run.
    #[error("Convolution pass already completed")]
    PassAlreadyCompleted,

    /// The output was requested before the pass ran.
    #[error("Convolution pass has not been run")]
    PassNotRun,

    /// Parallel execution failed.
    #[error(transparent)]
    Parallel(#[from] ParallelError),

    /// Image allocation or access failed.
    #[error(transparent)]
    Image(#[from] ImageError),
}
