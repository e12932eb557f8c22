/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(std::path::PathBuf),

    /// Error to open the file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// The data is neither a PNG nor a JPEG image.
    #[error("Unsupported image format")]
    UnsupportedImageFormat,

    /// Error to decode the JPEG image.
    #[error("Error with Jpeg decoding. {0}")]
    JpegDecodingError(#[from] zune_jpeg::errors::DecodeErrors),

    /// Error to encode the JPEG image.
    #[error("Error with Jpeg encoding. {0}")]
    JpegEncodingError(#[from] jpeg_encoder::EncodingError),

    /// The image is too large for the target format.
    #[error("Image of {0}x{1} pixels is too large for the target format")]
    ImageTooLarge(usize, usize),

    /// Error to create the image.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] convmask_image::ImageError),

    /// Error to encode the PNG image.
    #[error("Failed to encode the png image. {0}")]
    PngEncodingError(String),

    /// Error to decode the PNG image.
    #[error("Failed to decode the png image. {0}")]
    PngDecodeError(String),

    /// A kernel cell is not a number.
    #[error("Invalid kernel data at row {row}, column {column}: {value:?}")]
    InvalidKernelData {
        /// 1-based kernel row.
        row: usize,
        /// 1-based kernel column.
        column: usize,
        /// The text that failed to parse.
        value: String,
    },

    /// The kernel rows do not all have the same length.
    #[error("Invalid kernel shape: row {row} has {found} values, expected {expected}")]
    InvalidKernelShape {
        /// 1-based kernel row.
        row: usize,
        /// Number of values in the first row.
        expected: usize,
        /// Number of values in the offending row.
        found: usize,
    },
}
