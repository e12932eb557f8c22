use std::path::Path;

use convmask_image::{Image, ImageSize, PixelSource, Rgba16};

use crate::{
    conv_utils::convert_buf_rgba16_rgb8, error::IoError, format::ImageFormat, jpeg, png,
};

/// A generic image type that can be any of the supported decoded layouts.
#[derive(Clone, Debug, PartialEq)]
pub enum GenericImage {
    /// 8-bit grayscale image
    L8(Image<u8, 1>),
    /// 8-bit grayscale image with alpha channel
    La8(Image<u8, 2>),
    /// 8-bit RGB image
    Rgb8(Image<u8, 3>),
    /// 8-bit RGB image with alpha channel
    Rgba8(Image<u8, 4>),
    /// 16-bit grayscale image
    L16(Image<u16, 1>),
    /// 16-bit grayscale image with alpha channel
    La16(Image<u16, 2>),
    /// 16-bit RGB image
    Rgb16(Image<u16, 3>),
    /// 16-bit RGB image with alpha channel
    Rgba16(Image<u16, 4>),
}

impl GenericImage {
    /// A short description of the pixel layout, e.g. `"rgb8"`.
    pub fn layout(&self) -> &'static str {
        match self {
            GenericImage::L8(_) => "l8",
            GenericImage::La8(_) => "la8",
            GenericImage::Rgb8(_) => "rgb8",
            GenericImage::Rgba8(_) => "rgba8",
            GenericImage::L16(_) => "l16",
            GenericImage::La16(_) => "la16",
            GenericImage::Rgb16(_) => "rgb16",
            GenericImage::Rgba16(_) => "rgba16",
        }
    }
}

impl PixelSource for GenericImage {
    fn size(&self) -> ImageSize {
        match self {
            GenericImage::L8(img) => img.size(),
            GenericImage::La8(img) => img.size(),
            GenericImage::Rgb8(img) => img.size(),
            GenericImage::Rgba8(img) => img.size(),
            GenericImage::L16(img) => img.size(),
            GenericImage::La16(img) => img.size(),
            GenericImage::Rgb16(img) => img.size(),
            GenericImage::Rgba16(img) => img.size(),
        }
    }

    fn color_at(&self, x: usize, y: usize) -> Option<Rgba16> {
        match self {
            GenericImage::L8(img) => img.color_at(x, y),
            GenericImage::La8(img) => img.color_at(x, y),
            GenericImage::Rgb8(img) => img.color_at(x, y),
            GenericImage::Rgba8(img) => img.color_at(x, y),
            GenericImage::L16(img) => img.color_at(x, y),
            GenericImage::La16(img) => img.color_at(x, y),
            GenericImage::Rgb16(img) => img.color_at(x, y),
            GenericImage::Rgba16(img) => img.color_at(x, y),
        }
    }
}

/// Decodes an image, detecting the container format from its content.
///
/// # Arguments
///
/// * `bytes` - The encoded image.
///
/// # Returns
///
/// The decoded image together with the detected format.
///
/// # Errors
///
/// [`IoError::UnsupportedImageFormat`] if the data is neither PNG nor JPEG.
pub fn decode_image_any(bytes: &[u8]) -> Result<(GenericImage, ImageFormat), IoError> {
    let format = ImageFormat::from_bytes(bytes).ok_or(IoError::UnsupportedImageFormat)?;

    let image = match format {
        ImageFormat::Png => png::decode_image_png(bytes)?,
        ImageFormat::Jpeg => jpeg::decode_image_jpeg(bytes)?,
    };

    log::debug!(
        "decoded {} image, layout {}, {}",
        format,
        image.layout(),
        image.size()
    );

    Ok((image, format))
}

/// Reads an image from the given file path.
///
/// The format is detected from the file content, not from its extension.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// The decoded image together with the detected format.
pub fn read_image_any(
    file_path: impl AsRef<Path>,
) -> Result<(GenericImage, ImageFormat), IoError> {
    let file_path = file_path.as_ref();

    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let bytes = std::fs::read(file_path)?;
    decode_image_any(&bytes)
}

/// Options controlling [`write_image`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
    /// JPEG quality, from 1 (lowest) to 100 (highest).
    pub jpeg_quality: u8,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self { jpeg_quality: 75 }
    }
}

/// Writes a 16-bit RGBA image in the given format.
///
/// PNG output is 16-bit RGB when every pixel is opaque and 16-bit RGBA
/// otherwise. JPEG has no alpha, so the image is composited over black and
/// each color channel keeps its upper 8 bits.
///
/// # Arguments
///
/// * `file_path` - The destination path.
/// * `image` - The image to encode.
/// * `format` - The container format to write.
/// * `options` - Encoder settings.
pub fn write_image(
    file_path: impl AsRef<Path>,
    image: &Image<u16, 4>,
    format: ImageFormat,
    options: &EncodeOptions,
) -> Result<(), IoError> {
    let file_path = file_path.as_ref();
    log::debug!("writing {} image to {}", format, file_path.display());

    match format {
        ImageFormat::Png if image.is_opaque() => png::write_image_png_rgb16(file_path, image),
        ImageFormat::Png => png::write_image_png_rgba16(file_path, image),
        ImageFormat::Jpeg => {
            let rgb8 = Image::<u8, 3>::new(image.size(), convert_buf_rgba16_rgb8(image.as_slice()))?;
            jpeg::write_image_jpeg_rgb8(file_path, &rgb8, options.jpeg_quality)
        }
    }
}
