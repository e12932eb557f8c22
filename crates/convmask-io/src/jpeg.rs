use crate::{error::IoError, functional::GenericImage};
use convmask_image::{Image, ImageSize};
use jpeg_encoder::{ColorType, Encoder};
use std::{fs, path::Path};

/// Writes the given JPEG _(rgb8)_ data to the given file path.
///
/// # Arguments
///
/// - `file_path` - The path to the JPEG image.
/// - `image` - The image containing the JPEG image data
/// - `quality` - The quality of the JPEG encoding, range from 1 (lowest) to 100 (highest)
pub fn write_image_jpeg_rgb8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 3>,
    quality: u8,
) -> Result<(), IoError> {
    write_image_jpeg_imp(file_path, image, ColorType::Rgb, quality)
}

fn write_image_jpeg_imp<const N: usize>(
    file_path: impl AsRef<Path>,
    image: &Image<u8, N>,
    color_type: ColorType,
    quality: u8,
) -> Result<(), IoError> {
    let image_size = image.size();
    let (width, height) = match (
        u16::try_from(image_size.width),
        u16::try_from(image_size.height),
    ) {
        (Ok(w), Ok(h)) => (w, h),
        _ => return Err(IoError::ImageTooLarge(image_size.width, image_size.height)),
    };

    let encoder = Encoder::new_file(file_path, quality)?;
    encoder.encode(image.as_slice(), width, height, color_type)?;
    Ok(())
}

/// Read a JPEG image.
///
/// # Arguments
///
/// - `file_path` - The path to the JPEG file.
///
/// # Returns
///
/// The decoded image, see [`decode_image_jpeg`].
pub fn read_image_jpeg(file_path: impl AsRef<Path>) -> Result<GenericImage, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let jpeg_data = fs::read(file_path)?;
    decode_image_jpeg(&jpeg_data)
}

/// Decodes a JPEG image from raw bytes.
///
/// Grayscale files decode to a single channel image, everything else to RGB.
///
/// # Arguments
///
/// - `src` - Raw bytes of the jpeg file
pub fn decode_image_jpeg(src: &[u8]) -> Result<GenericImage, IoError> {
    let mut decoder = zune_jpeg::JpegDecoder::new(src);
    decoder.decode_headers()?;

    let image_info = decoder.info().ok_or_else(|| {
        IoError::JpegDecodingError(zune_jpeg::errors::DecodeErrors::Format(String::from(
            "Failed to find image info from its metadata",
        )))
    })?;

    let image_size = ImageSize {
        width: image_info.width as usize,
        height: image_info.height as usize,
    };

    let img_data = decoder.decode()?;
    let num_pixels = image_size.num_pixels();

    if num_pixels > 0 && img_data.len() == num_pixels {
        Ok(GenericImage::L8(Image::new(image_size, img_data)?))
    } else if img_data.len() == num_pixels * 3 {
        Ok(GenericImage::Rgb8(Image::new(image_size, img_data)?))
    } else {
        Err(IoError::JpegDecodingError(
            zune_jpeg::errors::DecodeErrors::Format(format!(
                "Unexpected decoded length {} for {}x{} pixels",
                img_data.len(),
                image_size.width,
                image_size.height
            )),
        ))
    }
}
