use std::{fs, fs::File, path::Path};

use convmask_image::{Image, ImageSize};
use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};

use crate::{
    conv_utils::{convert_buf_rgba16_rgb16_u8, convert_buf_u16_u8, convert_buf_u8_u16},
    error::IoError,
    functional::GenericImage,
};

/// Read a PNG image of any color type.
///
/// # Arguments
///
/// * `file_path` - The path to the PNG file.
///
/// # Returns
///
/// The decoded image, see [`decode_image_png`].
pub fn read_image_png(file_path: impl AsRef<Path>) -> Result<GenericImage, IoError> {
    // verify the file exists
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let bytes = fs::read(file_path)?;
    decode_image_png(&bytes)
}

/// Decodes a PNG image from raw bytes.
///
/// Palette images, bit depths below 8 and `tRNS` transparency are expanded,
/// so the result is always 8-bit or 16-bit gray, gray-alpha, RGB or RGBA.
///
/// # Arguments
///
/// - `bytes` - Raw bytes of the png file
pub fn decode_image_png(bytes: &[u8]) -> Result<GenericImage, IoError> {
    let mut decoder = Decoder::new(bytes);
    decoder.set_transformations(Transformations::EXPAND);

    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::PngDecodeError(e.to_string()))?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::PngDecodeError(e.to_string()))?;
    buf.truncate(info.buffer_size());

    let size = ImageSize {
        width: info.width as usize,
        height: info.height as usize,
    };

    let image = match (info.color_type, info.bit_depth) {
        (ColorType::Grayscale, BitDepth::Eight) => GenericImage::L8(Image::new(size, buf)?),
        (ColorType::GrayscaleAlpha, BitDepth::Eight) => GenericImage::La8(Image::new(size, buf)?),
        (ColorType::Rgb, BitDepth::Eight) => GenericImage::Rgb8(Image::new(size, buf)?),
        (ColorType::Rgba, BitDepth::Eight) => GenericImage::Rgba8(Image::new(size, buf)?),
        (ColorType::Grayscale, BitDepth::Sixteen) => {
            GenericImage::L16(Image::new(size, convert_buf_u8_u16(buf))?)
        }
        (ColorType::GrayscaleAlpha, BitDepth::Sixteen) => {
            GenericImage::La16(Image::new(size, convert_buf_u8_u16(buf))?)
        }
        (ColorType::Rgb, BitDepth::Sixteen) => {
            GenericImage::Rgb16(Image::new(size, convert_buf_u8_u16(buf))?)
        }
        (ColorType::Rgba, BitDepth::Sixteen) => {
            GenericImage::Rgba16(Image::new(size, convert_buf_u8_u16(buf))?)
        }
        (color_type, bit_depth) => {
            return Err(IoError::PngDecodeError(format!(
                "unexpected pixel layout {color_type:?} at {bit_depth:?}"
            )))
        }
    };

    Ok(image)
}

/// Writes the given PNG _(rgba16)_ data to the given file path.
///
/// # Arguments
///
/// - `file_path` - The path to the PNG image.
/// - `image` - The image containing the PNG image data.
pub fn write_image_png_rgba16(
    file_path: impl AsRef<Path>,
    image: &Image<u16, 4>,
) -> Result<(), IoError> {
    let image_buf = convert_buf_u16_u8(image.as_slice());

    write_png_impl(
        file_path,
        &image_buf,
        image.size(),
        BitDepth::Sixteen,
        ColorType::Rgba,
    )
}

/// Writes the color channels of an RGBA image as a PNG _(rgb16)_, dropping alpha.
///
/// # Arguments
///
/// - `file_path` - The path to the PNG image.
/// - `image` - The image containing the PNG image data.
pub fn write_image_png_rgb16(
    file_path: impl AsRef<Path>,
    image: &Image<u16, 4>,
) -> Result<(), IoError> {
    let image_buf = convert_buf_rgba16_rgb16_u8(image.as_slice());

    write_png_impl(
        file_path,
        &image_buf,
        image.size(),
        BitDepth::Sixteen,
        ColorType::Rgb,
    )
}

fn write_png_impl(
    file_path: impl AsRef<Path>,
    image_data: &[u8],
    image_size: ImageSize,
    // Make sure you set `depth` correctly
    depth: BitDepth,
    color_type: ColorType,
) -> Result<(), IoError> {
    let (width, height) = match (
        u32::try_from(image_size.width),
        u32::try_from(image_size.height),
    ) {
        (Ok(w), Ok(h)) => (w, h),
        _ => return Err(IoError::ImageTooLarge(image_size.width, image_size.height)),
    };

    let file = File::create(file_path)?;

    let mut encoder = Encoder::new(file, width, height);
    encoder.set_color(color_type);
    encoder.set_depth(depth);

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::PngEncodingError(e.to_string()))?;
    writer
        .write_image_data(image_data)
        .map_err(|e| IoError::PngEncodingError(e.to_string()))?;
    writer
        .finish()
        .map_err(|e| IoError::PngEncodingError(e.to_string()))?;
    Ok(())
}
