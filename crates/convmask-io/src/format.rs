const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
const JPEG_SOI: [u8; 3] = [0xff, 0xd8, 0xff];

/// The supported image container formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// Portable Network Graphics.
    Png,
    /// JPEG / JFIF.
    Jpeg,
}

impl ImageFormat {
    /// Detect the format from the leading bytes of an encoded image.
    ///
    /// The file extension plays no role.
    ///
    /// # Examples
    ///
    /// ```
    /// use convmask_io::ImageFormat;
    ///
    /// assert_eq!(ImageFormat::from_bytes(&[0xff, 0xd8, 0xff, 0xe0]), Some(ImageFormat::Jpeg));
    /// assert_eq!(ImageFormat::from_bytes(b"GIF89a"), None);
    /// ```
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&PNG_SIGNATURE) {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(&JPEG_SOI) {
            Some(ImageFormat::Jpeg)
        } else {
            None
        }
    }

    /// The canonical short name of the format.
    pub fn name(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            other => Err(format!("unsupported image format: {other}")),
        }
    }
}
