use crate::{Image, ImageError, ImageSize};

/// A single color with 16 bits per channel.
///
/// The stored channels are straight (not premultiplied). Use
/// [`Rgba16::premultiplied`] and [`Rgba16::from_premultiplied`] to move
/// between the two representations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba16 {
    /// Red channel.
    pub r: u16,
    /// Green channel.
    pub g: u16,
    /// Blue channel.
    pub b: u16,
    /// Alpha channel.
    pub a: u16,
}

impl Rgba16 {
    /// The value of a fully opaque alpha channel.
    pub const OPAQUE: u16 = u16::MAX;

    /// Create a color from its four channels.
    pub const fn new(r: u16, g: u16, b: u16, a: u16) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque gray color.
    pub const fn gray(v: u16) -> Self {
        Self::new(v, v, v, Self::OPAQUE)
    }

    /// The color channels in `[r, g, b]` order.
    pub fn rgb(&self) -> [u16; 3] {
        [self.r, self.g, self.b]
    }

    /// The color channels scaled by alpha, in `[r, g, b]` order.
    ///
    /// Fully transparent colors give black and opaque colors are unchanged.
    pub fn premultiplied(&self) -> [u16; 3] {
        let a = u32::from(self.a);
        self.rgb()
            .map(|v| (u32::from(v) * a / u32::from(Self::OPAQUE)) as u16)
    }

    /// Create a color from alpha-scaled channels.
    ///
    /// Channels larger than `a` saturate at 65535, and a zero alpha gives
    /// transparent black.
    ///
    /// # Examples
    ///
    /// ```
    /// use convmask_image::Rgba16;
    ///
    /// let c = Rgba16::from_premultiplied([16384, 0, 40000], 32768);
    /// assert_eq!(c, Rgba16::new(32767, 0, 65535, 32768));
    /// ```
    pub fn from_premultiplied(rgb: [u16; 3], a: u16) -> Self {
        if a == 0 {
            return Self::default();
        }
        let a32 = u32::from(a);
        let [r, g, b] = rgb.map(|v| {
            (u32::from(v) * u32::from(Self::OPAQUE) / a32).min(u32::from(Self::OPAQUE)) as u16
        });
        Self::new(r, g, b, a)
    }
}

impl From<[u16; 4]> for Rgba16 {
    fn from(c: [u16; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

impl From<Rgba16> for [u16; 4] {
    fn from(c: Rgba16) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

/// A sample type that can be widened to 16 bits without losing ordering.
pub trait Sample16: Copy {
    /// Widen the sample to the full `0..=65535` range.
    fn to_u16(self) -> u16;
}

impl Sample16 for u8 {
    fn to_u16(self) -> u16 {
        // 0xab -> 0xabab
        u16::from(self) * 257
    }
}

impl Sample16 for u16 {
    fn to_u16(self) -> u16 {
        self
    }
}

/// Random access to the colors of a raster.
///
/// Every decoded format exposes its pixels through this capability so that
/// filters never have to switch on the concrete pixel layout.
pub trait PixelSource {
    /// The size of the raster in pixels.
    fn size(&self) -> ImageSize;

    /// The width of the raster in pixels.
    fn width(&self) -> usize {
        self.size().width
    }

    /// The height of the raster in pixels.
    fn height(&self) -> usize {
        self.size().height
    }

    /// The color at `(x, y)` at 16-bit precision.
    ///
    /// Returns `None` if the coordinate lies outside the raster.
    fn color_at(&self, x: usize, y: usize) -> Option<Rgba16>;
}

impl<S: PixelSource + ?Sized> PixelSource for &S {
    fn size(&self) -> ImageSize {
        (**self).size()
    }

    fn color_at(&self, x: usize, y: usize) -> Option<Rgba16> {
        (**self).color_at(x, y)
    }
}

/// Channels are interpreted by count: 1 is gray, 2 is gray with alpha,
/// 3 is RGB and 4 or more is RGBA (extra channels are ignored).
impl<T: Sample16, const C: usize> PixelSource for Image<T, C> {
    fn size(&self) -> ImageSize {
        Image::size(self)
    }

    fn color_at(&self, x: usize, y: usize) -> Option<Rgba16> {
        let px = self.pixel(x, y)?;
        let color = match C {
            0 => return None,
            1 => Rgba16::gray(px[0].to_u16()),
            2 => {
                let v = px[0].to_u16();
                Rgba16::new(v, v, v, px[1].to_u16())
            }
            3 => Rgba16::new(
                px[0].to_u16(),
                px[1].to_u16(),
                px[2].to_u16(),
                Rgba16::OPAQUE,
            ),
            _ => Rgba16::new(
                px[0].to_u16(),
                px[1].to_u16(),
                px[2].to_u16(),
                px[3].to_u16(),
            ),
        };
        Some(color)
    }
}

impl Image<u16, 4> {
    /// Write a color to the pixel at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Fails with [`ImageError::PixelIndexOutOfBounds`] outside the raster.
    pub fn put_color(&mut self, x: usize, y: usize, color: Rgba16) -> Result<(), ImageError> {
        if x >= self.width() || y >= self.height() {
            return Err(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.width(),
                self.height(),
            ));
        }
        let offset = (y * self.width() + x) * 4;
        self.as_slice_mut()[offset..offset + 4].copy_from_slice(&<[u16; 4]>::from(color));
        Ok(())
    }

    /// Whether every pixel has a fully opaque alpha channel.
    pub fn is_opaque(&self) -> bool {
        self.as_slice()
            .chunks_exact(4)
            .all(|px| px[3] == Rgba16::OPAQUE)
    }
}
