//! Image types and color handling.

pub mod draw;

use std::fmt;

use embedded_graphics::pixelcolor::{
    raw::{RawData, RawU32},
    PixelColor,
};
use image::{ImageFormat, Rgba, RgbaImage};

use crate::{rect::Rect, resolution::Resolution};

/// An owned RGBA image.
///
/// Pixels are stored in row-major order with 8 bits per channel.
pub struct Image {
    buf: RgbaImage,
}

impl Image {
    /// Creates a new, black image of the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buf: RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])),
        }
    }

    /// Decodes a JPEG-compressed image from a byte slice.
    pub fn decode_jpeg(data: &[u8]) -> anyhow::Result<Self> {
        let buf = image::load_from_memory_with_format(data, ImageFormat::Jpeg)?.into_rgba8();
        Ok(Self { buf })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.buf.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.buf.height()
    }

    #[inline]
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width(), self.height())
    }

    /// Returns a [`Rect`] covering the whole image, with the top-left corner
    /// at `(0, 0)`.
    pub fn rect(&self) -> Rect {
        Rect::from_top_left(0.0, 0.0, self.width() as f32, self.height() as f32)
    }

    /// Fetches the color of the pixel at `(x, y)`.
    ///
    /// Out-of-bounds coordinates yield an opaque black pixel. Detection
    /// windows near the image border rely on this.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Color {
        if x < 0 || y < 0 || x as u32 >= self.width() || y as u32 >= self.height() {
            return Color::BLACK;
        }
        Color(self.buf.get_pixel(x as u32, y as u32).0)
    }

    /// Sets the pixel at `(x, y)`. Out-of-bounds coordinates are ignored.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x as u32 >= self.width() || y as u32 >= self.height() {
            return;
        }
        self.buf.put_pixel(x as u32, y as u32, Rgba(color.0));
    }

    /// Mirrors the image around its vertical center line.
    pub fn flip_horizontal_in_place(&mut self) {
        image::imageops::flip_horizontal_in_place(&mut self.buf);
    }

    /// Raw pixel data in row-major RGBA order, for texture upload.
    pub(crate) fn data(&self) -> &[u8] {
        &self.buf
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Image({})", self.resolution())
    }
}

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const BLACK: Self = Self([0, 0, 0, 255]);
    pub const WHITE: Self = Self([255, 255, 255, 255]);
    pub const RED: Self = Self([255, 0, 0, 255]);
    pub const GREEN: Self = Self([0, 255, 0, 255]);
    pub const BLUE: Self = Self([0, 0, 255, 255]);
    pub const YELLOW: Self = Self([255, 255, 0, 255]);

    #[inline]
    pub fn r(&self) -> u8 {
        self.0[0]
    }

    #[inline]
    pub fn g(&self) -> u8 {
        self.0[1]
    }

    #[inline]
    pub fn b(&self) -> u8 {
        self.0[2]
    }
}

impl PixelColor for Color {
    type Raw = RawU32;
}

impl From<RawU32> for Color {
    fn from(raw: RawU32) -> Self {
        let [r, g, b, a] = raw.into_inner().to_be_bytes();
        Self([r, g, b, a])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_access() {
        let mut image = Image::new(2, 2);
        assert_eq!(image.get(-1, 0), Color::BLACK);
        assert_eq!(image.get(0, 2), Color::BLACK);

        image.set(-1, 0, Color::RED);
        image.set(5, 5, Color::RED);
        assert_eq!(image.get(0, 0), Color::BLACK);
    }

    #[test]
    fn flip() {
        let mut image = Image::new(2, 1);
        image.set(0, 0, Color::RED);
        image.flip_horizontal_in_place();
        assert_eq!(image.get(0, 0), Color::BLACK);
        assert_eq!(image.get(1, 0), Color::RED);
    }
}
