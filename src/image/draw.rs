//! Drawing primitives for visualization.
//!
//! All functions return a guard object that draws when dropped. Properties
//! like the color can be changed on the guard before that happens:
//!
//! ```no_run
//! use mudra::image::{draw, Color, Image};
//! # let mut image = Image::new(10, 10);
//! draw::text(&mut image, 5.0, 5.0, "hi").color(Color::RED);
//! ```

use std::convert::Infallible;

use embedded_graphics::{
    geometry::{Dimensions, Point, Size},
    mono_font::{ascii::FONT_10X20, MonoTextStyle},
    prelude::{DrawTarget, Pixel, Primitive},
    primitives::{Circle, Line, PrimitiveStyle, Rectangle},
    text::{Baseline, Text, TextStyleBuilder},
    Drawable,
};

use crate::{
    image::{Color, Image},
    rect::Rect,
};

/// Draws the outline of a rectangle.
pub fn rect(image: &mut Image, rect: Rect) -> DrawRect<'_> {
    DrawRect {
        image,
        rect,
        color: Color::GREEN,
        filled: false,
    }
}

/// Draws a filled rectangle.
pub fn filled_rect(image: &mut Image, rect: Rect) -> DrawRect<'_> {
    DrawRect {
        image,
        rect,
        color: Color::BLACK,
        filled: true,
    }
}

pub struct DrawRect<'a> {
    image: &'a mut Image,
    rect: Rect,
    color: Color,
    filled: bool,
}

impl DrawRect<'_> {
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }
}

impl Drop for DrawRect<'_> {
    fn drop(&mut self) {
        let style = if self.filled {
            PrimitiveStyle::with_fill(self.color)
        } else {
            PrimitiveStyle::with_stroke(self.color, 1)
        };
        Rectangle::new(
            Point::new(self.rect.x() as i32, self.rect.y() as i32),
            Size::new(self.rect.width() as u32, self.rect.height() as u32),
        )
        .into_styled(style)
        .draw(&mut Target(self.image))
        .unwrap();
    }
}

/// Draws a line between two points.
pub fn line(image: &mut Image, start_x: f32, start_y: f32, end_x: f32, end_y: f32) -> DrawLine<'_> {
    DrawLine {
        image,
        start: (start_x, start_y),
        end: (end_x, end_y),
        color: Color::GREEN,
        width: 2,
    }
}

pub struct DrawLine<'a> {
    image: &'a mut Image,
    start: (f32, f32),
    end: (f32, f32),
    color: Color,
    width: u32,
}

impl DrawLine<'_> {
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }
}

impl Drop for DrawLine<'_> {
    fn drop(&mut self) {
        Line::new(
            Point::new(self.start.0 as i32, self.start.1 as i32),
            Point::new(self.end.0 as i32, self.end.1 as i32),
        )
        .into_styled(PrimitiveStyle::with_stroke(self.color, self.width))
        .draw(&mut Target(self.image))
        .unwrap();
    }
}

/// Draws a filled circular marker centered on a point.
pub fn marker(image: &mut Image, x: f32, y: f32) -> DrawMarker<'_> {
    DrawMarker {
        image,
        pos: (x, y),
        color: Color::RED,
        diameter: 7,
    }
}

pub struct DrawMarker<'a> {
    image: &'a mut Image,
    pos: (f32, f32),
    color: Color,
    diameter: u32,
}

impl DrawMarker<'_> {
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }
}

impl Drop for DrawMarker<'_> {
    fn drop(&mut self) {
        Circle::with_center(
            Point::new(self.pos.0 as i32, self.pos.1 as i32),
            self.diameter,
        )
        .into_styled(PrimitiveStyle::with_fill(self.color))
        .draw(&mut Target(self.image))
        .unwrap();
    }
}

/// Draws a text string with its baseline starting at `(x, y)`.
pub fn text<'a>(image: &'a mut Image, x: f32, y: f32, text: &'a str) -> DrawText<'a> {
    DrawText {
        image,
        pos: (x, y),
        text,
        color: Color::WHITE,
    }
}

pub struct DrawText<'a> {
    image: &'a mut Image,
    pos: (f32, f32),
    text: &'a str,
    color: Color,
}

impl DrawText<'_> {
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }
}

impl Drop for DrawText<'_> {
    fn drop(&mut self) {
        let character_style = MonoTextStyle::new(&FONT_10X20, self.color);
        let text_style = TextStyleBuilder::new().baseline(Baseline::Alphabetic).build();
        Text::with_text_style(
            self.text,
            Point::new(self.pos.0 as i32, self.pos.1 as i32),
            character_style,
            text_style,
        )
        .draw(&mut Target(self.image))
        .unwrap();
    }
}

struct Target<'a>(&'a mut Image);

impl Dimensions for Target<'_> {
    fn bounding_box(&self) -> Rectangle {
        Rectangle::new(
            Point::zero(),
            Size::new(self.0.width(), self.0.height()),
        )
    }
}

impl DrawTarget for Target<'_> {
    type Color = Color;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.0.set(point.x, point.y, color);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_rect_covers_area() {
        let mut image = Image::new(8, 8);
        filled_rect(&mut image, Rect::from_top_left(2.0, 2.0, 4.0, 4.0)).color(Color::BLUE);
        assert_eq!(image.get(3, 3), Color::BLUE);
        assert_eq!(image.get(0, 0), Color::BLACK);
    }

    #[test]
    fn clipped_drawing_does_not_panic() {
        let mut image = Image::new(4, 4);
        line(&mut image, -10.0, -10.0, 10.0, 10.0);
        marker(&mut image, 3.0, 3.0);
        text(&mut image, 0.0, 2.0, "overflowing text");
    }
}
