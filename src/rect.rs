//! Axis-aligned rectangles.

use std::fmt;

use crate::resolution::AspectRatio;

/// An axis-aligned rectangle in `f32` coordinates.
///
/// Rectangles are used both in image/pixel space and in the normalized
/// coordinate space of network outputs, so no particular unit is implied.
#[derive(Clone, Copy, PartialEq)]
pub struct Rect {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and its dimensions.
    #[inline]
    pub fn from_top_left(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Creates a rectangle from its center point and its dimensions.
    #[inline]
    pub fn from_center(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self {
            x: cx - w / 2.0,
            y: cy - h / 2.0,
            w,
            h,
        }
    }

    /// Computes the smallest rectangle containing all `points`.
    ///
    /// Returns [`None`] if `points` is empty.
    pub fn bounding<I: IntoIterator<Item = (f32, f32)>>(points: I) -> Option<Self> {
        let mut points = points.into_iter();
        let (mut min_x, mut min_y) = points.next()?;
        let (mut max_x, mut max_y) = (min_x, min_y);
        for (x, y) in points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        Some(Self {
            x: min_x,
            y: min_y,
            w: max_x - min_x,
            h: max_y - min_y,
        })
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.w
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.h
    }

    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Grows each side of this rectangle by `amount` times the rectangle's
    /// width or height, keeping the center in place.
    ///
    /// An `amount` of 0.0 returns the rectangle unchanged, 0.5 doubles the
    /// width and height.
    pub fn grow_rel(&self, amount: f32) -> Self {
        let grow_w = self.w * amount;
        let grow_h = self.h * amount;
        Self {
            x: self.x - grow_w,
            y: self.y - grow_h,
            w: self.w + grow_w * 2.0,
            h: self.h + grow_h * 2.0,
        }
    }

    /// Grows this rectangle so that its aspect ratio matches `target`,
    /// keeping the center in place.
    ///
    /// Only width or height grows, never shrinks, so the result always
    /// contains `self`.
    pub fn grow_to_fit_aspect(&self, target: AspectRatio) -> Self {
        let ratio = target.as_f32();
        let (cx, cy) = self.center();
        if self.w / ratio >= self.h {
            Self::from_center(cx, cy, self.w, self.w / ratio)
        } else {
            Self::from_center(cx, cy, self.h * ratio, self.h)
        }
    }

    /// Computes the intersection over union of `self` and `other`.
    ///
    /// The result is in `0.0..=1.0`, where 0.0 means the rectangles are
    /// disjoint and 1.0 means they are identical.
    pub fn iou(&self, other: &Self) -> f32 {
        let ix_min = self.x.max(other.x);
        let iy_min = self.y.max(other.y);
        let ix_max = (self.x + self.w).min(other.x + other.w);
        let iy_max = (self.y + self.h).min(other.y + other.h);
        if ix_max <= ix_min || iy_max <= iy_min {
            return 0.0;
        }

        let intersection = (ix_max - ix_min) * (iy_max - iy_min);
        let union = self.w * self.h + other.w * other.h - intersection;
        intersection / union
    }
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rect @ ({},{}), size {}x{}",
            self.x, self.y, self.w, self.h
        )
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn iou_extremes() {
        let a = Rect::from_top_left(0.0, 0.0, 10.0, 10.0);
        assert_relative_eq!(a.iou(&a), 1.0);

        let b = Rect::from_top_left(20.0, 20.0, 10.0, 10.0);
        assert_relative_eq!(a.iou(&b), 0.0);
        assert_relative_eq!(b.iou(&a), 0.0);
    }

    #[test]
    fn iou_partial_overlap() {
        let a = Rect::from_top_left(0.0, 0.0, 10.0, 10.0);
        let b = Rect::from_top_left(5.0, 0.0, 10.0, 10.0);
        // 50 units of overlap, 150 units of union.
        assert_relative_eq!(a.iou(&b), 50.0 / 150.0);
    }

    #[test]
    fn grow_keeps_center() {
        let rect = Rect::from_center(5.0, 7.0, 2.0, 4.0);
        let grown = rect.grow_rel(1.5);
        assert_eq!(grown.center(), rect.center());
        assert_relative_eq!(grown.width(), 8.0);
        assert_relative_eq!(grown.height(), 16.0);
    }

    #[test]
    fn fit_aspect_never_shrinks() {
        let rect = Rect::from_center(0.0, 0.0, 16.0, 9.0);
        let square = rect.grow_to_fit_aspect(AspectRatio::SQUARE);
        assert_eq!(square.center(), rect.center());
        assert_relative_eq!(square.width(), 16.0);
        assert_relative_eq!(square.height(), 16.0);

        let tall = Rect::from_center(0.0, 0.0, 9.0, 16.0);
        let square = tall.grow_to_fit_aspect(AspectRatio::SQUARE);
        assert_relative_eq!(square.width(), 16.0);
        assert_relative_eq!(square.height(), 16.0);
    }

    #[test]
    fn bounding_box() {
        let rect = Rect::bounding([(1.0, 2.0), (-1.0, 0.5), (3.0, 1.0)]).unwrap();
        assert_eq!(rect.x(), -1.0);
        assert_eq!(rect.y(), 0.5);
        assert_eq!(rect.width(), 4.0);
        assert_eq!(rect.height(), 1.5);

        assert!(Rect::bounding([]).is_none());
    }
}
