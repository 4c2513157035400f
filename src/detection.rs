//! Types for single-shot object detectors.
//!
//! Contains SSD anchor generation and non-maximum suppression, the two
//! pieces of pre/postprocessing shared by MediaPipe-style detection
//! networks.

use std::vec;

use crate::{num::TotalF32, rect::Rect};

/// A detected object.
#[derive(Debug, Clone, Copy)]
pub struct Detection {
    confidence: f32,
    rect: Rect,
}

impl Detection {
    pub fn new(confidence: f32, rect: Rect) -> Self {
        Self { confidence, rect }
    }

    /// The detector's confidence in this detection, in `0.0..=1.0`.
    #[inline]
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// The bounding rectangle of the detected object.
    #[inline]
    pub fn bounding_rect(&self) -> Rect {
        self.rect
    }

    pub fn set_bounding_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }
}

/// Non-maximum suppression with confidence-weighted box averaging.
///
/// Instead of discarding suppressed detections, their rectangles are
/// averaged into the seed detection, weighted by confidence. This is what
/// MediaPipe does and it stabilizes the output boxes considerably.
pub struct NonMaxSuppression {
    iou_threshold: f32,
    avg_buf: Vec<Detection>,
}

impl NonMaxSuppression {
    pub fn new() -> Self {
        Self {
            iou_threshold: 0.3,
            avg_buf: Vec::new(),
        }
    }

    pub fn set_iou_threshold(&mut self, threshold: f32) {
        self.iou_threshold = threshold;
    }

    /// Processes `detections` and returns the deduplicated list.
    pub fn process(&mut self, detections: &mut Vec<Detection>) -> vec::IntoIter<Detection> {
        detections.sort_unstable_by_key(|det| TotalF32(det.confidence));

        let mut out = Vec::new();
        // Highest confidence sorts last, so the seed comes from the back.
        while let Some(seed) = detections.pop() {
            self.avg_buf.clear();
            self.avg_buf.push(seed);
            detections.retain(|other| {
                if seed.rect.iou(&other.rect) >= self.iou_threshold {
                    self.avg_buf.push(*other);
                    false
                } else {
                    true
                }
            });

            let total_confidence: f32 = self.avg_buf.iter().map(|det| det.confidence).sum();
            let (mut x, mut y, mut w, mut h) = (0.0, 0.0, 0.0, 0.0);
            for det in &self.avg_buf {
                let weight = det.confidence / total_confidence;
                x += det.rect.x() * weight;
                y += det.rect.y() * weight;
                w += det.rect.width() * weight;
                h += det.rect.height() * weight;
            }
            out.push(Detection::new(
                seed.confidence,
                Rect::from_top_left(x, y, w, h),
            ));
        }

        out.into_iter()
    }
}

impl Default for NonMaxSuppression {
    fn default() -> Self {
        Self::new()
    }
}

/// Parameters of one SSD output layer.
#[derive(Debug, Clone, Copy)]
pub struct LayerInfo {
    anchors_per_cell: u32,
    cells_x: u32,
    cells_y: u32,
}

impl LayerInfo {
    /// Creates a layer description with a grid of `cells_x * cells_y` cells,
    /// where each cell contains `anchors_per_cell` anchors.
    pub fn new(anchors_per_cell: u32, cells_x: u32, cells_y: u32) -> Self {
        Self {
            anchors_per_cell,
            cells_x,
            cells_y,
        }
    }
}

/// An SSD anchor, storing only its normalized center position.
///
/// The hand models encode box sizes directly in the network output, so the
/// anchor dimensions are not needed.
#[derive(Debug, Clone, Copy)]
pub struct Anchor {
    x_center: f32,
    y_center: f32,
}

impl Anchor {
    /// Normalized X coordinate of the anchor center, in `0.0..=1.0`.
    #[inline]
    pub fn x_center(&self) -> f32 {
        self.x_center
    }

    /// Normalized Y coordinate of the anchor center, in `0.0..=1.0`.
    #[inline]
    pub fn y_center(&self) -> f32 {
        self.y_center
    }
}

/// The precomputed list of anchors of an SSD network.
pub struct Anchors {
    anchors: Vec<Anchor>,
}

impl Anchors {
    /// Computes the anchor list from a network's output layer descriptions.
    ///
    /// Anchors are generated in scanline order, layer by layer, matching the
    /// order of the network's output rows.
    pub fn calculate(layers: &[LayerInfo]) -> Self {
        let mut anchors = Vec::new();
        for layer in layers {
            for y in 0..layer.cells_y {
                for x in 0..layer.cells_x {
                    for _ in 0..layer.anchors_per_cell {
                        anchors.push(Anchor {
                            x_center: (x as f32 + 0.5) / layer.cells_x as f32,
                            y_center: (y as f32 + 0.5) / layer.cells_y as f32,
                        });
                    }
                }
            }
        }
        Self { anchors }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Anchor> + '_ {
        self.anchors.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn anchor_count_matches_palm_model() {
        let anchors = Anchors::calculate(&[
            LayerInfo::new(2, 24, 24),
            LayerInfo::new(6, 12, 12),
        ]);
        assert_eq!(anchors.len(), 2016);
        for anchor in anchors.iter() {
            assert!(anchor.x_center() > 0.0 && anchor.x_center() < 1.0);
            assert!(anchor.y_center() > 0.0 && anchor.y_center() < 1.0);
        }
    }

    #[test]
    fn nms_merges_overlapping() {
        let mut nms = NonMaxSuppression::new();
        let mut detections = vec![
            Detection::new(1.0, Rect::from_top_left(0.0, 0.0, 10.0, 10.0)),
            Detection::new(1.0, Rect::from_top_left(1.0, 1.0, 10.0, 10.0)),
        ];
        let out: Vec<_> = nms.process(&mut detections).collect();
        assert_eq!(out.len(), 1);
        // Equal weights average the two boxes.
        assert_relative_eq!(out[0].bounding_rect().x(), 0.5);
        assert_relative_eq!(out[0].bounding_rect().y(), 0.5);
    }

    #[test]
    fn nms_keeps_disjoint() {
        let mut nms = NonMaxSuppression::new();
        let mut detections = vec![
            Detection::new(0.9, Rect::from_top_left(0.0, 0.0, 10.0, 10.0)),
            Detection::new(0.8, Rect::from_top_left(50.0, 50.0, 10.0, 10.0)),
        ];
        let out: Vec<_> = nms.process(&mut detections).collect();
        assert_eq!(out.len(), 2);
        assert!(out[0].confidence() >= out[1].confidence());
    }
}
