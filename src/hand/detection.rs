//! Palm detection.

use std::path::Path;

use anyhow::{anyhow, ensure};

use crate::{
    detection::{Anchors, Detection, LayerInfo, NonMaxSuppression},
    image::Image,
    iter::zip_exact,
    nn::{Cnn, CnnInputShape, NeuralNetwork, Outputs},
    num::sigmoid,
    rect::Rect,
    resolution::AspectRatio,
    timer::Timer,
};

/// A palm detector based on MediaPipe's "lite" palm detection model.
///
/// The network takes a 192x192 image and outputs one candidate box per SSD
/// anchor. Candidates above the score threshold are deduplicated with
/// averaging non-maximum suppression.
pub struct PalmDetector {
    cnn: Cnn,
    anchors: Anchors,
    nms: NonMaxSuppression,
    t_infer: Timer,
    t_nms: Timer,
}

impl PalmDetector {
    /// Loads the palm detection network from `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let cnn = Cnn::new(NeuralNetwork::load(path)?, CnnInputShape::NHWC)?;
        // 2 anchors per cell in the 24x24 grid, 6 in the 12x12 grid.
        let anchors = Anchors::calculate(&[LayerInfo::new(2, 24, 24), LayerInfo::new(6, 12, 12)]);

        Ok(Self {
            cnn,
            anchors,
            nms: NonMaxSuppression::new(),
            t_infer: Timer::new("infer"),
            t_nms: Timer::new("nms"),
        })
    }

    /// Runs palm detection on the whole image.
    ///
    /// Returns all palms detected with a confidence of at least `threshold`,
    /// with bounding rectangles in image coordinates.
    pub fn detect(&mut self, image: &Image, threshold: f32) -> anyhow::Result<Vec<Detection>> {
        // The network input is square, so embed the image in a square view
        // and map the outputs back afterwards.
        let view = image.rect().grow_to_fit_aspect(AspectRatio::SQUARE);
        let outputs = self.t_infer.time(|| self.cnn.estimate(image, view))?;

        let _guard = self.t_nms.start();
        let mut detections = self.decode(&outputs, threshold)?;
        let scale = view.width() / self.cnn.input_resolution().width() as f32;
        for det in &mut detections {
            let rect = det.bounding_rect();
            det.set_bounding_rect(
                Rect::from_top_left(
                    view.x() + rect.x() * scale,
                    view.y() + rect.y() * scale,
                    rect.width() * scale,
                    rect.height() * scale,
                ),
            );
        }

        Ok(self.nms.process(&mut detections).collect())
    }

    /// Decodes raw network outputs into detections in network input
    /// coordinates.
    fn decode(&self, outputs: &Outputs, threshold: f32) -> anyhow::Result<Vec<Detection>> {
        let mut boxes = None;
        let mut scores = None;
        for i in 0..outputs.len() {
            match outputs[i].shape() {
                [1, _, 18] => boxes = Some(&outputs[i]),
                [1, _, 1] => scores = Some(&outputs[i]),
                _ => {}
            }
        }
        let boxes = boxes.ok_or_else(|| anyhow!("missing box regressor output"))?;
        let scores = scores.ok_or_else(|| anyhow!("missing score output"))?;
        ensure!(
            boxes.shape()[1] == self.anchors.len() && scores.shape()[1] == self.anchors.len(),
            "expected {} boxes/scores, got {:?}/{:?}",
            self.anchors.len(),
            boxes.shape(),
            scores.shape(),
        );

        let input_w = self.cnn.input_resolution().width() as f32;
        let input_h = self.cnn.input_resolution().height() as f32;
        let mut detections = Vec::new();
        for ((raw_box, raw_score), anchor) in zip_exact(
            boxes.as_slice().chunks_exact(18),
            scores.as_slice(),
        )
        .zip(self.anchors.iter())
        {
            let confidence = sigmoid(*raw_score);
            if confidence < threshold {
                continue;
            }

            // Box offsets are relative to the anchor center, sizes are
            // absolute, all in network input pixels.
            let x_center = raw_box[0] + anchor.x_center() * input_w;
            let y_center = raw_box[1] + anchor.y_center() * input_h;
            let rect = Rect::from_center(x_center, y_center, raw_box[2], raw_box[3]);
            detections.push(Detection::new(confidence, rect));
        }

        Ok(detections)
    }

    pub fn timers(&self) -> impl Iterator<Item = &Timer> + '_ {
        [&self.t_infer, &self.t_nms].into_iter()
    }
}
