//! Hand landmark estimation.

use std::path::Path;

use anyhow::{anyhow, ensure};

use crate::{
    hand::{Handedness, Landmark},
    image::Image,
    nn::{Cnn, CnnInputShape, NeuralNetwork},
    rect::Rect,
    resolution::AspectRatio,
    timer::Timer,
};

/// Estimates 21 hand landmarks in a region of interest.
///
/// Uses MediaPipe's "lite" hand landmark model, which expects a 224x224
/// crop roughly centered on a hand.
pub struct Landmarker {
    cnn: Cnn,
    t_infer: Timer,
}

impl Landmarker {
    /// Loads the hand landmark network from `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let cnn = Cnn::new(NeuralNetwork::load(path)?, CnnInputShape::NHWC)?;
        Ok(Self {
            cnn,
            t_infer: Timer::new("infer"),
        })
    }

    /// Runs landmark estimation on `roi` within `image`.
    ///
    /// The region is padded to a square before sampling. Landmark positions
    /// in the result are in `image` coordinates.
    pub fn estimate(&mut self, image: &Image, roi: Rect) -> anyhow::Result<LandmarkResult> {
        let view = roi.grow_to_fit_aspect(AspectRatio::SQUARE);
        let outputs = self.t_infer.time(|| self.cnn.estimate(image, view))?;
        ensure!(outputs.len() >= 3, "expected at least 3 outputs, got {}", outputs.len());

        let mut screen_landmarks = None;
        let mut scalars = Vec::new();
        for i in 0..outputs.len() {
            match outputs[i].shape() {
                // Screen coordinates come before the world coordinates.
                [1, 63] if screen_landmarks.is_none() => screen_landmarks = Some(&outputs[i]),
                [1, 1] => scalars.push(outputs[i].as_slice()[0]),
                _ => {}
            }
        }
        let screen_landmarks =
            screen_landmarks.ok_or_else(|| anyhow!("missing landmark output"))?;
        ensure!(
            scalars.len() == 2,
            "expected presence and handedness outputs, got {} scalars",
            scalars.len(),
        );
        let (presence, raw_handedness) = (scalars[0], scalars[1]);

        let scale = view.width() / self.cnn.input_resolution().width() as f32;
        let mut landmarks = [Landmark { x: 0.0, y: 0.0, z: 0.0 }; 21];
        for (landmark, coords) in landmarks
            .iter_mut()
            .zip(screen_landmarks.as_slice().chunks_exact(3))
        {
            *landmark = Landmark {
                x: view.x() + coords[0] * scale,
                y: view.y() + coords[1] * scale,
                z: coords[2] * scale,
            };
        }

        Ok(LandmarkResult {
            landmarks,
            presence,
            raw_handedness,
        })
    }

    pub fn timers(&self) -> impl Iterator<Item = &Timer> + '_ {
        [&self.t_infer].into_iter()
    }
}

/// The output of [`Landmarker::estimate`].
#[derive(Debug, Clone)]
pub struct LandmarkResult {
    landmarks: [Landmark; 21],
    presence: f32,
    raw_handedness: f32,
}

impl LandmarkResult {
    /// The landmark positions, in the coordinate system of the input image.
    #[inline]
    pub fn landmarks(&self) -> &[Landmark; 21] {
        &self.landmarks
    }

    /// Confidence that the region contains a hand, in `0.0..=1.0`.
    #[inline]
    pub fn presence(&self) -> f32 {
        self.presence
    }

    /// The predicted handedness of the hand in the region.
    pub fn handedness(&self) -> Handedness {
        if self.raw_handedness > 0.5 {
            Handedness::Right
        } else {
            Handedness::Left
        }
    }

    /// Computes the bounding rectangle of all landmarks.
    pub fn bounding_rect(&self) -> Rect {
        Rect::bounding(self.landmarks.iter().map(|lm| (lm.x, lm.y))).unwrap()
    }
}
