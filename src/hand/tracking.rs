//! Multi-hand tracking.
//!
//! Combines the palm detector and the landmark estimator: detection seeds
//! a region of interest per hand, and subsequent frames update that region
//! from the landmark positions, skipping the (more expensive) detector.

use std::{
    env,
    path::PathBuf,
    time::{Duration, Instant},
};

use crate::{
    hand::{detection::PalmDetector, landmark::Landmarker, Hand},
    image::Image,
    rect::Rect,
    timer::Timer,
};

const MODEL_DIR_VAR: &str = "MUDRA_MODEL_DIR";
const PALM_MODEL: &str = "palm_detection_lite.onnx";
const LANDMARK_MODEL: &str = "hand_landmark_lite.onnx";

/// While hands are being tracked, how long to wait between detector runs
/// that look for additional hands.
const REDETECT_INTERVAL: Duration = Duration::from_millis(300);

/// Seed regions overlapping an existing region by at least this much are
/// assumed to be the same hand.
const DEDUP_IOU: f32 = 0.3;

/// Relative amount to grow a palm detection by to cover the whole hand.
const PALM_TO_HAND_GROWTH: f32 = 1.5;

/// Relative amount to grow the landmark bounding box by when deriving the
/// next frame's region of interest.
const ROI_PADDING: f32 = 0.3;

/// Configuration for a [`HandTracker`].
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Maximum number of hands to track at the same time.
    pub max_hands: usize,
    /// Minimum palm detection confidence for a new hand to be picked up.
    pub detection_confidence: f32,
    /// Minimum landmark presence confidence for a tracked hand to be kept.
    pub tracking_confidence: f32,
    /// When set, runs the detector on every frame instead of tracking
    /// regions across frames.
    pub static_image_mode: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_hands: 2,
            detection_confidence: 0.7,
            tracking_confidence: 0.7,
            static_image_mode: false,
        }
    }
}

/// Detects and tracks hands across consecutive video frames.
pub struct HandTracker {
    config: TrackerConfig,
    detector: PalmDetector,
    landmarker: Landmarker,
    rois: Vec<Rect>,
    next_detection: Instant,
    t_detect: Timer,
    t_landmark: Timer,
}

impl HandTracker {
    /// Creates a hand tracker, loading both models from the model directory.
    ///
    /// The model directory defaults to `models` and can be overridden with
    /// the `MUDRA_MODEL_DIR` environment variable.
    pub fn new(config: TrackerConfig) -> anyhow::Result<Self> {
        let dir = PathBuf::from(env::var_os(MODEL_DIR_VAR).unwrap_or_else(|| "models".into()));
        let detector = PalmDetector::new(dir.join(PALM_MODEL))?;
        let landmarker = Landmarker::new(dir.join(LANDMARK_MODEL))?;

        Ok(Self {
            config,
            detector,
            landmarker,
            rois: Vec::new(),
            next_detection: Instant::now(),
            t_detect: Timer::new("detect"),
            t_landmark: Timer::new("landmark"),
        })
    }

    /// Processes a video frame, returning all hands found in it.
    pub fn track(&mut self, image: &Image) -> anyhow::Result<Vec<Hand>> {
        if self.config.static_image_mode {
            self.rois.clear();
        }

        if self.rois.len() < self.config.max_hands
            && (self.rois.is_empty() || Instant::now() >= self.next_detection)
        {
            self.detect_new_hands(image)?;
            self.next_detection = Instant::now() + REDETECT_INTERVAL;
        }

        let _guard = self.t_landmark.start();
        let mut hands = Vec::new();
        let mut next_rois = Vec::new();
        for roi in self.rois.drain(..) {
            let result = self.landmarker.estimate(image, roi)?;
            if result.presence() < self.config.tracking_confidence {
                // Hand left the region, stop tracking it.
                continue;
            }

            next_rois.push(result.bounding_rect().grow_rel(ROI_PADDING));
            hands.push(Hand::new(
                *result.landmarks(),
                result.handedness(),
                result.presence(),
            ));
        }
        self.rois = next_rois;

        Ok(hands)
    }

    /// Runs the palm detector and seeds regions for palms that are not
    /// already being tracked.
    fn detect_new_hands(&mut self, image: &Image) -> anyhow::Result<()> {
        let _guard = self.t_detect.start();
        let detections = self
            .detector
            .detect(image, self.config.detection_confidence)?;
        for detection in detections {
            if self.rois.len() >= self.config.max_hands {
                break;
            }

            let roi = detection.bounding_rect().grow_rel(PALM_TO_HAND_GROWTH);
            if self.rois.iter().any(|known| known.iou(&roi) >= DEDUP_IOU) {
                continue;
            }
            self.rois.push(roi);
        }

        Ok(())
    }

    pub fn timers(&self) -> impl Iterator<Item = &Timer> + '_ {
        [&self.t_detect, &self.t_landmark].into_iter()
    }
}
