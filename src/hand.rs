//! Hand detection and landmark estimation.

pub mod detection;
pub mod landmark;
pub mod tracking;

/// A landmark position in image coordinates.
///
/// `x` and `y` are pixel coordinates. `z` is an estimated depth relative to
/// the wrist, in roughly the same scale, with negative values pointing
/// towards the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Which side of the body a hand belongs to.
///
/// The camera image is mirrored before processing, so this matches what the
/// user would call their own left or right hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }
}

/// Names for the 21 hand landmarks, in model output order.
///
/// Each finger has 4 landmarks going from its base towards the tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkIdx {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexFingerMcp,
    IndexFingerPip,
    IndexFingerDip,
    IndexFingerTip,
    MiddleFingerMcp,
    MiddleFingerPip,
    MiddleFingerDip,
    MiddleFingerTip,
    RingFingerMcp,
    RingFingerPip,
    RingFingerDip,
    RingFingerTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Landmark pairs making up the hand skeleton, for visualization.
pub const CONNECTIVITY: &[(LandmarkIdx, LandmarkIdx)] = {
    use LandmarkIdx::*;
    &[
        // Thumb
        (Wrist, ThumbCmc),
        (ThumbCmc, ThumbMcp),
        (ThumbMcp, ThumbIp),
        (ThumbIp, ThumbTip),
        // Index
        (Wrist, IndexFingerMcp),
        (IndexFingerMcp, IndexFingerPip),
        (IndexFingerPip, IndexFingerDip),
        (IndexFingerDip, IndexFingerTip),
        // Middle
        (IndexFingerMcp, MiddleFingerMcp),
        (MiddleFingerMcp, MiddleFingerPip),
        (MiddleFingerPip, MiddleFingerDip),
        (MiddleFingerDip, MiddleFingerTip),
        // Ring
        (MiddleFingerMcp, RingFingerMcp),
        (RingFingerMcp, RingFingerPip),
        (RingFingerPip, RingFingerDip),
        (RingFingerDip, RingFingerTip),
        // Pinky
        (RingFingerMcp, PinkyMcp),
        (Wrist, PinkyMcp),
        (PinkyMcp, PinkyPip),
        (PinkyPip, PinkyDip),
        (PinkyDip, PinkyTip),
    ]
};

/// A detected hand with estimated landmark positions.
#[derive(Debug, Clone)]
pub struct Hand {
    landmarks: [Landmark; 21],
    handedness: Handedness,
    presence: f32,
}

impl Hand {
    pub(crate) fn new(landmarks: [Landmark; 21], handedness: Handedness, presence: f32) -> Self {
        Self {
            landmarks,
            handedness,
            presence,
        }
    }

    /// All 21 landmarks, indexable by [`LandmarkIdx`].
    #[inline]
    pub fn landmarks(&self) -> &[Landmark; 21] {
        &self.landmarks
    }

    /// Returns the position of a named landmark.
    #[inline]
    pub fn landmark(&self, idx: LandmarkIdx) -> Landmark {
        self.landmarks[idx as usize]
    }

    #[inline]
    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    /// Confidence that this region still contains a hand, in `0.0..=1.0`.
    #[inline]
    pub fn presence(&self) -> f32 {
        self.presence
    }
}

#[cfg(test)]
pub(crate) fn test_hand(landmarks: [Landmark; 21], handedness: Handedness) -> Hand {
    Hand::new(landmarks, handedness, 1.0)
}
