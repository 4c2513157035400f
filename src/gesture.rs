//! Gesture classification from hand landmark geometry.
//!
//! Gestures are recognized with simple threshold rules on the landmark
//! positions, no additional machine learning involved: each finger is
//! classified as raised or folded, and the resulting 5-bit pattern is
//! looked up in a fixed table.

use std::borrow::Cow;

use crate::hand::{Hand, Handedness, LandmarkIdx};

/// Raised/folded state of the five fingers of one hand.
///
/// Finger order is thumb, index, middle, ring, pinky. `true` means raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerState(pub [bool; 5]);

impl FingerState {
    /// Derives the finger states from a hand's landmark positions.
    ///
    /// A finger counts as raised when its tip is above its middle joint in
    /// the image, which assumes a roughly upright hand. The thumb extends
    /// sideways instead, so it compares X coordinates, with the comparison
    /// direction depending on handedness (the image is mirrored, so a right
    /// thumb points towards smaller X when extended).
    pub fn detect(hand: &Hand) -> Self {
        use LandmarkIdx::*;

        let thumb_tip = hand.landmark(ThumbTip).x;
        let thumb_ip = hand.landmark(ThumbIp).x;
        let thumb = match hand.handedness() {
            Handedness::Right => thumb_tip < thumb_ip,
            Handedness::Left => thumb_tip > thumb_ip,
        };

        let raised = |tip: LandmarkIdx, pip: LandmarkIdx| hand.landmark(tip).y < hand.landmark(pip).y;
        Self([
            thumb,
            raised(IndexFingerTip, IndexFingerPip),
            raised(MiddleFingerTip, MiddleFingerPip),
            raised(RingFingerTip, RingFingerPip),
            raised(PinkyTip, PinkyPip),
        ])
    }

    /// Number of raised fingers.
    pub fn raised_count(&self) -> usize {
        self.0.iter().filter(|&&raised| raised).count()
    }
}

/// Finger patterns with a dedicated gesture name, in match order.
///
/// Patterns are in thumb/index/middle/ring/pinky order.
const GESTURES: &[([bool; 5], &str)] = &[
    ([false, false, false, false, false], "Closed fist"),
    ([true, true, true, true, true], "Open palm / Hello"),
    ([false, true, false, false, false], "Pointing"),
    ([false, true, true, false, false], "Peace sign"),
    ([true, true, true, false, false], "Three fingers"),
    ([true, true, true, true, false], "Four fingers"),
    ([true, true, false, false, true], "Rock sign"),
    ([true, true, false, false, false], "Gun sign"),
    ([true, false, false, false, false], "Thumbs up"),
];

/// Maps a finger state to a gesture name.
///
/// Patterns not in the gesture table fall back to a name based on the
/// number of raised fingers.
pub fn classify(fingers: FingerState) -> Cow<'static, str> {
    for (pattern, name) in GESTURES {
        if *pattern == fingers.0 {
            return Cow::Borrowed(name);
        }
    }

    match fingers.raised_count() {
        1 => Cow::Borrowed("One finger"),
        2 => Cow::Borrowed("Two fingers"),
        3 => Cow::Borrowed("Three fingers"),
        4 => Cow::Borrowed("Four fingers"),
        n => Cow::Owned(format!("{n} fingers")),
    }
}

#[cfg(test)]
mod tests {
    use crate::hand::{test_hand, Landmark};

    use super::*;

    const T: bool = true;
    const F: bool = false;

    #[test]
    fn table_gestures() {
        assert_eq!(classify(FingerState([F, F, F, F, F])), "Closed fist");
        assert_eq!(classify(FingerState([T, T, T, T, T])), "Open palm / Hello");
        assert_eq!(classify(FingerState([F, T, F, F, F])), "Pointing");
        assert_eq!(classify(FingerState([F, T, T, F, F])), "Peace sign");
        assert_eq!(classify(FingerState([T, T, T, F, F])), "Three fingers");
        assert_eq!(classify(FingerState([T, T, T, T, F])), "Four fingers");
        assert_eq!(classify(FingerState([T, T, F, F, T])), "Rock sign");
        assert_eq!(classify(FingerState([T, T, F, F, F])), "Gun sign");
        assert_eq!(classify(FingerState([T, F, F, F, F])), "Thumbs up");
    }

    #[test]
    fn rock_sign_beats_finger_count() {
        // Thumb+index+pinky has 3 raised fingers, but the named gesture has
        // to win over the count-based fallback.
        assert_ne!(classify(FingerState([T, T, F, F, T])), "Three fingers");
    }

    #[test]
    fn count_fallback() {
        assert_eq!(classify(FingerState([F, F, T, F, F])), "One finger");
        assert_eq!(classify(FingerState([T, F, T, F, F])), "Two fingers");
        assert_eq!(classify(FingerState([F, T, T, T, F])), "Three fingers");
        assert_eq!(classify(FingerState([T, F, T, T, T])), "Four fingers");
    }

    #[test]
    fn every_pattern_has_a_name() {
        for bits in 0..32 {
            let fingers = FingerState([
                bits & 1 != 0,
                bits & 2 != 0,
                bits & 4 != 0,
                bits & 8 != 0,
                bits & 16 != 0,
            ]);
            assert!(!classify(fingers).is_empty());
        }
    }

    fn hand_with(f: impl Fn(usize) -> Landmark, handedness: Handedness) -> Hand {
        let mut landmarks = [Landmark { x: 0.0, y: 0.0, z: 0.0 }; 21];
        for (i, lm) in landmarks.iter_mut().enumerate() {
            *lm = f(i);
        }
        test_hand(landmarks, handedness)
    }

    #[test]
    fn thumb_rule_follows_handedness() {
        // Thumb tip (4) left of the joint below it (3).
        let tip_left = |i: usize| Landmark {
            x: if i == 4 { 10.0 } else { 20.0 },
            y: 0.0,
            z: 0.0,
        };

        let right = hand_with(tip_left, Handedness::Right);
        assert!(FingerState::detect(&right).0[0]);

        let left = hand_with(tip_left, Handedness::Left);
        assert!(!FingerState::detect(&left).0[0]);
    }

    #[test]
    fn finger_raised_when_tip_above_joint() {
        // Index tip (8) above index middle joint (6); all other tips below
        // their joints.
        let index_up = |i: usize| Landmark {
            x: 0.0,
            y: if i == 8 { 10.0 } else { 50.0 },
            z: 0.0,
        };

        let hand = hand_with(index_up, Handedness::Left);
        assert_eq!(FingerState::detect(&hand).0, [false, true, false, false, false]);
    }
}
