//! Hand-sign detection for webcams.
//!
//! The pipeline mirrors the camera image, finds up to two hands with a palm
//! detection network, estimates 21 landmarks per hand with a hand landmark
//! network, and turns the landmark geometry into a named gesture with a set
//! of fixed threshold rules (see [`gesture`]).
//!
//! # Environment Variables
//!
//! * `MUDRA_MODEL_DIR`: Directory containing the ONNX model files
//!   (`palm_detection_lite.onnx` and `hand_landmark_lite.onnx`). Defaults to
//!   `models`.
//! * `MUDRA_WEBCAM_NAME`: Forces the camera device to use. If unset, the
//!   first device that supports a compatible image format will be used.

use log::LevelFilter;

pub mod detection;
pub mod gesture;
pub mod gui;
pub mod hand;
pub mod image;
pub mod nn;
pub mod overlay;
pub mod rect;
pub mod resolution;
pub mod timer;
pub mod video;

mod iter;
mod num;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = LevelFilter::Debug;
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_PKG_NAME")), log_level)
        .filter(Some("wgpu"), LevelFilter::Warn)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// The calling crate and this library log at *debug* level, `wgpu` at *warn*
/// level. If a global logger is already registered, this macro does nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
