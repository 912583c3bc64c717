//! signdb-gesture
//!
//! Turns per-frame landmark detections into the smoothed 144-value feature
//! rows a sequence classifier consumes, and decodes the classifier's logits
//! into a display label. The classifier itself lives behind
//! [`SequenceClassifier`].

pub mod error;
pub mod landmarks;
pub mod recognizer;
pub mod smoothing;

pub use error::GestureError;
pub use landmarks::{FrameLandmarks, Landmark, LandmarkGroup, FEATURES};
pub use recognizer::{GestureRecognizer, Prediction, SequenceClassifier};
pub use smoothing::{GroupSmoother, TemporalSmoother};
