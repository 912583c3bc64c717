use thiserror::Error;

#[derive(Debug, Error)]
pub enum GestureError {
    #[error("No frames")]
    NoFrames,

    #[error("Bad feature shape: expected {expected} values per frame, got {got}")]
    BadFeatureShape { expected: usize, got: usize },

    #[error("{group} expects {expected} landmarks, got {got}")]
    WrongLandmarkCount { group: &'static str, expected: usize, got: usize },

    #[error("Classifier produced {logits} logits for {labels} labels")]
    LabelMismatch { labels: usize, logits: usize },

    #[error("Smoothing factor must be in (0, 1], got {0}")]
    InvalidAlpha(f32),

    #[error("Model error: {0}")]
    Model(String),
}

impl From<candle_core::Error> for GestureError {
    fn from(err: candle_core::Error) -> Self {
        Self::Model(err.to_string())
    }
}
