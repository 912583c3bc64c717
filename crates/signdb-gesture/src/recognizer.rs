use candle_core::{Device, Tensor};
use serde::Serialize;

use signdb_core::config::GestureSettings;

use crate::error::GestureError;
use crate::landmarks::{FrameLandmarks, FEATURES};
use crate::smoothing::TemporalSmoother;

/// A trained sequence model: `T x 144` feature rows in, one logit per label out.
pub trait SequenceClassifier: Send + Sync {
    fn logits(&self, sequence: &[Vec<f32>]) -> anyhow::Result<Vec<f32>>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: String,
    /// Softmax probability of `label`, in `[0, 1]`.
    pub confidence: f32,
}

pub struct GestureRecognizer<C> {
    classifier: C,
    labels: Vec<String>,
    alpha: f32,
}

impl<C: SequenceClassifier> GestureRecognizer<C> {
    pub fn new(classifier: C, settings: &GestureSettings) -> Result<Self, GestureError> {
        // Fail on a bad alpha here rather than on the first clip.
        TemporalSmoother::new(settings.smoothing_alpha)?;
        Ok(Self { classifier, labels: settings.labels.clone(), alpha: settings.smoothing_alpha })
    }

    pub fn labels(&self) -> &[String] { &self.labels }

    /// Smooth a clip of raw detections, then classify it.
    pub fn predict(&self, frames: &[FrameLandmarks]) -> Result<Prediction, GestureError> {
        if frames.is_empty() {
            return Err(GestureError::NoFrames);
        }
        let sequence = TemporalSmoother::new(self.alpha)?.smooth_sequence(frames)?;
        self.predict_features(&sequence)
    }

    /// Classify already-assembled feature rows.
    pub fn predict_features(&self, sequence: &[Vec<f32>]) -> Result<Prediction, GestureError> {
        if sequence.is_empty() {
            return Err(GestureError::NoFrames);
        }
        if let Some(row) = sequence.iter().find(|row| row.len() != FEATURES) {
            return Err(GestureError::BadFeatureShape { expected: FEATURES, got: row.len() });
        }
        let logits = self.classifier.logits(sequence).map_err(|e| GestureError::Model(format!("{e:#}")))?;
        if logits.len() != self.labels.len() {
            return Err(GestureError::LabelMismatch { labels: self.labels.len(), logits: logits.len() });
        }
        if let Some(bad) = logits.iter().find(|l| !l.is_finite()) {
            return Err(GestureError::Model(format!("classifier produced a non-finite logit ({bad})")));
        }
        let probs = softmax(&logits)?;
        let (index, confidence) = probs
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |best, (i, p)| if p > best.1 { (i, p) } else { best });
        tracing::debug!(frames = sequence.len(), label = %self.labels[index], confidence, "gesture classified");
        Ok(Prediction { label: self.labels[index].clone(), confidence })
    }
}

fn softmax(logits: &[f32]) -> Result<Vec<f32>, GestureError> {
    let t = Tensor::new(logits, &Device::Cpu)?;
    Ok(candle_nn::ops::softmax(&t, 0)?.to_vec1::<f32>()?)
}
