use crate::capture_surface::Frame;
use crate::error::{InferenceError, ModelLoadError};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub class_name: String,
    pub probability: f32,
}

impl Prediction {
    pub fn new(class_name: &str, probability: f32) -> Self {
        Self {
            class_name: class_name.to_string(),
            probability,
        }
    }

    pub fn percent(&self) -> f32 {
        self.probability * 100.0
    }
}

/// Options recognized when loading the model.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelOptions {
    /// Model architecture version.
    pub version: u32,
    /// Width multiplier.
    pub alpha: f32,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            version: 2,
            alpha: 0.5,
        }
    }
}

pub trait ImageClassifier {
    /// Returns at most `top_k` predictions, most likely first.
    fn classify(&self, frame: &Frame, top_k: usize) -> Result<Vec<Prediction>, InferenceError>;
}

pub trait ModelLoader {
    fn load(
        &self,
        options: &ModelOptions,
    ) -> Result<Arc<dyn ImageClassifier + Send + Sync>, ModelLoadError>;
}

/// Orders predictions most likely first and keeps the top `top_k`.
/// Non-finite scores are dropped.
pub fn rank(mut predictions: Vec<Prediction>, top_k: usize) -> Vec<Prediction> {
    predictions.retain(|p| p.probability.is_finite());
    predictions.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    predictions.truncate(top_k);
    predictions
}
