use crate::capture_surface::Frame;
use crate::error::{InferenceError, ModelLoadError};
use crate::image_classifier::interface::{
    rank, ImageClassifier, ModelLoader, ModelOptions, Prediction,
};
use crate::library::logger::interface::Logger;
use rand::Rng;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

const LABELS: [&str; 18] = [
    "dog", "cat", "person", "car", "chair", "table", "bird", "tree", "bicycle", "book", "laptop",
    "phone", "cup", "bottle", "keyboard", "mouse", "plant", "clock",
];

const SUPPORTED_VERSIONS: [u32; 2] = [1, 2];
const SUPPORTED_ALPHAS: [f32; 4] = [0.25, 0.5, 0.75, 1.0];

pub struct ImageClassifierFake {
    logger: Arc<dyn Logger + Send + Sync>,
    delay: Duration,
    failure: Mutex<Option<String>>,
    classified_sizes: Mutex<Vec<(u32, u32)>>,
}

impl ImageClassifierFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("image_classifier").with_namespace("fake"),
            delay: Duration::ZERO,
            failure: Mutex::new(None),
            classified_sizes: Mutex::new(vec![]),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[cfg(test)]
    pub fn set_failure(&self, failure: Option<&str>) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) =
            failure.map(str::to_string);
    }

    #[cfg(test)]
    pub fn call_count(&self) -> usize {
        self.classified_sizes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of classifications run on frames of the given dimensions.
    #[cfg(test)]
    pub fn calls_with_size(&self, width: u32, height: u32) -> usize {
        self.classified_sizes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|size| **size == (width, height))
            .count()
    }
}

impl ImageClassifier for ImageClassifierFake {
    fn classify(&self, frame: &Frame, top_k: usize) -> Result<Vec<Prediction>, InferenceError> {
        let _ = self.logger.info(&format!(
            "Classifying {}x{} frame...",
            frame.width(),
            frame.height()
        ));
        std::thread::sleep(self.delay);
        self.classified_sizes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((frame.width(), frame.height()));

        if let Some(message) = self
            .failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(InferenceError::Backend(message));
        }

        let mut rng = rand::rng();
        let scores: Vec<f32> = LABELS.iter().map(|_| rng.random::<f32>()).collect();
        let total: f32 = scores.iter().sum::<f32>().max(f32::EPSILON);

        let predictions = LABELS
            .iter()
            .zip(scores)
            .map(|(label, score)| Prediction::new(label, score / total))
            .collect();

        Ok(rank(predictions, top_k))
    }
}

pub struct ModelLoaderFake {
    logger: Arc<dyn Logger + Send + Sync>,
    classifier: Arc<ImageClassifierFake>,
    delay: Duration,
    failure: Option<String>,
}

impl ModelLoaderFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>, classifier: Arc<ImageClassifierFake>) -> Self {
        Self {
            logger: logger.with_namespace("model_loader").with_namespace("fake"),
            classifier,
            delay: Duration::ZERO,
            failure: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[cfg(test)]
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }
}

impl ModelLoader for ModelLoaderFake {
    fn load(
        &self,
        options: &ModelOptions,
    ) -> Result<Arc<dyn ImageClassifier + Send + Sync>, ModelLoadError> {
        let _ = self.logger.info(&format!(
            "Loading model version {} alpha {}...",
            options.version, options.alpha
        ));

        if !SUPPORTED_VERSIONS.contains(&options.version) {
            return Err(ModelLoadError::UnsupportedVersion(options.version));
        }
        if !SUPPORTED_ALPHAS.contains(&options.alpha) {
            return Err(ModelLoadError::UnsupportedAlpha(options.alpha));
        }

        std::thread::sleep(self.delay);

        if let Some(message) = &self.failure {
            return Err(ModelLoadError::Backend(message.clone()));
        }

        let _ = self.logger.info("Model loaded");
        Ok(self.classifier.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::logger::impl_console::LoggerConsole;
    use chrono::{Offset, Utc};
    use image::DynamicImage;

    fn logger() -> Arc<dyn Logger + Send + Sync> {
        Arc::new(LoggerConsole::new(Utc.fix()))
    }

    #[test]
    fn test_fake_predictions_are_ranked_probabilities() {
        let classifier = ImageClassifierFake::new(logger());
        let predictions = classifier
            .classify(&DynamicImage::new_rgb8(8, 8), 5)
            .unwrap();

        assert_eq!(predictions.len(), 5);
        assert!(predictions
            .windows(2)
            .all(|pair| pair[0].probability >= pair[1].probability));
        assert!(predictions
            .iter()
            .all(|p| (0.0..=1.0).contains(&p.probability)));
        assert_eq!(classifier.calls_with_size(8, 8), 1);
    }

    #[test]
    fn test_fake_failure() {
        let classifier = ImageClassifierFake::new(logger());
        classifier.set_failure(Some("backend crashed"));

        let result = classifier.classify(&DynamicImage::new_rgb8(8, 8), 5);

        assert_eq!(
            result,
            Err(InferenceError::Backend("backend crashed".to_string()))
        );
        assert_eq!(classifier.call_count(), 1);
    }

    #[test]
    fn test_loader_validates_options() {
        let classifier = Arc::new(ImageClassifierFake::new(logger()));
        let loader = ModelLoaderFake::new(logger(), classifier);

        assert!(loader.load(&ModelOptions::default()).is_ok());
        assert_eq!(
            loader
                .load(&ModelOptions {
                    version: 3,
                    alpha: 0.5
                })
                .err(),
            Some(ModelLoadError::UnsupportedVersion(3))
        );
        assert_eq!(
            loader
                .load(&ModelOptions {
                    version: 2,
                    alpha: 0.3
                })
                .err(),
            Some(ModelLoadError::UnsupportedAlpha(0.3))
        );
    }

    #[test]
    fn test_failing_loader() {
        let classifier = Arc::new(ImageClassifierFake::new(logger()));
        let loader = ModelLoaderFake::new(logger(), classifier).failing("weights missing");

        assert_eq!(
            loader.load(&ModelOptions::default()).err(),
            Some(ModelLoadError::Backend("weights missing".to_string()))
        );
    }
}
