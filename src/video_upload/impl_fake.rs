use crate::error::VideoUploadError;
use crate::library::logger::interface::Logger;
use crate::video_upload::interface::{
    AggregatedPrediction, ClassificationSummary, VideoClassification, VideoClassifier, VideoFile,
    VideoUploadRequest,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

pub struct VideoClassifierFake {
    logger: Arc<dyn Logger + Send + Sync>,
    delay: Duration,
    failure: Mutex<Option<VideoUploadError>>,
    calls: AtomicUsize,
}

impl VideoClassifierFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("video_upload").with_namespace("fake"),
            delay: Duration::from_millis(10),
            failure: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_failure(&self, failure: Option<VideoUploadError>) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = failure;
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl VideoClassifier for VideoClassifierFake {
    fn classify(
        &self,
        file: &VideoFile,
        request: &VideoUploadRequest,
    ) -> Result<VideoClassification, VideoUploadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _ = self
            .logger
            .info(&format!("Classifying video {}...", file.name()));
        std::thread::sleep(self.delay);

        if let Some(failure) = self
            .failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(failure);
        }

        Ok(VideoClassification {
            success: true,
            filename: Some(file.name()),
            classification: ClassificationSummary {
                aggregation_method: request.aggregation_method.clone(),
                primary_prediction: Some(AggregatedPrediction {
                    class_name: "coffee mug".to_string(),
                    confidence_percent: 62.0,
                    frames_detected: request.num_frames,
                }),
                ..ClassificationSummary::default()
            },
            ..VideoClassification::default()
        })
    }
}
