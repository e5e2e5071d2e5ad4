use crate::capture_surface::surface::CaptureSurface;
use crate::capture_surface::SurfaceToken;
use crate::error::InferenceError;
use crate::image_classifier::handle::ModelHandle;
use crate::image_classifier::interface::Prediction;
use crate::library::interval_timer::IntervalTimer;
use crate::library::logger::interface::Logger;
use crate::media_stream::interface::ReadyState;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Runs the classifier against the capture surface, on a fixed cadence or
/// once on demand.
#[derive(Clone)]
pub struct InferenceScheduler {
    timer: IntervalTimer,
    surface: Arc<Mutex<CaptureSurface>>,
    model: ModelHandle,
    interval: Duration,
    top_k: usize,
    min_ready_state: ReadyState,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl InferenceScheduler {
    pub fn new(
        surface: Arc<Mutex<CaptureSurface>>,
        model: ModelHandle,
        interval: Duration,
        top_k: usize,
        min_ready_state: ReadyState,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Self {
        Self {
            timer: IntervalTimer::new(),
            surface,
            model,
            interval,
            top_k,
            min_ready_state,
            logger: logger.with_namespace("inference_scheduler"),
        }
    }

    /// Starts ticking for `token`, replacing any previous loop. `on_tick`
    /// returning `false` ends the loop.
    pub fn start_recurring<F>(&self, token: SurfaceToken, on_tick: F)
    where
        F: Fn(SurfaceToken) -> bool + Send + 'static,
    {
        let _ = self.logger.info(&format!(
            "Starting recurring inference for surface {} every {:?}",
            token, self.interval
        ));
        self.timer.start(self.interval, move || on_tick(token));
    }

    pub fn stop(&self) {
        if self.timer.is_running() {
            let _ = self.logger.info("Stopping recurring inference");
        }
        self.timer.stop();
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    /// Classifies the current frame of `token`'s surface. `None` means the
    /// surface had not buffered enough data and this round was skipped.
    pub fn classify_once(
        &self,
        token: SurfaceToken,
    ) -> Option<Result<Vec<Prediction>, InferenceError>> {
        let model = match self.model.get() {
            Some(model) => model,
            None => return Some(Err(InferenceError::ModelNotLoaded)),
        };

        let sample = self
            .surface
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sample(token, self.min_ready_state);

        let frame = match sample {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                let _ = self.logger.info(&format!(
                    "Skipping inference for surface {}: not enough data",
                    token
                ));
                return None;
            }
            Err(e) => return Some(Err(e.into())),
        };

        let result = model.classify(&frame, self.top_k);
        if let Err(e) = &result {
            let _ = self
                .logger
                .error(&format!("Inference failed for surface {}: {}", token, e));
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CaptureError;
    use crate::image_classifier::impl_fake::ImageClassifierFake;
    use crate::library::logger::impl_console::LoggerConsole;
    use crate::media_stream::impl_fake::MediaDevicesFake;
    use crate::media_stream::interface::{MediaConstraints, MediaDevices};
    use chrono::{Offset, Utc};
    use image::DynamicImage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixture {
        logger: Arc<dyn Logger + Send + Sync>,
        surface: Arc<Mutex<CaptureSurface>>,
        model: ModelHandle,
        classifier: Arc<ImageClassifierFake>,
        scheduler: InferenceScheduler,
    }

    impl Fixture {
        fn new() -> Self {
            let logger: Arc<dyn Logger + Send + Sync> = Arc::new(LoggerConsole::new(Utc.fix()));
            let surface = Arc::new(Mutex::new(CaptureSurface::new(logger.clone())));
            let model = ModelHandle::new();
            let classifier = Arc::new(ImageClassifierFake::new(logger.clone()));
            let scheduler = InferenceScheduler::new(
                surface.clone(),
                model.clone(),
                Duration::from_millis(10),
                5,
                ReadyState::HaveCurrentData,
                logger.clone(),
            );
            Self {
                logger,
                surface,
                model,
                classifier,
                scheduler,
            }
        }
    }

    #[test]
    fn test_classify_once_without_model() {
        let f = Fixture::new();
        let result = f.scheduler.classify_once(SurfaceToken(1));
        assert_eq!(result, Some(Err(InferenceError::ModelNotLoaded)));
    }

    #[test]
    fn test_classify_once_on_image() {
        let f = Fixture::new();
        f.model.install(f.classifier.clone());
        {
            let mut surface = f.surface.lock().unwrap();
            surface.expect_image(SurfaceToken(1));
            surface.bind_image(SurfaceToken(1), DynamicImage::new_rgb8(6, 6));
        }

        let predictions = f.scheduler.classify_once(SurfaceToken(1)).unwrap().unwrap();

        assert!(predictions.len() <= 5);
        assert_eq!(f.classifier.calls_with_size(6, 6), 1);
    }

    #[test]
    fn test_classify_once_skips_unbuffered_stream() {
        let f = Fixture::new();
        f.model.install(f.classifier.clone());
        let stream = MediaDevicesFake::new(f.logger.clone())
            .with_delays(Duration::ZERO, Duration::ZERO)
            .get_user_media(&MediaConstraints::default())
            .unwrap();
        f.surface
            .lock()
            .unwrap()
            .bind_stream(SurfaceToken(1), stream);

        assert_eq!(f.scheduler.classify_once(SurfaceToken(1)), None);
        assert_eq!(f.classifier.call_count(), 0);
    }

    #[test]
    fn test_classify_once_on_superseded_surface() {
        let f = Fixture::new();
        f.model.install(f.classifier.clone());

        let result = f.scheduler.classify_once(SurfaceToken(4));

        assert_eq!(
            result,
            Some(Err(InferenceError::Capture(CaptureError::NotBound)))
        );
    }

    #[test]
    fn test_recurring_ticks_stop_immediately() {
        let f = Fixture::new();
        let ticks = Arc::new(AtomicUsize::new(0));
        let ticks_clone = ticks.clone();

        f.scheduler.start_recurring(SurfaceToken(1), move |token| {
            assert_eq!(token, SurfaceToken(1));
            ticks_clone.fetch_add(1, Ordering::SeqCst);
            true
        });
        std::thread::sleep(Duration::from_millis(60));
        f.scheduler.stop();
        assert!(!f.scheduler.is_running());

        std::thread::sleep(Duration::from_millis(20));
        let after_stop = ticks.load(Ordering::SeqCst);
        assert!(after_stop >= 1);
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(ticks.load(Ordering::SeqCst), after_stop);
    }
}
