use crate::capture_surface::surface::CaptureSurface;
use crate::capture_surface::SurfaceToken;
use crate::config::Config;
use crate::coordinator::core::{Effect, Event};
use crate::error::PlaybackError;
use crate::image_classifier::handle::ModelHandle;
use crate::image_classifier::interface::ModelLoader;
use crate::image_source::interface::ImageDecoder;
use crate::inference_scheduler::scheduler::InferenceScheduler;
use crate::library::interval_timer::IntervalTimer;
use crate::library::logger::interface::Logger;
use crate::media_stream::controller::MediaStreamController;
use crate::media_stream::interface::MediaStream;
use crate::video_upload::interface::VideoClassifier;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Performs effects against the devices and reports back as events.
///
/// Cancelling effects run inline so they complete before the loop handles
/// its next event. Anything that waits on a device runs on its own thread.
#[derive(Clone)]
pub struct RunEffect {
    config: Config,
    logger: Arc<dyn Logger + Send + Sync>,
    model_loader: Arc<dyn ModelLoader + Send + Sync>,
    model: ModelHandle,
    media: Arc<MediaStreamController>,
    surface: Arc<Mutex<CaptureSurface>>,
    scheduler: InferenceScheduler,
    image_decoder: Arc<dyn ImageDecoder + Send + Sync>,
    video_classifier: Arc<dyn VideoClassifier + Send + Sync>,
    upload_timer: IntervalTimer,
    event_sender: Sender<Event>,
}

impl RunEffect {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        model_loader: Arc<dyn ModelLoader + Send + Sync>,
        media: Arc<MediaStreamController>,
        surface: Arc<Mutex<CaptureSurface>>,
        image_decoder: Arc<dyn ImageDecoder + Send + Sync>,
        video_classifier: Arc<dyn VideoClassifier + Send + Sync>,
        event_sender: Sender<Event>,
    ) -> Self {
        let model = ModelHandle::new();
        let scheduler = InferenceScheduler::new(
            surface.clone(),
            model.clone(),
            config.inference_interval,
            config.top_k,
            config.min_ready_state,
            logger.clone(),
        );
        Self {
            config,
            logger: logger.with_namespace("run_effect"),
            model_loader,
            model,
            media,
            surface,
            scheduler,
            image_decoder,
            video_classifier,
            upload_timer: IntervalTimer::new(),
            event_sender,
        }
    }

    pub fn run_effect(&self, effect: Effect) {
        let _ = self.logger.info(&format!("Running effect: {:?}", effect));

        match effect {
            Effect::LoadModel => self.spawn(|this| {
                let result = this
                    .model_loader
                    .load(&this.config.model_options)
                    .map(|classifier| {
                        this.model.install(classifier);
                    });
                this.send(Event::ModelLoadDone(result));
            }),
            Effect::AcquireStream { token } => self.spawn(move |this| {
                let result = this
                    .media
                    .acquire(token, &this.config.media_constraints)
                    .map(|_| ());
                this.send(Event::StreamAcquireDone { token, result });
            }),
            Effect::BindStream { token } => match self.media.stream(token) {
                Some(stream) => self.surface().bind_stream(token, stream),
                None => {
                    let _ = self
                        .logger
                        .warn(&format!("No live stream to bind for surface {}", token));
                }
            },
            Effect::AwaitMetadata { token } => self.spawn(move |this| {
                let result = this.with_stream(token, |stream| stream.wait_for_metadata());
                this.send(Event::MetadataLoaded { token, result });
            }),
            Effect::PlayVideo { token } => self.spawn(move |this| {
                let result = this.with_stream(token, |stream| stream.play());
                this.send(Event::PlayDone { token, result });
            }),
            Effect::ReleaseStream { token } => {
                self.media.release(token);
                self.surface().unbind_token(token);
            }
            Effect::DecodeImage { token, file } => {
                self.surface().expect_image(token);
                self.spawn(move |this| {
                    let result = this.image_decoder.decode(&file).map(|frame| {
                        this.surface().bind_image(token, frame);
                    });
                    this.send(Event::ImageDecodeDone { token, result });
                });
            }
            Effect::UnbindSurface => self.surface().unbind(),
            Effect::StartInference { token } => {
                let event_sender = self.event_sender.clone();
                self.scheduler.start_recurring(token, move |token| {
                    event_sender.send(Event::InferenceTick { token }).is_ok()
                });
            }
            Effect::StopInference => self.scheduler.stop(),
            Effect::Classify { token, kind } => self.spawn(move |this| {
                if let Some(result) = this.scheduler.classify_once(token) {
                    this.send(Event::ClassifyDone {
                        token,
                        kind,
                        result,
                    });
                }
            }),
            Effect::UploadVideo { upload_id, file } => self.spawn(move |this| {
                let result = this
                    .video_classifier
                    .classify(&file, &this.config.video_upload.request);
                this.send(Event::VideoUploadDone { upload_id, result });
            }),
            Effect::StartUploadProgress { upload_id } => {
                let event_sender = self.event_sender.clone();
                self.upload_timer
                    .start(self.config.video_upload.progress_interval, move || {
                        event_sender
                            .send(Event::UploadProgressTick { upload_id })
                            .is_ok()
                    });
            }
            Effect::StopUploadProgress => self.upload_timer.stop(),
        }
    }

    /// Stops every timer and releases the camera.
    pub fn shutdown(&self) {
        self.scheduler.stop();
        self.upload_timer.stop();
        self.media.release_all();
        self.surface().unbind();
    }

    #[cfg(test)]
    pub fn is_inference_running(&self) -> bool {
        self.scheduler.is_running()
    }

    #[cfg(test)]
    pub fn is_upload_progress_running(&self) -> bool {
        self.upload_timer.is_running()
    }

    fn spawn<F>(&self, f: F)
    where
        F: FnOnce(&RunEffect) + Send + 'static,
    {
        let this = self.clone();
        std::thread::spawn(move || f(&this));
    }

    fn send(&self, event: Event) {
        if self.event_sender.send(event).is_err() {
            let _ = self.logger.warn("Event loop has stopped, dropping result");
        }
    }

    fn surface(&self) -> MutexGuard<'_, CaptureSurface> {
        self.surface.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_stream<F>(&self, token: SurfaceToken, f: F) -> Result<(), PlaybackError>
    where
        F: FnOnce(&(dyn MediaStream + Send + Sync)) -> Result<(), PlaybackError>,
    {
        match self.media.stream(token) {
            Some(stream) => f(stream.as_ref()),
            None => Err(PlaybackError::NotBound),
        }
    }
}
