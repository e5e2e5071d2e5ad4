use crate::capture_surface::surface::CaptureSurface;
use crate::config::Config;
use crate::coordinator::core::{init, transition, Effect, Event, State};
use crate::coordinator::render::Render;
use crate::coordinator::run_effect::RunEffect;
use crate::device_display::interface::DeviceDisplay;
use crate::image_classifier::interface::ModelLoader;
use crate::image_source::interface::ImageDecoder;
use crate::library::logger::interface::Logger;
use crate::media_stream::controller::MediaStreamController;
use crate::media_stream::interface::MediaDevices;
use crate::video_upload::interface::VideoClassifier;
use std::error::Error;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};

/// The mode coordinator's event loop. Owns the state; everything else talks
/// to it through `sender()`.
pub struct Coordinator {
    config: Config,
    logger: Arc<dyn Logger + Send + Sync>,
    state: State,
    event_sender: Sender<Event>,
    event_receiver: Receiver<Event>,
    run_effect: RunEffect,
    render: Render,
}

impl Coordinator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        model_loader: Arc<dyn ModelLoader + Send + Sync>,
        media_devices: Arc<dyn MediaDevices + Send + Sync>,
        image_decoder: Arc<dyn ImageDecoder + Send + Sync>,
        video_classifier: Arc<dyn VideoClassifier + Send + Sync>,
        device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
    ) -> Self {
        let (event_sender, event_receiver) = channel();
        let media = Arc::new(MediaStreamController::new(media_devices, logger.clone()));
        let surface = Arc::new(Mutex::new(CaptureSurface::new(logger.clone())));
        let run_effect = RunEffect::new(
            config.clone(),
            logger.clone(),
            model_loader,
            media,
            surface,
            image_decoder,
            video_classifier,
            event_sender.clone(),
        );

        Self {
            config,
            logger: logger.with_namespace("coordinator"),
            state: State::default(),
            event_sender,
            event_receiver,
            run_effect,
            render: Render::new(device_display),
        }
    }

    pub fn sender(&self) -> Sender<Event> {
        self.event_sender.clone()
    }

    #[cfg(test)]
    pub fn state(&self) -> &State {
        &self.state
    }

    #[cfg(test)]
    pub fn is_inference_running(&self) -> bool {
        self.run_effect.is_inference_running()
    }

    #[cfg(test)]
    pub fn is_upload_progress_running(&self) -> bool {
        self.run_effect.is_upload_progress_running()
    }

    pub fn start(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let (state, effects) = init();
        self.state = state;
        self.render.init()?;
        self.render.render(&self.state)?;
        self.run_effects(effects);
        Ok(())
    }

    /// Applies one event: transition, render, then effects.
    pub fn dispatch(&mut self, event: Event) -> Result<(), Box<dyn Error + Send + Sync>> {
        let _ = self.logger.info(&format!(
            "\nold state:\n\t{:?}\n\nevent:\n\t{}",
            self.state,
            event.to_display_string(),
        ));
        let (new_state, effects) = transition(&self.config, std::mem::take(&mut self.state), event);
        let _ = self.logger.info(&format!(
            "\nnew state:\n\t{:?}\n\neffects:\n\t{:?}",
            new_state, effects
        ));
        self.state = new_state;

        self.render.render(&self.state)?;
        self.run_effects(effects);
        Ok(())
    }

    /// Handles the next queued event, waiting up to `timeout`. Returns
    /// `false` when nothing arrived.
    #[cfg(test)]
    pub fn step(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<bool, Box<dyn Error + Send + Sync>> {
        use std::sync::mpsc::RecvTimeoutError;

        match self.event_receiver.recv_timeout(timeout) {
            Ok(event) => {
                self.dispatch(event)?;
                Ok(true)
            }
            Err(RecvTimeoutError::Timeout) => Ok(false),
            Err(e @ RecvTimeoutError::Disconnected) => Err(Box::new(e)),
        }
    }

    pub fn run(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.start()?;

        loop {
            let event = self.event_receiver.recv()?;
            self.dispatch(event)?;
        }
    }

    fn run_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            self.run_effect.run_effect(effect);
        }
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.run_effect.shutdown();
    }
}
