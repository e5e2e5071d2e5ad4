use crate::capture_surface::Frame;
use crate::error::{CameraError, CaptureError, PlaybackError};
use crate::library::logger::interface::Logger;
use crate::media_stream::interface::{MediaConstraints, MediaDevices, MediaStream, ReadyState};
use image::{DynamicImage, Rgb, RgbImage};
use rand::Rng;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

pub const FAKE_FRAME_WIDTH: u32 = 32;
pub const FAKE_FRAME_HEIGHT: u32 = 24;

const AUTOPLAY_BLOCKED_MESSAGE: &str =
    "play() failed because the user didn't interact with the document first";

pub struct MediaDevicesFake {
    logger: Arc<dyn Logger + Send + Sync>,
    permission: Mutex<Result<(), CameraError>>,
    blocked_plays: AtomicUsize,
    acquire_delay: Duration,
    metadata_delay: Duration,
    ready_state_when_playing: Mutex<ReadyState>,
    streams: Mutex<Vec<Arc<MediaStreamFake>>>,
    next_id: AtomicU64,
}

impl MediaDevicesFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("camera").with_namespace("fake"),
            permission: Mutex::new(Ok(())),
            blocked_plays: AtomicUsize::new(0),
            acquire_delay: Duration::from_millis(10),
            metadata_delay: Duration::from_millis(10),
            ready_state_when_playing: Mutex::new(ReadyState::HaveEnoughData),
            streams: Mutex::new(vec![]),
            next_id: AtomicU64::new(1),
        }
    }

    #[cfg(test)]
    pub fn with_delays(mut self, acquire_delay: Duration, metadata_delay: Duration) -> Self {
        self.acquire_delay = acquire_delay;
        self.metadata_delay = metadata_delay;
        self
    }

    #[cfg(test)]
    pub fn set_permission(&self, permission: Result<(), CameraError>) {
        *self
            .permission
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = permission;
    }

    /// The next `count` play attempts on newly acquired streams are refused.
    #[cfg(test)]
    pub fn block_autoplay(&self, count: usize) {
        self.blocked_plays.store(count, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub fn set_ready_state_when_playing(&self, ready_state: ReadyState) {
        *self
            .ready_state_when_playing
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = ready_state;
        for stream in self.streams() {
            stream.set_ready_state_when_playing(ready_state);
        }
    }

    #[cfg(test)]
    pub fn streams(&self) -> Vec<Arc<MediaStreamFake>> {
        self.streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[cfg(test)]
    pub fn live_stream_count(&self) -> usize {
        self.streams().iter().filter(|s| s.is_live()).count()
    }
}

impl MediaDevices for MediaDevicesFake {
    fn get_user_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<Arc<dyn MediaStream + Send + Sync>, CameraError> {
        let _ = self.logger.info(&format!(
            "Requesting camera access with {:?}...",
            constraints
        ));
        std::thread::sleep(self.acquire_delay);

        self.permission
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let ready_state = *self
            .ready_state_when_playing
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let stream = Arc::new(MediaStreamFake {
            id: format!("fake-stream-{}", id),
            logger: self.logger.with_namespace(&format!("stream-{}", id)),
            live: AtomicBool::new(true),
            metadata_loaded: AtomicBool::new(false),
            playing: AtomicBool::new(false),
            blocked_plays: AtomicUsize::new(self.blocked_plays.swap(0, Ordering::SeqCst)),
            metadata_delay: self.metadata_delay,
            ready_state_when_playing: Mutex::new(ready_state),
        });
        self.streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&stream));

        let _ = self.logger.info(&format!("Camera stream {} opened", stream.id));
        Ok(stream)
    }
}

pub struct MediaStreamFake {
    id: String,
    logger: Arc<dyn Logger + Send + Sync>,
    live: AtomicBool,
    metadata_loaded: AtomicBool,
    playing: AtomicBool,
    blocked_plays: AtomicUsize,
    metadata_delay: Duration,
    ready_state_when_playing: Mutex<ReadyState>,
}

impl MediaStreamFake {
    #[cfg(test)]
    pub fn set_ready_state_when_playing(&self, ready_state: ReadyState) {
        *self
            .ready_state_when_playing
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = ready_state;
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}

impl MediaStream for MediaStreamFake {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn wait_for_metadata(&self) -> Result<(), PlaybackError> {
        std::thread::sleep(self.metadata_delay);
        if !self.is_live() {
            return Err(PlaybackError::Ended);
        }
        self.metadata_loaded.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn play(&self) -> Result<(), PlaybackError> {
        if !self.is_live() {
            return Err(PlaybackError::Ended);
        }
        let blocked = self
            .blocked_plays
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if blocked {
            let _ = self.logger.warn("Autoplay blocked");
            return Err(PlaybackError::Blocked(AUTOPLAY_BLOCKED_MESSAGE.to_string()));
        }
        self.playing.store(true, Ordering::SeqCst);
        let _ = self.logger.info("Playback started");
        Ok(())
    }

    fn ready_state(&self) -> ReadyState {
        if !self.is_live() {
            ReadyState::HaveNothing
        } else if self.is_playing() {
            *self
                .ready_state_when_playing
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
        } else if self.metadata_loaded.load(Ordering::SeqCst) {
            ReadyState::HaveMetadata
        } else {
            ReadyState::HaveNothing
        }
    }

    fn capture_frame(&self) -> Result<Frame, CaptureError> {
        if !self.is_live() {
            return Err(CaptureError::Ended);
        }
        let mut rng = rand::rng();
        let image = RgbImage::from_fn(FAKE_FRAME_WIDTH, FAKE_FRAME_HEIGHT, |_, _| {
            Rgb([rng.random(), rng.random(), rng.random()])
        });
        Ok(DynamicImage::ImageRgb8(image))
    }

    fn stop_tracks(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            self.playing.store(false, Ordering::SeqCst);
            let _ = self.logger.info("Tracks stopped");
        }
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}
