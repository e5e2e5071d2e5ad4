use crate::capture_surface::SurfaceToken;
use crate::error::CameraError;
use crate::library::logger::interface::Logger;
use crate::media_stream::interface::{MediaConstraints, MediaDevices, MediaStream};
use std::sync::{Arc, Mutex, PoisonError};

/// Owns zero or one camera stream. Dropping the handle stops its tracks.
pub struct StreamHandle {
    token: SurfaceToken,
    stream: Option<Arc<dyn MediaStream + Send + Sync>>,
}

impl StreamHandle {
    pub fn new(token: SurfaceToken, stream: Arc<dyn MediaStream + Send + Sync>) -> Self {
        Self {
            token,
            stream: Some(stream),
        }
    }

    pub fn token(&self) -> SurfaceToken {
        self.token
    }

    pub fn stream(&self) -> Option<Arc<dyn MediaStream + Send + Sync>> {
        self.stream.clone()
    }

    pub fn is_released(&self) -> bool {
        self.stream.is_none()
    }

    pub fn release(&mut self) {
        if let Some(stream) = self.stream.take() {
            stream.stop_tracks();
        }
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// Acquires and releases the camera stream, keeping at most one live.
///
/// Acquisition blocks on the platform (a permission prompt), so the device
/// call happens outside the lock and the lock only guards adoption of the
/// result.
pub struct MediaStreamController {
    media_devices: Arc<dyn MediaDevices + Send + Sync>,
    logger: Arc<dyn Logger + Send + Sync>,
    live: Mutex<Option<StreamHandle>>,
}

impl MediaStreamController {
    pub fn new(
        media_devices: Arc<dyn MediaDevices + Send + Sync>,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Self {
        Self {
            media_devices,
            logger: logger.with_namespace("media_stream"),
            live: Mutex::new(None),
        }
    }

    pub fn acquire(
        &self,
        token: SurfaceToken,
        constraints: &MediaConstraints,
    ) -> Result<Arc<dyn MediaStream + Send + Sync>, CameraError> {
        if self.live_token().is_some() {
            return Err(CameraError::AlreadyLive);
        }

        let stream = self.media_devices.get_user_media(constraints)?;

        let mut live = self.live.lock().unwrap_or_else(PoisonError::into_inner);
        if live.as_ref().is_some_and(|handle| !handle.is_released()) {
            stream.stop_tracks();
            return Err(CameraError::AlreadyLive);
        }
        *live = Some(StreamHandle::new(token, Arc::clone(&stream)));

        let _ = self
            .logger
            .info(&format!("Acquired stream {} for surface {}", stream.id(), token));
        Ok(stream)
    }

    /// Releases the live stream if it belongs to `token`. Releasing a token
    /// that has no live stream is a no-op.
    pub fn release(&self, token: SurfaceToken) {
        let mut live = self.live.lock().unwrap_or_else(PoisonError::into_inner);
        if live.as_ref().map(StreamHandle::token) != Some(token) {
            return;
        }
        if let Some(mut handle) = live.take() {
            handle.release();
            let _ = self
                .logger
                .info(&format!("Released stream for surface {}", token));
        }
    }

    pub fn release_all(&self) {
        if let Some(mut handle) = self
            .live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.release();
        }
    }

    pub fn stream(&self, token: SurfaceToken) -> Option<Arc<dyn MediaStream + Send + Sync>> {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|handle| handle.token() == token)
            .and_then(StreamHandle::stream)
    }

    pub fn live_token(&self) -> Option<SurfaceToken> {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|handle| !handle.is_released())
            .map(StreamHandle::token)
    }
}
