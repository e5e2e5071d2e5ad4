use crate::capture_surface::Frame;
use crate::error::{CameraError, CaptureError, PlaybackError};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    #[default]
    User,
    Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VideoConstraints {
    pub facing_mode: FacingMode,
}

/// Request shape for camera access: `{ video: { facing_mode } }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MediaConstraints {
    pub video: VideoConstraints,
}

/// How much media data a stream has buffered, ordered from nothing to enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ReadyState {
    #[default]
    HaveNothing = 0,
    HaveMetadata = 1,
    HaveCurrentData = 2,
    HaveEnoughData = 4,
}

pub trait MediaStream {
    fn id(&self) -> String;

    /// Blocks until the stream's metadata (dimensions, format) is known.
    fn wait_for_metadata(&self) -> Result<(), PlaybackError>;

    /// Starts playback. Fails with `PlaybackError::Blocked` when the platform
    /// refuses to autoplay.
    fn play(&self) -> Result<(), PlaybackError>;

    fn ready_state(&self) -> ReadyState;

    fn capture_frame(&self) -> Result<Frame, CaptureError>;

    /// Stops every track. Calling it on a stopped stream does nothing.
    fn stop_tracks(&self);

    fn is_live(&self) -> bool;
}

pub trait MediaDevices {
    fn get_user_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<Arc<dyn MediaStream + Send + Sync>, CameraError>;
}
