use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelLoadError {
    #[error("unsupported model version {0}")]
    UnsupportedVersion(u32),
    #[error("unsupported width multiplier {0}")]
    UnsupportedAlpha(f32),
    #[error("{0}")]
    Backend(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("a camera stream is already live")]
    AlreadyLive,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("{0}")]
    Blocked(String),
    #[error("stream has ended")]
    Ended,
    #[error("no stream bound for this surface")]
    NotBound,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("surface is not bound to this resource")]
    NotBound,
    #[error("stream has ended")]
    Ended,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    #[error("model is not loaded")]
    ModelNotLoaded,
    #[error("{0}")]
    Capture(#[from] CaptureError),
    #[error("{0}")]
    Backend(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageLoadError {
    #[error("failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },
    #[error("failed to decode image: {0}")]
    Decode(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VideoUploadError {
    #[error("Please select a video file first")]
    NoFileSelected,
    #[error("failed to read video file: {0}")]
    Read(String),
    #[error("{detail}")]
    Server { status: u16, detail: String },
    #[error("Failed to upload video: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotationError {
    #[error("annotation form is not open")]
    NotCollecting,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
