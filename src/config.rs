use crate::error::ConfigError;
use crate::image_classifier::interface::ModelOptions;
use crate::media_stream::interface::{FacingMode, MediaConstraints, ReadyState, VideoConstraints};
use crate::video_upload::interface::VideoUploadRequest;
use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "classifier.toml";
const MAX_TOP_K: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggerBackend {
    #[default]
    Console,
    Tracing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoUploadConfig {
    pub api_url: String,
    pub request: VideoUploadRequest,
    pub progress_interval: Duration,
    pub progress_step: u8,
    pub progress_cap: u8,
}

impl Default for VideoUploadConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            request: VideoUploadRequest::default(),
            progress_interval: Duration::from_secs(1),
            progress_step: 5,
            progress_cap: 90,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub inference_interval: Duration,
    pub top_k: usize,
    pub model_options: ModelOptions,
    pub media_constraints: MediaConstraints,
    pub min_ready_state: ReadyState,
    pub logger_timezone: FixedOffset,
    pub logger_backend: LoggerBackend,
    pub video_upload: VideoUploadConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inference_interval: Duration::from_millis(1500),
            top_k: 5,
            model_options: ModelOptions::default(),
            media_constraints: MediaConstraints::default(),
            min_ready_state: ReadyState::HaveCurrentData,
            logger_timezone: Utc.fix(),
            logger_backend: LoggerBackend::default(),
            video_upload: VideoUploadConfig::default(),
        }
    }
}

/// Overrides read from `classifier.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    inference_interval_ms: Option<u64>,
    top_k: Option<usize>,
    facing_mode: Option<FacingMode>,
    logger_utc_offset_minutes: Option<i32>,
    logger_backend: Option<LoggerBackend>,
    model: Option<ModelOptions>,
    video_upload: Option<VideoUploadFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct VideoUploadFile {
    api_url: Option<String>,
    num_frames: Option<u32>,
    aggregation_method: Option<String>,
    progress_interval_ms: Option<u64>,
}

impl Config {
    /// Defaults overlaid with `path` when it exists.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text)?;
        let mut config = Self::default();

        if let Some(ms) = file.inference_interval_ms {
            config.inference_interval = Duration::from_millis(ms.max(1));
        }
        if let Some(top_k) = file.top_k {
            config.top_k = top_k.clamp(1, MAX_TOP_K);
        }
        if let Some(facing_mode) = file.facing_mode {
            config.media_constraints = MediaConstraints {
                video: VideoConstraints { facing_mode },
            };
        }
        if let Some(offset) = file
            .logger_utc_offset_minutes
            .and_then(|minutes| minutes.checked_mul(60))
            .and_then(FixedOffset::east_opt)
        {
            config.logger_timezone = offset;
        }
        if let Some(backend) = file.logger_backend {
            config.logger_backend = backend;
        }
        if let Some(model) = file.model {
            config.model_options = model;
        }
        if let Some(video) = file.video_upload {
            let upload = &mut config.video_upload;
            if let Some(api_url) = video.api_url {
                upload.api_url = api_url;
            }
            if let Some(num_frames) = video.num_frames {
                upload.request.num_frames = num_frames;
            }
            if let Some(method) = video.aggregation_method {
                upload.request.aggregation_method = method;
            }
            if let Some(ms) = video.progress_interval_ms {
                upload.progress_interval = Duration::from_millis(ms.max(1));
            }
        }

        Ok(config)
    }
}
