use crate::error::VideoUploadError;
use crate::library::logger::interface::Logger;
use crate::video_upload::interface::{
    VideoClassification, VideoClassifier, VideoFile, VideoUploadRequest,
};
use reqwest::blocking::{multipart, Client};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Posts videos to the classification backend at `{api_url}/predict-video`.
pub struct VideoClassifierHttp {
    client: Client,
    api_url: String,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl VideoClassifierHttp {
    pub fn new(
        api_url: &str,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Result<Self, VideoUploadError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| VideoUploadError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            logger: logger.with_namespace("video_upload").with_namespace("http"),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/predict-video", self.api_url)
    }
}

impl VideoClassifier for VideoClassifierHttp {
    fn classify(
        &self,
        file: &VideoFile,
        request: &VideoUploadRequest,
    ) -> Result<VideoClassification, VideoUploadError> {
        let bytes = std::fs::read(&file.path)
            .map_err(|e| VideoUploadError::Read(format!("{}: {}", file.path.display(), e)))?;

        let _ = self.logger.info(&format!(
            "Uploading {} ({} bytes) to {}",
            file.name(),
            bytes.len(),
            self.endpoint()
        ));

        let response = self
            .client
            .post(self.endpoint())
            .header(ACCEPT, "application/json")
            .multipart(upload_form(file.name(), bytes, request))
            .send()
            .map_err(|e| {
                let _ = self.logger.error(&format!("Upload failed: {}", e));
                VideoUploadError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().ok().and_then(|body| error_detail(&body));
            let _ = self
                .logger
                .error(&format!("Backend answered {}: {:?}", status, detail));
            return Err(status_error(status.as_u16(), detail));
        }

        let result: VideoClassification = response
            .json()
            .map_err(|e| VideoUploadError::InvalidResponse(e.to_string()))?;
        let _ = self
            .logger
            .info(&format!("Video {} classified", file.name()));
        Ok(result)
    }
}

/// The video under `file` plus the request options as text fields.
fn upload_form(file_name: String, bytes: Vec<u8>, request: &VideoUploadRequest) -> multipart::Form {
    multipart::Form::new()
        .part("file", multipart::Part::bytes(bytes).file_name(file_name))
        .text("num_frames", request.num_frames.to_string())
        .text("aggregation_method", request.aggregation_method.clone())
}

pub fn error_detail(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|error| error.detail)
}

pub fn status_error(code: u16, detail: Option<String>) -> VideoUploadError {
    VideoUploadError::Server {
        status: code,
        detail: detail.unwrap_or_else(|| format!("HTTP error! status: {}", code)),
    }
}
