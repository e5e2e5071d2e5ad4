use std::fmt;

/// The one-line, human-readable phase of the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    LoadingModel,
    ModelLoaded,
    ModelLoadFailed(String),
    RequestingCamera,
    CameraDenied,
    CameraUnavailable(String),
    WaitingForVideo,
    AutoplayBlocked,
    PlaybackFailed(String),
    VideoElementNotReady,
    WebcamActive,
    WebcamStopped,
    AnalyzingImage,
    AnalysisComplete,
    AnalysisFailed(String),
    ImageLoadFailed(String),
    ModelUnavailable,
    LiveClassificationFailed(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::LoadingModel => write!(f, "Loading AI model..."),
            Status::ModelLoaded => write!(f, "Model loaded successfully"),
            Status::ModelLoadFailed(reason) => write!(f, "Failed to load AI model: {}", reason),
            Status::RequestingCamera => write!(f, "Requesting camera access..."),
            Status::CameraDenied => write!(f, "Camera access denied"),
            Status::CameraUnavailable(reason) => write!(f, "Camera unavailable: {}", reason),
            Status::WaitingForVideo => write!(f, "Waiting for video..."),
            Status::AutoplayBlocked => write!(f, "Click Start Video to enable camera"),
            Status::PlaybackFailed(reason) => {
                write!(f, "Browser blocked video playback: {}", reason)
            }
            Status::VideoElementNotReady => write!(f, "Video element not ready"),
            Status::WebcamActive => write!(f, "Webcam active – live classification running"),
            Status::WebcamStopped => write!(f, "Webcam stopped"),
            Status::AnalyzingImage => write!(f, "Analyzing image..."),
            Status::AnalysisComplete => write!(f, "Analysis complete"),
            Status::AnalysisFailed(reason) => write!(f, "Analysis failed: {}", reason),
            Status::ImageLoadFailed(reason) => write!(f, "Failed to load image: {}", reason),
            Status::ModelUnavailable => write!(f, "AI model unavailable"),
            Status::LiveClassificationFailed(reason) => {
                write!(f, "Live classification failed: {}", reason)
            }
        }
    }
}
