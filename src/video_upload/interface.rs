use crate::error::VideoUploadError;
use crate::image_source::interface::file_name;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFile {
    pub path: PathBuf,
}

impl VideoFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn name(&self) -> String {
        file_name(&self.path)
    }
}

/// Identifies one upload attempt. Issued in increasing order by the
/// coordinator; progress ticks and results carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UploadId(pub u64);

impl UploadId {
    pub fn next(self) -> Self {
        UploadId(self.0 + 1)
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "upload-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoUploadRequest {
    pub num_frames: u32,
    pub aggregation_method: String,
}

impl Default for VideoUploadRequest {
    fn default() -> Self {
        Self {
            num_frames: 10,
            aggregation_method: "average".to_string(),
        }
    }
}

/// Response body of `POST /predict-video`.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct VideoClassification {
    pub success: bool,
    pub filename: Option<String>,
    pub classification: ClassificationSummary,
    pub video_info: Option<VideoInfo>,
    pub frame_analysis: Option<FrameAnalysis>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct ClassificationSummary {
    pub aggregation_method: String,
    pub primary_prediction: Option<AggregatedPrediction>,
    pub alternative_predictions: Vec<AggregatedPrediction>,
    pub confidence_breakdown: Option<ConfidenceBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct AggregatedPrediction {
    pub class_name: String,
    pub confidence_percent: f32,
    pub frames_detected: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct ConfidenceBreakdown {
    pub very_high: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct VideoInfo {
    pub total_frames: u64,
    pub fps: f32,
    pub duration_seconds: f32,
    pub frames_analyzed: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct FrameAnalysis {
    pub frame_predictions: Vec<FrameDetail>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct FrameDetail {
    pub timestamp: f32,
    pub top_prediction: Option<FramePrediction>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct FramePrediction {
    pub class_name: String,
    pub confidence_percent: f32,
}

pub trait VideoClassifier {
    fn classify(
        &self,
        file: &VideoFile,
        request: &VideoUploadRequest,
    ) -> Result<VideoClassification, VideoUploadError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_backend_response() {
        let body = r#"{
            "success": true,
            "filename": "clip.mp4",
            "video_info": {"total_frames": 300, "fps": 30.0, "duration_seconds": 10.0, "frames_analyzed": 10},
            "classification": {
                "aggregation_method": "average",
                "primary_prediction": {
                    "class_id": "n02085620", "class_name": "Chihuahua",
                    "aggregated_probability": 0.71, "confidence_percent": 71.0,
                    "frames_detected": 8, "max_single_frame_prob": 93.2
                },
                "alternative_predictions": [
                    {"class_id": "n02123045", "class_name": "tabby", "aggregated_probability": 0.1,
                     "confidence_percent": 10.0, "frames_detected": 2, "max_single_frame_prob": 12.5}
                ],
                "confidence_breakdown": {"very_high": 0, "high": 1, "medium": 0, "low": 1}
            },
            "frame_analysis": {
                "summary": "Analyzed 10 frames from video",
                "frame_predictions": [
                    {"frame_index": 1, "timestamp": 0.0,
                     "top_prediction": {"rank": 1, "class_id": "n02085620", "class_name": "Chihuahua",
                                        "probability": 0.9, "confidence_percent": 90.0}}
                ]
            }
        }"#;

        let parsed: VideoClassification = serde_json::from_str(body).unwrap();

        assert!(parsed.success);
        let primary = parsed.classification.primary_prediction.unwrap();
        assert_eq!(primary.class_name, "Chihuahua");
        assert_eq!(primary.frames_detected, 8);
        assert_eq!(parsed.classification.alternative_predictions.len(), 1);
        assert_eq!(
            parsed.classification.confidence_breakdown,
            Some(ConfidenceBreakdown {
                very_high: 0,
                high: 1,
                medium: 0,
                low: 1
            })
        );
        assert_eq!(parsed.video_info.unwrap().frames_analyzed, 10);
        let frames = parsed.frame_analysis.unwrap().frame_predictions;
        assert_eq!(frames.len(), 1);
        assert_eq!(
            frames[0].top_prediction,
            Some(FramePrediction {
                class_name: "Chihuahua".to_string(),
                confidence_percent: 90.0
            })
        );
    }

    #[test]
    fn test_tolerates_missing_sections() {
        let parsed: VideoClassification = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert!(!parsed.success);
        assert_eq!(parsed.classification.primary_prediction, None);
    }
}
