use crate::annotation::AnnotationWorkflow;
use crate::coordinator::core::{Mode, ModelStatus, State, VideoUpload};
use crate::device_display::interface::DeviceDisplay;
use crate::video_upload::interface::VideoClassification;
use std::error::Error;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Clone)]
pub struct Render {
    device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
}

impl Render {
    pub fn new(device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>) -> Self {
        Self { device_display }
    }

    pub fn init(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.device_display
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .init()
    }

    pub fn render(&self, state: &State) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut device_display = self
            .device_display
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        device_display.clear()?;
        let num_lines = device_display.num_lines();
        for (index, line) in lines(state).iter().take(num_lines).enumerate() {
            device_display.write_line(index, line)?;
        }
        device_display.present()
    }
}

/// The screen for `state`, top to bottom.
pub fn lines(state: &State) -> Vec<String> {
    let mut lines = vec![format!("Status: {}", state.status)];

    let model = match &state.model {
        ModelStatus::Loading => "loading",
        ModelStatus::Loaded => "ready",
        ModelStatus::Failed(_) => "unavailable",
    };
    let mode = match &state.mode {
        Mode::Idle => "idle".to_string(),
        Mode::WebcamActive { readiness, .. } if readiness.is_ready() => "webcam (live)".to_string(),
        Mode::WebcamActive { .. } => "webcam (starting)".to_string(),
        Mode::ImageLoaded { file, .. } => format!("image {}", file.name()),
    };
    lines.push(format!("Mode: {} | Model: {}", mode, model));

    for (rank, prediction) in state.predictions.iter().enumerate() {
        lines.push(format!(
            "{}. {} {:.1}%",
            rank + 1,
            prediction.class_name,
            prediction.percent()
        ));
    }

    if state.analyze_affordance_visible() {
        lines.push("[a] Analyze".to_string());
    }

    match &state.annotation {
        AnnotationWorkflow::Hidden => {}
        AnnotationWorkflow::Collecting(form) => {
            lines.push(format!(
                "Annotating: object in hand \"{}\", AI accuracy {}",
                form.object_in_hand,
                display_or_dash(form.ai_accuracy.as_str())
            ));
        }
        AnnotationWorkflow::Saved(saved) => {
            lines.push(format!(
                "Manual: \"{}\" | Accuracy: {}",
                saved.annotation.object_in_hand,
                display_or_dash(saved.annotation.ai_accuracy.as_str())
            ));
            if saved.ai_predictions.is_empty() {
                lines.push("AI: -".to_string());
            }
            for (rank, prediction) in saved.ai_predictions.iter().enumerate() {
                lines.push(format!(
                    "AI {}. {} {:.1}%",
                    rank + 1,
                    prediction.class_name,
                    prediction.percent()
                ));
            }
            if let Some(truth) = saved.discrepancy() {
                lines.push(format!("Discrepancy: user says \"{}\"", truth));
            }
        }
    }

    match &state.video {
        VideoUpload::Empty => {}
        VideoUpload::Selected { file } => lines.push(format!("Video: {} selected", file.name())),
        VideoUpload::Uploading { file, progress, .. } => {
            lines.push(format!("Video: uploading {} {}%", file.name(), progress.percent()))
        }
        VideoUpload::Done {
            file,
            result,
            progress,
        } => {
            lines.push(format!("Video: {} {}%", file.name(), progress.percent()));
            lines.extend(video_result_lines(&file.name(), result));
        }
        VideoUpload::Failed {
            file,
            error,
            progress,
        } => {
            if let Some(file) = file {
                lines.push(format!("Video: {} {}%", file.name(), progress.percent()));
            }
            lines.push(format!("Video error: {}", error));
        }
    }

    lines
}

fn video_result_lines(name: &str, result: &VideoClassification) -> Vec<String> {
    if !result.success {
        return vec![format!("Video: {} -> classification unsuccessful", name)];
    }

    let classification = &result.classification;
    let mut lines = vec![];
    if let Some(primary) = &classification.primary_prediction {
        lines.push(format!(
            "Video: {} -> {} {:.1}% ({} frames, {})",
            name,
            primary.class_name,
            primary.confidence_percent,
            primary.frames_detected,
            classification.aggregation_method
        ));
    } else {
        lines.push(format!("Video: {} -> no prediction", name));
    }
    if let Some(info) = &result.video_info {
        lines.push(format!(
            "  {:.1}s at {:.1} fps, {} frames, {} analyzed",
            info.duration_seconds, info.fps, info.total_frames, info.frames_analyzed
        ));
    }
    for alternative in &classification.alternative_predictions {
        lines.push(format!(
            "  also {} {:.1}%",
            alternative.class_name, alternative.confidence_percent
        ));
    }
    if let Some(analysis) = &result.frame_analysis {
        for frame in &analysis.frame_predictions {
            if let Some(top) = &frame.top_prediction {
                lines.push(format!(
                    "  @{:.1}s {} {:.1}%",
                    frame.timestamp, top.class_name, top.confidence_percent
                ));
            }
        }
    }
    if let Some(breakdown) = &classification.confidence_breakdown {
        lines.push(format!(
            "  confidence: very high {}, high {}, medium {}, low {}",
            breakdown.very_high, breakdown.high, breakdown.medium, breakdown.low
        ));
    }
    lines
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
