use crate::annotation::{AnnotationField, AnnotationWorkflow};
use crate::capture_surface::readiness::VideoReadiness;
use crate::capture_surface::SurfaceToken;
use crate::config::Config;
use crate::coordinator::status::Status;
use crate::error::{
    CameraError, ImageLoadError, InferenceError, ModelLoadError, PlaybackError, VideoUploadError,
};
use crate::image_classifier::interface::{rank, Prediction};
use crate::image_source::interface::ImageFile;
use crate::inference_scheduler::{ClassificationKind, OneShotGate, SchedulerState};
use crate::video_upload::interface::{UploadId, VideoClassification, VideoFile};
use crate::video_upload::progress::UploadProgress;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ModelStatus {
    #[default]
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    Idle,
    Webcam,
    StaticImage,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Mode {
    #[default]
    Idle,
    WebcamActive {
        token: SurfaceToken,
        readiness: VideoReadiness,
    },
    ImageLoaded {
        token: SurfaceToken,
        file: ImageFile,
        decoded: bool,
        one_shot: OneShotGate,
    },
}

impl Mode {
    pub fn token(&self) -> Option<SurfaceToken> {
        match self {
            Mode::Idle => None,
            Mode::WebcamActive { token, .. } | Mode::ImageLoaded { token, .. } => Some(*token),
        }
    }
}

/// A camera request still waiting on the platform. `wanted` turns false when
/// the user moves on before it answers; the stream is then released on
/// arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acquisition {
    pub token: SurfaceToken,
    pub wanted: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum VideoUpload {
    #[default]
    Empty,
    Selected {
        file: VideoFile,
    },
    Uploading {
        file: VideoFile,
        upload_id: UploadId,
        progress: UploadProgress,
    },
    Done {
        file: VideoFile,
        result: VideoClassification,
        progress: UploadProgress,
    },
    Failed {
        file: Option<VideoFile>,
        error: VideoUploadError,
        progress: UploadProgress,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct State {
    pub model: ModelStatus,
    pub mode: Mode,
    pub acquisition: Option<Acquisition>,
    pub scheduler: SchedulerState,
    pub predictions: Vec<Prediction>,
    pub annotation: AnnotationWorkflow,
    pub video: VideoUpload,
    pub status: Status,
    pub last_token: SurfaceToken,
    pub last_upload_id: UploadId,
}

impl State {
    pub fn capture_mode(&self) -> CaptureMode {
        match self.mode {
            Mode::Idle => CaptureMode::Idle,
            Mode::WebcamActive { .. } => CaptureMode::Webcam,
            Mode::ImageLoaded { .. } => CaptureMode::StaticImage,
        }
    }

    pub fn analyze_affordance_visible(&self) -> bool {
        match &self.mode {
            Mode::Idle => false,
            Mode::WebcamActive { .. } => true,
            Mode::ImageLoaded { one_shot, .. } => !one_shot.is_suppressed(),
        }
    }

    pub fn webcam_ready(&self) -> bool {
        matches!(&self.mode, Mode::WebcamActive { readiness, .. } if readiness.is_ready())
    }

    fn next_token(&mut self) -> SurfaceToken {
        self.last_token = self.last_token.next();
        self.last_token
    }

    fn next_upload_id(&mut self) -> UploadId {
        self.last_upload_id = self.last_upload_id.next();
        self.last_upload_id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    StartWebcam,
    StopWebcam,
    ForceStartVideo,
    LoadImage(ImageFile),
    AnalyzeRequested,
    OpenAnnotationForm,
    UpdateAnnotationField(AnnotationField),
    SubmitAnnotation,
    SelectVideo(VideoFile),
    UploadVideo,
    ModelLoadDone(Result<(), ModelLoadError>),
    StreamAcquireDone {
        token: SurfaceToken,
        result: Result<(), CameraError>,
    },
    MetadataLoaded {
        token: SurfaceToken,
        result: Result<(), PlaybackError>,
    },
    PlayDone {
        token: SurfaceToken,
        result: Result<(), PlaybackError>,
    },
    ImageDecodeDone {
        token: SurfaceToken,
        result: Result<(), ImageLoadError>,
    },
    InferenceTick {
        token: SurfaceToken,
    },
    ClassifyDone {
        token: SurfaceToken,
        kind: ClassificationKind,
        result: Result<Vec<Prediction>, InferenceError>,
    },
    UploadProgressTick {
        upload_id: UploadId,
    },
    VideoUploadDone {
        upload_id: UploadId,
        result: Result<VideoClassification, VideoUploadError>,
    },
}

impl Event {
    pub fn to_display_string(&self) -> String {
        match self {
            Event::VideoUploadDone {
                upload_id,
                result: Ok(result),
            } => format!(
                "VideoUploadDone {{ upload_id: {:?}, result: Ok({:?}) }}",
                upload_id, result.filename
            ),
            event => format!("{:?}", event),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadModel,
    AcquireStream {
        token: SurfaceToken,
    },
    BindStream {
        token: SurfaceToken,
    },
    AwaitMetadata {
        token: SurfaceToken,
    },
    PlayVideo {
        token: SurfaceToken,
    },
    ReleaseStream {
        token: SurfaceToken,
    },
    DecodeImage {
        token: SurfaceToken,
        file: ImageFile,
    },
    UnbindSurface,
    StartInference {
        token: SurfaceToken,
    },
    StopInference,
    Classify {
        token: SurfaceToken,
        kind: ClassificationKind,
    },
    UploadVideo {
        upload_id: UploadId,
        file: VideoFile,
    },
    StartUploadProgress {
        upload_id: UploadId,
    },
    StopUploadProgress,
}

pub fn init() -> (State, Vec<Effect>) {
    (
        State {
            status: Status::LoadingModel,
            ..State::default()
        },
        vec![Effect::LoadModel],
    )
}

pub fn transition(config: &Config, state: State, event: Event) -> (State, Vec<Effect>) {
    let mut state = state;
    let mut effects = vec![];

    match event {
        // Model
        Event::ModelLoadDone(Ok(())) => {
            state.model = ModelStatus::Loaded;
            start_pending_classification(&mut state, &mut effects);
            if state.mode == Mode::Idle && state.acquisition.is_none() {
                state.status = Status::ModelLoaded;
            }
        }
        Event::ModelLoadDone(Err(e)) => {
            state.model = ModelStatus::Failed(e.to_string());
            state.status = Status::ModelLoadFailed(e.to_string());
        }

        // Webcam
        Event::StartWebcam => {
            if matches!(state.mode, Mode::WebcamActive { .. }) {
                return (state, effects);
            }
            if let Some(acquisition) = state.acquisition.as_mut() {
                acquisition.wanted = true;
            } else {
                let token = state.next_token();
                state.acquisition = Some(Acquisition {
                    token,
                    wanted: true,
                });
                effects.push(Effect::AcquireStream { token });
            }
            state.status = Status::RequestingCamera;
        }
        Event::StreamAcquireDone { token, result } => {
            let acquisition = match state.acquisition {
                Some(acquisition) if acquisition.token == token => acquisition,
                _ => {
                    if result.is_ok() {
                        effects.push(Effect::ReleaseStream { token });
                    }
                    return (state, effects);
                }
            };
            state.acquisition = None;

            match (acquisition.wanted, result) {
                (true, Ok(())) => {
                    if matches!(state.mode, Mode::ImageLoaded { .. }) {
                        effects.push(Effect::UnbindSurface);
                    }
                    state.mode = Mode::WebcamActive {
                        token,
                        readiness: VideoReadiness::default(),
                    };
                    state.scheduler = SchedulerState::Stopped;
                    state.predictions.clear();
                    state.annotation.reset();
                    state.status = Status::WaitingForVideo;
                    effects.push(Effect::BindStream { token });
                    effects.push(Effect::AwaitMetadata { token });
                }
                (false, Ok(())) => effects.push(Effect::ReleaseStream { token }),
                (true, Err(e)) => {
                    state.status = match e {
                        CameraError::PermissionDenied => Status::CameraDenied,
                        CameraError::DeviceUnavailable(reason) => {
                            Status::CameraUnavailable(reason)
                        }
                        e => Status::CameraUnavailable(e.to_string()),
                    };
                }
                (false, Err(_)) => {}
            }
        }
        Event::MetadataLoaded { token, result } => {
            let Mode::WebcamActive {
                token: current,
                readiness,
            } = &mut state.mode
            else {
                return (state, effects);
            };
            if *current != token {
                return (state, effects);
            }
            match result {
                Ok(()) => {
                    let was_ready = readiness.is_ready();
                    if readiness.on_metadata_loaded() {
                        effects.push(Effect::PlayVideo { token });
                    }
                    if !was_ready && readiness.is_ready() {
                        on_webcam_ready(&mut state, &mut effects, token);
                    }
                }
                Err(e) => state.status = Status::PlaybackFailed(e.to_string()),
            }
        }
        Event::PlayDone { token, result } => {
            let Mode::WebcamActive {
                token: current,
                readiness,
            } = &mut state.mode
            else {
                return (state, effects);
            };
            if *current != token {
                return (state, effects);
            }
            match result {
                Ok(()) => {
                    let was_ready = readiness.is_ready();
                    readiness.on_play_started();
                    if !was_ready && readiness.is_ready() {
                        on_webcam_ready(&mut state, &mut effects, token);
                    }
                }
                Err(e) => {
                    let forced = readiness.on_play_failed();
                    state.status = if forced {
                        Status::PlaybackFailed(e.to_string())
                    } else {
                        Status::AutoplayBlocked
                    };
                }
            }
        }
        Event::ForceStartVideo => match &mut state.mode {
            Mode::WebcamActive { token, readiness } => {
                if readiness.request_force_start() {
                    effects.push(Effect::PlayVideo { token: *token });
                }
            }
            _ => state.status = Status::VideoElementNotReady,
        },
        Event::StopWebcam => {
            if matches!(state.mode, Mode::WebcamActive { .. }) {
                stop_webcam(&mut state, &mut effects);
                state.status = Status::WebcamStopped;
            } else if let Some(acquisition) = state.acquisition.as_mut() {
                acquisition.wanted = false;
                state.status = Status::WebcamStopped;
            }
        }

        // Static image
        Event::LoadImage(file) => {
            match state.mode {
                Mode::WebcamActive { .. } => stop_webcam(&mut state, &mut effects),
                Mode::ImageLoaded { .. } => effects.push(Effect::UnbindSurface),
                Mode::Idle => {}
            }
            if let Some(acquisition) = state.acquisition.as_mut() {
                acquisition.wanted = false;
            }
            let token = state.next_token();
            state.mode = Mode::ImageLoaded {
                token,
                file: file.clone(),
                decoded: false,
                one_shot: OneShotGate::requested(),
            };
            state.predictions.clear();
            state.annotation.reset();
            state.status = Status::AnalyzingImage;
            effects.push(Effect::DecodeImage { token, file });
        }
        Event::ImageDecodeDone { token, result } => {
            let Mode::ImageLoaded {
                token: current,
                decoded,
                one_shot,
                ..
            } = &mut state.mode
            else {
                return (state, effects);
            };
            if *current != token {
                return (state, effects);
            }
            match result {
                Ok(()) => {
                    *decoded = true;
                    match state.model {
                        ModelStatus::Loaded => {
                            if one_shot.take_issue(true) {
                                effects.push(Effect::Classify {
                                    token,
                                    kind: ClassificationKind::OneShot,
                                });
                            }
                        }
                        ModelStatus::Failed(_) => state.status = Status::ModelUnavailable,
                        ModelStatus::Loading => {}
                    }
                }
                Err(e) => {
                    state.mode = Mode::Idle;
                    state.status = Status::ImageLoadFailed(e.to_string());
                    effects.push(Effect::UnbindSurface);
                }
            }
        }

        // Inference
        Event::InferenceTick { token } => {
            if state.scheduler.accepts(token)
                && state.mode.token() == Some(token)
                && state.webcam_ready()
            {
                effects.push(Effect::Classify {
                    token,
                    kind: ClassificationKind::Recurring,
                });
            }
        }
        Event::ClassifyDone {
            token,
            kind,
            result,
        } => {
            let current = match (kind, &state.mode) {
                (ClassificationKind::OneShot, Mode::ImageLoaded { token: t, .. }) => *t == token,
                (ClassificationKind::Recurring, Mode::WebcamActive { token: t, .. }) => {
                    *t == token && state.scheduler.accepts(token)
                }
                _ => false,
            };
            if !current {
                return (state, effects);
            }
            match (kind, result) {
                (ClassificationKind::OneShot, Ok(predictions)) => {
                    state.predictions = rank(predictions, config.top_k);
                    state.status = Status::AnalysisComplete;
                }
                (ClassificationKind::Recurring, Ok(predictions)) => {
                    state.predictions = rank(predictions, config.top_k);
                    state.status = Status::WebcamActive;
                }
                (ClassificationKind::OneShot, Err(e)) => {
                    state.status = Status::AnalysisFailed(e.to_string());
                }
                (ClassificationKind::Recurring, Err(e)) => {
                    state.status = Status::LiveClassificationFailed(e.to_string());
                }
            }
        }

        // Annotation
        Event::AnalyzeRequested => match &state.mode {
            Mode::WebcamActive { .. } => state.annotation.open_form(),
            // Images request their one-shot on load.
            Mode::Idle | Mode::ImageLoaded { .. } => {}
        },
        Event::OpenAnnotationForm => {
            if state.capture_mode() != CaptureMode::Idle || state.video != VideoUpload::Empty {
                state.annotation.open_form();
            }
        }
        Event::UpdateAnnotationField(field) => {
            let _ = state.annotation.update_field(field);
        }
        Event::SubmitAnnotation => {
            let _ = state.annotation.submit(&state.predictions);
        }

        // Video upload
        Event::SelectVideo(file) => {
            if matches!(state.video, VideoUpload::Uploading { .. }) {
                effects.push(Effect::StopUploadProgress);
            }
            state.annotation.reset();
            state.video = VideoUpload::Selected { file };
        }
        Event::UploadVideo => {
            if matches!(state.video, VideoUpload::Uploading { .. }) {
                return (state, effects);
            }
            let file = match &state.video {
                VideoUpload::Selected { file }
                | VideoUpload::Done { file, .. }
                | VideoUpload::Failed {
                    file: Some(file), ..
                } => Some(file.clone()),
                _ => None,
            };
            match file {
                None => {
                    state.video = VideoUpload::Failed {
                        file: None,
                        error: VideoUploadError::NoFileSelected,
                        progress: UploadProgress::default(),
                    };
                }
                Some(file) => {
                    let upload_id = state.next_upload_id();
                    state.video = VideoUpload::Uploading {
                        file: file.clone(),
                        upload_id,
                        progress: UploadProgress::default(),
                    };
                    effects.push(Effect::StartUploadProgress { upload_id });
                    effects.push(Effect::UploadVideo { upload_id, file });
                }
            }
        }
        Event::UploadProgressTick { upload_id } => {
            if let VideoUpload::Uploading {
                upload_id: current,
                progress,
                ..
            } = &mut state.video
            {
                if *current == upload_id {
                    *progress = progress.advance(
                        config.video_upload.progress_step,
                        config.video_upload.progress_cap,
                    );
                }
            }
        }
        Event::VideoUploadDone { upload_id, result } => {
            let file = match &state.video {
                VideoUpload::Uploading {
                    upload_id: current,
                    file,
                    ..
                } if *current == upload_id => file.clone(),
                _ => return (state, effects),
            };
            effects.push(Effect::StopUploadProgress);
            state.video = match result {
                Ok(result) => VideoUpload::Done {
                    file,
                    result,
                    progress: UploadProgress::COMPLETE,
                },
                Err(error) => VideoUpload::Failed {
                    file: Some(file),
                    error,
                    progress: UploadProgress::COMPLETE,
                },
            };
        }
    }

    (state, effects)
}

fn stop_webcam(state: &mut State, effects: &mut Vec<Effect>) {
    if let Mode::WebcamActive { token, .. } = state.mode {
        effects.push(Effect::StopInference);
        effects.push(Effect::ReleaseStream { token });
        effects.push(Effect::UnbindSurface);
        state.scheduler = SchedulerState::Stopped;
        state.mode = Mode::Idle;
        state.predictions.clear();
    }
}

fn on_webcam_ready(state: &mut State, effects: &mut Vec<Effect>, token: SurfaceToken) {
    match state.model {
        ModelStatus::Loaded => {
            state.scheduler = SchedulerState::Recurring { token };
            state.status = Status::WebcamActive;
            effects.push(Effect::StartInference { token });
        }
        ModelStatus::Loading => state.status = Status::WebcamActive,
        ModelStatus::Failed(_) => state.status = Status::ModelUnavailable,
    }
}

/// Work that was waiting on the model: the automatic classification of a
/// decoded image, or the recurring loop of a ready webcam.
fn start_pending_classification(state: &mut State, effects: &mut Vec<Effect>) {
    match &mut state.mode {
        Mode::ImageLoaded {
            token,
            decoded,
            one_shot,
            ..
        } => {
            if one_shot.take_issue(*decoded) {
                effects.push(Effect::Classify {
                    token: *token,
                    kind: ClassificationKind::OneShot,
                });
            }
        }
        Mode::WebcamActive { token, readiness } => {
            if readiness.is_ready() && state.scheduler == SchedulerState::Stopped {
                let token = *token;
                state.scheduler = SchedulerState::Recurring { token };
                state.status = Status::WebcamActive;
                effects.push(Effect::StartInference { token });
            }
        }
        Mode::Idle => {}
    }
}
