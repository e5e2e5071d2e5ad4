use crate::capture_surface::{Frame, SurfaceToken};
use crate::error::CaptureError;
use crate::library::logger::interface::Logger;
use crate::media_stream::interface::{MediaStream, ReadyState};
use std::sync::Arc;

pub enum Binding {
    Unbound,
    Video {
        token: SurfaceToken,
        stream: Arc<dyn MediaStream + Send + Sync>,
    },
    Image {
        token: SurfaceToken,
        frame: Arc<Frame>,
    },
}

/// The sampleable element a stream or a decoded image is attached to.
///
/// Image decoding finishes on another thread, so an image binding is only
/// accepted for the token that was last announced with `expect_image`. A
/// late decode of a superseded image is rejected.
pub struct CaptureSurface {
    binding: Binding,
    expected_image: Option<SurfaceToken>,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl CaptureSurface {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            binding: Binding::Unbound,
            expected_image: None,
            logger: logger.with_namespace("capture_surface"),
        }
    }

    pub fn bind_stream(&mut self, token: SurfaceToken, stream: Arc<dyn MediaStream + Send + Sync>) {
        let _ = self
            .logger
            .info(&format!("Binding stream {} to surface {}", stream.id(), token));
        self.expected_image = None;
        self.binding = Binding::Video { token, stream };
    }

    pub fn expect_image(&mut self, token: SurfaceToken) {
        self.expected_image = Some(token);
    }

    /// Returns `false` when the image was superseded before it finished
    /// decoding.
    pub fn bind_image(&mut self, token: SurfaceToken, frame: Frame) -> bool {
        if self.expected_image != Some(token) {
            let _ = self
                .logger
                .warn(&format!("Ignoring stale image for surface {}", token));
            return false;
        }
        self.expected_image = None;
        self.binding = Binding::Image {
            token,
            frame: Arc::new(frame),
        };
        true
    }

    pub fn unbind(&mut self) {
        self.expected_image = None;
        self.binding = Binding::Unbound;
    }

    pub fn unbind_token(&mut self, token: SurfaceToken) {
        if self.bound_token() == Some(token) {
            self.binding = Binding::Unbound;
        }
    }

    pub fn bound_token(&self) -> Option<SurfaceToken> {
        match &self.binding {
            Binding::Unbound => None,
            Binding::Video { token, .. } | Binding::Image { token, .. } => Some(*token),
        }
    }

    /// Takes a frame for classification. `Ok(None)` means the stream has not
    /// buffered enough data yet and the caller should skip this round.
    pub fn sample(
        &self,
        token: SurfaceToken,
        min_ready_state: ReadyState,
    ) -> Result<Option<Arc<Frame>>, CaptureError> {
        match &self.binding {
            Binding::Image { token: bound, frame } if *bound == token => {
                Ok(Some(Arc::clone(frame)))
            }
            Binding::Video { token: bound, stream } if *bound == token => {
                if stream.ready_state() < min_ready_state {
                    return Ok(None);
                }
                stream.capture_frame().map(|frame| Some(Arc::new(frame)))
            }
            _ => Err(CaptureError::NotBound),
        }
    }
}
