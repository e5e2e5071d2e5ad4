pub mod readiness;
pub mod surface;

use std::fmt;

/// A sampled visual frame, from a live stream or a decoded image.
pub type Frame = image::DynamicImage;

/// Identifies one bound capture resource: a single stream instance or a
/// single loaded image. Issued in increasing order by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SurfaceToken(pub u64);

impl SurfaceToken {
    pub fn next(self) -> Self {
        SurfaceToken(self.0 + 1)
    }
}

impl fmt::Display for SurfaceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
