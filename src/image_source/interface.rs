use crate::capture_surface::Frame;
use crate::error::ImageLoadError;
use std::path::{Path, PathBuf};

/// A user-selected image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub path: PathBuf,
}

impl ImageFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn name(&self) -> String {
        file_name(&self.path)
    }
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub trait ImageDecoder {
    fn decode(&self, file: &ImageFile) -> Result<Frame, ImageLoadError>;
}
