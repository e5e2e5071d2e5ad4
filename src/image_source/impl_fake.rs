use crate::capture_surface::Frame;
use crate::error::ImageLoadError;
use crate::image_source::interface::{ImageDecoder, ImageFile};
use crate::library::logger::interface::Logger;
use image::DynamicImage;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

pub const FAKE_IMAGE_WIDTH: u32 = 64;
pub const FAKE_IMAGE_HEIGHT: u32 = 48;

pub struct ImageDecoderFake {
    logger: Arc<dyn Logger + Send + Sync>,
    delay: Duration,
    delays: Mutex<HashMap<PathBuf, Duration>>,
    broken: Mutex<Vec<PathBuf>>,
}

impl ImageDecoderFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("image_decoder").with_namespace("fake"),
            delay: Duration::from_millis(5),
            delays: Mutex::new(HashMap::new()),
            broken: Mutex::new(vec![]),
        }
    }

    pub fn set_delay(&self, file: &ImageFile, delay: Duration) {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(file.path.clone(), delay);
    }

    pub fn set_broken(&self, file: &ImageFile) {
        self.broken
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(file.path.clone());
    }
}

impl ImageDecoder for ImageDecoderFake {
    fn decode(&self, file: &ImageFile) -> Result<Frame, ImageLoadError> {
        let _ = self.logger.info(&format!("Decoding {}...", file.name()));
        let delay = self
            .delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&file.path)
            .copied()
            .unwrap_or(self.delay);
        std::thread::sleep(delay);

        if self
            .broken
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&file.path)
        {
            return Err(ImageLoadError::Decode(format!(
                "{} is not a supported image",
                file.name()
            )));
        }

        Ok(DynamicImage::new_rgb8(FAKE_IMAGE_WIDTH, FAKE_IMAGE_HEIGHT))
    }
}
