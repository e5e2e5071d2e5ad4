use crate::capture_surface::Frame;
use crate::error::ImageLoadError;
use crate::image_source::interface::{ImageDecoder, ImageFile};
use crate::library::logger::interface::Logger;
use std::sync::Arc;

pub struct ImageDecoderFile {
    logger: Arc<dyn Logger + Send + Sync>,
}

impl ImageDecoderFile {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("image_decoder"),
        }
    }
}

impl ImageDecoder for ImageDecoderFile {
    fn decode(&self, file: &ImageFile) -> Result<Frame, ImageLoadError> {
        let _ = self
            .logger
            .info(&format!("Decoding {}...", file.path.display()));

        let frame = image::open(&file.path).map_err(|e| match e {
            image::ImageError::IoError(io) => ImageLoadError::Read {
                path: file.path.clone(),
                message: io.to_string(),
            },
            other => ImageLoadError::Decode(other.to_string()),
        })?;

        let _ = self.logger.info(&format!(
            "Decoded {} ({}x{})",
            file.name(),
            frame.width(),
            frame.height()
        ));
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::logger::impl_console::LoggerConsole;
    use chrono::{Offset, Utc};
    use image::{DynamicImage, ImageFormat};

    fn decoder() -> ImageDecoderFile {
        ImageDecoderFile::new(Arc::new(LoggerConsole::new(Utc.fix())))
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let file = ImageFile::new("/definitely/not/here.png");
        let result = decoder().decode(&file);
        assert!(matches!(result, Err(ImageLoadError::Read { .. })));
    }

    #[test]
    fn test_decodes_png() {
        let path = std::env::temp_dir().join(format!(
            "image-classifier-decode-{}.png",
            std::process::id()
        ));
        DynamicImage::new_rgb8(5, 3)
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let frame = decoder().decode(&ImageFile::new(&path)).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!((frame.width(), frame.height()), (5, 3));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let path = std::env::temp_dir().join(format!(
            "image-classifier-garbage-{}.png",
            std::process::id()
        ));
        std::fs::write(&path, b"not an image").unwrap();

        let result = decoder().decode(&ImageFile::new(&path));
        let _ = std::fs::remove_file(&path);

        assert!(matches!(result, Err(ImageLoadError::Decode(_))));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(ImageFile::new("/tmp/photos/cat.jpeg").name(), "cat.jpeg");
    }
}
