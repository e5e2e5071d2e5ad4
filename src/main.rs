use config::{Config, LoggerBackend, CONFIG_FILE_NAME};
use coordinator::main::Coordinator;
use device_display::impl_console::DeviceDisplayConsole;
use image_classifier::impl_fake::{ImageClassifierFake, ModelLoaderFake};
use image_source::impl_file::ImageDecoderFile;
use library::logger::impl_console::LoggerConsole;
use library::logger::impl_tracing::LoggerTracing;
use library::logger::interface::Logger;
use media_stream::impl_fake::MediaDevicesFake;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use video_upload::impl_http::VideoClassifierHttp;

mod annotation;
mod capture_surface;
mod command;
mod config;
mod coordinator;
mod device_display;
mod error;
mod image_classifier;
mod image_source;
mod inference_scheduler;
mod library;
mod media_stream;
mod video_upload;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::load_or_default(Path::new(CONFIG_FILE_NAME))?;

    let logger: Arc<dyn Logger + Send + Sync> = match config.logger_backend {
        LoggerBackend::Console => Arc::new(LoggerConsole::new(config.logger_timezone)),
        LoggerBackend::Tracing => {
            tracing_subscriber::fmt()
                .with_max_level(tracing::Level::INFO)
                .init();
            Arc::new(LoggerTracing::new())
        }
    };

    let image_classifier = Arc::new(
        ImageClassifierFake::new(logger.clone()).with_delay(Duration::from_millis(50)),
    );

    let model_loader = Arc::new(
        ModelLoaderFake::new(logger.clone(), image_classifier)
            .with_delay(Duration::from_millis(800)),
    );

    let media_devices = Arc::new(MediaDevicesFake::new(logger.clone()));

    let image_decoder = Arc::new(ImageDecoderFile::new(logger.clone()));

    let video_classifier = Arc::new(VideoClassifierHttp::new(
        &config.video_upload.api_url,
        logger.clone(),
    )?);

    let device_display = Arc::new(Mutex::new(DeviceDisplayConsole::new()));

    let mut coordinator = Coordinator::new(
        config,
        logger.clone(),
        model_loader,
        media_devices,
        image_decoder,
        video_classifier,
        device_display,
    );

    let _ = logger.info(command::HELP);
    command::spawn_stdin_reader(coordinator.sender(), logger);

    coordinator.run()
}
