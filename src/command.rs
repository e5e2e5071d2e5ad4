use crate::annotation::{AiAccuracy, AnnotationField};
use crate::coordinator::core::Event;
use crate::image_source::interface::ImageFile;
use crate::library::logger::interface::Logger;
use crate::video_upload::interface::VideoFile;
use std::io::BufRead;
use std::sync::mpsc::Sender;
use std::sync::Arc;

pub const HELP: &str = "commands: start | stop | play | image <path> | analyze | annotate | \
object <text> | accuracy <correct|incorrect|partial> | submit | video <path> | upload";

/// Maps one line of operator input to a user intent.
pub fn parse_command(line: &str) -> Result<Event, String> {
    let line = line.trim();
    let (command, argument) = match line.split_once(char::is_whitespace) {
        Some((command, argument)) => (command, argument.trim()),
        None => (line, ""),
    };

    match (command.to_ascii_lowercase().as_str(), argument) {
        ("start", "") => Ok(Event::StartWebcam),
        ("stop", "") => Ok(Event::StopWebcam),
        ("play", "") => Ok(Event::ForceStartVideo),
        ("analyze", "") => Ok(Event::AnalyzeRequested),
        ("annotate", "") => Ok(Event::OpenAnnotationForm),
        ("submit", "") => Ok(Event::SubmitAnnotation),
        ("upload", "") => Ok(Event::UploadVideo),
        ("image", "") | ("video", "") => Err(format!("{} needs a file path", command)),
        ("image", path) => Ok(Event::LoadImage(ImageFile::new(path))),
        ("video", path) => Ok(Event::SelectVideo(VideoFile::new(path))),
        ("object", text) => Ok(Event::UpdateAnnotationField(AnnotationField::ObjectInHand(
            text.to_string(),
        ))),
        ("accuracy", value) => value
            .parse::<AiAccuracy>()
            .map(|accuracy| Event::UpdateAnnotationField(AnnotationField::AiAccuracy(accuracy))),
        _ => Err(format!("unknown command {:?}", line)),
    }
}

/// Reads commands from stdin until it closes or the event loop goes away.
pub fn spawn_stdin_reader(event_sender: Sender<Event>, logger: Arc<dyn Logger + Send + Sync>) {
    let logger = logger.with_namespace("stdin");

    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    let _ = logger.error(&format!("Failed to read stdin: {}", e));
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            match parse_command(&line) {
                Ok(event) => {
                    if event_sender.send(event).is_err() {
                        break;
                    }
                }
                Err(message) => {
                    let _ = logger.warn(&format!("{} ({})", message, HELP));
                }
            }
        }
    });
}
