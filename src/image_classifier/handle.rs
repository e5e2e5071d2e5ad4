use crate::image_classifier::interface::ImageClassifier;
use std::sync::{Arc, OnceLock};

/// Shared slot for the loaded model. Filled once; read-only afterward.
#[derive(Clone, Default)]
pub struct ModelHandle {
    inner: Arc<OnceLock<Arc<dyn ImageClassifier + Send + Sync>>>,
}

impl ModelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if a model was already installed.
    pub fn install(&self, classifier: Arc<dyn ImageClassifier + Send + Sync>) -> bool {
        self.inner.set(classifier).is_ok()
    }

    pub fn get(&self) -> Option<Arc<dyn ImageClassifier + Send + Sync>> {
        self.inner.get().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_classifier::impl_fake::ImageClassifierFake;
    use crate::library::logger::impl_console::LoggerConsole;
    use chrono::{Offset, Utc};

    #[test]
    fn test_installs_once() {
        let logger = Arc::new(LoggerConsole::new(Utc.fix()));
        let handle = ModelHandle::new();
        assert!(handle.get().is_none());

        assert!(handle.install(Arc::new(ImageClassifierFake::new(logger.clone()))));
        assert!(!handle.install(Arc::new(ImageClassifierFake::new(logger))));
        assert!(handle.clone().get().is_some());
    }
}
