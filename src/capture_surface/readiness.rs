#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Playback {
    #[default]
    NotStarted,
    Starting {
        forced: bool,
    },
    Blocked,
    Playing,
}

/// Readiness of a video surface for one stream instance.
///
/// Ready requires both loaded metadata and started playback. Once ready it
/// never goes back; a new stream instance gets a fresh value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VideoReadiness {
    metadata_loaded: bool,
    playback: Playback,
}

impl VideoReadiness {
    pub fn is_ready(&self) -> bool {
        self.metadata_loaded && self.playback == Playback::Playing
    }

    #[cfg(test)]
    pub fn playback(&self) -> Playback {
        self.playback
    }

    /// Returns whether playback should be attempted now.
    pub fn on_metadata_loaded(&mut self) -> bool {
        self.metadata_loaded = true;
        if self.playback == Playback::NotStarted {
            self.playback = Playback::Starting { forced: false };
            true
        } else {
            false
        }
    }

    /// Returns whether a manual play attempt should be issued.
    pub fn request_force_start(&mut self) -> bool {
        match self.playback {
            Playback::Playing | Playback::Starting { .. } => false,
            Playback::NotStarted | Playback::Blocked => {
                self.playback = Playback::Starting { forced: true };
                true
            }
        }
    }

    pub fn on_play_started(&mut self) {
        self.playback = Playback::Playing;
    }

    /// Returns whether the failed attempt was a manual one.
    pub fn on_play_failed(&mut self) -> bool {
        if self.playback == Playback::Playing {
            return false;
        }
        let forced = matches!(self.playback, Playback::Starting { forced: true });
        self.playback = Playback::Blocked;
        forced
    }
}
