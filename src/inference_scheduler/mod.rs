pub mod scheduler;

use crate::capture_surface::SurfaceToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationKind {
    Recurring,
    OneShot,
}

/// The recurring loop, as the coordinator sees it. The timer itself lives in
/// the effect runner; ticks that do not match `Recurring { token }` are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    #[default]
    Stopped,
    Recurring {
        token: SurfaceToken,
    },
}

impl SchedulerState {
    pub fn accepts(&self, token: SurfaceToken) -> bool {
        *self == SchedulerState::Recurring { token }
    }
}

/// One-shot classification for a single image.
///
/// `requested` doubles as the suppression flag of the manual analyze
/// affordance; `issued` records that the classification actually went out
/// (it waits for the image to decode and the model to load).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OneShotGate {
    requested: bool,
    issued: bool,
}

impl OneShotGate {
    pub fn requested() -> Self {
        Self {
            requested: true,
            issued: false,
        }
    }

    /// Returns `true` exactly once, when requested and `can_run`.
    pub fn take_issue(&mut self, can_run: bool) -> bool {
        if self.requested && !self.issued && can_run {
            self.issued = true;
            true
        } else {
            false
        }
    }

    pub fn is_suppressed(&self) -> bool {
        self.requested
    }
}
