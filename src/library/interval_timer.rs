use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

const STOPPED: u64 = 0;

/// A repeating timer backed by a sleeping thread.
///
/// Every `start` bumps an epoch; a timer thread keeps ticking only while the
/// active epoch is its own, so `stop` (or a restart) takes effect before the
/// next tick without joining the thread. A tick that already passed the epoch
/// check may still be delivered once, which is why callers tag ticks with a
/// token and drop stale ones.
#[derive(Clone, Debug, Default)]
pub struct IntervalTimer {
    active: Arc<AtomicU64>,
    epoch: Arc<AtomicU64>,
}

impl IntervalTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// `on_tick` returning `false` ends the timer thread.
    pub fn start<F>(&self, interval: Duration, on_tick: F)
    where
        F: Fn() -> bool + Send + 'static,
    {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.active.store(epoch, Ordering::SeqCst);

        let active = Arc::clone(&self.active);
        std::thread::spawn(move || loop {
            std::thread::sleep(interval);
            if active.load(Ordering::SeqCst) != epoch {
                break;
            }
            if !on_tick() {
                break;
            }
        });
    }

    pub fn stop(&self) {
        self.active.store(STOPPED, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::SeqCst) != STOPPED
    }
}
