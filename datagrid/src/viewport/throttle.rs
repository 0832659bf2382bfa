use std::time::{Duration, Instant};

/// Rate limit for scroll-driven range recomputation.
///
/// A signal arriving within `interval` of the last admitted one is
/// suppressed and leaves a pending flag. The host flushes pending work once
/// scrolling settles. A zero interval admits every signal.
#[derive(Debug, Clone)]
pub struct ScrollThrottle {
    interval: Duration,
    last: Option<Instant>,
    pending: bool,
}

impl ScrollThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
            pending: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a signal at `now` should recompute immediately.
    pub fn admit(&mut self, now: Instant) -> bool {
        let due = self.interval.is_zero()
            || self
                .last
                .is_none_or(|last| now.saturating_duration_since(last) >= self.interval);
        if due {
            self.last = Some(now);
            self.pending = false;
        } else {
            self.pending = true;
        }
        due
    }

    /// Whether a suppressed signal is waiting.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Clear and return the pending flag.
    pub fn take_pending(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}
