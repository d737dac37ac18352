// Paces capture ticks at 1000/fps ms without ever running two at once.

use std::time::{Duration, Instant};

/// Fixed-interval tick source. Late ticks push the schedule back instead of bunching up,
/// so there is never more than one tick due at a time.
pub struct Ticker {
    interval: Duration,
    next_due: Instant,
}

impl Ticker {
    pub fn new(fps: u32, now: Instant) -> Self {
        Self { interval: interval_for(fps), next_due: now }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// New rate applies from now on; the next tick is one new interval away.
    pub fn set_fps(&mut self, fps: u32, now: Instant) {
        let interval = interval_for(fps);
        if interval != self.interval {
            self.interval = interval;
            self.next_due = now + interval;
        }
    }

    /// True at most once per interval.
    pub fn due(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due += self.interval;
        if self.next_due <= now {
            self.next_due = now + self.interval;
        }
        true
    }

    /// How long to sleep before the next tick.
    pub fn wait(&self, now: Instant) -> Duration {
        self.next_due.saturating_duration_since(now)
    }
}

fn interval_for(fps: u32) -> Duration {
    Duration::from_millis(1000 / u64::from(fps.max(1)))
}
