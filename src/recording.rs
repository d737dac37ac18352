// When do ticks turn into recorded frames?
// Two independent sources: the explicit toggle (with a start delay so you can get your
// hands off the keyboard) and holding the record-modifier key.

use std::time::{Duration, Instant};

use log::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordingPhase {
    Idle,
    /// Toggled on, waiting for the delay to run out.
    Armed { deadline: Instant },
    Active,
}

#[derive(Debug)]
pub struct RecordingState {
    phase: RecordingPhase,
    key_held: bool,
}

/// What a toggle did, so the caller can start or wrap up a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    Armed,
    Stopped,
}

impl RecordingState {
    pub fn new() -> Self {
        Self { phase: RecordingPhase::Idle, key_held: false }
    }

    #[cfg(test)]
    pub fn phase(&self) -> RecordingPhase {
        self.phase
    }

    /// Idle arms with a fresh deadline; Armed or Active go back to Idle,
    /// dropping whatever deadline was pending.
    pub fn toggle(&mut self, now: Instant, delay: Duration) -> Toggle {
        match self.phase {
            RecordingPhase::Idle => {
                self.phase = RecordingPhase::Armed { deadline: now + delay };
                info!("recording armed, starting in {:.1}s", delay.as_secs_f64());
                Toggle::Armed
            }
            RecordingPhase::Armed { .. } | RecordingPhase::Active => {
                self.phase = RecordingPhase::Idle;
                info!("recording stopped");
                Toggle::Stopped
            }
        }
    }

    /// Fire the one-shot delay if it is due. Called at the start of every tick.
    pub fn poll(&mut self, now: Instant) {
        if let RecordingPhase::Armed { deadline } = self.phase {
            if now >= deadline {
                self.phase = RecordingPhase::Active;
                info!("recording");
            }
        }
    }

    /// Edge-triggered: callers pass key-down and key-up events, not key state.
    pub fn set_key_held(&mut self, held: bool) {
        self.key_held = held;
    }

    pub fn is_effectively_recording(&self) -> bool {
        self.phase == RecordingPhase::Active || self.key_held
    }

    pub fn status(&self) -> &'static str {
        match self.phase {
            RecordingPhase::Idle => "IDLE",
            RecordingPhase::Armed { .. } => "WAITING",
            RecordingPhase::Active => "RECORDING",
        }
    }
}
