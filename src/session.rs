// Everything the window talks to: recording state, cursor locks, the capture engine and
// the recorded frames. Keys map onto the methods here one-to-one.

use std::time::{Duration, Instant};

use log::trace;

use crate::config::Settings;
use crate::cursor::CursorLock;
use crate::engine::{CaptureEngine, PREVIEW_ZOOM};
use crate::error::Result;
use crate::export::{ExportSummary, export_frames};
use crate::frames::FrameStore;
use crate::recording::{RecordingState, Toggle};
use crate::sampler::ScreenSampler;
use crate::types::{FrameBuffer, Point};

/// Everything the window needs to draw one tick.
pub struct TickView {
    pub preview: Option<FrameBuffer>,
    /// (index, magnified frame) of the recorded frame shown this tick.
    pub scrub: Option<(usize, FrameBuffer)>,
    pub frame_count: usize,
}

pub struct Session {
    engine: CaptureEngine,
    recording: RecordingState,
    lock: CursorLock,
    store: FrameStore,
}

impl Session {
    pub fn new() -> Self {
        Self {
            engine: CaptureEngine::new(),
            recording: RecordingState::new(),
            lock: CursorLock::default(),
            store: FrameStore::new(),
        }
    }

    /// One capture tick. `settings` is the snapshot taken for this tick.
    pub fn tick(
        &mut self,
        now: Instant,
        settings: &Settings,
        raw_cursor: Point,
        sampler: &mut dyn ScreenSampler,
    ) -> TickView {
        self.recording.poll(now);
        let cursor = self.lock.effective(raw_cursor, settings.snap_step());
        let outcome = self.engine.tick(
            settings,
            cursor,
            sampler,
            self.recording.is_effectively_recording(),
            &mut self.store,
        );
        if outcome.committed {
            trace!("committed frame {}", self.store.len() - 1);
        }
        let scrub = self
            .store
            .next_scrub()
            .map(|(idx, frame)| (idx, frame.magnify(PREVIEW_ZOOM)));

        TickView { preview: outcome.preview, scrub, frame_count: self.store.len() }
    }

    /// Start (after the delay) or stop recording. Starting throws away the last take.
    pub fn toggle_record(&mut self, now: Instant, settings: &Settings) {
        let delay = Duration::from_secs_f64(settings.record_delay_secs);
        match self.recording.toggle(now, delay) {
            Toggle::Armed => self.store.clear(),
            Toggle::Stopped => self.store.reset_range(),
        }
    }

    pub fn set_record_key(&mut self, held: bool) {
        self.recording.set_key_held(held);
    }

    pub fn clear_frames(&mut self) {
        self.store.clear();
    }

    pub fn toggle_snap(&mut self) {
        self.lock.toggle_snap();
    }

    pub fn toggle_lock_x(&mut self, raw_cursor: Point) {
        self.lock.toggle_lock_x(raw_cursor);
    }

    pub fn toggle_lock_y(&mut self, raw_cursor: Point) {
        self.lock.toggle_lock_y(raw_cursor);
    }

    pub fn mark_loop_start(&mut self) {
        self.store.mark_first();
    }

    pub fn mark_loop_end(&mut self) {
        self.store.mark_last();
    }

    pub fn reset_loop(&mut self) {
        self.store.reset_range();
    }

    /// Write every recorded frame to the configured export directory.
    pub fn export(&self, settings: &Settings, confirm: impl FnOnce() -> bool) -> Result<ExportSummary> {
        export_frames(
            self.store.frames(),
            &settings.export_path,
            settings.confirm_overwrite,
            confirm,
        )
    }

    pub fn status(&self) -> &'static str {
        self.recording.status()
    }

    pub fn lock(&self) -> &CursorLock {
        &self.lock
    }

    /// Samples currently waiting in the look-ahead buffer.
    pub fn buffered(&self) -> usize {
        self.engine.buffered()
    }

    pub fn store(&self) -> &FrameStore {
        &self.store
    }
}
