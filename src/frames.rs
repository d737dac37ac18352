// Recorded frames in the order they were committed, plus the looping scrub preview.

use crate::types::FrameBuffer;

pub struct FrameStore {
    frames: Vec<FrameBuffer>,
    scrub_index: usize,
    shown: Option<usize>,
    first: usize,
    last: Option<usize>, // None = follow the end of the store
}

impl FrameStore {
    pub fn new() -> Self {
        Self { frames: Vec::new(), scrub_index: 0, shown: None, first: 0, last: None }
    }

    pub fn push(&mut self, frame: FrameBuffer) {
        self.frames.push(frame);
    }

    /// Drop every frame and rewind the scrubber.
    pub fn clear(&mut self) {
        self.frames.clear();
        self.scrub_index = 0;
        self.shown = None;
        self.reset_range();
    }

    pub fn frames(&self) -> &[FrameBuffer] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[cfg(test)]
    pub fn scrub_index(&self) -> usize {
        self.scrub_index
    }

    /// Inclusive loop range, clamped to what is stored.
    pub fn range(&self) -> Option<(usize, usize)> {
        let end = self.frames.len().checked_sub(1)?;
        let first = self.first.min(end);
        let last = self.last.unwrap_or(end).clamp(first, end);
        Some((first, last))
    }

    /// Frame to show this tick; advances and wraps inside the loop range.
    pub fn next_scrub(&mut self) -> Option<(usize, &FrameBuffer)> {
        let (first, last) = self.range()?;
        if self.scrub_index < first || self.scrub_index > last {
            self.scrub_index = first;
        }
        let idx = self.scrub_index;
        self.scrub_index += 1;
        self.shown = Some(idx);
        Some((idx, &self.frames[idx]))
    }

    /// Start the loop at the frame currently on screen.
    pub fn mark_first(&mut self) {
        if let Some(idx) = self.shown {
            self.first = idx;
            if self.last.is_some_and(|last| last < idx) {
                self.last = Some(idx);
            }
            self.scrub_index = idx;
        }
    }

    /// End the loop at the frame currently on screen.
    pub fn mark_last(&mut self) {
        if let Some(idx) = self.shown {
            self.last = Some(idx);
            self.first = self.first.min(idx);
        }
    }

    pub fn reset_range(&mut self) {
        self.first = 0;
        self.last = None;
    }
}
