// Bounded FIFO of recent samples.
// The head is the oldest sample and the one a commit crops from; the delta between its
// cursor and the current cursor tells us where the target went meanwhile.

use std::collections::VecDeque;

use crate::types::{FrameBuffer, Point};

/// One tick's downscaled capture plus where the cursor was when it was taken.
#[derive(Clone, Debug)]
pub struct Sample {
    pub image: FrameBuffer,
    pub cursor: Point,
    /// False when the screen gave back less than we asked for (cursor near an edge).
    pub complete: bool,
}

pub struct LookaheadBuffer {
    samples: VecDeque<Sample>,
}

impl LookaheadBuffer {
    pub fn new() -> Self {
        Self { samples: VecDeque::with_capacity(crate::config::MAX_LOOKAHEAD + 1) }
    }

    /// Append at the tail, then drop from the head until `len <= capacity`.
    /// A shrunk capacity is honoured here, never in between appends.
    pub fn push(&mut self, sample: Sample, capacity: usize) {
        self.samples.push_back(sample);
        let capacity = capacity.max(1);
        while self.samples.len() > capacity {
            self.samples.pop_front();
        }
    }

    /// Oldest sample, if the buffer holds at least `capacity` of them.
    pub fn ready_head(&self, capacity: usize) -> Option<&Sample> {
        if self.samples.len() >= capacity.max(1) {
            self.samples.front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }
}
