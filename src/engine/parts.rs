use crate::event_model::PartFrame;
use crate::ring::{RingBuffer, RingBufferError};

/// Window of recent part frames exported to the external set checker.
///
/// No filtering or deduplication happens here; weighting frames is the caller's policy.
#[derive(Debug, Clone)]
pub struct PartAggregator {
    frames: RingBuffer<PartFrame>,
}

impl PartAggregator {
    pub fn new(capacity: usize) -> Result<Self, RingBufferError> {
        Ok(Self {
            frames: RingBuffer::new(capacity)?,
        })
    }

    /// Stores a frame, returning the evicted oldest frame when the window was full.
    pub fn record(&mut self, frame: PartFrame) -> Option<PartFrame> {
        self.frames.push(frame)
    }

    /// Frames oldest to newest.
    pub fn frames(&self) -> impl ExactSizeIterator<Item = &PartFrame> + '_ {
        self.frames.iter()
    }

    /// Owned copy of the window, oldest first.
    pub fn recent_frames(&self) -> Vec<PartFrame> {
        self.frames.to_ordered_vec()
    }

    pub fn latest(&self) -> Option<&PartFrame> {
        self.frames.newest()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.frames.capacity()
    }
}

/// Caller-side policy that only forwards frames at least as large as the best accepted one.
///
/// The checker reports back how many parts a successful check covered through
/// [`FrameSelector::record_success`]; smaller frames are skipped afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameSelector {
    best_size: usize,
}

impl FrameSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn best_size(&self) -> usize {
        self.best_size
    }

    /// Frames from `aggregator` meeting the current size floor, oldest first.
    pub fn select<'a>(&self, aggregator: &'a PartAggregator) -> Vec<&'a PartFrame> {
        aggregator
            .frames()
            .filter(|frame| frame.len() >= self.best_size)
            .collect()
    }

    /// Raises the floor to `size` when it beats the previous best.
    pub fn record_success(&mut self, size: usize) {
        self.best_size = self.best_size.max(size);
    }

    pub fn reset(&mut self) {
        self.best_size = 0;
    }
}
