use thiserror::Error;

/// Errors surfaced by [`RingBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RingBufferError {
    #[error("ring buffer capacity must be > 0")]
    InvalidCapacity,
    #[error("index {index} out of range for ring buffer holding {len} items")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Fixed-capacity FIFO window that overwrites its oldest element when full.
///
/// Logical index 0 is the oldest surviving element and `len() - 1` the newest.
/// Unused capacity is never observable: slots are only materialised once pushed.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    slots: Vec<T>,
    capacity: usize,
    oldest: usize,
}

impl<T> RingBuffer<T> {
    /// Creates an empty buffer able to hold `capacity` elements.
    pub fn new(capacity: usize) -> Result<Self, RingBufferError> {
        if capacity == 0 {
            return Err(RingBufferError::InvalidCapacity);
        }
        Ok(Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            oldest: 0,
        })
    }

    /// Appends `item`, returning the evicted oldest element when the buffer was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        if self.slots.len() < self.capacity {
            // `oldest` stays 0 until the first wrap, so the next physical slot is the tail.
            self.slots.push(item);
            return None;
        }
        let evicted = std::mem::replace(&mut self.slots[self.oldest], item);
        self.oldest = (self.oldest + 1) % self.capacity;
        Some(evicted)
    }

    /// Returns the element at logical position `index` (0 = oldest).
    pub fn get(&self, index: usize) -> Result<&T, RingBufferError> {
        let len = self.len();
        if index >= len {
            return Err(RingBufferError::IndexOutOfRange { index, len });
        }
        Ok(&self.slots[self.physical(index)])
    }

    /// Newest element, if any.
    pub fn newest(&self) -> Option<&T> {
        self.len()
            .checked_sub(1)
            .map(|last| &self.slots[self.physical(last)])
    }

    /// Iterates elements oldest to newest.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &T> + '_ {
        (0..self.len()).map(move |index| &self.slots[self.physical(index)])
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() == self.capacity
    }

    /// Capacity fixed at construction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn physical(&self, index: usize) -> usize {
        (self.oldest + index) % self.capacity
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Copies the contents into a `Vec`, oldest first.
    pub fn to_ordered_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}
