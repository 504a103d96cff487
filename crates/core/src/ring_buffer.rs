use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RingBufferError {
    #[error("ring buffer capacity must be greater than 0")]
    InvalidCapacity,
    #[error("ring buffer is full")]
    CapacityExceeded,
    #[error("ring buffer is empty")]
    EmptyBuffer,
}

/// Fixed-capacity FIFO ring buffer.
///
/// The backing storage never reallocates after construction; enqueue and
/// dequeue advance cursors modulo the capacity. The buffer never evicts on
/// its own: enqueueing into a full buffer is an error, and it is the
/// caller's job to dequeue first.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    slots: Vec<Option<T>>,
    write_pos: usize,
    read_pos: usize,
    count: usize,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Result<Self, RingBufferError> {
        if capacity == 0 {
            return Err(RingBufferError::InvalidCapacity);
        }
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Ok(Self {
            slots,
            write_pos: 0,
            read_pos: 0,
            count: 0,
        })
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.count == self.slots.len()
    }

    pub fn enqueue(&mut self, item: T) -> Result<(), RingBufferError> {
        if self.is_full() {
            return Err(RingBufferError::CapacityExceeded);
        }
        self.slots[self.write_pos] = Some(item);
        self.write_pos = (self.write_pos + 1) % self.slots.len();
        self.count += 1;
        Ok(())
    }

    pub fn dequeue(&mut self) -> Result<T, RingBufferError> {
        // take() clears the slot so the buffer drops its reference early.
        let item = self.slots[self.read_pos]
            .take()
            .ok_or(RingBufferError::EmptyBuffer)?;
        self.read_pos = (self.read_pos + 1) % self.slots.len();
        self.count -= 1;
        Ok(item)
    }

    pub fn peek(&self) -> Result<&T, RingBufferError> {
        self.slots[self.read_pos]
            .as_ref()
            .ok_or(RingBufferError::EmptyBuffer)
    }

    /// Empties the buffer and resets both cursors. Idempotent.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.write_pos = 0;
        self.read_pos = 0;
        self.count = 0;
    }
}
