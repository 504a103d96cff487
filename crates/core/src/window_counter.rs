use crate::frequency_table::FrequencyTable;
use crate::ring_buffer::{RingBuffer, RingBufferError};

/// Admission policy applied to every raw token before it can enter the
/// window: a minimum length (in `char`s) and optional case folding.
///
/// Tokens below the minimum length are excluded from the window and the
/// counts entirely, not merely hidden from the report. The folded form
/// is the unit of identity for both storage and counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowPolicy {
    pub min_word_length: usize,
    pub ignore_case: bool,
}

impl WindowPolicy {
    #[must_use]
    pub fn new(min_word_length: usize, ignore_case: bool) -> Self {
        Self {
            min_word_length,
            ignore_case,
        }
    }

    /// Returns the token's counting identity, or `None` when the token
    /// fails the length filter.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> Option<String> {
        if raw.chars().count() < self.min_word_length {
            return None;
        }
        if self.ignore_case {
            Some(raw.to_lowercase())
        } else {
            Some(raw.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The token entered the window; `evicted` holds the word that left
    /// to make room, if the window was already full.
    Counted { evicted: Option<String> },
    /// The token failed the length filter and touched neither the
    /// window nor the counts.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// 1-based position of this token in the raw stream. Advances for
    /// skipped tokens too: it tracks stream progress, not window
    /// membership, and it is what periodic reporting keys off.
    pub position: u64,
    pub admission: Admission,
}

/// The streaming core: a window of the most recent W admitted words and
/// the frequency table those words induce, maintained incrementally.
///
/// Invariant: the multiset described by the table always equals the
/// multiset of words stored in the window. Eviction happens strictly
/// before insertion, so the table never transiently counts more words
/// than the window holds.
#[derive(Debug, Clone)]
pub struct SlidingWindowCounter {
    window: RingBuffer<String>,
    table: FrequencyTable,
    policy: WindowPolicy,
    position: u64,
}

impl SlidingWindowCounter {
    pub fn new(window_size: usize, policy: WindowPolicy) -> Result<Self, RingBufferError> {
        Ok(Self {
            window: RingBuffer::new(window_size)?,
            table: FrequencyTable::new(),
            policy,
            position: 0,
        })
    }

    /// Feeds one raw token through the admission policy and into the
    /// window. This is the only mutator.
    pub fn observe(&mut self, raw: &str) -> Observation {
        let normalized = self.policy.normalize(raw);
        self.apply_normalized(normalized)
    }

    /// Pre-filtered entry point for the staged pipeline, whose filter
    /// stage runs [`WindowPolicy::normalize`] ahead of this call.
    /// `observe` and this method are equivalent given the same policy.
    pub fn apply_normalized(&mut self, normalized: Option<String>) -> Observation {
        self.position += 1;
        let Some(word) = normalized else {
            return Observation {
                position: self.position,
                admission: Admission::Skipped,
            };
        };

        let evicted = if self.window.is_full() {
            match self.window.dequeue() {
                Ok(oldest) => {
                    self.table.decrement(&oldest);
                    Some(oldest)
                }
                Err(_) => None,
            }
        } else {
            None
        };

        self.table.increment(&word);
        // Cannot fail: the window either had room or was just drained by one.
        let _ = self.window.enqueue(word);

        Observation {
            position: self.position,
            admission: Admission::Counted { evicted },
        }
    }

    #[must_use]
    pub fn table(&self) -> &FrequencyTable {
        &self.table
    }

    #[must_use]
    pub fn policy(&self) -> WindowPolicy {
        self.policy
    }

    #[must_use]
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    #[must_use]
    pub fn window_size(&self) -> usize {
        self.window.capacity()
    }

    /// How many raw tokens this counter has seen, admitted or not.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }
}
