use std::collections::HashMap;

/// Word-to-count map where every stored count is at least 1.
///
/// Decrementing to zero removes the entry, so `snapshot` never reports
/// dead words and the map's size is always the number of distinct words
/// currently in the window that feeds it.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    counts: HashMap<String, u64>,
}

impl FrequencyTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, word: &str) {
        if let Some(count) = self.counts.get_mut(word) {
            *count += 1;
        } else {
            self.counts.insert(word.to_string(), 1);
        }
    }

    /// Decrements `word`, removing the entry when it reaches zero.
    ///
    /// Decrementing a word that is not present is a no-op. That case
    /// signals a caller bug (evicting a word that was never counted),
    /// but the stream must keep going, so it is absorbed rather than
    /// surfaced.
    pub fn decrement(&mut self, word: &str) {
        if let Some(count) = self.counts.get_mut(word) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(word);
            }
        }
    }

    #[must_use]
    pub fn count(&self, word: &str) -> u64 {
        self.counts.get(word).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn distinct_words(&self) -> usize {
        self.counts.len()
    }

    /// Sum of all counts, i.e. how many words the feeding window holds.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Current mapping as unordered pairs; the consumer sorts.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(String, u64)> {
        self.counts
            .iter()
            .map(|(word, count)| (word.clone(), *count))
            .collect()
    }
}
