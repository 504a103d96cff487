use thiserror::Error;

use crate::frequency_table::FrequencyTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReporterError {
    #[error("top-k must be greater than 0")]
    InvalidTopK,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedWord {
    pub word: String,
    pub count: u64,
}

/// Pure ranking of a frequency table: count descending, ties broken by
/// word ascending so equal counts order deterministically, truncated to
/// the top K entries. Rendering is the sink's job.
#[derive(Debug, Clone, Copy)]
pub struct TopKReporter {
    top_k: usize,
}

impl TopKReporter {
    pub fn new(top_k: usize) -> Result<Self, ReporterError> {
        if top_k == 0 {
            return Err(ReporterError::InvalidTopK);
        }
        Ok(Self { top_k })
    }

    #[must_use]
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    #[must_use]
    pub fn rank(&self, table: &FrequencyTable) -> Vec<RankedWord> {
        let mut ranking: Vec<RankedWord> = table
            .snapshot()
            .into_iter()
            .map(|(word, count)| RankedWord { word, count })
            .collect();
        ranking.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
        ranking.truncate(self.top_k);
        ranking
    }
}
