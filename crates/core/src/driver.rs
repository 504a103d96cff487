use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::reporter::{RankedWord, TopKReporter};
use crate::window_counter::{Admission, SlidingWindowCounter};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TokenSourceError {
    message: String,
}

impl TokenSourceError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SinkError {
    message: String,
}

impl SinkError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("token source failed: {0}")]
    Source(#[source] TokenSourceError),
    #[error("report sink failed: {0}")]
    Sink(#[source] SinkError),
    #[error("report cadence must be greater than 0")]
    InvalidReportCadence,
}

/// Lazy, finite sequence of word tokens. `Ok(None)` marks the end of
/// the input and is the only termination signal the driver knows.
#[async_trait]
pub trait TokenStream: Send {
    async fn next_token(&mut self) -> Result<Option<String>, TokenSourceError>;
}

/// Receives each periodic ranking together with the stream position
/// that triggered it. Textual formatting happens behind this trait.
#[async_trait]
pub trait ReportSink: Send {
    async fn emit(&mut self, position: u64, ranking: &[RankedWord]) -> Result<(), SinkError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSummary {
    /// Raw tokens pulled from the source, including filtered ones.
    pub tokens_observed: u64,
    /// Tokens that passed the admission policy and entered the window.
    pub words_counted: u64,
    pub reports_emitted: u64,
    pub elapsed: Duration,
}

/// Drives a token stream through a [`SlidingWindowCounter`], emitting a
/// top-K ranking to the sink every `report_every` observed tokens.
#[derive(Debug, Clone, Copy)]
pub struct StreamDriver {
    reporter: TopKReporter,
    report_every: u64,
}

impl StreamDriver {
    pub fn new(reporter: TopKReporter, report_every: u64) -> Result<Self, DriverError> {
        if report_every == 0 {
            return Err(DriverError::InvalidReportCadence);
        }
        Ok(Self {
            reporter,
            report_every,
        })
    }

    #[must_use]
    pub fn report_every(&self) -> u64 {
        self.report_every
    }

    #[must_use]
    pub fn reporter(&self) -> TopKReporter {
        self.reporter
    }

    pub async fn run<S, K>(
        &self,
        stream: &mut S,
        counter: &mut SlidingWindowCounter,
        sink: &mut K,
    ) -> Result<StreamSummary, DriverError>
    where
        S: TokenStream,
        K: ReportSink,
    {
        let started_at = std::time::Instant::now();
        let mut tokens_observed = 0_u64;
        let mut words_counted = 0_u64;
        let mut reports_emitted = 0_u64;

        loop {
            let maybe_token = stream.next_token().await.map_err(DriverError::Source)?;
            let Some(token) = maybe_token else {
                return Ok(StreamSummary {
                    tokens_observed,
                    words_counted,
                    reports_emitted,
                    elapsed: started_at.elapsed(),
                });
            };

            let observation = counter.observe(&token);
            tokens_observed += 1;
            if matches!(observation.admission, Admission::Counted { .. }) {
                words_counted += 1;
            }

            if observation.position % self.report_every == 0 {
                let ranking = self.reporter.rank(counter.table());
                sink.emit(observation.position, &ranking)
                    .await
                    .map_err(DriverError::Sink)?;
                reports_emitted += 1;
            }
        }
    }
}
