use std::io::BufRead;
use std::time::Instant;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinError;
use wordwin_core::config::WordCountConfig;
use wordwin_core::driver::{ReportSink, SinkError, StreamSummary, TokenSourceError};
use wordwin_core::reporter::{ReporterError, TopKReporter};
use wordwin_core::ring_buffer::RingBufferError;
use wordwin_core::window_counter::{Admission, SlidingWindowCounter, WindowPolicy};

use crate::tokenizer::WordTokenizer;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid window size: {0}")]
    Window(#[from] RingBufferError),
    #[error("invalid top-k: {0}")]
    Reporter(#[from] ReporterError),
    #[error("report cadence must be greater than 0")]
    InvalidReportCadence,
    #[error("token source failed: {0}")]
    Source(#[source] TokenSourceError),
    #[error("report sink failed: {0}")]
    Sink(#[source] SinkError),
    #[error("pipeline stage panicked: {0}")]
    Stage(#[from] JoinError),
}

/// Staged concurrent form of the counting run: three tasks joined by
/// unbounded channels.
///
/// 1. tokenizer — owns the reader, sends raw tokens;
/// 2. filter — applies the window policy, forwards skipped tokens as
///    `None` so position accounting matches the single-threaded driver;
/// 3. counter — sole owner of the window, the table, and the sink.
///
/// Shutdown propagates by channel closure only: the tokenizer drops its
/// sender at end of input and each downstream stage ends when its input
/// does. Observably equivalent to [`wordwin_core::driver::StreamDriver`]
/// on the same input.
pub async fn run_pipeline<R, K>(
    reader: R,
    config: &WordCountConfig,
    sink: K,
) -> Result<(StreamSummary, K), PipelineError>
where
    R: BufRead + Send + 'static,
    K: ReportSink + 'static,
{
    if config.report_every == 0 {
        return Err(PipelineError::InvalidReportCadence);
    }
    let policy = WindowPolicy::new(config.min_word_length, config.ignore_case);
    let mut counter = SlidingWindowCounter::new(config.window_size, policy)?;
    let reporter = TopKReporter::new(config.top_k)?;
    let report_every = config.report_every;

    let started_at = Instant::now();
    let (raw_tx, mut raw_rx) = mpsc::unbounded_channel::<String>();
    let (normalized_tx, mut normalized_rx) = mpsc::unbounded_channel::<Option<String>>();

    let tokenizer_stage = tokio::task::spawn_blocking(move || tokenize_lines(reader, &raw_tx));

    let filter_stage = tokio::spawn(async move {
        while let Some(raw) = raw_rx.recv().await {
            if normalized_tx.send(policy.normalize(&raw)).is_err() {
                break;
            }
        }
    });

    let counter_stage = tokio::spawn(async move {
        let mut sink = sink;
        let mut tokens_observed = 0_u64;
        let mut words_counted = 0_u64;
        let mut reports_emitted = 0_u64;

        while let Some(normalized) = normalized_rx.recv().await {
            let observation = counter.apply_normalized(normalized);
            tokens_observed += 1;
            if matches!(observation.admission, Admission::Counted { .. }) {
                words_counted += 1;
            }

            if observation.position % report_every == 0 {
                let ranking = reporter.rank(counter.table());
                if let Err(error) = sink.emit(observation.position, &ranking).await {
                    return Err(error);
                }
                reports_emitted += 1;
            }
        }

        Ok((
            StreamSummary {
                tokens_observed,
                words_counted,
                reports_emitted,
                elapsed: started_at.elapsed(),
            },
            sink,
        ))
    });

    tokenizer_stage.await?.map_err(PipelineError::Source)?;
    filter_stage.await?;
    let (summary, sink) = counter_stage.await?.map_err(PipelineError::Sink)?;
    Ok((summary, sink))
}

fn tokenize_lines<R: BufRead>(
    reader: R,
    output: &mpsc::UnboundedSender<String>,
) -> Result<(), TokenSourceError> {
    let tokenizer = WordTokenizer::new();
    for line in reader.lines() {
        let line = line
            .map_err(|error| TokenSourceError::new(format!("failed to read line: {error}")))?;
        for token in tokenizer.tokenize(&line) {
            if output.send(token.to_string()).is_err() {
                // Downstream hung up; stop producing.
                return Ok(());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use async_trait::async_trait;
    use wordwin_core::config::WordCountConfig;
    use wordwin_core::driver::{ReportSink, SinkError, StreamDriver};
    use wordwin_core::reporter::{RankedWord, TopKReporter};
    use wordwin_core::window_counter::{SlidingWindowCounter, WindowPolicy};

    use super::{run_pipeline, PipelineError};
    use crate::tokenizer::LineTokenStream;

    #[derive(Debug, Default)]
    struct CollectingSink {
        reports: Vec<(u64, Vec<RankedWord>)>,
        fail: bool,
    }

    #[async_trait]
    impl ReportSink for CollectingSink {
        async fn emit(&mut self, position: u64, ranking: &[RankedWord]) -> Result<(), SinkError> {
            if self.fail {
                return Err(SinkError::new("sink is closed"));
            }
            self.reports.push((position, ranking.to_vec()));
            Ok(())
        }
    }

    const SAMPLE: &str = "the quick brown fox jumps over the lazy dog\n\
                          the quick fox runs again and again\n\
                          short words stay OUT when the filter is on\n";

    fn config() -> WordCountConfig {
        WordCountConfig {
            window_size: 8,
            min_word_length: 4,
            ignore_case: true,
            top_k: 3,
            report_every: 5,
        }
    }

    #[tokio::test]
    async fn pipeline_matches_the_single_threaded_driver() {
        let config = config();

        let mut stream = LineTokenStream::new(Cursor::new(SAMPLE));
        let mut counter = SlidingWindowCounter::new(
            config.window_size,
            WindowPolicy::new(config.min_word_length, config.ignore_case),
        )
        .expect("window size is valid");
        let reporter = TopKReporter::new(config.top_k).expect("top-k is valid");
        let driver =
            StreamDriver::new(reporter, config.report_every).expect("cadence is valid");
        let mut direct_sink = CollectingSink::default();
        let direct_summary = driver
            .run(&mut stream, &mut counter, &mut direct_sink)
            .await
            .expect("driver run should succeed");

        let (staged_summary, staged_sink) =
            run_pipeline(Cursor::new(SAMPLE), &config, CollectingSink::default())
                .await
                .expect("pipeline run should succeed");

        assert_eq!(staged_summary.tokens_observed, direct_summary.tokens_observed);
        assert_eq!(staged_summary.words_counted, direct_summary.words_counted);
        assert_eq!(staged_summary.reports_emitted, direct_summary.reports_emitted);
        assert_eq!(staged_sink.reports, direct_sink.reports);
    }

    #[tokio::test]
    async fn pipeline_counts_and_reports_on_cadence() {
        let (summary, sink) = run_pipeline(
            Cursor::new("aaaa bbbb aaaa cccc aaaa bbbb\n"),
            &WordCountConfig {
                window_size: 10,
                min_word_length: 0,
                ignore_case: false,
                top_k: 2,
                report_every: 3,
            },
            CollectingSink::default(),
        )
        .await
        .expect("pipeline run should succeed");

        assert_eq!(summary.tokens_observed, 6);
        assert_eq!(summary.words_counted, 6);
        assert_eq!(summary.reports_emitted, 2);

        assert_eq!(sink.reports.len(), 2);
        assert_eq!(sink.reports[0].0, 3);
        assert_eq!(sink.reports[0].1[0].word, "aaaa");
        assert_eq!(sink.reports[0].1[0].count, 2);
        assert_eq!(sink.reports[1].0, 6);
        assert_eq!(sink.reports[1].1[0].word, "aaaa");
        assert_eq!(sink.reports[1].1[0].count, 3);
    }

    #[tokio::test]
    async fn empty_input_produces_an_empty_summary() {
        let (summary, sink) =
            run_pipeline(Cursor::new(""), &config(), CollectingSink::default())
                .await
                .expect("pipeline run should succeed");

        assert_eq!(summary.tokens_observed, 0);
        assert_eq!(summary.words_counted, 0);
        assert_eq!(summary.reports_emitted, 0);
        assert!(sink.reports.is_empty());
    }

    #[tokio::test]
    async fn sink_failure_surfaces_as_a_sink_error() {
        let sink = CollectingSink {
            fail: true,
            ..CollectingSink::default()
        };
        let error = run_pipeline(
            Cursor::new("words words words\n"),
            &WordCountConfig {
                window_size: 4,
                min_word_length: 0,
                ignore_case: false,
                top_k: 1,
                report_every: 1,
            },
            sink,
        )
        .await
        .unwrap_err();
        assert!(matches!(error, PipelineError::Sink(_)));
    }

    #[tokio::test]
    async fn zero_cadence_is_rejected_before_any_stage_starts() {
        let error = run_pipeline(
            Cursor::new("text"),
            &WordCountConfig {
                report_every: 0,
                ..config()
            },
            CollectingSink::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(error, PipelineError::InvalidReportCadence));
    }
}
