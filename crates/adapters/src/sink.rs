use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use wordwin_core::driver::{ReportSink, SinkError};
use wordwin_core::reporter::RankedWord;

/// Legacy report line: `"1000: words { alpha: 3, beta: 2 }"`.
#[must_use]
pub fn format_report(position: u64, ranking: &[RankedWord]) -> String {
    let entries = ranking
        .iter()
        .map(|ranked| format!("{}: {}", ranked.word, ranked.count))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{position}: words {{ {entries} }}")
}

/// Writes one formatted report line per emission.
#[derive(Debug)]
pub struct TextReportSink<W> {
    writer: W,
}

impl<W: Write + Send> TextReportSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl TextReportSink<io::Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

#[async_trait]
impl<W: Write + Send> ReportSink for TextReportSink<W> {
    async fn emit(&mut self, position: u64, ranking: &[RankedWord]) -> Result<(), SinkError> {
        writeln!(self.writer, "{}", format_report(position, ranking))
            .map_err(|error| SinkError::new(format!("failed to write report: {error}")))
    }
}

#[derive(Debug, Serialize)]
struct JsonlRecord<'a> {
    position: u64,
    words: Vec<JsonlEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonlEntry<'a> {
    word: &'a str,
    count: u64,
}

/// Appends one JSON record per report, giving a run a machine-readable
/// trace alongside the console output.
#[derive(Debug, Clone)]
pub struct JsonlReportSink {
    path: PathBuf,
}

impl JsonlReportSink {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, record: &JsonlRecord<'_>) -> Result<(), SinkError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|error| {
                    SinkError::new(format!(
                        "failed to create report directory at {}: {error}",
                        parent.display()
                    ))
                })?;
            }
        }

        let line = serde_json::to_string(record)
            .map_err(|error| SinkError::new(format!("failed to serialize report: {error}")))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|error| {
                SinkError::new(format!(
                    "failed to open report file at {}: {error}",
                    self.path.display()
                ))
            })?;
        writeln!(file, "{line}").map_err(|error| {
            SinkError::new(format!(
                "failed to append report at {}: {error}",
                self.path.display()
            ))
        })
    }
}

#[async_trait]
impl ReportSink for JsonlReportSink {
    async fn emit(&mut self, position: u64, ranking: &[RankedWord]) -> Result<(), SinkError> {
        let record = JsonlRecord {
            position,
            words: ranking
                .iter()
                .map(|ranked| JsonlEntry {
                    word: &ranked.word,
                    count: ranked.count,
                })
                .collect(),
        };
        self.append(&record)
    }
}

/// Forwards each report to a primary sink and, when present, a
/// secondary one. The primary is emitted first; a primary failure
/// skips the secondary.
#[derive(Debug)]
pub struct TeeReportSink<A, B> {
    primary: A,
    secondary: Option<B>,
}

impl<A: ReportSink, B: ReportSink> TeeReportSink<A, B> {
    pub fn new(primary: A, secondary: Option<B>) -> Self {
        Self { primary, secondary }
    }

    #[must_use]
    pub fn into_primary(self) -> A {
        self.primary
    }
}

#[async_trait]
impl<A: ReportSink, B: ReportSink> ReportSink for TeeReportSink<A, B> {
    async fn emit(&mut self, position: u64, ranking: &[RankedWord]) -> Result<(), SinkError> {
        self.primary.emit(position, ranking).await?;
        if let Some(secondary) = self.secondary.as_mut() {
            secondary.emit(position, ranking).await?;
        }
        Ok(())
    }
}
