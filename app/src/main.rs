use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use wordwin_adapters::pipeline::run_pipeline;
use wordwin_adapters::sink::{JsonlReportSink, TeeReportSink, TextReportSink};
use wordwin_adapters::tokenizer::LineTokenStream;
use wordwin_core::config::WordCountConfig;
use wordwin_core::driver::{ReportSink, StreamDriver, StreamSummary};
use wordwin_core::reporter::TopKReporter;
use wordwin_core::window_counter::{SlidingWindowCounter, WindowPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseOutcome {
    Run,
    HelpRequested,
}

#[derive(Debug, Clone, Default)]
struct CliOptions {
    config_path: Option<PathBuf>,
    input_path: Option<PathBuf>,
    jsonl_path: Option<PathBuf>,
    window_size: Option<usize>,
    min_word_length: Option<usize>,
    ignore_case: bool,
    top_k: Option<usize>,
    report_every: Option<u64>,
    pipeline: bool,
    stats: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let options = parse_args()?;
    let config = resolve_config(&options)?;

    let reader = open_input(options.input_path.as_deref())?;
    let sink = TeeReportSink::new(
        TextReportSink::stdout(),
        options.jsonl_path.clone().map(JsonlReportSink::new),
    );
    let summary = run_stream(reader, &config, sink, options.pipeline).await?;

    if options.stats {
        print_stats(&summary);
    }
    Ok(())
}

async fn run_stream<K>(
    reader: Box<dyn BufRead + Send>,
    config: &WordCountConfig,
    sink: K,
    staged: bool,
) -> Result<StreamSummary, Box<dyn std::error::Error>>
where
    K: ReportSink + 'static,
{
    if staged {
        let (summary, _sink) = run_pipeline(reader, config, sink).await?;
        return Ok(summary);
    }

    let mut stream = LineTokenStream::new(reader);
    let mut counter = SlidingWindowCounter::new(
        config.window_size,
        WindowPolicy::new(config.min_word_length, config.ignore_case),
    )?;
    let reporter = TopKReporter::new(config.top_k)?;
    let driver = StreamDriver::new(reporter, config.report_every)?;
    let mut sink = sink;
    Ok(driver.run(&mut stream, &mut counter, &mut sink).await?)
}

fn open_input(path: Option<&Path>) -> io::Result<Box<dyn BufRead + Send>> {
    match path {
        Some(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn resolve_config(options: &CliOptions) -> Result<WordCountConfig, Box<dyn std::error::Error>> {
    let mut config = match options.config_path.as_deref() {
        Some(path) => WordCountConfig::load_from_path(path)?,
        None => WordCountConfig::default(),
    };

    if let Some(window_size) = options.window_size {
        config.window_size = window_size;
    }
    if let Some(min_word_length) = options.min_word_length {
        config.min_word_length = min_word_length;
    }
    if options.ignore_case {
        config.ignore_case = true;
    }
    if let Some(top_k) = options.top_k {
        config.top_k = top_k;
    }
    if let Some(report_every) = options.report_every {
        config.report_every = report_every;
    }

    config.validate()?;
    Ok(config)
}

fn print_stats(summary: &StreamSummary) {
    println!("metric.tokens_observed={}", summary.tokens_observed);
    println!("metric.words_counted={}", summary.words_counted);
    println!("metric.reports_emitted={}", summary.reports_emitted);
    println!(
        "metric.elapsed_ms={:.3}",
        summary.elapsed.as_secs_f64() * 1_000.0
    );
}

fn parse_args() -> io::Result<CliOptions> {
    let mut options = CliOptions::default();
    let outcome = parse_args_from(std::env::args().skip(1), &mut options)?;
    if outcome == ParseOutcome::HelpRequested {
        print_help();
        std::process::exit(0);
    }
    Ok(options)
}

fn parse_args_from(
    args: impl IntoIterator<Item = String>,
    options: &mut CliOptions,
) -> io::Result<ParseOutcome> {
    let mut args = args.into_iter();

    while let Some(flag) = args.next() {
        match flag.as_str() {
            "-h" | "--help" => return Ok(ParseOutcome::HelpRequested),
            "--config" => {
                options.config_path = Some(PathBuf::from(next_value(&mut args, "--config")?));
            }
            "--input" => {
                options.input_path = Some(PathBuf::from(next_value(&mut args, "--input")?));
            }
            "--jsonl" => {
                options.jsonl_path = Some(PathBuf::from(next_value(&mut args, "--jsonl")?));
            }
            "--window-size" => {
                options.window_size = Some(parse_number(&mut args, "--window-size")?);
            }
            "--min-word-length" => {
                options.min_word_length = Some(parse_number(&mut args, "--min-word-length")?);
            }
            "--ignore-case" => options.ignore_case = true,
            "--top-k" => {
                options.top_k = Some(parse_number(&mut args, "--top-k")?);
            }
            "--report-every" => {
                options.report_every = Some(parse_number(&mut args, "--report-every")?);
            }
            "--pipeline" => options.pipeline = true,
            "--stats" => options.stats = true,
            _ => {
                return Err(io_other(format!("unknown argument `{flag}`")));
            }
        }
    }

    Ok(ParseOutcome::Run)
}

fn parse_number<T>(args: &mut impl Iterator<Item = String>, flag: &str) -> io::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    next_value(args, flag)?
        .parse::<T>()
        .map_err(|error| io_other(format!("invalid {flag} value: {error}")))
}

fn next_value(args: &mut impl Iterator<Item = String>, flag: &str) -> io::Result<String> {
    args.next()
        .ok_or_else(|| io_other(format!("missing value for `{flag}`")))
}

fn print_help() {
    println!(
        "wordwin: sliding-window top-K word frequency over a text stream\n\n\
Usage:\n  wordwin-app [OPTIONS]\n\n\
Reads text from stdin (or --input) and prints the top-K most frequent\n\
words among the last W counted words, every N observed tokens.\n\n\
Options:\n  --window-size <n>       Sliding window capacity W (default: 1000)\n  --min-word-length <n>   Minimum token length to count; shorter tokens\n                          are ignored entirely (default: 5)\n  --ignore-case           Fold tokens to lowercase before counting\n  --top-k <n>             Ranked entries per report (default: 10)\n  --report-every <n>      Report cadence in observed tokens (default: 1000)\n  --config <path>         TOML config file; flags override its values\n  --input <path>          Read from a file instead of stdin\n  --jsonl <path>          Also append each report as a JSON line\n  --pipeline              Run the staged concurrent pipeline\n  --stats                 Print metric.* summary lines at exit\n  -h, --help              Show this help\n"
    );
}

fn io_other(error: impl std::fmt::Display) -> io::Error {
    io::Error::other(error.to_string())
}
