//! CycleLab CLI — run indicator pipelines over a CSV price series.
//!
//! Commands:
//! - `run` — load a TOML study and a CSV of observations, print every
//!   pipeline's output per row as CSV or JSON lines
//! - `list` — print the indicator types the factory can build

mod input;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use cyclelab_core::{Bar, Indicator, Pipeline, StudyConfig, INDICATOR_TYPES};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "cyclelab",
    about = "CycleLab CLI — streaming cycle-analysis indicators"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipelines of a study over a CSV price series.
    Run {
        /// Path to the TOML study file.
        #[arg(long)]
        config: PathBuf,

        /// CSV input with `time,close` and optional `open,high,low,volume` columns.
        #[arg(long)]
        input: PathBuf,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,

        /// Suppress rows until every pipeline is ready.
        #[arg(long, default_value_t = false)]
        only_ready: bool,
    },
    /// List the indicator types a study may reference.
    List,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            input,
            format,
            only_ready,
        } => run_study(&config, &input, format, only_ready),
        Commands::List => {
            for name in INDICATOR_TYPES {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn run_study(
    config_path: &Path,
    input_path: &Path,
    format: OutputFormat,
    only_ready: bool,
) -> Result<()> {
    let study = StudyConfig::load(config_path)?;
    let mut pipelines = study.build()?;
    info!(
        config = %config_path.display(),
        pipelines = pipelines.len(),
        "study loaded"
    );

    let file = File::open(input_path)
        .with_context(|| format!("failed to open input {}", input_path.display()))?;
    let bars = input::read_bars(BufReader::new(file))
        .with_context(|| format!("failed to read {}", input_path.display()))?;
    if bars.is_empty() {
        bail!("input {} contains no rows", input_path.display());
    }
    info!(rows = bars.len(), "input loaded");

    let stdout = io::stdout();
    let mut sink = BufWriter::new(stdout.lock());
    let written = drive(&mut pipelines, &bars, format, only_ready, &mut sink)?;
    sink.flush()?;

    info!(rows_written = written, "done");
    Ok(())
}

#[derive(Serialize)]
struct PipelineOutput<'a> {
    name: &'a str,
    value: f64,
    ready: bool,
}

#[derive(Serialize)]
struct JsonRow<'a> {
    time: String,
    outputs: Vec<PipelineOutput<'a>>,
}

enum Sink<W: Write> {
    Csv(csv::Writer<W>),
    Json(W),
}

/// Feed every bar to every pipeline in order and write one row per bar.
/// Returns the number of rows written.
fn drive<W: Write>(
    pipelines: &mut [Pipeline],
    bars: &[Bar],
    format: OutputFormat,
    only_ready: bool,
    writer: W,
) -> Result<usize> {
    let mut sink = match format {
        OutputFormat::Csv => {
            let mut out = csv::Writer::from_writer(writer);
            let mut header = vec!["time".to_string()];
            for pipeline in pipelines.iter() {
                header.push(pipeline.name().to_string());
                header.push(format!("{}_ready", pipeline.name()));
            }
            out.write_record(&header)?;
            Sink::Csv(out)
        }
        OutputFormat::Json => Sink::Json(writer),
    };

    let mut written = 0;
    for bar in bars {
        let values: Vec<(f64, bool)> = pipelines
            .iter_mut()
            .map(|p| (p.update_bar(bar), p.is_ready()))
            .collect();

        if only_ready && !values.iter().all(|(_, ready)| *ready) {
            continue;
        }

        let time = bar.time.format("%Y-%m-%d %H:%M:%S").to_string();
        match &mut sink {
            Sink::Csv(out) => {
                let mut record = vec![time];
                for (value, ready) in &values {
                    record.push(value.to_string());
                    record.push(ready.to_string());
                }
                out.write_record(&record)?;
            }
            Sink::Json(out) => {
                let row = JsonRow {
                    time,
                    outputs: pipelines
                        .iter()
                        .zip(&values)
                        .map(|(p, (value, ready))| PipelineOutput {
                            name: p.name(),
                            value: *value,
                            ready: *ready,
                        })
                        .collect(),
                };
                serde_json::to_writer(&mut *out, &row)?;
                out.write_all(b"\n")?;
            }
        }
        written += 1;
    }

    match &mut sink {
        Sink::Csv(out) => out.flush()?,
        Sink::Json(out) => out.flush()?,
    }

    debug!(written, skipped = bars.len() - written, "rows emitted");
    Ok(written)
}
