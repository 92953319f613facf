//! CLI entry point for the airline punctuality rater.
//!
//! Reads a file of take-off records, rates every airline and flight, and
//! either renders the best/worst HTML report or exports the full rankings.

use airline_rater::{
    airline::AirlineBook,
    output::{RankingExport, Report, print_pretty, write_csv, write_json, write_report},
    parser::read_records,
    ranking::{Rankings, build_rankings},
};
use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "airline_rater")]
#[command(about = "Rank airlines and flights by take-off punctuality", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the HTML report of the best and worst airlines and flights
    Report {
        /// File of take-off records
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// HTML file to write the report to
        #[arg(short, long, default_value = "report_airlines.html")]
        output: PathBuf,

        /// Number of entries in each best/worst list
        #[arg(short = 'n', default_value_t = 10)]
        nb_ranking: usize,

        /// Report template with {date}, {time} and ranking placeholders
        #[arg(short, long, default_value = "report_Template.html")]
        template: PathBuf,
    },
    /// Export the full airline and flight rankings
    Rank {
        /// File of take-off records
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Number of entries in each best/worst list
        #[arg(short = 'n', default_value_t = 10)]
        nb_ranking: usize,

        /// Export format
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// File to write to; JSON goes to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Csv,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/airline_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("airline_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            input,
            output,
            nb_ranking,
            template,
        } => {
            let rankings = load_rankings(&input)?;
            let report = Report::new(&rankings, nb_ranking, Local::now());
            write_report(&report, &template, &output)?;
        }
        Commands::Rank {
            input,
            nb_ranking,
            format,
            output,
        } => {
            let rankings = load_rankings(&input)?;
            print_pretty(&rankings);
            let export = RankingExport::new(&rankings, nb_ranking);

            match (format, output) {
                (Format::Json, Some(path)) => {
                    let file = std::fs::File::create(&path)
                        .with_context(|| format!("failed to create `{}`", path.display()))?;
                    write_json(file, &export)?;
                    info!(path = %path.display(), "Rankings written");
                }
                (Format::Json, None) => {
                    write_json(std::io::stdout().lock(), &export)?;
                }
                (Format::Csv, Some(path)) => {
                    write_csv(&path, &export)?;
                    info!(path = %path.display(), "Rankings written");
                }
                (Format::Csv, None) => bail!("CSV export needs an --output path"),
            }
        }
    }

    Ok(())
}

/// Parses the records file and ranks its airlines and flights.
#[tracing::instrument(skip_all, fields(input = %input.display()))]
fn load_rankings(input: &Path) -> Result<Rankings> {
    let records = read_records(input)?;
    let (book, skipped) = AirlineBook::from_records(&records);

    info!(
        records = records.len(),
        skipped,
        airlines = book.len(),
        "Ledgers ready"
    );

    Ok(build_rankings(&book))
}
