use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Parser, ValueEnum};

use vacancy_stats::engine::StdErrAggregationObserver;
use vacancy_stats::ingestion::{CompositeObserver, FileObserver, IngestionObserver, StdErrObserver};
use vacancy_stats::pipeline::StatisticsRequest;
use vacancy_stats::rates::RateTable;
use vacancy_stats::StatsResult;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "vacancy-stats")]
#[command(about = "Salary and posting-share statistics over job-posting dumps")]
struct Cli {
    /// CSV/JSON file, or a glob pattern such as 'by_year/*.csv'
    input: PathBuf,

    /// Substring a job title must contain to enter the title series (case-sensitive)
    title: String,

    /// JSON object of currency code -> rate into RUR (replaces the built-in table)
    #[arg(long)]
    rates: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Minimum share of postings a location needs to be ranked
    #[arg(long)]
    min_share: Option<f64>,

    /// Number of locations kept in each ranking
    #[arg(long)]
    top: Option<usize>,

    /// Append ingestion events to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Report ingestion and aggregation events on stderr
    #[arg(long, short)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> StatsResult<()> {
    let mut req = StatisticsRequest::new(&cli.input, cli.title);
    if let Some(path) = &cli.rates {
        req.rates = RateTable::from_json_path(path)?;
    }
    if let Some(min_share) = cli.min_share {
        req.aggregation.min_share = min_share;
    }
    if let Some(top) = cli.top {
        req.aggregation.top_n = top;
    }

    let mut observers: Vec<Arc<dyn IngestionObserver>> = Vec::new();
    if cli.verbose {
        observers.push(Arc::new(StdErrObserver));
        req.aggregation_observer = Some(Arc::new(StdErrAggregationObserver { verbose: true }));
    }
    if let Some(path) = &cli.log_file {
        observers.push(Arc::new(FileObserver::new(path)));
    }
    if !observers.is_empty() {
        req.ingestion.observer = Some(Arc::new(CompositeObserver::new(observers)));
    }

    let stats = req.run()?;
    match cli.format {
        OutputFormat::Text => println!("{stats}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
    }
    Ok(())
}
