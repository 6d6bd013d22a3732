use std::path::PathBuf;
use std::process::exit;

use anyhow::{Context, Result};
use clap::Parser;

use match_insights::error::DashboardError;
use match_insights::metrics::DEFAULT_HISTOGRAM_BINS;
use match_insights::{dataset, metrics, report};

#[derive(Parser, Debug)]
#[command(
    name = "match-insights",
    about = "Descriptive statistics dashboard for a match-record dataset",
    version
)]
struct Cli {
    /// Path to the match dataset
    #[arg(long = "data", default_value = "dataset.csv")]
    data: PathBuf,

    /// Seasons to include, comma separated (default: all seasons)
    #[arg(long = "seasons", value_delimiter = ',')]
    seasons: Option<Vec<i64>>,

    /// Bin count for the duration histogram
    #[arg(long = "bins", default_value_t = DEFAULT_HISTOGRAM_BINS)]
    bins: usize,

    /// Emit the derived summary as JSON instead of the terminal report
    #[arg(long = "json")]
    json: bool,
}

fn main() {
    let args = Cli::parse();

    if let Err(err) = run(args) {
        eprintln!("Error: {:#}", err);
        eprintln!("Check that the dataset file is present and carries the expected columns.");
        exit(1);
    }
}

fn run(args: Cli) -> Result<()> {
    let snapshot = dataset::cached_snapshot(&args.data)
        .with_context(|| format!("failed to load {}", args.data.display()))?;

    let seasons = args.seasons.unwrap_or_else(|| snapshot.season_ids());
    let view = snapshot.view(&seasons);

    let summary = match metrics::derive_summary(&view, args.bins) {
        Ok(summary) => summary,
        Err(DashboardError::EmptyView) => {
            // A filter matching nothing is a placeholder state, not a crash.
            report::render_empty(&seasons);
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        report::render_dashboard(&snapshot, &seasons, &summary);
    }
    Ok(())
}
