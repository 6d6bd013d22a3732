//! Terminal rendering of the derived outputs. Formatting only; every number
//! printed here was computed in `metrics`/`correlation`.

use chrono::Utc;

use crate::dataset::DatasetSnapshot;
use crate::metrics::DashboardSummary;

const BAR_WIDTH: usize = 40;

pub fn render_dashboard(snapshot: &DatasetSnapshot, seasons: &[i64], summary: &DashboardSummary) {
    render_header(snapshot, seasons);

    println!("Total games:                 {}", summary.total_games);
    println!(
        "Average duration:            {:.1} min",
        summary.average_duration_min
    );
    println!("Win rate:                    {:.1}%", summary.win_rate_pct);
    println!(
        "Most common first objective: {}",
        summary.most_common_first_objective.name()
    );

    println!();
    println!("First-objective rates:");
    for rate in &summary.objective_rates {
        println!(
            "  {:<10} {:5.1}% |{}",
            rate.objective.name(),
            rate.rate_pct,
            bar(rate.rate_pct / 100.0)
        );
    }

    println!();
    println!("Per-season evolution:");
    println!("  {:>7} | {:>12} | {:>8}", "season", "avg duration", "win rate");
    let series = &summary.season_series;
    for i in 0..series.seasons.len() {
        println!(
            "  {:>7} | {:>8.1} min | {:>7.1}%",
            series.seasons[i], series.avg_duration_min[i], series.win_rate_pct[i]
        );
    }

    println!();
    println!("First-objective correlation:");
    let matrix = &summary.objective_correlation;
    print!("  {:>10}", "");
    for objective in matrix.objectives {
        print!(" {:>10}", objective.name());
    }
    println!();
    for (i, objective) in matrix.objectives.iter().enumerate() {
        print!("  {:>10}", objective.name());
        for cell in &matrix.values[i] {
            match cell {
                Some(value) => print!(" {:>10.2}", value),
                None => print!(" {:>10}", "--"),
            }
        }
        println!();
    }
    if !matrix.degenerate.is_empty() {
        let names: Vec<&str> = matrix.degenerate.iter().map(|o| o.name()).collect();
        println!(
            "  (constant in this view, correlation undefined: {})",
            names.join(", ")
        );
    }

    println!();
    println!("Duration distribution:");
    let max_count = summary
        .duration_histogram
        .iter()
        .map(|bin| bin.count)
        .max()
        .unwrap_or(0);
    for bin in &summary.duration_histogram {
        let fill = if max_count == 0 {
            0.0
        } else {
            bin.count as f64 / max_count as f64
        };
        println!(
            "  {:6.1} - {:6.1} min {:>6} |{}",
            bin.lower_min,
            bin.upper_min,
            bin.count,
            bar(fill)
        );
    }
}

/// Explicit no-data state for an empty filtered view.
pub fn render_empty(seasons: &[i64]) {
    println!("== Match Insights ==");
    println!(
        "No games match the selected seasons ({}).",
        join_seasons(seasons)
    );
    println!("Adjust the season filter and rerun.");
}

fn render_header(snapshot: &DatasetSnapshot, seasons: &[i64]) {
    println!("== Match Insights ==");
    println!("Generated:   {}", Utc::now().to_rfc3339());
    println!("Dataset:     {} games, fingerprint {}", snapshot.records().len(), &snapshot.fingerprint()[..12]);
    println!("Seasons:     {}", join_seasons(seasons));
    println!();
}

fn join_seasons(seasons: &[i64]) -> String {
    seasons
        .iter()
        .map(|season| season.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn bar(fill: f64) -> String {
    let width = (fill.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(width)
}
