//! Metric and aggregate derivation over a season-filtered view.
//!
//! Every function here is a pure function of the view it is handed; there
//! is no shared state between calls. Percentages are `0..=100`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::correlation::{self, CorrelationMatrix};
use crate::dataset::{MatchRecord, Objective};
use crate::error::DashboardError;

/// Default bin count for the duration distribution.
pub const DEFAULT_HISTOGRAM_BINS: usize = 30;

pub fn total_games(view: &[MatchRecord]) -> usize {
    view.len()
}

pub fn average_duration_min(view: &[MatchRecord]) -> Result<f64, DashboardError> {
    if view.is_empty() {
        return Err(DashboardError::EmptyView);
    }
    let total: f64 = view.iter().map(|record| record.duration_min).sum();
    Ok(total / view.len() as f64)
}

pub fn win_rate_pct(view: &[MatchRecord]) -> Result<f64, DashboardError> {
    if view.is_empty() {
        return Err(DashboardError::EmptyView);
    }
    let wins = view.iter().filter(|record| record.win.is_yes()).count();
    Ok(wins as f64 / view.len() as f64 * 100.0)
}

fn yes_count(view: &[MatchRecord], objective: Objective) -> usize {
    view.iter()
        .filter(|record| record.objective(objective).is_yes())
        .count()
}

/// The objective secured first most often in the view. Ties go to the
/// alphabetically-first display name, so the answer never depends on
/// column order.
pub fn most_common_first_objective(view: &[MatchRecord]) -> Result<Objective, DashboardError> {
    if view.is_empty() {
        return Err(DashboardError::EmptyView);
    }

    let mut best = Objective::ALL[0];
    let mut best_count = yes_count(view, best);
    for &objective in &Objective::ALL[1..] {
        let count = yes_count(view, objective);
        if count > best_count || (count == best_count && objective.name() < best.name()) {
            best = objective;
            best_count = count;
        }
    }
    Ok(best)
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectiveRate {
    pub objective: Objective,
    pub rate_pct: f64,
}

/// Per-objective percentage of games where it was secured first, in
/// canonical column order. Objectives are independent; the rates are not
/// expected to sum to 100.
pub fn objective_rate_table(view: &[MatchRecord]) -> Result<Vec<ObjectiveRate>, DashboardError> {
    if view.is_empty() {
        return Err(DashboardError::EmptyView);
    }

    Ok(Objective::ALL
        .into_iter()
        .map(|objective| ObjectiveRate {
            objective,
            rate_pct: yes_count(view, objective) as f64 / view.len() as f64 * 100.0,
        })
        .collect())
}

/// Per-season mean duration and win rate, seasons ascending. The three
/// sequences are parallel and equally long.
#[derive(Debug, Clone, Serialize)]
pub struct SeasonTimeSeries {
    pub seasons: Vec<i64>,
    pub avg_duration_min: Vec<f64>,
    pub win_rate_pct: Vec<f64>,
}

pub fn season_time_series(view: &[MatchRecord]) -> Result<SeasonTimeSeries, DashboardError> {
    if view.is_empty() {
        return Err(DashboardError::EmptyView);
    }

    let mut groups: BTreeMap<i64, (f64, usize, usize)> = BTreeMap::new();
    for record in view {
        let entry = groups.entry(record.season_id).or_insert((0.0, 0, 0));
        entry.0 += record.duration_min;
        entry.1 += usize::from(record.win.is_yes());
        entry.2 += 1;
    }

    let mut series = SeasonTimeSeries {
        seasons: Vec::with_capacity(groups.len()),
        avg_duration_min: Vec::with_capacity(groups.len()),
        win_rate_pct: Vec::with_capacity(groups.len()),
    };
    for (season, (duration_sum, wins, games)) in groups {
        series.seasons.push(season);
        series.avg_duration_min.push(duration_sum / games as f64);
        series.win_rate_pct.push(wins as f64 / games as f64 * 100.0);
    }
    Ok(series)
}

#[derive(Debug, Clone, Serialize)]
pub struct HistogramBin {
    pub lower_min: f64,
    pub upper_min: f64,
    pub count: usize,
}

/// Equal-width duration bins over `[min, max]`. A view where every
/// duration is identical degrades to a single bin holding everything.
pub fn duration_histogram(
    view: &[MatchRecord],
    bins: usize,
) -> Result<Vec<HistogramBin>, DashboardError> {
    if view.is_empty() {
        return Err(DashboardError::EmptyView);
    }
    let bins = bins.max(1);

    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for record in view {
        lo = lo.min(record.duration_min);
        hi = hi.max(record.duration_min);
    }

    if hi <= lo {
        return Ok(vec![HistogramBin {
            lower_min: lo,
            upper_min: hi,
            count: view.len(),
        }]);
    }

    let width = (hi - lo) / bins as f64;
    let mut counts = vec![0usize; bins];
    for record in view {
        let index = (((record.duration_min - lo) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }

    Ok(counts
        .into_iter()
        .enumerate()
        .map(|(index, count)| HistogramBin {
            lower_min: lo + index as f64 * width,
            upper_min: lo + (index + 1) as f64 * width,
            count,
        })
        .collect())
}

/// Everything a rendering shell needs, as plain serializable data.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_games: usize,
    pub average_duration_min: f64,
    pub win_rate_pct: f64,
    pub most_common_first_objective: Objective,
    pub objective_rates: Vec<ObjectiveRate>,
    pub season_series: SeasonTimeSeries,
    pub objective_correlation: CorrelationMatrix,
    pub duration_histogram: Vec<HistogramBin>,
}

/// Run every derivation over the view. The empty-view check happens once,
/// up front, so a shell sees a single explicit no-data state instead of a
/// NaN leaking into any display path.
pub fn derive_summary(
    view: &[MatchRecord],
    histogram_bins: usize,
) -> Result<DashboardSummary, DashboardError> {
    if view.is_empty() {
        return Err(DashboardError::EmptyView);
    }

    Ok(DashboardSummary {
        total_games: total_games(view),
        average_duration_min: average_duration_min(view)?,
        win_rate_pct: win_rate_pct(view)?,
        most_common_first_objective: most_common_first_objective(view)?,
        objective_rates: objective_rate_table(view)?,
        season_series: season_time_series(view)?,
        objective_correlation: correlation::objective_correlation(view)?,
        duration_histogram: duration_histogram(view, histogram_bins)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::FlagLabel;

    fn flag(value: u8) -> FlagLabel {
        if value == 1 { FlagLabel::Yes } else { FlagLabel::No }
    }

    fn record(season: i64, duration_sec: f64, win: u8, flags: [u8; 5]) -> MatchRecord {
        MatchRecord {
            season_id: season,
            duration_min: duration_sec / 60.0,
            win: flag(win),
            first_blood: flag(flags[0]),
            first_tower: flag(flags[1]),
            first_inhibitor: flag(flags[2]),
            first_baron: flag(flags[3]),
            first_dragon: flag(flags[4]),
        }
    }

    #[test]
    fn scalar_metrics_on_a_small_view() {
        // 600, 1200 and 1800 seconds, all won.
        let view = vec![
            record(9, 600.0, 1, [1, 0, 0, 0, 0]),
            record(9, 1200.0, 1, [1, 1, 0, 0, 0]),
            record(9, 1800.0, 1, [0, 1, 0, 0, 1]),
        ];

        assert_eq!(total_games(&view), 3);
        assert_eq!(average_duration_min(&view).unwrap(), 20.0);
        assert_eq!(win_rate_pct(&view).unwrap(), 100.0);
    }

    #[test]
    fn scalar_metrics_are_order_and_duplication_invariant() {
        let view = vec![
            record(9, 610.0, 1, [1, 0, 0, 0, 0]),
            record(10, 1270.0, 0, [0, 1, 0, 0, 0]),
            record(9, 1830.0, 1, [0, 0, 1, 0, 0]),
        ];
        let mut reversed = view.clone();
        reversed.reverse();
        let doubled: Vec<MatchRecord> = view.iter().chain(view.iter()).copied().collect();

        let base_avg = average_duration_min(&view).unwrap();
        let base_rate = win_rate_pct(&view).unwrap();
        assert!((average_duration_min(&reversed).unwrap() - base_avg).abs() < 1e-9);
        assert!((win_rate_pct(&reversed).unwrap() - base_rate).abs() < 1e-9);
        assert!((average_duration_min(&doubled).unwrap() - base_avg).abs() < 1e-9);
        assert!((win_rate_pct(&doubled).unwrap() - base_rate).abs() < 1e-9);
    }

    #[test]
    fn most_common_objective_counts_yes_flags() {
        let view = vec![
            record(9, 600.0, 1, [1, 1, 0, 0, 0]),
            record(9, 600.0, 0, [0, 1, 0, 0, 1]),
            record(9, 600.0, 1, [0, 1, 0, 0, 0]),
        ];
        assert_eq!(
            most_common_first_objective(&view).unwrap(),
            Objective::Tower
        );
    }

    #[test]
    fn most_common_objective_breaks_ties_alphabetically() {
        // Baron and Tower both taken twice; "Baron" sorts first.
        let view = vec![
            record(9, 600.0, 1, [0, 1, 0, 1, 0]),
            record(9, 600.0, 0, [0, 1, 0, 1, 0]),
            record(9, 600.0, 1, [1, 0, 0, 0, 0]),
        ];
        assert_eq!(
            most_common_first_objective(&view).unwrap(),
            Objective::Baron
        );
    }

    #[test]
    fn rate_table_is_canonically_ordered_and_bounded() {
        let view = vec![
            record(9, 600.0, 1, [1, 1, 0, 0, 1]),
            record(9, 600.0, 0, [1, 0, 0, 0, 1]),
            record(9, 600.0, 1, [0, 1, 0, 0, 1]),
            record(9, 600.0, 0, [1, 0, 0, 0, 0]),
        ];
        let table = objective_rate_table(&view).unwrap();

        let order: Vec<Objective> = table.iter().map(|row| row.objective).collect();
        assert_eq!(order, Objective::ALL.to_vec());
        for row in &table {
            assert!((0.0..=100.0).contains(&row.rate_pct));
        }
        assert_eq!(table[0].rate_pct, 75.0);
        assert_eq!(table[2].rate_pct, 0.0);
        assert_eq!(table[4].rate_pct, 75.0);
    }

    #[test]
    fn season_series_is_ascending_and_aligned() {
        let view = vec![
            record(10, 1200.0, 0, [0, 0, 0, 0, 0]),
            record(9, 600.0, 1, [0, 0, 0, 0, 0]),
            record(9, 1800.0, 0, [0, 0, 0, 0, 0]),
            record(10, 2400.0, 1, [0, 0, 0, 0, 0]),
        ];
        let series = season_time_series(&view).unwrap();

        assert_eq!(series.seasons, vec![9, 10]);
        assert_eq!(series.avg_duration_min, vec![20.0, 30.0]);
        assert_eq!(series.win_rate_pct, vec![50.0, 50.0]);
    }

    #[test]
    fn histogram_partitions_every_record() {
        let view = vec![
            record(9, 600.0, 1, [0, 0, 0, 0, 0]),
            record(9, 900.0, 1, [0, 0, 0, 0, 0]),
            record(9, 1200.0, 0, [0, 0, 0, 0, 0]),
            record(9, 1800.0, 0, [0, 0, 0, 0, 0]),
        ];
        let bins = duration_histogram(&view, 4).unwrap();

        assert_eq!(bins.len(), 4);
        let total: usize = bins.iter().map(|bin| bin.count).sum();
        assert_eq!(total, view.len());
        // The maximum lands in the last bin, not past it.
        assert_eq!(bins[3].count, 1);
    }

    #[test]
    fn histogram_of_identical_durations_is_a_single_bin() {
        let view = vec![
            record(9, 600.0, 1, [0, 0, 0, 0, 0]),
            record(9, 600.0, 0, [0, 0, 0, 0, 0]),
        ];
        let bins = duration_histogram(&view, 30).unwrap();
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 2);
    }

    #[test]
    fn empty_view_yields_an_explicit_error_everywhere() {
        let empty: Vec<MatchRecord> = Vec::new();

        assert_eq!(total_games(&empty), 0);
        assert!(matches!(
            average_duration_min(&empty),
            Err(DashboardError::EmptyView)
        ));
        assert!(matches!(win_rate_pct(&empty), Err(DashboardError::EmptyView)));
        assert!(matches!(
            most_common_first_objective(&empty),
            Err(DashboardError::EmptyView)
        ));
        assert!(matches!(
            objective_rate_table(&empty),
            Err(DashboardError::EmptyView)
        ));
        assert!(matches!(
            season_time_series(&empty),
            Err(DashboardError::EmptyView)
        ));
        assert!(matches!(
            duration_histogram(&empty, 30),
            Err(DashboardError::EmptyView)
        ));
        assert!(matches!(
            derive_summary(&empty, 30),
            Err(DashboardError::EmptyView)
        ));
    }

    #[test]
    fn summary_bundles_every_derivation() {
        let view = vec![
            record(9, 600.0, 1, [1, 0, 0, 1, 0]),
            record(9, 1200.0, 1, [0, 1, 0, 0, 1]),
            record(10, 1800.0, 0, [1, 1, 1, 0, 0]),
        ];
        let summary = derive_summary(&view, 5).unwrap();

        assert_eq!(summary.total_games, 3);
        assert_eq!(summary.average_duration_min, 20.0);
        assert_eq!(summary.objective_rates.len(), 5);
        assert_eq!(summary.season_series.seasons, vec![9, 10]);
        assert_eq!(summary.objective_correlation.values.len(), 5);
        let histogram_total: usize = summary.duration_histogram.iter().map(|b| b.count).sum();
        assert_eq!(histogram_total, 3);
    }
}
