//! Core pipeline for a match-record statistics dashboard.
//!
//! Two stages, executed in sequence: data preparation (CSV → normalized
//! `MatchRecord` snapshot, memoized per file content) and metric derivation
//! (pure functions over a season-filtered view: scalar summaries, grouped
//! aggregates, pairwise correlation). Rendering belongs to whatever shell
//! consumes the derived values as plain data; `report` ships a terminal one.

pub mod correlation;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod report;

pub use correlation::{CorrelationMatrix, objective_correlation};
pub use dataset::{
    DatasetSnapshot, FlagLabel, MatchRecord, Objective, RawMatchRow, cached_snapshot,
    load_dataset, prepare,
};
pub use error::DashboardError;
pub use metrics::{DEFAULT_HISTOGRAM_BINS, DashboardSummary, derive_summary};
