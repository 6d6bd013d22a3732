use thiserror::Error;

/// Failure taxonomy for the dashboard pipeline.
///
/// Startup failures (`Io`, `Csv`, `MissingColumn`, `DataFormat`) are fatal to
/// the load; `EmptyView` and `DegenerateCorrelation` are per-derivation
/// states the shell is expected to degrade gracefully on.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("required column '{column}' is missing from the dataset header")]
    MissingColumn { column: &'static str },

    #[error("row {row}, column '{column}': {reason}")]
    DataFormat {
        row: usize,
        column: String,
        reason: String,
    },

    #[error("the current season filter selects no games")]
    EmptyView,

    #[error("objective '{objective}' is constant in the current view, correlation is undefined")]
    DegenerateCorrelation { objective: &'static str },

    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}
