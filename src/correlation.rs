//! Pairwise Pearson correlation over the 0/1-coded objective indicators.

use serde::Serialize;

use crate::dataset::{MatchRecord, Objective};
use crate::error::DashboardError;

/// Symmetric 5×5 correlation matrix in canonical objective order.
///
/// The diagonal is exactly `Some(1.0)`. A pair involving an objective that
/// is constant across the view has no defined coefficient and is reported
/// as `None` (JSON `null`) instead of a fabricated number; the constant
/// objectives are listed in `degenerate` so a shell can annotate them.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub objectives: [Objective; 5],
    pub values: Vec<Vec<Option<f64>>>,
    pub degenerate: Vec<Objective>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Objective, b: Objective) -> Option<f64> {
        self.values[a.index()][b.index()]
    }

    /// Escalate degeneracy to a hard failure, for callers that cannot
    /// render undefined cells.
    pub fn require_well_defined(&self) -> Result<&Self, DashboardError> {
        match self.degenerate.first() {
            Some(objective) => Err(DashboardError::DegenerateCorrelation {
                objective: objective.name(),
            }),
            None => Ok(self),
        }
    }
}

/// Correlation between the five first-objective indicators over the view.
pub fn objective_correlation(view: &[MatchRecord]) -> Result<CorrelationMatrix, DashboardError> {
    if view.is_empty() {
        return Err(DashboardError::EmptyView);
    }

    let indicators: Vec<Vec<f64>> = Objective::ALL
        .iter()
        .map(|&objective| {
            view.iter()
                .map(|record| {
                    if record.objective(objective).is_yes() {
                        1.0
                    } else {
                        0.0
                    }
                })
                .collect()
        })
        .collect();

    let degenerate: Vec<Objective> = Objective::ALL
        .into_iter()
        .filter(|objective| zero_variance(&indicators[objective.index()]))
        .collect();

    let n = Objective::ALL.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        values[i][i] = Some(1.0);
        for j in (i + 1)..n {
            let cell = pearson(&indicators[i], &indicators[j]);
            values[i][j] = cell;
            values[j][i] = cell;
        }
    }

    Ok(CorrelationMatrix {
        objectives: Objective::ALL,
        values,
        degenerate,
    })
}

/// Single-pass Pearson coefficient over equal-length samples. Returns
/// `None` when either side has zero variance, where the coefficient is
/// undefined.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return None;
    }

    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xx = 0.0;
    let mut sum_yy = 0.0;
    let mut sum_xy = 0.0;
    for i in 0..n {
        let x = xs[i];
        let y = ys[i];
        sum_x += x;
        sum_y += y;
        sum_xx += x * x;
        sum_yy += y * y;
        sum_xy += x * y;
    }

    let nf = n as f64;
    let num = nf * sum_xy - sum_x * sum_y;
    let den_x = nf * sum_xx - sum_x * sum_x;
    let den_y = nf * sum_yy - sum_y * sum_y;
    let den = (den_x.max(0.0) * den_y.max(0.0)).sqrt();
    if den <= 1e-12 {
        None
    } else {
        Some((num / den).clamp(-1.0, 1.0))
    }
}

fn zero_variance(xs: &[f64]) -> bool {
    let n = xs.len() as f64;
    let sum: f64 = xs.iter().sum();
    let sum_sq: f64 = xs.iter().map(|x| x * x).sum();
    n * sum_sq - sum * sum <= 1e-12
}
