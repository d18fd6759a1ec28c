//! Regression metrics for the held-out split.

use ndarray::ArrayView1;
use serde::Serialize;

/// Root mean squared error. Zero for empty input.
pub fn rmse(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> f64 {
    let n = y_true.len();
    if n == 0 {
        return 0.0;
    }
    let sse: f64 = y_true.iter().zip(y_pred.iter()).map(|(t, p)| (t - p).powi(2)).sum();
    (sse / n as f64).sqrt()
}

/// Coefficient of determination.
///
/// A constant `y_true` has no variance to explain: the score is 1.0 for a
/// perfect prediction and 0.0 otherwise.
pub fn r2_score(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> f64 {
    let Some(mean) = y_true.mean() else {
        return 0.0;
    };
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
    let ss_res: f64 = y_true.iter().zip(y_pred.iter()).map(|(t, p)| (t - p).powi(2)).sum();
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetScore {
    pub target: String,
    pub rmse: f64,
    pub r2: f64,
}

/// Scores on a held-out set. `rmse` and `r2` average the per-target values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub rmse: f64,
    pub r2: f64,
    pub per_target: Vec<TargetScore>,
    pub samples: usize,
}

impl Evaluation {
    pub fn from_scores(per_target: Vec<TargetScore>, samples: usize) -> Self {
        let k = per_target.len().max(1) as f64;
        Self {
            rmse: per_target.iter().map(|s| s.rmse).sum::<f64>() / k,
            r2: per_target.iter().map(|s| s.r2).sum::<f64>() / k,
            per_target,
            samples,
        }
    }
}
