use feature_deriver::{EnrichedBar, WindowSpec};
use tracing::info;

use crate::dataset::{Dataset, train_test_split};
use crate::error::ModelError;
use crate::metrics::Evaluation;
use crate::model::ExtremesModel;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainOptions {
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub model: ExtremesModel,
    pub evaluation: Evaluation,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Selects complete rows, splits them, fits on the training part and scores
/// on the held-out part.
pub fn train(
    rows: &[EnrichedBar],
    windows: WindowSpec,
    options: TrainOptions,
) -> Result<TrainingReport, ModelError> {
    let dataset = Dataset::from_enriched(rows)?;
    let (train_set, test_set) = train_test_split(&dataset, options.test_fraction, options.seed)?;

    let model = ExtremesModel::fit(&train_set, windows)?;
    let evaluation = model.evaluate(&test_set)?;

    info!(
        train_rows = train_set.len(),
        test_rows = test_set.len(),
        rmse = evaluation.rmse,
        r2 = evaluation.r2,
        "trained extremes model"
    );

    Ok(TrainingReport {
        model,
        evaluation,
        train_rows: train_set.len(),
        test_rows: test_set.len(),
    })
}
