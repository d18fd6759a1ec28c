use std::fs;
use std::path::Path;

use feature_deriver::WindowSpec;
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dataset::{Dataset, FEATURES, TARGETS};
use crate::error::ModelError;
use crate::linear::LinearFit;
use crate::metrics::{Evaluation, TargetScore, r2_score, rmse};

/// File name the model is written to unless configured otherwise.
pub const DEFAULT_MODEL_PATH: &str = "trained_model.json";

/// Predicted percentage distances of the close from the next `F` days' extremes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub high_next_pct: f64,
    pub low_next_pct: f64,
}

/// One linear fit per target over the four window features.
///
/// Remembers the windows it was trained with so that feature names, and the
/// enriched table it is applied to, stay consistent after a reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtremesModel {
    pub windows: WindowSpec,
    pub feature_names: Vec<String>,
    pub target_names: Vec<String>,
    pub high_next: LinearFit,
    pub low_next: LinearFit,
}

impl ExtremesModel {
    pub fn fit(train: &Dataset, windows: WindowSpec) -> Result<Self, ModelError> {
        if train.features.ncols() != FEATURES.len() {
            return Err(ModelError::DimensionMismatch {
                expected: FEATURES.len(),
                got: train.features.ncols(),
            });
        }
        let x = train.features.view();
        Ok(Self {
            windows,
            feature_names: FEATURES.iter().map(|c| c.header(&windows)).collect(),
            target_names: TARGETS.iter().map(|c| c.header(&windows)).collect(),
            high_next: LinearFit::fit(x, train.targets.column(0))?,
            low_next: LinearFit::fit(x, train.targets.column(1))?,
        })
    }

    pub fn predict(&self, features: [f64; 4]) -> Prediction {
        Prediction {
            high_next_pct: self.high_next.predict_one(&features),
            low_next_pct: self.low_next.predict_one(&features),
        }
    }

    /// Predicts every row of an `n x 4` feature matrix into an `n x 2` matrix.
    pub fn predict_batch(&self, features: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
        let high = self.high_next.predict(features.view())?;
        let low = self.low_next.predict(features.view())?;
        Ok(ndarray::stack(Axis(1), &[high.view(), low.view()])?)
    }

    pub fn evaluate(&self, test: &Dataset) -> Result<Evaluation, ModelError> {
        let predicted = self.predict_batch(&test.features)?;
        let scores = self
            .target_names
            .iter()
            .enumerate()
            .map(|(k, name)| {
                let truth = test.targets.column(k);
                let guess = predicted.column(k);
                TargetScore {
                    target: name.clone(),
                    rmse: rmse(truth, guess),
                    r2: r2_score(truth, guess),
                }
            })
            .collect();
        Ok(Evaluation::from_scores(scores, test.len()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!(path = %path.display(), "saved model");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
