use thiserror::Error;

/// Errors raised while preparing data for, fitting, or persisting the model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("not enough samples: need at least {needed}, found {found}")]
    NotEnoughSamples { needed: usize, found: usize },

    #[error("normal equations are singular and cannot be solved")]
    SingularMatrix,

    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("test fraction must be strictly between 0 and 1, got {0}")]
    InvalidTestFraction(f64),

    #[error("array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("enriched table error: {0}")]
    Table(#[from] feature_deriver::TableError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("model serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
