//! Linear model mapping backward-looking window features to forward-looking
//! price-extreme distances.
//!
//! Four features (days since and distance from the trailing high and low)
//! predict two targets (distance from the high and low of the next `F`
//! days), each with its own ordinary-least-squares fit.

pub mod dataset;
pub mod error;
pub mod linear;
pub mod metrics;
pub mod model;
pub mod trainer;

pub use dataset::{Dataset, FEATURES, TARGETS, train_test_split};
pub use error::ModelError;
pub use metrics::Evaluation;
pub use model::{DEFAULT_MODEL_PATH, ExtremesModel, Prediction};
pub use trainer::{TrainOptions, TrainingReport, train};
