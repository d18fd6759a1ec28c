//! Run parameters: a TOML-backed [`RunConfig`] where every field has a
//! default, and the validated [`RunPlan`] the pipeline consumes.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use crypto_data_ingestor::CurrencyPair;
use crypto_data_ingestor::providers::cryptocompare::provider::DEFAULT_API_KEY_VAR;
use extremes_model::{DEFAULT_MODEL_PATH, TrainOptions};
use feature_deriver::{DeriveError, WindowSpec};
use feature_deriver::window::{DEFAULT_LOOKAHEAD, DEFAULT_LOOKBACK};
use serde::{Deserialize, Serialize};
use shared_utils::config::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Pair as `BASE/QUOTE`, e.g. `BTC/USD`.
    pub pair: String,
    pub start_date: NaiveDate,
    /// Last day to fetch; today (UTC) when unset.
    pub end_date: Option<NaiveDate>,
    pub lookback: usize,
    pub lookahead: usize,
    /// Name of the environment variable holding the CryptoCompare key.
    pub api_key_env: String,
    pub data_dir: PathBuf,
    pub model_path: PathBuf,
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        let train = TrainOptions::default();
        Self {
            pair: "BTC/USD".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            end_date: None,
            lookback: DEFAULT_LOOKBACK,
            lookahead: DEFAULT_LOOKAHEAD,
            api_key_env: DEFAULT_API_KEY_VAR.to_string(),
            data_dir: PathBuf::from("data"),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            test_fraction: train.test_fraction,
            seed: train.seed,
        }
    }
}

impl RunConfig {
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("parse run config")
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Checks every field and resolves the defaults that depend on the
    /// current date.
    pub fn validate(&self, today: NaiveDate) -> Result<RunPlan, ConfigError> {
        let pair: CurrencyPair = self
            .pair
            .parse()
            .map_err(|e| ConfigError::invalid("pair", format!("{e}")))?;

        let end = self.end_date.unwrap_or(today);
        if self.start_date > end {
            return Err(ConfigError::invalid(
                "start_date",
                format!("{} is after end date {end}", self.start_date),
            ));
        }

        let windows = WindowSpec::new(self.lookback, self.lookahead).map_err(|e| match &e {
            DeriveError::InvalidParameter { name, .. } => {
                ConfigError::invalid(*name, e.to_string())
            }
            _ => ConfigError::invalid("lookback", e.to_string()),
        })?;

        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ConfigError::invalid(
                "test_fraction",
                format!("must be strictly between 0 and 1, got {}", self.test_fraction),
            ));
        }
        if self.api_key_env.trim().is_empty() {
            return Err(ConfigError::invalid("api_key_env", "must name an environment variable"));
        }

        Ok(RunPlan {
            pair,
            start: self.start_date,
            end,
            windows,
            api_key_env: self.api_key_env.clone(),
            data_dir: self.data_dir.clone(),
            model_path: self.model_path.clone(),
            train: TrainOptions {
                test_fraction: self.test_fraction,
                seed: self.seed,
            },
        })
    }
}

/// Validated run parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub pair: CurrencyPair,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub windows: WindowSpec,
    pub api_key_env: String,
    pub data_dir: PathBuf,
    pub model_path: PathBuf,
    pub train: TrainOptions,
}

impl RunPlan {
    pub fn bars_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}_bars.csv", self.pair.file_stem()))
    }

    pub fn enriched_path(&self) -> PathBuf {
        self.data_dir.join(format!(
            "{}_enriched_{}_{}.csv",
            self.pair.file_stem(),
            self.windows.lookback(),
            self.windows.lookahead()
        ))
    }
}
