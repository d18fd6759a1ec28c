//! The three stages of a run, each reading what the previous one wrote.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail, ensure};
use crypto_data_ingestor::io::{CsvSink, DataSink, read_bars_csv};
use crypto_data_ingestor::providers::DataProvider;
use crypto_data_ingestor::{Bar, BarSeries, fetch_history};
use extremes_model::{ExtremesModel, Prediction, TrainingReport, train};
use feature_deriver::FeatureTable;
use feature_deriver::table::{read_table_csv, write_table_csv};
use tracing::info;

use crate::config::RunPlan;

/// Fetches the configured range and writes it to the bars CSV.
pub async fn fetch<P>(provider: &P, plan: &RunPlan) -> anyhow::Result<(BarSeries, PathBuf)>
where
    P: DataProvider + ?Sized,
{
    let series = fetch_history(provider, &plan.pair, plan.start, plan.end)
        .await
        .with_context(|| format!("fetch {} from {} to {}", plan.pair, plan.start, plan.end))?;
    if series.is_empty() {
        bail!("no bars returned for {} between {} and {}", plan.pair, plan.start, plan.end);
    }

    let path = CsvSink::new(&plan.data_dir).write(&series).await?;
    info!(pair = %plan.pair, bars = series.len(), path = %path.display(), "fetch stage done");
    Ok((series, path))
}

/// Derives window features from `bars` and writes the enriched CSV.
pub fn derive(plan: &RunPlan, series: &BarSeries) -> anyhow::Result<(FeatureTable, PathBuf)> {
    let table = FeatureTable::derive(&series.bars, plan.windows)
        .with_context(|| format!("derive features for {}", series.pair))?;

    let path = plan.enriched_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    write_table_csv(&path, &table).with_context(|| format!("write {}", path.display()))?;
    info!(rows = table.len(), path = %path.display(), "derive stage done");
    Ok((table, path))
}

/// Reads a bars CSV previously written by [`fetch`], keeping the bars in
/// `[plan.start, plan.end]`.
pub fn load_bars(plan: &RunPlan) -> anyhow::Result<BarSeries> {
    let path = plan.bars_path();
    let bars: Vec<Bar> = read_bars_csv(&path)
        .with_context(|| format!("read bars from {}", path.display()))?
        .into_iter()
        .filter(|bar| (plan.start..=plan.end).contains(&bar.date))
        .collect();
    if bars.is_empty() {
        bail!(
            "no bars for {} between {} and {} in {}",
            plan.pair,
            plan.start,
            plan.end,
            path.display()
        );
    }
    Ok(BarSeries::new(plan.pair.clone(), bars))
}

pub fn load_table(plan: &RunPlan) -> anyhow::Result<FeatureTable> {
    let path = plan.enriched_path();
    read_table_csv(&path, plan.windows)
        .with_context(|| format!("read enriched table {}", path.display()))
}

/// Fits the model on the enriched rows, scores it and saves it.
pub fn train_model(plan: &RunPlan, table: &FeatureTable) -> anyhow::Result<TrainingReport> {
    let report = train(&table.rows, plan.windows, plan.train).context("train model")?;
    report
        .model
        .save(&plan.model_path)
        .with_context(|| format!("save model to {}", plan.model_path.display()))?;
    Ok(report)
}

pub fn predict(model_path: &Path, features: &[f64]) -> anyhow::Result<Prediction> {
    let Ok(features) = <[f64; 4]>::try_from(features) else {
        bail!("expected 4 feature values, got {}", features.len());
    };
    ensure!(features.iter().all(|v| v.is_finite()), "feature values must be finite");

    let model = ExtremesModel::load(model_path)
        .with_context(|| format!("load model from {}", model_path.display()))?;
    Ok(model.predict(features))
}

/// Fetch, derive and train in one go.
pub async fn run<P>(provider: &P, plan: &RunPlan) -> anyhow::Result<TrainingReport>
where
    P: DataProvider + ?Sized,
{
    let (series, _) = fetch(provider, plan).await?;
    let (table, _) = derive(plan, &series)?;
    train_model(plan, &table)
}
