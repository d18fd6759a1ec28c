use chrono::{Days, NaiveDate};
use crypto_data_ingestor::Bar;
use extremes_model::{Dataset, ExtremesModel, ModelError, TrainOptions, train};
use feature_deriver::table::write_table_csv;
use feature_deriver::{FeatureTable, WindowSpec, derive_with};

fn wavy_bars(n: usize) -> Vec<Bar> {
    let start = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
    (0..n)
        .map(|i| {
            let t = i as f64;
            let close = 100.0 + 10.0 * (t / 6.0).sin() + 3.0 * (t / 2.3).cos() + t * 0.05;
            Bar::new(
                start + Days::new(i as u64),
                close - 0.5,
                close + 1.0 + (t / 3.0).sin().abs(),
                close - 1.0 - (t / 5.0).cos().abs(),
                close,
            )
        })
        .collect()
}

#[test]
fn trains_on_derived_features() {
    let windows = WindowSpec::default();
    let rows = derive_with(&wavy_bars(200), windows).unwrap();

    let report = train(&rows, windows, TrainOptions::default()).unwrap();

    // 200 rows, the last 5 lack targets
    assert_eq!(report.train_rows + report.test_rows, 195);
    assert_eq!(report.test_rows, 39);
    assert!(report.evaluation.rmse.is_finite());
    assert!(report.evaluation.r2.is_finite());

    let p = report.model.predict([1.0, -2.0, 3.0, 2.5]);
    assert!(p.high_next_pct.is_finite() && p.low_next_pct.is_finite());
}

#[test]
fn training_is_reproducible_for_a_seed() {
    let windows = WindowSpec::new(10, 3).unwrap();
    let rows = derive_with(&wavy_bars(120), windows).unwrap();

    let a = train(&rows, windows, TrainOptions::default()).unwrap();
    let b = train(&rows, windows, TrainOptions::default()).unwrap();

    assert_eq!(a.model, b.model);
    assert_eq!(a.evaluation, b.evaluation);
}

#[test]
fn too_short_history_is_not_enough_samples() {
    let windows = WindowSpec::default();
    let rows = derive_with(&wavy_bars(6), windows).unwrap();

    let err = train(&rows, windows, TrainOptions::default()).unwrap_err();
    assert!(matches!(err, ModelError::NotEnoughSamples { .. }), "{err}");
}

#[test]
fn enriched_csv_feeds_the_model() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("enriched.csv");
    let windows = WindowSpec::default();
    let table = FeatureTable::derive(&wavy_bars(60), windows).unwrap();
    write_table_csv(&path, &table).unwrap();

    let from_file = Dataset::from_table_csv(&path, windows).unwrap();
    let in_memory = Dataset::from_enriched(&table.rows).unwrap();
    assert_eq!(from_file.len(), in_memory.len());

    let model = ExtremesModel::fit(&from_file, windows).unwrap();
    let model_path = dir.path().join("trained_model.json");
    model.save(&model_path).unwrap();
    assert_eq!(ExtremesModel::load(&model_path).unwrap(), model);
}

#[test]
fn missing_table_columns_surface_as_table_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("enriched.csv");
    let table = FeatureTable::derive(&wavy_bars(30), WindowSpec::default()).unwrap();
    write_table_csv(&path, &table).unwrap();

    let err = Dataset::from_table_csv(&path, WindowSpec::new(14, 5).unwrap()).unwrap_err();
    assert!(matches!(err, ModelError::Table(_)), "{err}");
}
