//! Feature/target matrices built from enriched rows, and the train/test split.

use std::path::Path;

use feature_deriver::table::read_table_csv;
use feature_deriver::{Column, EnrichedBar, WindowSpec};
use ndarray::{Array2, Axis};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::error::ModelError;

/// Model inputs, in column order of the feature matrix.
pub const FEATURES: [Column; 4] = [
    Column::DaysSinceHighLast,
    Column::PctDiffFromHighLast,
    Column::DaysSinceLowLast,
    Column::PctDiffFromLowLast,
];

/// Model outputs, in column order of the target matrix.
pub const TARGETS: [Column; 2] = [Column::PctDiffFromHighNext, Column::PctDiffFromLowNext];

/// Row-aligned feature (`n x 4`) and target (`n x 2`) matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub features: Array2<f64>,
    pub targets: Array2<f64>,
}

impl Dataset {
    /// Keeps only the rows where every feature and both targets are present.
    pub fn from_enriched(rows: &[EnrichedBar]) -> Result<Self, ModelError> {
        let mut features = Vec::with_capacity(rows.len() * FEATURES.len());
        let mut targets = Vec::with_capacity(rows.len() * TARGETS.len());
        let mut kept = 0;

        for row in rows {
            let Some(x) = collect(row, &FEATURES) else {
                continue;
            };
            let Some(y) = collect(row, &TARGETS) else {
                continue;
            };
            features.extend(x);
            targets.extend(y);
            kept += 1;
        }

        debug!(total = rows.len(), kept, "selected training rows");
        Ok(Self {
            features: Array2::from_shape_vec((kept, FEATURES.len()), features)?,
            targets: Array2::from_shape_vec((kept, TARGETS.len()), targets)?,
        })
    }

    /// Reads an enriched CSV table and selects its complete rows.
    pub fn from_table_csv(path: impl AsRef<Path>, windows: WindowSpec) -> Result<Self, ModelError> {
        let table = read_table_csv(path, windows)?;
        Self::from_enriched(&table.rows)
    }

    pub fn len(&self) -> usize {
        self.features.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn select(&self, indices: &[usize]) -> Self {
        Self {
            features: self.features.select(Axis(0), indices),
            targets: self.targets.select(Axis(0), indices),
        }
    }
}

fn collect<const N: usize>(row: &EnrichedBar, columns: &[Column; N]) -> Option<[f64; N]> {
    let mut out = [0.0; N];
    for (slot, column) in out.iter_mut().zip(columns) {
        *slot = row.value(*column).filter(|v| v.is_finite())?;
    }
    Some(out)
}

/// Shuffles row indices with a seeded RNG and holds out `ceil(n * test_fraction)`
/// of them for testing. Returns `(train, test)`; both are non-empty.
pub fn train_test_split(
    dataset: &Dataset,
    test_fraction: f64,
    seed: u64,
) -> Result<(Dataset, Dataset), ModelError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(ModelError::InvalidTestFraction(test_fraction));
    }
    let n = dataset.len();
    if n < 2 {
        return Err(ModelError::NotEnoughSamples { needed: 2, found: n });
    }

    let n_test = ((n as f64 * test_fraction).ceil() as usize).clamp(1, n - 1);
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test, train) = indices.split_at(n_test);
    Ok((dataset.select(train), dataset.select(test)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crypto_data_ingestor::Bar;

    fn row(day: u32, features: [Option<f64>; 4], targets: [Option<f64>; 2]) -> EnrichedBar {
        let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        EnrichedBar {
            bar: Bar::new(date, 1.0, 1.0, 1.0, 1.0),
            high_last: 1.0,
            low_last: 1.0,
            days_since_high_last: features[0].unwrap_or_default() as i64,
            days_since_low_last: features[2].unwrap_or_default() as i64,
            pct_diff_from_high_last: features[1],
            pct_diff_from_low_last: features[3],
            high_next: targets[0].map(|_| 1.0),
            low_next: targets[1].map(|_| 1.0),
            pct_diff_from_high_next: targets[0],
            pct_diff_from_low_next: targets[1],
        }
    }

    fn dataset(n: usize) -> Dataset {
        let features = Array2::from_shape_fn((n, 4), |(i, j)| (i * 4 + j) as f64);
        let targets = Array2::from_shape_fn((n, 2), |(i, j)| (i * 2 + j) as f64);
        Dataset { features, targets }
    }

    #[test]
    fn rows_with_absent_values_are_dropped() {
        let rows = [
            row(1, [Some(0.0), Some(-1.0), Some(2.0), Some(3.0)], [Some(4.0), Some(-5.0)]),
            row(2, [Some(1.0), None, Some(0.0), Some(1.0)], [Some(1.0), Some(1.0)]),
            row(3, [Some(2.0), Some(-2.0), Some(1.0), Some(2.0)], [None, None]),
            row(4, [Some(3.0), Some(-3.0), Some(2.0), Some(6.0)], [Some(2.0), Some(-1.0)]),
        ];

        let ds = Dataset::from_enriched(&rows).unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.features.row(0).to_vec(), vec![0.0, -1.0, 2.0, 3.0]);
        assert_eq!(ds.targets.row(1).to_vec(), vec![2.0, -1.0]);
    }

    #[test]
    fn empty_input_gives_empty_dataset() {
        let ds = Dataset::from_enriched(&[]).unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.features.ncols(), 4);
    }

    #[test]
    fn split_sizes_use_ceiling() {
        let (train, test) = train_test_split(&dataset(11), 0.2, 42).unwrap();
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 8);
    }

    #[test]
    fn split_is_deterministic_and_partitions_rows() {
        let ds = dataset(20);
        let (train_a, test_a) = train_test_split(&ds, 0.2, 42).unwrap();
        let (train_b, test_b) = train_test_split(&ds, 0.2, 42).unwrap();
        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);

        // first feature column is 4 * original row index
        let mut seen: Vec<usize> = train_a
            .features
            .column(0)
            .iter()
            .chain(test_a.features.column(0).iter())
            .map(|v| *v as usize / 4)
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn split_rejects_bad_fraction_and_tiny_datasets() {
        assert!(matches!(
            train_test_split(&dataset(10), 1.0, 42),
            Err(ModelError::InvalidTestFraction(_))
        ));
        assert!(matches!(
            train_test_split(&dataset(10), 0.0, 42),
            Err(ModelError::InvalidTestFraction(_))
        ));
        assert!(matches!(
            train_test_split(&dataset(1), 0.2, 42),
            Err(ModelError::NotEnoughSamples { needed: 2, found: 1 })
        ));
    }
}
