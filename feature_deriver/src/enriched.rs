use crypto_data_ingestor::Bar;

use crate::table::Column;

/// A bar together with its backward- and forward-looking window features.
///
/// Built once by [`derive`](crate::derive::derive) and never mutated. Fields
/// that cannot be computed hold `None`: percentage distances from a zero
/// extreme, and every forward field of the last `F` bars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnrichedBar {
    pub bar: Bar,

    /// Highest high over the trailing window.
    pub high_last: f64,
    /// Lowest low over the trailing window.
    pub low_last: f64,
    /// Calendar days since the trailing high was last attained.
    pub days_since_high_last: i64,
    /// Calendar days since the trailing low was last attained.
    pub days_since_low_last: i64,
    pub pct_diff_from_high_last: Option<f64>,
    pub pct_diff_from_low_last: Option<f64>,

    /// Highest high over the next `F` bars.
    pub high_next: Option<f64>,
    /// Lowest low over the next `F` bars.
    pub low_next: Option<f64>,
    pub pct_diff_from_high_next: Option<f64>,
    pub pct_diff_from_low_next: Option<f64>,
}

impl EnrichedBar {
    /// Reads one column of the row as a number; `None` if the value is absent.
    pub fn value(&self, column: Column) -> Option<f64> {
        match column {
            Column::Date => None,
            Column::Open => Some(self.bar.open),
            Column::High => Some(self.bar.high),
            Column::Low => Some(self.bar.low),
            Column::Close => Some(self.bar.close),
            Column::HighLast => Some(self.high_last),
            Column::LowLast => Some(self.low_last),
            Column::DaysSinceHighLast => Some(self.days_since_high_last as f64),
            Column::DaysSinceLowLast => Some(self.days_since_low_last as f64),
            Column::PctDiffFromHighLast => self.pct_diff_from_high_last,
            Column::PctDiffFromLowLast => self.pct_diff_from_low_last,
            Column::HighNext => self.high_next,
            Column::LowNext => self.low_next,
            Column::PctDiffFromHighNext => self.pct_diff_from_high_next,
            Column::PctDiffFromLowNext => self.pct_diff_from_low_next,
        }
    }

    /// Whether both forward-looking distances are present.
    pub fn has_targets(&self) -> bool {
        self.pct_diff_from_high_next.is_some() && self.pct_diff_from_low_next.is_some()
    }
}
