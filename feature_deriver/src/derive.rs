use chrono::NaiveDate;
use crypto_data_ingestor::{Bar, models::bar::first_unordered_index};
use thiserror::Error;
use tracing::debug;

use crate::{
    enriched::EnrichedBar,
    window::{Extreme, WindowExtreme, WindowSpec, trailing_extremes},
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeriveError {
    #[error("invalid parameter `{name}`: {value} (must be at least 1)")]
    InvalidParameter { name: &'static str, value: usize },

    #[error("bar {index} ({date}) is not after the previous bar")]
    UnorderedBars { index: usize, date: NaiveDate },

    #[error("bar {index} ({date}) has a non-finite price")]
    NonFinitePrice { index: usize, date: NaiveDate },
}

/// Derives window features for every bar.
///
/// `lookback` (`W`) and `lookahead` (`F`) must both be at least one; they are
/// checked before anything else. See [`derive_with`].
pub fn derive(
    bars: &[Bar],
    lookback: usize,
    lookahead: usize,
) -> Result<Vec<EnrichedBar>, DeriveError> {
    derive_with(bars, WindowSpec::new(lookback, lookahead)?)
}

/// Derives window features for every bar, returning one row per input bar in
/// the same order.
///
/// * Trailing extremes cover `[max(0, i - W + 1), i]`; the first `W - 1`
///   rows use whatever history exists.
/// * The days-since fields point at the most recent bar holding the extreme.
/// * Forward extremes cover `[i + 1, i + F]` and are `None` for the last `F`
///   rows.
///
/// Bars must be strictly ascending by date with finite prices.
pub fn derive_with(bars: &[Bar], windows: WindowSpec) -> Result<Vec<EnrichedBar>, DeriveError> {
    if let Some(index) = first_unordered_index(bars) {
        return Err(DeriveError::UnorderedBars {
            index,
            date: bars[index].date,
        });
    }
    if let Some(index) = bars.iter().position(|b| !is_finite_bar(b)) {
        return Err(DeriveError::NonFinitePrice {
            index,
            date: bars[index].date,
        });
    }

    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();

    let high_last = trailing_extremes(&highs, windows.lookback_nonzero(), Extreme::Max);
    let low_last = trailing_extremes(&lows, windows.lookback_nonzero(), Extreme::Min);

    // A trailing window of F bars ending at i + F is exactly [i + 1, i + F].
    let high_ahead = trailing_extremes(&highs, windows.lookahead_nonzero(), Extreme::Max);
    let low_ahead = trailing_extremes(&lows, windows.lookahead_nonzero(), Extreme::Min);
    let ahead = |series: &[WindowExtreme], i: usize| {
        series.get(i + windows.lookahead()).map(|e| e.value)
    };

    let rows: Vec<EnrichedBar> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let high = high_last[i];
            let low = low_last[i];
            let high_next = ahead(&high_ahead, i);
            let low_next = ahead(&low_ahead, i);

            EnrichedBar {
                bar: *bar,
                high_last: high.value,
                low_last: low.value,
                days_since_high_last: days_between(bars[high.index].date, bar.date),
                days_since_low_last: days_between(bars[low.index].date, bar.date),
                pct_diff_from_high_last: pct_diff(bar.close, high.value),
                pct_diff_from_low_last: pct_diff(bar.close, low.value),
                high_next,
                low_next,
                pct_diff_from_high_next: high_next.and_then(|h| pct_diff(bar.close, h)),
                pct_diff_from_low_next: low_next.and_then(|l| pct_diff(bar.close, l)),
            }
        })
        .collect();

    debug!(
        rows = rows.len(),
        lookback = windows.lookback(),
        lookahead = windows.lookahead(),
        "derived window features"
    );
    Ok(rows)
}

fn is_finite_bar(bar: &Bar) -> bool {
    [bar.open, bar.high, bar.low, bar.close]
        .iter()
        .all(|price| price.is_finite())
}

fn days_between(earlier: NaiveDate, later: NaiveDate) -> i64 {
    (later - earlier).num_days()
}

/// `(close - extreme) / extreme * 100`, or `None` when the extreme is zero
/// or the result is not finite.
pub fn pct_diff(close: f64, extreme: f64) -> Option<f64> {
    if extreme == 0.0 {
        return None;
    }
    let pct = (close - extreme) / extreme * 100.0;
    pct.is_finite().then_some(pct)
}

/// Enriched rows together with the windows that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    pub windows: WindowSpec,
    pub rows: Vec<EnrichedBar>,
}

impl FeatureTable {
    pub fn derive(bars: &[Bar], windows: WindowSpec) -> Result<Self, DeriveError> {
        Ok(Self {
            windows,
            rows: derive_with(bars, windows)?,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
