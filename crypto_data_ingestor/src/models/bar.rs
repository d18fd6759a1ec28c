//! Canonical in-memory representation of a daily price bar (OHLC).
//!
//! This struct is the standard output of every
//! [`DataProvider`](crate::providers::DataProvider) implementation and the
//! input of the feature derivation stage.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::pair::CurrencyPair;

/// A single daily bar.
///
/// The serde names match the CSV layout used across the workspace
/// (`Date,Open,High,Low,Close`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// The UTC calendar day this bar covers.
    #[serde(rename = "Date")]
    pub date: NaiveDate,

    /// Opening price.
    #[serde(rename = "Open")]
    pub open: f64,

    /// Highest price during the day.
    #[serde(rename = "High")]
    pub high: f64,

    /// Lowest price during the day.
    #[serde(rename = "Low")]
    pub low: f64,

    /// Closing price.
    #[serde(rename = "Close")]
    pub close: f64,
}

impl Bar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
        }
    }

    /// Providers pad the history of a pair with all-zero bars for the days
    /// before it was listed.
    pub fn is_placeholder(&self) -> bool {
        self.open == 0.0 && self.high == 0.0 && self.low == 0.0 && self.close == 0.0
    }
}

/// Returns the index of the first bar whose date is not strictly after the
/// date of its predecessor, or `None` if the slice is strictly ascending.
pub fn first_unordered_index(bars: &[Bar]) -> Option<usize> {
    bars.windows(2)
        .position(|pair| pair[1].date <= pair[0].date)
        .map(|i| i + 1)
}

/// Represents the daily history of a single currency pair.
///
/// Bars are kept in strictly ascending date order, one per represented day.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    /// The pair this data represents (e.g., `BTC/USD`).
    pub pair: CurrencyPair,
    /// The collection of daily bars, oldest first.
    pub bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(pair: CurrencyPair, bars: Vec<Bar>) -> Self {
        Self { pair, bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Checks the ascending-date invariant, reporting the offending index.
    pub fn validate_ordering(&self) -> Result<(), usize> {
        match first_unordered_index(&self.bars) {
            Some(index) => Err(index),
            None => Ok(()),
        }
    }
}
