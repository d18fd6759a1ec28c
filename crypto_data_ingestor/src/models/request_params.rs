use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::pair::CurrencyPair;

/// Upper bound on the number of daily bars a single request may ask for.
pub const MAX_BARS_PER_REQUEST: u32 = 2000;

/// Parameters for requesting daily bars from any market data provider.
///
/// A request covers up to `limit` bars ending at `to` (inclusive). Longer
/// ranges are assembled by [`fetch_history`](crate::history::fetch_history),
/// which issues one request per page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BarsRequestParams {
    /// The pair to request (e.g., `BTC/USD`).
    pub pair: CurrencyPair,

    /// Most recent day to include (UTC).
    pub to: NaiveDate,

    /// Number of bars to request, counted backwards from `to`.
    ///
    /// Providers reject values outside `1..=MAX_BARS_PER_REQUEST`.
    pub limit: u32,
}

impl BarsRequestParams {
    /// A request for the largest page the provider allows.
    pub fn new(pair: CurrencyPair, to: NaiveDate) -> Self {
        Self {
            pair,
            to,
            limit: MAX_BARS_PER_REQUEST,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}
