//! Currency pair parsing (`"BASE/QUOTE"`).

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a pair string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairParseError {
    #[error("expected a pair in the form BASE/QUOTE, got {0:?}")]
    Format(String),

    #[error("symbol {0:?} must be non-empty and alphanumeric")]
    Symbol(String),
}

/// A base/quote pair such as `BTC/USD`.
///
/// Symbols are stored upper-cased; `"btc / usd"` and `"BTC/USD"` are the same pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyPair {
    base: String,
    quote: String,
}

impl CurrencyPair {
    pub fn new(base: &str, quote: &str) -> Result<Self, PairParseError> {
        Ok(Self {
            base: normalize_symbol(base)?,
            quote: normalize_symbol(quote)?,
        })
    }

    /// The asset being priced (CryptoCompare's `fsym`).
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The currency the price is expressed in (CryptoCompare's `tsym`).
    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// File-system friendly form, e.g. `BTC_USD`.
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.base, self.quote)
    }
}

fn normalize_symbol(raw: &str) -> Result<String, PairParseError> {
    let symbol = raw.trim();
    if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(PairParseError::Symbol(raw.to_string()));
    }
    Ok(symbol.to_ascii_uppercase())
}

impl FromStr for CurrencyPair {
    type Err = PairParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(base), Some(quote), None) => Self::new(base, quote),
            _ => Err(PairParseError::Format(s.to_string())),
        }
    }
}

impl TryFrom<String> for CurrencyPair {
    type Error = PairParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyPair> for String {
    fn from(pair: CurrencyPair) -> Self {
        pair.to_string()
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes() {
        let pair: CurrencyPair = " btc / usd ".parse().unwrap();
        assert_eq!(pair.base(), "BTC");
        assert_eq!(pair.quote(), "USD");
        assert_eq!(pair.to_string(), "BTC/USD");
        assert_eq!(pair.file_stem(), "BTC_USD");
    }

    #[test]
    fn rejects_malformed_pairs() {
        assert!(matches!(
            "BTCUSD".parse::<CurrencyPair>(),
            Err(PairParseError::Format(_))
        ));
        assert!(matches!(
            "BTC/USD/EUR".parse::<CurrencyPair>(),
            Err(PairParseError::Format(_))
        ));
        assert!(matches!(
            "/USD".parse::<CurrencyPair>(),
            Err(PairParseError::Symbol(_))
        ));
        assert!(matches!(
            "BTC/US-D".parse::<CurrencyPair>(),
            Err(PairParseError::Symbol(_))
        ));
    }

    #[test]
    fn serde_uses_the_display_form() {
        let pair: CurrencyPair = serde_json::from_str("\"eth/btc\"").unwrap();
        assert_eq!(pair, CurrencyPair::new("ETH", "BTC").unwrap());
        assert_eq!(serde_json::to_string(&pair).unwrap(), "\"ETH/BTC\"");
        assert!(serde_json::from_str::<CurrencyPair>("\"ETHBTC\"").is_err());
    }
}
