//! Provider abstraction for market data sources.
//!
//! This module defines the [`DataProvider`] trait, which serves as a unified interface
//! for fetching daily bar data from any market data vendor (e.g., CryptoCompare).
//!
//! Each concrete provider implementation should implement [`DataProvider`] to handle
//! vendor-specific API logic and validation.
//!
//! The trait is designed for async usage and supports dynamic dispatch (`dyn DataProvider`)
//! for runtime selection of providers.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use crypto_data_ingestor::models::{
//!     bar::BarSeries,
//!     request_params::BarsRequestParams,
//! };
//! use crypto_data_ingestor::providers::{DataProvider, ProviderError};
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl DataProvider for MyProvider {
//!     async fn fetch_bars(
//!         &self,
//!         params: BarsRequestParams,
//!     ) -> Result<BarSeries, ProviderError> {
//!         Ok(BarSeries::new(params.pair, vec![]))
//!     }
//! }
//! ```
//!

pub mod cryptocompare;

use async_trait::async_trait;
use shared_utils::env::MissingEnvVarError;
use snafu::{Backtrace, Snafu};

use crate::models::{bar::BarSeries, request_params::BarsRequestParams};

/// Trait for fetching daily bar data from a market data provider.
#[async_trait]
pub trait DataProvider {
    /// Fetches up to `params.limit` daily bars ending at `params.to`.
    ///
    /// # Returns
    ///
    /// * `Ok(BarSeries)` - Bars in strictly ascending date order.
    /// * `Err(ProviderError)` - If the request fails or the provider reports an error.
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<BarSeries, ProviderError>;
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// missed environment variable.
    #[snafu(display("Missing environment variable: {source}"))]
    MissingEnvVar {
        source: MissingEnvVarError,
        backtrace: Backtrace,
    },

    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// API key contains invalid characters.
    #[snafu(display("Invalid API key format: {source}"))]
    InvalidApiKey {
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a `DataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout, undecodable body).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider's API reported a failure; `message` is the provider's own text.
    #[snafu(display("API error: {message}"))]
    Api {
        message: String,
        backtrace: Backtrace,
    },

    /// The request parameters were invalid for this specific provider.
    #[snafu(display("Invalid parameters for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },

    /// An internal error occurred while processing data within the provider.
    #[snafu(display("Internal provider error: {message}"))]
    Internal {
        message: String,
        backtrace: Backtrace,
    },

    /// An error during provider configuration or initialization.
    #[snafu(display("Provider initialization error: {source}"))]
    Init {
        #[snafu(backtrace)]
        source: ProviderInitError,
    },
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::*;
    use crate::models::bar::Bar;

    struct FixedProvider;
    struct FailingProvider;

    #[async_trait]
    impl DataProvider for FixedProvider {
        async fn fetch_bars(&self, params: BarsRequestParams) -> Result<BarSeries, ProviderError> {
            let bar = Bar::new(params.to, 1.0, 2.0, 0.5, 1.5);
            Ok(BarSeries::new(params.pair, vec![bar]))
        }
    }

    #[async_trait]
    impl DataProvider for FailingProvider {
        async fn fetch_bars(&self, _params: BarsRequestParams) -> Result<BarSeries, ProviderError> {
            ApiSnafu {
                message: "market does not exist for this coin pair",
            }
            .fail()
        }
    }

    // Decides at runtime which provider to hand back.
    fn get_provider(name: &str) -> Box<dyn DataProvider> {
        if name == "fixed" {
            Box::new(FixedProvider)
        } else {
            Box::new(FailingProvider)
        }
    }

    fn params() -> BarsRequestParams {
        BarsRequestParams::new(
            "BTC/USD".parse().unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_dynamic_provider() {
        let provider = get_provider("fixed");
        let series = provider.fetch_bars(params()).await.unwrap();
        assert_eq!(series.pair.to_string(), "BTC/USD");
        assert_eq!(series.bars.len(), 1);
    }

    #[tokio::test]
    async fn api_error_carries_provider_message() {
        let provider = get_provider("failing");
        let err = provider.fetch_bars(params()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Api { .. }));
        assert_eq!(
            err.to_string(),
            "API error: market does not exist for this coin pair"
        );
    }
}
