use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{Client, header};
use secrecy::{ExposeSecret, SecretString};
use shared_utils::env::get_env_var;
use snafu::{OptionExt, ResultExt};
use tracing::{debug, warn};

use crate::{
    models::{
        bar::{Bar, BarSeries},
        request_params::BarsRequestParams,
    },
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, InternalSnafu, InvalidApiKeySnafu,
        MissingEnvVarSnafu, ProviderError, ProviderInitError, ReqwestSnafu,
        cryptocompare::{
            params::{construct_params, validate_limit},
            response::HistodayResponse,
        },
    },
};

/// Daily history endpoint.
pub const BASE_URL: &str = "https://min-api.cryptocompare.com/data/v2/histoday";

/// Environment variable holding the API key unless configured otherwise.
pub const DEFAULT_API_KEY_VAR: &str = "CRYPTO_API_KEY";

pub struct CryptoCompareProvider {
    client: Client,
    base_url: String,
    _api_key: SecretString,
}

impl CryptoCompareProvider {
    /// Creates a new CryptoCompare provider.
    ///
    /// Reads the API key from the `CRYPTO_API_KEY` environment variable.
    pub fn new() -> Result<Self, ProviderInitError> {
        Self::from_env_var(DEFAULT_API_KEY_VAR)
    }

    /// Creates a provider whose API key is read from the variable `name`.
    pub fn from_env_var(name: &str) -> Result<Self, ProviderInitError> {
        let api_key = SecretString::new(get_env_var(name).context(MissingEnvVarSnafu)?.into());
        Self::with_api_key(api_key)
    }

    pub fn with_api_key(api_key: SecretString) -> Result<Self, ProviderInitError> {
        let mut auth =
            header::HeaderValue::from_str(&format!("Apikey {}", api_key.expose_secret()))
                .context(InvalidApiKeySnafu)?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            _api_key: api_key,
        })
    }

    /// Points the provider at another host serving the same API.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Turns a decoded `histoday` payload into ascending, de-duplicated bars.
///
/// A payload whose `Response` is not `Success` becomes [`ProviderError::Api`]
/// carrying the provider's `Message`. All-zero placeholder bars are dropped.
pub fn bars_from_response(response: HistodayResponse) -> Result<Vec<Bar>, ProviderError> {
    if !response.is_success() {
        return ApiSnafu {
            message: response.message,
        }
        .fail();
    }

    let mut by_date = BTreeMap::new();
    let mut placeholders = 0usize;

    for raw in response.data.bars {
        let date = DateTime::from_timestamp(raw.time, 0)
            .context(InternalSnafu {
                message: format!("timestamp {} is out of range", raw.time),
            })?
            .date_naive();
        let bar = Bar::new(date, raw.open, raw.high, raw.low, raw.close);
        if bar.is_placeholder() {
            placeholders += 1;
            continue;
        }
        by_date.insert(date, bar);
    }

    if placeholders > 0 {
        warn!(placeholders, "dropped all-zero bars preceding the listing date");
    }

    Ok(by_date.into_values().collect())
}

#[async_trait]
impl DataProvider for CryptoCompareProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<BarSeries, ProviderError> {
        validate_limit(&params)?;

        let query_params = construct_params(&params);
        debug!(pair = %params.pair, to = %params.to, limit = params.limit, "requesting histoday");

        let response = self
            .client
            .get(self.base_url.as_str())
            .query(&query_params)
            .send()
            .await
            .context(ReqwestSnafu)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_msg = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return ApiSnafu {
                message: format!("HTTP {status}: {error_msg}"),
            }
            .fail();
        }

        let payload = response
            .json::<HistodayResponse>()
            .await
            .context(ReqwestSnafu)?;
        let bars = bars_from_response(payload)?;

        debug!(pair = %params.pair, received = bars.len(), "histoday page decoded");
        Ok(BarSeries::new(params.pair, bars))
    }
}
