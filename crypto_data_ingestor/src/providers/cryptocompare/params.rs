use chrono::NaiveTime;
use snafu::ensure;

use crate::{
    models::request_params::{BarsRequestParams, MAX_BARS_PER_REQUEST},
    providers::{ProviderError, ValidationSnafu},
};

/// Checks the request against CryptoCompare's `histoday` limits.
pub fn validate_limit(params: &BarsRequestParams) -> Result<(), ProviderError> {
    ensure!(
        (1..=MAX_BARS_PER_REQUEST).contains(&params.limit),
        ValidationSnafu {
            message: format!(
                "limit must be between 1 and {MAX_BARS_PER_REQUEST}, got {}",
                params.limit
            ),
        }
    );
    Ok(())
}

/// UNIX timestamp of midnight UTC on the request's last day.
///
/// Daily bars are stamped at 00:00 UTC, so this includes the bar for `to`.
pub fn to_timestamp(params: &BarsRequestParams) -> i64 {
    params.to.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Builds the query string for a `histoday` request.
pub fn construct_params(params: &BarsRequestParams) -> Vec<(&'static str, String)> {
    vec![
        ("fsym", params.pair.base().to_string()),
        ("tsym", params.pair.quote().to_string()),
        ("limit", params.limit.to_string()),
        ("toTs", to_timestamp(params).to_string()),
    ]
}
