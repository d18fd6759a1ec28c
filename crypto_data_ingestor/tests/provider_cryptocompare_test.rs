use chrono::{Duration, Utc};
use crypto_data_ingestor::{
    fetch_history,
    models::{pair::CurrencyPair, request_params::BarsRequestParams},
    providers::{DataProvider, ProviderError, cryptocompare::CryptoCompareProvider},
};
use serial_test::serial;

fn live_provider() -> Option<CryptoCompareProvider> {
    dotenvy::dotenv().ok();
    // This test requires CRYPTO_API_KEY to be set in the environment.
    if std::env::var("CRYPTO_API_KEY").is_err() {
        println!("Skipping live CryptoCompare test: CRYPTO_API_KEY not set.");
        return None;
    }
    Some(CryptoCompareProvider::new().expect("Failed to create CryptoCompareProvider"))
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_cryptocompare_fetch_bars() {
    let Some(provider) = live_provider() else {
        return;
    };

    let pair: CurrencyPair = "BTC/USD".parse().unwrap();
    let to = (Utc::now() - Duration::days(1)).date_naive();
    let params = BarsRequestParams::new(pair.clone(), to).with_limit(10);

    let result = provider.fetch_bars(params).await;
    assert!(result.is_ok(), "fetch_bars returned an error: {:?}", result.err());

    let series = result.unwrap();
    assert_eq!(series.pair, pair);
    assert!(!series.bars.is_empty(), "Expected to fetch at least one bar for BTC/USD");
    assert!(series.validate_ordering().is_ok());
    assert_eq!(series.bars.last().unwrap().date, to);
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_cryptocompare_unknown_pair_is_an_api_error() {
    let Some(provider) = live_provider() else {
        return;
    };

    let pair: CurrencyPair = "NOTACOIN123/USD".parse().unwrap();
    let to = Utc::now().date_naive();
    let err = provider
        .fetch_bars(BarsRequestParams::new(pair, to).with_limit(5))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Api { .. }), "unexpected error: {err:?}");
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_cryptocompare_history_spans_pages() {
    let Some(provider) = live_provider() else {
        return;
    };

    let pair: CurrencyPair = "ETH/USD".parse().unwrap();
    let end = (Utc::now() - Duration::days(1)).date_naive();
    let start = end - Duration::days(2500);

    let series = fetch_history(&provider, &pair, start, end).await.unwrap();
    assert!(series.len() > 2000, "expected more than one page, got {}", series.len());
    assert!(series.validate_ordering().is_ok());
}
