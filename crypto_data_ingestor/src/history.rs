//! Multi-page history retrieval.
//!
//! A single [`DataProvider::fetch_bars`] call is capped at
//! [`MAX_BARS_PER_REQUEST`] bars ending at a given day. [`fetch_history`]
//! walks backwards page by page until the requested start date is covered
//! or the provider runs out of older data.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use snafu::ensure;
use tracing::{debug, info};

use crate::{
    models::{
        bar::{Bar, BarSeries},
        pair::CurrencyPair,
        request_params::{BarsRequestParams, MAX_BARS_PER_REQUEST},
    },
    providers::{DataProvider, ProviderError, ValidationSnafu},
};

/// Fetches every available daily bar of `pair` in `[start, end]`.
///
/// The result is ascending, one bar per day, and trimmed to the range. Days
/// the provider has no data for are simply absent.
pub async fn fetch_history<P>(
    provider: &P,
    pair: &CurrencyPair,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<BarSeries, ProviderError>
where
    P: DataProvider + ?Sized,
{
    ensure!(
        start <= end,
        ValidationSnafu {
            message: format!("start date {start} is after end date {end}"),
        }
    );

    let mut collected: BTreeMap<NaiveDate, Bar> = BTreeMap::new();
    let mut to = end;
    let mut pages = 0usize;

    loop {
        let remaining = (to - start).num_days() + 1;
        let limit = remaining.clamp(1, i64::from(MAX_BARS_PER_REQUEST)) as u32;
        let params = BarsRequestParams::new(pair.clone(), to).with_limit(limit);

        let page = provider.fetch_bars(params).await?;
        let Some(oldest) = page.bars.first().map(|bar| bar.date) else {
            debug!(%pair, %to, "provider returned no older bars");
            break;
        };
        pages += 1;
        debug!(%pair, %oldest, %to, received = page.bars.len(), "history page");
        collected.extend(page.bars.into_iter().map(|bar| (bar.date, bar)));

        if oldest <= start {
            break;
        }
        match oldest.pred_opt() {
            // Guards against a provider that ignores `to` and keeps
            // returning the same page.
            Some(previous) if previous < to => to = previous,
            _ => break,
        }
    }

    let bars: Vec<Bar> = collected
        .into_values()
        .filter(|bar| (start..=end).contains(&bar.date))
        .collect();

    info!(%pair, %start, %end, pages, bars = bars.len(), "fetched price history");
    Ok(BarSeries::new(pair.clone(), bars))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    /// Serves bars from memory, never more than `page_size` per call.
    struct InMemoryProvider {
        bars: Vec<Bar>,
        page_size: usize,
        calls: AtomicUsize,
    }

    impl InMemoryProvider {
        fn daily(first: NaiveDate, days: usize, page_size: usize) -> Self {
            let bars = first
                .iter_days()
                .take(days)
                .enumerate()
                .map(|(i, date)| {
                    let price = 100.0 + i as f64;
                    Bar::new(date, price, price + 1.0, price - 1.0, price + 0.5)
                })
                .collect();
            Self {
                bars,
                page_size,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DataProvider for InMemoryProvider {
        async fn fetch_bars(&self, params: BarsRequestParams) -> Result<BarSeries, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let upto: Vec<Bar> = self
                .bars
                .iter()
                .copied()
                .filter(|bar| bar.date <= params.to)
                .collect();
            let take = (params.limit as usize).min(self.page_size);
            let skip = upto.len().saturating_sub(take);
            Ok(BarSeries::new(params.pair, upto[skip..].to_vec()))
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn pair() -> CurrencyPair {
        "BTC/USD".parse().unwrap()
    }

    #[tokio::test]
    async fn walks_back_over_several_pages() {
        let provider = InMemoryProvider::daily(date(2023, 1, 1), 365, 30);

        let series = fetch_history(&provider, &pair(), date(2023, 2, 1), date(2023, 6, 30))
            .await
            .unwrap();

        assert_eq!(series.bars.first().unwrap().date, date(2023, 2, 1));
        assert_eq!(series.bars.last().unwrap().date, date(2023, 6, 30));
        assert_eq!(series.len(), 150);
        assert!(series.validate_ordering().is_ok());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn stops_when_provider_runs_out_of_history() {
        let provider = InMemoryProvider::daily(date(2023, 3, 1), 40, 25);

        let series = fetch_history(&provider, &pair(), date(2023, 1, 1), date(2023, 4, 30))
            .await
            .unwrap();

        assert_eq!(series.len(), 40);
        assert_eq!(series.bars.first().unwrap().date, date(2023, 3, 1));
        // two pages with data, one empty page
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn single_day_range() {
        let provider = InMemoryProvider::daily(date(2023, 1, 1), 10, 2000);

        let series = fetch_history(&provider, &pair(), date(2023, 1, 5), date(2023, 1, 5))
            .await
            .unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series.bars[0].date, date(2023, 1, 5));
    }

    #[tokio::test]
    async fn inverted_range_is_rejected() {
        let provider = InMemoryProvider::daily(date(2023, 1, 1), 10, 10);

        let err = fetch_history(&provider, &pair(), date(2023, 2, 1), date(2023, 1, 1))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Validation { .. }));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}
