//! Daily price history for cryptocurrency pairs.
//!
//! The crate exposes a vendor-agnostic [`providers::DataProvider`] trait, the
//! CryptoCompare implementation of it, multi-page history retrieval on top of
//! that trait, and CSV persistence for the fetched bars.

pub mod history;
pub mod io;
pub mod models;
pub mod providers;

pub use history::fetch_history;
pub use models::{
    bar::{Bar, BarSeries},
    pair::CurrencyPair,
    request_params::BarsRequestParams,
};
