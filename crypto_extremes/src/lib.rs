//! Wiring for the fetch, derive and train stages behind the `crypto-extremes`
//! command line tool.

pub mod config;
pub mod pipeline;

pub use config::{RunConfig, RunPlan};
