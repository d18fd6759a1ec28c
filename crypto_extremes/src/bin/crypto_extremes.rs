use std::path::PathBuf;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use crypto_data_ingestor::providers::cryptocompare::CryptoCompareProvider;
use crypto_extremes::{RunConfig, RunPlan, pipeline};
use extremes_model::TrainingReport;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    version,
    about = "Fetch daily crypto prices, derive window features and fit an extremes model"
)]
struct Cli {
    /// Optional TOML run configuration
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    cmd: Option<Cmd>,
}

/// Command line values take precedence over the config file.
#[derive(Args)]
struct Overrides {
    /// Currency pair, e.g. "BTC/USD"
    #[arg(long, global = true)]
    pair: Option<String>,
    #[arg(long, global = true, value_name = "YYYY-MM-DD")]
    start_date: Option<NaiveDate>,
    #[arg(long, global = true, value_name = "YYYY-MM-DD")]
    end_date: Option<NaiveDate>,
    /// Trailing window size in bars
    #[arg(long, global = true)]
    lookback: Option<usize>,
    /// Forward window size in bars
    #[arg(long, global = true)]
    lookahead: Option<usize>,
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[arg(long, global = true)]
    model_path: Option<PathBuf>,
}

impl Overrides {
    fn apply(self, config: &mut RunConfig) {
        if let Some(pair) = self.pair {
            config.pair = pair;
        }
        if let Some(start) = self.start_date {
            config.start_date = start;
        }
        if self.end_date.is_some() {
            config.end_date = self.end_date;
        }
        if let Some(w) = self.lookback {
            config.lookback = w;
        }
        if let Some(f) = self.lookahead {
            config.lookahead = f;
        }
        if let Some(dir) = self.data_dir {
            config.data_dir = dir;
        }
        if let Some(path) = self.model_path {
            config.model_path = path;
        }
    }
}

#[derive(Subcommand)]
enum Cmd {
    /// Fetch daily bars and write them to the data directory
    Fetch,
    /// Derive window features from previously fetched bars
    Derive {
        /// Fetch the bars first instead of reading them from disk
        #[arg(long)]
        fetch: bool,
    },
    /// Train the model on a previously derived feature table
    Train,
    /// Predict forward extremes from four feature values
    Predict {
        /// Days since high, % from high, days since low, % from low
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        features: Vec<f64>,
    },
    /// Fetch, derive and train (default)
    Run,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn provider(plan: &RunPlan) -> Result<CryptoCompareProvider> {
    Ok(CryptoCompareProvider::from_env_var(&plan.api_key_env)?)
}

fn print_report(report: &TrainingReport) {
    println!("Model Metrics:");
    println!("  RMSE:     {:.6}", report.evaluation.rmse);
    println!("  R2_Score: {:.6}", report.evaluation.r2);
    for score in &report.evaluation.per_target {
        println!("  {}: RMSE {:.6}, R2 {:.6}", score.target, score.rmse, score.r2);
    }
    println!(
        "  trained on {} rows, tested on {} rows",
        report.train_rows, report.test_rows
    );
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    cli.overrides.apply(&mut config);
    let plan = config.validate(Utc::now().date_naive())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    match cli.cmd.unwrap_or(Cmd::Run) {
        Cmd::Fetch => {
            let provider = provider(&plan)?;
            let (_, path) = runtime.block_on(pipeline::fetch(&provider, &plan))?;
            println!("{}", path.display());
        }
        Cmd::Derive { fetch } => {
            let series = if fetch {
                let provider = provider(&plan)?;
                runtime.block_on(pipeline::fetch(&provider, &plan))?.0
            } else {
                pipeline::load_bars(&plan)?
            };
            let (_, path) = pipeline::derive(&plan, &series)?;
            println!("{}", path.display());
        }
        Cmd::Train => {
            let table = pipeline::load_table(&plan)?;
            let report = pipeline::train_model(&plan, &table)?;
            print_report(&report);
        }
        Cmd::Predict { features } => {
            let p = pipeline::predict(&plan.model_path, &features)?;
            println!("Predicted Outcomes:");
            println!("  % from next high: {:.6}", p.high_next_pct);
            println!("  % from next low:  {:.6}", p.low_next_pct);
        }
        Cmd::Run => {
            let provider = provider(&plan)?;
            let report = runtime.block_on(pipeline::run(&provider, &plan))?;
            print_report(&report);
        }
    }

    Ok(())
}
