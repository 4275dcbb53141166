//! CLI entry point for the odds poller.
//!
//! Provides subcommands for listing the available sports and for polling
//! odds for one sport on a schedule, flattening the response into CSV rows.

mod infra;
mod services;

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::infra::theoddsapi::client::TheOddsApiClient;
use crate::services::odds_api::OddsApi;
use odds_poller::{
    fetch::{BasicClient, auth::UrlParam},
    keys::{FileRotationStore, KeyPool, KeyRotator},
    output::append_records,
    rows::flatten_events,
};

#[derive(Parser)]
#[command(name = "odds_poller")]
#[command(about = "Polls The Odds API and archives flattened odds as CSV", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the sport catalog and save it as CSV
    ListSports {
        /// CSV file to write the catalog to
        #[arg(short, long, default_value = "data/sports_list.csv")]
        output: String,
    },
    /// Poll odds for one sport and append flattened rows to timestamped CSVs
    FetchOdds {
        /// Sport key, e.g. americanfootball_ncaaf or basketball_ncaab
        #[arg(short, long, default_value = "americanfootball_ncaaf")]
        sport: String,

        /// Comma-separated regions: us, uk, eu, au
        #[arg(short, long, default_value = "us")]
        region: String,

        /// Comma-separated markets: h2h, spreads, totals, outrights
        #[arg(short, long, default_value = "h2h,spreads,totals")]
        markets: String,

        /// Directory to save CSV files under (one subdirectory per sport)
        #[arg(short, long, default_value = "data")]
        output_dir: String,

        /// Sample rate: query the API every X seconds
        #[arg(short = 'r', long, default_value_t = 60)]
        sample_rate: u64,

        /// Number of samples to collect (0 = infinite)
        #[arg(short = 'n', long, default_value_t = 1)]
        num_samples: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/odds_poller.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("odds_poller.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ListSports { output } => {
            list_sports(&output).await?;
        }
        Commands::FetchOdds {
            sport,
            region,
            markets,
            output_dir,
            sample_rate,
            num_samples,
        } => {
            fetch_odds(&sport, &region, &markets, &output_dir, sample_rate, num_samples).await?;
        }
    }

    Ok(())
}

/// Path of the rotation state file, shared by every scheduled invocation.
fn state_file() -> String {
    std::env::var("ODDS_STATE_FILE").unwrap_or_else(|_| ".api_state.json".to_string())
}

/// Takes one key from the rotation and wraps a fresh HTTP client with it.
///
/// The cursor advance is persisted before this returns; a persistence
/// failure aborts the invocation so no request is ever issued with an
/// unrecorded rotation state.
fn rotated_client() -> Result<TheOddsApiClient<UrlParam<BasicClient>>> {
    let store = FileRotationStore::new(state_file());
    let mut rotator = KeyRotator::new(KeyPool::from_env(), store)?;
    let key = rotator.next_key()?;

    let http = UrlParam::api_key(BasicClient::new(), key);
    Ok(TheOddsApiClient::new(http))
}

#[tracing::instrument(fields(output))]
async fn list_sports(output: &str) -> Result<()> {
    let api = rotated_client()?;
    let sports = api.list_sports().await?;

    let active = sports.iter().filter(|s| s.active).count();
    info!(total = sports.len(), active, "Sport catalog fetched");

    append_records(output, &sports)?;
    info!(rows = sports.len(), path = output, "Sport catalog saved");

    Ok(())
}

/// Polls odds for `sport`, collecting samples at a configurable interval.
///
/// Each round takes a freshly rotated key, so overlapping cron schedules and
/// long-running sample loops draw from the same persisted rotation.
#[tracing::instrument(skip(markets), fields(sport, region, output_dir, sample_rate, num_samples))]
async fn fetch_odds(
    sport: &str,
    region: &str,
    markets: &str,
    output_dir: &str,
    sample_rate: u64,
    num_samples: usize,
) -> Result<()> {
    if num_samples == 0 {
        info!(sample_rate, "Sampling infinitely. Press Ctrl+C to stop.");
    } else {
        info!(num_samples, sample_rate, "Starting sample collection");
    }

    let mut sample_count = 0;

    loop {
        if num_samples > 0 && sample_count >= num_samples {
            break;
        }
        sample_count += 1;

        info!(
            sample = sample_count,
            total = if num_samples == 0 {
                None
            } else {
                Some(num_samples)
            },
            "Starting sample round"
        );

        // Rotation failures are fatal; fetch and parse failures are
        // recoverable and retried on the next round.
        let api = rotated_client()?;

        let query_time = Local::now().format("%Y%m%d%H%M%S%6f").to_string();

        match api.fetch_odds(sport, region, markets).await {
            Ok(events) => {
                let rows = flatten_events(&events, &query_time);
                let output_file = format!("{}/{}/{}.csv", output_dir, sport, query_time);

                if let Err(e) = append_records(&output_file, &rows) {
                    error!(error = %e, path = %output_file, "Failed to write odds rows");
                } else {
                    info!(
                        events = events.len(),
                        rows = rows.len(),
                        path = %output_file,
                        "Sample saved"
                    );
                }
            }
            Err(e) => {
                error!(error = %e, "Odds fetch failed, skipping round");
            }
        }

        if num_samples == 0 || sample_count < num_samples {
            info!(sample_rate, "Waiting before next sample");
            tokio::time::sleep(tokio::time::Duration::from_secs(sample_rate)).await;
        }
    }

    info!(output_dir, "Finished sample collection");
    Ok(())
}
