use chrono::Utc;
use clap::{Parser, ValueEnum};
use kma_collector::{
    Collector, CollectorConfig, CollectorError, CsvArchiveStore, ForecastKind,
    KmaForecastClient, RegionList, RunOutcome,
};
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    UltraShort,
    ShortTerm,
    All,
}

/// Collects KMA village forecasts for every grid cell of a region list into
/// monthly CSV archives. Meant to be run by a scheduler, once per hour.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Forecast product to collect
    #[arg(long, value_enum, default_value = "ultra-short")]
    kind: KindArg,

    /// Region list CSV with the grid X/Y columns
    #[arg(long)]
    regions: PathBuf,

    /// Root directory of the monthly archives
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Decoded service key of the public data portal
    #[arg(long, env = "KMA_SERVICE_KEY", hide_env_values = true)]
    service_key: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Rows requested per call
    #[arg(long, default_value_t = 1000)]
    page_size: u32,

    /// Offset of the service's local time from UTC, in hours
    #[arg(long, default_value_t = 9, allow_negative_numbers = true)]
    utc_offset_hours: i32,

    /// Show a progress bar over the grid cells
    #[arg(long)]
    progress: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every requested kind finished without a fatal error.
async fn run(cli: Cli) -> Result<bool, CollectorError> {
    let config = CollectorConfig::builder()
        .service_key(cli.service_key)
        .data_dir(cli.data_dir)
        .request_timeout(Duration::from_secs(cli.timeout_secs))
        .page_size(cli.page_size)
        .utc_offset_hours(cli.utc_offset_hours)
        .show_progress(cli.progress)
        .build();

    let regions = RegionList::load(&cli.regions, &config.region_columns).await?;
    let client = KmaForecastClient::new(&config)?;
    let store = CsvArchiveStore::new(config.data_dir.clone());
    let collector = Collector::new(client, store, &regions, &config);

    let now = Utc::now().with_timezone(&config.utc_offset());
    let outcomes = match cli.kind {
        KindArg::UltraShort => vec![(
            ForecastKind::UltraShort,
            collector.run(ForecastKind::UltraShort, &now).await,
        )],
        KindArg::ShortTerm => vec![(
            ForecastKind::ShortTerm,
            collector.run(ForecastKind::ShortTerm, &now).await,
        )],
        KindArg::All => collector.run_all(&now).await,
    };

    let mut all_ok = true;
    for (kind, outcome) in outcomes {
        match outcome {
            Ok(RunOutcome::Completed(report)) => info!("{}", report),
            Ok(RunOutcome::OutsidePublicationWindow { hour, .. }) => {
                info!("No {} collection at hour {:02}", kind, hour)
            }
            Err(e) => {
                error!("{} run failed: {}", kind, e);
                all_ok = false;
            }
        }
    }
    Ok(all_ok)
}
