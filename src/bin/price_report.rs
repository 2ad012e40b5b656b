//! Generates one regional price report from the command line.

use anyhow::{Context, Result};
use clap::Parser;
use regional_price_scan::application::services::PriceReportService;
use regional_price_scan::config::AppConfig;
use regional_price_scan::telemetry::init_tracing;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "price_report", about = "Collect per-country prices for a store item")]
struct Args {
    /// Store listing URL or bare item id (e.g. com.example.app)
    target: String,

    /// Optional TOML configuration file
    #[arg(short, long, env = "PRICE_SCAN_CONFIG")]
    config: Option<PathBuf>,

    /// Caller id used for the request quota
    #[arg(long, default_value = "cli")]
    caller: String,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref()).context("loading configuration")?;
    config.log.json |= args.json_logs;
    init_tracing(&config.log);

    let service = PriceReportService::from_config(&config).context("building services")?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling run");
            on_signal.cancel();
        }
    });

    let outcome = service
        .generate(&args.caller, &args.target, &cancel)
        .await
        .with_context(|| format!("generating report for {}", args.target))?;

    match &outcome.result {
        Some(result) => println!("{result}"),
        None => println!("served from cache"),
    }
    println!("{}", outcome.artifact);

    let status = service.status();
    println!(
        "cached reports: {}, rates loaded: {} (as of {})",
        status.cached_reports, status.rates_loaded, status.rates_fetched_at
    );
    Ok(())
}
