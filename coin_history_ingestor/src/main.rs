use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use coin_history_ingestor::{
    cli::{
        commands::{Cli, Commands},
        params::describe_failures,
    },
    config::IngestorConfig,
    io::{file::JsonFileSink, store::StoreSink},
    providers::coingecko_rest::CoinGeckoProvider,
    requests::historical::{BatchScheduler, DispatchMode, JobRunner},
};
use secrecy::ExposeSecret;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = IngestorConfig::load(cli.config.as_deref()).context("loading configuration")?;

    let provider =
        CoinGeckoProvider::from_config(&config).context("building the history provider")?;
    let mut runner = JobRunner::new(Arc::new(provider), JsonFileSink::new(&config.data_dir));

    if cli.command.load_to_db() {
        let url = config.require_database_url()?;
        let store = StoreSink::connect(url.expose_secret()).context("opening the database")?;
        runner = runner.with_store(store);
    }

    let scheduler = BatchScheduler::new(
        Arc::new(runner),
        config.request_delay(),
        config.concurrency(),
    );

    let summary = match cli.command {
        Commands::Fetch { date, coin, .. } => scheduler.run_single(&coin, date).await,
        Commands::BulkFetch {
            start_date,
            end_date,
            coin,
            concurrent,
            unthrottled,
            ..
        } => {
            let mode = if concurrent {
                DispatchMode::Concurrent { unthrottled }
            } else {
                DispatchMode::Sequential
            };
            scheduler.run_range(&coin, start_date, end_date, mode).await
        }
    };

    if !summary.all_succeeded() {
        for line in describe_failures(&summary.failed_jobs) {
            warn!("failed: {line}");
        }
    }
    info!(data_dir = %config.data_dir.display(), "done");
    println!("{summary}");

    Ok(())
}
