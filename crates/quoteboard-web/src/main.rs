mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use quoteboard_core::{
    AlphaVantageAdapter, AppConfig, CachedSource, FetchCache, RequestOrchestrator,
};
use quoteboard_web::{router, AppState};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::{Cli, CliError, Command, ServeArgs};

const DEFAULT_LOG_FILTER: &str = "quoteboard=info,tower_http=info";

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging()?;

    match cli.command {
        Command::Serve(args) => serve(args).await,
    }
}

fn init_logging() -> Result<(), CliError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))
}

async fn serve(args: ServeArgs) -> Result<(), CliError> {
    let config = args.apply(AppConfig::from_env()?);

    let source = CachedSource::new(
        AlphaVantageAdapter::from_config(&config),
        FetchCache::new(config.cache_capacity),
    );
    let state = AppState::new(RequestOrchestrator::new(Arc::new(source)));
    let app = router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(
        addr = %listener.local_addr()?,
        cache_capacity = config.cache_capacity,
        rate_limit_per_minute = config.rate_limit_per_minute,
        overview = config.fetch_overview,
        "quoteboard listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("quoteboard stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("ctrl-c handler unavailable; shutdown only on process exit");
        std::future::pending::<()>().await;
    }
}
