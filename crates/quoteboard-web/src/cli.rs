//! Command-line interface for the `quoteboard` binary.
//!
//! Flags override the matching environment variables:
//!
//! | Flag | Variable |
//! |------|----------|
//! | `--bind` | `QUOTEBOARD_BIND` |
//! | `--static-dir` | `QUOTEBOARD_STATIC_DIR` |
//! | `--timeout-ms` | `QUOTEBOARD_TIMEOUT_MS` |
//! | `--cache-capacity` | `QUOTEBOARD_CACHE_CAPACITY` |
//! | `--rate-limit` | `QUOTEBOARD_RATE_LIMIT` |
//! | `--overview` | `QUOTEBOARD_FETCH_OVERVIEW` |

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use quoteboard_core::{AppConfig, ConfigError};
use thiserror::Error;

/// Stock lookup web front-end backed by Alpha Vantage.
#[derive(Debug, Parser)]
#[command(name = "quoteboard", author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP server.
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Listen address.
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// Directory holding `style.css`, `chart.js` and `favicon.ico`.
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Upstream request timeout in milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Memoized fetches kept in memory; 0 disables the cache.
    #[arg(long)]
    pub cache_capacity: Option<usize>,

    /// Upstream calls allowed per minute; 0 disables the guard.
    #[arg(long)]
    pub rate_limit: Option<u32>,

    /// Also fetch market cap, P/E ratio and the 52-week range.
    #[arg(long)]
    pub overview: bool,
}

impl ServeArgs {
    pub fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(static_dir) = &self.static_dir {
            config.static_dir = static_dir.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        if let Some(cache_capacity) = self.cache_capacity {
            config.cache_capacity = cache_capacity;
        }
        if let Some(rate_limit) = self.rate_limit {
            config.rate_limit_per_minute = rate_limit;
        }
        if self.overview {
            config.fetch_overview = true;
        }
        config
    }
}

/// Startup failures mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to initialize logging: {0}")]
    Logging(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Logging(_) => 4,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig::from_lookup(|name| (name == "ALPHA_VANTAGE_API_KEY").then(|| "key".to_owned()))
            .expect("config")
    }

    #[test]
    fn flags_override_environment() {
        let cli = Cli::parse_from([
            "quoteboard",
            "serve",
            "--bind",
            "0.0.0.0:8080",
            "--cache-capacity",
            "0",
            "--overview",
        ]);
        let Command::Serve(args) = cli.command;
        let config = args.apply(base_config());

        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.cache_capacity, 0);
        assert!(config.fetch_overview);
        assert_eq!(config.timeout_ms, 10_000);
    }

    #[test]
    fn exit_codes_are_stable() {
        assert_eq!(CliError::from(ConfigError::MissingApiKey).exit_code(), 2);
        assert_eq!(
            CliError::from(std::io::Error::other("bind failed")).exit_code(),
            10
        );
    }
}
