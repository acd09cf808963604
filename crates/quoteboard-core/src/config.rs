//! Process configuration.
//!
//! Values come from the environment (optionally seeded from a `.env` file):
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `ALPHA_VANTAGE_API_KEY` | required | Upstream credential |
//! | `QUOTEBOARD_BIND` | `127.0.0.1:5000` | Listen address |
//! | `QUOTEBOARD_BASE_URL` | Alpha Vantage query URL | Upstream endpoint |
//! | `QUOTEBOARD_TIMEOUT_MS` | `10000` | Per-call upstream timeout |
//! | `QUOTEBOARD_CACHE_CAPACITY` | `100` | Memoized fetches, `0` disables |
//! | `QUOTEBOARD_RATE_LIMIT` | `5` | Upstream calls per minute, `0` disables |
//! | `QUOTEBOARD_FETCH_OVERVIEW` | `false` | Also fetch market cap, P/E and 52-week range |
//! | `QUOTEBOARD_STATIC_DIR` | `static` | Static asset directory |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::adapters::ALPHAVANTAGE_BASE_URL;
use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::http_client::DEFAULT_TIMEOUT_MS;
use crate::ConfigError;

pub const API_KEY_VAR: &str = "ALPHA_VANTAGE_API_KEY";
const BIND_VAR: &str = "QUOTEBOARD_BIND";
const BASE_URL_VAR: &str = "QUOTEBOARD_BASE_URL";
const TIMEOUT_VAR: &str = "QUOTEBOARD_TIMEOUT_MS";
const CACHE_CAPACITY_VAR: &str = "QUOTEBOARD_CACHE_CAPACITY";
const RATE_LIMIT_VAR: &str = "QUOTEBOARD_RATE_LIMIT";
const FETCH_OVERVIEW_VAR: &str = "QUOTEBOARD_FETCH_OVERVIEW";
const STATIC_DIR_VAR: &str = "QUOTEBOARD_STATIC_DIR";

const DEFAULT_BIND: &str = "127.0.0.1:5000";
const DEFAULT_RATE_LIMIT: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_key: String,
    pub bind: SocketAddr,
    pub base_url: String,
    pub timeout_ms: u64,
    pub cache_capacity: usize,
    pub rate_limit_per_minute: u32,
    pub fetch_overview: bool,
    pub static_dir: PathBuf,
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenv::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let default_bind = SocketAddr::from(([127, 0, 0, 1], 5000));

        Ok(Self {
            api_key,
            bind: parse_var(&lookup, BIND_VAR, default_bind)?,
            base_url: lookup(BASE_URL_VAR).unwrap_or_else(|| ALPHAVANTAGE_BASE_URL.to_owned()),
            timeout_ms: parse_var(&lookup, TIMEOUT_VAR, DEFAULT_TIMEOUT_MS)?,
            cache_capacity: parse_var(&lookup, CACHE_CAPACITY_VAR, DEFAULT_CACHE_CAPACITY)?,
            rate_limit_per_minute: parse_var(&lookup, RATE_LIMIT_VAR, DEFAULT_RATE_LIMIT)?,
            fetch_overview: parse_flag(&lookup, FETCH_OVERVIEW_VAR)?,
            static_dir: lookup(STATIC_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static")),
        })
    }

    pub fn default_bind() -> &'static str {
        DEFAULT_BIND
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
    }
}

fn parse_flag<F>(lookup: &F, name: &'static str) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name).as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                name,
                value: value.to_owned(),
            }),
        },
    }
}
