//! # Quoteboard Core
//!
//! Everything behind the quoteboard stock lookup page except HTTP routing and
//! page markup.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Alpha Vantage fetch collaborator |
//! | [`cache`] | Bounded LRU memoization of fetches |
//! | [`config`] | Environment configuration |
//! | [`data_source`] | Fetch-collaborator trait and upstream error kinds |
//! | [`domain`] | Symbol, date range, quote and historical series |
//! | [`error`] | Validation, normalization and configuration errors |
//! | [`format`] | Display formatting for quote fields |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`normalize`] | Raw upstream table to typed series |
//! | [`orchestrator`] | End-to-end request handling |
//! | [`table`] | HTML table rendering |
//! | [`throttling`] | Client-side upstream rate budget |
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │ RequestOrchestrator  │  symbol + dates → PresentationResult | RequestError
//! └──────────┬───────────┘
//!            │
//!            ▼
//! ┌──────────────────────┐     ┌──────────────────┐
//! │ CachedSource (LRU)   │────▶│ AlphaVantage     │──▶ HttpClient (reqwest)
//! └──────────────────────┘     └──────────────────┘
//!            │
//!            ▼
//! ┌──────────────────────┐
//! │ normalize → format   │  HistoricalSeries, FormattedQuote, table, chart
//! └──────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use quoteboard_core::{AlphaVantageAdapter, AppConfig, CachedSource, FetchCache, RequestOrchestrator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::from_env()?;
//!     let source = CachedSource::new(
//!         AlphaVantageAdapter::from_config(&config),
//!         FetchCache::new(config.cache_capacity),
//!     );
//!     let orchestrator = RequestOrchestrator::new(Arc::new(source));
//!
//!     let result = orchestrator.handle("aapl", "2023-01-01", "2023-12-31").await?;
//!     println!("{} closes, last quote {}", result.series.len(), result.quote.current_price);
//!     Ok(())
//! }
//! ```
//!
//! ## Security
//!
//! - The API key is read from the environment only and masked in request logs
//! - Symbols are restricted to ASCII letters, digits, `.` and `-`
//! - Every table cell is HTML-escaped

pub mod adapters;
pub mod cache;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod format;
pub mod http_client;
pub mod normalize;
pub mod orchestrator;
pub mod table;
pub mod throttling;

pub use adapters::{AlphaVantageAdapter, ALPHAVANTAGE_BASE_URL};

pub use cache::{CachedSource, FetchCache, DEFAULT_CACHE_CAPACITY};

pub use config::{AppConfig, API_KEY_VAR};

pub use data_source::{
    FetchRequest, FetchedMarketData, MarketDataSource, SourceError, SourceErrorKind,
};

pub use domain::{
    format_date, parse_date, today, DateRange, HistoricalPoint, HistoricalSeries,
    MarketDataRecord, Quote, Symbol,
};

pub use error::{ConfigError, NormalizeError, ValidationError};

pub use format::{
    format_decimal, format_integer, format_market_cap, format_percentage, format_price,
    format_quote, FormattedQuote, NOT_AVAILABLE,
};

pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient, DEFAULT_TIMEOUT_MS,
};

pub use normalize::{normalize, RawRow, RawTable};

pub use orchestrator::{ChartData, PresentationResult, RequestError, RequestOrchestrator};

pub use table::{escape_html, render_table};

pub use throttling::{BudgetDenied, RateGuard};
