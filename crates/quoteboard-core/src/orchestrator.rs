//! Request orchestration: symbol + date range in, presentation-ready result out.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use time::Date;
use tracing::{error, info, warn};

use crate::data_source::{FetchRequest, MarketDataSource, SourceError, SourceErrorKind};
use crate::format::{format_quote, FormattedQuote};
use crate::normalize::normalize;
use crate::table::render_table;
use crate::{
    today, DateRange, HistoricalSeries, MarketDataRecord, NormalizeError, Symbol, ValidationError,
};

/// Two equal-length sequences for the price chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub dates: Vec<String>,
    pub prices: Vec<Option<f64>>,
}

impl ChartData {
    pub fn from_series(series: &HistoricalSeries) -> Self {
        Self {
            dates: series.dates(),
            prices: series.closes(),
        }
    }
}

/// Everything the presentation layer needs for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentationResult {
    pub symbol: Symbol,
    pub range: DateRange,
    pub quote: FormattedQuote,
    pub series: HistoricalSeries,
    pub table_html: String,
    pub chart: ChartData,
}

impl PresentationResult {
    pub fn from_record(record: MarketDataRecord) -> Self {
        let quote = format_quote(&record.quote);
        let table_html = render_table(&record.series);
        let chart = ChartData::from_series(&record.series);

        Self {
            symbol: record.symbol,
            range: record.range,
            quote,
            series: record.series,
            table_html,
            chart,
        }
    }
}

/// Request failures. `Display` carries operator detail; [`RequestError::user_message`] is what end users see.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no data found for symbol {symbol}")]
    NoData { symbol: Symbol },

    #[error("upstream failure for {symbol}: {source}")]
    Upstream { symbol: Symbol, source: SourceError },

    #[error("configuration failure for {symbol}: {source}")]
    Configuration { symbol: Symbol, source: SourceError },

    #[error("failed to process data for {symbol}: {source}")]
    Processing {
        symbol: Symbol,
        source: NormalizeError,
    },
}

impl RequestError {
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NoData { .. } => 404,
            Self::Upstream { .. } | Self::Configuration { .. } | Self::Processing { .. } => 500,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(error) => error.to_string(),
            Self::NoData { symbol } => format!("No data found for symbol {symbol}"),
            Self::Upstream { symbol, .. }
            | Self::Configuration { symbol, .. }
            | Self::Processing { symbol, .. } => format!("Error processing data for {symbol}"),
        }
    }

    fn from_source(symbol: Symbol, source: SourceError) -> Self {
        if source.kind() == SourceErrorKind::Configuration {
            Self::Configuration { symbol, source }
        } else {
            Self::Upstream { symbol, source }
        }
    }
}

/// Runs one request start to finish; the first failing step short-circuits.
pub struct RequestOrchestrator {
    source: Arc<dyn MarketDataSource>,
}

impl RequestOrchestrator {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }

    /// Sanitize, validate, fetch, normalize and format.
    pub async fn handle(
        &self,
        symbol_raw: &str,
        start_text: &str,
        end_text: &str,
    ) -> Result<PresentationResult, RequestError> {
        self.handle_at(symbol_raw, start_text, end_text, today())
            .await
    }

    /// Same as [`Self::handle`] with an explicit "today" for the future-date check.
    pub async fn handle_at(
        &self,
        symbol_raw: &str,
        start_text: &str,
        end_text: &str,
        today: Date,
    ) -> Result<PresentationResult, RequestError> {
        let symbol = Symbol::parse(symbol_raw)?;
        let range = DateRange::validate_at(start_text, end_text, today)?;

        let fetched = self
            .source
            .fetch(FetchRequest::new(symbol.clone(), range))
            .await
            .map_err(|source| {
                let error = RequestError::from_source(symbol.clone(), source);
                error!(symbol = %symbol, source = self.source.name(), %error, "fetch failed");
                error
            })?;

        let table = match fetched.history {
            Some(table) if !table.is_empty() => table,
            _ => {
                warn!(symbol = %symbol, "no historical data");
                return Err(RequestError::NoData { symbol });
            }
        };

        let series = normalize(&table)
            .map_err(|source| {
                let error = RequestError::Processing {
                    symbol: symbol.clone(),
                    source,
                };
                error!(symbol = %symbol, %error, "normalization failed");
                error
            })?
            .within(&range);

        if series.is_empty() {
            warn!(symbol = %symbol, "no historical data inside requested range");
            return Err(RequestError::NoData { symbol });
        }

        info!(symbol = %symbol, rows = series.len(), "request served");
        let record = MarketDataRecord::new(symbol, range, series, fetched.quote);
        Ok(PresentationResult::from_record(record))
    }
}
