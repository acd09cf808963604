use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::data_source::{FetchRequest, FetchedMarketData, MarketDataSource, SourceError};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient, DEFAULT_TIMEOUT_MS};
use crate::throttling::RateGuard;
use crate::{Quote, RawTable, Symbol};

pub const ALPHAVANTAGE_BASE_URL: &str = "https://www.alphavantage.co/query";

/// Alpha Vantage adapter: `TIME_SERIES_DAILY` + `GLOBAL_QUOTE`, optionally `OVERVIEW`.
#[derive(Clone)]
pub struct AlphaVantageAdapter {
    http_client: Arc<dyn HttpClient>,
    api_key: String,
    base_url: String,
    timeout_ms: u64,
    rate_guard: Option<RateGuard>,
    include_overview: bool,
}

impl AlphaVantageAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            base_url: String::from(ALPHAVANTAGE_BASE_URL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            rate_guard: None,
            include_overview: false,
        }
    }

    /// Production adapter over reqwest, tuned by `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        let rate_guard = (config.rate_limit_per_minute > 0)
            .then(|| RateGuard::per_minute(config.rate_limit_per_minute));

        Self::new(Arc::new(ReqwestHttpClient::new()), config.api_key.clone())
            .with_base_url(config.base_url.clone())
            .with_timeout_ms(config.timeout_ms)
            .with_rate_guard(rate_guard)
            .with_overview(config.fetch_overview)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_rate_guard(mut self, rate_guard: Option<RateGuard>) -> Self {
        self.rate_guard = rate_guard;
        self
    }

    pub fn with_overview(mut self, include_overview: bool) -> Self {
        self.include_overview = include_overview;
        self
    }
}

impl AlphaVantageAdapter {
    async fn call(
        &self,
        function: &str,
        symbol: &Symbol,
        extra: &[(&str, &str)],
    ) -> Result<Value, SourceError> {
        let mut request = HttpRequest::get(&self.base_url)
            .with_query("function", function)
            .with_query("symbol", symbol.as_str());
        for (name, value) in extra {
            request = request.with_query(*name, *value);
        }
        let request = request
            .with_query("apikey", &self.api_key)
            .with_timeout_ms(self.timeout_ms);

        debug!(url = %request.redacted_url(), "calling alphavantage");

        let response = self.http_client.execute(request).await.map_err(|e| {
            if e.timed_out() {
                warn!(function, symbol = %symbol, timeout_ms = self.timeout_ms, "alphavantage call timed out");
                SourceError::network(format!(
                    "alphavantage {function} timed out after {}ms: {}",
                    self.timeout_ms,
                    e.message()
                ))
            } else {
                SourceError::network(format!("alphavantage transport error: {}", e.message()))
            }
        })?;

        if !response.is_success() {
            return Err(SourceError::api(format!(
                "alphavantage returned status {}",
                response.status
            )));
        }

        let body: Value = serde_json::from_str(&response.body).map_err(|e| {
            SourceError::malformed(format!("failed to parse alphavantage {function} response: {e}"))
        })?;

        if let Some(error) = upstream_notice(&body) {
            return Err(error);
        }

        Ok(body)
    }

    /// Upstream calls one fetch makes.
    fn calls_per_fetch(&self) -> u32 {
        if self.include_overview {
            3
        } else {
            2
        }
    }

    /// Reserve the whole fetch up front so a refused request sends nothing.
    fn reserve_budget(&self) -> Result<(), SourceError> {
        let Some(guard) = &self.rate_guard else {
            return Ok(());
        };
        guard
            .acquire_n(self.calls_per_fetch())
            .map_err(|denied| SourceError::rate_limited(format!("alphavantage {denied}")))
    }

    async fn fetch_daily(&self, req: &FetchRequest) -> Result<Option<RawTable>, SourceError> {
        let body = self
            .call("TIME_SERIES_DAILY", &req.symbol, &[("outputsize", "full")])
            .await?;

        let response: DailyResponse = serde_json::from_value(body).map_err(|e| {
            SourceError::malformed(format!("failed to parse alphavantage daily series: {e}"))
        })?;

        let Some(series) = response.series else {
            warn!(
                symbol = %req.symbol,
                message = response.error_message.as_deref().unwrap_or("Unknown error"),
                "alphavantage returned no daily series"
            );
            return Ok(None);
        };

        let mut table = RawTable::new();
        for (label, cells) in series {
            table.push_row(
                label,
                cells
                    .into_iter()
                    .map(|(column, value)| (column, value_text(&value))),
            );
        }
        table.retain_within(&req.range);

        Ok(Some(table))
    }

    async fn fetch_global_quote(&self, symbol: &Symbol) -> Result<Quote, SourceError> {
        let body = self.call("GLOBAL_QUOTE", symbol, &[]).await?;

        let response: GlobalQuoteResponse = serde_json::from_value(body).map_err(|e| {
            SourceError::malformed(format!("failed to parse alphavantage quote: {e}"))
        })?;
        let data = response.quote;

        Ok(Quote {
            current_price: number(data.price.as_ref()),
            change: number(data.change.as_ref()),
            change_percent: number(data.change_percent.as_ref()),
            volume: integer(data.volume.as_ref()),
            ..Quote::default()
        })
    }

    async fn fetch_overview(&self, symbol: &Symbol) -> Result<OverviewResponse, SourceError> {
        let body = self.call("OVERVIEW", symbol, &[]).await?;
        serde_json::from_value(body).map_err(|e| {
            SourceError::malformed(format!("failed to parse alphavantage overview: {e}"))
        })
    }
}

impl MarketDataSource for AlphaVantageAdapter {
    fn name(&self) -> &'static str {
        "alphavantage"
    }

    fn fetch<'a>(
        &'a self,
        req: FetchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<FetchedMarketData, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            if self.api_key.trim().is_empty() {
                return Err(SourceError::configuration(
                    "alphavantage API key is not configured",
                ));
            }

            self.reserve_budget()?;

            let history = self.fetch_daily(&req).await?;
            let mut quote = self.fetch_global_quote(&req.symbol).await?;

            if self.include_overview {
                match self.fetch_overview(&req.symbol).await {
                    Ok(overview) => overview.apply_to(&mut quote),
                    Err(error) => {
                        warn!(symbol = %req.symbol, %error, "alphavantage overview unavailable");
                    }
                }
            }

            Ok(FetchedMarketData { history, quote })
        })
    }
}

#[derive(Debug, Deserialize)]
struct DailyResponse {
    #[serde(rename = "Time Series (Daily)", default)]
    series: Option<BTreeMap<String, BTreeMap<String, Value>>>,
    #[serde(rename = "Error Message", default)]
    error_message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote", default)]
    quote: GlobalQuoteData,
}

#[derive(Debug, Default, Deserialize)]
struct GlobalQuoteData {
    #[serde(rename = "05. price", default)]
    price: Option<Value>,
    #[serde(rename = "06. volume", default)]
    volume: Option<Value>,
    #[serde(rename = "09. change", default)]
    change: Option<Value>,
    #[serde(rename = "10. change percent", default)]
    change_percent: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct OverviewResponse {
    #[serde(rename = "MarketCapitalization", default)]
    market_cap: Option<Value>,
    #[serde(rename = "PERatio", default)]
    pe_ratio: Option<Value>,
    #[serde(rename = "52WeekHigh", default)]
    week52_high: Option<Value>,
    #[serde(rename = "52WeekLow", default)]
    week52_low: Option<Value>,
}

impl OverviewResponse {
    fn apply_to(&self, quote: &mut Quote) {
        quote.market_cap = number(self.market_cap.as_ref());
        quote.pe_ratio = number(self.pe_ratio.as_ref());
        quote.week52_high = number(self.week52_high.as_ref());
        quote.week52_low = number(self.week52_low.as_ref());
    }
}

/// Alpha Vantage reports throttling and key problems as 200 responses with a notice field.
fn upstream_notice(body: &Value) -> Option<SourceError> {
    if let Some(note) = body.get("Note").and_then(Value::as_str) {
        return Some(SourceError::rate_limited(format!("alphavantage: {note}")));
    }

    let information = body.get("Information").and_then(Value::as_str)?;
    if information.to_ascii_lowercase().contains("rate limit") {
        Some(SourceError::rate_limited(format!("alphavantage: {information}")))
    } else {
        Some(SourceError::api(format!("alphavantage: {information}")))
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Numeric cell, tolerating a trailing `%`. `"None"`, `"-"` and other text are absent.
fn number(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().trim_end_matches('%').parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|value| value.is_finite())
}

fn integer(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::data_source::SourceErrorKind;

    #[test]
    fn number_accepts_strings_numbers_and_percent() {
        assert_eq!(number(Some(&json!("182.5000"))), Some(182.5));
        assert_eq!(number(Some(&json!("-0.6613%"))), Some(-0.6613));
        assert_eq!(number(Some(&json!(12.5))), Some(12.5));
        assert_eq!(number(Some(&json!("None"))), None);
        assert_eq!(number(Some(&json!("-"))), None);
        assert_eq!(number(None), None);
    }

    #[test]
    fn integer_rejects_fractions() {
        assert_eq!(integer(Some(&json!("45120300"))), Some(45_120_300));
        assert_eq!(integer(Some(&json!("1.5"))), None);
        assert_eq!(integer(Some(&json!(7))), Some(7));
    }

    #[test]
    fn classifies_upstream_notices() {
        let note = upstream_notice(&json!({"Note": "Thank you for using Alpha Vantage! 5 calls per minute"}))
            .expect("note is an error");
        assert_eq!(note.kind(), SourceErrorKind::RateLimited);

        let limit = upstream_notice(&json!({"Information": "Our standard API rate limit is 25 requests per day."}))
            .expect("information is an error");
        assert_eq!(limit.kind(), SourceErrorKind::RateLimited);

        let key = upstream_notice(&json!({"Information": "The **demo** API key is for demo purposes only."}))
            .expect("information is an error");
        assert_eq!(key.kind(), SourceErrorKind::Api);

        assert!(upstream_notice(&json!({"Global Quote": {}})).is_none());
    }

    #[test]
    fn overview_fills_fundamental_fields() {
        let overview: OverviewResponse = serde_json::from_value(json!({
            "MarketCapitalization": "2870000000000",
            "PERatio": "None",
            "52WeekHigh": "199.62",
            "52WeekLow": "124.17"
        }))
        .expect("overview parses");

        let mut quote = Quote::default();
        overview.apply_to(&mut quote);

        assert_eq!(quote.market_cap, Some(2.87e12));
        assert_eq!(quote.pe_ratio, None);
        assert_eq!(quote.week52_high, Some(199.62));
        assert_eq!(quote.week52_low, Some(124.17));
    }
}
