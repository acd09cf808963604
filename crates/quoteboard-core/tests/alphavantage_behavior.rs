//! Behavior-driven tests for the Alpha Vantage fetch collaborator
//!
//! A scripted HTTP client answers per `function` query parameter so the
//! adapter can be exercised offline against real-shaped payloads.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use quoteboard_core::{
    normalize, AlphaVantageAdapter, DateRange, FetchRequest, HttpClient, HttpError, HttpRequest,
    HttpResponse, MarketDataSource, RateGuard, SourceErrorKind, Symbol, DEFAULT_TIMEOUT_MS,
};
use serde_json::json;
use time::macros::date;

// =============================================================================
// Fakes
// =============================================================================

#[derive(Default)]
struct ScriptedHttpClient {
    responses: HashMap<String, Result<HttpResponse, HttpError>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    fn answer(mut self, function: &str, response: Result<HttpResponse, HttpError>) -> Self {
        self.responses.insert(function.to_owned(), response);
        self
    }

    fn json(self, function: &str, body: serde_json::Value) -> Self {
        self.answer(function, Ok(HttpResponse::ok_json(body.to_string())))
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    fn functions(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|request| request.query_value("function").map(str::to_owned))
            .collect()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let function = request.query_value("function").unwrap_or_default().to_owned();
        self.requests
            .lock()
            .expect("requests lock")
            .push(request);
        let response = self
            .responses
            .get(&function)
            .cloned()
            .unwrap_or_else(|| Err(HttpError::new(format!("no script for {function}"))));
        Box::pin(async move { response })
    }
}

fn daily_payload() -> serde_json::Value {
    json!({
        "Meta Data": {
            "1. Information": "Daily Prices (open, high, low, close) and Volumes",
            "2. Symbol": "AAPL",
            "3. Last Refreshed": "2023-01-06",
            "4. Output Size": "Full size",
            "5. Time Zone": "US/Eastern"
        },
        "Time Series (Daily)": {
            "2023-01-06": {
                "1. open": "126.0100", "2. high": "130.2900", "3. low": "124.8900",
                "4. close": "129.6200", "5. volume": "87754715"
            },
            "2023-01-05": {
                "1. open": "127.1300", "2. high": "127.7700", "3. low": "124.7600",
                "4. close": "125.0200", "5. volume": "80962708"
            },
            "2023-01-04": {
                "1. open": "126.8900", "2. high": "128.6557", "3. low": "125.0800",
                "4. close": "126.3600", "5. volume": "89113633"
            },
            "2023-01-03": {
                "1. open": "130.2800", "2. high": "130.9000", "3. low": "124.1700",
                "4. close": "125.0700", "5. volume": "112117471"
            },
            "2022-12-30": {
                "1. open": "128.4100", "2. high": "129.9500", "3. low": "127.4300",
                "4. close": "129.9300", "5. volume": "77034209"
            }
        }
    })
}

fn quote_payload() -> serde_json::Value {
    json!({
        "Global Quote": {
            "01. symbol": "AAPL",
            "02. open": "126.0100",
            "05. price": "129.6200",
            "06. volume": "87754715",
            "07. latest trading day": "2023-01-06",
            "08. previous close": "125.0200",
            "09. change": "4.6000",
            "10. change percent": "3.6794%"
        }
    })
}

fn overview_payload() -> serde_json::Value {
    json!({
        "Symbol": "AAPL",
        "MarketCapitalization": "2050000000000",
        "PERatio": "21.4",
        "52WeekHigh": "179.61",
        "52WeekLow": "124.17"
    })
}

fn first_week() -> FetchRequest {
    FetchRequest::new(
        Symbol::parse("AAPL").expect("valid"),
        DateRange::validate_at("2023-01-01", "2023-01-05", date!(2024 - 01 - 01)).expect("valid"),
    )
}

fn happy_client() -> ScriptedHttpClient {
    ScriptedHttpClient::default()
        .json("TIME_SERIES_DAILY", daily_payload())
        .json("GLOBAL_QUOTE", quote_payload())
        .json("OVERVIEW", overview_payload())
}

// =============================================================================
// Alpha Vantage: Successful Fetches
// =============================================================================

#[tokio::test]
async fn when_upstream_answers_then_history_is_restricted_to_requested_range() {
    // Given: Upstream returns a full history around the requested week
    let client = Arc::new(happy_client());
    let adapter = AlphaVantageAdapter::new(client.clone(), "test-key");

    // When: The first week of 2023 is fetched
    let data = adapter.fetch(first_week()).await.expect("fetch succeeds");

    // Then: Only the three trading days inside the range remain
    let history = data.history.expect("history present");
    assert_eq!(history.len(), 3);

    let series = normalize(&history).expect("normalizes");
    let dates = series.dates();
    assert_eq!(dates, vec!["2023-01-03", "2023-01-04", "2023-01-05"]);
    assert_eq!(series.points()[0].open, Some(130.28));
    assert_eq!(series.points()[0].volume, 112_117_471);
}

#[tokio::test]
async fn when_upstream_answers_then_quote_fields_are_parsed() {
    let client = Arc::new(happy_client());
    let adapter = AlphaVantageAdapter::new(client, "test-key");

    let quote = adapter.fetch(first_week()).await.expect("fetch succeeds").quote;

    assert_eq!(quote.current_price, Some(129.62));
    assert_eq!(quote.change, Some(4.6));
    assert_eq!(quote.change_percent, Some(3.6794));
    assert_eq!(quote.volume, Some(87_754_715));
    assert_eq!(quote.market_cap, None, "overview is off by default");
}

#[tokio::test]
async fn when_fetching_then_requests_carry_key_function_and_timeout() {
    // Given: An adapter with the default timeout
    let client = Arc::new(happy_client());
    let adapter = AlphaVantageAdapter::new(client.clone(), "test-key");

    // When: A fetch runs
    adapter.fetch(first_week()).await.expect("fetch succeeds");

    // Then: Daily then quote, each authenticated and bounded by 10 seconds
    assert_eq!(client.functions(), vec!["TIME_SERIES_DAILY", "GLOBAL_QUOTE"]);
    for request in client.requests() {
        assert_eq!(request.query_value("symbol"), Some("AAPL"));
        assert_eq!(request.query_value("apikey"), Some("test-key"));
        assert_eq!(request.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(request.timeout_ms, 10_000);
        assert!(!request.redacted_url().contains("test-key"));
    }
    assert_eq!(client.requests()[0].query_value("outputsize"), Some("full"));
}

#[tokio::test]
async fn when_timeout_is_configured_then_every_call_uses_it() {
    let client = Arc::new(happy_client());
    let adapter = AlphaVantageAdapter::new(client.clone(), "test-key").with_timeout_ms(2_500);

    adapter.fetch(first_week()).await.expect("fetch succeeds");

    assert!(client
        .requests()
        .iter()
        .all(|request| request.timeout_ms == 2_500));
}

#[tokio::test]
async fn when_overview_is_enabled_then_fundamentals_are_filled() {
    // Given: Overview fetching turned on
    let client = Arc::new(happy_client());
    let adapter = AlphaVantageAdapter::new(client.clone(), "test-key").with_overview(true);

    // When: A fetch runs
    let quote = adapter.fetch(first_week()).await.expect("fetch succeeds").quote;

    // Then: A third call fills market cap, P/E and the 52-week range
    assert_eq!(
        client.functions(),
        vec!["TIME_SERIES_DAILY", "GLOBAL_QUOTE", "OVERVIEW"]
    );
    assert_eq!(quote.market_cap, Some(2.05e12));
    assert_eq!(quote.pe_ratio, Some(21.4));
    assert_eq!(quote.week52_high, Some(179.61));
    assert_eq!(quote.week52_low, Some(124.17));
}

#[tokio::test]
async fn when_overview_fails_then_fetch_still_succeeds_without_fundamentals() {
    // Given: The overview call breaks
    let client = Arc::new(
        ScriptedHttpClient::default()
            .json("TIME_SERIES_DAILY", daily_payload())
            .json("GLOBAL_QUOTE", quote_payload())
            .answer("OVERVIEW", Ok(HttpResponse::with_status(503, "unavailable"))),
    );
    let adapter = AlphaVantageAdapter::new(client, "test-key").with_overview(true);

    // When: A fetch runs
    let data = adapter.fetch(first_week()).await.expect("overview is optional");

    // Then: The quote is intact and fundamentals are absent
    assert_eq!(data.quote.current_price, Some(129.62));
    assert_eq!(data.quote.market_cap, None);
    assert_eq!(data.quote.pe_ratio, None);
}

// =============================================================================
// Alpha Vantage: Upstream Errors
// =============================================================================

#[tokio::test]
async fn when_symbol_is_unknown_then_history_is_absent() {
    // Given: Alpha Vantage rejects the symbol with an error message body
    let client = Arc::new(
        ScriptedHttpClient::default()
            .json(
                "TIME_SERIES_DAILY",
                json!({"Error Message": "Invalid API call. Please retry or visit the documentation for TIME_SERIES_DAILY."}),
            )
            .json("GLOBAL_QUOTE", json!({"Global Quote": {}})),
    );
    let adapter = AlphaVantageAdapter::new(client, "test-key");

    // When: A fetch runs
    let data = adapter.fetch(first_week()).await.expect("no data is not an error");

    // Then: No history, and an empty quote
    assert!(data.history.is_none());
    assert_eq!(data.quote.current_price, None);
}

#[tokio::test]
async fn when_upstream_sends_a_note_then_fetch_is_rate_limited() {
    let client = Arc::new(ScriptedHttpClient::default().json(
        "TIME_SERIES_DAILY",
        json!({"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}),
    ));
    let adapter = AlphaVantageAdapter::new(client.clone(), "test-key");

    let error = adapter.fetch(first_week()).await.expect_err("note is a failure");

    assert_eq!(error.kind(), SourceErrorKind::RateLimited);
    assert_eq!(error.code(), "source.rate_limited");
    assert_eq!(client.functions(), vec!["TIME_SERIES_DAILY"], "no retry");
}

#[tokio::test]
async fn when_daily_limit_information_arrives_then_fetch_is_rate_limited() {
    let client = Arc::new(ScriptedHttpClient::default().json(
        "TIME_SERIES_DAILY",
        json!({"Information": "We have detected your API key and our standard API rate limit is 25 requests per day."}),
    ));
    let adapter = AlphaVantageAdapter::new(client, "test-key");

    let error = adapter.fetch(first_week()).await.expect_err("limit is a failure");

    assert_eq!(error.kind(), SourceErrorKind::RateLimited);
}

#[tokio::test]
async fn when_upstream_status_is_not_success_then_fetch_is_an_api_error() {
    let client = Arc::new(ScriptedHttpClient::default().answer(
        "TIME_SERIES_DAILY",
        Ok(HttpResponse::with_status(502, "<html>Bad Gateway</html>")),
    ));
    let adapter = AlphaVantageAdapter::new(client, "test-key");

    let error = adapter.fetch(first_week()).await.expect_err("502 is a failure");

    assert_eq!(error.kind(), SourceErrorKind::Api);
    assert!(error.message().contains("502"));
}

#[tokio::test]
async fn when_transport_fails_then_fetch_is_a_network_error() {
    let client = Arc::new(ScriptedHttpClient::default().answer(
        "TIME_SERIES_DAILY",
        Err(HttpError::timeout("request timed out after 10000ms")),
    ));
    let adapter = AlphaVantageAdapter::new(client, "test-key");

    let error = adapter.fetch(first_week()).await.expect_err("timeout is a failure");

    assert_eq!(error.kind(), SourceErrorKind::Network);
    assert!(error
        .message()
        .contains("TIME_SERIES_DAILY timed out after 10000ms"));
}

#[tokio::test]
async fn when_connection_is_refused_then_fetch_is_a_plain_transport_error() {
    let client = Arc::new(ScriptedHttpClient::default().answer(
        "TIME_SERIES_DAILY",
        Err(HttpError::new("connection failed: connection refused")),
    ));
    let adapter = AlphaVantageAdapter::new(client, "test-key").with_timeout_ms(2_500);

    let error = adapter.fetch(first_week()).await.expect_err("refused is a failure");

    assert_eq!(error.kind(), SourceErrorKind::Network);
    assert!(error.message().contains("transport error"));
    assert!(!error.message().contains("timed out"));
}

#[tokio::test]
async fn when_body_is_not_json_then_fetch_is_a_malformed_response() {
    let client = Arc::new(ScriptedHttpClient::default().answer(
        "TIME_SERIES_DAILY",
        Ok(HttpResponse::ok_json("not json at all")),
    ));
    let adapter = AlphaVantageAdapter::new(client, "test-key");

    let error = adapter.fetch(first_week()).await.expect_err("garbage is a failure");

    assert_eq!(error.kind(), SourceErrorKind::MalformedResponse);
}

#[tokio::test]
async fn when_api_key_is_blank_then_nothing_is_sent() {
    let client = Arc::new(happy_client());
    let adapter = AlphaVantageAdapter::new(client.clone(), "  ");

    let error = adapter.fetch(first_week()).await.expect_err("blank key is a failure");

    assert_eq!(error.kind(), SourceErrorKind::Configuration);
    assert!(client.requests().is_empty());
}

// =============================================================================
// Alpha Vantage: Client-side Rate Budget
// =============================================================================

#[tokio::test]
async fn when_budget_cannot_cover_a_fetch_then_nothing_is_sent_upstream() {
    // Given: A budget of a single call per minute
    let client = Arc::new(happy_client());
    let adapter = AlphaVantageAdapter::new(client.clone(), "test-key")
        .with_rate_guard(Some(RateGuard::new(Duration::from_secs(60), 1)));

    // When: A fetch needs two calls
    let error = adapter.fetch(first_week()).await.expect_err("budget too small");

    // Then: The fetch is refused before any upstream call
    assert_eq!(error.kind(), SourceErrorKind::RateLimited);
    assert!(client.functions().is_empty());
}

#[tokio::test]
async fn when_budget_is_spent_then_next_fetch_fails_without_calling_upstream() {
    // Given: Room for one two-call fetch, but not for a second
    let client = Arc::new(happy_client());
    let adapter = AlphaVantageAdapter::new(client.clone(), "test-key")
        .with_rate_guard(Some(RateGuard::new(Duration::from_secs(60), 3)));

    // When: Two fetches run back to back
    adapter.fetch(first_week()).await.expect("first fetch fits");
    let error = adapter.fetch(first_week()).await.expect_err("second fetch exceeds budget");

    // Then: Only the first fetch reached upstream
    assert_eq!(error.kind(), SourceErrorKind::RateLimited);
    assert!(error.message().contains("retry in"));
    assert_eq!(client.functions(), vec!["TIME_SERIES_DAILY", "GLOBAL_QUOTE"]);
}

#[tokio::test]
async fn when_overview_is_enabled_then_budget_covers_three_calls() {
    let client = Arc::new(happy_client());
    let adapter = AlphaVantageAdapter::new(client.clone(), "test-key")
        .with_overview(true)
        .with_rate_guard(Some(RateGuard::new(Duration::from_secs(60), 3)));

    adapter.fetch(first_week()).await.expect("three calls fit");
    let error = adapter.fetch(first_week()).await.expect_err("budget spent");

    assert_eq!(error.kind(), SourceErrorKind::RateLimited);
    assert_eq!(client.requests().len(), 3);
}
