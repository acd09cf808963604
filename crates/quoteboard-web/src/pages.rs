//! Page markup for the search form and the results view.

use std::fmt::Write;

use quoteboard_core::{escape_html, PresentationResult};

pub const DEFAULT_START_DATE: &str = "2023-01-01";
pub const DEFAULT_END_DATE: &str = "2023-12-31";
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred. Please try again later.";

const CHART_JS_CDN: &str = "https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js";

/// Search form, optionally with an error banner.
pub fn render_index(error: Option<&str>) -> String {
    let mut body = String::new();
    if let Some(error) = error {
        let _ = writeln!(
            body,
            "    <div class=\"alert alert-danger\" role=\"alert\">{}</div>",
            escape_html(error)
        );
    }
    body.push_str(&search_form());
    layout("Stock Lookup", &body, "")
}

pub fn render_results(result: &PresentationResult) -> String {
    let symbol = escape_html(result.symbol.as_str());
    let quote = &result.quote;

    let mut body = String::new();
    let _ = writeln!(body, "    <h1>{symbol}</h1>");
    body.push_str("    <section class=\"quote\">\n      <h2>Real-Time Data</h2>\n      <dl>\n");
    for (label, value) in [
        ("Current Price", &quote.current_price),
        ("Change", &quote.change),
        ("Change %", &quote.change_percent),
        ("Volume", &quote.volume),
        ("Market Cap", &quote.market_cap),
        ("P/E Ratio", &quote.pe_ratio),
        ("52 Week High", &quote.week52_high),
        ("52 Week Low", &quote.week52_low),
    ] {
        let _ = writeln!(
            body,
            "        <dt>{label}</dt><dd>{}</dd>",
            escape_html(value)
        );
    }
    body.push_str("      </dl>\n    </section>\n");
    body.push_str("    <section class=\"chart\">\n      <canvas id=\"price-chart\"></canvas>\n    </section>\n");
    body.push_str("    <section class=\"history\">\n      <h2>Historical Data</h2>\n");
    body.push_str(&result.table_html);
    body.push_str("\n    </section>\n    <p><a href=\"/\">New search</a></p>\n");

    let scripts = format!(
        "  <script src=\"{CHART_JS_CDN}\"></script>\n  <script id=\"chart-data\" type=\"application/json\">{}</script>\n  <script src=\"/static/chart.js\"></script>\n",
        chart_json(result)
    );

    layout(&format!("{} Results", result.symbol), &body, &scripts)
}

/// Chart payload as JSON safe to embed in a `<script>` element.
fn chart_json(result: &PresentationResult) -> String {
    let payload = serde_json::json!({
        "symbol": result.symbol.as_str(),
        "dates": result.chart.dates,
        "prices": result.chart.prices,
    });
    payload.to_string().replace('<', "\\u003c")
}

fn search_form() -> String {
    format!(
        r#"    <form method="post" action="/results" class="search">
      <label for="stock_symbol">Stock Symbol</label>
      <input type="text" id="stock_symbol" name="stock_symbol" placeholder="AAPL" required>
      <label for="start_date">Start Date</label>
      <input type="date" id="start_date" name="start_date" value="{DEFAULT_START_DATE}">
      <label for="end_date">End Date</label>
      <input type="date" id="end_date" name="end_date" value="{DEFAULT_END_DATE}">
      <button type="submit">Get Data</button>
    </form>
"#
    )
}

fn layout(title: &str, body: &str, scripts: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{}</title>
  <link rel="icon" href="/favicon.ico">
  <link rel="stylesheet" href="/static/style.css">
</head>
<body>
  <main class="container">
{body}  </main>
{scripts}</body>
</html>
"#,
        escape_html(title)
    )
}
