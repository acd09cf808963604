//! HTML table rendering for a [`HistoricalSeries`].

use std::fmt::Write;

use crate::domain::format_date;
use crate::format::NOT_AVAILABLE;
use crate::HistoricalSeries;

const TABLE_CLASSES: &str = "table table-striped table-hover";

/// Render the series as an HTML table. Prices are rounded to two decimals for display only.
pub fn render_table(series: &HistoricalSeries) -> String {
    let with_adjusted = series.has_adjusted_close();
    let mut html = String::with_capacity(128 + series.len() * 160);

    let _ = write!(html, "<table class=\"{TABLE_CLASSES}\">\n  <thead>\n    <tr>");
    let mut headers = vec!["Date", "Open", "High", "Low", "Close"];
    if with_adjusted {
        headers.push("Adj Close");
    }
    headers.push("Volume");
    for header in headers {
        let _ = write!(html, "<th>{header}</th>");
    }
    html.push_str("</tr>\n  </thead>\n  <tbody>\n");

    for point in series.points() {
        html.push_str("    <tr>");
        push_cell(&mut html, &format_date(point.date));
        for value in [point.open, point.high, point.low, point.close] {
            push_cell(&mut html, &display_price(value));
        }
        if with_adjusted {
            push_cell(&mut html, &display_price(point.adjusted_close));
        }
        push_cell(&mut html, &point.volume.to_string());
        html.push_str("</tr>\n");
    }

    html.push_str("  </tbody>\n</table>");
    html
}

/// Escape text for inclusion in HTML element content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn push_cell(html: &mut String, text: &str) {
    html.push_str("<td>");
    html.push_str(&escape_html(text));
    html.push_str("</td>");
}

fn display_price(value: Option<f64>) -> String {
    match value.filter(|value| value.is_finite()) {
        Some(value) => format!("{value:.2}"),
        None => NOT_AVAILABLE.to_owned(),
    }
}
