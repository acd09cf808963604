//! Display formatting for quote fields.
//!
//! Every formatter is total: absent or non-finite input renders as
//! [`NOT_AVAILABLE`]. Zero is a present value and formats normally.

use serde::{Deserialize, Serialize};

use crate::Quote;

/// Sentinel shown for missing values.
pub const NOT_AVAILABLE: &str = "N/A";

const TRILLION: f64 = 1e12;
const BILLION: f64 = 1e9;
const MILLION: f64 = 1e6;

/// Quote fields rendered for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedQuote {
    pub current_price: String,
    pub change: String,
    pub change_percent: String,
    pub volume: String,
    pub market_cap: String,
    pub pe_ratio: String,
    #[serde(rename = "52wk_high")]
    pub week52_high: String,
    #[serde(rename = "52wk_low")]
    pub week52_low: String,
}

pub fn format_quote(quote: &Quote) -> FormattedQuote {
    FormattedQuote {
        current_price: format_price(quote.current_price),
        change: format_price(quote.change),
        change_percent: format_percentage(quote.change_percent),
        volume: format_integer(quote.volume),
        market_cap: format_market_cap(quote.market_cap),
        pe_ratio: format_decimal(quote.pe_ratio),
        week52_high: format_price(quote.week52_high),
        week52_low: format_price(quote.week52_low),
    }
}

/// `$1234.50`
pub fn format_price(value: Option<f64>) -> String {
    match finite(value) {
        Some(value) => format!("${value:.2}"),
        None => NOT_AVAILABLE.to_owned(),
    }
}

/// `1.23%`
pub fn format_percentage(value: Option<f64>) -> String {
    match finite(value) {
        Some(value) => format!("{value:.2}%"),
        None => NOT_AVAILABLE.to_owned(),
    }
}

pub fn format_decimal(value: Option<f64>) -> String {
    match finite(value) {
        Some(value) => format!("{value:.2}"),
        None => NOT_AVAILABLE.to_owned(),
    }
}

/// `1,234,567`
pub fn format_integer(value: Option<u64>) -> String {
    match value {
        Some(value) => group_thousands(&value.to_string()),
        None => NOT_AVAILABLE.to_owned(),
    }
}

/// Scale to `T`/`B`/`M` with two decimals; below a million, whole grouped dollars.
pub fn format_market_cap(value: Option<f64>) -> String {
    let Some(value) = finite(value) else {
        return NOT_AVAILABLE.to_owned();
    };

    if value >= TRILLION {
        format!("${:.2}T", value / TRILLION)
    } else if value >= BILLION {
        format!("${:.2}B", value / BILLION)
    } else if value >= MILLION {
        format!("${:.2}M", value / MILLION)
    } else {
        // -0.4 rounds to -0; render it as $0
        let rounded = value.round();
        let rounded = if rounded == 0.0 { 0.0 } else { rounded };
        let whole = format!("{rounded:.0}");
        match whole.strip_prefix('-') {
            Some(digits) => format!("$-{}", group_thousands(digits)),
            None => format!("${}", group_thousands(&whole)),
        }
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|value| value.is_finite())
}

/// Insert `,` every three digits of an unsigned digit string.
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
