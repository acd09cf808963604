//! Conversion of upstream date-indexed tables into [`HistoricalSeries`].

use std::collections::BTreeMap;

use time::Date;

use crate::domain::parse_date;
use crate::{DateRange, HistoricalPoint, HistoricalSeries, NormalizeError};

const OPEN: &str = "open";
const HIGH: &str = "high";
const LOW: &str = "low";
const CLOSE: &str = "close";
const VOLUME: &str = "volume";
const REQUIRED_COLUMNS: [&str; 5] = [OPEN, HIGH, LOW, CLOSE, VOLUME];
const ADJUSTED_CLOSE_ALIASES: [&str; 2] = ["adjusted close", "adj close"];

/// Untyped table as returned by upstream: one row per date-like label, string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    rows: Vec<RawRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub label: String,
    pub cells: BTreeMap<String, String>,
}

impl RawTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_row<I, K, V>(&mut self, label: impl Into<String>, cells: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.rows.push(RawRow {
            label: label.into(),
            cells: cells
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        });
    }

    pub fn with_row<I, K, V>(mut self, label: impl Into<String>, cells: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.push_row(label, cells);
        self
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep rows whose label falls inside `range`. Unparseable labels are kept so
    /// that [`normalize`] reports them.
    pub fn retain_within(&mut self, range: &DateRange) {
        self.rows
            .retain(|row| parse_row_label(&row.label).map_or(true, |date| range.contains(date)));
    }
}

/// Type the table, convert row labels to dates, and order ascending by date.
///
/// Price cells that do not parse become absent; volume cells that do not parse become 0.
/// Repeated dates keep the row that appeared first.
pub fn normalize(table: &RawTable) -> Result<HistoricalSeries, NormalizeError> {
    if table.is_empty() {
        return Ok(HistoricalSeries::default());
    }

    for column in REQUIRED_COLUMNS {
        let present = table
            .rows
            .iter()
            .any(|row| row.cells.keys().any(|key| canonical_column(key) == column));
        if !present {
            return Err(NormalizeError::MissingColumn { column });
        }
    }

    let points = table
        .rows
        .iter()
        .map(normalize_row)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(HistoricalSeries::from_points(points))
}

fn normalize_row(row: &RawRow) -> Result<HistoricalPoint, NormalizeError> {
    let date = parse_row_label(&row.label).ok_or_else(|| NormalizeError::InvalidRowLabel {
        label: row.label.clone(),
    })?;

    let mut point = HistoricalPoint {
        date,
        open: None,
        high: None,
        low: None,
        close: None,
        adjusted_close: None,
        volume: 0,
    };

    for (key, value) in &row.cells {
        let column = canonical_column(key);
        match column.as_str() {
            OPEN => point.open = coerce_price(value),
            HIGH => point.high = coerce_price(value),
            LOW => point.low = coerce_price(value),
            CLOSE => point.close = coerce_price(value),
            VOLUME => point.volume = coerce_volume(value),
            other if ADJUSTED_CLOSE_ALIASES.contains(&other) => {
                point.adjusted_close = coerce_price(value)
            }
            _ => {}
        }
    }

    Ok(point)
}

/// `"1. open"` and `"Open"` both map to `"open"`.
fn canonical_column(name: &str) -> String {
    let trimmed = name.trim();
    let without_ordinal = match trimmed.split_once(". ") {
        Some((ordinal, rest)) if ordinal.chars().all(|ch| ch.is_ascii_digit()) => rest,
        _ => trimmed,
    };
    without_ordinal.trim().to_ascii_lowercase()
}

/// Accepts `YYYY-MM-DD`, optionally followed by a space- or `T`-separated time.
fn parse_row_label(label: &str) -> Option<Date> {
    let label = label.trim();
    let (day, rest) = label.split_at_checked(10)?;
    if !(rest.is_empty() || rest.starts_with(' ') || rest.starts_with('T')) {
        return None;
    }
    parse_date(day).ok()
}

fn coerce_price(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn coerce_volume(raw: &str) -> u64 {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<u64>() {
        return value;
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value.trunc() as u64,
        _ => 0,
    }
}
