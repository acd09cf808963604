use serde::{Deserialize, Serialize};
use time::Date;

use super::date_range::{format_date, iso_date};
use crate::{DateRange, Symbol};

/// Real-time snapshot for one symbol. Every field may be absent upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub current_price: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub volume: Option<u64>,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    #[serde(rename = "52wk_high")]
    pub week52_high: Option<f64>,
    #[serde(rename = "52wk_low")]
    pub week52_low: Option<f64>,
}

/// One trading day of OHLCV data. Prices are absent when the upstream cell was not numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjusted_close: Option<f64>,
    pub volume: u64,
}

/// Points ordered ascending by date, at most one per date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoricalSeries {
    points: Vec<HistoricalPoint>,
}

impl HistoricalSeries {
    /// Sort ascending by date, keeping the first occurrence of a repeated date.
    pub fn from_points(mut points: Vec<HistoricalPoint>) -> Self {
        points.sort_by_key(|point| point.date);
        points.dedup_by_key(|point| point.date);
        Self { points }
    }

    pub fn points(&self) -> &[HistoricalPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn has_adjusted_close(&self) -> bool {
        self.points.iter().any(|point| point.adjusted_close.is_some())
    }

    /// Drop points outside `range`.
    pub fn within(mut self, range: &DateRange) -> Self {
        self.points.retain(|point| range.contains(point.date));
        self
    }

    /// `YYYY-MM-DD` labels, parallel to [`Self::closes`].
    pub fn dates(&self) -> Vec<String> {
        self.points.iter().map(|point| format_date(point.date)).collect()
    }

    pub fn closes(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|point| point.close).collect()
    }
}

/// Historical series and quote for one symbol over one requested range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketDataRecord {
    pub symbol: Symbol,
    pub range: DateRange,
    pub series: HistoricalSeries,
    pub quote: Quote,
}

impl MarketDataRecord {
    pub fn new(symbol: Symbol, range: DateRange, series: HistoricalSeries, quote: Quote) -> Self {
        Self {
            symbol,
            range,
            series,
            quote,
        }
    }
}
