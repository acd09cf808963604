//! # Domain Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Sanitized ticker symbol |
//! | [`DateRange`] | Validated inclusive calendar-date range |
//! | [`Quote`] | Real-time snapshot with optional fields |
//! | [`HistoricalPoint`] | One day of OHLCV data |
//! | [`HistoricalSeries`] | Ascending, date-unique points |
//! | [`MarketDataRecord`] | Series and quote for one request |
//!
//! Construction validates invariants, so a [`DateRange`] or [`Symbol`] in
//! hand is always well-formed:
//!
//! ```rust
//! use quoteboard_core::{DateRange, Symbol, ValidationError};
//!
//! let symbol = Symbol::parse(" msft ").unwrap();
//! assert_eq!(symbol.as_str(), "MSFT");
//!
//! let err = DateRange::validate("2023-05-02", "2023-05-01").unwrap_err();
//! assert_eq!(err, ValidationError::EndBeforeStart);
//! ```

mod date_range;
mod models;
mod symbol;

pub use date_range::{format_date, parse_date, today, DateRange};
pub use models::{HistoricalPoint, HistoricalSeries, MarketDataRecord, Quote};
pub use symbol::Symbol;
