pub mod alphavantage;

pub use alphavantage::{AlphaVantageAdapter, ALPHAVANTAGE_BASE_URL};
