use thiserror::Error;

/// User-input errors. Display text is safe to show to the end user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a stock symbol")]
    EmptySymbol,
    #[error("Stock symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("Stock symbol must start with a letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("Stock symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("Invalid date format. Please use YYYY-MM-DD")]
    InvalidDateFormat { value: String },
    #[error("End date must be after start date")]
    EndBeforeStart,
    #[error("End date cannot be in the future")]
    EndInFuture,
}

/// Failures while turning a raw upstream table into a [`crate::HistoricalSeries`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("historical table is missing required column '{column}'")]
    MissingColumn { column: &'static str },
    #[error("row label '{label}' is not a calendar date")]
    InvalidRowLabel { label: String },
}

/// Startup configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API key not configured; set ALPHA_VANTAGE_API_KEY in the environment or .env file")]
    MissingApiKey,
    #[error("invalid value '{value}' for {name}")]
    InvalidValue { name: &'static str, value: String },
}
