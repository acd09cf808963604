//! Fetch-collaborator contract.
//!
//! A [`MarketDataSource`] turns a [`FetchRequest`] into the raw historical
//! table and the real-time [`Quote`] for one symbol. Implementations:
//!
//! | Type | Description |
//! |------|-------------|
//! | [`crate::AlphaVantageAdapter`] | Alpha Vantage REST API |
//! | [`crate::CachedSource`] | Bounded LRU memoization around another source |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::{DateRange, Quote, RawTable, Symbol};

/// Upstream failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Transport failure or timeout.
    Network,
    /// Upstream answered with an error status or error payload.
    Api,
    RateLimited,
    /// Body could not be decoded into the expected shape.
    MalformedResponse,
    /// The source is not usable as configured (e.g. no credential).
    Configuration,
}

/// Structured upstream error. The message is operator detail, never shown to end users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Network, message)
    }

    pub fn api(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Api, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::RateLimited, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::MalformedResponse, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Configuration, message)
    }

    fn new(kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Network => "source.network",
            SourceErrorKind::Api => "source.api",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::MalformedResponse => "source.malformed_response",
            SourceErrorKind::Configuration => "source.configuration",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// One fetch: a symbol over a validated range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchRequest {
    pub symbol: Symbol,
    pub range: DateRange,
}

impl FetchRequest {
    pub fn new(symbol: Symbol, range: DateRange) -> Self {
        Self { symbol, range }
    }
}

/// What a source returns. `history` is `None` when upstream has no series for the symbol.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedMarketData {
    pub history: Option<RawTable>,
    pub quote: Quote,
}

/// Fetch collaborator. Must be `Send + Sync`; one instance serves every request.
pub trait MarketDataSource: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Fetch the historical table (restricted to `req.range`) and the latest quote.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on transport failure, upstream error payloads,
    /// rate limiting, undecodable bodies, or missing configuration.
    fn fetch<'a>(
        &'a self,
        req: FetchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<FetchedMarketData, SourceError>> + Send + 'a>>;
}

impl<S: MarketDataSource + ?Sized> MarketDataSource for Arc<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn fetch<'a>(
        &'a self,
        req: FetchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<FetchedMarketData, SourceError>> + Send + 'a>> {
        (**self).fetch(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(SourceError::network("x").code(), "source.network");
        assert_eq!(SourceError::api("x").code(), "source.api");
        assert_eq!(SourceError::rate_limited("x").code(), "source.rate_limited");
        assert_eq!(SourceError::malformed("x").code(), "source.malformed_response");
        assert_eq!(SourceError::configuration("x").code(), "source.configuration");
    }

    #[test]
    fn display_includes_code() {
        let error = SourceError::api("alphavantage returned status 503");
        assert_eq!(error.to_string(), "alphavantage returned status 503 (source.api)");
    }
}
