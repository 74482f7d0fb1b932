//! Lookup contracts for external market data.
//!
//! The screener and the watch-list only see these traits; the HTTP client in
//! `fmp.rs` is one implementation, tests supply in-process mocks.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

use super::{CompanyProfile, Constituent, ReturnOnEquitySeries};

// ============================================================================
// Lookup Error
// ============================================================================

/// Why a lookup against the data source failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// Connection failed, DNS error, TLS error, ...
    #[error("Network error: {0}")]
    Network(String),

    /// No response within the configured bound
    #[error("Request timed out after {after:?}")]
    Timeout { after: Duration },

    /// Server answered with a non-success HTTP status
    #[error("HTTP status {status}")]
    Status { status: u16 },

    /// Body could not be decoded into the expected shape
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Body decoded but held no data for the request
    #[error("Empty response for {0}")]
    Empty(String),

    /// Symbol cannot be a ticker; no request was sent
    #[error("Invalid symbol {0:?}")]
    InvalidSymbol(String),
}

impl LookupError {
    /// Check if the error is transient (worth retrying later).
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout { .. } => true,
            Self::Status { status } => *status == 429 || *status >= 500,
            Self::Malformed(_) | Self::Empty(_) | Self::InvalidSymbol(_) => false,
        }
    }
}

// ============================================================================
// Lookup Traits
// ============================================================================

/// Fetches a company profile by symbol.
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn fetch(&self, symbol: &str) -> Result<CompanyProfile, LookupError>;
}

/// Lists the members of the configured market index.
#[async_trait]
pub trait IndexConstituents: Send + Sync {
    async fn list(&self) -> Result<Vec<Constituent>, LookupError>;
}

/// Fetches the annual ROE history of a company, most recent first.
#[async_trait]
pub trait RoeHistory: Send + Sync {
    async fn fetch_roe(
        &self,
        symbol: &str,
        periods: usize,
    ) -> Result<ReturnOnEquitySeries, LookupError>;
}

/// Run a lookup under `bound`, reporting expiry as [`LookupError::Timeout`].
pub async fn bounded<T, F>(bound: Duration, lookup: F) -> Result<T, LookupError>
where
    F: Future<Output = Result<T, LookupError>>,
{
    match tokio::time::timeout(bound, lookup).await {
        Ok(result) => result,
        Err(_) => Err(LookupError::Timeout { after: bound }),
    }
}

// ============================================================================
// Tests
// ============================================================================
