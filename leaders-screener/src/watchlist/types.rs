//! Watch-list data types and errors.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::data::CompanyProfile;

// ============================================================================
// Defaults (match the "Add/Update Stock" form)
// ============================================================================

pub const DEFAULT_ALLOCATION: f64 = 8.0;
pub const DEFAULT_INVESTMENT_AMOUNT: f64 = 6400.0;
pub const DEFAULT_SHARES: u32 = 10;

pub const MIN_ALLOCATION: f64 = 1.0;
pub const MAX_ALLOCATION: f64 = 100.0;
pub const MIN_INVESTMENT_AMOUNT: f64 = 1000.0;
pub const MIN_SHARES: u32 = 1;

// ============================================================================
// Entry
// ============================================================================

/// User-entered fields of a watch-list row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryFields {
    /// Display name; filled from the profile when left blank
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub sector: String,
    /// Allocation percentage, 1-100
    pub allocation: f64,
    /// Investment amount in currency units, at least 1000
    pub investment_amount: f64,
    pub shares: u32,
}

impl Default for EntryFields {
    fn default() -> Self {
        Self {
            company_name: String::new(),
            sector: String::new(),
            allocation: DEFAULT_ALLOCATION,
            investment_amount: DEFAULT_INVESTMENT_AMOUNT,
            shares: DEFAULT_SHARES,
        }
    }
}

impl EntryFields {
    /// Check every rule; the first violation wins.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_ALLOCATION..=MAX_ALLOCATION).contains(&self.allocation) {
            return Err(ValidationError::AllocationOutOfRange {
                value: self.allocation,
            });
        }
        if !self.investment_amount.is_finite() {
            return Err(ValidationError::NotFinite {
                field: "investment_amount",
            });
        }
        if self.investment_amount < MIN_INVESTMENT_AMOUNT {
            return Err(ValidationError::InvestmentTooSmall {
                value: self.investment_amount,
            });
        }
        if self.shares < MIN_SHARES {
            return Err(ValidationError::SharesTooFew);
        }
        Ok(())
    }
}

/// Market data merged into a row from a profile lookup.
///
/// `None` is rendered as "N/A".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    pub price: Option<f64>,
    pub pe: Option<f64>,
    pub market_cap: Option<f64>,
    pub dividend_yield: Option<f64>,
}

impl Enrichment {
    /// Reject infinite or NaN values; they cannot be persisted or exported.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let values = [
            ("price", self.price),
            ("pe", self.pe),
            ("market_cap", self.market_cap),
            ("dividend_yield", self.dividend_yield),
        ];
        for (field, value) in values {
            if value.is_some_and(|v| !v.is_finite()) {
                return Err(ValidationError::NotFinite { field });
            }
        }
        Ok(())
    }
}

impl From<&CompanyProfile> for Enrichment {
    /// Non-finite profile values are treated as missing.
    fn from(profile: &CompanyProfile) -> Self {
        let finite = |v: Option<f64>| v.filter(|v| v.is_finite());
        Self {
            price: finite(profile.price),
            pe: finite(profile.pe),
            market_cap: finite(profile.market_cap),
            dividend_yield: finite(profile.dividend_yield),
        }
    }
}

/// One row of the Industry Leaders list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub symbol: String,
    #[serde(flatten)]
    pub fields: EntryFields,
    #[serde(default)]
    pub enrichment: Enrichment,
}

/// Normalize a user-typed symbol: trimmed, upper-case.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

// ============================================================================
// Errors
// ============================================================================

/// Rejected user input to an upsert.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Symbol must not be empty")]
    EmptySymbol,

    #[error("Allocation must be between 1 and 100 (got {value})")]
    AllocationOutOfRange { value: f64 },

    #[error("Investment amount must be at least 1000 (got {value})")]
    InvestmentTooSmall { value: f64 },

    #[error("Shares must be at least 1")]
    SharesTooFew,

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
}

/// Failure of a watch-list operation.
#[derive(Debug, Error)]
pub enum WatchlistError {
    #[error("Symbol {0} is not on the watch-list")]
    UnknownSymbol(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to persist watch-list to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Watch-list file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// ============================================================================
// Tests
// ============================================================================
