//! Market data module.
//!
//! Defines the shared data shapes (profiles, index constituents, ROE series)
//! and the lookup contracts the screener and watch-list depend on.
//!
//! # Data Sources
//! - **FMP** (Financial Modeling Prep): REST API, API key passed as a query
//!   parameter. Profile, index constituent and financial ratio endpoints.

mod fmp;
mod provider;

pub use fmp::FmpClient;
pub use provider::{bounded, IndexConstituents, LookupError, ProfileLookup, RoeHistory};

use serde::{Deserialize, Serialize};

// ============================================================================
// Core Data Types
// ============================================================================

/// Company profile returned by a [`ProfileLookup`].
///
/// Every field except the symbol may be missing upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// Ticker symbol (e.g., "AAPL")
    pub symbol: String,
    /// Display name
    pub company_name: Option<String>,
    /// Sector
    pub sector: Option<String>,
    /// Current price
    pub price: Option<f64>,
    /// Price/earnings ratio
    pub pe: Option<f64>,
    /// Market capitalization
    pub market_cap: Option<f64>,
    /// Dividend yield (%)
    pub dividend_yield: Option<f64>,
}

/// A member of a market index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constituent {
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub sector: Option<String>,
}

/// One reported ROE value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoeReading {
    /// Period identifier, usually the report date ("2023-09-30")
    pub period: String,
    /// Return on equity in percent
    pub value: f64,
}

/// Return-on-equity time series keyed by period.
///
/// Keeps the order readings were supplied in (conventionally most recent
/// first). Period keys are unique: a repeated period keeps its first value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReturnOnEquitySeries {
    readings: Vec<RoeReading>,
}

impl ReturnOnEquitySeries {
    /// Build a series from readings, dropping repeated periods.
    pub fn new(readings: impl IntoIterator<Item = RoeReading>) -> Self {
        let mut unique: Vec<RoeReading> = Vec::new();
        for reading in readings {
            if !unique.iter().any(|r| r.period == reading.period) {
                unique.push(reading);
            }
        }
        Self { readings: unique }
    }

    /// Build a series from `(period, percent)` pairs.
    pub fn from_pairs<P: Into<String>>(pairs: impl IntoIterator<Item = (P, f64)>) -> Self {
        Self::new(pairs.into_iter().map(|(period, value)| RoeReading {
            period: period.into(),
            value,
        }))
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoeReading> {
        self.readings.iter()
    }

    /// Value reported for `period`, if any.
    pub fn get(&self, period: &str) -> Option<f64> {
        self.readings
            .iter()
            .find(|r| r.period == period)
            .map(|r| r.value)
    }

    /// Number of periods strictly above `threshold`.
    pub fn count_above(&self, threshold: f64) -> usize {
        self.readings.iter().filter(|r| r.value > threshold).count()
    }

    /// Keep only the first `n` readings.
    pub fn truncate(&mut self, n: usize) {
        self.readings.truncate(n);
    }
}

/// Screening input: a company and its ROE history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyWithSeries {
    pub symbol: String,
    pub name: String,
    pub roe: ReturnOnEquitySeries,
}

impl CompanyWithSeries {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        roe: ReturnOnEquitySeries,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            roe,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_drops_repeated_periods() {
        let series =
            ReturnOnEquitySeries::from_pairs([("2023", 20.0), ("2022", 18.0), ("2023", 1.0)]);
        assert_eq!(series.len(), 2);
        assert_eq!(series.get("2023"), Some(20.0));
    }

    #[test]
    fn test_series_keeps_supplied_order() {
        let series =
            ReturnOnEquitySeries::from_pairs([("2021", 1.0), ("2023", 3.0), ("2022", 2.0)]);
        let periods: Vec<&str> = series.iter().map(|r| r.period.as_str()).collect();
        assert_eq!(periods, vec!["2021", "2023", "2022"]);
    }

    #[test]
    fn test_count_above_is_strict() {
        let series = ReturnOnEquitySeries::from_pairs([("a", 15.0), ("b", 15.01), ("c", 30.0)]);
        assert_eq!(series.count_above(15.0), 2);
        assert_eq!(series.count_above(100.0), 0);
    }

    #[test]
    fn test_truncate() {
        let mut series = ReturnOnEquitySeries::from_pairs((0..12).map(|i| (i.to_string(), 1.0)));
        series.truncate(10);
        assert_eq!(series.len(), 10);
        assert_eq!(series.get("11"), None);
    }

    #[test]
    fn test_series_serializes_as_list() {
        let series = ReturnOnEquitySeries::from_pairs([("2023-12-31", 12.5)]);
        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(json, r#"[{"period":"2023-12-31","value":12.5}]"#);
    }
}
