//! ROE threshold filter.
//!
//! Pure functions only: no I/O, no logging, no clock. The engine gathers the
//! inputs and reports on the outcome; this module decides membership.

use serde::{Deserialize, Serialize};

use crate::data::{CompanyWithSeries, ReturnOnEquitySeries, RoeReading};

use super::config::ScreeningPolicy;

// ============================================================================
// Screening Result
// ============================================================================

/// A company that passed the threshold rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub symbol: String,
    pub name: String,
    /// Every period of the input series, values rounded to 2 decimals
    pub roe: ReturnOnEquitySeries,
}

// ============================================================================
// Filter Result
// ============================================================================

/// Counts for one pass of the filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterResult {
    /// Number of companies that passed
    pub passed: usize,
    /// Number of companies eliminated
    pub eliminated: usize,
    /// Elimination rate (%)
    pub elimination_rate: f64,
}

impl FilterResult {
    pub fn new(input_count: usize, passed_count: usize) -> Self {
        let eliminated = input_count.saturating_sub(passed_count);
        let elimination_rate = if input_count > 0 {
            (eliminated as f64 / input_count as f64) * 100.0
        } else {
            0.0
        };

        Self {
            passed: passed_count,
            eliminated,
            elimination_rate,
        }
    }
}

// ============================================================================
// Filter
// ============================================================================

/// Whether `series` satisfies `policy` against `threshold`.
///
/// A period counts only when strictly above the threshold. An empty series
/// never passes.
pub fn passes(series: &ReturnOnEquitySeries, threshold: f64, policy: ScreeningPolicy) -> bool {
    if series.is_empty() {
        return false;
    }

    let above = series.count_above(threshold);
    match policy {
        ScreeningPolicy::All => above == series.len(),
        ScreeningPolicy::AtLeast(k) => above >= k,
    }
}

/// Screen `companies`, keeping input order.
pub fn screen(
    companies: &[CompanyWithSeries],
    threshold: f64,
    policy: ScreeningPolicy,
) -> Vec<ScreeningResult> {
    companies
        .iter()
        .filter(|c| passes(&c.roe, threshold, policy))
        .map(|c| ScreeningResult {
            symbol: c.symbol.clone(),
            name: c.name.clone(),
            roe: ReturnOnEquitySeries::new(c.roe.iter().map(|r| RoeReading {
                period: r.period.clone(),
                value: round2(r.value),
            })),
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// Tests
// ============================================================================
