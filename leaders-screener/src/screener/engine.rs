//! Screener engine module.
//!
//! Gathers screening inputs over the network and hands them to the pure
//! filter in `quantitative.rs`.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::data::{
    bounded, CompanyWithSeries, Constituent, IndexConstituents, LookupError,
    ReturnOnEquitySeries, RoeHistory,
};
use crate::warning::Warning;

use super::config::ScreenerConfig;
use super::quantitative::{screen, FilterResult, ScreeningResult};

// ============================================================================
// Screening Run
// ============================================================================

/// Outcome of one screening run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningRun {
    /// Run ID (timestamp-based)
    pub id: String,
    /// Companies that passed, in input order
    pub results: Vec<ScreeningResult>,
    /// Pass/eliminate counts
    pub filter: FilterResult,
    /// Total companies considered
    pub total_scanned: usize,
    /// Threshold rule used
    pub config_summary: String,
    /// Lookups that failed; those companies were treated as having no data
    pub warnings: Vec<Warning>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_secs: f64,
}

impl ScreeningRun {
    /// Summary string for logging.
    pub fn summary(&self) -> String {
        format!(
            "Screened {} companies in {:.1}s: {} passed ({:.1}%), {} lookup failures",
            self.total_scanned,
            self.duration_secs,
            self.results.len(),
            100.0 - self.filter.elimination_rate,
            self.warnings.len()
        )
    }
}

// ============================================================================
// Screener Engine
// ============================================================================

/// Runs ROE screens against a data source.
///
/// 1. Resolve the company list (index constituents or explicit symbols)
/// 2. Fetch each ROE history through a bounded pool of lookups
/// 3. Apply the threshold rule
pub struct ScreenerEngine<S> {
    config: ScreenerConfig,
    source: Arc<S>,
}

impl<S> ScreenerEngine<S>
where
    S: IndexConstituents + RoeHistory,
{
    pub fn new(config: ScreenerConfig, source: Arc<S>) -> Self {
        Self { config, source }
    }

    pub fn config(&self) -> &ScreenerConfig {
        &self.config
    }

    /// Screen the constituents of the source's index.
    ///
    /// Failing to list the index is fatal for the run; failing to fetch one
    /// company's history is not.
    pub async fn run_index_scan(&self) -> Result<ScreeningRun, LookupError> {
        let mut constituents =
            bounded(self.config.lookup_timeout, self.source.list()).await?;
        info!(count = constituents.len(), "Loaded index constituents");

        if let Some(limit) = self.config.limit {
            constituents.truncate(limit);
        }

        Ok(self.run_for(constituents).await)
    }

    /// Screen an explicit list of symbols; names default to the symbol.
    pub async fn run_for_symbols(&self, symbols: &[String]) -> ScreeningRun {
        let constituents = symbols
            .iter()
            .map(|s| Constituent {
                symbol: s.clone(),
                name: s.clone(),
                sector: None,
            })
            .collect();
        self.run_for(constituents).await
    }

    /// Screen the given companies.
    pub async fn run_for(&self, constituents: Vec<Constituent>) -> ScreeningRun {
        let started_at = Utc::now();
        let id = format!("screen_{}", started_at.format("%Y%m%d_%H%M%S"));
        info!(
            run_id = %id,
            companies = constituents.len(),
            rule = %self.config.summary(),
            "Starting ROE screen"
        );

        let (companies, warnings) = self.gather(constituents).await;
        let results = screen(&companies, self.config.threshold, self.config.policy);

        let completed_at = Utc::now();
        let duration_secs = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;

        let run = ScreeningRun {
            id,
            filter: FilterResult::new(companies.len(), results.len()),
            total_scanned: companies.len(),
            results,
            config_summary: self.config.summary(),
            warnings,
            started_at,
            completed_at,
            duration_secs,
        };

        info!(run_id = %run.id, "{}", run.summary());
        run
    }

    /// Fetch ROE histories, keeping input order.
    ///
    /// Companies whose lookup fails get an empty series, which the filter
    /// always rejects.
    async fn gather(
        &self,
        constituents: Vec<Constituent>,
    ) -> (Vec<CompanyWithSeries>, Vec<Warning>) {
        let source = &self.source;
        let periods = self.config.max_periods;
        let bound = self.config.lookup_timeout;

        let fetched: Vec<(Constituent, Result<ReturnOnEquitySeries, LookupError>)> =
            stream::iter(constituents)
                .map(|c| async move {
                    let result = bounded(bound, source.fetch_roe(&c.symbol, periods)).await;
                    (c, result)
                })
                .buffered(self.config.concurrency.max(1))
                .collect()
                .await;

        let mut companies = Vec::with_capacity(fetched.len());
        let mut warnings = Vec::new();

        for (constituent, result) in fetched {
            let roe = match result {
                Ok(mut series) => {
                    series.truncate(periods);
                    debug!(
                        symbol = %constituent.symbol,
                        periods = series.len(),
                        "Fetched ROE history"
                    );
                    series
                }
                Err(e) => {
                    warn!(
                        symbol = %constituent.symbol,
                        error = %e,
                        recoverable = e.is_recoverable(),
                        "ROE lookup failed"
                    );
                    warnings.push(Warning::new(&constituent.symbol, &e));
                    ReturnOnEquitySeries::default()
                }
            };
            companies.push(CompanyWithSeries::new(constituent.symbol, constituent.name, roe));
        }

        (companies, warnings)
    }
}

// ============================================================================
// Tests
// ============================================================================
