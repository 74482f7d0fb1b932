//! The Industry Leaders watch-list store.
//!
//! An ordered collection of [`WatchlistEntry`] keyed by normalized symbol,
//! optionally backed by a JSON file. Mutations take `&mut self`; lookups are
//! bounded by a timeout and their failures become warnings.

use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::data::{bounded, CompanyProfile, LookupError, ProfileLookup};
use crate::export::ExportError;
use crate::warning::Warning;

use super::table;
use super::types::{
    normalize_symbol, EntryFields, Enrichment, ValidationError, WatchlistEntry, WatchlistError,
};

const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_CONCURRENCY: usize = 4;

// ============================================================================
// Bulk Report
// ============================================================================

/// Outcome of [`WatchlistStore::bulk_enrich_from_table`].
#[derive(Debug, Default)]
pub struct BulkReport {
    /// Symbols written to the store, in row order
    pub upserted: Vec<String>,
    /// Symbols whose lookup failed; they were still written with fallback values
    pub failed_lookups: Vec<String>,
    /// Rows skipped because they failed validation
    pub rejected: Vec<(String, ValidationError)>,
}

impl BulkReport {
    pub fn summary(&self) -> String {
        format!(
            "{} rows upserted, {} lookup failures, {} rejected",
            self.upserted.len(),
            self.failed_lookups.len(),
            self.rejected.len()
        )
    }
}

// ============================================================================
// Watchlist Store
// ============================================================================

#[derive(Debug)]
pub struct WatchlistStore {
    entries: Vec<WatchlistEntry>,
    path: Option<PathBuf>,
    warnings: Vec<Warning>,
    lookup_timeout: Duration,
    concurrency: usize,
}

impl Default for WatchlistStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchlistStore {
    /// Empty in-memory store.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            path: None,
            warnings: Vec::new(),
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Load the store persisted at `path`; a missing file is an empty list.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, WatchlistError> {
        let path = path.into();
        let entries = match std::fs::read(&path) {
            Ok(data) => serde_json::from_slice::<Vec<WatchlistEntry>>(&data).map_err(|source| {
                WatchlistError::Corrupt {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No watch-list file yet, starting empty");
                Vec::new()
            }
            Err(source) => return Err(WatchlistError::Persist { path, source }),
        };

        info!(path = %path.display(), entries = entries.len(), "Loaded watch-list");
        Ok(Self {
            entries,
            path: Some(path),
            ..Self::new()
        })
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the list back to its file. In-memory stores are a no-op.
    pub fn save(&self) -> Result<(), WatchlistError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let persist = |source| WatchlistError::Persist {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(persist)?;
        }
        let json = serde_json::to_vec_pretty(&self.entries)
            .map_err(|e| persist(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

        // Write beside the target, then rename over it.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(persist)?;
        std::fs::rename(&tmp, path).map_err(persist)?;

        debug!(path = %path.display(), entries = self.entries.len(), "Saved watch-list");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, symbol: &str) -> Option<&WatchlistEntry> {
        let symbol = normalize_symbol(symbol);
        self.entries.iter().find(|e| e.symbol == symbol)
    }

    fn position(&self, symbol: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.symbol == symbol)
    }

    // ------------------------------------------------------------------------
    // CRUD
    // ------------------------------------------------------------------------

    /// Insert `symbol` at the end, or replace its fields and enrichment in
    /// place if already present.
    ///
    /// Nothing changes when validation fails.
    pub fn upsert(
        &mut self,
        symbol: &str,
        fields: EntryFields,
        enrichment: Enrichment,
    ) -> Result<WatchlistEntry, ValidationError> {
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }
        fields.validate()?;
        enrichment.validate()?;

        let entry = WatchlistEntry {
            symbol,
            fields,
            enrichment,
        };
        match self.position(&entry.symbol) {
            Some(idx) => {
                debug!(symbol = %entry.symbol, "Updating watch-list entry");
                self.entries[idx] = entry.clone();
            }
            None => {
                debug!(symbol = %entry.symbol, "Adding watch-list entry");
                self.entries.push(entry.clone());
            }
        }
        Ok(entry)
    }

    /// Remove `symbol`; returns whether anything was removed.
    pub fn remove(&mut self, symbol: &str) -> bool {
        let symbol = normalize_symbol(symbol);
        match self.position(&symbol) {
            Some(idx) => {
                self.entries.remove(idx);
                debug!(symbol = %symbol, "Removed watch-list entry");
                true
            }
            None => false,
        }
    }

    /// Snapshot of all entries in insertion order.
    pub fn export_rows(&self) -> Vec<WatchlistEntry> {
        self.entries.clone()
    }

    /// The export table as CSV.
    pub fn export_csv(&self) -> Result<Vec<u8>, ExportError> {
        table::to_csv(&self.entries)
    }

    // ------------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------------

    /// Refresh the market data of an existing entry.
    ///
    /// A failed lookup keeps the previous values and records a warning.
    pub async fn enrich<L>(
        &mut self,
        symbol: &str,
        lookup: &L,
    ) -> Result<WatchlistEntry, WatchlistError>
    where
        L: ProfileLookup + ?Sized,
    {
        let symbol = normalize_symbol(symbol);
        let idx = self
            .position(&symbol)
            .ok_or_else(|| WatchlistError::UnknownSymbol(symbol.clone()))?;

        match bounded(self.lookup_timeout, lookup.fetch(&symbol)).await {
            Ok(profile) => {
                let entry = &mut self.entries[idx];
                entry.enrichment = Enrichment::from(&profile);
                fill_blanks(&mut entry.fields, &profile);
                debug!(symbol = %symbol, "Enriched watch-list entry");
            }
            Err(e) => self.record_failure(&symbol, &e),
        }

        Ok(self.entries[idx].clone())
    }

    /// Look `symbol` up and upsert it with the result.
    ///
    /// Input is validated before the lookup is issued. When the lookup fails
    /// the entry keeps its previous market data (or none, for a new symbol)
    /// and a warning is recorded.
    pub async fn submit<L>(
        &mut self,
        symbol: &str,
        mut fields: EntryFields,
        lookup: &L,
    ) -> Result<WatchlistEntry, WatchlistError>
    where
        L: ProfileLookup + ?Sized,
    {
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            return Err(ValidationError::EmptySymbol.into());
        }
        fields.validate()?;

        let enrichment = match bounded(self.lookup_timeout, lookup.fetch(&symbol)).await {
            Ok(profile) => {
                fill_blanks(&mut fields, &profile);
                Enrichment::from(&profile)
            }
            Err(e) => {
                self.record_failure(&symbol, &e);
                self.prior_enrichment(&symbol)
            }
        };

        Ok(self.upsert(&symbol, fields, enrichment)?)
    }

    /// Look up every row of an uploaded table and upsert it.
    ///
    /// Rows failing validation are skipped without a lookup. Lookups run
    /// concurrently but rows are applied in table order.
    pub async fn bulk_enrich_from_table<L>(
        &mut self,
        rows: Vec<WatchlistEntry>,
        lookup: &L,
    ) -> BulkReport
    where
        L: ProfileLookup + ?Sized,
    {
        let mut report = BulkReport::default();
        let mut valid = Vec::with_capacity(rows.len());

        for mut row in rows {
            row.symbol = normalize_symbol(&row.symbol);
            let checked = if row.symbol.is_empty() {
                Err(ValidationError::EmptySymbol)
            } else {
                row.fields.validate()
            };
            match checked {
                Ok(()) => valid.push(row),
                Err(e) => {
                    warn!(symbol = %row.symbol, error = %e, "Skipping invalid row");
                    self.warnings.push(Warning::new(&row.symbol, &e));
                    report.rejected.push((row.symbol, e));
                }
            }
        }

        let bound = self.lookup_timeout;
        let fetched: Vec<(WatchlistEntry, Result<CompanyProfile, LookupError>)> =
            stream::iter(valid)
                .map(|row| async move {
                    let result = bounded(bound, lookup.fetch(&row.symbol)).await;
                    (row, result)
                })
                .buffered(self.concurrency)
                .collect()
                .await;

        for (mut row, result) in fetched {
            let enrichment = match result {
                Ok(profile) => {
                    fill_blanks(&mut row.fields, &profile);
                    Enrichment::from(&profile)
                }
                Err(e) => {
                    self.record_failure(&row.symbol, &e);
                    report.failed_lookups.push(row.symbol.clone());
                    match self.get(&row.symbol) {
                        Some(existing) => existing.enrichment.clone(),
                        None => row.enrichment.clone(),
                    }
                }
            };

            match self.upsert(&row.symbol, row.fields, enrichment) {
                Ok(entry) => report.upserted.push(entry.symbol),
                Err(e) => report.rejected.push((row.symbol, e)),
            }
        }

        info!("Bulk import: {}", report.summary());
        report
    }

    /// Drain the warnings recorded since the last call.
    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }

    fn record_failure(&mut self, symbol: &str, error: &LookupError) {
        warn!(
            symbol = %symbol,
            error = %error,
            recoverable = error.is_recoverable(),
            "Profile lookup failed, keeping previous values"
        );
        self.warnings.push(Warning::new(symbol, error));
    }

    fn prior_enrichment(&self, symbol: &str) -> Enrichment {
        self.get(symbol)
            .map(|e| e.enrichment.clone())
            .unwrap_or_default()
    }
}

/// Fill a blank name or sector from the profile.
fn fill_blanks(fields: &mut EntryFields, profile: &CompanyProfile) {
    if fields.company_name.trim().is_empty() {
        if let Some(name) = &profile.company_name {
            fields.company_name = name.clone();
        }
    }
    if fields.sector.trim().is_empty() {
        if let Some(sector) = &profile.sector {
            fields.sector = sector.clone();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
