//! CSV codec for the watch-list table.
//!
//! Export writes the fixed column set below. Import is lenient: columns are
//! matched by header name (the dashboard's older "Allocation" and
//! "Investment Amount" headers are accepted), "%", "$", whitespace and
//! thousands separators are stripped from numbers, and "N/A" or an empty
//! cell reads back as missing. Text cells are kept verbatim.

use csv::StringRecord;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::export::ExportError;

use super::types::{
    EntryFields, Enrichment, WatchlistEntry, DEFAULT_ALLOCATION, DEFAULT_INVESTMENT_AMOUNT,
    DEFAULT_SHARES,
};

/// Export header, in column order.
pub const COLUMNS: [&str; 10] = [
    "Symbol",
    "Company Name",
    "Sector",
    "Allocation (%)",
    "Investment Amount ($)",
    "Shares",
    "Price",
    "PE Ratio",
    "Market Cap",
    "Yield",
];

/// Placeholder for a value the profile lookup did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

// ============================================================================
// Import Error
// ============================================================================

/// An uploaded table could not be read.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column \"{0}\"")]
    MissingColumn(&'static str),

    #[error("Line {line}: invalid number {value:?} in column \"{column}\"")]
    InvalidNumber {
        line: u64,
        column: &'static str,
        value: String,
    },
}

// ============================================================================
// Export
// ============================================================================

/// Render entries as UTF-8 CSV with a header row.
pub fn to_csv(entries: &[WatchlistEntry]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(COLUMNS)?;

    for entry in entries {
        let e = &entry.enrichment;
        writer.write_record([
            entry.symbol.clone(),
            entry.fields.company_name.clone(),
            entry.fields.sector.clone(),
            entry.fields.allocation.to_string(),
            entry.fields.investment_amount.to_string(),
            entry.fields.shares.to_string(),
            optional(e.price),
            optional(e.pe),
            optional(e.market_cap),
            optional(e.dividend_yield),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Flush(e.into_error().to_string()))
}

fn optional(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}

// ============================================================================
// Import
// ============================================================================

/// Column positions resolved from the header row.
struct Layout {
    symbol: usize,
    company_name: Option<usize>,
    sector: Option<usize>,
    allocation: Option<usize>,
    investment_amount: Option<usize>,
    shares: Option<usize>,
    price: Option<usize>,
    pe: Option<usize>,
    market_cap: Option<usize>,
    dividend_yield: Option<usize>,
}

impl Layout {
    fn from_headers(headers: &StringRecord) -> Result<Self, ImportError> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };

        Ok(Self {
            symbol: find(&["Symbol"]).ok_or(ImportError::MissingColumn("Symbol"))?,
            company_name: find(&["Company Name", "Name"]),
            sector: find(&["Sector"]),
            allocation: find(&["Allocation (%)", "Allocation"]),
            investment_amount: find(&["Investment Amount ($)", "Investment Amount"]),
            shares: find(&["Shares"]),
            price: find(&["Price"]),
            pe: find(&["PE Ratio", "PE", "P/E"]),
            market_cap: find(&["Market Cap"]),
            dividend_yield: find(&["Yield", "Dividend Yield"]),
        })
    }
}

/// Parse a table produced by [`to_csv`] or by the dashboard.
///
/// Rows with a blank symbol are skipped. Missing allocation, amount and
/// share cells take the form defaults. Values are not validated here; the
/// store does that on upsert.
pub fn from_csv(data: &[u8]) -> Result<Vec<WatchlistEntry>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(data);
    let layout = Layout::from_headers(reader.headers()?)?;

    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("");

        let symbol = cell(Some(layout.symbol)).trim();
        if symbol.is_empty() {
            continue;
        }

        let number =
            |idx: Option<usize>, column: &'static str| -> Result<Option<f64>, ImportError> {
                parse_number(cell(idx)).map_err(|value| ImportError::InvalidNumber {
                    line,
                    column,
                    value,
                })
            };

        let shares = match number(layout.shares, "Shares")? {
            Some(v) if v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 => v as u32,
            Some(_) => {
                return Err(ImportError::InvalidNumber {
                    line,
                    column: "Shares",
                    value: cell(layout.shares).to_string(),
                })
            }
            None => DEFAULT_SHARES,
        };

        entries.push(WatchlistEntry {
            symbol: symbol.to_string(),
            fields: EntryFields {
                company_name: cell(layout.company_name).to_string(),
                sector: cell(layout.sector).to_string(),
                allocation: number(layout.allocation, "Allocation (%)")?
                    .unwrap_or(DEFAULT_ALLOCATION),
                investment_amount: number(layout.investment_amount, "Investment Amount ($)")?
                    .unwrap_or(DEFAULT_INVESTMENT_AMOUNT),
                shares,
            },
            enrichment: Enrichment {
                price: number(layout.price, "Price")?,
                pe: number(layout.pe, "PE Ratio")?,
                market_cap: number(layout.market_cap, "Market Cap")?,
                dividend_yield: number(layout.dividend_yield, "Yield")?,
            },
        });
    }

    Ok(entries)
}

/// Read and parse a table from disk.
pub fn read_csv_file(path: &Path) -> Result<Vec<WatchlistEntry>, ImportError> {
    let data = std::fs::read(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    from_csv(&data)
}

/// Lenient number parse. `Err` carries the offending text.
fn parse_number(raw: &str) -> Result<Option<f64>, String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '%' | '$' | ',') && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case(NOT_AVAILABLE) {
        return Ok(None);
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(raw.to_string()),
    }
}

// ============================================================================
// Tests
// ============================================================================
