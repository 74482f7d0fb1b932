//! Industry Leaders watch-list.
//!
//! User-chosen symbols with allocation, investment amount and share count,
//! enriched from profile lookups and exported as CSV.

mod store;
pub mod table;
mod types;

pub use store::{BulkReport, WatchlistStore};
pub use table::{from_csv, read_csv_file, to_csv, ImportError};
pub use types::{
    normalize_symbol, EntryFields, Enrichment, ValidationError, WatchlistEntry, WatchlistError,
    DEFAULT_ALLOCATION, DEFAULT_INVESTMENT_AMOUNT, DEFAULT_SHARES,
};
