//! Leaders Screener Library
//!
//! Finds "industry leaders" (companies whose return on equity stays above a
//! threshold) and keeps a watch-list of them with position sizing and live
//! market data.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                         leaders (CLI)                             │
//! ├───────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐  │
//! │  │  data           │   │  screener       │   │  watchlist      │  │
//! │  │  FmpClient      │──▶│  ScreenerEngine │   │  WatchlistStore │  │
//! │  │  lookup traits  │──▶│  screen() pure  │   │  CSV table      │  │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘  │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Concepts
//!
//! ## Screening policy
//! - **All**: every reported period must beat the threshold
//! - **AtLeast(k)**: at least `k` periods must beat it
//!
//! A period only counts when strictly above the threshold, and a company
//! with no ROE data never passes.
//!
//! ## Lookup failures
//! Failed or timed-out lookups never abort a batch. The affected company
//! keeps its previous data (or none) and a [`warning::Warning`] is recorded.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod data;
pub mod export;
pub mod screener;
pub mod warning;
pub mod watchlist;

pub use data::{CompanyProfile, FmpClient, LookupError, ProfileLookup};
pub use screener::{ScreenerConfig, ScreenerEngine, ScreeningPolicy, ScreeningResult};
pub use warning::Warning;
pub use watchlist::{WatchlistEntry, WatchlistStore};
