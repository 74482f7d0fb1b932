//! ROE Screener Module.
//!
//! Finds companies whose return on equity stays above a threshold over
//! their reported history.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐     ┌──────────────────┐
//! │ IndexConstituents│────▶│  ScreenerEngine  │────▶│  ScreenerReport  │
//! │ RoeHistory (FMP) │     │ (bounded fetch)  │     │  (CSV / summary) │
//! └──────────────────┘     └────────┬─────────┘     └──────────────────┘
//!                                   │
//!                          ┌────────▼─────────┐
//!                          │ quantitative.rs  │
//!                          │ screen() (pure)  │
//!                          └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use leaders_screener::screener::{ScreenerConfig, ScreenerEngine, ScreenerReport};
//!
//! let engine = ScreenerEngine::new(ScreenerConfig::default(), Arc::new(client));
//! let run = engine.run_index_scan().await?;
//! let csv = ScreenerReport::new(&run).to_csv()?;
//! ```

pub mod config;
pub mod engine;
pub mod quantitative;
pub mod report;

pub use config::{ScreenerConfig, ScreeningPolicy};
pub use engine::{ScreenerEngine, ScreeningRun};
pub use quantitative::{passes, screen, FilterResult, ScreeningResult};
pub use report::ScreenerReport;
