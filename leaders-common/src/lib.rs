//! Leaders Common - Shared configuration, logging and error types.
//!
//! This crate provides:
//! - Configuration types and loading (`~/.leaders/config.json` + `LEADERS_*` overrides)
//! - Configuration validation
//! - Secret resolution by name (the FMP API key)
//! - Logging setup

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;
pub mod validation;

pub use config::{
    Config, FmpConfig, ObservabilityConfig, ScreenerSettings, SecretsConfig, WatchlistConfig,
};
pub use error::ConfigError;
pub use validation::Validate;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::ConfigError;
    pub use crate::logging::init_logging;
    pub use crate::validation::Validate;
}
