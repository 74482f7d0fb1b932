//! Configuration validation.
//!
//! Collects every problem in one pass so a broken config file is fixed in
//! one edit, not one error at a time.

use crate::config::{Config, FmpConfig, ObservabilityConfig, ScreenerSettings, SUPPORTED_INDICES};
use crate::error::ConfigError;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> Result<(), ConfigError>;
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        for result in [
            self.fmp.validate(),
            self.screener.validate(),
            self.observability.validate(),
        ] {
            match result {
                Ok(()) => {}
                Err(ConfigError::Multiple(inner)) => errors.extend(inner),
                Err(e) => errors.push(e),
            }
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ConfigError::Multiple(errors)),
        }
    }
}

impl Validate for FmpConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            errors.push(ConfigError::invalid(
                "fmp.base_url",
                format!("'{}' is not an http(s) URL", self.base_url),
            ));
        }
        if self.api_key_env.trim().is_empty() {
            errors.push(ConfigError::invalid("fmp.api_key_env", "must name a variable"));
        }
        if self.timeout_secs == 0 {
            errors.push(ConfigError::invalid("fmp.timeout_secs", "must be greater than 0"));
        }
        if self.concurrency == 0 {
            errors.push(ConfigError::invalid("fmp.concurrency", "must be greater than 0"));
        }
        if !SUPPORTED_INDICES.contains(&self.index.as_str()) {
            errors.push(ConfigError::invalid(
                "fmp.index",
                format!("'{}' is not one of {:?}", self.index, SUPPORTED_INDICES),
            ));
        }

        collect(errors)
    }
}

impl Validate for ScreenerSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if !self.threshold.is_finite() {
            errors.push(ConfigError::invalid("screener.threshold", "must be a finite number"));
        }

        let policy = self.policy.trim();
        let policy_ok = policy.eq_ignore_ascii_case("all")
            || policy.parse::<usize>().map(|k| k >= 1).unwrap_or(false);
        if !policy_ok {
            errors.push(ConfigError::invalid(
                "screener.policy",
                format!("'{}' must be \"all\" or a positive period count", self.policy),
            ));
        }

        if self.max_periods == 0 {
            errors.push(ConfigError::invalid("screener.max_periods", "must be greater than 0"));
        }
        if self.limit == Some(0) {
            errors.push(ConfigError::invalid("screener.limit", "must be greater than 0 when set"));
        }

        collect(errors)
    }
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if !["trace", "debug", "info", "warn", "error"]
            .contains(&self.log_level.to_lowercase().as_str())
        {
            errors.push(ConfigError::invalid(
                "observability.log_level",
                format!("unknown level '{}'", self.log_level),
            ));
        }
        if !["pretty", "json"].contains(&self.log_format.as_str()) {
            errors.push(ConfigError::invalid(
                "observability.log_format",
                format!("'{}' must be \"pretty\" or \"json\"", self.log_format),
            ));
        }

        collect(errors)
    }
}

fn collect(mut errors: Vec<ConfigError>) -> Result<(), ConfigError> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ConfigError::Multiple(errors)),
    }
}
