//! Screener configuration module.
//!
//! Turns the `screener` / `fmp` sections of the shared config into the typed
//! settings the engine runs with.

use leaders_common::{Config, ConfigError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Screening Policy
// ============================================================================

/// How many ROE periods must beat the threshold for a company to pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ScreeningPolicy {
    /// Every reported period must be above the threshold
    All,
    /// At least this many periods must be above the threshold
    AtLeast(usize),
}

impl Default for ScreeningPolicy {
    fn default() -> Self {
        Self::All
    }
}

impl fmt::Display for ScreeningPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::AtLeast(k) => write!(f, "{}", k),
        }
    }
}

impl FromStr for ScreeningPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        match s.parse::<usize>() {
            Ok(k) if k >= 1 => Ok(Self::AtLeast(k)),
            _ => Err(format!(
                "Unknown screening policy '{}': expected \"all\" or a positive period count",
                s
            )),
        }
    }
}

impl TryFrom<String> for ScreeningPolicy {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ScreeningPolicy> for String {
    fn from(policy: ScreeningPolicy) -> Self {
        policy.to_string()
    }
}

// ============================================================================
// Screener Configuration
// ============================================================================

/// Settings for a screening run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenerConfig {
    /// ROE threshold in percent
    pub threshold: f64,
    /// Inclusion policy
    pub policy: ScreeningPolicy,
    /// Annual periods fetched per company
    pub max_periods: usize,
    /// Only screen the first N constituents
    pub limit: Option<usize>,
    /// ROE lookups in flight at once
    pub concurrency: usize,
    /// Bound on each lookup
    pub lookup_timeout: Duration,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            threshold: 15.0,
            policy: ScreeningPolicy::All,
            max_periods: 10,
            limit: None,
            concurrency: 4,
            lookup_timeout: Duration::from_secs(10),
        }
    }
}

impl ScreenerConfig {
    /// Build from the shared configuration.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let policy = config
            .screener
            .policy
            .parse()
            .map_err(|reason: String| ConfigError::invalid("screener.policy", reason))?;

        Ok(Self {
            threshold: config.screener.threshold,
            policy,
            max_periods: config.screener.max_periods,
            limit: config.screener.limit,
            concurrency: config.fmp.concurrency.max(1),
            lookup_timeout: config.fmp.timeout(),
        })
    }

    /// One-line description for logs and report headers.
    pub fn summary(&self) -> String {
        match self.policy {
            ScreeningPolicy::All => format!("ROE>{}% in every period", self.threshold),
            ScreeningPolicy::AtLeast(k) => {
                format!("ROE>{}% in at least {} of {} periods", self.threshold, k, self.max_periods)
            }
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
    fn test_policy_parse() {
        assert_eq!("all".parse::<ScreeningPolicy>(), Ok(ScreeningPolicy::All));
        assert_eq!(" All ".parse::<ScreeningPolicy>(), Ok(ScreeningPolicy::All));
        assert_eq!("5".parse::<ScreeningPolicy>(), Ok(ScreeningPolicy::AtLeast(5)));
        assert!("0".parse::<ScreeningPolicy>().is_err());
        assert!("most".parse::<ScreeningPolicy>().is_err());
    }

    #[test]
    fn test_policy_serde_as_string() {
        let json = serde_json::to_string(&ScreeningPolicy::AtLeast(5)).unwrap();
        assert_eq!(json, "\"5\"");
        let parsed: ScreeningPolicy = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(parsed, ScreeningPolicy::All);
        assert!(serde_json::from_str::<ScreeningPolicy>("\"none\"").is_err());
    }

    #[test]
    fn test_from_default_config() {
        let config = ScreenerConfig::from_config(&Config::default()).unwrap();
        assert_eq!(config, ScreenerConfig::default());
    }

    #[test]
    fn test_from_config_at_least() {
        let mut global = Config::default();
        global.screener.policy = "5".into();
        global.screener.threshold = 20.0;
        global.screener.limit = Some(50);
        global.fmp.concurrency = 8;

        let config = ScreenerConfig::from_config(&global).unwrap();
        assert_eq!(config.policy, ScreeningPolicy::AtLeast(5));
        assert!((config.threshold - 20.0).abs() < 0.001);
        assert_eq!(config.limit, Some(50));
        assert_eq!(config.concurrency, 8);
        assert!(config.summary().contains("at least 5 of 10"));
    }

    #[test]
    fn test_from_config_bad_policy() {
        let mut global = Config::default();
        global.screener.policy = "half".into();
        let err = ScreenerConfig::from_config(&global).unwrap_err();
        assert!(err.to_string().contains("screener.policy"));
    }
}
