//! Financial Modeling Prep (FMP) API adapter.
//!
//! # API Documentation
//! https://site.financialmodelingprep.com/developer/docs
//!
//! # Authentication
//! The API key travels as the `apikey` query parameter. It is resolved from
//! configuration by name at startup and never appears in logs or errors.

use async_trait::async_trait;
use leaders_common::{Config, ConfigError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::provider::{IndexConstituents, LookupError, ProfileLookup, RoeHistory};
use super::{CompanyProfile, Constituent, ReturnOnEquitySeries, RoeReading};

// ============================================================================
// Constants
// ============================================================================

/// Company profile endpoint, `{symbol}` appended
const PROFILE_ENDPOINT: &str = "/profile/";

/// Financial ratios endpoint, `{symbol}` appended
const RATIOS_ENDPOINT: &str = "/ratios/";

/// Index constituents endpoint suffix, prefixed with the index name
const CONSTITUENT_SUFFIX: &str = "_constituent";

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProfile {
    symbol: String,
    company_name: Option<String>,
    sector: Option<String>,
    price: Option<f64>,
    #[serde(alias = "peRatio")]
    pe: Option<f64>,
    #[serde(alias = "marketCap")]
    mkt_cap: Option<f64>,
    #[serde(rename = "yield", alias = "dividendYield")]
    dividend_yield: Option<f64>,
    last_div: Option<f64>,
}

impl From<RawProfile> for CompanyProfile {
    fn from(raw: RawProfile) -> Self {
        // Profile payloads often carry only the last annual dividend.
        let dividend_yield = raw.dividend_yield.or_else(|| match (raw.last_div, raw.price) {
            (Some(div), Some(price)) if price > 0.0 => Some(div / price * 100.0),
            _ => None,
        });

        Self {
            symbol: raw.symbol,
            company_name: raw.company_name.filter(|s| !s.trim().is_empty()),
            sector: raw.sector.filter(|s| !s.trim().is_empty()),
            price: raw.price,
            pe: raw.pe,
            market_cap: raw.mkt_cap,
            dividend_yield,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConstituent {
    symbol: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    sector: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRatios {
    date: String,
    /// Fraction, e.g. 0.285 for 28.5%
    return_on_equity: Option<f64>,
}

// ============================================================================
// FMP Client
// ============================================================================

/// HTTP client for the FMP v3 API.
///
/// Implements [`ProfileLookup`], [`IndexConstituents`] and [`RoeHistory`].
#[derive(Clone)]
pub struct FmpClient {
    /// API key
    api_key: String,
    /// Base URL without trailing slash
    base_url: String,
    /// Index used by [`IndexConstituents::list`]
    index: String,
    /// Per-request bound
    timeout: Duration,
    /// HTTP client
    client: reqwest::Client,
}

impl std::fmt::Debug for FmpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FmpClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("index", &self.index)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl FmpClient {
    /// Create a client against `base_url` with the given key and timeout.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            index: "sp500".to_string(),
            timeout,
            client,
        }
    }

    /// Select the index whose constituents [`IndexConstituents::list`] returns.
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    /// Create from config, resolving the API key.
    ///
    /// Fails when the key cannot be resolved, so a missing key surfaces at
    /// startup rather than as an `apikey=` query parameter.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let api_key = config.api_key()?;
        Ok(Self::new(api_key, config.fmp.base_url.clone(), config.fmp.timeout())
            .with_index(config.fmp.index.clone()))
    }

    /// Index name in use.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// GET `{base_url}{path}` and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, LookupError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(path = %path, "FMP request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("apikey", self.api_key.as_str())])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        if body.trim().is_empty() {
            return Err(LookupError::Empty(path.to_string()));
        }

        serde_json::from_str(&body).map_err(|e| LookupError::Malformed(e.to_string()))
    }

    fn transport_error(&self, e: reqwest::Error) -> LookupError {
        if e.is_timeout() {
            LookupError::Timeout {
                after: self.timeout,
            }
        } else if e.is_decode() {
            LookupError::Malformed(e.without_url().to_string())
        } else {
            // Strip the URL: it carries the API key.
            LookupError::Network(e.without_url().to_string())
        }
    }
}

/// Check that `symbol` can be placed in a URL path as-is.
///
/// Tickers are ASCII letters, digits, `.`, `-` and `^` (index symbols such
/// as `^GSPC`), with at least one letter or digit.
fn path_symbol(symbol: &str) -> Result<&str, LookupError> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^');
    if symbol.chars().all(allowed) && symbol.chars().any(|c| c.is_ascii_alphanumeric()) {
        Ok(symbol)
    } else {
        Err(LookupError::InvalidSymbol(symbol.to_string()))
    }
}

#[async_trait]
impl ProfileLookup for FmpClient {
    async fn fetch(&self, symbol: &str) -> Result<CompanyProfile, LookupError> {
        let path = format!("{}{}", PROFILE_ENDPOINT, path_symbol(symbol)?);
        let profiles: Vec<RawProfile> = self.get_json(&path, &[]).await?;

        profiles
            .into_iter()
            .next()
            .map(CompanyProfile::from)
            .ok_or_else(|| LookupError::Empty(symbol.to_string()))
    }
}

#[async_trait]
impl IndexConstituents for FmpClient {
    async fn list(&self) -> Result<Vec<Constituent>, LookupError> {
        let path = format!("/{}{}", self.index, CONSTITUENT_SUFFIX);
        let raw: Vec<RawConstituent> = self.get_json(&path, &[]).await?;
        if raw.is_empty() {
            return Err(LookupError::Empty(self.index.clone()));
        }

        Ok(raw
            .into_iter()
            .map(|c| Constituent {
                name: if c.name.is_empty() { c.symbol.clone() } else { c.name },
                symbol: c.symbol,
                sector: c.sector.filter(|s| !s.is_empty()),
            })
            .collect())
    }
}

#[async_trait]
impl RoeHistory for FmpClient {
    async fn fetch_roe(
        &self,
        symbol: &str,
        periods: usize,
    ) -> Result<ReturnOnEquitySeries, LookupError> {
        let path = format!("{}{}", RATIOS_ENDPOINT, path_symbol(symbol)?);
        let query = [("period", "annual".to_string()), ("limit", periods.to_string())];
        let ratios: Vec<RawRatios> = self.get_json(&path, &query).await?;
        if ratios.is_empty() {
            return Err(LookupError::Empty(symbol.to_string()));
        }

        let mut series = ReturnOnEquitySeries::new(ratios.into_iter().filter_map(|r| {
            r.return_on_equity.map(|roe| RoeReading {
                period: r.date,
                value: roe * 100.0,
            })
        }));
        series.truncate(periods);
        Ok(series)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_profile(json: &str) -> CompanyProfile {
        let raw: Vec<RawProfile> = serde_json::from_str(json).unwrap();
        raw.into_iter().next().unwrap().into()
    }

    #[test]
    fn test_profile_mapping() {
        let profile = parse_profile(
            r#"[{"symbol":"AAPL","companyName":"Apple Inc.","sector":"Technology",
                 "price":190.0,"mktCap":2950000000000,"lastDiv":0.96,"pe":29.4}]"#,
        );
        assert_eq!(profile.symbol, "AAPL");
        assert_eq!(profile.company_name.as_deref(), Some("Apple Inc."));
        assert_eq!(profile.sector.as_deref(), Some("Technology"));
        assert_eq!(profile.pe, Some(29.4));
        assert_eq!(profile.market_cap, Some(2_950_000_000_000.0));
        let yield_pct = profile.dividend_yield.unwrap();
        assert!((yield_pct - 0.5053).abs() < 0.001);
    }

    #[test]
    fn test_profile_explicit_yield_wins() {
        let profile =
            parse_profile(r#"[{"symbol":"T","price":17.0,"lastDiv":1.11,"yield":6.5}]"#);
        assert_eq!(profile.dividend_yield, Some(6.5));
    }

    #[test]
    fn test_profile_missing_fields_are_none() {
        let profile = parse_profile(r#"[{"symbol":"XYZ","sector":""}]"#);
        assert_eq!(profile.symbol, "XYZ");
        assert!(profile.company_name.is_none());
        assert!(profile.sector.is_none());
        assert!(profile.price.is_none());
        assert!(profile.pe.is_none());
        assert!(profile.market_cap.is_none());
        assert!(profile.dividend_yield.is_none());
    }

    #[test]
    fn test_zero_price_does_not_divide() {
        let profile = parse_profile(r#"[{"symbol":"Z","price":0.0,"lastDiv":1.0}]"#);
        assert!(profile.dividend_yield.is_none());
    }

    #[test]
    fn test_path_symbol() {
        for ok in ["AAPL", "BRK-B", "BRK.B", "^GSPC", "7203"] {
            assert_eq!(path_symbol(ok), Ok(ok));
        }
        for bad in ["", "..", ".", "A/B", "AAPL?limit=1", "X#frag", "A B", "ÄPPL"] {
            assert_eq!(
                path_symbol(bad),
                Err(LookupError::InvalidSymbol(bad.to_string())),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = FmpClient::new("k", "http://localhost:1234/api/v3/", Duration::from_secs(1));
        assert_eq!(client.base_url, "http://localhost:1234/api/v3");
        assert_eq!(client.index(), "sp500");
    }

    #[test]
    fn test_from_config_requires_key() {
        let mut config = Config::default();
        config.fmp.api_key_env = "LEADERS_TEST_UNSET_KEY_VARIABLE".into();
        let err = FmpClient::from_config(&config).unwrap_err();
        assert!(err.is_api_key());
    }

    #[test]
    fn test_from_config_uses_secret_and_index() {
        let mut config = Config::default();
        config.secrets.fmp_api_key = Some("secret".into());
        config.fmp.index = "dowjones".into();
        let client = FmpClient::from_config(&config).unwrap();
        assert_eq!(client.api_key, "secret");
        assert_eq!(client.index(), "dowjones");
        assert_eq!(client.timeout, Duration::from_secs(10));
        assert!(!format!("{:?}", client).contains("secret"));
    }
}
