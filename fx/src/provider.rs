//! Rate provider traits and implementations.

use async_trait::async_trait;
use fxconv_common::{Currency, RateEntry, RateTable};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{FxError, FxResult};

/// Trait for exchange rate providers.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Fetch the full rate table for `base`.
    ///
    /// Rates are expressed as units of each currency per 1 unit of `base`.
    async fn fetch_rates(&self, base: &Currency) -> FxResult<RateTable>;
}

/// Default FloatRates daily feed location.
pub const FLOATRATES_BASE_URL: &str = "https://www.floatrates.com/daily";

/// Configuration for [`FloatRatesProvider`].
#[derive(Debug, Clone)]
pub struct FloatRatesConfig {
    /// Feed root; `/{base}.json` is appended.
    pub base_url: String,
    /// Whole-request timeout. `None` leaves it to the transport.
    pub timeout: Option<Duration>,
}

impl Default for FloatRatesConfig {
    fn default() -> Self {
        Self {
            base_url: FLOATRATES_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

/// One entry of the FloatRates payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FloatRatesEntry {
    rate: Decimal,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    inverse_rate: Option<Decimal>,
    #[serde(default)]
    date: Option<String>,
}

/// Provides rates from the public FloatRates daily JSON feed.
pub struct FloatRatesProvider {
    client: reqwest::Client,
    config: FloatRatesConfig,
}

impl FloatRatesProvider {
    /// Provider name used in logs and errors.
    pub const NAME: &'static str = "floatrates";

    /// Create a provider with the given configuration.
    pub fn new(config: FloatRatesConfig) -> FxResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FxError::provider(Self::NAME, e))?;

        Ok(Self { client, config })
    }

    /// URL of the feed for `base`.
    pub fn url_for(&self, base: &Currency) -> String {
        format!(
            "{}/{}.json",
            self.config.base_url.trim_end_matches('/'),
            base.to_lowercase()
        )
    }

    /// Decode a feed body into a rate table.
    ///
    /// Keys are upper-cased; per-entry metadata is kept when present.
    pub fn parse_response(body: &str) -> FxResult<RateTable> {
        let raw: HashMap<String, FloatRatesEntry> =
            serde_json::from_str(body).map_err(|e| FxError::provider(Self::NAME, e))?;

        Ok(raw
            .into_iter()
            .map(|(key, entry)| {
                let mut rate = RateEntry::new(key, entry.rate);
                rate.name = entry.name;
                rate.inverse_rate = entry.inverse_rate;
                rate.date = entry.date;
                rate
            })
            .collect())
    }
}

#[async_trait]
impl RateProvider for FloatRatesProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn fetch_rates(&self, base: &Currency) -> FxResult<RateTable> {
        let url = self.url_for(base);
        debug!(provider = Self::NAME, url = %url, "Requesting rate table");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FxError::provider(Self::NAME, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(provider = Self::NAME, base = %base, status = %status, "Provider returned error status");
            return Err(FxError::provider(Self::NAME, format!("HTTP status {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FxError::provider(Self::NAME, e))?;

        Self::parse_response(&body)
    }
}

/// What a [`MockRateProvider`] answers for one base.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Clone)]
enum MockResponse {
    Table(RateTable),
    Failure(String),
}

/// Mock rate provider for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateProvider {
    name: String,
    responses: dashmap::DashMap<Currency, MockResponse>,
    calls: dashmap::DashMap<Currency, usize>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateProvider {
    /// Create a new mock provider.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            responses: dashmap::DashMap::new(),
            calls: dashmap::DashMap::new(),
        }
    }

    /// Answer fetches for `base` with `table`.
    pub fn set_table(&self, base: impl Into<Currency>, table: RateTable) {
        self.responses.insert(base.into(), MockResponse::Table(table));
    }

    /// Answer fetches for `base` with a provider failure.
    pub fn set_failure(&self, base: impl Into<Currency>, detail: impl Into<String>) {
        self.responses
            .insert(base.into(), MockResponse::Failure(detail.into()));
    }

    /// Total number of fetches served.
    pub fn calls(&self) -> usize {
        self.calls.iter().map(|entry| *entry.value()).sum()
    }

    /// Number of fetches served for `base`.
    pub fn calls_for(&self, base: &Currency) -> usize {
        self.calls.get(base).map(|count| *count).unwrap_or(0)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateProvider for MockRateProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_rates(&self, base: &Currency) -> FxResult<RateTable> {
        *self.calls.entry(base.clone()).or_insert(0) += 1;

        let response = self.responses.get(base).map(|r| r.value().clone());
        match response {
            Some(MockResponse::Table(table)) => Ok(table),
            Some(MockResponse::Failure(detail)) => Err(FxError::provider(&self.name, detail)),
            // Unknown bases answer with an empty table, like a feed with no rows.
            None => Ok(RateTable::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SAMPLE: &str = r#"{
        "usd": {"code": "USD", "alphaCode": "USD", "numericCode": "840",
                "name": "U.S. Dollar", "rate": 1.25,
                "date": "Mon, 19 Oct 2026 11:55:01 GMT", "inverseRate": 0.8},
        "eur": {"code": "EUR", "rate": 1.15}
    }"#;

    #[test]
    fn test_parse_response() {
        let table = FloatRatesProvider::parse_response(SAMPLE).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rate(&Currency::usd()), Some(dec!(1.25)));
        assert_eq!(table.rate(&Currency::eur()), Some(dec!(1.15)));

        assert_eq!(
            table.get(&Currency::usd()),
            Some(
                &RateEntry::new("USD", dec!(1.25))
                    .with_name("U.S. Dollar")
                    .with_inverse_rate(dec!(0.8))
                    .with_date("Mon, 19 Oct 2026 11:55:01 GMT")
            )
        );
        assert_eq!(
            table.get(&Currency::eur()),
            Some(&RateEntry::new("EUR", dec!(1.15)))
        );
    }

    #[test]
    fn test_parse_invalid_body() {
        let result = FloatRatesProvider::parse_response("<html>oops</html>");
        assert!(matches!(result, Err(FxError::Provider { .. })));

        let missing_rate = FloatRatesProvider::parse_response(r#"{"usd": {"code": "USD"}}"#);
        assert!(missing_rate.is_err());
    }

    #[test]
    fn test_url_for_lowercases_base() {
        let provider = FloatRatesProvider::new(FloatRatesConfig {
            base_url: "http://localhost:9999/daily/".to_string(),
            timeout: Some(Duration::from_secs(2)),
        })
        .unwrap();

        assert_eq!(
            provider.url_for(&Currency::gbp()),
            "http://localhost:9999/daily/gbp.json"
        );
    }

    #[tokio::test]
    async fn test_mock_provider() {
        let provider = MockRateProvider::new("test");
        let table: RateTable = vec![RateEntry::new("USD", dec!(1.25))].into_iter().collect();
        provider.set_table("GBP", table.clone());
        provider.set_failure("EUR", "boom");

        assert_eq!(provider.fetch_rates(&Currency::gbp()).await.unwrap(), table);
        assert!(provider.fetch_rates(&Currency::eur()).await.is_err());
        assert!(provider.fetch_rates(&Currency::jpy()).await.unwrap().is_empty());

        assert_eq!(provider.calls(), 3);
        assert_eq!(provider.calls_for(&Currency::gbp()), 1);
    }

    #[test]
    fn test_unreachable_feed_is_provider_error() {
        let provider = FloatRatesProvider::new(FloatRatesConfig {
            base_url: "http://127.0.0.1:1/daily".to_string(),
            timeout: Some(Duration::from_secs(2)),
        })
        .unwrap();

        let err = tokio_test::block_on(provider.fetch_rates(&Currency::gbp())).unwrap_err();
        assert!(matches!(err, FxError::Provider { .. }));
        assert_eq!(err.to_string(), "Network error or invalid response");
    }
}
