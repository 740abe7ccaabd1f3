//! CLI configuration.

use std::time::Duration;

use fxconv_common::Currency;
use fxconv_converter::ConverterConfig;
use fxconv_fx::{FloatRatesConfig, RateCacheConfig, FLOATRATES_BASE_URL};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment value could not be parsed.
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    /// A setting failed validation.
    #[error("Configuration error: {0}")]
    Invalid(String),
}

/// fxconv configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Rate feed root URL.
    pub rates_url: String,
    /// How long fetched rates stay fresh.
    pub cache_ttl: Duration,
    /// HTTP request timeout. `None` leaves it to the transport.
    pub http_timeout: Option<Duration>,
    /// Base currency selected at start.
    pub default_base: String,
    /// Target currency selected at start.
    pub default_target: String,
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Emit logs as JSON.
    pub log_json: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            rates_url: FLOATRATES_BASE_URL.to_string(),
            cache_ttl: Duration::from_millis(60_000),
            http_timeout: Some(Duration::from_secs(10)),
            default_base: "GBP".to_string(),
            default_target: "USD".to_string(),
            log_level: "warn".to_string(),
            log_json: false,
        }
    }
}

impl CliConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup, falling back to defaults for
    /// missing keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup("FXCONV_RATES_URL") {
            config.rates_url = url;
        }

        if let Some(ttl) = lookup("FXCONV_CACHE_TTL_MS") {
            config.cache_ttl = Duration::from_millis(parse_millis("FXCONV_CACHE_TTL_MS", ttl)?);
        }

        if let Some(timeout) = lookup("FXCONV_HTTP_TIMEOUT_MS") {
            let millis = parse_millis("FXCONV_HTTP_TIMEOUT_MS", timeout)?;
            // 0 disables the client timeout
            config.http_timeout = (millis > 0).then(|| Duration::from_millis(millis));
        }

        if let Some(base) = lookup("FXCONV_DEFAULT_BASE") {
            config.default_base = base;
        }

        if let Some(target) = lookup("FXCONV_DEFAULT_TARGET") {
            config.default_target = target;
        }

        if let Some(level) = lookup("FXCONV_LOG_LEVEL") {
            config.log_level = level;
        }

        if let Some(json) = lookup("FXCONV_LOG_JSON") {
            config.log_json = match json.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "FXCONV_LOG_JSON",
                        value: json,
                    })
                }
            };
        }

        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rates_url.trim().is_empty() {
            return Err(ConfigError::Invalid("Rates URL cannot be empty".to_string()));
        }

        if self.cache_ttl.is_zero() {
            return Err(ConfigError::Invalid("Cache TTL must be positive".to_string()));
        }

        if Currency::new(self.default_base.as_str()).is_empty()
            || Currency::new(self.default_target.as_str()).is_empty()
        {
            return Err(ConfigError::Invalid(
                "Default currencies cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Converter settings derived from this configuration.
    pub fn converter_config(&self) -> ConverterConfig {
        ConverterConfig {
            default_base: Currency::new(self.default_base.as_str()),
            default_target: Currency::new(self.default_target.as_str()),
            cache: RateCacheConfig {
                ttl: chrono::Duration::milliseconds(
                    i64::try_from(self.cache_ttl.as_millis()).unwrap_or(i64::MAX),
                ),
            },
        }
    }

    /// Provider settings derived from this configuration.
    pub fn provider_config(&self) -> FloatRatesConfig {
        FloatRatesConfig {
            base_url: self.rates_url.clone(),
            timeout: self.http_timeout,
        }
    }
}

fn parse_millis(key: &'static str, value: String) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.converter_config().default_base, Currency::gbp());
        assert_eq!(
            config.converter_config().cache.ttl,
            chrono::Duration::milliseconds(60_000)
        );
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = CliConfig::from_lookup(lookup(&[
            ("FXCONV_RATES_URL", "http://localhost:8080/daily"),
            ("FXCONV_CACHE_TTL_MS", "5000"),
            ("FXCONV_HTTP_TIMEOUT_MS", "0"),
            ("FXCONV_DEFAULT_BASE", "eur"),
            ("FXCONV_LOG_JSON", "true"),
        ]))
        .unwrap();

        assert_eq!(config.rates_url, "http://localhost:8080/daily");
        assert_eq!(config.cache_ttl, Duration::from_secs(5));
        assert_eq!(config.http_timeout, None);
        assert_eq!(config.converter_config().default_base, Currency::eur());
        assert_eq!(config.default_target, "USD");
        assert!(config.log_json);
        assert_eq!(config.provider_config().base_url, "http://localhost:8080/daily");
    }

    #[test]
    fn test_invalid_values() {
        let err = CliConfig::from_lookup(lookup(&[("FXCONV_CACHE_TTL_MS", "soon")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "FXCONV_CACHE_TTL_MS",
                value: "soon".to_string(),
            }
        );

        assert!(CliConfig::from_lookup(lookup(&[("FXCONV_LOG_JSON", "maybe")])).is_err());
    }

    #[test]
    fn test_invalid_config() {
        let mut config = CliConfig::default();
        config.cache_ttl = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = CliConfig::default();
        config.default_target = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
