//! Rate store error types.

use fxconv_common::CurrencyPair;
use thiserror::Error;

/// Errors that can occur while obtaining or using exchange rates.
///
/// The `Display` text is what the user sees; provider details are kept
/// separately for logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FxError {
    /// The base currency's table has no entry for the target.
    #[error("Exchange rate not available")]
    RateNotAvailable(CurrencyPair),

    /// Transport failure, non-success status or undecodable body.
    #[error("Network error or invalid response")]
    Provider { provider: String, detail: String },
}

impl FxError {
    /// Build a provider error.
    pub fn provider(provider: impl Into<String>, detail: impl ToString) -> Self {
        FxError::Provider {
            provider: provider.into(),
            detail: detail.to_string(),
        }
    }

    /// Diagnostic detail for logging.
    pub fn detail(&self) -> String {
        match self {
            FxError::RateNotAvailable(pair) => format!("no rate for {}", pair),
            FxError::Provider { provider, detail } => format!("{}: {}", provider, detail),
        }
    }

    /// Get error code for structured logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            FxError::RateNotAvailable(_) => "RATE_NOT_AVAILABLE",
            FxError::Provider { .. } => "PROVIDER_ERROR",
        }
    }
}

/// Result type for rate operations.
pub type FxResult<T> = Result<T, FxError>;
