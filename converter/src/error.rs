//! Converter error types.

use fxconv_fx::FxError;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::validation::AmountError;

/// Errors surfaced by the conversion controller.
///
/// These never escape a dispatch: they are stored in the conversion state and
/// shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConverterError {
    /// Malformed or out-of-range amount.
    #[error(transparent)]
    Amount(#[from] AmountError),

    /// Rate fetch failure or missing rate.
    #[error(transparent)]
    Rates(#[from] FxError),

    /// `amount × rate` does not fit a decimal.
    #[error("Converted amount is out of range")]
    Overflow,
}

impl ConverterError {
    /// Whether this is an amount validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, ConverterError::Amount(_))
    }
}

impl Serialize for ConverterError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxconv_common::{Currency, CurrencyPair};

    #[test]
    fn test_messages_pass_through() {
        let amount: ConverterError = AmountError::TooManyDecimals.into();
        assert_eq!(amount.to_string(), "Maximum 2 decimal places allowed");
        assert!(amount.is_validation());

        let missing: ConverterError =
            FxError::RateNotAvailable(CurrencyPair::new(Currency::eur(), Currency::jpy())).into();
        assert_eq!(missing.to_string(), "Exchange rate not available");
        assert!(!missing.is_validation());
    }
}
