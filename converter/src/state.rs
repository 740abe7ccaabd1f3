//! Conversion state.

use fxconv_common::{Currency, CurrencyPair};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::ConverterError;

/// User-facing selections and the last conversion outcome.
///
/// Created once per session with the default pair and an empty amount, then
/// changed only through [`crate::Converter::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionState {
    /// Currency converted from.
    pub base_currency: Currency,
    /// Currency converted to. May equal the base; swapping is then a no-op.
    pub target_currency: Currency,
    /// Raw amount input, possibly partial (`"12."`) or invalid.
    pub amount_text: String,
    /// Last computed conversion.
    pub result: Option<Decimal>,
    /// Set by an explicit convert for the current pair.
    pub conversion_triggered: bool,
    /// Skip the next recomputation pass after a pair change.
    pub suppress_next_recompute: bool,
    /// Banner error.
    pub error: Option<ConverterError>,
}

impl ConversionState {
    /// Fresh state for the given pair.
    pub fn new(base_currency: Currency, target_currency: Currency) -> Self {
        Self {
            base_currency,
            target_currency,
            amount_text: String::new(),
            result: None,
            conversion_triggered: false,
            suppress_next_recompute: false,
            error: None,
        }
    }

    /// The selected pair.
    pub fn pair(&self) -> CurrencyPair {
        CurrencyPair::new(self.base_currency.clone(), self.target_currency.clone())
    }
}

impl Default for ConversionState {
    fn default() -> Self {
        Self::new(Currency::gbp(), Currency::usd())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pair() {
        let state = ConversionState::default();

        assert_eq!(state.pair(), CurrencyPair::new(Currency::gbp(), Currency::usd()));
        assert!(state.amount_text.is_empty());
        assert!(state.result.is_none());
        assert!(!state.conversion_triggered);
    }

    #[test]
    fn test_serializes_error_as_message() {
        let mut state = ConversionState::default();
        state.error = Some(crate::validation::AmountError::NotPositive.into());

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["error"], "Amount must be greater than zero");
        assert_eq!(json["base_currency"], "GBP");
    }
}
