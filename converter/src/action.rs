//! Actions accepted by the converter and effects it asks the caller to run.

use fxconv_common::Currency;
use fxconv_fx::{FetchCompletion, FetchRequest};

/// Everything that can change conversion state.
#[derive(Debug, Clone)]
pub enum Action {
    /// Session start: load rates for the default base.
    Init,
    /// Select the base currency.
    SetBase(Currency),
    /// Select the target currency.
    SetTarget(Currency),
    /// Replace the amount text (subject to the keystroke filter).
    SetAmount(String),
    /// Explicit convert request.
    Convert,
    /// Exchange base and target.
    Swap,
    /// Dismiss the banner error.
    ClearError,
    /// Drop the current result.
    ClearResult,
    /// A rate fetch finished.
    RatesFetched(FetchCompletion),
}

/// Work the caller must perform after a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run this fetch and dispatch [`Action::RatesFetched`] with the outcome.
    FetchRates(FetchRequest),
    /// Return input focus to the amount field.
    FocusAmount,
}
