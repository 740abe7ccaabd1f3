//! Conversion controller.
//!
//! A reducer over [`ConversionState`] and the [`RateStore`]. Every change goes
//! through [`Converter::dispatch`], which never performs I/O: rate fetches
//! come back as [`Effect::FetchRates`] for the caller to run, and their
//! outcomes are fed in again as [`Action::RatesFetched`].

use fxconv_common::{Currency, Timestamp};
use fxconv_fx::{EnsureRates, RateCacheConfig, RateStore};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::action::{Action, Effect};
use crate::display::ConversionSummary;
use crate::error::ConverterError;
use crate::state::ConversionState;
use crate::validation::{self, AmountError};

/// Configuration for the converter.
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// Base currency selected at session start.
    pub default_base: Currency,
    /// Target currency selected at session start.
    pub default_target: Currency,
    /// Rate cache configuration.
    pub cache: RateCacheConfig,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            default_base: Currency::gbp(),
            default_target: Currency::usd(),
            cache: RateCacheConfig::default(),
        }
    }
}

/// The conversion controller.
#[derive(Debug)]
pub struct Converter {
    state: ConversionState,
    store: RateStore,
}

impl Converter {
    /// Create a converter with the default pair and an empty rate store.
    pub fn new(config: ConverterConfig) -> Self {
        Self {
            state: ConversionState::new(config.default_base, config.default_target),
            store: RateStore::with_config(config.cache),
        }
    }

    /// Apply one action at `now` and return the effects it requires.
    pub fn dispatch(&mut self, action: Action, now: Timestamp) -> Vec<Effect> {
        let mut effects = Vec::new();

        match action {
            Action::Init => self.pair_changed(now, &mut effects),
            Action::SetBase(code) => {
                if self.accept_selection(&code, &self.state.base_currency) {
                    self.state.base_currency = code;
                    self.pair_changed(now, &mut effects);
                }
            }
            Action::SetTarget(code) => {
                if self.accept_selection(&code, &self.state.target_currency) {
                    self.state.target_currency = code;
                    self.pair_changed(now, &mut effects);
                }
            }
            Action::Swap => {
                if self.state.base_currency != self.state.target_currency {
                    std::mem::swap(
                        &mut self.state.base_currency,
                        &mut self.state.target_currency,
                    );
                    self.pair_changed(now, &mut effects);
                }
            }
            Action::SetAmount(text) => self.set_amount(text),
            Action::Convert => self.convert(&mut effects),
            Action::ClearError => {
                self.state.error = None;
                self.store.clear_error();
            }
            Action::ClearResult => self.state.result = None,
            Action::RatesFetched(completion) => {
                if !self.store.complete_fetch(completion, now) {
                    self.state.error = self.store.error().cloned().map(ConverterError::from);
                }
                self.recompute();
            }
        }

        effects
    }

    /// Whether `code` may replace `current` as a selection.
    ///
    /// Once the known currency list is populated only listed codes are
    /// selectable; re-selecting the current code is not a change.
    fn accept_selection(&self, code: &Currency, current: &Currency) -> bool {
        if code == current {
            return false;
        }
        if code.is_empty() || !self.is_selectable(code) {
            warn!(code = %code, "Ignoring selection of unknown currency");
            return false;
        }
        true
    }

    /// Reset after the base or target changed and make sure the base's rates
    /// are fresh.
    fn pair_changed(&mut self, now: Timestamp, effects: &mut Vec<Effect>) {
        debug!(pair = %self.state.pair(), "Currency pair changed");

        self.state.result = None;
        self.state.conversion_triggered = false;
        self.state.suppress_next_recompute = true;
        self.state.error = None;

        if let EnsureRates::Fetch(request) = self.store.ensure_rates(&self.state.base_currency, now) {
            effects.push(Effect::FetchRates(request));
        }

        self.recompute();
    }

    fn set_amount(&mut self, text: String) {
        if !validation::accepts_input(&text) {
            debug!(input = %text, "Rejected amount keystroke");
            return;
        }

        self.state.amount_text = text;
        if self.amount_error().is_none()
            && self.state.error.as_ref().is_some_and(ConverterError::is_validation)
        {
            self.state.error = None;
        }

        self.recompute();
    }

    fn convert(&mut self, effects: &mut Vec<Effect>) {
        self.state.conversion_triggered = true;
        self.state.error = None;
        effects.push(Effect::FocusAmount);

        if self.store.is_loading() {
            debug!("Rates loading, conversion deferred");
        } else {
            match validation::validate_amount(&self.state.amount_text) {
                Ok(Some(amount)) => self.apply_rate(amount),
                Ok(None) => self.state.result = None,
                Err(e) => {
                    self.state.result = None;
                    self.state.error = Some(e.into());
                }
            }
        }

        self.recompute();
    }

    /// Live recalculation pass, run after every change that can affect the
    /// result.
    fn recompute(&mut self) {
        let amount = match validation::validate_amount(&self.state.amount_text) {
            Ok(Some(amount)) => amount,
            Ok(None) => {
                self.state.conversion_triggered = false;
                self.state.result = None;
                return;
            }
            Err(e) => {
                self.state.conversion_triggered = false;
                self.state.result = None;
                self.state.error = Some(e.into());
                return;
            }
        };

        if !self.state.conversion_triggered {
            return;
        }
        if self.state.suppress_next_recompute {
            self.state.suppress_next_recompute = false;
            return;
        }
        if self.store.is_loading() {
            return;
        }

        self.state.error = None;
        self.apply_rate(amount);
    }

    /// `result = amount × rate[target]`, or record why not.
    fn apply_rate(&mut self, amount: Decimal) {
        let pair = self.state.pair();
        match self.store.rate(&pair) {
            Ok(rate) => match amount.checked_mul(rate) {
                Some(result) => {
                    info!(pair = %pair, %amount, %rate, %result, "Conversion computed");
                    self.state.result = Some(result);
                }
                None => {
                    warn!(pair = %pair, %amount, %rate, "Conversion overflowed");
                    self.state.result = None;
                    self.state.error = Some(ConverterError::Overflow);
                }
            },
            Err(e) => {
                debug!(pair = %pair, "No rate for pair");
                self.state.error = Some(e.into());
            }
        }
    }

    /// Current state.
    pub fn state(&self) -> &ConversionState {
        &self.state
    }

    /// Rate store.
    pub fn store(&self) -> &RateStore {
        &self.store
    }

    /// Validation error for the current amount text.
    pub fn amount_error(&self) -> Option<AmountError> {
        validation::validate(&self.state.amount_text)
    }

    /// Banner error to show. An amount error is shown inline instead and
    /// hides any banner.
    pub fn visible_error(&self) -> Option<&ConverterError> {
        if self.amount_error().is_some() {
            return None;
        }
        self.state.error.as_ref()
    }

    /// Whether rates are being fetched.
    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    /// Last computed conversion.
    pub fn result(&self) -> Option<Decimal> {
        self.state.result
    }

    /// Codes offered for the base selection.
    pub fn currency_codes(&self) -> &[Currency] {
        self.store.known_currencies().codes()
    }

    /// Codes offered for the target selection: all known codes but the base.
    pub fn target_options(&self) -> Vec<&Currency> {
        self.currency_codes()
            .iter()
            .filter(|code| **code != self.state.base_currency)
            .collect()
    }

    /// Whether `code` can be selected as base or target.
    pub fn is_selectable(&self, code: &Currency) -> bool {
        let known = self.store.known_currencies();
        !known.is_populated() || known.contains(code)
    }

    /// Whether a convert request would do anything new.
    pub fn can_convert(&self) -> bool {
        self.amount_error().is_none()
            && !self.is_loading()
            && !self.state.amount_text.is_empty()
            && !self.state.conversion_triggered
    }

    /// Whether swapping is allowed.
    pub fn can_swap(&self) -> bool {
        !self.is_loading() && self.state.base_currency != self.state.target_currency
    }

    /// Last fetch time for the current base.
    pub fn last_fetched(&self) -> Option<Timestamp> {
        self.store.last_fetched(&self.state.base_currency)
    }

    /// Result panel contents, shown once a conversion was triggered and
    /// produced a value.
    pub fn summary(&self) -> Option<ConversionSummary> {
        if !self.state.conversion_triggered {
            return None;
        }
        let result = self.state.result?;
        let amount = validation::validate_amount(&self.state.amount_text).ok()??;

        Some(ConversionSummary::new(
            self.state.pair(),
            amount,
            result,
            self.last_fetched(),
        ))
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConverterConfig::default())
    }
}
