//! fxconv Converter
//!
//! The conversion controller: holds the selected currency pair, the amount
//! text and the last result, validates input, and derives the converted value
//! from the rate store.
//!
//! # Example
//!
//! ```rust,ignore
//! use fxconv_converter::{Action, Converter, Effect};
//! use fxconv_common::now;
//!
//! let mut converter = Converter::default();
//! for effect in converter.dispatch(Action::Init, now()) {
//!     if let Effect::FetchRates(request) = effect {
//!         let completion = engine.execute(request).await;
//!         converter.dispatch(Action::RatesFetched(completion), now());
//!     }
//! }
//!
//! converter.dispatch(Action::SetAmount("100".into()), now());
//! converter.dispatch(Action::Convert, now());
//! println!("{}", converter.summary().unwrap());
//! ```

pub mod action;
pub mod controller;
pub mod display;
pub mod error;
pub mod state;
pub mod validation;

pub use action::{Action, Effect};
pub use controller::{Converter, ConverterConfig};
pub use display::ConversionSummary;
pub use error::ConverterError;
pub use state::ConversionState;
pub use validation::{accepts_input, validate, validate_amount, AmountError, MAX_AMOUNT};
