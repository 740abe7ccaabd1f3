//! fxconv Rate Store
//!
//! Exchange rate acquisition and caching for the converter.
//!
//! # Features
//!
//! - Provider trait with a FloatRates HTTP implementation
//! - Per-base rate table cache with configurable TTL
//! - Sans-IO rate store that issues fetch requests and applies completions
//! - Fetch engine that runs requests against a provider
//!
//! # Example
//!
//! ```rust,ignore
//! use fxconv_fx::{FloatRatesConfig, FloatRatesProvider, RateEngine, RateStore};
//! use fxconv_common::{now, Currency};
//!
//! let engine = RateEngine::new(Arc::new(FloatRatesProvider::new(FloatRatesConfig::default())?));
//! let mut store = RateStore::new();
//!
//! if let Some(request) = store.ensure_rates(&Currency::gbp(), now()).into_request() {
//!     let completion = engine.execute(request).await;
//!     store.complete_fetch(completion, now());
//! }
//! ```

pub mod cache;
pub mod engine;
pub mod error;
pub mod provider;
pub mod store;

pub use cache::{CacheStats, RateCache, RateCacheConfig};
pub use engine::RateEngine;
pub use error::{FxError, FxResult};
pub use provider::{FloatRatesConfig, FloatRatesProvider, RateProvider, FLOATRATES_BASE_URL};
#[cfg(any(test, feature = "test-utils"))]
pub use provider::MockRateProvider;
pub use store::{EnsureRates, FetchCompletion, FetchRequest, KnownCurrencies, RateStore};
