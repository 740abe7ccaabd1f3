//! Rate store: cached tables per base, fetch bookkeeping and the known
//! currency list.
//!
//! The store never performs I/O. [`RateStore::ensure_rates`] either answers
//! from the cache or hands back a [`FetchRequest`] for the caller to execute;
//! the outcome comes back through [`RateStore::complete_fetch`].

use fxconv_common::{Currency, CurrencyPair, FetchId, RateTable, Timestamp};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, RateCache, RateCacheConfig};
use crate::error::{FxError, FxResult};

/// A rate fetch the caller must run against a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Correlation id for logs.
    pub id: FetchId,
    /// Base currency to fetch.
    pub base: Currency,
    /// When the store issued the request.
    pub issued_at: Timestamp,
}

/// A finished fetch, ready to be applied to the store.
#[derive(Debug, Clone)]
pub struct FetchCompletion {
    /// The request this answers.
    pub request: FetchRequest,
    /// Provider outcome.
    pub outcome: FxResult<RateTable>,
}

/// Answer of [`RateStore::ensure_rates`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsureRates {
    /// A fresh table is cached; no fetch needed.
    Cached { fetched_at: Timestamp },
    /// No fresh table; execute this request.
    Fetch(FetchRequest),
}

impl EnsureRates {
    /// The request to execute, if any.
    pub fn into_request(self) -> Option<FetchRequest> {
        match self {
            EnsureRates::Cached { .. } => None,
            EnsureRates::Fetch(request) => Some(request),
        }
    }
}

/// Currency codes offered for selection.
///
/// Filled from the first successful fetch and frozen afterwards, even when
/// later fetches for other bases reveal more codes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KnownCurrencies {
    populated: bool,
    codes: Vec<Currency>,
}

impl KnownCurrencies {
    /// Whether the list has been filled.
    pub fn is_populated(&self) -> bool {
        self.populated
    }

    /// Codes in ascending order.
    pub fn codes(&self) -> &[Currency] {
        &self.codes
    }

    /// Whether `code` is in the list.
    pub fn contains(&self, code: &Currency) -> bool {
        self.codes.binary_search(code).is_ok()
    }

    /// Fill from a table's keys plus its base. No-op once populated.
    fn populate(&mut self, base: &Currency, table: &RateTable) -> bool {
        if self.populated {
            return false;
        }

        let mut codes: Vec<Currency> = table.codes().cloned().collect();
        codes.push(base.clone());
        codes.sort();
        codes.dedup();

        self.codes = codes;
        self.populated = true;
        true
    }
}

/// Rate tables per base currency plus loading and error state.
#[derive(Debug, Default)]
pub struct RateStore {
    cache: RateCache,
    loading: bool,
    error: Option<FxError>,
    known: KnownCurrencies,
}

impl RateStore {
    /// Create a store with the default 60 second TTL.
    pub fn new() -> Self {
        Self::with_config(RateCacheConfig::default())
    }

    /// Create a store with a custom cache configuration.
    pub fn with_config(config: RateCacheConfig) -> Self {
        Self {
            cache: RateCache::with_config(config),
            loading: false,
            error: None,
            known: KnownCurrencies::default(),
        }
    }

    /// Make sure rates for `base` are fresh at `now`.
    ///
    /// A cache hit answers synchronously. Otherwise the store enters the
    /// loading state and returns a request; concurrent requests for the same
    /// base are not coalesced.
    pub fn ensure_rates(&mut self, base: &Currency, now: Timestamp) -> EnsureRates {
        if let Some(fetched_at) = self
            .cache
            .get_fresh(base, now)
            .and_then(|_| self.cache.last_fetched(base))
        {
            debug!(base = %base, %fetched_at, "Using cached rates");
            return EnsureRates::Cached { fetched_at };
        }

        let request = FetchRequest {
            id: FetchId::new(),
            base: base.clone(),
            issued_at: now,
        };
        debug!(base = %base, fetch_id = %request.id, "Issuing rate fetch");

        self.loading = true;
        self.error = None;
        EnsureRates::Fetch(request)
    }

    /// Apply a finished fetch at `now`. Returns whether it succeeded.
    ///
    /// Completions are applied in arrival order; a failure keeps whatever
    /// table was cached for the base before.
    pub fn complete_fetch(&mut self, completion: FetchCompletion, now: Timestamp) -> bool {
        let FetchCompletion { request, outcome } = completion;
        self.loading = false;

        match outcome {
            Ok(table) => {
                info!(
                    base = %request.base,
                    fetch_id = %request.id,
                    entries = table.len(),
                    "Rates updated"
                );
                if self.known.populate(&request.base, &table) {
                    debug!(count = self.known.codes().len(), "Known currencies populated");
                }
                self.cache.insert(request.base, table, now);
                self.error = None;
                true
            }
            Err(e) => {
                warn!(
                    base = %request.base,
                    fetch_id = %request.id,
                    error = %e.detail(),
                    "Rate fetch failed"
                );
                self.error = Some(e);
                false
            }
        }
    }

    /// Whether a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Last fetch error, if not cleared since.
    pub fn error(&self) -> Option<&FxError> {
        self.error.as_ref()
    }

    /// Forget the last fetch error.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Cached table for `base`, regardless of age.
    pub fn rates_for(&self, base: &Currency) -> Option<&RateTable> {
        self.cache.get(base)
    }

    /// Rate for `pair` from the cached table of its base. A zero rate counts
    /// as missing.
    pub fn rate(&self, pair: &CurrencyPair) -> FxResult<Decimal> {
        self.cache
            .get(&pair.base)
            .and_then(|table| table.rate(&pair.target))
            .filter(|rate| !rate.is_zero())
            .ok_or_else(|| FxError::RateNotAvailable(pair.clone()))
    }

    /// Time of the last successful fetch for `base`.
    pub fn last_fetched(&self, base: &Currency) -> Option<Timestamp> {
        self.cache.last_fetched(base)
    }

    /// Whether `base` has a fresh table at `now`.
    pub fn is_fresh(&self, base: &Currency, now: Timestamp) -> bool {
        self.cache.is_fresh(base, now)
    }

    /// Currency codes offered for selection.
    pub fn known_currencies(&self) -> &KnownCurrencies {
        &self.known
    }

    /// Cache statistics at `now`.
    pub fn stats(&self, now: Timestamp) -> CacheStats {
        self.cache.stats(now)
    }
}
