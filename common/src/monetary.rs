//! Currency and exchange rate types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Currency code, normalised to upper case.
///
/// No whitelist is applied: any non-empty code the rate provider returns is
/// accepted, including metals (`XAU`) and regional units (`XOF`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Currency(String);

impl Currency {
    /// Create a new currency from code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Lower-case form, as used in provider URLs.
    pub fn to_lowercase(&self) -> String {
        self.0.to_lowercase()
    }

    /// Whether the code is empty after normalisation.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Common currencies
    pub fn usd() -> Self {
        Self::new("USD")
    }

    pub fn eur() -> Self {
        Self::new("EUR")
    }

    pub fn gbp() -> Self {
        Self::new("GBP")
    }

    pub fn jpy() -> Self {
        Self::new("JPY")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Currency {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A base/target currency pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    /// Base currency (the one being converted from).
    pub base: Currency,
    /// Target currency (the one being converted to).
    pub target: Currency,
}

impl CurrencyPair {
    /// Create a new currency pair.
    pub fn new(base: Currency, target: Currency) -> Self {
        Self { base, target }
    }

    /// Get the inverse pair.
    pub fn inverse(&self) -> Self {
        Self {
            base: self.target.clone(),
            target: self.base.clone(),
        }
    }

    /// Whether both sides are the same currency.
    pub fn is_identity(&self) -> bool {
        self.base == self.target
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.target)
    }
}

/// Price of one unit of `code`, in units of the table's base currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateEntry {
    /// Currency this rate prices.
    pub code: Currency,
    /// Units of `code` per 1 unit of base.
    pub rate: Decimal,
    /// Display name reported by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Units of base per 1 unit of `code`, when the provider reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverse_rate: Option<Decimal>,
    /// Provider's publication date for the rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl RateEntry {
    /// Create an entry with no provider metadata.
    pub fn new(code: impl Into<Currency>, rate: Decimal) -> Self {
        Self {
            code: code.into(),
            rate,
            name: None,
            inverse_rate: None,
            date: None,
        }
    }

    /// Attach the provider's display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach the provider's inverse rate.
    pub fn with_inverse_rate(mut self, inverse_rate: Decimal) -> Self {
        self.inverse_rate = Some(inverse_rate);
        self
    }

    /// Attach the provider's publication date.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }
}

/// All rates for one base currency.
///
/// Built once from a provider response and replaced wholesale on refresh;
/// there is no way to change a single entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    entries: BTreeMap<Currency, RateEntry>,
}

impl RateTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the entry for a currency.
    pub fn get(&self, code: &Currency) -> Option<&RateEntry> {
        self.entries.get(code)
    }

    /// Look up the rate for a currency.
    pub fn rate(&self, code: &Currency) -> Option<Decimal> {
        self.entries.get(code).map(|entry| entry.rate)
    }

    /// Whether the table has an entry for `code`.
    pub fn contains(&self, code: &Currency) -> bool {
        self.entries.contains_key(code)
    }

    /// Currency codes in ascending order.
    pub fn codes(&self) -> impl Iterator<Item = &Currency> {
        self.entries.keys()
    }

    /// Entries in ascending code order.
    pub fn iter(&self) -> impl Iterator<Item = &RateEntry> {
        self.entries.values()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<RateEntry> for RateTable {
    /// Later entries for the same code replace earlier ones.
    fn from_iter<I: IntoIterator<Item = RateEntry>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|entry| (entry.code.clone(), entry))
                .collect(),
        }
    }
}
