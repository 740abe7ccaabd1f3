//! Human-readable summary of a conversion result.

use fxconv_common::{CurrencyPair, Timestamp};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::fmt;

/// Decimal places shown for amounts.
const AMOUNT_DP: u32 = 2;

/// Decimal places shown for rates.
const RATE_DP: u32 = 6;

/// Everything the result panel shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionSummary {
    /// Converted pair.
    pub pair: CurrencyPair,
    /// Input amount.
    pub amount: Decimal,
    /// Converted amount.
    pub result: Decimal,
    /// Effective rate `result / amount`; `None` when it is zero or undefined.
    pub rate: Option<Decimal>,
    /// `1 / rate`.
    pub reciprocal: Option<Decimal>,
    /// When the base's rates were last fetched.
    pub last_updated: Option<Timestamp>,
}

impl ConversionSummary {
    /// Build a summary from an amount and its converted value.
    pub fn new(
        pair: CurrencyPair,
        amount: Decimal,
        result: Decimal,
        last_updated: Option<Timestamp>,
    ) -> Self {
        let rate = result.checked_div(amount).filter(|rate| !rate.is_zero());
        let reciprocal = rate.and_then(|rate| Decimal::ONE.checked_div(rate));

        Self {
            pair,
            amount,
            result,
            rate,
            reciprocal,
            last_updated,
        }
    }

    /// Input amount, grouped with two decimals.
    pub fn formatted_amount(&self) -> String {
        format_grouped(self.amount, AMOUNT_DP)
    }

    /// Converted amount, grouped with two decimals.
    pub fn formatted_result(&self) -> String {
        format_grouped(self.result, AMOUNT_DP)
    }

    /// Effective rate with six decimals, or `--`.
    pub fn formatted_rate(&self) -> String {
        format_rate(self.rate)
    }

    /// Reciprocal rate with six decimals, or `--`.
    pub fn formatted_reciprocal(&self) -> String {
        format_rate(self.reciprocal)
    }
}

impl fmt::Display for ConversionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = &self.pair.base;
        let target = &self.pair.target;

        writeln!(f, "{} {} =", self.formatted_amount(), base)?;
        writeln!(f, "{} {}", self.formatted_result(), target)?;
        writeln!(f, "1 {} = {} {}", base, self.formatted_rate(), target)?;
        write!(f, "1 {} = {} {}", target, self.formatted_reciprocal(), base)?;
        if let Some(at) = self.last_updated {
            write!(f, "\nLast updated: {}", at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        }
        Ok(())
    }
}

/// Round half away from zero to `dp` places and group the integer part in
/// thousands: `1234.5` → `1,234.50`.
pub fn format_grouped(value: Decimal, dp: u32) -> String {
    let plain = fixed(value, dp);
    let (sign, unsigned) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(plain.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

fn format_rate(rate: Option<Decimal>) -> String {
    match rate {
        Some(rate) => fixed(rate, RATE_DP),
        None => "--".to_string(),
    }
}

/// Exactly `dp` fraction digits, rounding half away from zero.
fn fixed(value: Decimal, dp: u32) -> String {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use fxconv_common::Currency;
    use rust_decimal_macros::dec;

    fn eur_gbp() -> CurrencyPair {
        CurrencyPair::new(Currency::eur(), Currency::gbp())
    }

    #[test]
    fn test_format_grouped() {
        assert_eq!(format_grouped(dec!(0), 2), "0.00");
        assert_eq!(format_grouped(dec!(87), 2), "87.00");
        assert_eq!(format_grouped(dec!(123.45), 2), "123.45");
        assert_eq!(format_grouped(dec!(1234.5), 2), "1,234.50");
        assert_eq!(format_grouped(dec!(1000000000), 2), "1,000,000,000.00");
        assert_eq!(format_grouped(dec!(999.995), 2), "1,000.00");
        assert_eq!(format_grouped(dec!(-1234567.891), 2), "-1,234,567.89");
    }

    #[test]
    fn test_summary_rates() {
        let summary = ConversionSummary::new(eur_gbp(), dec!(100), dec!(87), None);

        assert_eq!(summary.rate, Some(dec!(0.87)));
        assert_eq!(summary.formatted_rate(), "0.870000");
        assert_eq!(summary.formatted_reciprocal(), "1.149425");
        assert_eq!(summary.formatted_amount(), "100.00");
        assert_eq!(summary.formatted_result(), "87.00");
    }

    #[test]
    fn test_zero_result_has_no_rate() {
        let summary = ConversionSummary::new(eur_gbp(), dec!(100), dec!(0), None);

        assert_eq!(summary.formatted_rate(), "--");
        assert_eq!(summary.formatted_reciprocal(), "--");
    }

    #[test]
    fn test_display() {
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let summary = ConversionSummary::new(eur_gbp(), dec!(100), dec!(87), Some(at));

        assert_eq!(
            summary.to_string(),
            "100.00 EUR =\n\
             87.00 GBP\n\
             1 EUR = 0.870000 GBP\n\
             1 GBP = 1.149425 EUR\n\
             Last updated: 2023-11-14 22:13:20 UTC"
        );
    }

    #[test]
    fn test_display_without_timestamp() {
        let summary = ConversionSummary::new(eur_gbp(), dec!(1), dec!(0.87), None);
        assert!(!summary.to_string().contains("Last updated"));
    }
}
