//! Amount validation and the keystroke filter for the amount field.
//!
//! Validation rules apply in a fixed order and the first failing rule wins,
//! so the message a malformed input produces is stable. In particular a
//! negative number passes the decimal-places shape check and is rejected by
//! the "greater than zero" rule instead.

use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

/// Largest amount that may be converted.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Maximum number of fraction digits accepted.
pub const MAX_DECIMAL_PLACES: usize = 2;

/// Why an amount was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("Please enter a valid number")]
    NotANumber,

    #[error("Amount must be greater than zero")]
    NotPositive,

    #[error("Maximum allowed amount is 1,000,000,000")]
    TooLarge,

    #[error("Maximum 2 decimal places allowed")]
    TooManyDecimals,
}

/// Significant digits a `Decimal` holds.
const DECIMAL_DIGITS: usize = 28;

/// Powers of ten applied before any nonzero value leaves `Decimal` range.
const MAX_EXPONENT_STEPS: u32 = 64;

/// Outcome of reading the numeric prefix of an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leading {
    Value(Decimal),
    /// Well-formed but beyond what a `Decimal` can hold.
    Overflow { negative: bool },
    /// Nonzero but smaller than the finest `Decimal` step.
    Underflow { negative: bool },
    Missing,
}

/// Validate amount text. Empty input is not an error: it means "not entered
/// yet".
pub fn validate(text: &str) -> Option<AmountError> {
    validate_amount(text).err()
}

/// Validate amount text and return its value.
///
/// `Ok(None)` for empty input, `Ok(Some(value))` for a valid amount.
pub fn validate_amount(text: &str) -> Result<Option<Decimal>, AmountError> {
    if text.is_empty() {
        return Ok(None);
    }

    let text = text.strip_suffix('.').unwrap_or(text);

    let value = match leading_number(text) {
        Leading::Missing => return Err(AmountError::NotANumber),
        Leading::Overflow { negative: true } | Leading::Underflow { negative: true } => {
            return Err(AmountError::NotPositive)
        }
        Leading::Overflow { negative: false } => return Err(AmountError::TooLarge),
        Leading::Underflow { negative: false } => None,
        Leading::Value(value) => {
            if value <= Decimal::ZERO {
                return Err(AmountError::NotPositive);
            }
            if value > MAX_AMOUNT {
                return Err(AmountError::TooLarge);
            }
            Some(value)
        }
    };

    if !has_amount_shape(text) {
        return Err(AmountError::TooManyDecimals);
    }

    // An underflowed amount has an exponent or over 28 fraction digits, so
    // the shape rule has already rejected it.
    value.map(Some).ok_or(AmountError::TooManyDecimals)
}

/// Whether `text` may replace the current amount text.
///
/// Accepts partial input while typing: an optional leading minus, digits,
/// and at most one decimal point followed by up to two digits (`"-"`, `"12."`,
/// `".5"` are all accepted).
pub fn accepts_input(text: &str) -> bool {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (unsigned, None),
    };

    all_digits(int_part)
        && frac_part.map_or(true, |frac| frac.len() <= MAX_DECIMAL_PLACES && all_digits(frac))
}

/// Read the longest numeric prefix: optional sign, digits, optional
/// fraction, optional exponent; or `Infinity`.
///
/// Leading whitespace is skipped and anything after the prefix is ignored,
/// so `"12abc"` reads as 12. The shape check rejects such input later.
fn leading_number(text: &str) -> Leading {
    let (negative, rest) = split_sign(text.trim_start());

    if rest.starts_with("Infinity") {
        return Leading::Overflow { negative };
    }

    let int_digits = digit_run(rest);
    let after_int = &rest[int_digits.len()..];
    let (frac_digits, after_frac) = match after_int.strip_prefix('.') {
        Some(after_point) => {
            let frac_digits = digit_run(after_point);
            (frac_digits, &after_point[frac_digits.len()..])
        }
        None => ("", after_int),
    };

    if int_digits.is_empty() && frac_digits.is_empty() {
        return Leading::Missing;
    }
    if int_digits.bytes().chain(frac_digits.bytes()).all(|b| b == b'0') {
        return Leading::Value(Decimal::ZERO);
    }

    let int_digits = int_digits.trim_start_matches('0');
    if int_digits.len() > DECIMAL_DIGITS {
        return Leading::Overflow { negative };
    }
    // Digits past the precision limit cannot change which rule fires
    let frac_digits = &frac_digits[..frac_digits.len().min(DECIMAL_DIGITS - int_digits.len())];

    let mut canonical = String::with_capacity(DECIMAL_DIGITS + 3);
    if negative {
        canonical.push('-');
    }
    canonical.push_str(if int_digits.is_empty() { "0" } else { int_digits });
    if !frac_digits.is_empty() {
        canonical.push('.');
        canonical.push_str(frac_digits);
    }

    let mantissa = match Decimal::from_str(&canonical) {
        Ok(mantissa) => mantissa,
        Err(_) => return Leading::Overflow { negative },
    };

    match scale_by_power_of_ten(mantissa, exponent(after_frac)) {
        None => Leading::Overflow { negative },
        Some(value) if value.is_zero() => Leading::Underflow { negative },
        Some(value) => Leading::Value(value),
    }
}

/// `e` or `E`, optional sign, at least one digit. Anything else reads as no
/// exponent. Saturates instead of overflowing.
fn exponent(text: &str) -> i32 {
    let Some(rest) = text.strip_prefix(|c: char| c == 'e' || c == 'E') else {
        return 0;
    };
    let (negative, rest) = split_sign(rest);
    let magnitude = digit_run(rest).bytes().fold(0i32, |acc, b| {
        acc.saturating_mul(10).saturating_add(i32::from(b - b'0'))
    });

    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// `value × 10^exponent`, or `None` when the result leaves `Decimal` range.
/// Values below the finest step round to zero.
fn scale_by_power_of_ten(mut value: Decimal, exponent: i32) -> Option<Decimal> {
    let steps = exponent.unsigned_abs().min(MAX_EXPONENT_STEPS);
    for _ in 0..steps {
        value = if exponent > 0 {
            value.checked_mul(Decimal::TEN)?
        } else {
            value.checked_div(Decimal::TEN).unwrap_or(Decimal::ZERO)
        };
        if value.is_zero() {
            break;
        }
    }
    Some(value)
}

fn split_sign(text: &str) -> (bool, &str) {
    match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    }
}

/// Shape `(-?\d+)?(\.\d{1,2})?` over the whole text.
fn has_amount_shape(text: &str) -> bool {
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (text, None),
    };

    let digits = int_part.strip_prefix('-').unwrap_or(int_part);
    let int_ok = int_part.is_empty() || (!digits.is_empty() && all_digits(digits));
    let frac_ok = frac_part.map_or(true, |frac| {
        (1..=MAX_DECIMAL_PLACES).contains(&frac.len()) && all_digits(frac)
    });

    int_ok && frac_ok
}

/// Leading run of ASCII digits.
fn digit_run(text: &str) -> &str {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    &text[..end]
}

fn all_digits(text: &str) -> bool {
    text.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_is_not_an_error() {
        assert_eq!(validate(""), None);
        assert_eq!(validate_amount(""), Ok(None));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            validate("-5").map(|e| e.to_string()).as_deref(),
            Some("Amount must be greater than zero")
        );
        assert_eq!(
            validate("abc").map(|e| e.to_string()).as_deref(),
            Some("Please enter a valid number")
        );
        assert_eq!(
            validate("1.234").map(|e| e.to_string()).as_deref(),
            Some("Maximum 2 decimal places allowed")
        );
        assert_eq!(
            validate("1000000001").map(|e| e.to_string()).as_deref(),
            Some("Maximum allowed amount is 1,000,000,000")
        );
    }

    #[test]
    fn test_trailing_point_is_stripped() {
        assert_eq!(validate_amount("12."), Ok(Some(dec!(12))));
        assert_eq!(validate("."), Some(AmountError::NotANumber));
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(validate_amount("1000000000"), Ok(Some(dec!(1000000000))));
        assert_eq!(validate_amount("1000000000.00"), Ok(Some(dec!(1000000000))));
        assert_eq!(validate("1000000000.01"), Some(AmountError::TooLarge));
        assert_eq!(validate("0"), Some(AmountError::NotPositive));
        assert_eq!(validate("0.00"), Some(AmountError::NotPositive));
        assert_eq!(validate_amount("0.01"), Ok(Some(dec!(0.01))));
    }

    #[test]
    fn test_rule_order() {
        // Negative with too many decimals: sign rule fires first
        assert_eq!(validate("-1.234"), Some(AmountError::NotPositive));
        // Too large with too many decimals: size rule fires first
        assert_eq!(validate("2000000000.123"), Some(AmountError::TooLarge));
        // Numeric prefix followed by junk reads as a number, then fails shape
        assert_eq!(validate("12abc"), Some(AmountError::TooManyDecimals));
        assert_eq!(validate("+5"), Some(AmountError::TooManyDecimals));
        assert_eq!(validate("1.2.3"), Some(AmountError::TooManyDecimals));
        assert_eq!(validate("-"), Some(AmountError::NotANumber));
    }

    #[test]
    fn test_leading_fraction() {
        assert_eq!(validate_amount(".5"), Ok(Some(dec!(0.5))));
        assert_eq!(validate("-.5"), Some(AmountError::NotPositive));
    }

    #[test]
    fn test_huge_inputs() {
        let huge = "9".repeat(40);
        assert_eq!(validate(&huge), Some(AmountError::TooLarge));
        assert_eq!(validate(&format!("-{}", huge)), Some(AmountError::NotPositive));
    }

    #[test]
    fn test_precision_beyond_decimal() {
        let tiny = format!("0.{}1", "0".repeat(30));
        assert_eq!(validate(&tiny), Some(AmountError::TooManyDecimals));
        assert_eq!(validate(&format!("-{}", tiny)), Some(AmountError::NotPositive));
        assert_eq!(validate(&format!("0.{}", "0".repeat(30))), Some(AmountError::NotPositive));

        let long_fraction = format!("5.{}", "1".repeat(40));
        assert_eq!(validate(&long_fraction), Some(AmountError::TooManyDecimals));
    }

    #[test]
    fn test_exponent_notation() {
        assert_eq!(validate("1e10"), Some(AmountError::TooLarge));
        assert_eq!(validate("1E5"), Some(AmountError::TooManyDecimals));
        assert_eq!(validate("2.5e-1"), Some(AmountError::TooManyDecimals));
        assert_eq!(validate("1e-40"), Some(AmountError::TooManyDecimals));
        assert_eq!(validate("-1e3"), Some(AmountError::NotPositive));
        assert_eq!(validate("0e5"), Some(AmountError::NotPositive));
        assert_eq!(validate("1e"), Some(AmountError::TooManyDecimals));
        assert_eq!(validate("1e999999999999"), Some(AmountError::TooLarge));
    }

    #[test]
    fn test_infinity() {
        assert_eq!(validate("Infinity"), Some(AmountError::TooLarge));
        assert_eq!(validate("-Infinity"), Some(AmountError::NotPositive));
        assert_eq!(validate("inf"), Some(AmountError::NotANumber));
    }

    #[test]
    fn test_accepts_input() {
        for ok in ["", "-", ".", "-.", "12", "12.", "12.3", "12.34", ".45", "-7.5"] {
            assert!(accepts_input(ok), "should accept {:?}", ok);
        }
        for rejected in ["12.345", "1a", "--1", "1.2.3", "1-", " 1", "1e5", "+1"] {
            assert!(!accepts_input(rejected), "should reject {:?}", rejected);
        }
    }

    proptest! {
        #[test]
        fn prop_well_formed_positive_amounts_are_valid(
            int_part in 0u64..=1_000_000_000,
            frac in proptest::option::of("[0-9]{1,2}"),
        ) {
            let text = match &frac {
                Some(frac) => format!("{}.{}", int_part, frac),
                None => int_part.to_string(),
            };
            let value = Decimal::from_str(&text).unwrap();
            prop_assume!(value > Decimal::ZERO && value <= MAX_AMOUNT);

            prop_assert_eq!(validate_amount(&text), Ok(Some(value)));
        }

        #[test]
        fn prop_negative_amounts_report_sign(int_part in 1u64..1_000_000, frac in "[0-9]{0,4}") {
            let text = if frac.is_empty() {
                format!("-{}", int_part)
            } else {
                format!("-{}.{}", int_part, frac)
            };
            prop_assert_eq!(validate(&text), Some(AmountError::NotPositive));
        }

        #[test]
        fn prop_accepted_input_never_panics_validation(text in "-?[0-9]{0,12}(\\.[0-9]{0,2})?") {
            prop_assert!(accepts_input(&text));
            let _ = validate(&text);
        }
    }
}
