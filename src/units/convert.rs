// Conversion between human decimal strings and smallest-unit integers
//
// Parsing never rounds: fractional digits beyond `decimals` are rejected
// unless they are all zeros. Formatting always keeps at least one
// fractional digit ("150.0").

use super::Amount;
use alloy_primitives::U256;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitsError {
    #[error("Amount is empty")]
    Empty,

    #[error("Amount cannot be negative")]
    Negative,

    #[error("Invalid character '{0}' in amount")]
    InvalidCharacter(char),

    #[error("Amount has more than one decimal point")]
    MultipleDecimalPoints,

    #[error("Amount has no digits")]
    MissingDigits,

    #[error("Amount has {digits} fractional digits but the token only supports {decimals}")]
    ExcessPrecision { decimals: u8, digits: usize },

    #[error("Amount does not fit in 256 bits")]
    Overflow,
}

/// Parse a decimal string such as `"12.5"` into smallest units
pub fn parse_units(input: &str, decimals: u8) -> Result<Amount, UnitsError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UnitsError::Empty);
    }
    if input.starts_with('-') {
        return Err(UnitsError::Negative);
    }

    let mut parts = input.splitn(2, '.');
    let whole = parts.next().unwrap_or("");
    let fraction = parts.next().unwrap_or("");

    if fraction.contains('.') {
        return Err(UnitsError::MultipleDecimalPoints);
    }
    if let Some(bad) = whole.chars().chain(fraction.chars()).find(|c| !c.is_ascii_digit()) {
        return Err(UnitsError::InvalidCharacter(bad));
    }
    if whole.is_empty() && fraction.is_empty() {
        return Err(UnitsError::MissingDigits);
    }

    let decimals_len = decimals as usize;
    let fraction = if fraction.len() > decimals_len {
        let (kept, excess) = fraction.split_at(decimals_len);
        if excess.bytes().any(|b| b != b'0') {
            return Err(UnitsError::ExcessPrecision {
                decimals,
                digits: fraction.trim_end_matches('0').len(),
            });
        }
        kept
    } else {
        fraction
    };

    let padding = decimals_len - fraction.len();
    let digits = whole
        .bytes()
        .chain(fraction.bytes())
        .chain(std::iter::repeat(b'0').take(padding));

    let ten = U256::from(10u8);
    let mut value = U256::ZERO;
    for digit in digits {
        value = value
            .checked_mul(ten)
            .and_then(|v| v.checked_add(U256::from(digit - b'0')))
            .ok_or(UnitsError::Overflow)?;
    }

    Ok(Amount::from_raw(value))
}

/// Format smallest units as a decimal string (`"150.0"`, `"0.25"`)
pub fn format_units(amount: Amount, decimals: u8) -> String {
    let decimals = decimals as usize;
    let mut digits = amount.raw().to_string();
    if digits.len() <= decimals {
        digits = format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits);
    }

    let (whole, fraction) = digits.split_at(digits.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, fraction)
    }
}

/// One whole token expressed in smallest units, if it fits
pub fn unit_scale(decimals: u8) -> Option<U256> {
    let ten = U256::from(10u8);
    (0..decimals).try_fold(U256::from(1u8), |scale, _| scale.checked_mul(ten))
}
