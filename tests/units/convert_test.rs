// Unit Conversion Tests
// Decimal strings <-> smallest-unit amounts

use alloy_primitives::U256;
use tokendash::units::{format_units, parse_units, unit_scale, Amount, UnitsError};

const WEI: u128 = 1_000_000_000_000_000_000;

const U256_MAX: &str =
    "115792089237316195423570985008687907853269984665640564039457584007913129639935";

fn raw(value: u128) -> Amount {
    Amount::from(value)
}

// ============================================================================
// PARSING
// ============================================================================

#[test]
fn test_parse_whole_number() {
    assert_eq!(parse_units("200", 18).unwrap(), raw(200 * WEI));
}

#[test]
fn test_parse_fraction() {
    assert_eq!(parse_units("12.5", 18).unwrap(), raw(12 * WEI + WEI / 2));
    assert_eq!(parse_units("0.000000000000000001", 18).unwrap(), raw(1));
}

#[test]
fn test_parse_leading_and_trailing_point() {
    assert_eq!(parse_units(".5", 2).unwrap(), raw(50));
    assert_eq!(parse_units("5.", 2).unwrap(), raw(500));
}

#[test]
fn test_parse_trims_whitespace() {
    assert_eq!(parse_units("  30 ", 0).unwrap(), raw(30));
}

#[test]
fn test_parse_zero_decimals() {
    assert_eq!(parse_units("42", 0).unwrap(), raw(42));
    assert!(matches!(
        parse_units("42.1", 0),
        Err(UnitsError::ExcessPrecision { decimals: 0, .. })
    ));
}

#[test]
fn test_parse_drops_excess_zero_digits() {
    assert_eq!(parse_units("1.500", 2).unwrap(), raw(150));
}

#[test]
fn test_parse_rejects_excess_precision() {
    assert_eq!(
        parse_units("1.234", 2),
        Err(UnitsError::ExcessPrecision {
            decimals: 2,
            digits: 3
        })
    );
}

#[test]
fn test_parse_rejects_bad_input() {
    assert_eq!(parse_units("", 18), Err(UnitsError::Empty));
    assert_eq!(parse_units("   ", 18), Err(UnitsError::Empty));
    assert_eq!(parse_units("-1", 18), Err(UnitsError::Negative));
    assert_eq!(parse_units("1e18", 18), Err(UnitsError::InvalidCharacter('e')));
    assert_eq!(parse_units("1.2.3", 18), Err(UnitsError::MultipleDecimalPoints));
    assert_eq!(parse_units(".", 18), Err(UnitsError::MissingDigits));
}

#[test]
fn test_parse_beyond_128_bits() {
    let supply = format!("1{}", "0".repeat(24));
    let amount = parse_units(&supply, 18).unwrap();

    assert!(amount > raw(u128::MAX));
    assert_eq!(amount.raw(), U256::from(10u8).pow(U256::from(42u8)));
    assert_eq!(format_units(amount, 18), format!("{}.0", supply));
    assert_eq!(parse_units(U256_MAX, 0), Ok(Amount::MAX));
}

#[test]
fn test_parse_overflow() {
    assert_eq!(
        parse_units(
            "115792089237316195423570985008687907853269984665640564039457584007913129639936",
            0
        ),
        Err(UnitsError::Overflow)
    );
    assert_eq!(parse_units("1", 78), Err(UnitsError::Overflow));
}

// ============================================================================
// FORMATTING
// ============================================================================

#[test]
fn test_format_whole_tokens_keep_one_fraction_digit() {
    assert_eq!(format_units(raw(150 * WEI), 18), "150.0");
}

#[test]
fn test_format_fraction() {
    assert_eq!(format_units(raw(WEI / 4), 18), "0.25");
    assert_eq!(format_units(raw(1), 18), "0.000000000000000001");
}

#[test]
fn test_format_full_width_amount() {
    assert_eq!(
        format_units(Amount::MAX, 18),
        "115792089237316195423570985008687907853269984665640564039457.584007913129639935"
    );
}

#[test]
fn test_format_zero_decimals() {
    assert_eq!(format_units(raw(7), 0), "7.0");
}

#[test]
fn test_parse_format_roundtrip() {
    for input in ["0.0", "1.0", "12.5", "0.001", "199.999999999999999999"] {
        let amount = parse_units(input, 18).unwrap();
        assert_eq!(format_units(amount, 18), input);
    }
}

// ============================================================================
// SCALE / ARITHMETIC
// ============================================================================

#[test]
fn test_unit_scale() {
    assert_eq!(unit_scale(0), Some(U256::from(1u8)));
    assert_eq!(unit_scale(18), Some(U256::from(WEI)));
    assert_eq!(unit_scale(38), Some(U256::from(10u128.pow(38))));
    assert!(unit_scale(77).is_some());
    assert_eq!(unit_scale(78), None);
}

#[test]
fn test_amount_checked_arithmetic() {
    let a = raw(10);
    let b = raw(3);

    assert_eq!(a.checked_sub(b), Some(raw(7)));
    assert_eq!(b.checked_sub(a), None);
    assert_eq!(Amount::MAX.checked_add(raw(1)), None);
    assert_eq!(b.saturating_sub(a), Amount::ZERO);
}
