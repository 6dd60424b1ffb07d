//! Conversion between the contract's base units and display values.
//!
//! Amounts on-chain are wei (18 decimals). Display amounts are decimal ether
//! strings with trailing zeros trimmed and at least one fractional digit,
//! so `2 * 10^18` wei is shown as `"2.0"`. Deadlines are stored as Unix
//! epoch milliseconds.

use crate::error::GatewayError;
use alloy::primitives::{
    U256,
    utils::{ParseUnits, format_units, parse_units},
};
use std::time::{SystemTime, UNIX_EPOCH};

/// Decimals of the contract's monetary base unit.
pub const DECIMALS: u8 = 18;

/// Parse a decimal ether amount into wei.
pub fn parse_amount(amount: &str) -> Result<U256, GatewayError> {
    let trimmed = amount.trim();
    if !is_decimal(trimmed) {
        return Err(GatewayError::InvalidAmount(amount.to_string()));
    }

    match parse_units(trimmed, DECIMALS) {
        Ok(ParseUnits::U256(value)) => Ok(value),
        Ok(ParseUnits::I256(_)) | Err(_) => Err(GatewayError::InvalidAmount(amount.to_string())),
    }
}

/// Plain digits with an optional fraction of at most [`DECIMALS`] digits.
fn is_decimal(amount: &str) -> bool {
    let (integer, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());

    !(integer.is_empty() && fraction.is_empty())
        && all_digits(integer)
        && all_digits(fraction)
        && fraction.len() <= usize::from(DECIMALS)
}

/// Format wei as a decimal ether amount.
pub fn format_amount(value: U256) -> String {
    match format_units(value, DECIMALS) {
        Ok(formatted) => trim_fraction(&formatted),
        Err(_) => value.to_string(),
    }
}

fn trim_fraction(formatted: &str) -> String {
    match formatted.split_once('.') {
        Some((integer, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                format!("{integer}.0")
            } else {
                format!("{integer}.{fraction}")
            }
        }
        None => format!("{formatted}.0"),
    }
}

/// Absolute deadline in epoch milliseconds, as `createCampaign` expects it.
pub fn deadline_millis(deadline: SystemTime) -> Result<U256, GatewayError> {
    let since_epoch = deadline
        .duration_since(UNIX_EPOCH)
        .map_err(|_| GatewayError::InvalidDeadline("before the Unix epoch".to_string()))?;
    Ok(U256::from(since_epoch.as_millis()))
}

/// Deadline read back from the contract.
pub fn deadline_from_chain(deadline: U256) -> Result<u64, GatewayError> {
    u64::try_from(deadline).map_err(|_| {
        GatewayError::InvalidResponse(format!("deadline {deadline} does not fit in 64 bits"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const ONE_ETHER: u64 = 1_000_000_000_000_000_000;

    #[test]
    fn test_format_whole_amounts() {
        assert_eq!(format_amount(U256::from(2u64) * U256::from(ONE_ETHER)), "2.0");
        assert_eq!(format_amount(U256::ZERO), "0.0");
    }

    #[test]
    fn test_format_fractional_amounts() {
        assert_eq!(format_amount(U256::from(ONE_ETHER / 2)), "0.5");
        assert_eq!(format_amount(U256::from(1u64)), "0.000000000000000001");
        assert_eq!(format_amount(U256::from(1_250_000_000_000_000_000u64)), "1.25");
    }

    #[test]
    fn test_parse_amounts() {
        assert_eq!(parse_amount("2").unwrap(), U256::from(2u64) * U256::from(ONE_ETHER));
        assert_eq!(parse_amount("0.5").unwrap(), U256::from(ONE_ETHER / 2));
        assert_eq!(parse_amount(" 1.25 ").unwrap(), U256::from(1_250_000_000_000_000_000u64));
    }

    #[test]
    fn test_parse_rejects_invalid_amounts() {
        for input in [
            "",
            "   ",
            ".",
            "-1",
            "+1",
            "abc",
            "1.2.3",
            "1_000",
            "1e18",
            "0.0000000000000000001",
            "1.1234567890123456789",
        ] {
            assert!(
                matches!(parse_amount(input), Err(GatewayError::InvalidAmount(_))),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_parse_full_precision_fraction() {
        assert_eq!(parse_amount("0.000000000000000001").unwrap(), U256::from(1u64));
        assert_eq!(
            parse_amount("1.123456789012345678").unwrap(),
            U256::from(1_123_456_789_012_345_678u64)
        );
    }

    #[test]
    fn test_round_trip_from_display() {
        for input in ["0.0", "1.0", "0.1", "2.5", "123456.000000000000000001", "0.000000000000000001"] {
            let wei = parse_amount(input).unwrap();
            assert_eq!(format_amount(wei), input);
        }
    }

    #[test]
    fn test_round_trip_from_wei() {
        let values = [
            U256::ZERO,
            U256::from(1u64),
            U256::from(ONE_ETHER),
            U256::from(987_654_321_987_654_321u64),
            U256::from(u128::MAX),
        ];
        for value in values {
            assert_eq!(parse_amount(&format_amount(value)).unwrap(), value);
        }
    }

    #[test]
    fn test_deadline_millis() {
        let deadline = UNIX_EPOCH + Duration::from_millis(1_700_000_000_000);
        assert_eq!(
            deadline_millis(deadline).unwrap(),
            U256::from(1_700_000_000_000u64)
        );
    }

    #[test]
    fn test_deadline_before_epoch_is_rejected() {
        let deadline = UNIX_EPOCH - Duration::from_secs(1);
        assert!(matches!(
            deadline_millis(deadline),
            Err(GatewayError::InvalidDeadline(_))
        ));
    }

    #[test]
    fn test_deadline_from_chain() {
        assert_eq!(
            deadline_from_chain(U256::from(1_700_000_000_000u64)).unwrap(),
            1_700_000_000_000
        );
        assert!(deadline_from_chain(U256::from(u64::MAX) + U256::from(1u64)).is_err());
    }
}
