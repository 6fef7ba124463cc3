//! Integer amounts and their human-readable decimal form.
//!
//! Balances are always held as [`Amount`] in the smallest indivisible unit.
//! [`parse_units`] and [`format_units`] convert to and from a decimal whole
//! unit (e.g. `1.1` tokens with 18 decimals = `1_100_000_000_000_000_000`).

use rust_decimal::Decimal;

use crate::{Result, SwapdeskError};

/// Amount in the smallest indivisible unit of an asset.
pub type Amount = u128;

/// Convert a decimal whole-unit value into base units.
///
/// # Errors
/// - `InvalidAmount` if `value` is negative or has more fractional digits
///   than `decimals`
/// - `BalanceOverflow` if the result does not fit in [`Amount`]
pub fn parse_units(value: Decimal, decimals: u32) -> Result<Amount> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(SwapdeskError::InvalidAmount {
            reason: format!("{value} is negative"),
        });
    }
    let value = value.normalize();
    let scale = value.scale();
    if scale > decimals {
        return Err(SwapdeskError::InvalidAmount {
            reason: format!("{value} has more than {decimals} fractional digits"),
        });
    }
    let mantissa = value.mantissa().unsigned_abs();
    let factor = 10u128
        .checked_pow(decimals - scale)
        .ok_or(SwapdeskError::BalanceOverflow)?;
    mantissa
        .checked_mul(factor)
        .ok_or(SwapdeskError::BalanceOverflow)
}

/// Convert base units back into a decimal whole-unit value.
///
/// # Errors
/// Returns `BalanceOverflow` if the amount exceeds decimal precision.
pub fn format_units(amount: Amount, decimals: u32) -> Result<Decimal> {
    let raw = i128::try_from(amount).map_err(|_| SwapdeskError::BalanceOverflow)?;
    Decimal::try_from_i128_with_scale(raw, decimals)
        .map(|d| d.normalize())
        .map_err(|_| SwapdeskError::BalanceOverflow)
}
