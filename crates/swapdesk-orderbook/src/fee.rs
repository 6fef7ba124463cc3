//! Filler-side fee calculation.

use swapdesk_types::{Amount, Result, SwapdeskError, constants};

/// `amount * fee_percent / 100`, truncated toward zero.
///
/// # Errors
/// Returns `BalanceOverflow` if the intermediate product overflows.
pub fn compute_fee(amount: Amount, fee_percent: u32) -> Result<Amount> {
    amount
        .checked_mul(Amount::from(fee_percent))
        .map(|scaled| scaled / constants::PERCENT_DENOMINATOR)
        .ok_or(SwapdeskError::BalanceOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE: Amount = 1_000_000_000_000_000_000;

    #[test]
    fn ten_percent_of_one_token() {
        assert_eq!(compute_fee(ONE, 10).unwrap(), ONE / 10);
    }

    #[test]
    fn truncates_dust() {
        assert_eq!(compute_fee(9, 10).unwrap(), 0);
        assert_eq!(compute_fee(19, 10).unwrap(), 1);
    }

    #[test]
    fn zero_percent_is_free() {
        assert_eq!(compute_fee(ONE, 0).unwrap(), 0);
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(
            compute_fee(Amount::MAX, 2).unwrap_err(),
            SwapdeskError::BalanceOverflow
        );
    }
}
