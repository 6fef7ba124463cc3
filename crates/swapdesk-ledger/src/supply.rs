//! Supply conservation invariant checker.
//!
//! Invariant that must hold after every committed operation:
//! ```text
//! ∀ asset: Σ balances == Σ deposits − Σ withdrawals
//! ```
//!
//! Fills and fees only move custody between users, so they never change
//! either side of the equation.

use std::collections::{BTreeSet, HashMap};

use swapdesk_types::{Amount, AssetId, Result, SwapdeskError};

/// Per-asset running totals of value that entered and left custody.
#[derive(Debug, Default)]
pub struct SupplyConservation {
    deposits: HashMap<AssetId, Amount>,
    withdrawals: HashMap<AssetId, Amount>,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_deposit(&mut self, asset: AssetId, amount: Amount) {
        let total = self.deposits.entry(asset).or_insert(0);
        *total = total.saturating_add(amount);
    }

    pub fn record_withdrawal(&mut self, asset: AssetId, amount: Amount) {
        let total = self.withdrawals.entry(asset).or_insert(0);
        *total = total.saturating_add(amount);
    }

    #[must_use]
    pub fn total_deposits(&self, asset: AssetId) -> Amount {
        self.deposits.get(&asset).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_withdrawals(&self, asset: AssetId) -> Amount {
        self.withdrawals.get(&asset).copied().unwrap_or(0)
    }

    /// Deposits minus withdrawals, or `None` if more left than ever came in.
    #[must_use]
    pub fn expected_supply(&self, asset: AssetId) -> Option<Amount> {
        self.total_deposits(asset)
            .checked_sub(self.total_withdrawals(asset))
    }

    /// # Errors
    /// Returns [`SwapdeskError::SupplyInvariantViolation`] if `actual_supply`
    /// differs from deposits minus withdrawals.
    pub fn verify(&self, asset: AssetId, actual_supply: Amount) -> Result<()> {
        match self.expected_supply(asset) {
            Some(expected) if expected == actual_supply => Ok(()),
            expected => Err(SwapdeskError::SupplyInvariantViolation {
                reason: format!(
                    "asset {asset}: actual supply {actual_supply} != expected {expected:?} \
                     (deposits={}, withdrawals={})",
                    self.total_deposits(asset),
                    self.total_withdrawals(asset),
                ),
            }),
        }
    }

    /// Every asset that has seen a deposit or a withdrawal.
    #[must_use]
    pub fn tracked_assets(&self) -> Vec<AssetId> {
        let assets: BTreeSet<AssetId> = self
            .deposits
            .keys()
            .chain(self.withdrawals.keys())
            .copied()
            .collect();
        assets.into_iter().collect()
    }
}
