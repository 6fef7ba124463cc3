//! The custody ledger.
//!
//! Tracks a non-negative [`Amount`] per `(asset, user)` pair and is the sole
//! source of truth for how much custody a user holds. Entries appear lazily
//! on first credit and read as zero until then.
//!
//! ## Two-phase mutations
//!
//! Operations that touch an external collaborator follow
//! reserve → external effect → commit/rollback:
//!
//! ```text
//! Ledger::begin() ─▶ LedgerTx ─debit/credit─▶ collaborator call
//!                                             ├─ ok ──▶ commit()
//!                                             └─ fail ─▶ drop ⇒ rollback
//! ```
//!
//! A [`LedgerTx`] records the prior value of every key it touches. Dropping
//! it without calling [`LedgerTx::commit`] restores those values in reverse
//! order, so an early `?` return can never leave a half-applied operation.

use std::collections::HashMap;

use swapdesk_types::{Address, Amount, AssetId, Result, SwapdeskError};
use tracing::{debug, info, warn};

use crate::collaborator::{FungibleAsset, NativeBank};
use crate::supply::SupplyConservation;

/// Balance table key.
pub type BalanceKey = (AssetId, Address);

/// Per-(asset, user) custody balances.
#[derive(Debug, Default)]
pub struct Ledger {
    balances: HashMap<BalanceKey, Amount>,
    supply: SupplyConservation,
}

impl Ledger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current balance, zero for keys never seen.
    #[must_use]
    pub fn balance_of(&self, asset: AssetId, user: Address) -> Amount {
        self.balances.get(&(asset, user)).copied().unwrap_or(0)
    }

    /// Open a transaction. Uncommitted changes roll back on drop.
    pub fn begin(&mut self) -> LedgerTx<'_> {
        LedgerTx {
            ledger: self,
            undo: Vec::new(),
            committed: false,
        }
    }

    // =================================================================
    // Native currency
    // =================================================================

    /// Take native value from `user` into `custodian` and credit it.
    ///
    /// Returns the user's new balance.
    ///
    /// # Errors
    /// - `BalanceOverflow` if the credit would overflow
    /// - `TransferFailed` if the native bank refuses the value
    pub fn deposit_native(
        &mut self,
        bank: &mut dyn NativeBank,
        custodian: Address,
        user: Address,
        amount: Amount,
    ) -> Result<Amount> {
        let asset = AssetId::NATIVE;
        let mut tx = self.begin();
        let balance = tx.credit(asset, user, amount)?;

        if !bank.receive(user, custodian, amount) {
            warn!(user = %user, amount, "Native deposit refused by custody boundary");
            return Err(SwapdeskError::TransferFailed {
                reason: format!("native value of {amount} from {user} was not received"),
            });
        }

        tx.commit();
        self.supply.record_deposit(asset, amount);
        info!(asset = %asset, user = %user, amount, balance, "Deposit");
        Ok(balance)
    }

    /// Debit native custody, then pay it out from `custodian`.
    ///
    /// Returns the user's new balance.
    ///
    /// # Errors
    /// - `InsufficientBalance` if the user holds less than `amount`
    /// - `TransferFailed` if the payout fails (the debit is rolled back)
    pub fn withdraw_native(
        &mut self,
        bank: &mut dyn NativeBank,
        custodian: Address,
        user: Address,
        amount: Amount,
    ) -> Result<Amount> {
        let asset = AssetId::NATIVE;
        let mut tx = self.begin();
        let balance = tx.debit(asset, user, amount)?;

        if !bank.send(custodian, user, amount) {
            warn!(user = %user, amount, "Native payout failed, rolling back debit");
            return Err(SwapdeskError::TransferFailed {
                reason: format!("native payout of {amount} to {user} failed"),
            });
        }

        tx.commit();
        self.supply.record_withdrawal(asset, amount);
        info!(asset = %asset, user = %user, amount, balance, "Withdrawal");
        Ok(balance)
    }

    // =================================================================
    // Fungible assets
    // =================================================================

    /// Pull `amount` of `asset` from `user` into `custodian` using the
    /// user's allowance, then credit it.
    ///
    /// Returns the user's new balance.
    ///
    /// # Errors
    /// - `InvalidAsset` if the collaborator sits at the native sentinel
    /// - `InsufficientAllowance` if `user` has not approved `custodian`
    /// - `TransferFailed` if the collaborator's transfer-in fails
    /// - `BalanceOverflow` if the credit would overflow
    pub fn deposit_asset(
        &mut self,
        asset: &mut dyn FungibleAsset,
        custodian: Address,
        user: Address,
        amount: Amount,
    ) -> Result<Amount> {
        let asset_id = fungible_id(asset)?;

        let allowed = asset.allowance(user, custodian);
        if allowed < amount {
            return Err(SwapdeskError::InsufficientAllowance {
                needed: amount,
                allowed,
            });
        }

        let mut tx = self.begin();
        let balance = tx.credit(asset_id, user, amount)?;

        if !asset.transfer_from(custodian, user, custodian, amount) {
            warn!(asset = %asset_id, user = %user, amount, "Asset transfer-in failed");
            return Err(SwapdeskError::TransferFailed {
                reason: format!("transfer of {amount} {asset_id} from {user} failed"),
            });
        }

        tx.commit();
        self.supply.record_deposit(asset_id, amount);
        info!(asset = %asset_id, user = %user, amount, balance, "Deposit");
        Ok(balance)
    }

    /// Debit asset custody, then transfer it out from `custodian`.
    ///
    /// Returns the user's new balance.
    ///
    /// # Errors
    /// - `InvalidAsset` if the collaborator sits at the native sentinel
    /// - `InsufficientBalance` if the user holds less than `amount`
    /// - `TransferFailed` if the transfer-out fails (the debit is rolled back)
    pub fn withdraw_asset(
        &mut self,
        asset: &mut dyn FungibleAsset,
        custodian: Address,
        user: Address,
        amount: Amount,
    ) -> Result<Amount> {
        let asset_id = fungible_id(asset)?;

        let mut tx = self.begin();
        let balance = tx.debit(asset_id, user, amount)?;

        if !asset.transfer(custodian, user, amount) {
            warn!(asset = %asset_id, user = %user, amount, "Asset transfer-out failed, rolling back debit");
            return Err(SwapdeskError::TransferFailed {
                reason: format!("transfer of {amount} {asset_id} to {user} failed"),
            });
        }

        tx.commit();
        self.supply.record_withdrawal(asset_id, amount);
        info!(asset = %asset_id, user = %user, amount, balance, "Withdrawal");
        Ok(balance)
    }

    // =================================================================
    // Supply
    // =================================================================

    /// Sum of every user's custody of `asset`.
    #[must_use]
    pub fn total_supply(&self, asset: AssetId) -> Amount {
        self.balances
            .iter()
            .filter(|((a, _), _)| *a == asset)
            .map(|(_, amount)| *amount)
            .fold(0, Amount::saturating_add)
    }

    /// Check custody against recorded deposits and withdrawals.
    ///
    /// # Errors
    /// Returns `SupplyInvariantViolation` if they disagree.
    pub fn verify_supply(&self, asset: AssetId) -> Result<()> {
        self.supply.verify(asset, self.total_supply(asset))
    }

    /// Every asset that has ever entered or left custody.
    #[must_use]
    pub fn tracked_assets(&self) -> Vec<AssetId> {
        self.supply.tracked_assets()
    }
}

fn fungible_id(asset: &dyn FungibleAsset) -> Result<AssetId> {
    let id = AssetId::token(asset.address());
    if id.is_native() {
        return Err(SwapdeskError::InvalidAsset(id));
    }
    Ok(id)
}

// ---------------------------------------------------------------------------
// LedgerTx
// ---------------------------------------------------------------------------

/// An open ledger transaction with an undo log.
///
/// All effects are visible through the transaction immediately; they become
/// final on [`commit`](Self::commit). Dropping without commit rolls back.
pub struct LedgerTx<'a> {
    ledger: &'a mut Ledger,
    /// Prior value of each touched key, in touch order.
    undo: Vec<(BalanceKey, Option<Amount>)>,
    committed: bool,
}

impl LedgerTx<'_> {
    #[must_use]
    pub fn balance_of(&self, asset: AssetId, user: Address) -> Amount {
        self.ledger.balance_of(asset, user)
    }

    /// Add `amount` to a balance. Returns the new balance.
    ///
    /// # Errors
    /// Returns `BalanceOverflow` if the balance would exceed [`Amount::MAX`].
    pub fn credit(&mut self, asset: AssetId, user: Address, amount: Amount) -> Result<Amount> {
        let current = self.balance_of(asset, user);
        let next = current
            .checked_add(amount)
            .ok_or(SwapdeskError::BalanceOverflow)?;
        self.set(asset, user, next);
        debug!(asset = %asset, user = %user, amount, balance = next, "Credit");
        Ok(next)
    }

    /// Subtract `amount` from a balance. Returns the new balance.
    ///
    /// # Errors
    /// Returns `InsufficientBalance` if the balance is below `amount`; the
    /// balance is left untouched.
    pub fn debit(&mut self, asset: AssetId, user: Address, amount: Amount) -> Result<Amount> {
        let available = self.balance_of(asset, user);
        let next = available
            .checked_sub(amount)
            .ok_or(SwapdeskError::InsufficientBalance {
                needed: amount,
                available,
            })?;
        self.set(asset, user, next);
        debug!(asset = %asset, user = %user, amount, balance = next, "Debit");
        Ok(next)
    }

    /// Move custody between two users with no external call.
    ///
    /// # Errors
    /// - `InsufficientBalance` if `from` holds less than `amount`
    /// - `BalanceOverflow` if the credit to `to` would overflow
    pub fn transfer_internal(
        &mut self,
        asset: AssetId,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        self.debit(asset, from, amount)?;
        self.credit(asset, to, amount)?;
        Ok(())
    }

    /// Make every change final.
    pub fn commit(mut self) {
        self.committed = true;
        self.undo.clear();
    }

    fn set(&mut self, asset: AssetId, user: Address, value: Amount) {
        let key = (asset, user);
        let previous = self.ledger.balances.insert(key, value);
        self.undo.push((key, previous));
    }

    fn rollback(&mut self) {
        while let Some((key, previous)) = self.undo.pop() {
            match previous {
                Some(value) => {
                    self.ledger.balances.insert(key, value);
                }
                None => {
                    self.ledger.balances.remove(&key);
                }
            }
        }
    }
}

impl Drop for LedgerTx<'_> {
    fn drop(&mut self) {
        if !self.committed && !self.undo.is_empty() {
            debug!(legs = self.undo.len(), "Rolling back uncommitted ledger transaction");
            self.rollback();
        }
    }
}
