//! Seams to the systems that hold value outside the ledger.
//!
//! The ledger never owns asset accounting itself. Moving custody in or out
//! goes through one of these traits, and every call reports success as a
//! plain `bool` the way the external systems do. The ledger turns a `false`
//! into `TransferFailed` and unwinds its own bookkeeping.

use swapdesk_types::{Address, Amount, constants};

/// An externally managed fungible asset.
///
/// Every mutating call is qualified by the authenticated `caller`.
pub trait FungibleAsset {
    /// The collaborator's own identity; doubles as its [`AssetId`](swapdesk_types::AssetId).
    fn address(&self) -> Address;

    /// Number of fractional decimal digits in one whole unit.
    fn decimals(&self) -> u32 {
        constants::DEFAULT_DECIMALS
    }

    fn balance_of(&self, owner: Address) -> Amount;

    fn allowance(&self, owner: Address, spender: Address) -> Amount;

    /// Move `amount` from `caller` to `to`.
    fn transfer(&mut self, caller: Address, to: Address, amount: Amount) -> bool;

    /// Let `spender` move up to `amount` of `caller`'s balance.
    fn approve(&mut self, caller: Address, spender: Address, amount: Amount) -> bool;

    /// Move `amount` from `from` to `to`, spending `caller`'s allowance.
    fn transfer_from(&mut self, caller: Address, from: Address, to: Address, amount: Amount)
    -> bool;
}

/// The custody boundary for the native currency.
///
/// `receive` models value attached to a deposit call; `send` models the
/// outgoing value transfer of a withdrawal.
pub trait NativeBank {
    fn balance_of(&self, owner: Address) -> Amount;

    /// Move `amount` of native value from `from` into `custodian`.
    fn receive(&mut self, from: Address, custodian: Address, amount: Amount) -> bool;

    /// Pay `amount` of native value out of `custodian` to `to`.
    fn send(&mut self, custodian: Address, to: Address, amount: Amount) -> bool;
}
