//! In-memory native currency balances.
//!
//! Stands in for the chain's account balances: `receive` is the value a
//! caller attaches to a deposit, `send` is an outgoing payout.

use std::collections::HashMap;

use swapdesk_types::{Address, Amount};
use tracing::debug;

use crate::collaborator::NativeBank;

#[derive(Debug, Clone, Default)]
pub struct InMemoryNativeBank {
    balances: HashMap<Address, Amount>,
}

impl InMemoryNativeBank {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint native value to `owner` (test setup and genesis funding).
    pub fn fund(&mut self, owner: Address, amount: Amount) {
        let balance = self.balances.entry(owner).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    fn move_value(&mut self, from: Address, to: Address, amount: Amount) -> bool {
        if to.is_zero() {
            return false;
        }
        let Some(remaining) = self.balance_of(from).checked_sub(amount) else {
            return false;
        };
        if from != to {
            let Some(credited) = self.balance_of(to).checked_add(amount) else {
                return false;
            };
            self.balances.insert(from, remaining);
            self.balances.insert(to, credited);
        }
        debug!(from = %from, to = %to, amount, "Native value moved");
        true
    }
}

impl NativeBank for InMemoryNativeBank {
    fn balance_of(&self, owner: Address) -> Amount {
        self.balances.get(&owner).copied().unwrap_or(0)
    }

    fn receive(&mut self, from: Address, custodian: Address, amount: Amount) -> bool {
        self.move_value(from, custodian, amount)
    }

    fn send(&mut self, custodian: Address, to: Address, amount: Amount) -> bool {
        self.move_value(custodian, to, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receive_and_send() {
        let mut bank = InMemoryNativeBank::new();
        let (user, vault) = (Address::from_low_u64(1), Address::from_low_u64(2));
        bank.fund(user, 10);

        assert!(bank.receive(user, vault, 4));
        assert_eq!(bank.balance_of(user), 6);
        assert_eq!(bank.balance_of(vault), 4);

        assert!(!bank.send(vault, user, 5));
        assert!(bank.send(vault, user, 4));
        assert_eq!(bank.balance_of(user), 10);
        assert_eq!(bank.balance_of(vault), 0);
    }

    #[test]
    fn payout_to_zero_address_refused() {
        let mut bank = InMemoryNativeBank::new();
        let vault = Address::from_low_u64(2);
        bank.fund(vault, 1);
        assert!(!bank.send(vault, Address::ZERO, 1));
        assert_eq!(bank.balance_of(vault), 1);
    }
}
