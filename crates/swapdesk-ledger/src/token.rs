//! In-memory reference implementation of [`FungibleAsset`].
//!
//! Behaves like a standard allowance-based token: the deployer receives the
//! full supply, transfers to the zero address are refused, and
//! `transfer_from` spends the caller's allowance. Every successful mutation
//! appends a [`TokenEvent`].

use std::collections::HashMap;

use rust_decimal::Decimal;
use swapdesk_types::units::parse_units;
use swapdesk_types::{Address, Amount, Result, constants};
use tracing::debug;

use crate::collaborator::FungibleAsset;

/// Log entry emitted by [`InMemoryToken`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenEvent {
    Transfer {
        from: Address,
        to: Address,
        value: Amount,
    },
    Approval {
        owner: Address,
        spender: Address,
        value: Amount,
    },
}

/// A self-contained fungible token.
#[derive(Debug, Clone)]
pub struct InMemoryToken {
    address: Address,
    name: String,
    symbol: String,
    decimals: u32,
    total_supply: Amount,
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
    events: Vec<TokenEvent>,
}

impl InMemoryToken {
    /// Default "OSD Token": 1,000,000 whole tokens at 18 decimals, all
    /// assigned to `deployer`.
    #[must_use]
    pub fn new(address: Address, deployer: Address) -> Self {
        let supply = constants::DEFAULT_TOKEN_SUPPLY_WHOLE
            * 10u128.pow(constants::DEFAULT_DECIMALS);
        Self::with_metadata(
            address,
            deployer,
            constants::DEFAULT_TOKEN_NAME,
            constants::DEFAULT_TOKEN_SYMBOL,
            constants::DEFAULT_DECIMALS,
            supply,
        )
    }

    /// Token with explicit metadata. `total_supply` is in base units.
    #[must_use]
    pub fn with_metadata(
        address: Address,
        deployer: Address,
        name: impl Into<String>,
        symbol: impl Into<String>,
        decimals: u32,
        total_supply: Amount,
    ) -> Self {
        let mut balances = HashMap::new();
        balances.insert(deployer, total_supply);
        Self {
            address,
            name: name.into(),
            symbol: symbol.into(),
            decimals,
            total_supply,
            balances,
            allowances: HashMap::new(),
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    #[must_use]
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    #[must_use]
    pub fn events(&self) -> &[TokenEvent] {
        &self.events
    }

    /// Whole-unit helper: `1.5` → base units at this token's decimals.
    ///
    /// # Errors
    /// See [`parse_units`].
    pub fn units(&self, value: Decimal) -> Result<Amount> {
        parse_units(value, self.decimals)
    }

    fn move_balance(&mut self, from: Address, to: Address, amount: Amount) -> bool {
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
        self.events.push(TokenEvent::Transfer {
            from,
            to,
            value: amount,
        });
        debug!(token = %self.symbol, from = %from, to = %to, amount, "Token transfer");
        true
    }
}

impl FungibleAsset for InMemoryToken {
    fn address(&self) -> Address {
        self.address
    }

    fn decimals(&self) -> u32 {
        self.decimals
    }

    fn balance_of(&self, owner: Address) -> Amount {
        self.balances.get(&owner).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: Address, spender: Address) -> Amount {
        self.allowances.get(&(owner, spender)).copied().unwrap_or(0)
    }

    fn transfer(&mut self, caller: Address, to: Address, amount: Amount) -> bool {
        self.move_balance(caller, to, amount)
    }

    fn approve(&mut self, caller: Address, spender: Address, amount: Amount) -> bool {
        if spender.is_zero() {
            return false;
        }
        self.allowances.insert((caller, spender), amount);
        self.events.push(TokenEvent::Approval {
            owner: caller,
            spender,
            value: amount,
        });
        true
    }

    fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> bool {
        let allowed = self.allowance(from, caller);
        let Some(left) = allowed.checked_sub(amount) else {
            return false;
        };
        if !self.move_balance(from, to, amount) {
            return false;
        }
        self.allowances.insert((from, caller), left);
        true
    }
}
