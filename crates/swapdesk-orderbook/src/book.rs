//! The order book.
//!
//! Orders live in a `BTreeMap` keyed by [`OrderId`], so iteration is in
//! creation order. Ids are assigned sequentially from 1 and never reused;
//! resolved orders stay in the book so their outcome remains queryable.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use swapdesk_ledger::Ledger;
use swapdesk_types::{Address, Amount, Order, OrderId, OrderTerms, Result, SwapdeskError};
use tracing::{info, warn};

use crate::fee::compute_fee;

/// Outcome of a successful fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fill {
    /// The order as stored after the fill.
    pub order: Order,
    pub filler: Address,
    /// Fee paid by the filler in the wanted asset.
    pub fee: Amount,
}

/// Every order ever posted to an exchange.
#[derive(Debug)]
pub struct OrderBook {
    orders: BTreeMap<OrderId, Order>,
    next_id: OrderId,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    #[must_use]
    pub fn new() -> Self {
        Self {
            orders: BTreeMap::new(),
            next_id: OrderId(1),
        }
    }

    // =================================================================
    // Mutations
    // =================================================================

    /// Post an order. The owner's custody is not checked here; solvency is
    /// only enforced when somebody fills it.
    ///
    /// # Errors
    /// Returns `InvalidOrder` if either amount is zero.
    pub fn make_order(
        &mut self,
        owner: Address,
        terms: OrderTerms,
        now: DateTime<Utc>,
    ) -> Result<&Order> {
        terms.validate()?;

        let id = self.next_id;
        self.next_id = id.next();
        info!(
            order = %id,
            owner = %owner,
            want = %terms.asset_wanted,
            amount_wanted = terms.amount_wanted,
            give = %terms.asset_given,
            amount_given = terms.amount_given,
            "Order placed"
        );
        Ok(self
            .orders
            .entry(id)
            .or_insert_with(|| Order::new(id, owner, terms, now)))
    }

    /// Withdraw an open order. Only its owner may cancel it.
    ///
    /// # Errors
    /// Checked in this order:
    /// - `NotFound` if no order has that id
    /// - `Unauthorized` if `caller` is not the owner
    /// - `AlreadyResolved` if the order is filled or cancelled
    pub fn cancel_order(&mut self, caller: Address, id: OrderId) -> Result<&Order> {
        let order = self.orders.get_mut(&id).ok_or(SwapdeskError::NotFound(id))?;
        if order.owner != caller {
            warn!(order = %id, caller = %caller, "Cancel by non-owner refused");
            return Err(SwapdeskError::Unauthorized { caller, order: id });
        }
        order.mark_cancelled()?;
        info!(order = %id, owner = %caller, "Order cancelled");
        Ok(&*order)
    }

    /// Settle an open order against the filler's custody.
    ///
    /// Three legs move inside one ledger transaction:
    /// 1. filler → owner: `amount_wanted` of `asset_wanted`
    /// 2. filler → fee account: the fee, in `asset_wanted`
    /// 3. owner → filler: `amount_given` of `asset_given`
    ///
    /// If any leg fails the transaction is dropped, every balance is
    /// restored and the order stays open.
    ///
    /// # Errors
    /// - `NotFound` if no order has that id
    /// - `AlreadyResolved` if the order is filled or cancelled
    /// - `BalanceOverflow` if the fee computation or a credit overflows
    /// - `InsufficientBalance` if the filler cannot pay price plus fee, or
    ///   the owner no longer holds what the order gives
    pub fn fill_order(
        &mut self,
        ledger: &mut Ledger,
        caller: Address,
        id: OrderId,
        fee_account: Address,
        fee_percent: u32,
    ) -> Result<Fill> {
        let order = self.orders.get_mut(&id).ok_or(SwapdeskError::NotFound(id))?;
        if !order.is_open() {
            return Err(SwapdeskError::AlreadyResolved(id));
        }
        let terms = order.terms;
        let owner = order.owner;
        let fee = compute_fee(terms.amount_wanted, fee_percent)?;

        let mut tx = ledger.begin();
        let settled = tx
            .transfer_internal(terms.asset_wanted, caller, owner, terms.amount_wanted)
            .and_then(|()| tx.transfer_internal(terms.asset_wanted, caller, fee_account, fee))
            .and_then(|()| {
                tx.transfer_internal(terms.asset_given, owner, caller, terms.amount_given)
            });
        if let Err(err) = settled {
            warn!(order = %id, filler = %caller, error = %err, "Fill rejected, settlement rolled back");
            return Err(err);
        }
        tx.commit();

        order.mark_filled()?;
        info!(
            order = %id,
            owner = %owner,
            filler = %caller,
            fee,
            fee_account = %fee_account,
            "Order filled"
        );
        Ok(Fill {
            order: order.clone(),
            filler: caller,
            fee,
        })
    }

    // =================================================================
    // Reads
    // =================================================================

    /// Number of orders ever posted; also the highest id assigned.
    #[must_use]
    pub fn order_count(&self) -> u64 {
        self.next_id.0 - 1
    }

    #[must_use]
    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    /// `false` for unknown ids.
    #[must_use]
    pub fn is_filled(&self, id: OrderId) -> bool {
        self.orders.get(&id).is_some_and(Order::is_filled)
    }

    /// `false` for unknown ids.
    #[must_use]
    pub fn is_cancelled(&self, id: OrderId) -> bool {
        self.orders.get(&id).is_some_and(Order::is_cancelled)
    }

    /// Orders still available to fill, in id order.
    pub fn open_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values().filter(|o| o.is_open())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swapdesk_ledger::LedgerTx;
    use swapdesk_types::{AssetId, OrderState};

    const ONE: Amount = 1_000_000_000_000_000_000;

    fn owner() -> Address {
        Address::from_low_u64(1)
    }

    fn filler() -> Address {
        Address::from_low_u64(2)
    }

    fn fee_account() -> Address {
        Address::from_low_u64(3)
    }

    fn token() -> AssetId {
        AssetId::token(Address::from_low_u64(500))
    }

    /// Wants 1 token, gives 1 native.
    fn terms() -> OrderTerms {
        OrderTerms::new(token(), ONE, AssetId::NATIVE, ONE)
    }

    fn fund(tx: &mut LedgerTx<'_>, asset: AssetId, user: Address, amount: Amount) {
        tx.credit(asset, user, amount).unwrap();
    }

    fn funded_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        let mut tx = ledger.begin();
        fund(&mut tx, AssetId::NATIVE, owner(), ONE);
        fund(&mut tx, token(), filler(), 2 * ONE);
        tx.commit();
        ledger
    }

    #[test]
    fn ids_start_at_one_and_increase() {
        let mut book = OrderBook::new();
        assert_eq!(book.order_count(), 0);
        let first = book.make_order(owner(), terms(), Utc::now()).unwrap().id;
        let second = book.make_order(owner(), terms(), Utc::now()).unwrap().id;
        assert_eq!(first, OrderId(1));
        assert_eq!(second, OrderId(2));
        assert_eq!(book.order_count(), 2);
    }

    #[test]
    fn make_order_stores_terms() {
        let mut book = OrderBook::new();
        let now = Utc::now();
        let id = book.make_order(owner(), terms(), now).unwrap().id;
        let order = book.get(id).unwrap();
        assert_eq!(order.owner, owner());
        assert_eq!(order.terms, terms());
        assert_eq!(order.created_at, now);
        assert_eq!(order.state(), OrderState::Open);
    }

    #[test]
    fn zero_amount_order_rejected() {
        let mut book = OrderBook::new();
        let bad = OrderTerms::new(token(), 0, AssetId::NATIVE, ONE);
        assert!(matches!(
            book.make_order(owner(), bad, Utc::now()),
            Err(SwapdeskError::InvalidOrder { .. })
        ));
        assert_eq!(book.order_count(), 0);
    }

    #[test]
    fn fill_settles_three_legs() {
        let mut book = OrderBook::new();
        let mut ledger = funded_ledger();
        let id = book.make_order(owner(), terms(), Utc::now()).unwrap().id;

        let fill = book
            .fill_order(&mut ledger, filler(), id, fee_account(), 10)
            .unwrap();
        assert_eq!(fill.fee, ONE / 10);
        assert!(fill.order.is_filled());

        assert_eq!(ledger.balance_of(token(), owner()), ONE);
        assert_eq!(ledger.balance_of(AssetId::NATIVE, filler()), ONE);
        assert_eq!(ledger.balance_of(AssetId::NATIVE, owner()), 0);
        assert_eq!(ledger.balance_of(token(), filler()), ONE - ONE / 10);
        assert_eq!(ledger.balance_of(token(), fee_account()), ONE / 10);
        assert!(book.is_filled(id));
        assert!(!book.is_cancelled(id));
    }

    #[test]
    fn unknown_order_not_found() {
        let mut book = OrderBook::new();
        let mut ledger = funded_ledger();
        assert_eq!(
            book.fill_order(&mut ledger, filler(), OrderId(999), fee_account(), 10)
                .unwrap_err(),
            SwapdeskError::NotFound(OrderId(999))
        );
        assert_eq!(
            book.cancel_order(owner(), OrderId(999)).unwrap_err(),
            SwapdeskError::NotFound(OrderId(999))
        );
    }

    #[test]
    fn second_fill_rejected() {
        let mut book = OrderBook::new();
        let mut ledger = funded_ledger();
        let id = book.make_order(owner(), terms(), Utc::now()).unwrap().id;
        book.fill_order(&mut ledger, filler(), id, fee_account(), 10)
            .unwrap();
        assert_eq!(
            book.fill_order(&mut ledger, filler(), id, fee_account(), 10)
                .unwrap_err(),
            SwapdeskError::AlreadyResolved(id)
        );
    }

    #[test]
    fn filler_short_of_fee_rolls_back() {
        let mut book = OrderBook::new();
        let mut ledger = Ledger::new();
        {
            let mut tx = ledger.begin();
            fund(&mut tx, AssetId::NATIVE, owner(), ONE);
            // Covers the price but not the 10% fee on top.
            fund(&mut tx, token(), filler(), ONE);
            tx.commit();
        }
        let id = book.make_order(owner(), terms(), Utc::now()).unwrap().id;

        let err = book
            .fill_order(&mut ledger, filler(), id, fee_account(), 10)
            .unwrap_err();
        assert!(matches!(err, SwapdeskError::InsufficientBalance { .. }));
        assert_eq!(ledger.balance_of(token(), filler()), ONE);
        assert_eq!(ledger.balance_of(token(), owner()), 0);
        assert!(book.get(id).unwrap().is_open());
    }

    #[test]
    fn undercollateralized_owner_rolls_back() {
        let mut book = OrderBook::new();
        let mut ledger = Ledger::new();
        {
            let mut tx = ledger.begin();
            fund(&mut tx, token(), filler(), 2 * ONE);
            tx.commit();
        }
        // Owner holds no native custody but may still post.
        let id = book.make_order(owner(), terms(), Utc::now()).unwrap().id;

        let err = book
            .fill_order(&mut ledger, filler(), id, fee_account(), 10)
            .unwrap_err();
        assert_eq!(
            err,
            SwapdeskError::InsufficientBalance {
                needed: ONE,
                available: 0
            }
        );
        assert_eq!(ledger.balance_of(token(), filler()), 2 * ONE);
        assert_eq!(ledger.balance_of(token(), owner()), 0);
        assert_eq!(ledger.balance_of(token(), fee_account()), 0);
        assert!(book.get(id).unwrap().is_open());
    }

    #[test]
    fn cancel_checks_owner_then_state() {
        let mut book = OrderBook::new();
        let id = book.make_order(owner(), terms(), Utc::now()).unwrap().id;

        assert_eq!(
            book.cancel_order(filler(), id).unwrap_err(),
            SwapdeskError::Unauthorized {
                caller: filler(),
                order: id
            }
        );
        assert!(book.cancel_order(owner(), id).unwrap().is_cancelled());
        assert!(book.is_cancelled(id));
        assert_eq!(
            book.cancel_order(owner(), id).unwrap_err(),
            SwapdeskError::AlreadyResolved(id)
        );
        // A non-owner still sees Unauthorized on a resolved order.
        assert!(matches!(
            book.cancel_order(filler(), id).unwrap_err(),
            SwapdeskError::Unauthorized { .. }
        ));
    }

    #[test]
    fn cancelled_order_cannot_be_filled() {
        let mut book = OrderBook::new();
        let mut ledger = funded_ledger();
        let id = book.make_order(owner(), terms(), Utc::now()).unwrap().id;
        book.cancel_order(owner(), id).unwrap();
        assert_eq!(
            book.fill_order(&mut ledger, filler(), id, fee_account(), 10)
                .unwrap_err(),
            SwapdeskError::AlreadyResolved(id)
        );
        assert_eq!(ledger.balance_of(token(), filler()), 2 * ONE);
    }

    #[test]
    fn filled_order_cannot_be_cancelled() {
        let mut book = OrderBook::new();
        let mut ledger = funded_ledger();
        let id = book.make_order(owner(), terms(), Utc::now()).unwrap().id;
        book.fill_order(&mut ledger, filler(), id, fee_account(), 10)
            .unwrap();
        assert_eq!(
            book.cancel_order(owner(), id).unwrap_err(),
            SwapdeskError::AlreadyResolved(id)
        );
    }

    #[test]
    fn open_orders_skip_resolved() {
        let mut book = OrderBook::new();
        let mut ledger = funded_ledger();
        let a = book.make_order(owner(), terms(), Utc::now()).unwrap().id;
        let b = book.make_order(owner(), terms(), Utc::now()).unwrap().id;
        let c = book.make_order(owner(), terms(), Utc::now()).unwrap().id;
        book.cancel_order(owner(), a).unwrap();
        book.fill_order(&mut ledger, filler(), b, fee_account(), 10)
            .unwrap();
        let open: Vec<OrderId> = book.open_orders().map(|o| o.id).collect();
        assert_eq!(open, vec![c]);
    }

    #[test]
    fn unknown_ids_are_neither_filled_nor_cancelled() {
        let book = OrderBook::new();
        assert!(!book.is_filled(OrderId(1)));
        assert!(!book.is_cancelled(OrderId(1)));
        assert!(book.get(OrderId(1)).is_none());
    }
}
