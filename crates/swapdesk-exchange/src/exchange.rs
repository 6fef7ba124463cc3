//! Exchange orchestration.
//!
//! Owns the ledger, the order book, the registered asset collaborators, the
//! native custody boundary and the event log. Mutations take `&mut self`,
//! so one operation always runs to completion before the next starts.

use std::fmt;

use chrono::Utc;
use swapdesk_ledger::{AssetRegistry, FungibleAsset, Ledger, NativeBank};
use swapdesk_orderbook::{Fill, OrderBook};
use swapdesk_types::{
    Address, Amount, AssetId, ExchangeConfig, ExchangeEvent, Order, OrderId, OrderTerms, Result,
    SwapdeskError,
};
use tracing::{info, warn};

use crate::event_log::EventLog;

/// A custodial swap exchange.
pub struct Exchange {
    config: ExchangeConfig,
    ledger: Ledger,
    book: OrderBook,
    assets: AssetRegistry,
    native: Box<dyn NativeBank>,
    events: EventLog,
}

impl fmt::Debug for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exchange")
            .field("config", &self.config)
            .field("order_count", &self.book.order_count())
            .field("assets", &self.assets)
            .field("events", &self.events.len())
            .finish_non_exhaustive()
    }
}

impl Exchange {
    /// Create an exchange with no registered assets.
    ///
    /// # Errors
    /// Returns `Configuration` if `config` fails validation.
    pub fn new(config: ExchangeConfig, native: Box<dyn NativeBank>) -> Result<Self> {
        config.validate()?;
        info!(
            address = %config.address,
            fee_account = %config.fee_account,
            fee_percent = config.fee_percent,
            "Exchange created"
        );
        Ok(Self {
            config,
            ledger: Ledger::new(),
            book: OrderBook::new(),
            assets: AssetRegistry::new(),
            native,
            events: EventLog::new(),
        })
    }

    /// Accept deposits of a fungible asset.
    ///
    /// # Errors
    /// `InvalidAsset` or `DuplicateAsset`, see [`AssetRegistry::register`].
    pub fn register_asset(&mut self, asset: Box<dyn FungibleAsset>) -> Result<AssetId> {
        self.assets.register(asset)
    }

    // =================================================================
    // Custody
    // =================================================================

    /// Deposit native value attached to the call. Returns the new balance.
    ///
    /// # Errors
    /// - `TransferFailed` if the value never arrives
    /// - `BalanceOverflow` if the credit would overflow
    pub fn deposit_native(&mut self, caller: Address, amount: Amount) -> Result<Amount> {
        let balance = self.ledger.deposit_native(
            self.native.as_mut(),
            self.config.address,
            caller,
            amount,
        )?;
        self.emit(ExchangeEvent::Deposit {
            asset: AssetId::NATIVE,
            user: caller,
            amount,
            balance,
        });
        Ok(balance)
    }

    /// Withdraw native custody back to the caller. Returns the new balance.
    ///
    /// # Errors
    /// - `InsufficientBalance` if the caller holds less than `amount`
    /// - `TransferFailed` if the payout fails; nothing is debited
    pub fn withdraw_native(&mut self, caller: Address, amount: Amount) -> Result<Amount> {
        let balance = self.ledger.withdraw_native(
            self.native.as_mut(),
            self.config.address,
            caller,
            amount,
        )?;
        self.emit(ExchangeEvent::Withdrawal {
            asset: AssetId::NATIVE,
            user: caller,
            amount,
            balance,
        });
        Ok(balance)
    }

    /// Pull `amount` of a registered asset from the caller. The caller must
    /// have approved this exchange's address beforehand.
    ///
    /// # Errors
    /// - `InvalidAsset` for the native sentinel
    /// - `UnknownAsset` if the asset is not registered
    /// - `InsufficientAllowance` / `TransferFailed` from the collaborator
    pub fn deposit_asset(
        &mut self,
        caller: Address,
        asset: AssetId,
        amount: Amount,
    ) -> Result<Amount> {
        let token = fungible(&mut self.assets, asset)?;
        let balance = self
            .ledger
            .deposit_asset(token, self.config.address, caller, amount)?;
        self.emit(ExchangeEvent::Deposit {
            asset,
            user: caller,
            amount,
            balance,
        });
        Ok(balance)
    }

    /// Return `amount` of a registered asset to the caller.
    ///
    /// # Errors
    /// - `InvalidAsset` for the native sentinel
    /// - `UnknownAsset` if the asset is not registered
    /// - `InsufficientBalance` if the caller holds less than `amount`
    /// - `TransferFailed` if the collaborator refuses; nothing is debited
    pub fn withdraw_asset(
        &mut self,
        caller: Address,
        asset: AssetId,
        amount: Amount,
    ) -> Result<Amount> {
        let token = fungible(&mut self.assets, asset)?;
        let balance = self
            .ledger
            .withdraw_asset(token, self.config.address, caller, amount)?;
        self.emit(ExchangeEvent::Withdrawal {
            asset,
            user: caller,
            amount,
            balance,
        });
        Ok(balance)
    }

    /// Fallback for native value sent without a deposit call. Always refused.
    ///
    /// # Errors
    /// Always `DirectValueRejected`.
    pub fn receive_direct_value(&self, caller: Address, amount: Amount) -> Result<()> {
        warn!(from = %caller, amount, "Direct native value rejected");
        Err(SwapdeskError::DirectValueRejected {
            from: caller,
            amount,
        })
    }

    // =================================================================
    // Orders
    // =================================================================

    /// Post an order offering `amount_given` of `asset_given` for
    /// `amount_wanted` of `asset_wanted`. The caller's custody is not
    /// checked until the order is filled.
    ///
    /// # Errors
    /// Returns `InvalidOrder` if either amount is zero.
    pub fn make_order(
        &mut self,
        caller: Address,
        asset_wanted: AssetId,
        amount_wanted: Amount,
        asset_given: AssetId,
        amount_given: Amount,
    ) -> Result<OrderId> {
        let terms = OrderTerms::new(asset_wanted, amount_wanted, asset_given, amount_given);
        let order = self.book.make_order(caller, terms, Utc::now())?;
        let id = order.id;
        let event = ExchangeEvent::order_placed(order);
        self.emit(event);
        Ok(id)
    }

    /// Cancel one of the caller's open orders.
    ///
    /// # Errors
    /// `NotFound`, `Unauthorized` or `AlreadyResolved`, in that order.
    pub fn cancel_order(&mut self, caller: Address, id: OrderId) -> Result<()> {
        let order = self.book.cancel_order(caller, id)?;
        let event = ExchangeEvent::cancel(order, Utc::now());
        self.emit(event);
        Ok(())
    }

    /// Fill an open order with the caller's custody. The caller pays the
    /// order's wanted amount plus the fee, and receives its given amount.
    ///
    /// # Errors
    /// - `NotFound` if the id was never assigned
    /// - `AlreadyResolved` if the order is filled or cancelled
    /// - `InsufficientBalance` if either side cannot settle; no balance moves
    pub fn fill_order(&mut self, caller: Address, id: OrderId) -> Result<Fill> {
        let fill = self.book.fill_order(
            &mut self.ledger,
            caller,
            id,
            self.config.fee_account,
            self.config.fee_percent,
        )?;
        self.emit(ExchangeEvent::trade(&fill.order, caller, Utc::now()));
        Ok(fill)
    }

    fn emit(&mut self, event: ExchangeEvent) {
        self.events.append(event, Utc::now());
    }

    // =================================================================
    // Reads
    // =================================================================

    #[must_use]
    pub fn balance_of(&self, asset: AssetId, user: Address) -> Amount {
        self.ledger.balance_of(asset, user)
    }

    #[must_use]
    pub fn order_count(&self) -> u64 {
        self.book.order_count()
    }

    #[must_use]
    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.book.get(id)
    }

    #[must_use]
    pub fn orders_filled(&self, id: OrderId) -> bool {
        self.book.is_filled(id)
    }

    #[must_use]
    pub fn orders_cancelled(&self, id: OrderId) -> bool {
        self.book.is_cancelled(id)
    }

    /// Orders still available to fill, in id order.
    pub fn open_orders(&self) -> impl Iterator<Item = &Order> {
        self.book.open_orders()
    }

    #[must_use]
    pub fn fee_account(&self) -> Address {
        self.config.fee_account
    }

    #[must_use]
    pub fn fee_percent(&self) -> u32 {
        self.config.fee_percent
    }

    /// The exchange's own custody identity.
    #[must_use]
    pub fn address(&self) -> Address {
        self.config.address
    }

    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    #[must_use]
    pub fn assets(&self) -> &AssetRegistry {
        &self.assets
    }

    /// Collaborators are external systems; callers reach them here to
    /// approve or transfer on their own behalf.
    pub fn assets_mut(&mut self) -> &mut AssetRegistry {
        &mut self.assets
    }

    #[must_use]
    pub fn native_bank(&self) -> &dyn NativeBank {
        self.native.as_ref()
    }

    /// Check that the ledger adds up for `asset` and that the collaborator
    /// actually holds at least what the ledger says is in custody.
    ///
    /// # Errors
    /// - `SupplyInvariantViolation` if either check fails
    /// - `UnknownAsset` for an unregistered fungible asset
    pub fn verify_custody(&self, asset: AssetId) -> Result<()> {
        self.ledger.verify_supply(asset)?;
        let custody = self.ledger.total_supply(asset);
        let held = if asset.is_native() {
            self.native.balance_of(self.config.address)
        } else {
            self.assets.get(asset)?.balance_of(self.config.address)
        };
        if held < custody {
            warn!(asset = %asset, held, custody, "Custody shortfall");
            return Err(SwapdeskError::SupplyInvariantViolation {
                reason: format!("asset {asset}: collaborator holds {held}, ledger owes {custody}"),
            });
        }
        Ok(())
    }

    /// Run [`verify_custody`](Self::verify_custody) for every asset that has
    /// ever been deposited or withdrawn.
    ///
    /// # Errors
    /// The first failing asset's error.
    pub fn verify_all_custody(&self) -> Result<()> {
        for asset in self.ledger.tracked_assets() {
            self.verify_custody(asset)?;
        }
        Ok(())
    }
}

/// Resolve a fungible collaborator, refusing the native sentinel up front.
fn fungible(assets: &mut AssetRegistry, asset: AssetId) -> Result<&mut dyn FungibleAsset> {
    if asset.is_native() {
        return Err(SwapdeskError::InvalidAsset(asset));
    }
    assets.get_mut(asset)
}
