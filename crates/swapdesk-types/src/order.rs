//! Order types for the SwapDesk order book.
//!
//! An order is a standing offer by its owner to give `amount_given` of
//! `asset_given` in exchange for `amount_wanted` of `asset_wanted`.
//!
//! ## State Machine
//!
//! ```text
//!   ┌──────┐   fill    ┌────────┐
//!   │ OPEN ├──────────▶│ FILLED │
//!   └──┬───┘           └────────┘
//!      │ cancel (owner only)
//!      ▼
//!   ┌───────────┐
//!   │ CANCELLED │
//!   └───────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, Amount, AssetId, OrderId, Result, SwapdeskError};

/// Resolution state of an order.
///
/// Transitions are **monotonic**: the only legal moves are
/// `Open → Filled` and `Open → Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderState {
    Open,
    Filled,
    Cancelled,
}

impl OrderState {
    /// Can an order in this state move to `target`?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!((self, target), (Self::Open, Self::Filled | Self::Cancelled))
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        *self == Self::Open
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Filled => write!(f, "FILLED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// The swap an order offers. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTerms {
    pub asset_wanted: AssetId,
    pub amount_wanted: Amount,
    pub asset_given: AssetId,
    pub amount_given: Amount,
}

impl OrderTerms {
    #[must_use]
    pub fn new(
        asset_wanted: AssetId,
        amount_wanted: Amount,
        asset_given: AssetId,
        amount_given: Amount,
    ) -> Self {
        Self {
            asset_wanted,
            amount_wanted,
            asset_given,
            amount_given,
        }
    }

    /// Both amounts must be positive.
    ///
    /// # Errors
    /// Returns `InvalidOrder` naming the offending side.
    pub fn validate(&self) -> Result<()> {
        if self.amount_wanted == 0 {
            return Err(SwapdeskError::InvalidOrder {
                reason: "amount wanted must be positive".to_string(),
            });
        }
        if self.amount_given == 0 {
            return Err(SwapdeskError::InvalidOrder {
                reason: "amount given must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// A stored order. Only `state` ever changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub owner: Address,
    pub terms: OrderTerms,
    pub created_at: DateTime<Utc>,
    state: OrderState,
}

impl Order {
    #[must_use]
    pub fn new(id: OrderId, owner: Address, terms: OrderTerms, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            owner,
            terms,
            created_at,
            state: OrderState::Open,
        }
    }

    #[must_use]
    pub fn state(&self) -> OrderState {
        self.state
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.state == OrderState::Filled
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state == OrderState::Cancelled
    }

    /// Move to FILLED.
    ///
    /// # Errors
    /// Returns `AlreadyResolved` unless the order is OPEN.
    pub fn mark_filled(&mut self) -> Result<()> {
        self.transition(OrderState::Filled)
    }

    /// Move to CANCELLED.
    ///
    /// # Errors
    /// Returns `AlreadyResolved` unless the order is OPEN.
    pub fn mark_cancelled(&mut self) -> Result<()> {
        self.transition(OrderState::Cancelled)
    }

    fn transition(&mut self, target: OrderState) -> Result<()> {
        if !self.state.can_transition_to(target) {
            return Err(SwapdeskError::AlreadyResolved(self.id));
        }
        self.state = target;
        Ok(())
    }
}
