//! Event records for the SwapDesk audit trail.
//!
//! Every successful state-mutating operation produces exactly one
//! [`ExchangeEvent`]. The exchange wraps it in an [`EventRecord`] that is
//! hash-chained to its predecessor, so external observers can detect a
//! rewritten or reordered log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Address, Amount, AssetId, Order, OrderId, OrderTerms};

/// A completed state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeEvent {
    /// Value moved into custody. `balance` is the user's balance afterwards.
    Deposit {
        asset: AssetId,
        user: Address,
        amount: Amount,
        balance: Amount,
    },
    /// Value moved out of custody. `balance` is the user's balance afterwards.
    Withdrawal {
        asset: AssetId,
        user: Address,
        amount: Amount,
        balance: Amount,
    },
    /// An order was posted.
    Order {
        id: OrderId,
        owner: Address,
        terms: OrderTerms,
        timestamp: DateTime<Utc>,
    },
    /// An order was filled by `filler`.
    Trade {
        id: OrderId,
        owner: Address,
        terms: OrderTerms,
        filler: Address,
        timestamp: DateTime<Utc>,
    },
    /// An order was cancelled by its owner.
    Cancel {
        id: OrderId,
        owner: Address,
        terms: OrderTerms,
        timestamp: DateTime<Utc>,
    },
}

impl ExchangeEvent {
    #[must_use]
    pub fn order_placed(order: &Order) -> Self {
        Self::Order {
            id: order.id,
            owner: order.owner,
            terms: order.terms,
            timestamp: order.created_at,
        }
    }

    #[must_use]
    pub fn trade(order: &Order, filler: Address, timestamp: DateTime<Utc>) -> Self {
        Self::Trade {
            id: order.id,
            owner: order.owner,
            terms: order.terms,
            filler,
            timestamp,
        }
    }

    #[must_use]
    pub fn cancel(order: &Order, timestamp: DateTime<Utc>) -> Self {
        Self::Cancel {
            id: order.id,
            owner: order.owner,
            terms: order.terms,
            timestamp,
        }
    }

    /// Event name as published to observers.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Deposit { .. } => "Deposit",
            Self::Withdrawal { .. } => "Withdrawal",
            Self::Order { .. } => "Order",
            Self::Trade { .. } => "Trade",
            Self::Cancel { .. } => "Cancel",
        }
    }
}

/// One entry of the append-only event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the log, starting at 0.
    pub sequence: u64,
    /// When the record was appended.
    pub recorded_at: DateTime<Utc>,
    pub event: ExchangeEvent,
    /// Hash of the previous record (all zeros for the first).
    pub prev_hash: [u8; 32],
    /// SHA-256 over `prev_hash || sequence || event fields`.
    pub hash: [u8; 32],
}

impl EventRecord {
    /// Build a record chained to `prev_hash`.
    #[must_use]
    pub fn chained(
        sequence: u64,
        prev_hash: [u8; 32],
        event: ExchangeEvent,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        let hash = Self::compute_hash(sequence, &prev_hash, &event);
        Self {
            sequence,
            recorded_at,
            event,
            prev_hash,
            hash,
        }
    }

    /// Canonical digest for a record. Every field is fed to the hasher in a
    /// fixed order, prefixed by the event tag.
    #[must_use]
    pub fn compute_hash(sequence: u64, prev_hash: &[u8; 32], event: &ExchangeEvent) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(b"swapdesk:event:v1:");
        hasher.update(prev_hash);
        hasher.update(sequence.to_le_bytes());
        hasher.update(event.name().as_bytes());
        match event {
            ExchangeEvent::Deposit {
                asset,
                user,
                amount,
                balance,
            }
            | ExchangeEvent::Withdrawal {
                asset,
                user,
                amount,
                balance,
            } => {
                hasher.update(asset.address().as_bytes());
                hasher.update(user.as_bytes());
                hasher.update(amount.to_le_bytes());
                hasher.update(balance.to_le_bytes());
            }
            ExchangeEvent::Order {
                id,
                owner,
                terms,
                timestamp,
            }
            | ExchangeEvent::Cancel {
                id,
                owner,
                terms,
                timestamp,
            } => {
                hash_order(&mut hasher, *id, *owner, terms);
                hasher.update(timestamp.to_rfc3339().as_bytes());
            }
            ExchangeEvent::Trade {
                id,
                owner,
                terms,
                filler,
                timestamp,
            } => {
                hash_order(&mut hasher, *id, *owner, terms);
                hasher.update(filler.as_bytes());
                hasher.update(timestamp.to_rfc3339().as_bytes());
            }
        }
        hasher.finalize().into()
    }

    /// Recompute this record's digest and compare.
    #[must_use]
    pub fn is_intact(&self) -> bool {
        Self::compute_hash(self.sequence, &self.prev_hash, &self.event) == self.hash
    }

    #[must_use]
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }
}

fn hash_order(hasher: &mut Sha256, id: OrderId, owner: Address, terms: &OrderTerms) {
    hasher.update(id.0.to_le_bytes());
    hasher.update(owner.as_bytes());
    hasher.update(terms.asset_wanted.address().as_bytes());
    hasher.update(terms.amount_wanted.to_le_bytes());
    hasher.update(terms.asset_given.address().as_bytes());
    hasher.update(terms.amount_given.to_le_bytes());
}
