//! # swapdesk-ledger
//!
//! Custody accounting for the SwapDesk exchange.
//!
//! - [`Ledger`]: per-(asset, user) balances with undo-log transactions
//! - [`FungibleAsset`] / [`NativeBank`]: seams to the systems holding value
//! - [`SupplyConservation`]: deposits minus withdrawals equals custody
//! - [`AssetRegistry`]: the fungible assets an exchange accepts
//! - [`InMemoryToken`] / [`InMemoryNativeBank`]: reference collaborators

pub mod collaborator;
pub mod ledger;
pub mod native;
pub mod registry;
pub mod supply;
pub mod token;

pub use collaborator::{FungibleAsset, NativeBank};
pub use ledger::{BalanceKey, Ledger, LedgerTx};
pub use native::InMemoryNativeBank;
pub use registry::AssetRegistry;
pub use supply::SupplyConservation;
pub use token::{InMemoryToken, TokenEvent};
