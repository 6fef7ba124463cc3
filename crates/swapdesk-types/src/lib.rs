//! # swapdesk-types
//!
//! Shared types, errors, and configuration for the **SwapDesk** exchange.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Address`], [`AssetId`], [`OrderId`]
//! - **Amounts**: [`Amount`] plus decimal conversion in [`units`]
//! - **Order model**: [`Order`], [`OrderTerms`], [`OrderState`]
//! - **Event model**: [`ExchangeEvent`], [`EventRecord`]
//! - **Configuration**: [`ExchangeConfig`]
//! - **Errors**: [`SwapdeskError`] with `SD_ERR_` prefix codes
//! - **Constants**: fee defaults and token defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod order;
pub mod units;

// Re-export all primary types at crate root for ergonomic imports:
//   use swapdesk_types::{Address, AssetId, Order, ExchangeEvent, ...};

pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use order::*;
pub use units::Amount;

// Constants are accessed via `swapdesk_types::constants::FOO`
// (not re-exported to avoid name collisions).
