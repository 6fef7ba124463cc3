//! # swapdesk-orderbook
//!
//! Orders that are posted, then explicitly filled or cancelled. There is no
//! matching: a filler picks an order by id and settles its full terms.
//!
//! ```text
//! make_order ──▶ OPEN ──fill_order──▶ FILLED
//!                  │
//!                  └────cancel_order──▶ CANCELLED
//! ```

pub mod book;
pub mod fee;

pub use book::{Fill, OrderBook};
pub use fee::compute_fee;
