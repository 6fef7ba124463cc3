//! # swapdesk-exchange
//!
//! The public face of SwapDesk. Every operation takes the already
//! authenticated caller as its first argument and either completes fully,
//! appending one [`EventRecord`](swapdesk_types::EventRecord), or fails with
//! no observable effect.
//!
//! ```text
//!   caller ──▶ Exchange ──validate──▶ Ledger      (deposit / withdraw)
//!                  │                    ▲
//!                  └──────────────▶ OrderBook     (make / cancel / fill)
//!                  │
//!                  └──append──▶ EventLog
//! ```

pub mod event_log;
pub mod exchange;

pub use event_log::{EventLog, GENESIS_HASH, verify_records};
pub use exchange::Exchange;
