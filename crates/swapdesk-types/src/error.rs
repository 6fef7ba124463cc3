//! Error types for the SwapDesk exchange.
//!
//! All errors use the `SD_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Asset errors
//! - 2xx: Balance errors
//! - 3xx: Collaborator (asset / native custody) errors
//! - 4xx: Order errors
//! - 5xx: Custody errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{Address, Amount, AssetId, OrderId};

/// Central error enum for all SwapDesk operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SwapdeskError {
    // =================================================================
    // Asset Errors (1xx)
    // =================================================================
    /// The native sentinel was used where a fungible asset is required.
    #[error("SD_ERR_100: Invalid asset: {0} cannot be used here")]
    InvalidAsset(AssetId),

    /// An asset with this id is already registered.
    #[error("SD_ERR_101: Asset already registered: {0}")]
    DuplicateAsset(AssetId),

    /// No collaborator is registered under this id.
    #[error("SD_ERR_102: Unknown asset: {0}")]
    UnknownAsset(AssetId),

    // =================================================================
    // Balance Errors (2xx)
    // =================================================================
    /// A debit exceeds the available custody.
    #[error("SD_ERR_200: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Amount, available: Amount },

    /// A credit or fee computation would overflow the amount type.
    #[error("SD_ERR_201: Balance overflow")]
    BalanceOverflow,

    /// An amount is zero where a positive value is required, negative, or
    /// too precise for the asset.
    #[error("SD_ERR_202: Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    // =================================================================
    // Collaborator Errors (3xx)
    // =================================================================
    /// The caller has not approved the exchange for enough of the asset.
    #[error("SD_ERR_300: Insufficient allowance: need {needed}, allowed {allowed}")]
    InsufficientAllowance { needed: Amount, allowed: Amount },

    /// The external collaborator reported that a transfer did not happen.
    #[error("SD_ERR_301: Transfer failed: {reason}")]
    TransferFailed { reason: String },

    // =================================================================
    // Order Errors (4xx)
    // =================================================================
    /// The order id was never created.
    #[error("SD_ERR_400: Order not found: {0}")]
    NotFound(OrderId),

    /// Only the order's owner may cancel it.
    #[error("SD_ERR_401: Unauthorized: {caller} does not own {order}")]
    Unauthorized { caller: Address, order: OrderId },

    /// The order is already filled or cancelled.
    #[error("SD_ERR_402: Order already resolved: {0}")]
    AlreadyResolved(OrderId),

    /// The order terms failed validation.
    #[error("SD_ERR_403: Invalid order: {reason}")]
    InvalidOrder { reason: String },

    // =================================================================
    // Custody Errors (5xx)
    // =================================================================
    /// Native value sent outside of a deposit call.
    #[error("SD_ERR_500: Direct value transfer rejected: {amount} from {from}")]
    DirectValueRejected { from: Address, amount: Amount },

    /// Ledger custody does not add up — critical safety alert.
    #[error("SD_ERR_501: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Configuration error (invalid config file, bad fields, etc.).
    #[error("SD_ERR_900: Configuration error: {0}")]
    Configuration(String),

    /// Serialization / deserialization error.
    #[error("SD_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Unrecoverable internal error.
    #[error("SD_ERR_902: Internal error: {0}")]
    Internal(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, SwapdeskError>;

impl From<serde_json::Error> for SwapdeskError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
