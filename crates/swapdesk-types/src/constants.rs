//! System-wide constants for the SwapDesk exchange.

/// Fee percentage charged to the filler when none is configured.
pub const DEFAULT_FEE_PERCENT: u32 = 10;

/// Fees are expressed as whole percent of the filler's payment.
pub const PERCENT_DENOMINATOR: u128 = 100;

/// Upper bound on a configured fee percentage.
pub const MAX_FEE_PERCENT: u32 = 100;

/// Name of the reference fungible asset.
pub const DEFAULT_TOKEN_NAME: &str = "OSD Token";

/// Symbol of the reference fungible asset.
pub const DEFAULT_TOKEN_SYMBOL: &str = "OSD";

/// Decimals of the reference fungible asset (and of the native currency).
pub const DEFAULT_DECIMALS: u32 = 18;

/// Supply of the reference fungible asset, in whole tokens.
pub const DEFAULT_TOKEN_SUPPLY_WHOLE: u128 = 1_000_000;
