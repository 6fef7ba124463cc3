//! Configuration for an exchange instance.
//!
//! Fixed at construction; nothing here can change while the exchange runs.

use serde::{Deserialize, Serialize};

use crate::{Address, Result, SwapdeskError, constants};

/// Construction-time configuration of an exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// The exchange's own custody identity at the asset collaborators.
    pub address: Address,
    /// Account credited with every fill fee.
    pub fee_account: Address,
    /// Whole-percent fee charged to the filler, on top of the order price.
    #[serde(default = "default_fee_percent")]
    pub fee_percent: u32,
}

fn default_fee_percent() -> u32 {
    constants::DEFAULT_FEE_PERCENT
}

impl ExchangeConfig {
    #[must_use]
    pub fn new(address: Address, fee_account: Address, fee_percent: u32) -> Self {
        Self {
            address,
            fee_account,
            fee_percent,
        }
    }

    /// Parse and validate a JSON config document.
    ///
    /// # Errors
    /// `Serialization` for malformed JSON, `Configuration` for bad values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    /// Returns `Configuration` if the fee exceeds 100% or an address is zero.
    pub fn validate(&self) -> Result<()> {
        if self.fee_percent > constants::MAX_FEE_PERCENT {
            return Err(SwapdeskError::Configuration(format!(
                "fee_percent {} exceeds {}",
                self.fee_percent,
                constants::MAX_FEE_PERCENT
            )));
        }
        if self.fee_account.is_zero() {
            return Err(SwapdeskError::Configuration(
                "fee_account must not be the zero address".to_string(),
            ));
        }
        if self.address.is_zero() {
            return Err(SwapdeskError::Configuration(
                "exchange address must not be the zero address".to_string(),
            ));
        }
        Ok(())
    }
}
