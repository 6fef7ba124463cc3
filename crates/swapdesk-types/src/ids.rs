//! Identifiers used throughout SwapDesk.
//!
//! Users, asset collaborators, the fee collector and the exchange itself are
//! all identified by a 20-byte [`Address`]. Orders use a sequential
//! [`OrderId`] assigned by the order book.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SwapdeskError;

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte account identity. Serialized as `0x`-prefixed hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The all-zero address. Never a valid recipient.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Address holding `n` in its low eight bytes. Handy for fixtures and configs.
    #[must_use]
    pub fn from_low_u64(n: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&n.to_be_bytes());
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = SwapdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let raw = hex::decode(digits)
            .map_err(|e| SwapdeskError::Configuration(format!("bad address {s}: {e}")))?;
        let bytes: [u8; 20] = raw.try_into().map_err(|_| {
            SwapdeskError::Configuration(format!("bad address {s}: expected 20 bytes"))
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Random addresses for tests.
#[cfg(any(test, feature = "test-helpers"))]
impl Address {
    pub fn random() -> Self {
        Self(rand::random::<[u8; 20]>())
    }
}

// ---------------------------------------------------------------------------
// AssetId
// ---------------------------------------------------------------------------

/// Identifies what a balance is denominated in.
///
/// [`AssetId::NATIVE`] is the sentinel for the native currency; every other
/// value is the address of a registered fungible-asset collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AssetId(pub Address);

impl AssetId {
    pub const NATIVE: Self = Self(Address::ZERO);

    #[must_use]
    pub fn token(address: Address) -> Self {
        Self(address)
    }

    #[must_use]
    pub fn is_native(&self) -> bool {
        self.0.is_zero()
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_native() {
            write!(f, "NATIVE")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

// ---------------------------------------------------------------------------
// OrderId
// ---------------------------------------------------------------------------

/// Sequential order identifier. The first order is `OrderId(1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl OrderId {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
