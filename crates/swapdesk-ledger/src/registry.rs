//! Registry of fungible-asset collaborators, keyed by their [`AssetId`].

use std::collections::BTreeMap;
use std::fmt;

use swapdesk_types::{AssetId, Result, SwapdeskError};
use tracing::info;

use crate::collaborator::FungibleAsset;

/// Every fungible asset the exchange can take custody of.
#[derive(Default)]
pub struct AssetRegistry {
    assets: BTreeMap<AssetId, Box<dyn FungibleAsset>>,
}

impl fmt::Debug for AssetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetRegistry")
            .field("assets", &self.assets.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl AssetRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collaborator. Its address becomes its asset id.
    ///
    /// # Errors
    /// - `InvalidAsset` if the collaborator sits at the native sentinel
    /// - `DuplicateAsset` if an asset with that id is already registered
    pub fn register(&mut self, asset: Box<dyn FungibleAsset>) -> Result<AssetId> {
        let id = AssetId::token(asset.address());
        if id.is_native() {
            return Err(SwapdeskError::InvalidAsset(id));
        }
        if self.assets.contains_key(&id) {
            return Err(SwapdeskError::DuplicateAsset(id));
        }
        self.assets.insert(id, asset);
        info!(asset = %id, "Asset registered");
        Ok(id)
    }

    /// # Errors
    /// Returns `UnknownAsset` if `id` was never registered.
    pub fn get(&self, id: AssetId) -> Result<&dyn FungibleAsset> {
        match self.assets.get(&id) {
            Some(asset) => Ok(&**asset),
            None => Err(SwapdeskError::UnknownAsset(id)),
        }
    }

    /// # Errors
    /// Returns `UnknownAsset` if `id` was never registered.
    pub fn get_mut(&mut self, id: AssetId) -> Result<&mut dyn FungibleAsset> {
        match self.assets.get_mut(&id) {
            Some(asset) => Ok(&mut **asset),
            None => Err(SwapdeskError::UnknownAsset(id)),
        }
    }

    #[must_use]
    pub fn contains(&self, id: AssetId) -> bool {
        self.assets.contains_key(&id)
    }

    /// Registered ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<AssetId> {
        self.assets.keys().copied().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
