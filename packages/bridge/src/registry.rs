//! Asset-type and predicate registries
//!
//! Two maps: root asset → asset class (write-once) and asset class →
//! predicate (one per class). Mutation is gated by the owning manager; reads
//! are open. A missing entry always fails the lookup and never defaults.

use std::collections::HashMap;

use alloy_primitives::Address;
use common::AssetTypeTag;

use crate::error::BridgeError;
use crate::predicate::{Predicate, TokenPredicate};

#[derive(Debug, Clone, Default)]
pub struct PredicateRegistry {
    asset_types: HashMap<Address, AssetTypeTag>,
    predicates: HashMap<AssetTypeTag, Predicate>,
}

impl PredicateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the class of `asset`. Re-registering the same class is a no-op;
    /// changing it is refused.
    pub fn register_asset_type(&mut self, asset: Address, tag: AssetTypeTag) -> Result<(), BridgeError> {
        match self.asset_types.get(&asset) {
            Some(registered) if *registered == tag => Ok(()),
            Some(registered) => Err(BridgeError::AssetTypeAlreadyRegistered {
                asset,
                registered: *registered,
            }),
            None => {
                self.asset_types.insert(asset, tag);
                Ok(())
            }
        }
    }

    /// Install `predicate` for `tag`, returning the predicate it replaces.
    pub fn register_predicate(
        &mut self,
        tag: AssetTypeTag,
        predicate: Predicate,
    ) -> Result<Option<Predicate>, BridgeError> {
        if predicate.asset_type() != tag {
            return Err(BridgeError::PredicateTypeMismatch {
                tag,
                predicate: predicate.asset_type(),
            });
        }
        Ok(self.predicates.insert(tag, predicate))
    }

    pub fn asset_type_for(&self, asset: Address) -> Result<AssetTypeTag, BridgeError> {
        self.asset_types
            .get(&asset)
            .copied()
            .ok_or(BridgeError::UnregisteredAsset { asset })
    }

    pub fn predicate_for_type(&self, tag: AssetTypeTag) -> Option<&Predicate> {
        self.predicates.get(&tag)
    }

    /// The predicate responsible for `asset`, via its registered class
    pub fn predicate_for(&self, asset: Address) -> Result<&Predicate, BridgeError> {
        let tag = self.asset_type_for(asset)?;
        self.predicate_for_type(tag)
            .ok_or(BridgeError::UnregisteredAsset { asset })
    }
}
