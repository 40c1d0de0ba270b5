//! Root-side asset ledger
//!
//! Stands in for the token contracts living on the root chain. Predicates
//! take and release custody exclusively through the operations here, so a
//! predicate's balance in this ledger is its custody record.

mod fungible;
mod multi_token;
mod non_fungible;

use std::collections::HashMap;

use alloy_primitives::{Address, U256};

pub use fungible::FungibleToken;
pub use multi_token::MultiToken;
pub use non_fungible::NonFungibleToken;
pub(crate) use non_fungible::check_unique;

use crate::error::AssetError;

#[derive(Debug, Clone)]
pub enum RootAsset {
    Fungible(FungibleToken),
    NonFungible(NonFungibleToken),
    MultiToken(MultiToken),
}

/// Native currency balances
#[derive(Debug, Clone, Default)]
pub struct NativeBalances {
    balances: HashMap<Address, U256>,
}

impl NativeBalances {
    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    /// Credit `account` out of thin air (genesis allocation)
    pub fn credit(&mut self, account: Address, amount: U256) -> Result<(), AssetError> {
        let balance = self
            .balance_of(account)
            .checked_add(amount)
            .ok_or(AssetError::Overflow)?;
        self.balances.insert(account, balance);
        Ok(())
    }

    pub fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<(), AssetError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(AssetError::InsufficientBalance {
                account: from,
                needed: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(AssetError::Overflow)?;
        self.balances.insert(from, available - amount);
        self.balances.insert(to, credited);
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RootLedger {
    assets: HashMap<Address, RootAsset>,
    native: NativeBalances,
}

impl RootLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deploy `asset` at `address`, replacing nothing.
    pub fn deploy(&mut self, address: Address, asset: RootAsset) -> Result<(), AssetError> {
        if address.is_zero() {
            return Err(AssetError::ZeroAddress);
        }
        if self.assets.contains_key(&address) {
            return Err(AssetError::AlreadyDeployed { asset: address });
        }
        self.assets.insert(address, asset);
        Ok(())
    }

    pub fn asset(&self, address: Address) -> Option<&RootAsset> {
        self.assets.get(&address)
    }

    fn asset_mut(&mut self, address: Address) -> Result<&mut RootAsset, AssetError> {
        self.assets
            .get_mut(&address)
            .ok_or(AssetError::UnknownAsset { asset: address })
    }

    pub fn fungible(&self, address: Address) -> Result<&FungibleToken, AssetError> {
        match self.assets.get(&address) {
            Some(RootAsset::Fungible(token)) => Ok(token),
            Some(_) => Err(AssetError::WrongAssetKind {
                asset: address,
                expected: "fungible",
            }),
            None => Err(AssetError::UnknownAsset { asset: address }),
        }
    }

    pub fn fungible_mut(&mut self, address: Address) -> Result<&mut FungibleToken, AssetError> {
        match self.asset_mut(address)? {
            RootAsset::Fungible(token) => Ok(token),
            _ => Err(AssetError::WrongAssetKind {
                asset: address,
                expected: "fungible",
            }),
        }
    }

    pub fn non_fungible(&self, address: Address) -> Result<&NonFungibleToken, AssetError> {
        match self.assets.get(&address) {
            Some(RootAsset::NonFungible(token)) => Ok(token),
            Some(_) => Err(AssetError::WrongAssetKind {
                asset: address,
                expected: "non-fungible",
            }),
            None => Err(AssetError::UnknownAsset { asset: address }),
        }
    }

    pub fn non_fungible_mut(&mut self, address: Address) -> Result<&mut NonFungibleToken, AssetError> {
        match self.asset_mut(address)? {
            RootAsset::NonFungible(token) => Ok(token),
            _ => Err(AssetError::WrongAssetKind {
                asset: address,
                expected: "non-fungible",
            }),
        }
    }

    pub fn multi_token(&self, address: Address) -> Result<&MultiToken, AssetError> {
        match self.assets.get(&address) {
            Some(RootAsset::MultiToken(token)) => Ok(token),
            Some(_) => Err(AssetError::WrongAssetKind {
                asset: address,
                expected: "multi-token",
            }),
            None => Err(AssetError::UnknownAsset { asset: address }),
        }
    }

    pub fn multi_token_mut(&mut self, address: Address) -> Result<&mut MultiToken, AssetError> {
        match self.asset_mut(address)? {
            RootAsset::MultiToken(token) => Ok(token),
            _ => Err(AssetError::WrongAssetKind {
                asset: address,
                expected: "multi-token",
            }),
        }
    }

    pub fn native(&self) -> &NativeBalances {
        &self.native
    }

    pub fn native_mut(&mut self) -> &mut NativeBalances {
        &mut self.native
    }
}
