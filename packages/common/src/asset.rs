//! Asset classes handled by the bridge.
//!
//! Every root asset is registered under exactly one `AssetTypeTag`. The tag
//! travels across chains as `keccak256(wire_name)`, the same identifier the
//! root side uses when it emits a mapping notice.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use crate::hash::keccak256;

/// Pseudo-address standing in for the root ledger's native currency.
pub const NATIVE_CURRENCY: Address = Address::new([0xee; 20]);

/// Asset class of a root asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetTypeTag {
    /// Divisible balance token (ERC20-like)
    Fungible,
    /// Unique-id token locked on root (ERC721-like)
    NonFungible,
    /// Unique-id token that may originate on child and be minted on root at exit
    MintableNonFungible,
    /// Id-indexed balances (ERC1155-like)
    MultiToken,
    /// The root ledger's native currency
    NativeCurrency,
}

impl AssetTypeTag {
    pub const ALL: [AssetTypeTag; 5] = [
        AssetTypeTag::Fungible,
        AssetTypeTag::NonFungible,
        AssetTypeTag::MintableNonFungible,
        AssetTypeTag::MultiToken,
        AssetTypeTag::NativeCurrency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetTypeTag::Fungible => "fungible",
            AssetTypeTag::NonFungible => "non_fungible",
            AssetTypeTag::MintableNonFungible => "mintable_non_fungible",
            AssetTypeTag::MultiToken => "multi_token",
            AssetTypeTag::NativeCurrency => "native_currency",
        }
    }

    /// Name hashed into the on-wire identifier.
    pub fn wire_name(&self) -> &'static str {
        match self {
            AssetTypeTag::Fungible => "ERC20",
            AssetTypeTag::NonFungible => "ERC721",
            AssetTypeTag::MintableNonFungible => "MintableERC721",
            AssetTypeTag::MultiToken => "ERC1155",
            AssetTypeTag::NativeCurrency => "Ether",
        }
    }

    /// On-wire identifier: `keccak256(wire_name)`
    pub fn id(&self) -> B256 {
        B256::from(keccak256(self.wire_name().as_bytes()))
    }

    /// Resolve an on-wire identifier back to its tag
    pub fn from_id(id: &B256) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.id() == *id)
    }
}

impl fmt::Display for AssetTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AssetTypeTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str() == normalized || tag.wire_name().to_ascii_lowercase() == normalized)
            .ok_or_else(|| format!("unknown asset type: {s}"))
    }
}
