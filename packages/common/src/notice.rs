//! Cross-chain notices relayed from root to child.
//!
//! # Byte Layout
//! Outer envelope: `abi.encode(bytes32 syncType, bytes syncData)` where
//! `syncType` is `keccak256("DEPOSIT")` or `keccak256("MAP_TOKEN")`.
//!
//! - DEPOSIT:   `syncData = abi.encode(address receiver, address rootToken, bytes depositData)`
//! - MAP_TOKEN: `syncData = abi.encode(address rootToken, address childToken, bytes32 tokenType)`

use alloy_primitives::{Address, Bytes, B256};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};

use crate::asset::AssetTypeTag;
use crate::error::CodecError;
use crate::hash::keccak256;

/// Sync type of a deposit notice
pub fn deposit_sync_type() -> B256 {
    B256::from(keccak256(b"DEPOSIT"))
}

/// Sync type of a token mapping notice
pub fn map_token_sync_type() -> B256 {
    B256::from(keccak256(b"MAP_TOKEN"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositNotice {
    pub receiver: Address,
    pub root_token: Address,
    pub payload: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapTokenNotice {
    pub root_token: Address,
    pub child_token: Address,
    pub token_type: AssetTypeTag,
}

/// Message carried by the root → child transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    Deposit(DepositNotice),
    MapToken(MapTokenNotice),
}

impl Notice {
    pub fn sync_type(&self) -> B256 {
        match self {
            Notice::Deposit(_) => deposit_sync_type(),
            Notice::MapToken(_) => map_token_sync_type(),
        }
    }

    pub fn encode(&self) -> Bytes {
        let sync_data = match self {
            Notice::Deposit(notice) => {
                (notice.receiver, notice.root_token, notice.payload.clone()).abi_encode_params()
            }
            Notice::MapToken(notice) => {
                (notice.root_token, notice.child_token, notice.token_type.id()).abi_encode_params()
            }
        };
        Bytes::from((self.sync_type(), Bytes::from(sync_data)).abi_encode_params())
    }

    pub fn decode(raw: &[u8]) -> Result<Self, CodecError> {
        let (sync_type, sync_data) = <(B256, Bytes)>::abi_decode_params(raw, true)?;

        if sync_type == deposit_sync_type() {
            let (receiver, root_token, payload) =
                <(Address, Address, Bytes)>::abi_decode_params(&sync_data, true)?;
            Ok(Notice::Deposit(DepositNotice {
                receiver,
                root_token,
                payload,
            }))
        } else if sync_type == map_token_sync_type() {
            let (root_token, child_token, type_id) =
                <(Address, Address, B256)>::abi_decode_params(&sync_data, true)?;
            let token_type = AssetTypeTag::from_id(&type_id)
                .ok_or(CodecError::UnknownAssetType { id: type_id })?;
            Ok(Notice::MapToken(MapTokenNotice {
                root_token,
                child_token,
                token_type,
            }))
        } else {
            Err(CodecError::UnsupportedNoticeType { sync_type })
        }
    }
}
