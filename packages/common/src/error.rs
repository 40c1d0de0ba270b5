//! Codec errors for notices and deposit payloads.

use alloy_primitives::B256;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("ABI decoding failed: {0}")]
    Abi(String),

    #[error("Unsupported notice type: {sync_type}")]
    UnsupportedNoticeType { sync_type: B256 },

    #[error("Unknown asset type id: {id}")]
    UnknownAssetType { id: B256 },

    #[error("Invalid deposit payload: {reason}")]
    InvalidPayload { reason: String },
}

impl From<alloy_sol_types::Error> for CodecError {
    fn from(err: alloy_sol_types::Error) -> Self {
        CodecError::Abi(err.to_string())
    }
}
