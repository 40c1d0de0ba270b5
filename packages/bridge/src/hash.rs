//! Hash computation module for exit verification
//!
//! This module provides the canonical hashes that bind a child-chain burn to
//! a root-chain checkpoint. Both proof producers and the root-side verifier
//! must compute them identically.
//!
//! # Block Leaf (128 bytes hashed)
//! `keccak256(abi.encodePacked(uint256 blockNumber, uint256 blockTimestamp,
//! bytes32 transactionsRoot, bytes32 receiptsRoot))`
//! - Bytes 0-31:    blockNumber (big-endian, left-padded)
//! - Bytes 32-63:   blockTimestamp (big-endian, left-padded)
//! - Bytes 64-95:   transactionsRoot
//! - Bytes 96-127:  receiptsRoot
//!
//! # Exit Id
//! `keccak256(abi.encodePacked(uint256 blockNumber, bytes nibblePath, uint256 logIndex))`

use alloy_primitives::B256;

pub use common::keccak256;

/// Compute the checkpoint leaf for a child block
pub fn compute_block_leaf(
    block_number: u64,
    block_timestamp: u64,
    transactions_root: &B256,
    receipts_root: &B256,
) -> B256 {
    let mut data = [0u8; 128];

    // u64 (8 bytes) goes into bytes 24-31 of each uint256 slot
    data[24..32].copy_from_slice(&block_number.to_be_bytes());
    data[32 + 24..64].copy_from_slice(&block_timestamp.to_be_bytes());
    data[64..96].copy_from_slice(transactions_root.as_slice());
    data[96..128].copy_from_slice(receipts_root.as_slice());

    B256::from(keccak256(&data))
}

/// Compute the replay-protection id of one log inside one receipt of one block
///
/// `nibble_path` must be the canonical hex-prefix encoding of the receipt's
/// trie key, so each (block, receipt, log) triple maps to exactly one id.
pub fn compute_exit_id(block_number: u64, nibble_path: &[u8], log_index: u64) -> B256 {
    let mut data = Vec::with_capacity(64 + nibble_path.len());
    data.extend_from_slice(&[0u8; 24]);
    data.extend_from_slice(&block_number.to_be_bytes());
    data.extend_from_slice(nibble_path);
    data.extend_from_slice(&[0u8; 24]);
    data.extend_from_slice(&log_index.to_be_bytes());

    B256::from(keccak256(&data))
}

/// Hash two sibling nodes of the checkpoint tree: `keccak256(left ‖ right)`
pub fn hash_pair(left: &B256, right: &B256) -> B256 {
    let mut data = [0u8; 64];
    data[..32].copy_from_slice(left.as_slice());
    data[32..].copy_from_slice(right.as_slice());
    B256::from(keccak256(&data))
}
