//! Exit proofs
//!
//! An exit proof ties one log of one receipt to a committed checkpoint:
//!
//! 1. the block leaf built from the claimed block fields is included under
//!    the checkpoint root (binary Merkle path),
//! 2. the receipt is included under the claimed receipts root (Patricia
//!    proof keyed by `rlp(txIndex)`),
//! 3. the log at `log_index` is decoded from the receipt.
//!
//! # Wire Format
//! `rlp([headerId, siblingPath, blockNumber, blockTimestamp, transactionsRoot,
//! receiptsRoot, receipt, receiptProof, nibblePath, logIndex])` where
//! `siblingPath` is the concatenation of 32-byte hashes and `receiptProof` is
//! the RLP encoding of the list of proof nodes, each as a byte string.

use alloy_primitives::{Bytes, B256};
use alloy_rlp::{Decodable, RlpDecodable, RlpEncodable};
use serde::{Deserialize, Serialize};

use crate::checkpoint::CheckpointHeader;
use crate::error::BridgeError;
use crate::hash::{compute_block_leaf, compute_exit_id};
use crate::receipt::{extract_log, LogEntry};
use crate::trie;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitProof {
    pub header_id: u64,
    pub sibling_path: Vec<B256>,
    pub block_number: u64,
    pub block_timestamp: u64,
    pub transactions_root: B256,
    pub receipts_root: B256,
    /// RLP-encoded receipt, optionally type-prefixed
    pub receipt: Bytes,
    /// Trie nodes from the receipts root down to the receipt's leaf
    pub receipt_proof: Vec<Bytes>,
    /// Hex-prefix encoding of `rlp(txIndex)`
    pub nibble_path: Bytes,
    pub log_index: u64,
}

#[derive(Debug, RlpEncodable, RlpDecodable)]
struct ExitPayload {
    header_id: u64,
    sibling_path: Bytes,
    block_number: u64,
    block_timestamp: u64,
    transactions_root: B256,
    receipts_root: B256,
    receipt: Bytes,
    receipt_proof: Bytes,
    nibble_path: Bytes,
    log_index: u64,
}

/// Result of a fully verified exit proof
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedExit {
    pub exit_id: B256,
    pub header_id: u64,
    pub block_number: u64,
    pub log: LogEntry,
}

fn wire_error(err: alloy_rlp::Error) -> BridgeError {
    BridgeError::invalid_proof(format!("malformed exit proof: {err}"))
}

impl ExitProof {
    pub fn encode(&self) -> Bytes {
        let sibling_path: Vec<u8> = self
            .sibling_path
            .iter()
            .flat_map(|hash| hash.0)
            .collect();
        let payload = ExitPayload {
            header_id: self.header_id,
            sibling_path: Bytes::from(sibling_path),
            block_number: self.block_number,
            block_timestamp: self.block_timestamp,
            transactions_root: self.transactions_root,
            receipts_root: self.receipts_root,
            receipt: self.receipt.clone(),
            receipt_proof: Bytes::from(alloy_rlp::encode(&self.receipt_proof)),
            nibble_path: self.nibble_path.clone(),
            log_index: self.log_index,
        };
        Bytes::from(alloy_rlp::encode(&payload))
    }

    pub fn decode(raw: &[u8]) -> Result<Self, BridgeError> {
        let mut buf = raw;
        let payload = ExitPayload::decode(&mut buf).map_err(wire_error)?;
        if !buf.is_empty() {
            return Err(BridgeError::invalid_proof("trailing bytes after exit proof"));
        }

        if payload.sibling_path.len() % 32 != 0 {
            return Err(BridgeError::invalid_proof(format!(
                "sibling path of {} bytes is not a sequence of hashes",
                payload.sibling_path.len()
            )));
        }
        let sibling_path = payload
            .sibling_path
            .chunks_exact(32)
            .map(B256::from_slice)
            .collect();

        let mut nodes = payload.receipt_proof.as_ref();
        let receipt_proof = Vec::<Bytes>::decode(&mut nodes).map_err(wire_error)?;
        if !nodes.is_empty() {
            return Err(BridgeError::invalid_proof("trailing bytes after receipt proof"));
        }

        Ok(Self {
            header_id: payload.header_id,
            sibling_path,
            block_number: payload.block_number,
            block_timestamp: payload.block_timestamp,
            transactions_root: payload.transactions_root,
            receipts_root: payload.receipts_root,
            receipt: payload.receipt,
            receipt_proof,
            nibble_path: payload.nibble_path,
            log_index: payload.log_index,
        })
    }

    pub fn block_leaf(&self) -> B256 {
        compute_block_leaf(
            self.block_number,
            self.block_timestamp,
            &self.transactions_root,
            &self.receipts_root,
        )
    }

    /// Exit id of the log this proof points at
    pub fn exit_id(&self) -> B256 {
        compute_exit_id(self.block_number, &self.nibble_path, self.log_index)
    }

    /// Run the three inclusion steps against `header` and return the proven log.
    pub fn verify(&self, header: &CheckpointHeader) -> Result<VerifiedExit, BridgeError> {
        if header.header_id != self.header_id {
            return Err(BridgeError::invalid_proof(format!(
                "proof targets header {}, got header {}",
                self.header_id, header.header_id
            )));
        }

        header.verify_block(self.block_number, &self.block_leaf(), &self.sibling_path)?;

        let key = trie::decode_nibble_path(&self.nibble_path)?;
        trie::verify_inclusion(&key, &self.receipt, &self.receipt_proof, &self.receipts_root)?;

        let log = extract_log(&self.receipt, self.log_index)?;

        Ok(VerifiedExit {
            exit_id: self.exit_id(),
            header_id: self.header_id,
            block_number: self.block_number,
            log,
        })
    }
}
