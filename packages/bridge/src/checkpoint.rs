//! Committed checkpoint headers
//!
//! Headers are written once by the checkpoint source and only read afterwards.

use std::collections::BTreeMap;

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;
use crate::merkle;

/// A root-committed summary of the child blocks `start_block..=end_block`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointHeader {
    pub header_id: u64,
    pub root: B256,
    pub start_block: u64,
    pub end_block: u64,
}

impl CheckpointHeader {
    /// Blocks covered, or `None` for an inverted or unrepresentable range
    pub fn leaf_count(&self) -> Option<u64> {
        self.end_block.checked_sub(self.start_block)?.checked_add(1)
    }

    fn checked_leaf_count(&self) -> Result<u64, BridgeError> {
        self.leaf_count().ok_or_else(|| BridgeError::InvalidCheckpoint {
            reason: format!(
                "block range [{}, {}] is not a valid checkpoint",
                self.start_block, self.end_block
            ),
        })
    }

    pub fn contains(&self, block_number: u64) -> bool {
        (self.start_block..=self.end_block).contains(&block_number)
    }

    /// Sibling path length required for blocks in this checkpoint
    pub fn depth(&self) -> Option<usize> {
        self.leaf_count().map(merkle::tree_depth)
    }

    /// Check that the block leaf for `block_number` is committed under this header.
    pub fn verify_block(
        &self,
        block_number: u64,
        leaf: &B256,
        sibling_path: &[B256],
    ) -> Result<(), BridgeError> {
        let leaf_count = self.checked_leaf_count()?;
        if !self.contains(block_number) {
            return Err(BridgeError::BlockNotInCheckpoint {
                block_number,
                start_block: self.start_block,
                end_block: self.end_block,
            });
        }
        merkle::verify_inclusion(
            leaf,
            sibling_path,
            block_number - self.start_block,
            &self.root,
            leaf_count,
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct CheckpointStore {
    headers: BTreeMap<u64, CheckpointHeader>,
}

impl CheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new header. Ids must strictly increase and ranges be non-empty.
    pub fn submit(&mut self, header: CheckpointHeader) -> Result<(), BridgeError> {
        header.checked_leaf_count()?;
        if let Some(latest) = self.latest_header_id() {
            if header.header_id <= latest {
                return Err(BridgeError::InvalidCheckpoint {
                    reason: format!(
                        "header id {} not above latest {}",
                        header.header_id, latest
                    ),
                });
            }
        }
        self.headers.insert(header.header_id, header);
        Ok(())
    }

    pub fn get(&self, header_id: u64) -> Result<&CheckpointHeader, BridgeError> {
        self.headers
            .get(&header_id)
            .ok_or(BridgeError::CheckpointNotFound { header_id })
    }

    pub fn latest_header_id(&self) -> Option<u64> {
        self.headers.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CheckpointHeader> {
        self.headers.values()
    }
}
