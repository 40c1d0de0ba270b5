//! Binary Merkle verification of block leaves against a checkpoint root.
//!
//! Convention shared with the checkpoint producer: at level `i`, bit `i` of
//! the leaf index (least-significant first) selects the side. A zero bit
//! means the running hash is the left operand:
//! `bit == 0 → keccak256(running ‖ sibling)`, `bit == 1 → keccak256(sibling ‖ running)`.
//! Trees over a block range are padded with zero leaves to a power of two,
//! so the path length is fixed by the range size.

use alloy_primitives::B256;

use crate::error::BridgeError;
use crate::hash::hash_pair;

/// Depth of a tree over `leaf_count` leaves: `ceil(log2(leaf_count))`.
pub fn tree_depth(leaf_count: u64) -> usize {
    if leaf_count <= 1 {
        0
    } else {
        (64 - (leaf_count - 1).leading_zeros()) as usize
    }
}

/// Fold `leaf` up the sibling `path` following the bits of `index`.
pub fn compute_root(leaf: &B256, path: &[B256], index: u64) -> B256 {
    let mut computed = *leaf;
    let mut index = index;
    for sibling in path {
        computed = if index & 1 == 0 {
            hash_pair(&computed, sibling)
        } else {
            hash_pair(sibling, &computed)
        };
        index >>= 1;
    }
    computed
}

/// Returns true iff `leaf` at `index` is committed under `root`.
///
/// The index must fit in `path.len()` bits; otherwise high bits would be
/// silently ignored and one leaf could be proven at several indices.
pub fn verify(leaf: &B256, path: &[B256], index: u64, root: &B256) -> bool {
    if path.len() < 64 && index >> path.len() != 0 {
        return false;
    }
    compute_root(leaf, path, index) == *root
}

/// Verify inclusion in a tree over exactly `leaf_count` leaves.
pub fn verify_inclusion(
    leaf: &B256,
    path: &[B256],
    index: u64,
    root: &B256,
    leaf_count: u64,
) -> Result<(), BridgeError> {
    let depth = tree_depth(leaf_count);
    if path.len() != depth {
        return Err(BridgeError::invalid_proof(format!(
            "sibling path has {} hashes, checkpoint of {} blocks requires {}",
            path.len(),
            leaf_count,
            depth
        )));
    }
    if index >= leaf_count {
        return Err(BridgeError::invalid_proof(format!(
            "leaf index {index} outside checkpoint of {leaf_count} blocks"
        )));
    }
    if !verify(leaf, path, index, root) {
        return Err(BridgeError::invalid_proof(
            "block is not included in checkpoint root",
        ));
    }
    Ok(())
}
