//! Merkle-Patricia trie inclusion proofs
//!
//! A proof is the list of RLP-encoded nodes from the root towards the leaf.
//! Nodes referenced by hash must appear in the list; nodes shorter than 32
//! bytes are embedded in their parent and walked in place.
//!
//! Node shapes:
//! - branch: 17 items, one child reference per nibble plus a value slot
//! - extension / leaf: 2 items, a hex-prefix path and a child or value
//!
//! Verification only succeeds on a leaf that consumes the full key, holds
//! exactly the expected value and is the last node of the proof.

use alloy_primitives::{Bytes, B256};

use crate::error::BridgeError;
use crate::hash::keccak256;
use crate::rlp::{decode_list, RlpItem};

/// Split a byte key into its nibbles, high nibble first.
pub fn key_nibbles(key: &[u8]) -> Vec<u8> {
    key.iter().flat_map(|b| [b >> 4, b & 0x0f]).collect()
}

/// Hex-prefix encode `nibbles`, setting the leaf flag when `leaf` is true.
pub fn encode_hex_prefix(nibbles: &[u8], leaf: bool) -> Vec<u8> {
    let odd = nibbles.len() % 2 == 1;
    let flag = (if leaf { 2 } else { 0 }) + u8::from(odd);

    let mut out = Vec::with_capacity(nibbles.len() / 2 + 1);
    let rest = if odd {
        out.push((flag << 4) | nibbles[0]);
        &nibbles[1..]
    } else {
        out.push(flag << 4);
        nibbles
    };
    for pair in rest.chunks(2) {
        out.push((pair[0] << 4) | pair[1]);
    }
    out
}

/// Decode a hex-prefix path into `(nibbles, is_leaf)`.
///
/// The padding nibble of even-length paths must be zero.
pub fn decode_hex_prefix(encoded: &[u8]) -> Result<(Vec<u8>, bool), BridgeError> {
    let (&first, rest) = encoded
        .split_first()
        .ok_or_else(|| BridgeError::invalid_proof("empty hex-prefix path"))?;

    let flag = first >> 4;
    if flag > 3 {
        return Err(BridgeError::invalid_proof(format!(
            "invalid hex-prefix flag {flag}"
        )));
    }
    let leaf = flag & 2 != 0;
    let odd = flag & 1 != 0;

    let mut nibbles = Vec::with_capacity(rest.len() * 2 + 1);
    if odd {
        nibbles.push(first & 0x0f);
    } else if first & 0x0f != 0 {
        return Err(BridgeError::invalid_proof("non-zero hex-prefix padding"));
    }
    nibbles.extend(key_nibbles(rest));
    Ok((nibbles, leaf))
}

/// Canonical nibble path of a trie key, as carried in exit proofs.
pub fn encode_nibble_path(key: &[u8]) -> Bytes {
    Bytes::from(encode_hex_prefix(&key_nibbles(key), false))
}

/// Decode an exit proof's nibble path into key nibbles.
///
/// Only the canonical extension-style encoding is accepted (flag 0 or 1, zero
/// padding, at least one nibble). A single key therefore has exactly one
/// encoding, which the exit id depends on.
pub fn decode_nibble_path(path: &[u8]) -> Result<Vec<u8>, BridgeError> {
    let (nibbles, leaf) = decode_hex_prefix(path)?;
    if leaf {
        return Err(BridgeError::invalid_proof(
            "nibble path must not carry the leaf flag",
        ));
    }
    if nibbles.is_empty() {
        return Err(BridgeError::invalid_proof("empty nibble path"));
    }
    Ok(nibbles)
}

// ============================================================================
// Verification
// ============================================================================

#[derive(Clone, Copy)]
enum ChildRef<'a> {
    Hash(B256),
    Inline(&'a [u8]),
}

fn child_ref<'a>(item: &RlpItem<'a>) -> Result<ChildRef<'a>, BridgeError> {
    if item.list {
        return Ok(ChildRef::Inline(item.raw));
    }
    match item.payload.len() {
        32 => Ok(ChildRef::Hash(B256::from_slice(item.payload))),
        0 => Err(BridgeError::invalid_proof("key diverges from trie")),
        n => Err(BridgeError::invalid_proof(format!(
            "child reference of {n} bytes"
        ))),
    }
}

/// Verify that `value` is stored under `key_nibbles` in the trie committed by `root`.
pub fn verify_inclusion(
    key_nibbles: &[u8],
    value: &[u8],
    proof: &[Bytes],
    root: &B256,
) -> Result<(), BridgeError> {
    let mut nodes = proof.iter();
    let mut next = ChildRef::Hash(*root);
    let mut offset = 0usize;

    loop {
        let node: &[u8] = match next {
            ChildRef::Hash(expected) => {
                let node = nodes
                    .next()
                    .ok_or_else(|| BridgeError::invalid_proof("proof ended before leaf"))?;
                if B256::from(keccak256(node)) != expected {
                    return Err(BridgeError::invalid_proof("node hash mismatch"));
                }
                node
            }
            ChildRef::Inline(raw) => raw,
        };

        let items = decode_list(node)
            .map_err(|e| BridgeError::invalid_proof(format!("malformed trie node: {e}")))?;

        match items.len() {
            17 => {
                let Some(&nibble) = key_nibbles.get(offset) else {
                    return Err(BridgeError::invalid_proof(
                        "key terminates at a branch value",
                    ));
                };
                if nibble > 0x0f {
                    return Err(BridgeError::invalid_proof("key nibble out of range"));
                }
                offset += 1;
                next = child_ref(&items[nibble as usize])?;
            }
            2 => {
                if items[0].list {
                    return Err(BridgeError::invalid_proof("node path is a list"));
                }
                let (path, leaf) = decode_hex_prefix(items[0].payload)?;
                let remaining = &key_nibbles[offset..];
                if !remaining.starts_with(&path) {
                    return Err(BridgeError::invalid_proof("key diverges from trie"));
                }
                offset += path.len();

                if !leaf {
                    next = child_ref(&items[1])?;
                    continue;
                }
                if offset != key_nibbles.len() {
                    return Err(BridgeError::invalid_proof("leaf does not consume the key"));
                }
                if nodes.next().is_some() {
                    return Err(BridgeError::invalid_proof("trailing nodes after leaf"));
                }
                if items[1].list || items[1].payload != value {
                    return Err(BridgeError::invalid_proof("leaf value mismatch"));
                }
                return Ok(());
            }
            n => {
                return Err(BridgeError::invalid_proof(format!(
                    "trie node with {n} items"
                )))
            }
        }
    }
}

/// Boolean form of [`verify_inclusion`] taking the key as a hex-prefix path.
pub fn verify(value: &[u8], nibble_path: &[u8], proof: &[Bytes], root: &B256) -> bool {
    match decode_nibble_path(nibble_path) {
        Ok(key) => verify_inclusion(&key, value, proof, root).is_ok(),
        Err(_) => false,
    }
}
