//! Proof builders for tests and tooling
//!
//! Produces the same structures an honest child chain and checkpoint
//! producer would: binary Merkle trees over block leaves, Patricia tries over
//! receipts, and complete [`ExitProof`]s.

use std::collections::BTreeMap;

use alloy_primitives::{Address, Bytes, B256};
use alloy_rlp::{Encodable, Header, RlpEncodable};

use crate::checkpoint::CheckpointHeader;
use crate::hash::{compute_block_leaf, hash_pair, keccak256};
use crate::merkle::tree_depth;
use crate::proof::ExitProof;
use crate::receipt::LogEntry;
use crate::trie::{encode_hex_prefix, encode_nibble_path, key_nibbles};

// ============================================================================
// Receipts
// ============================================================================

#[derive(RlpEncodable)]
struct RlpLog {
    address: Address,
    topics: Vec<B256>,
    data: Bytes,
}

#[derive(RlpEncodable)]
struct RlpReceipt {
    status: u8,
    cumulative_gas_used: u64,
    logs_bloom: Bytes,
    logs: Vec<RlpLog>,
}

/// Legacy receipt `rlp([1, gasUsed, bloom, logs])` carrying `logs`
pub fn encode_receipt(logs: &[LogEntry]) -> Vec<u8> {
    let receipt = RlpReceipt {
        status: 1,
        cumulative_gas_used: 21_000 * (logs.len() as u64 + 1),
        logs_bloom: Bytes::from(vec![0u8; 256]),
        logs: logs
            .iter()
            .map(|log| RlpLog {
                address: log.emitter,
                topics: log.topics.clone(),
                data: log.data.clone(),
            })
            .collect(),
    };
    alloy_rlp::encode(&receipt)
}

/// EIP-2718 receipt: `tx_type ‖ rlp(receipt)`
pub fn encode_typed_receipt(tx_type: u8, logs: &[LogEntry]) -> Vec<u8> {
    let mut out = vec![tx_type];
    out.extend(encode_receipt(logs));
    out
}

// ============================================================================
// Binary Merkle Tree
// ============================================================================

/// Binary Merkle tree over consecutive block leaves, zero-padded to a power of two
#[derive(Debug, Clone, Default)]
pub struct CheckpointTreeBuilder {
    leaves: Vec<B256>,
}

impl CheckpointTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, leaf: B256) -> &mut Self {
        self.leaves.push(leaf);
        self
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    fn levels(&self) -> Vec<Vec<B256>> {
        let depth = tree_depth(self.leaves.len() as u64);
        let mut level = self.leaves.clone();
        level.resize(1 << depth, B256::ZERO);

        let mut levels = vec![level];
        for _ in 0..depth {
            let next = levels[levels.len() - 1]
                .chunks(2)
                .map(|pair| hash_pair(&pair[0], &pair[1]))
                .collect();
            levels.push(next);
        }
        levels
    }

    pub fn root(&self) -> B256 {
        self.levels()
            .last()
            .and_then(|top| top.first().copied())
            .unwrap_or_default()
    }

    /// Sibling path for the leaf at `index`, bottom level first
    pub fn proof(&self, index: usize) -> Vec<B256> {
        let levels = self.levels();
        let mut index = index;
        let mut path = Vec::with_capacity(levels.len() - 1);
        for level in &levels[..levels.len() - 1] {
            path.push(level[index ^ 1]);
            index >>= 1;
        }
        path
    }
}

// ============================================================================
// Patricia Trie
// ============================================================================

fn rlp_str(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    bytes.encode(&mut out);
    out
}

fn rlp_list(items: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    Header {
        list: true,
        payload_length: items.iter().map(Vec::len).sum(),
    }
    .encode(&mut out);
    for item in items {
        out.extend_from_slice(item);
    }
    out
}

fn child_reference(node: Vec<u8>) -> Vec<u8> {
    if node.len() < 32 {
        node
    } else {
        rlp_str(&keccak256(&node))
    }
}

type Entry = (Vec<u8>, Vec<u8>);

fn shared_prefix(entries: &[Entry], depth: usize) -> usize {
    let first = &entries[0].0[depth..];
    entries[1..].iter().fold(first.len(), |shared, (key, _)| {
        first
            .iter()
            .zip(&key[depth..])
            .take(shared)
            .take_while(|(a, b)| a == b)
            .count()
    })
}

/// Encode the subtrie over `entries` (sorted, prefix-free nibble keys) below
/// `depth`. Hashed nodes on the path to `target` are appended to `proof`,
/// deepest first.
fn encode_node(entries: &[Entry], depth: usize, target: Option<&[u8]>, proof: &mut Vec<Bytes>) -> Vec<u8> {
    let node = if let [(key, value)] = entries {
        rlp_list(&[rlp_str(&encode_hex_prefix(&key[depth..], true)), rlp_str(value)])
    } else {
        let shared = shared_prefix(entries, depth);
        if shared > 0 {
            let child = encode_node(entries, depth + shared, target, proof);
            rlp_list(&[
                rlp_str(&encode_hex_prefix(&entries[0].0[depth..depth + shared], false)),
                child_reference(child),
            ])
        } else {
            let mut items = Vec::with_capacity(17);
            for nibble in 0..16u8 {
                let group: Vec<Entry> = entries
                    .iter()
                    .filter(|(key, _)| key[depth] == nibble)
                    .cloned()
                    .collect();
                if group.is_empty() {
                    items.push(rlp_str(&[]));
                    continue;
                }
                let on_path = target.filter(|key| key[depth] == nibble);
                items.push(child_reference(encode_node(&group, depth + 1, on_path, proof)));
            }
            items.push(rlp_str(&[]));
            rlp_list(&items)
        }
    };
    if target.is_some() && (depth == 0 || node.len() >= 32) {
        proof.push(Bytes::from(node.clone()));
    }
    node
}

/// Receipt trie of one block, keyed by `rlp(txIndex)`
#[derive(Debug, Clone, Default)]
pub struct ReceiptTrieBuilder {
    receipts: BTreeMap<u64, Vec<u8>>,
}

impl ReceiptTrieBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tx_index: u64, receipt: Vec<u8>) -> &mut Self {
        self.receipts.insert(tx_index, receipt);
        self
    }

    pub fn receipt(&self, tx_index: u64) -> Option<&[u8]> {
        self.receipts.get(&tx_index).map(Vec::as_slice)
    }

    fn entries(&self) -> Vec<Entry> {
        let mut entries: Vec<Entry> = self
            .receipts
            .iter()
            .map(|(index, receipt)| (key_nibbles(&alloy_rlp::encode(index)), receipt.clone()))
            .collect();
        entries.sort();
        entries
    }

    pub fn root(&self) -> B256 {
        let entries = self.entries();
        if entries.is_empty() {
            // keccak256(rlp(""))
            return B256::from(keccak256(&[0x80]));
        }
        B256::from(keccak256(&encode_node(&entries, 0, None, &mut Vec::new())))
    }

    /// Proof nodes (root first) and canonical nibble path for `tx_index`
    pub fn proof(&self, tx_index: u64) -> Option<(Vec<Bytes>, Bytes)> {
        if !self.receipts.contains_key(&tx_index) {
            return None;
        }
        let key = alloy_rlp::encode(tx_index);
        let mut proof = Vec::new();
        encode_node(&self.entries(), 0, Some(&key_nibbles(&key)), &mut proof);
        proof.reverse();
        Some((proof, encode_nibble_path(&key)))
    }
}

// ============================================================================
// Mock Child Chain
// ============================================================================

/// Location of a receipt on the mock child chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxRef {
    pub block_number: u64,
    pub tx_index: u64,
}

#[derive(Debug, Clone)]
struct MockBlock {
    number: u64,
    timestamp: u64,
    transactions_root: B256,
    receipts: ReceiptTrieBuilder,
}

impl MockBlock {
    fn leaf(&self) -> B256 {
        compute_block_leaf(
            self.number,
            self.timestamp,
            &self.transactions_root,
            &self.receipts.root(),
        )
    }
}

/// A child chain that records receipts, seals blocks and commits
/// checkpoints over them
#[derive(Debug, Clone)]
pub struct MockChildChain {
    blocks: Vec<MockBlock>,
    pending: ReceiptTrieBuilder,
    pending_count: u64,
    next_block: u64,
    checkpoints: Vec<CheckpointHeader>,
}

impl MockChildChain {
    pub fn new(start_block: u64) -> Self {
        Self {
            blocks: Vec::new(),
            pending: ReceiptTrieBuilder::new(),
            pending_count: 0,
            next_block: start_block,
            checkpoints: Vec::new(),
        }
    }

    /// Add a transaction emitting `logs` to the block being built.
    pub fn include(&mut self, logs: &[LogEntry]) -> TxRef {
        let tx_index = self.pending_count;
        self.pending.insert(tx_index, encode_receipt(logs));
        self.pending_count += 1;
        TxRef {
            block_number: self.next_block,
            tx_index,
        }
    }

    /// Seal the block being built and return its number.
    pub fn seal_block(&mut self) -> u64 {
        let number = self.next_block;
        let receipts = std::mem::take(&mut self.pending);
        self.blocks.push(MockBlock {
            number,
            timestamp: 1_700_000_000 + number * 2,
            transactions_root: B256::from(keccak256(&number.to_be_bytes())),
            receipts,
        });
        self.pending_count = 0;
        self.next_block += 1;
        number
    }

    /// Seal pending transactions and commit every block not yet checkpointed.
    pub fn checkpoint(&mut self, header_id: u64) -> CheckpointHeader {
        if self.pending_count > 0 {
            self.seal_block();
        }
        let start_block = self
            .checkpoints
            .last()
            .map(|h| h.end_block + 1)
            .unwrap_or_else(|| self.blocks[0].number);
        let end_block = self.next_block - 1;

        let mut tree = CheckpointTreeBuilder::new();
        for block in self.blocks_in(start_block, end_block) {
            tree.push(block.leaf());
        }
        let header = CheckpointHeader {
            header_id,
            root: tree.root(),
            start_block,
            end_block,
        };
        self.checkpoints.push(header);
        header
    }

    fn blocks_in(&self, start: u64, end: u64) -> impl Iterator<Item = &MockBlock> {
        self.blocks
            .iter()
            .filter(move |block| (start..=end).contains(&block.number))
    }

    fn block(&self, number: u64) -> &MockBlock {
        self.blocks
            .iter()
            .find(|b| b.number == number)
            .expect("unknown block")
    }

    /// Exit proof for log `log_index` of the receipt at `tx`.
    ///
    /// Panics if the block has not been checkpointed.
    pub fn exit_proof(&self, tx: TxRef, log_index: u64) -> ExitProof {
        let header = self
            .checkpoints
            .iter()
            .find(|h| h.contains(tx.block_number))
            .expect("block not checkpointed");
        let mut tree = CheckpointTreeBuilder::new();
        for block in self.blocks_in(header.start_block, header.end_block) {
            tree.push(block.leaf());
        }

        let block = self.block(tx.block_number);
        let (receipt_proof, nibble_path) = block
            .receipts
            .proof(tx.tx_index)
            .expect("unknown transaction");
        let receipt = block
            .receipts
            .receipt(tx.tx_index)
            .expect("unknown transaction");

        ExitProof {
            header_id: header.header_id,
            sibling_path: tree.proof((tx.block_number - header.start_block) as usize),
            block_number: block.number,
            block_timestamp: block.timestamp,
            transactions_root: block.transactions_root,
            receipts_root: block.receipts.root(),
            receipt: Bytes::copy_from_slice(receipt),
            receipt_proof,
            nibble_path,
            log_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{merkle, trie};

    #[test]
    fn test_tree_proofs_verify() {
        let mut tree = CheckpointTreeBuilder::new();
        for i in 0..5u8 {
            tree.push(B256::repeat_byte(i + 1));
        }
        let root = tree.root();
        for i in 0..5usize {
            let path = tree.proof(i);
            assert_eq!(path.len(), 3);
            assert!(merkle::verify(&B256::repeat_byte(i as u8 + 1), &path, i as u64, &root));
        }
    }

    #[test]
    fn test_trie_proofs_verify_for_many_receipts() {
        let mut trie_builder = ReceiptTrieBuilder::new();
        // crosses the single-byte / two-byte rlp key boundary at 128
        for i in 0..140u64 {
            let log = LogEntry {
                emitter: Address::repeat_byte(1),
                topics: vec![B256::from(keccak256(&i.to_be_bytes()))],
                data: Bytes::new(),
            };
            trie_builder.insert(i, encode_receipt(&[log]));
        }
        let root = trie_builder.root();
        for i in [0u64, 1, 15, 16, 127, 128, 139] {
            let (proof, path) = trie_builder.proof(i).unwrap();
            let receipt = trie_builder.receipt(i).unwrap();
            assert!(trie::verify(receipt, &path, &proof, &root), "tx {i}");
        }
    }

    #[test]
    fn test_single_receipt_trie() {
        let mut trie_builder = ReceiptTrieBuilder::new();
        trie_builder.insert(0, encode_receipt(&[]));
        let (proof, path) = trie_builder.proof(0).unwrap();
        assert_eq!(proof.len(), 1);
        assert_eq!(path.as_ref(), &[0x00, 0x80]);
        assert!(trie::verify(
            trie_builder.receipt(0).unwrap(),
            &path,
            &proof,
            &trie_builder.root()
        ));
    }

    #[test]
    fn test_empty_trie_root() {
        // well-known empty trie root
        assert_eq!(
            ReceiptTrieBuilder::new().root().to_string(),
            "0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421"
        );
    }
}
