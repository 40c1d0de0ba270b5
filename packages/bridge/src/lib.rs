//! Checkpoint Bridge - Exit Verification and Token Custody
//!
//! Core of a two-chain asset bridge. The child chain periodically commits
//! checkpoints of its blocks to root; users lock assets on root, use the
//! mirrored balance on child, burn it there, and reclaim the original on
//! root by proving the burn.
//!
//! # Deposit Flow
//! 1. User calls `RootChainManager::deposit_for`
//! 2. The asset's predicate takes custody from the user
//! 3. A DEPOSIT notice is emitted for the state-sync transport
//! 4. `ChildChainManager::on_receive_notice` mints on the mapped child token
//!
//! # Exit Flow
//! 1. User withdraws on child; the child token burns and emits a burn log
//! 2. A checkpoint covering that block is submitted on root
//! 3. User calls `RootChainManager::exit` with an `ExitProof`
//! 4. Block, receipt and log are verified, the exit id is marked processed,
//!    and the predicate releases custody to the user
//!
//! # Security
//! - Block fields are bound into the checkpoint leaf, so no field can be
//!   swapped without breaking the Merkle path
//! - Receipt inclusion is proven against the bound receipts root
//! - Exit ids are unique per (block, receipt, log) and recorded once
//! - Asset classes are write-once and lookups never fall back to a default
//! - Every operation is all-or-nothing

pub mod access;
pub mod checkpoint;
pub mod child;
pub mod error;
pub mod events;
pub mod exit_tracker;
pub mod hash;
pub mod ledger;
pub mod merkle;
pub mod predicate;
pub mod proof;
pub mod receipt;
pub mod registry;
mod rlp;
pub mod root_manager;
pub mod trie;

// Testing utilities (feature-gated)
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use crate::access::{AccessControl, Role};
pub use crate::checkpoint::{CheckpointHeader, CheckpointStore};
pub use crate::child::{ChildAsset, ChildChainManager, ChildToken, NoticeOutcome, TokenMapped};
pub use crate::error::{AssetError, BridgeError};
pub use crate::exit_tracker::ExitTracker;
pub use crate::hash::{compute_block_leaf, compute_exit_id, keccak256};
pub use crate::ledger::{RootAsset, RootLedger};
pub use crate::predicate::{Locked, Predicate, Released, TokenPredicate};
pub use crate::proof::{ExitProof, VerifiedExit};
pub use crate::receipt::{extract_log, LogEntry};
pub use crate::registry::PredicateRegistry;
pub use crate::root_manager::{Deposited, Exited, OutboundNotice, RootChainManager};

pub use common::{AssetTypeTag, DepositNotice, DepositPayload, MapTokenNotice, Notice, NATIVE_CURRENCY};
