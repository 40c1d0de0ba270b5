//! Error types for the checkpoint bridge
//!
//! Every operation is all-or-nothing: an error aborts the whole call and
//! leaves registries, the exit set and custody balances untouched.

use alloy_primitives::{Address, B256, U256};
use common::{AssetTypeTag, CodecError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    // ========================================================================
    // Authorization Errors
    // ========================================================================

    #[error("Unauthorized: caller {caller} lacks the {role} role")]
    Unauthorized { caller: Address, role: &'static str },

    // ========================================================================
    // Proof Errors
    // ========================================================================

    #[error("Invalid proof: {reason}")]
    InvalidProof { reason: String },

    #[error("Checkpoint not found: header {header_id}")]
    CheckpointNotFound { header_id: u64 },

    #[error("Block {block_number} is outside checkpoint range [{start_block}, {end_block}]")]
    BlockNotInCheckpoint {
        block_number: u64,
        start_block: u64,
        end_block: u64,
    },

    #[error("Invalid checkpoint: {reason}")]
    InvalidCheckpoint { reason: String },

    #[error("Log index {index} out of range: receipt has {len} logs")]
    IndexOutOfRange { index: u64, len: usize },

    // ========================================================================
    // Replay Errors
    // ========================================================================

    #[error("Exit already processed: {exit_id}")]
    AlreadyExited { exit_id: B256 },

    // ========================================================================
    // Registry Errors
    // ========================================================================

    #[error("Unregistered asset: {asset}")]
    UnregisteredAsset { asset: Address },

    #[error("Asset {asset} already registered as {registered}")]
    AssetTypeAlreadyRegistered {
        asset: Address,
        registered: AssetTypeTag,
    },

    #[error("Predicate handles {predicate} but was registered for {tag}")]
    PredicateTypeMismatch {
        tag: AssetTypeTag,
        predicate: AssetTypeTag,
    },

    #[error("Token already mapped: root {root_token} / child {child_token}")]
    TokenAlreadyMapped {
        root_token: Address,
        child_token: Address,
    },

    #[error("Unsupported notice type: {sync_type}")]
    UnsupportedNoticeType { sync_type: B256 },

    // ========================================================================
    // Burn Log Errors
    // ========================================================================

    #[error("Invalid signature: expected {expected}, got {got}")]
    InvalidSignature { expected: B256, got: B256 },

    #[error("Invalid withdraw signature: {got}")]
    InvalidWithdrawSignature { got: B256 },

    #[error("Invalid sender: expected {expected}, got {got}")]
    InvalidSender { expected: Address, got: Address },

    #[error("Invalid receiver: burn must target the zero address, got {got}")]
    InvalidReceiver { got: Address },

    #[error("Invalid log data: {reason}")]
    InvalidLogData { reason: String },

    // ========================================================================
    // Deposit & Custody Errors
    // ========================================================================

    #[error("Invalid deposit: {reason}")]
    InvalidDeposit { reason: String },

    #[error("Insufficient custody of {asset}: {reason}")]
    InsufficientCustody { asset: Address, reason: String },

    #[error("Asset rejected transfer: {0}")]
    Asset(#[from] AssetError),

    #[error("{0}")]
    Codec(#[from] CodecError),
}

impl BridgeError {
    /// Errors that indicate an internal consistency violation rather than a
    /// bad request. They are unreachable while upstream verification holds.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BridgeError::InsufficientCustody { .. })
    }

    pub(crate) fn invalid_proof(reason: impl Into<String>) -> Self {
        BridgeError::InvalidProof {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_log(reason: impl Into<String>) -> Self {
        BridgeError::InvalidLogData {
            reason: reason.into(),
        }
    }
}

/// Rejections raised by the assets themselves when asked to move value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("Unknown asset: {asset}")]
    UnknownAsset { asset: Address },

    #[error("Asset already deployed at {asset}")]
    AlreadyDeployed { asset: Address },

    #[error("Asset {asset} is not a {expected} asset")]
    WrongAssetKind {
        asset: Address,
        expected: &'static str,
    },

    #[error("Insufficient balance of {account}: needed {needed}, available {available}")]
    InsufficientBalance {
        account: Address,
        needed: U256,
        available: U256,
    },

    #[error("Insufficient allowance from {owner} to {spender}: needed {needed}, available {available}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        needed: U256,
        available: U256,
    },

    #[error("Token {token_id} is not owned by {account}")]
    NotOwner { token_id: U256, account: Address },

    #[error("{operator} is not approved to move assets of {owner}")]
    NotApproved { owner: Address, operator: Address },

    #[error("Token {token_id} does not exist")]
    NonexistentToken { token_id: U256 },

    #[error("Token {token_id} already exists")]
    TokenAlreadyExists { token_id: U256 },

    #[error("Token {token_id} was withdrawn to root and cannot be minted on child")]
    TokenWithdrawnToRoot { token_id: U256 },

    #[error("Duplicate token id {token_id} in batch")]
    DuplicateTokenId { token_id: U256 },

    #[error("{account} is not the minter")]
    NotMinter { account: Address },

    #[error("Ids and amounts length mismatch: {ids} vs {amounts}")]
    LengthMismatch { ids: usize, amounts: usize },

    #[error("Batch of {len} exceeds limit {max}")]
    BatchLimitExceeded { len: usize, max: usize },

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Transfer to the zero address")]
    ZeroAddress,
}
