//! Root chain manager
//!
//! Orchestrates deposits (lock + outbound notice) and exits (proof
//! verification + replay protection + predicate dispatch).
//!
//! # Exit Ordering
//! 1. checkpoint inclusion of the block
//! 2. trie inclusion of the receipt
//! 3. log extraction
//! 4. exit id marked as processed (replays stop here)
//! 5. emitter → root token → asset class → predicate
//! 6. burn log validated against the caller
//! 7. custody released
//!
//! A failure in steps 5-7 unmarks the exit id, so the call leaves no trace.

use std::collections::HashMap;

use alloy_primitives::{Address, Bytes, B256, U256};
use common::{AssetTypeTag, DepositNotice, DepositPayload, MapTokenNotice, Notice, NATIVE_CURRENCY};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::access::{AccessControl, Role};
use crate::checkpoint::{CheckpointHeader, CheckpointStore};
use crate::error::BridgeError;
use crate::exit_tracker::ExitTracker;
use crate::ledger::RootLedger;
use crate::predicate::{Locked, Predicate, Released, TokenPredicate};
use crate::proof::{ExitProof, VerifiedExit};
use crate::registry::PredicateRegistry;

/// A notice handed to the root → child transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundNotice {
    /// Sequence number assigned by the root manager
    pub id: u64,
    pub notice: Notice,
}

impl OutboundNotice {
    pub fn encode(&self) -> Bytes {
        self.notice.encode()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposited {
    pub locked: Locked,
    pub notice: OutboundNotice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exited {
    pub exit_id: B256,
    pub header_id: u64,
    pub block_number: u64,
    pub root_token: Address,
    pub child_token: Address,
    pub released: Released,
}

#[derive(Debug, Clone)]
pub struct RootChainManager {
    access: AccessControl,
    checkpoints: CheckpointStore,
    registry: PredicateRegistry,
    exits: ExitTracker,
    root_to_child: HashMap<Address, Address>,
    child_to_root: HashMap<Address, Address>,
    next_notice_id: u64,
}

impl RootChainManager {
    pub fn new(admin: Address) -> Self {
        Self {
            access: AccessControl::new(admin),
            checkpoints: CheckpointStore::new(),
            registry: PredicateRegistry::new(),
            exits: ExitTracker::new(),
            root_to_child: HashMap::new(),
            child_to_root: HashMap::new(),
            next_notice_id: 1,
        }
    }

    fn outbound(&mut self, notice: Notice) -> OutboundNotice {
        let id = self.next_notice_id;
        self.next_notice_id += 1;
        debug!(notice_id = id, sync_type = %notice.sync_type(), "notice emitted");
        OutboundNotice { id, notice }
    }

    // ========================================================================
    // Administration
    // ========================================================================

    pub fn grant_role(&mut self, caller: Address, role: Role, account: Address) -> Result<(), BridgeError> {
        self.access.grant(caller, role, account)
    }

    pub fn revoke_role(&mut self, caller: Address, role: Role, account: Address) -> Result<(), BridgeError> {
        self.access.revoke(caller, role, account)
    }

    /// Store a checkpoint committed by the checkpoint source.
    pub fn submit_checkpoint(&mut self, caller: Address, header: CheckpointHeader) -> Result<(), BridgeError> {
        self.access.ensure(Role::Admin, caller)?;
        self.checkpoints.submit(header)?;
        info!(
            header_id = header.header_id,
            start_block = header.start_block,
            end_block = header.end_block,
            root = %header.root,
            "checkpoint stored"
        );
        Ok(())
    }

    /// Install the predicate for `tag` holding custody at `address`.
    pub fn register_predicate(
        &mut self,
        caller: Address,
        tag: AssetTypeTag,
        address: Address,
    ) -> Result<Option<Predicate>, BridgeError> {
        self.access.ensure(Role::Admin, caller)?;
        let previous = self
            .registry
            .register_predicate(tag, Predicate::new(tag, address))?;
        info!(%tag, predicate = %address, "predicate registered");
        Ok(previous)
    }

    /// Map a new root token of class `tag` to `child_token` and notify child.
    pub fn map_token(
        &mut self,
        caller: Address,
        root_token: Address,
        child_token: Address,
        tag: AssetTypeTag,
    ) -> Result<OutboundNotice, BridgeError> {
        self.access.ensure(Role::Mapper, caller)?;
        if root_token.is_zero() || child_token.is_zero() {
            return Err(BridgeError::InvalidDeposit {
                reason: "cannot map the zero address".to_string(),
            });
        }
        if self.root_to_child.contains_key(&root_token) || self.child_to_root.contains_key(&child_token) {
            return Err(BridgeError::TokenAlreadyMapped {
                root_token,
                child_token,
            });
        }
        if self.registry.predicate_for_type(tag).is_none() {
            return Err(BridgeError::UnregisteredAsset { asset: root_token });
        }
        self.registry.register_asset_type(root_token, tag)?;
        Ok(self.apply_mapping(root_token, child_token, tag))
    }

    /// Replace the mapping of an already typed root token.
    pub fn remap_token(
        &mut self,
        caller: Address,
        root_token: Address,
        child_token: Address,
    ) -> Result<OutboundNotice, BridgeError> {
        self.access.ensure(Role::Admin, caller)?;
        let tag = self.registry.asset_type_for(root_token)?;
        Ok(self.apply_mapping(root_token, child_token, tag))
    }

    /// Remove the mapping between `root_token` and `child_token`.
    ///
    /// The two must currently be mapped to each other.
    pub fn clean_map_token(
        &mut self,
        caller: Address,
        root_token: Address,
        child_token: Address,
    ) -> Result<(), BridgeError> {
        self.access.ensure(Role::Admin, caller)?;
        match self.root_to_child.get(&root_token) {
            Some(mapped) if *mapped == child_token => {}
            Some(_) => return Err(BridgeError::UnregisteredAsset { asset: child_token }),
            None => return Err(BridgeError::UnregisteredAsset { asset: root_token }),
        }
        self.root_to_child.remove(&root_token);
        self.child_to_root.remove(&child_token);
        info!(%root_token, %child_token, "token mapping cleaned");
        Ok(())
    }

    fn apply_mapping(&mut self, root_token: Address, child_token: Address, tag: AssetTypeTag) -> OutboundNotice {
        if let Some(old_child) = self.root_to_child.remove(&root_token) {
            self.child_to_root.remove(&old_child);
        }
        if let Some(old_root) = self.child_to_root.remove(&child_token) {
            self.root_to_child.remove(&old_root);
        }
        self.root_to_child.insert(root_token, child_token);
        self.child_to_root.insert(child_token, root_token);

        info!(%root_token, %child_token, %tag, "token mapped");
        self.outbound(Notice::MapToken(MapTokenNotice {
            root_token,
            child_token,
            token_type: tag,
        }))
    }

    // ========================================================================
    // Deposits
    // ========================================================================

    /// Lock `payload` worth of `root_token` from `depositor` for `receiver` on child.
    pub fn deposit_for(
        &mut self,
        ledger: &mut RootLedger,
        depositor: Address,
        receiver: Address,
        root_token: Address,
        payload: &[u8],
    ) -> Result<Deposited, BridgeError> {
        if root_token == NATIVE_CURRENCY {
            return Err(BridgeError::InvalidDeposit {
                reason: "native currency deposits go through deposit_ether_for".to_string(),
            });
        }
        self.deposit(ledger, depositor, receiver, root_token, payload)
    }

    /// Lock `amount` of native currency from `depositor` for `receiver` on child.
    pub fn deposit_ether_for(
        &mut self,
        ledger: &mut RootLedger,
        depositor: Address,
        receiver: Address,
        amount: U256,
    ) -> Result<Deposited, BridgeError> {
        let payload = DepositPayload::Amount(amount).encode();
        self.deposit(ledger, depositor, receiver, NATIVE_CURRENCY, &payload)
    }

    fn deposit(
        &mut self,
        ledger: &mut RootLedger,
        depositor: Address,
        receiver: Address,
        root_token: Address,
        payload: &[u8],
    ) -> Result<Deposited, BridgeError> {
        if receiver.is_zero() {
            return Err(BridgeError::InvalidDeposit {
                reason: "receiver is the zero address".to_string(),
            });
        }
        if !self.root_to_child.contains_key(&root_token) {
            return Err(BridgeError::UnregisteredAsset { asset: root_token });
        }
        let predicate = self.registry.predicate_for(root_token)?;
        let locked = predicate.lock(ledger, depositor, receiver, root_token, payload)?;

        info!(%depositor, %receiver, %root_token, asset_type = %locked.asset_type, "deposit locked");
        let notice = self.outbound(Notice::Deposit(DepositNotice {
            receiver,
            root_token,
            payload: Bytes::copy_from_slice(payload),
        }));
        Ok(Deposited { locked, notice })
    }

    // ========================================================================
    // Exits
    // ========================================================================

    /// Redeem the burn proven by `proof` to `caller`.
    pub fn exit(
        &mut self,
        ledger: &mut RootLedger,
        caller: Address,
        proof: &ExitProof,
    ) -> Result<Exited, BridgeError> {
        let header = self.checkpoints.get(proof.header_id)?;
        let verified = proof.verify(header)?;

        if !self.exits.mark_if_unseen(verified.exit_id) {
            warn!(exit_id = %verified.exit_id, "exit replay rejected");
            return Err(BridgeError::AlreadyExited {
                exit_id: verified.exit_id,
            });
        }

        match self.settle_exit(ledger, caller, &verified) {
            Ok(exited) => {
                info!(
                    exit_id = %exited.exit_id,
                    header_id = exited.header_id,
                    %caller,
                    root_token = %exited.root_token,
                    "exit processed"
                );
                Ok(exited)
            }
            Err(err) => {
                self.exits.revert(&verified.exit_id);
                if err.is_fatal() {
                    error!(exit_id = %verified.exit_id, error = %err, "exit hit a custody violation");
                } else {
                    debug!(exit_id = %verified.exit_id, error = %err, "exit rejected");
                }
                Err(err)
            }
        }
    }

    /// Decode a wire-format proof and exit with it.
    pub fn exit_encoded(
        &mut self,
        ledger: &mut RootLedger,
        caller: Address,
        raw: &[u8],
    ) -> Result<Exited, BridgeError> {
        let proof = ExitProof::decode(raw)?;
        self.exit(ledger, caller, &proof)
    }

    fn settle_exit(
        &self,
        ledger: &mut RootLedger,
        caller: Address,
        verified: &VerifiedExit,
    ) -> Result<Exited, BridgeError> {
        let child_token = verified.log.emitter;
        let root_token = self
            .child_to_root
            .get(&child_token)
            .copied()
            .ok_or(BridgeError::UnregisteredAsset { asset: child_token })?;
        let predicate = self.registry.predicate_for(root_token)?;

        predicate.validate_exit_log(caller, &verified.log)?;
        let released = predicate.release_on_exit(ledger, caller, root_token, &verified.log)?;

        Ok(Exited {
            exit_id: verified.exit_id,
            header_id: verified.header_id,
            block_number: verified.block_number,
            root_token,
            child_token,
            released,
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    pub fn checkpoints(&self) -> &CheckpointStore {
        &self.checkpoints
    }

    pub fn registry(&self) -> &PredicateRegistry {
        &self.registry
    }

    pub fn is_exit_processed(&self, exit_id: &B256) -> bool {
        self.exits.is_processed(exit_id)
    }

    pub fn processed_exits(&self) -> usize {
        self.exits.len()
    }

    pub fn root_to_child(&self, root_token: Address) -> Option<Address> {
        self.root_to_child.get(&root_token).copied()
    }

    pub fn child_to_root(&self, child_token: Address) -> Option<Address> {
        self.child_to_root.get(&child_token).copied()
    }
}
