use std::collections::HashMap;

use alloy_primitives::Address;
use common::{CodecError, DepositNotice, MapTokenNotice, Notice};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::token::ChildToken;
use crate::access::{AccessControl, Role};
use crate::error::{AssetError, BridgeError};

/// Emitted whenever the root↔child mapping changes on child
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMapped {
    pub root_token: Address,
    pub child_token: Address,
}

/// What an inbound notice did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeOutcome {
    Deposited {
        receiver: Address,
        root_token: Address,
        child_token: Address,
    },
    Mapped(TokenMapped),
}

/// Child-side counterpart of the root manager
///
/// Receives notices from the state-sync transport, keeps the root↔child
/// registry and mints deposits into the mapped child tokens.
#[derive(Debug, Clone)]
pub struct ChildChainManager {
    access: AccessControl,
    root_to_child: HashMap<Address, Address>,
    child_to_root: HashMap<Address, Address>,
    tokens: HashMap<Address, ChildToken>,
}

impl ChildChainManager {
    pub fn new(admin: Address) -> Self {
        Self {
            access: AccessControl::new(admin),
            root_to_child: HashMap::new(),
            child_to_root: HashMap::new(),
            tokens: HashMap::new(),
        }
    }

    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    pub fn grant_role(&mut self, caller: Address, role: Role, account: Address) -> Result<(), BridgeError> {
        self.access.grant(caller, role, account)
    }

    pub fn revoke_role(&mut self, caller: Address, role: Role, account: Address) -> Result<(), BridgeError> {
        self.access.revoke(caller, role, account)
    }

    /// Deploy a child token under management.
    pub fn add_child_token(&mut self, caller: Address, token: ChildToken) -> Result<(), BridgeError> {
        self.access.ensure(Role::Admin, caller)?;
        let address = token.address();
        if address.is_zero() {
            return Err(AssetError::ZeroAddress.into());
        }
        if self.tokens.contains_key(&address) {
            return Err(AssetError::AlreadyDeployed { asset: address }.into());
        }
        self.tokens.insert(address, token);
        Ok(())
    }

    /// Map `root_token` to `child_token`, dropping any mapping either side had.
    pub fn map_token(
        &mut self,
        caller: Address,
        root_token: Address,
        child_token: Address,
    ) -> Result<TokenMapped, BridgeError> {
        self.access.ensure(Role::Mapper, caller)?;
        Ok(self.apply_mapping(root_token, child_token))
    }

    fn apply_mapping(&mut self, root_token: Address, child_token: Address) -> TokenMapped {
        if let Some(old_child) = self.root_to_child.remove(&root_token) {
            self.child_to_root.remove(&old_child);
        }
        if let Some(old_root) = self.child_to_root.remove(&child_token) {
            self.root_to_child.remove(&old_root);
        }
        self.root_to_child.insert(root_token, child_token);
        self.child_to_root.insert(child_token, root_token);

        info!(%root_token, %child_token, "token mapped");
        TokenMapped {
            root_token,
            child_token,
        }
    }

    /// Handle notice `id` relayed from root.
    pub fn on_receive_notice(
        &mut self,
        caller: Address,
        id: u64,
        payload: &[u8],
    ) -> Result<NoticeOutcome, BridgeError> {
        self.access.ensure(Role::StateSyncer, caller)?;

        let notice = Notice::decode(payload).map_err(|e| match e {
            CodecError::UnsupportedNoticeType { sync_type } => {
                warn!(notice_id = id, %sync_type, "unsupported notice type");
                BridgeError::UnsupportedNoticeType { sync_type }
            }
            other => BridgeError::Codec(other),
        })?;

        match notice {
            Notice::Deposit(DepositNotice {
                receiver,
                root_token,
                payload: deposit_data,
            }) => {
                let child_token = self
                    .root_to_child
                    .get(&root_token)
                    .copied()
                    .ok_or(BridgeError::UnregisteredAsset { asset: root_token })?;
                let token = self
                    .tokens
                    .get_mut(&child_token)
                    .ok_or(BridgeError::UnregisteredAsset { asset: child_token })?;
                token.deposit(receiver, &deposit_data)?;

                debug!(notice_id = id, %receiver, %root_token, %child_token, "deposit minted");
                Ok(NoticeOutcome::Deposited {
                    receiver,
                    root_token,
                    child_token,
                })
            }
            Notice::MapToken(MapTokenNotice {
                root_token,
                child_token,
                ..
            }) => Ok(NoticeOutcome::Mapped(
                self.apply_mapping(root_token, child_token),
            )),
        }
    }

    pub fn root_to_child(&self, root_token: Address) -> Option<Address> {
        self.root_to_child.get(&root_token).copied()
    }

    pub fn child_to_root(&self, child_token: Address) -> Option<Address> {
        self.child_to_root.get(&child_token).copied()
    }

    pub fn token(&self, address: Address) -> Option<&ChildToken> {
        self.tokens.get(&address)
    }

    /// Direct access for user-facing token calls (withdrawals, transfers)
    pub fn token_mut(&mut self, address: Address) -> Option<&mut ChildToken> {
        self.tokens.get_mut(&address)
    }
}
