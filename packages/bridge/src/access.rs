//! Role-based capability checks for privileged operations

use std::collections::HashSet;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Submits checkpoints, registers predicates, grants roles, remaps tokens
    Admin,
    /// Maps new root tokens to child tokens
    Mapper,
    /// Delivers inbound notices on the child side
    StateSyncer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Mapper => "mapper",
            Role::StateSyncer => "state_syncer",
        }
    }
}

/// The admin implicitly holds every role.
#[derive(Debug, Clone)]
pub struct AccessControl {
    admin: Address,
    members: HashSet<(Role, Address)>,
}

impl AccessControl {
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            members: HashSet::new(),
        }
    }

    pub fn admin(&self) -> Address {
        self.admin
    }

    pub fn has_role(&self, role: Role, account: Address) -> bool {
        account == self.admin || self.members.contains(&(role, account))
    }

    pub fn ensure(&self, role: Role, caller: Address) -> Result<(), BridgeError> {
        if self.has_role(role, caller) {
            Ok(())
        } else {
            Err(BridgeError::Unauthorized {
                caller,
                role: role.as_str(),
            })
        }
    }

    pub fn grant(&mut self, caller: Address, role: Role, account: Address) -> Result<(), BridgeError> {
        self.ensure(Role::Admin, caller)?;
        if role == Role::Admin {
            self.admin = account;
        } else {
            self.members.insert((role, account));
        }
        tracing::info!(role = role.as_str(), %account, "role granted");
        Ok(())
    }

    pub fn revoke(&mut self, caller: Address, role: Role, account: Address) -> Result<(), BridgeError> {
        self.ensure(Role::Admin, caller)?;
        self.members.remove(&(role, account));
        tracing::info!(role = role.as_str(), %account, "role revoked");
        Ok(())
    }
}
