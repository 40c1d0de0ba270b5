//! Non-fungible token ownership, approvals and minting

use std::collections::{HashMap, HashSet};

use alloy_primitives::{Address, U256};

use crate::error::AssetError;

#[derive(Debug, Clone, Default)]
pub struct NonFungibleToken {
    owners: HashMap<U256, Address>,
    balances: HashMap<Address, usize>,
    approvals: HashMap<U256, Address>,
    operators: HashSet<(Address, Address)>,
    minter: Option<Address>,
}

impl NonFungibleToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token whose ids may only be created by `minter`
    pub fn with_minter(minter: Address) -> Self {
        Self {
            minter: Some(minter),
            ..Self::default()
        }
    }

    pub fn minter(&self) -> Option<Address> {
        self.minter
    }

    pub fn owner_of(&self, token_id: U256) -> Option<Address> {
        self.owners.get(&token_id).copied()
    }

    pub fn exists(&self, token_id: U256) -> bool {
        self.owners.contains_key(&token_id)
    }

    pub fn balance_of(&self, owner: Address) -> usize {
        self.balances.get(&owner).copied().unwrap_or_default()
    }

    pub fn get_approved(&self, token_id: U256) -> Option<Address> {
        self.approvals.get(&token_id).copied()
    }

    pub fn is_approved_for_all(&self, owner: Address, operator: Address) -> bool {
        self.operators.contains(&(owner, operator))
    }

    pub fn approve(&mut self, caller: Address, spender: Address, token_id: U256) -> Result<(), AssetError> {
        let owner = self
            .owner_of(token_id)
            .ok_or(AssetError::NonexistentToken { token_id })?;
        if caller != owner && !self.is_approved_for_all(owner, caller) {
            return Err(AssetError::NotApproved {
                owner,
                operator: caller,
            });
        }
        self.approvals.insert(token_id, spender);
        Ok(())
    }

    pub fn set_approval_for_all(&mut self, owner: Address, operator: Address, approved: bool) {
        if approved {
            self.operators.insert((owner, operator));
        } else {
            self.operators.remove(&(owner, operator));
        }
    }

    fn check_transfer(&self, spender: Address, from: Address, token_id: U256) -> Result<(), AssetError> {
        let owner = self
            .owner_of(token_id)
            .ok_or(AssetError::NonexistentToken { token_id })?;
        if owner != from {
            return Err(AssetError::NotOwner {
                token_id,
                account: from,
            });
        }
        let approved = spender == owner
            || self.is_approved_for_all(owner, spender)
            || self.get_approved(token_id) == Some(spender);
        if !approved {
            return Err(AssetError::NotApproved {
                owner,
                operator: spender,
            });
        }
        Ok(())
    }

    fn move_token(&mut self, from: Address, to: Address, token_id: U256) {
        self.approvals.remove(&token_id);
        self.owners.insert(token_id, to);
        if let Some(balance) = self.balances.get_mut(&from) {
            *balance -= 1;
        }
        *self.balances.entry(to).or_default() += 1;
    }

    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        token_id: U256,
    ) -> Result<(), AssetError> {
        if to.is_zero() {
            return Err(AssetError::ZeroAddress);
        }
        self.check_transfer(spender, from, token_id)?;
        self.move_token(from, to, token_id);
        Ok(())
    }

    /// Transfer every id in `token_ids`, or none of them.
    pub fn batch_transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        token_ids: &[U256],
    ) -> Result<(), AssetError> {
        if to.is_zero() {
            return Err(AssetError::ZeroAddress);
        }
        check_unique(token_ids)?;
        for token_id in token_ids {
            self.check_transfer(spender, from, *token_id)?;
        }
        for token_id in token_ids {
            self.move_token(from, to, *token_id);
        }
        Ok(())
    }

    pub fn mint(&mut self, caller: Address, to: Address, token_id: U256) -> Result<(), AssetError> {
        if let Some(minter) = self.minter {
            if caller != minter {
                return Err(AssetError::NotMinter { account: caller });
            }
        }
        if to.is_zero() {
            return Err(AssetError::ZeroAddress);
        }
        if self.exists(token_id) {
            return Err(AssetError::TokenAlreadyExists { token_id });
        }
        self.owners.insert(token_id, to);
        *self.balances.entry(to).or_default() += 1;
        Ok(())
    }

    /// Destroy `token_id`, which `owner` must hold.
    pub fn burn(&mut self, owner: Address, token_id: U256) -> Result<(), AssetError> {
        match self.owner_of(token_id) {
            None => Err(AssetError::NonexistentToken { token_id }),
            Some(current) if current != owner => Err(AssetError::NotOwner {
                token_id,
                account: owner,
            }),
            Some(_) => {
                self.owners.remove(&token_id);
                self.approvals.remove(&token_id);
                if let Some(balance) = self.balances.get_mut(&owner) {
                    *balance -= 1;
                }
                Ok(())
            }
        }
    }

    /// Destroy every id in `token_ids`, or none of them.
    pub fn burn_batch(&mut self, owner: Address, token_ids: &[U256]) -> Result<(), AssetError> {
        check_unique(token_ids)?;
        for token_id in token_ids {
            match self.owner_of(*token_id) {
                None => {
                    return Err(AssetError::NonexistentToken {
                        token_id: *token_id,
                    })
                }
                Some(current) if current != owner => {
                    return Err(AssetError::NotOwner {
                        token_id: *token_id,
                        account: owner,
                    })
                }
                Some(_) => {}
            }
        }
        for token_id in token_ids {
            self.burn(owner, *token_id)?;
        }
        Ok(())
    }
}

/// Reject batches naming the same id twice.
pub(crate) fn check_unique(token_ids: &[U256]) -> Result<(), AssetError> {
    let mut seen = HashSet::with_capacity(token_ids.len());
    for token_id in token_ids {
        if !seen.insert(*token_id) {
            return Err(AssetError::DuplicateTokenId {
                token_id: *token_id,
            });
        }
    }
    Ok(())
}
