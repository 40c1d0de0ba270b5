//! Fungible token balances with allowances

use std::collections::HashMap;

use alloy_primitives::{Address, U256};

use crate::error::AssetError;

#[derive(Debug, Clone, Default)]
pub struct FungibleToken {
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
    total_supply: U256,
}

impl FungibleToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    pub fn approve(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.insert((owner, spender), amount);
    }

    pub fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<(), AssetError> {
        if to.is_zero() {
            return Err(AssetError::ZeroAddress);
        }
        let available = self.balance_of(from);
        if available < amount {
            return Err(AssetError::InsufficientBalance {
                account: from,
                needed: amount,
                available,
            });
        }
        if from != to {
            let credited = self
                .balance_of(to)
                .checked_add(amount)
                .ok_or(AssetError::Overflow)?;
            self.balances.insert(from, available - amount);
            self.balances.insert(to, credited);
        }
        Ok(())
    }

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming allowance.
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), AssetError> {
        let allowed = self.allowance(from, spender);
        if spender != from && allowed < amount {
            return Err(AssetError::InsufficientAllowance {
                owner: from,
                spender,
                needed: amount,
                available: allowed,
            });
        }
        self.transfer(from, to, amount)?;
        if spender != from && allowed != U256::MAX {
            self.allowances.insert((from, spender), allowed - amount);
        }
        Ok(())
    }

    pub fn mint(&mut self, to: Address, amount: U256) -> Result<(), AssetError> {
        if to.is_zero() {
            return Err(AssetError::ZeroAddress);
        }
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(AssetError::Overflow)?;
        // supply bounds every balance
        let balance = self.balance_of(to) + amount;
        self.total_supply = supply;
        self.balances.insert(to, balance);
        Ok(())
    }

    pub fn burn(&mut self, from: Address, amount: U256) -> Result<(), AssetError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(AssetError::InsufficientBalance {
                account: from,
                needed: amount,
                available,
            });
        }
        self.balances.insert(from, available - amount);
        self.total_supply -= amount;
        Ok(())
    }
}
