//! Multi-token balances keyed by (id, account)

use std::collections::{HashMap, HashSet};

use alloy_primitives::{Address, U256};

use crate::error::AssetError;

#[derive(Debug, Clone, Default)]
pub struct MultiToken {
    balances: HashMap<(U256, Address), U256>,
    operators: HashSet<(Address, Address)>,
}

/// Sum `amounts` per id so batches repeating an id are checked against the
/// combined amount.
fn aggregate(ids: &[U256], amounts: &[U256]) -> Result<Vec<(U256, U256)>, AssetError> {
    if ids.len() != amounts.len() {
        return Err(AssetError::LengthMismatch {
            ids: ids.len(),
            amounts: amounts.len(),
        });
    }
    let mut totals: Vec<(U256, U256)> = Vec::with_capacity(ids.len());
    for (id, amount) in ids.iter().zip(amounts) {
        match totals.iter_mut().find(|(seen, _)| seen == id) {
            Some((_, total)) => *total = total.checked_add(*amount).ok_or(AssetError::Overflow)?,
            None => totals.push((*id, *amount)),
        }
    }
    Ok(totals)
}

impl MultiToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, account: Address, id: U256) -> U256 {
        self.balances
            .get(&(id, account))
            .copied()
            .unwrap_or_default()
    }

    pub fn is_approved_for_all(&self, owner: Address, operator: Address) -> bool {
        self.operators.contains(&(owner, operator))
    }

    pub fn set_approval_for_all(&mut self, owner: Address, operator: Address, approved: bool) {
        if approved {
            self.operators.insert((owner, operator));
        } else {
            self.operators.remove(&(owner, operator));
        }
    }

    fn check_debit(&self, from: Address, totals: &[(U256, U256)]) -> Result<(), AssetError> {
        for (id, needed) in totals {
            let available = self.balance_of(from, *id);
            if available < *needed {
                return Err(AssetError::InsufficientBalance {
                    account: from,
                    needed: *needed,
                    available,
                });
            }
        }
        Ok(())
    }

    fn check_credit(&self, to: Address, totals: &[(U256, U256)]) -> Result<(), AssetError> {
        for (id, amount) in totals {
            self.balance_of(to, *id)
                .checked_add(*amount)
                .ok_or(AssetError::Overflow)?;
        }
        Ok(())
    }

    fn debit(&mut self, from: Address, totals: &[(U256, U256)]) {
        for (id, amount) in totals {
            let balance = self.balance_of(from, *id);
            self.balances.insert((*id, from), balance - *amount);
        }
    }

    fn credit(&mut self, to: Address, totals: &[(U256, U256)]) {
        for (id, amount) in totals {
            let balance = self.balance_of(to, *id);
            self.balances.insert((*id, to), balance + *amount);
        }
    }

    pub fn safe_transfer_from(
        &mut self,
        operator: Address,
        from: Address,
        to: Address,
        id: U256,
        amount: U256,
    ) -> Result<(), AssetError> {
        self.safe_batch_transfer_from(operator, from, to, &[id], &[amount])
    }

    pub fn safe_batch_transfer_from(
        &mut self,
        operator: Address,
        from: Address,
        to: Address,
        ids: &[U256],
        amounts: &[U256],
    ) -> Result<(), AssetError> {
        if to.is_zero() {
            return Err(AssetError::ZeroAddress);
        }
        if operator != from && !self.is_approved_for_all(from, operator) {
            return Err(AssetError::NotApproved {
                owner: from,
                operator,
            });
        }
        let totals = aggregate(ids, amounts)?;
        self.check_debit(from, &totals)?;
        if from == to {
            return Ok(());
        }
        self.check_credit(to, &totals)?;
        self.debit(from, &totals);
        self.credit(to, &totals);
        Ok(())
    }

    pub fn mint_batch(&mut self, to: Address, ids: &[U256], amounts: &[U256]) -> Result<(), AssetError> {
        if to.is_zero() {
            return Err(AssetError::ZeroAddress);
        }
        let totals = aggregate(ids, amounts)?;
        self.check_credit(to, &totals)?;
        self.credit(to, &totals);
        Ok(())
    }

    pub fn burn_batch(&mut self, from: Address, ids: &[U256], amounts: &[U256]) -> Result<(), AssetError> {
        let totals = aggregate(ids, amounts)?;
        self.check_debit(from, &totals)?;
        self.debit(from, &totals);
        Ok(())
    }
}
