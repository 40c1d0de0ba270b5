//! Child-chain token representations
//!
//! Deposits mint here on behalf of the child manager. Withdrawals burn the
//! caller's balance and return the burn log a root predicate later consumes.

use std::collections::HashSet;

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolEvent;
use common::{AssetTypeTag, DepositPayload, BATCH_LIMIT};

use crate::error::{AssetError, BridgeError};
use crate::events::{IChildERC1155, IChildERC20, IChildERC721};
use crate::ledger::{check_unique, FungibleToken, MultiToken, NonFungibleToken};
use crate::receipt::LogEntry;

#[derive(Debug, Clone)]
pub enum ChildAsset {
    /// Fungible tokens and the child representation of root native currency
    Fungible(FungibleToken),
    NonFungible(NonFungibleToken),
    MintableNonFungible {
        token: NonFungibleToken,
        /// Account allowed to mint child-originated ids
        minter: Address,
        /// Ids currently withdrawn to root
        withdrawn: HashSet<U256>,
    },
    MultiToken(MultiToken),
}

#[derive(Debug, Clone)]
pub struct ChildToken {
    address: Address,
    asset: ChildAsset,
}

fn check_batch(len: usize) -> Result<(), BridgeError> {
    if len == 0 {
        return Err(BridgeError::InvalidDeposit {
            reason: "empty batch".to_string(),
        });
    }
    if len > BATCH_LIMIT {
        return Err(AssetError::BatchLimitExceeded {
            len,
            max: BATCH_LIMIT,
        }
        .into());
    }
    Ok(())
}

impl ChildToken {
    /// Child counterpart of a root asset of class `tag`
    ///
    /// Mintable tokens start with `address` itself as minter; use
    /// [`ChildToken::mintable`] to choose another.
    pub fn new(address: Address, tag: AssetTypeTag) -> Self {
        let asset = match tag {
            AssetTypeTag::Fungible | AssetTypeTag::NativeCurrency => {
                ChildAsset::Fungible(FungibleToken::new())
            }
            AssetTypeTag::NonFungible => ChildAsset::NonFungible(NonFungibleToken::new()),
            AssetTypeTag::MintableNonFungible => ChildAsset::MintableNonFungible {
                token: NonFungibleToken::new(),
                minter: address,
                withdrawn: HashSet::new(),
            },
            AssetTypeTag::MultiToken => ChildAsset::MultiToken(MultiToken::new()),
        };
        Self { address, asset }
    }

    pub fn mintable(address: Address, minter: Address) -> Self {
        Self {
            address,
            asset: ChildAsset::MintableNonFungible {
                token: NonFungibleToken::new(),
                minter,
                withdrawn: HashSet::new(),
            },
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn asset(&self) -> &ChildAsset {
        &self.asset
    }

    fn wrong_kind(&self, expected: &'static str) -> BridgeError {
        AssetError::WrongAssetKind {
            asset: self.address,
            expected,
        }
        .into()
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        match &self.asset {
            ChildAsset::Fungible(token) => token.balance_of(account),
            ChildAsset::NonFungible(token) | ChildAsset::MintableNonFungible { token, .. } => {
                U256::from(token.balance_of(account))
            }
            ChildAsset::MultiToken(_) => U256::ZERO,
        }
    }

    pub fn owner_of(&self, token_id: U256) -> Option<Address> {
        match &self.asset {
            ChildAsset::NonFungible(token) | ChildAsset::MintableNonFungible { token, .. } => {
                token.owner_of(token_id)
            }
            _ => None,
        }
    }

    pub fn balance_of_id(&self, account: Address, id: U256) -> U256 {
        match &self.asset {
            ChildAsset::MultiToken(token) => token.balance_of(account, id),
            _ => U256::ZERO,
        }
    }

    /// Mint the assets described by a deposit payload to `receiver`.
    pub(crate) fn deposit(&mut self, receiver: Address, payload: &[u8]) -> Result<(), BridgeError> {
        match &mut self.asset {
            ChildAsset::Fungible(token) => {
                let DepositPayload::Amount(amount) = DepositPayload::decode(AssetTypeTag::Fungible, payload)? else {
                    return Err(BridgeError::InvalidDeposit {
                        reason: "expected an amount".to_string(),
                    });
                };
                token.mint(receiver, amount)?;
            }
            ChildAsset::NonFungible(token) => {
                let ids = DepositPayload::decode(AssetTypeTag::NonFungible, payload)?
                    .token_ids()
                    .unwrap_or_default();
                mint_all(token, receiver, &ids)?;
            }
            ChildAsset::MintableNonFungible { token, withdrawn, .. } => {
                let ids = DepositPayload::decode(AssetTypeTag::MintableNonFungible, payload)?
                    .token_ids()
                    .unwrap_or_default();
                mint_all(token, receiver, &ids)?;
                for id in &ids {
                    withdrawn.remove(id);
                }
            }
            ChildAsset::MultiToken(token) => {
                let DepositPayload::MultiToken { ids, amounts, .. } =
                    DepositPayload::decode(AssetTypeTag::MultiToken, payload)?
                else {
                    return Err(BridgeError::InvalidDeposit {
                        reason: "expected ids and amounts".to_string(),
                    });
                };
                token.mint_batch(receiver, &ids, &amounts)?;
            }
        }
        Ok(())
    }

    /// Mint a child-originated id. Ids withdrawn to root can only return
    /// through a deposit.
    pub fn mint(&mut self, caller: Address, to: Address, token_id: U256) -> Result<(), BridgeError> {
        let ChildAsset::MintableNonFungible {
            token,
            minter,
            withdrawn,
        } = &mut self.asset
        else {
            return Err(self.wrong_kind("mintable non-fungible"));
        };
        if caller != *minter {
            return Err(AssetError::NotMinter { account: caller }.into());
        }
        if withdrawn.contains(&token_id) {
            return Err(AssetError::TokenWithdrawnToRoot { token_id }.into());
        }
        token.mint(caller, to, token_id)?;
        Ok(())
    }

    pub fn approve(&mut self, owner: Address, spender: Address, amount: U256) -> Result<(), BridgeError> {
        match &mut self.asset {
            ChildAsset::Fungible(token) => {
                token.approve(owner, spender, amount);
                Ok(())
            }
            _ => Err(self.wrong_kind("fungible")),
        }
    }

    pub fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<(), BridgeError> {
        match &mut self.asset {
            ChildAsset::Fungible(token) => Ok(token.transfer(from, to, amount)?),
            _ => Err(self.wrong_kind("fungible")),
        }
    }

    // ========================================================================
    // Withdrawals
    // ========================================================================

    /// Burn `amount` fungible tokens of `caller`.
    pub fn withdraw(&mut self, caller: Address, amount: U256) -> Result<LogEntry, BridgeError> {
        let ChildAsset::Fungible(token) = &mut self.asset else {
            return Err(self.wrong_kind("fungible"));
        };
        token.burn(caller, amount)?;
        let event = IChildERC20::Transfer {
            from: caller,
            to: Address::ZERO,
            value: amount,
        };
        tracing::debug!(token = %self.address, %caller, %amount, "withdraw burned");
        Ok(LogEntry::new(self.address, event.encode_log_data()))
    }

    /// Burn one non-fungible id of `caller`.
    pub fn withdraw_token(&mut self, caller: Address, token_id: U256) -> Result<LogEntry, BridgeError> {
        match &mut self.asset {
            ChildAsset::NonFungible(token) => token.burn(caller, token_id)?,
            ChildAsset::MintableNonFungible { token, withdrawn, .. } => {
                token.burn(caller, token_id)?;
                withdrawn.insert(token_id);
            }
            _ => return Err(self.wrong_kind("non-fungible")),
        }
        let event = IChildERC721::Transfer {
            from: caller,
            to: Address::ZERO,
            tokenId: token_id,
        };
        tracing::debug!(token = %self.address, %caller, %token_id, "withdraw burned");
        Ok(LogEntry::new(self.address, event.encode_log_data()))
    }

    /// Burn up to the batch limit of non-fungible ids of `caller`.
    pub fn withdraw_batch(&mut self, caller: Address, token_ids: &[U256]) -> Result<LogEntry, BridgeError> {
        check_batch(token_ids.len())?;
        match &mut self.asset {
            ChildAsset::NonFungible(token) => token.burn_batch(caller, token_ids)?,
            ChildAsset::MintableNonFungible { token, withdrawn, .. } => {
                token.burn_batch(caller, token_ids)?;
                withdrawn.extend(token_ids.iter().copied());
            }
            _ => return Err(self.wrong_kind("non-fungible")),
        }
        let event = IChildERC721::WithdrawnBatch {
            user: caller,
            tokenIds: token_ids.to_vec(),
        };
        tracing::debug!(token = %self.address, %caller, count = token_ids.len(), "batch withdraw burned");
        Ok(LogEntry::new(self.address, event.encode_log_data()))
    }

    /// Burn `amount` of multi-token `id` held by `caller`.
    pub fn withdraw_single(&mut self, caller: Address, id: U256, amount: U256) -> Result<LogEntry, BridgeError> {
        let ChildAsset::MultiToken(token) = &mut self.asset else {
            return Err(self.wrong_kind("multi-token"));
        };
        token.burn_batch(caller, &[id], &[amount])?;
        let event = IChildERC1155::TransferSingle {
            operator: caller,
            from: caller,
            to: Address::ZERO,
            id,
            value: amount,
        };
        Ok(LogEntry::new(self.address, event.encode_log_data()))
    }

    /// Burn several multi-token balances of `caller` in one log.
    pub fn withdraw_batch_multi(
        &mut self,
        caller: Address,
        ids: &[U256],
        amounts: &[U256],
    ) -> Result<LogEntry, BridgeError> {
        let ChildAsset::MultiToken(token) = &mut self.asset else {
            return Err(self.wrong_kind("multi-token"));
        };
        token.burn_batch(caller, ids, amounts)?;
        let event = IChildERC1155::TransferBatch {
            operator: caller,
            from: caller,
            to: Address::ZERO,
            ids: ids.to_vec(),
            values: amounts.to_vec(),
        };
        Ok(LogEntry::new(self.address, event.encode_log_data()))
    }
}

fn mint_all(token: &mut NonFungibleToken, receiver: Address, ids: &[U256]) -> Result<(), BridgeError> {
    check_batch(ids.len())?;
    check_unique(ids)?;
    if let Some(id) = ids.iter().find(|id| token.exists(**id)) {
        return Err(AssetError::TokenAlreadyExists { token_id: *id }.into());
    }
    if receiver.is_zero() {
        return Err(AssetError::ZeroAddress.into());
    }
    for id in ids {
        token.mint(receiver, receiver, *id)?;
    }
    Ok(())
}
