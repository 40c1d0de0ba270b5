use alloy_primitives::{Address, U256};
use common::{AssetTypeTag, DepositPayload};

use super::non_fungible::{burned_ids, lock_ids};
use super::{custody_error, signature, Locked, Released, TokenPredicate};
use crate::error::{AssetError, BridgeError};
use crate::events::transfer_signature;
use crate::ledger::{check_unique, RootLedger};
use crate::receipt::LogEntry;

/// Custody of non-fungible tokens that may originate on child
///
/// Ids minted on child have never been locked on root, so release mints any
/// id the predicate does not already hold. The predicate must be the root
/// token's minter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintableNonFungiblePredicate {
    address: Address,
}

impl MintableNonFungiblePredicate {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// Split `ids` into held ids (transfer) and absent ids (mint), failing if
    /// any id is held by someone else.
    fn plan_release(
        &self,
        ledger: &RootLedger,
        root_token: Address,
        ids: &[U256],
    ) -> Result<(Vec<U256>, Vec<U256>), AssetError> {
        check_unique(ids)?;
        let token = ledger.non_fungible(root_token)?;
        let mut held = Vec::new();
        let mut absent = Vec::new();
        for id in ids {
            match token.owner_of(*id) {
                Some(owner) if owner == self.address => held.push(*id),
                Some(_) => {
                    return Err(AssetError::NotOwner {
                        token_id: *id,
                        account: self.address,
                    })
                }
                None => absent.push(*id),
            }
        }
        if !absent.is_empty() && token.minter().is_some_and(|minter| minter != self.address) {
            return Err(AssetError::NotMinter {
                account: self.address,
            });
        }
        Ok((held, absent))
    }
}

impl TokenPredicate for MintableNonFungiblePredicate {
    fn address(&self) -> Address {
        self.address
    }

    fn asset_type(&self) -> AssetTypeTag {
        AssetTypeTag::MintableNonFungible
    }

    fn lock(
        &self,
        ledger: &mut RootLedger,
        depositor: Address,
        receiver: Address,
        root_token: Address,
        payload: &[u8],
    ) -> Result<Locked, BridgeError> {
        let assets = DepositPayload::decode(AssetTypeTag::MintableNonFungible, payload)?;
        lock_ids(ledger, self.address, depositor, root_token, &assets)?;

        tracing::debug!(%depositor, %root_token, "mintable tokens locked");
        Ok(Locked {
            depositor,
            receiver,
            root_token,
            asset_type: AssetTypeTag::MintableNonFungible,
            assets,
        })
    }

    fn validate_exit_log(&self, withdrawer: Address, log: &LogEntry) -> Result<(), BridgeError> {
        burned_ids(withdrawer, log).map(|_| ())
    }

    fn release_on_exit(
        &self,
        ledger: &mut RootLedger,
        withdrawer: Address,
        root_token: Address,
        log: &LogEntry,
    ) -> Result<Released, BridgeError> {
        let ids = burned_ids(withdrawer, log)?;
        let (held, absent) = self
            .plan_release(ledger, root_token, &ids)
            .map_err(|e| custody_error(root_token, e))?;

        let token = ledger
            .non_fungible_mut(root_token)
            .map_err(|e| custody_error(root_token, e))?;
        token
            .batch_transfer_from(self.address, self.address, withdrawer, &held)
            .map_err(|e| custody_error(root_token, e))?;
        for id in &absent {
            token
                .mint(self.address, withdrawer, *id)
                .map_err(|e| custody_error(root_token, e))?;
        }

        tracing::debug!(
            %withdrawer,
            %root_token,
            transferred = held.len(),
            minted = absent.len(),
            "mintable tokens released"
        );
        let assets = match ids.as_slice() {
            [id] if signature(log) == transfer_signature() => DepositPayload::TokenId(*id),
            _ => DepositPayload::TokenIds(ids),
        };
        Ok(Released {
            withdrawer,
            root_token,
            asset_type: AssetTypeTag::MintableNonFungible,
            assets,
            minted: absent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::IChildERC721;
    use crate::ledger::{NonFungibleToken, RootAsset};
    use alloy_primitives::B256;
    use alloy_sol_types::SolEvent;

    const PREDICATE: Address = Address::repeat_byte(0x51);
    const TOKEN: Address = Address::repeat_byte(0x11);
    const CHILD: Address = Address::repeat_byte(0x21);
    const USER: Address = Address::repeat_byte(0x01);

    fn ledger() -> RootLedger {
        let mut ledger = RootLedger::new();
        ledger
            .deploy(
                TOKEN,
                RootAsset::NonFungible(NonFungibleToken::with_minter(PREDICATE)),
            )
            .unwrap();
        ledger
    }

    fn batch_log(ids: &[u64]) -> LogEntry {
        LogEntry::new(
            CHILD,
            IChildERC721::WithdrawnBatch {
                user: USER,
                tokenIds: ids.iter().map(|id| U256::from(*id)).collect(),
            }
            .encode_log_data(),
        )
    }

    #[test]
    fn test_mints_child_originated_id() {
        let predicate = MintableNonFungiblePredicate::new(PREDICATE);
        let mut ledger = ledger();
        let log = LogEntry::new(
            CHILD,
            IChildERC721::Transfer {
                from: USER,
                to: Address::ZERO,
                tokenId: U256::from(42),
            }
            .encode_log_data(),
        );

        let released = predicate
            .release_on_exit(&mut ledger, USER, TOKEN, &log)
            .unwrap();
        assert_eq!(released.minted, vec![U256::from(42)]);
        assert_eq!(ledger.non_fungible(TOKEN).unwrap().owner_of(U256::from(42)), Some(USER));
    }

    #[test]
    fn test_mixed_batch_transfers_held_and_mints_absent() {
        let predicate = MintableNonFungiblePredicate::new(PREDICATE);
        let mut ledger = ledger();
        ledger
            .non_fungible_mut(TOKEN)
            .unwrap()
            .mint(PREDICATE, PREDICATE, U256::from(1))
            .unwrap();

        let released = predicate
            .release_on_exit(&mut ledger, USER, TOKEN, &batch_log(&[1, 2]))
            .unwrap();
        assert_eq!(released.minted, vec![U256::from(2)]);
        let token = ledger.non_fungible(TOKEN).unwrap();
        assert_eq!(token.owner_of(U256::from(1)), Some(USER));
        assert_eq!(token.owner_of(U256::from(2)), Some(USER));
    }

    #[test]
    fn test_id_held_elsewhere_is_fatal() {
        let predicate = MintableNonFungiblePredicate::new(PREDICATE);
        let mut ledger = ledger();
        ledger
            .non_fungible_mut(TOKEN)
            .unwrap()
            .mint(PREDICATE, Address::repeat_byte(7), U256::from(2))
            .unwrap();

        assert_eq!(
            predicate.plan_release(&ledger, TOKEN, &[U256::from(3), U256::from(2)]),
            Err(AssetError::NotOwner {
                token_id: U256::from(2),
                account: PREDICATE,
            })
        );

        let err = predicate
            .release_on_exit(&mut ledger, USER, TOKEN, &batch_log(&[3, 2]))
            .unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(
            err,
            BridgeError::InsufficientCustody {
                asset: TOKEN,
                reason: format!("Token 2 is not owned by {PREDICATE}"),
            }
        );
        // nothing minted for id 3
        assert!(!ledger.non_fungible(TOKEN).unwrap().exists(U256::from(3)));
    }

    #[test]
    fn test_unknown_signature() {
        let predicate = MintableNonFungiblePredicate::new(PREDICATE);
        let mut log = batch_log(&[1]);
        log.topics[0] = B256::repeat_byte(0xde);
        assert!(matches!(
            predicate.validate_exit_log(USER, &log),
            Err(BridgeError::InvalidWithdrawSignature { .. })
        ));
    }
}
