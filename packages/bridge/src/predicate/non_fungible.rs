use alloy_primitives::{Address, U256};
use alloy_sol_types::SolEvent;
use common::{AssetTypeTag, DepositPayload, BATCH_LIMIT};

use super::{
    custody_error, decode_error, expect_burn, expect_topic_count, indexed_address, signature,
    Locked, Released, TokenPredicate,
};
use crate::error::BridgeError;
use crate::events::{transfer_signature, withdrawn_batch_signature, IChildERC721};
use crate::ledger::RootLedger;
use crate::receipt::LogEntry;

/// Ids burned by `withdrawer` according to a non-fungible burn log.
///
/// Accepts a single `Transfer(from, to, tokenId)` to the zero address or a
/// `WithdrawnBatch(user, tokenIds)`.
pub(crate) fn burned_ids(withdrawer: Address, log: &LogEntry) -> Result<Vec<U256>, BridgeError> {
    let sig = signature(log);
    if sig == transfer_signature() {
        expect_topic_count(log, 4)?;
        let from = indexed_address(log, 1)?;
        let to = indexed_address(log, 2)?;
        expect_burn(withdrawer, from, to)?;
        Ok(vec![U256::from_be_bytes(log.topics[3].0)])
    } else if sig == withdrawn_batch_signature() {
        expect_topic_count(log, 2)?;
        let user = indexed_address(log, 1)?;
        if user != withdrawer {
            return Err(BridgeError::InvalidSender {
                expected: withdrawer,
                got: user,
            });
        }
        let (ids,) =
            IChildERC721::WithdrawnBatch::abi_decode_data(&log.data, true).map_err(decode_error)?;
        if ids.is_empty() || ids.len() > BATCH_LIMIT {
            return Err(BridgeError::invalid_log(format!(
                "withdrawn batch of {} ids",
                ids.len()
            )));
        }
        Ok(ids)
    } else {
        Err(BridgeError::InvalidWithdrawSignature { got: sig })
    }
}

/// Pull deposited ids into `custodian` on its own behalf.
pub(crate) fn lock_ids(
    ledger: &mut RootLedger,
    custodian: Address,
    depositor: Address,
    root_token: Address,
    assets: &DepositPayload,
) -> Result<(), BridgeError> {
    let token = ledger.non_fungible_mut(root_token)?;
    match assets {
        DepositPayload::TokenId(id) => token.transfer_from(custodian, depositor, custodian, *id)?,
        DepositPayload::TokenIds(ids) => {
            token.batch_transfer_from(custodian, depositor, custodian, ids)?
        }
        _ => {
            return Err(BridgeError::InvalidDeposit {
                reason: "non-fungible deposit must carry token ids".to_string(),
            })
        }
    }
    Ok(())
}

/// Custody of non-fungible tokens that originate on root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonFungiblePredicate {
    address: Address,
}

impl NonFungiblePredicate {
    pub fn new(address: Address) -> Self {
        Self { address }
    }
}

impl TokenPredicate for NonFungiblePredicate {
    fn address(&self) -> Address {
        self.address
    }

    fn asset_type(&self) -> AssetTypeTag {
        AssetTypeTag::NonFungible
    }

    fn lock(
        &self,
        ledger: &mut RootLedger,
        depositor: Address,
        receiver: Address,
        root_token: Address,
        payload: &[u8],
    ) -> Result<Locked, BridgeError> {
        let assets = DepositPayload::decode(AssetTypeTag::NonFungible, payload)?;
        lock_ids(ledger, self.address, depositor, root_token, &assets)?;

        tracing::debug!(%depositor, %root_token, "non-fungible tokens locked");
        Ok(Locked {
            depositor,
            receiver,
            root_token,
            asset_type: AssetTypeTag::NonFungible,
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
        ledger
            .non_fungible_mut(root_token)
            .and_then(|token| token.batch_transfer_from(self.address, self.address, withdrawer, &ids))
            .map_err(|e| custody_error(root_token, e))?;

        tracing::debug!(%withdrawer, %root_token, count = ids.len(), "non-fungible tokens released");
        let assets = match ids.as_slice() {
            [id] if signature(log) == transfer_signature() => DepositPayload::TokenId(*id),
            _ => DepositPayload::TokenIds(ids),
        };
        Ok(Released {
            withdrawer,
            root_token,
            asset_type: AssetTypeTag::NonFungible,
            assets,
            minted: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::IChildERC1155;
    use crate::ledger::{NonFungibleToken, RootAsset};

    const PREDICATE: Address = Address::repeat_byte(0x50);
    const TOKEN: Address = Address::repeat_byte(0x10);
    const CHILD: Address = Address::repeat_byte(0x20);
    const USER: Address = Address::repeat_byte(0x01);

    fn transfer_log(from: Address, to: Address, id: u64) -> LogEntry {
        LogEntry::new(
            CHILD,
            IChildERC721::Transfer {
                from,
                to,
                tokenId: U256::from(id),
            }
            .encode_log_data(),
        )
    }

    fn batch_log(user: Address, ids: &[u64]) -> LogEntry {
        LogEntry::new(
            CHILD,
            IChildERC721::WithdrawnBatch {
                user,
                tokenIds: ids.iter().map(|id| U256::from(*id)).collect(),
            }
            .encode_log_data(),
        )
    }

    fn ledger_with_ids(ids: &[u64]) -> RootLedger {
        let mut token = NonFungibleToken::new();
        for id in ids {
            token.mint(USER, USER, U256::from(*id)).unwrap();
        }
        token.set_approval_for_all(USER, PREDICATE, true);
        let mut ledger = RootLedger::new();
        ledger.deploy(TOKEN, RootAsset::NonFungible(token)).unwrap();
        ledger
    }

    #[test]
    fn test_single_lock_and_release() {
        let predicate = NonFungiblePredicate::new(PREDICATE);
        let mut ledger = ledger_with_ids(&[7]);

        let payload = DepositPayload::TokenId(U256::from(7)).encode();
        predicate.lock(&mut ledger, USER, USER, TOKEN, &payload).unwrap();
        assert_eq!(ledger.non_fungible(TOKEN).unwrap().owner_of(U256::from(7)), Some(PREDICATE));

        let released = predicate
            .release_on_exit(&mut ledger, USER, TOKEN, &transfer_log(USER, Address::ZERO, 7))
            .unwrap();
        assert_eq!(released.assets, DepositPayload::TokenId(U256::from(7)));
        assert_eq!(ledger.non_fungible(TOKEN).unwrap().owner_of(U256::from(7)), Some(USER));
    }

    #[test]
    fn test_batch_lock_and_release() {
        let predicate = NonFungiblePredicate::new(PREDICATE);
        let mut ledger = ledger_with_ids(&[1, 2, 3]);

        let ids: Vec<U256> = [1u64, 2, 3].iter().map(|id| U256::from(*id)).collect();
        let payload = DepositPayload::TokenIds(ids.clone()).encode();
        predicate.lock(&mut ledger, USER, USER, TOKEN, &payload).unwrap();

        let released = predicate
            .release_on_exit(&mut ledger, USER, TOKEN, &batch_log(USER, &[1, 3]))
            .unwrap();
        assert_eq!(
            released.assets,
            DepositPayload::TokenIds(vec![U256::from(1), U256::from(3)])
        );
        let token = ledger.non_fungible(TOKEN).unwrap();
        assert_eq!(token.owner_of(U256::from(2)), Some(PREDICATE));
        assert_eq!(token.owner_of(U256::from(3)), Some(USER));
    }

    #[test]
    fn test_batch_sender_checked() {
        let predicate = NonFungiblePredicate::new(PREDICATE);
        assert!(matches!(
            predicate.validate_exit_log(USER, &batch_log(Address::repeat_byte(9), &[1])),
            Err(BridgeError::InvalidSender { .. })
        ));
        assert!(matches!(
            predicate.validate_exit_log(USER, &batch_log(USER, &[])),
            Err(BridgeError::InvalidLogData { .. })
        ));
    }

    #[test]
    fn test_unknown_signature() {
        let predicate = NonFungiblePredicate::new(PREDICATE);
        let log = LogEntry::new(
            CHILD,
            IChildERC1155::TransferSingle {
                operator: USER,
                from: USER,
                to: Address::ZERO,
                id: U256::from(1),
                value: U256::from(1),
            }
            .encode_log_data(),
        );
        assert_eq!(
            predicate.validate_exit_log(USER, &log),
            Err(BridgeError::InvalidWithdrawSignature {
                got: IChildERC1155::TransferSingle::SIGNATURE_HASH
            })
        );
    }

    #[test]
    fn test_release_of_unheld_id_is_fatal() {
        let predicate = NonFungiblePredicate::new(PREDICATE);
        let mut ledger = ledger_with_ids(&[7]);
        let err = predicate
            .release_on_exit(&mut ledger, USER, TOKEN, &transfer_log(USER, Address::ZERO, 7))
            .unwrap_err();
        assert!(matches!(err, BridgeError::InsufficientCustody { .. }));
    }
}
