use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolEvent;
use common::{AssetTypeTag, DepositPayload};

use super::{
    custody_error, decode_error, expect_burn, expect_topic_count, indexed_address, signature,
    Locked, Released, TokenPredicate,
};
use crate::error::BridgeError;
use crate::events::{transfer_batch_signature, transfer_single_signature, IChildERC1155};
use crate::ledger::RootLedger;
use crate::receipt::LogEntry;

/// A multi-token burn, decoded in log order
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MultiTokenBurn {
    Single { id: U256, amount: U256 },
    Batch { ids: Vec<U256>, amounts: Vec<U256> },
}

/// Branch on `topics[0]` between `TransferSingle` and `TransferBatch`.
pub(crate) fn parse_burn(withdrawer: Address, log: &LogEntry) -> Result<MultiTokenBurn, BridgeError> {
    let sig = signature(log);
    let single = sig == transfer_single_signature();
    if !single && sig != transfer_batch_signature() {
        return Err(BridgeError::InvalidWithdrawSignature { got: sig });
    }

    // topics: [signature, operator, from, to]
    expect_topic_count(log, 4)?;
    let from = indexed_address(log, 2)?;
    let to = indexed_address(log, 3)?;
    expect_burn(withdrawer, from, to)?;

    if single {
        let (id, amount) =
            IChildERC1155::TransferSingle::abi_decode_data(&log.data, true).map_err(decode_error)?;
        Ok(MultiTokenBurn::Single { id, amount })
    } else {
        let (ids, amounts) =
            IChildERC1155::TransferBatch::abi_decode_data(&log.data, true).map_err(decode_error)?;
        if ids.len() != amounts.len() {
            return Err(BridgeError::invalid_log(format!(
                "ids and values length mismatch: {} vs {}",
                ids.len(),
                amounts.len()
            )));
        }
        Ok(MultiTokenBurn::Batch { ids, amounts })
    }
}

/// Custody of multi-token balances, pulled through operator approval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiTokenPredicate {
    address: Address,
}

impl MultiTokenPredicate {
    pub fn new(address: Address) -> Self {
        Self { address }
    }
}

impl TokenPredicate for MultiTokenPredicate {
    fn address(&self) -> Address {
        self.address
    }

    fn asset_type(&self) -> AssetTypeTag {
        AssetTypeTag::MultiToken
    }

    fn lock(
        &self,
        ledger: &mut RootLedger,
        depositor: Address,
        receiver: Address,
        root_token: Address,
        payload: &[u8],
    ) -> Result<Locked, BridgeError> {
        let assets = DepositPayload::decode(AssetTypeTag::MultiToken, payload)?;
        let DepositPayload::MultiToken { ids, amounts, .. } = &assets else {
            return Err(BridgeError::InvalidDeposit {
                reason: "multi-token deposit must carry ids and amounts".to_string(),
            });
        };
        ledger.multi_token_mut(root_token)?.safe_batch_transfer_from(
            self.address,
            depositor,
            self.address,
            ids,
            amounts,
        )?;

        tracing::debug!(%depositor, %root_token, count = ids.len(), "multi-token balances locked");
        Ok(Locked {
            depositor,
            receiver,
            root_token,
            asset_type: AssetTypeTag::MultiToken,
            assets,
        })
    }

    fn validate_exit_log(&self, withdrawer: Address, log: &LogEntry) -> Result<(), BridgeError> {
        parse_burn(withdrawer, log).map(|_| ())
    }

    fn release_on_exit(
        &self,
        ledger: &mut RootLedger,
        withdrawer: Address,
        root_token: Address,
        log: &LogEntry,
    ) -> Result<Released, BridgeError> {
        let burn = parse_burn(withdrawer, log)?;
        let token = ledger
            .multi_token_mut(root_token)
            .map_err(|e| custody_error(root_token, e))?;

        let (ids, amounts) = match burn {
            MultiTokenBurn::Single { id, amount } => {
                token
                    .safe_transfer_from(self.address, self.address, withdrawer, id, amount)
                    .map_err(|e| custody_error(root_token, e))?;
                (vec![id], vec![amount])
            }
            MultiTokenBurn::Batch { ids, amounts } => {
                token
                    .safe_batch_transfer_from(self.address, self.address, withdrawer, &ids, &amounts)
                    .map_err(|e| custody_error(root_token, e))?;
                (ids, amounts)
            }
        };

        tracing::debug!(%withdrawer, %root_token, count = ids.len(), "multi-token balances released");
        Ok(Released {
            withdrawer,
            root_token,
            asset_type: AssetTypeTag::MultiToken,
            assets: DepositPayload::MultiToken {
                ids,
                amounts,
                data: Bytes::new(),
            },
            minted: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::IChildERC20;
    use crate::ledger::{MultiToken, RootAsset};

    const PREDICATE: Address = Address::repeat_byte(0x53);
    const TOKEN: Address = Address::repeat_byte(0x13);
    const CHILD: Address = Address::repeat_byte(0x23);
    const USER: Address = Address::repeat_byte(0x01);

    fn u(values: &[u64]) -> Vec<U256> {
        values.iter().map(|v| U256::from(*v)).collect()
    }

    fn single_log(from: Address, id: u64, value: u64) -> LogEntry {
        LogEntry::new(
            CHILD,
            IChildERC1155::TransferSingle {
                operator: from,
                from,
                to: Address::ZERO,
                id: U256::from(id),
                value: U256::from(value),
            }
            .encode_log_data(),
        )
    }

    fn batch_log(from: Address, ids: &[u64], values: &[u64]) -> LogEntry {
        LogEntry::new(
            CHILD,
            IChildERC1155::TransferBatch {
                operator: from,
                from,
                to: Address::ZERO,
                ids: u(ids),
                values: u(values),
            }
            .encode_log_data(),
        )
    }

    fn locked_ledger() -> (MultiTokenPredicate, RootLedger) {
        let predicate = MultiTokenPredicate::new(PREDICATE);
        let mut token = MultiToken::new();
        token.mint_batch(USER, &u(&[1, 2, 3]), &u(&[10, 20, 30])).unwrap();
        token.set_approval_for_all(USER, PREDICATE, true);
        let mut ledger = RootLedger::new();
        ledger.deploy(TOKEN, RootAsset::MultiToken(token)).unwrap();

        let payload = DepositPayload::MultiToken {
            ids: u(&[1, 2, 3]),
            amounts: u(&[10, 20, 30]),
            data: Bytes::new(),
        }
        .encode();
        predicate.lock(&mut ledger, USER, USER, TOKEN, &payload).unwrap();
        (predicate, ledger)
    }

    #[test]
    fn test_single_release() {
        let (predicate, mut ledger) = locked_ledger();
        predicate
            .release_on_exit(&mut ledger, USER, TOKEN, &single_log(USER, 2, 5))
            .unwrap();
        let token = ledger.multi_token(TOKEN).unwrap();
        assert_eq!(token.balance_of(USER, U256::from(2)), U256::from(5));
        assert_eq!(token.balance_of(PREDICATE, U256::from(2)), U256::from(15));
    }

    #[test]
    fn test_batch_release_follows_log_order() {
        let (predicate, mut ledger) = locked_ledger();
        let released = predicate
            .release_on_exit(&mut ledger, USER, TOKEN, &batch_log(USER, &[3, 1], &[7, 4]))
            .unwrap();
        assert_eq!(
            released.assets,
            DepositPayload::MultiToken {
                ids: u(&[3, 1]),
                amounts: u(&[7, 4]),
                data: Bytes::new(),
            }
        );
        let token = ledger.multi_token(TOKEN).unwrap();
        assert_eq!(token.balance_of(USER, U256::from(3)), U256::from(7));
        assert_eq!(token.balance_of(USER, U256::from(1)), U256::from(4));
        assert_eq!(token.balance_of(USER, U256::from(2)), U256::ZERO);
    }

    #[test]
    fn test_other_signature_rejected() {
        let predicate = MultiTokenPredicate::new(PREDICATE);
        let log = LogEntry::new(
            CHILD,
            IChildERC20::Transfer {
                from: USER,
                to: Address::ZERO,
                value: U256::from(1),
            }
            .encode_log_data(),
        );
        assert!(matches!(
            predicate.validate_exit_log(USER, &log),
            Err(BridgeError::InvalidWithdrawSignature { .. })
        ));
    }

    #[test]
    fn test_from_is_topic_two() {
        let predicate = MultiTokenPredicate::new(PREDICATE);
        let mut log = single_log(USER, 1, 1);
        // operator differs from the burner; only `from` matters
        log.topics[1] = crate::events::address_topic(Address::repeat_byte(0x77));
        assert!(predicate.validate_exit_log(USER, &log).is_ok());
        assert!(matches!(
            predicate.validate_exit_log(Address::repeat_byte(0x77), &log),
            Err(BridgeError::InvalidSender { .. })
        ));
    }

    #[test]
    fn test_release_beyond_custody_changes_nothing() {
        let (predicate, mut ledger) = locked_ledger();
        let err = predicate
            .release_on_exit(&mut ledger, USER, TOKEN, &batch_log(USER, &[1, 2], &[1, 21]))
            .unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(
            ledger.multi_token(TOKEN).unwrap().balance_of(USER, U256::from(1)),
            U256::ZERO
        );
    }
}
