use alloy_primitives::{Address, U256};
use alloy_sol_types::SolEvent;
use common::{AssetTypeTag, DepositPayload};

use super::{
    custody_error, decode_error, expect_burn, expect_signature, expect_topic_count,
    indexed_address, Locked, Released, TokenPredicate,
};
use crate::error::BridgeError;
use crate::events::{transfer_signature, IChildERC20};
use crate::ledger::RootLedger;
use crate::receipt::LogEntry;

/// Recover `(from, to, amount)` from a fungible `Transfer` log.
pub(crate) fn parse_transfer(log: &LogEntry) -> Result<(Address, Address, U256), BridgeError> {
    expect_signature(log, transfer_signature())?;
    expect_topic_count(log, 3)?;
    let from = indexed_address(log, 1)?;
    let to = indexed_address(log, 2)?;
    let (amount,) = IChildERC20::Transfer::abi_decode_data(&log.data, true).map_err(decode_error)?;
    Ok((from, to, amount))
}

/// Custody of fungible tokens, pulled from the depositor through an allowance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FungiblePredicate {
    address: Address,
}

impl FungiblePredicate {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    fn burned_amount(&self, withdrawer: Address, log: &LogEntry) -> Result<U256, BridgeError> {
        let (from, to, amount) = parse_transfer(log)?;
        expect_burn(withdrawer, from, to)?;
        Ok(amount)
    }
}

impl TokenPredicate for FungiblePredicate {
    fn address(&self) -> Address {
        self.address
    }

    fn asset_type(&self) -> AssetTypeTag {
        AssetTypeTag::Fungible
    }

    fn lock(
        &self,
        ledger: &mut RootLedger,
        depositor: Address,
        receiver: Address,
        root_token: Address,
        payload: &[u8],
    ) -> Result<Locked, BridgeError> {
        let assets = DepositPayload::decode(AssetTypeTag::Fungible, payload)?;
        let DepositPayload::Amount(amount) = assets else {
            return Err(BridgeError::InvalidDeposit {
                reason: "fungible deposit must carry an amount".to_string(),
            });
        };
        ledger
            .fungible_mut(root_token)?
            .transfer_from(self.address, depositor, self.address, amount)?;

        tracing::debug!(%depositor, %root_token, %amount, "fungible tokens locked");
        Ok(Locked {
            depositor,
            receiver,
            root_token,
            asset_type: AssetTypeTag::Fungible,
            assets,
        })
    }

    fn validate_exit_log(&self, withdrawer: Address, log: &LogEntry) -> Result<(), BridgeError> {
        self.burned_amount(withdrawer, log).map(|_| ())
    }

    fn release_on_exit(
        &self,
        ledger: &mut RootLedger,
        withdrawer: Address,
        root_token: Address,
        log: &LogEntry,
    ) -> Result<Released, BridgeError> {
        let amount = self.burned_amount(withdrawer, log)?;
        ledger
            .fungible_mut(root_token)
            .and_then(|token| token.transfer(self.address, withdrawer, amount))
            .map_err(|e| custody_error(root_token, e))?;

        tracing::debug!(%withdrawer, %root_token, %amount, "fungible tokens released");
        Ok(Released {
            withdrawer,
            root_token,
            asset_type: AssetTypeTag::Fungible,
            assets: DepositPayload::Amount(amount),
            minted: Vec::new(),
        })
    }
}
