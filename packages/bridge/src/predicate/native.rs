use alloy_primitives::Address;
use common::{AssetTypeTag, DepositPayload};

use super::fungible::parse_transfer;
use super::{custody_error, expect_burn, Locked, Released, TokenPredicate};
use crate::error::BridgeError;
use crate::ledger::RootLedger;
use crate::receipt::LogEntry;

/// Custody of the root chain's native currency
///
/// The child representation burns with the fungible `Transfer` event, and the
/// amount is read from the log data exactly as for fungible tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeCurrencyPredicate {
    address: Address,
}

impl NativeCurrencyPredicate {
    pub fn new(address: Address) -> Self {
        Self { address }
    }
}

impl TokenPredicate for NativeCurrencyPredicate {
    fn address(&self) -> Address {
        self.address
    }

    fn asset_type(&self) -> AssetTypeTag {
        AssetTypeTag::NativeCurrency
    }

    fn lock(
        &self,
        ledger: &mut RootLedger,
        depositor: Address,
        receiver: Address,
        root_token: Address,
        payload: &[u8],
    ) -> Result<Locked, BridgeError> {
        let assets = DepositPayload::decode(AssetTypeTag::NativeCurrency, payload)?;
        let DepositPayload::Amount(amount) = assets else {
            return Err(BridgeError::InvalidDeposit {
                reason: "native deposit must carry an amount".to_string(),
            });
        };
        ledger
            .native_mut()
            .transfer(depositor, self.address, amount)?;

        tracing::debug!(%depositor, %amount, "native currency locked");
        Ok(Locked {
            depositor,
            receiver,
            root_token,
            asset_type: AssetTypeTag::NativeCurrency,
            assets,
        })
    }

    fn validate_exit_log(&self, withdrawer: Address, log: &LogEntry) -> Result<(), BridgeError> {
        let (from, to, _) = parse_transfer(log)?;
        expect_burn(withdrawer, from, to)
    }

    fn release_on_exit(
        &self,
        ledger: &mut RootLedger,
        withdrawer: Address,
        root_token: Address,
        log: &LogEntry,
    ) -> Result<Released, BridgeError> {
        let (from, to, amount) = parse_transfer(log)?;
        expect_burn(withdrawer, from, to)?;
        ledger
            .native_mut()
            .transfer(self.address, withdrawer, amount)
            .map_err(|e| custody_error(root_token, e))?;

        tracing::debug!(%withdrawer, %amount, "native currency released");
        Ok(Released {
            withdrawer,
            root_token,
            asset_type: AssetTypeTag::NativeCurrency,
            assets: DepositPayload::Amount(amount),
            minted: Vec::new(),
        })
    }
}
