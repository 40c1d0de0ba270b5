//! Token predicates
//!
//! One predicate per asset class owns custody of locked root assets. It takes
//! custody on deposit, decides whether a verified child log is a valid burn by
//! a given withdrawer, and releases (or mints) the matching asset on exit.
//!
//! The set of classes is closed: [`Predicate`] dispatches over the five
//! implementations and the registry stores one instance per tag.

mod fungible;
mod mintable;
mod multi_token;
mod native;
mod non_fungible;

use alloy_primitives::{Address, B256, U256};
use common::{AssetTypeTag, DepositPayload};
use serde::{Deserialize, Serialize};

use crate::error::{AssetError, BridgeError};
use crate::events::topic_address;
use crate::ledger::RootLedger;
use crate::receipt::LogEntry;

pub use fungible::FungiblePredicate;
pub use mintable::MintableNonFungiblePredicate;
pub use multi_token::MultiTokenPredicate;
pub use native::NativeCurrencyPredicate;
pub use non_fungible::NonFungiblePredicate;

/// Emitted when a predicate takes custody for a deposit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locked {
    pub depositor: Address,
    pub receiver: Address,
    pub root_token: Address,
    pub asset_type: AssetTypeTag,
    pub assets: DepositPayload,
}

/// Emitted when a predicate hands assets back on exit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Released {
    pub withdrawer: Address,
    pub root_token: Address,
    pub asset_type: AssetTypeTag,
    pub assets: DepositPayload,
    /// Ids minted rather than transferred out of custody
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub minted: Vec<U256>,
}

pub trait TokenPredicate {
    /// Account holding this predicate's custody in the root ledger
    fn address(&self) -> Address;

    fn asset_type(&self) -> AssetTypeTag;

    /// Take custody of `root_token` from `depositor` as described by `payload`.
    fn lock(
        &self,
        ledger: &mut RootLedger,
        depositor: Address,
        receiver: Address,
        root_token: Address,
        payload: &[u8],
    ) -> Result<Locked, BridgeError>;

    /// Check that `log` is a burn of this class by `withdrawer`. No side effects.
    fn validate_exit_log(&self, withdrawer: Address, log: &LogEntry) -> Result<(), BridgeError>;

    /// Hand the burned assets described by `log` to `withdrawer`.
    fn release_on_exit(
        &self,
        ledger: &mut RootLedger,
        withdrawer: Address,
        root_token: Address,
        log: &LogEntry,
    ) -> Result<Released, BridgeError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Fungible(FungiblePredicate),
    NonFungible(NonFungiblePredicate),
    MintableNonFungible(MintableNonFungiblePredicate),
    MultiToken(MultiTokenPredicate),
    NativeCurrency(NativeCurrencyPredicate),
}

impl Predicate {
    /// The predicate handling `tag`, holding custody at `address`
    pub fn new(tag: AssetTypeTag, address: Address) -> Self {
        match tag {
            AssetTypeTag::Fungible => Predicate::Fungible(FungiblePredicate::new(address)),
            AssetTypeTag::NonFungible => {
                Predicate::NonFungible(NonFungiblePredicate::new(address))
            }
            AssetTypeTag::MintableNonFungible => {
                Predicate::MintableNonFungible(MintableNonFungiblePredicate::new(address))
            }
            AssetTypeTag::MultiToken => Predicate::MultiToken(MultiTokenPredicate::new(address)),
            AssetTypeTag::NativeCurrency => {
                Predicate::NativeCurrency(NativeCurrencyPredicate::new(address))
            }
        }
    }

    fn inner(&self) -> &dyn TokenPredicate {
        match self {
            Predicate::Fungible(p) => p,
            Predicate::NonFungible(p) => p,
            Predicate::MintableNonFungible(p) => p,
            Predicate::MultiToken(p) => p,
            Predicate::NativeCurrency(p) => p,
        }
    }
}

impl TokenPredicate for Predicate {
    fn address(&self) -> Address {
        self.inner().address()
    }

    fn asset_type(&self) -> AssetTypeTag {
        self.inner().asset_type()
    }

    fn lock(
        &self,
        ledger: &mut RootLedger,
        depositor: Address,
        receiver: Address,
        root_token: Address,
        payload: &[u8],
    ) -> Result<Locked, BridgeError> {
        self.inner()
            .lock(ledger, depositor, receiver, root_token, payload)
    }

    fn validate_exit_log(&self, withdrawer: Address, log: &LogEntry) -> Result<(), BridgeError> {
        self.inner().validate_exit_log(withdrawer, log)
    }

    fn release_on_exit(
        &self,
        ledger: &mut RootLedger,
        withdrawer: Address,
        root_token: Address,
        log: &LogEntry,
    ) -> Result<Released, BridgeError> {
        self.inner()
            .release_on_exit(ledger, withdrawer, root_token, log)
    }
}

// ============================================================================
// Burn Log Helpers
// ============================================================================

pub(crate) fn signature(log: &LogEntry) -> B256 {
    log.topics.first().copied().unwrap_or_default()
}

pub(crate) fn expect_signature(log: &LogEntry, expected: B256) -> Result<(), BridgeError> {
    let got = signature(log);
    if got != expected {
        return Err(BridgeError::InvalidSignature { expected, got });
    }
    Ok(())
}

pub(crate) fn expect_topic_count(log: &LogEntry, count: usize) -> Result<(), BridgeError> {
    if log.topics.len() != count {
        return Err(BridgeError::invalid_log(format!(
            "expected {count} topics, got {}",
            log.topics.len()
        )));
    }
    Ok(())
}

pub(crate) fn indexed_address(log: &LogEntry, index: usize) -> Result<Address, BridgeError> {
    log.topic(index)
        .and_then(topic_address)
        .ok_or_else(|| BridgeError::invalid_log(format!("topic {index} is not an address")))
}

/// A burn moves assets from the withdrawer to the zero address.
pub(crate) fn expect_burn(withdrawer: Address, from: Address, to: Address) -> Result<(), BridgeError> {
    if from != withdrawer {
        return Err(BridgeError::InvalidSender {
            expected: withdrawer,
            got: from,
        });
    }
    if !to.is_zero() {
        return Err(BridgeError::InvalidReceiver { got: to });
    }
    Ok(())
}

pub(crate) fn decode_error(err: alloy_sol_types::Error) -> BridgeError {
    BridgeError::invalid_log(err.to_string())
}

/// A ledger refusing to release custody means the predicate does not hold
/// what a verified burn says it should.
pub(crate) fn custody_error(root_token: Address, err: AssetError) -> BridgeError {
    tracing::error!(%root_token, error = %err, "custody violation on release");
    BridgeError::InsufficientCustody {
        asset: root_token,
        reason: err.to_string(),
    }
}
