//! Burn events emitted by child tokens and consumed by root predicates
//!
//! Declared with `sol!` so signature hashes and data layouts come from the
//! Solidity declarations themselves.

use alloy_primitives::{Address, B256};
use alloy_sol_types::{sol, SolEvent};

sol! {
    /// Fungible child token (also used for the native-currency token)
    interface IChildERC20 {
        event Transfer(address indexed from, address indexed to, uint256 value);
    }

    /// Non-fungible child token
    interface IChildERC721 {
        event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);

        /// Emitted by a batch withdrawal instead of one Transfer per id
        event WithdrawnBatch(address indexed user, uint256[] tokenIds);
    }

    /// Multi-token child token
    interface IChildERC1155 {
        event TransferSingle(address indexed operator, address indexed from, address indexed to, uint256 id, uint256 value);
        event TransferBatch(address indexed operator, address indexed from, address indexed to, uint256[] ids, uint256[] values);
    }
}

/// `keccak256("Transfer(address,address,uint256)")`, shared by the fungible
/// and non-fungible Transfer events
pub fn transfer_signature() -> B256 {
    IChildERC20::Transfer::SIGNATURE_HASH
}

pub fn withdrawn_batch_signature() -> B256 {
    IChildERC721::WithdrawnBatch::SIGNATURE_HASH
}

pub fn transfer_single_signature() -> B256 {
    IChildERC1155::TransferSingle::SIGNATURE_HASH
}

pub fn transfer_batch_signature() -> B256 {
    IChildERC1155::TransferBatch::SIGNATURE_HASH
}

/// Left-pad an address into an indexed topic
pub fn address_topic(address: Address) -> B256 {
    address.into_word()
}

/// Recover an address from an indexed topic; the upper 12 bytes must be zero.
pub fn topic_address(topic: &B256) -> Option<Address> {
    if topic[..12].iter().any(|b| *b != 0) {
        return None;
    }
    Some(Address::from_slice(&topic[12..]))
}
