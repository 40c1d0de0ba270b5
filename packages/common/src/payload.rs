//! Per-class deposit payload encodings.
//!
//! | Class                      | Encoding                                   |
//! |----------------------------|--------------------------------------------|
//! | Fungible / NativeCurrency  | `abi.encode(uint256 amount)`               |
//! | (Mintable)NonFungible      | `abi.encode(uint256 id)` or `abi.encode(uint256[] ids)` |
//! | MultiToken                 | `abi.encode(uint256[] ids, uint256[] amounts, bytes data)` |

use alloy_primitives::{Bytes, U256};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};

use crate::asset::AssetTypeTag;
use crate::error::CodecError;

/// Maximum number of ids a single batch deposit or withdrawal may carry
pub const BATCH_LIMIT: usize = 20;

/// Decoded deposit payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositPayload {
    /// Fungible or native-currency amount
    Amount(U256),
    /// A single non-fungible id
    TokenId(U256),
    /// A batch of non-fungible ids
    TokenIds(Vec<U256>),
    /// Multi-token ids with matching amounts
    MultiToken {
        ids: Vec<U256>,
        amounts: Vec<U256>,
        data: Bytes,
    },
}

impl DepositPayload {
    pub fn encode(&self) -> Bytes {
        let encoded = match self {
            DepositPayload::Amount(value) | DepositPayload::TokenId(value) => value.abi_encode(),
            DepositPayload::TokenIds(ids) => ids.abi_encode(),
            DepositPayload::MultiToken { ids, amounts, data } => {
                (ids.clone(), amounts.clone(), data.clone()).abi_encode_params()
            }
        };
        Bytes::from(encoded)
    }

    /// Decode `raw` according to the encoding used by asset class `tag`.
    pub fn decode(tag: AssetTypeTag, raw: &[u8]) -> Result<Self, CodecError> {
        match tag {
            AssetTypeTag::Fungible | AssetTypeTag::NativeCurrency => {
                if raw.len() != 32 {
                    return Err(CodecError::InvalidPayload {
                        reason: format!("amount payload must be 32 bytes, got {}", raw.len()),
                    });
                }
                Ok(DepositPayload::Amount(U256::abi_decode(raw, true)?))
            }
            AssetTypeTag::NonFungible | AssetTypeTag::MintableNonFungible => {
                if raw.len() == 32 {
                    return Ok(DepositPayload::TokenId(U256::abi_decode(raw, true)?));
                }
                let ids = <Vec<U256>>::abi_decode(raw, true)?;
                if ids.is_empty() {
                    return Err(CodecError::InvalidPayload {
                        reason: "empty token id batch".to_string(),
                    });
                }
                if ids.len() > BATCH_LIMIT {
                    return Err(CodecError::InvalidPayload {
                        reason: format!("batch of {} exceeds limit {}", ids.len(), BATCH_LIMIT),
                    });
                }
                Ok(DepositPayload::TokenIds(ids))
            }
            AssetTypeTag::MultiToken => {
                let (ids, amounts, data) =
                    <(Vec<U256>, Vec<U256>, Bytes)>::abi_decode_params(raw, true)?;
                if ids.len() != amounts.len() {
                    return Err(CodecError::InvalidPayload {
                        reason: format!(
                            "ids and amounts length mismatch: {} vs {}",
                            ids.len(),
                            amounts.len()
                        ),
                    });
                }
                Ok(DepositPayload::MultiToken { ids, amounts, data })
            }
        }
    }

    /// Token ids carried by a non-fungible payload, single or batch.
    pub fn token_ids(&self) -> Option<Vec<U256>> {
        match self {
            DepositPayload::TokenId(id) => Some(vec![*id]),
            DepositPayload::TokenIds(ids) => Some(ids.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_is_single_word() {
        let encoded = DepositPayload::Amount(U256::from(100u64)).encode();
        assert_eq!(encoded.len(), 32);
        assert_eq!(encoded[31], 100);
        assert_eq!(
            DepositPayload::decode(AssetTypeTag::Fungible, &encoded),
            Ok(DepositPayload::Amount(U256::from(100u64)))
        );
    }

    #[test]
    fn test_non_fungible_single_vs_batch() {
        let single = DepositPayload::TokenId(U256::from(7u64)).encode();
        assert_eq!(
            DepositPayload::decode(AssetTypeTag::NonFungible, &single),
            Ok(DepositPayload::TokenId(U256::from(7u64)))
        );

        let ids = vec![U256::from(1u64), U256::from(2u64), U256::from(3u64)];
        let batch = DepositPayload::TokenIds(ids.clone()).encode();
        // offset + length + 3 words
        assert_eq!(batch.len(), 32 * 5);
        let decoded = DepositPayload::decode(AssetTypeTag::MintableNonFungible, &batch).unwrap();
        assert_eq!(decoded.token_ids(), Some(ids));
    }

    #[test]
    fn test_batch_over_limit_rejected() {
        let ids: Vec<U256> = (0..(BATCH_LIMIT as u64 + 1)).map(U256::from).collect();
        let batch = DepositPayload::TokenIds(ids).encode();
        assert!(matches!(
            DepositPayload::decode(AssetTypeTag::NonFungible, &batch),
            Err(CodecError::InvalidPayload { .. })
        ));
    }

    #[test]
    fn test_multi_token_length_mismatch() {
        let raw = (
            vec![U256::from(1u64), U256::from(2u64)],
            vec![U256::from(10u64)],
            Bytes::new(),
        )
            .abi_encode_params();
        assert!(matches!(
            DepositPayload::decode(AssetTypeTag::MultiToken, &raw),
            Err(CodecError::InvalidPayload { .. })
        ));
    }

    #[test]
    fn test_multi_token_decodes_in_order() {
        let payload = DepositPayload::MultiToken {
            ids: vec![U256::from(5u64), U256::from(9u64)],
            amounts: vec![U256::from(50u64), U256::from(90u64)],
            data: Bytes::from_static(b"extra"),
        };
        let decoded = DepositPayload::decode(AssetTypeTag::MultiToken, &payload.encode()).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_short_amount_rejected() {
        assert!(DepositPayload::decode(AssetTypeTag::NativeCurrency, &[0u8; 31]).is_err());
    }
}
