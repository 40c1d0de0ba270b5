//! Common - Shared Types and Codecs for the Checkpoint Bridge
//!
//! This package provides the definitions both sides of the bridge must agree
//! on byte-for-byte:
//!
//! - **Asset classes** - `AssetTypeTag` and its on-wire identifier
//! - **Notices** - the (sync type, payload) messages relayed root → child
//! - **Deposit payloads** - the per-class ABI encoding of amounts and ids

pub mod asset;
pub mod error;
pub mod hash;
pub mod notice;
pub mod payload;

pub use asset::{AssetTypeTag, NATIVE_CURRENCY};
pub use error::CodecError;
pub use hash::keccak256;
pub use notice::{DepositNotice, MapTokenNotice, Notice};
pub use payload::{DepositPayload, BATCH_LIMIT};
