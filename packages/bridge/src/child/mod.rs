//! Child chain side of the bridge

mod manager;
mod token;

pub use manager::{ChildChainManager, NoticeOutcome, TokenMapped};
pub use token::{ChildAsset, ChildToken};
