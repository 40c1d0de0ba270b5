//! Shared two-chain setup for integration tests

#![allow(dead_code)]

use alloy_primitives::{Address, U256};

use bridge::ledger::{FungibleToken, MultiToken, NonFungibleToken};
use bridge::testing::{MockChildChain, TxRef};
use bridge::{
    AssetTypeTag, CheckpointHeader, ChildChainManager, ChildToken, Deposited, ExitProof, LogEntry,
    NoticeOutcome, OutboundNotice, Role, RootAsset, RootChainManager, RootLedger, NATIVE_CURRENCY,
};

pub const ADMIN: Address = Address::repeat_byte(0xad);
pub const SYNCER: Address = Address::repeat_byte(0x5c);
pub const USER: Address = Address::repeat_byte(0x01);
pub const OTHER: Address = Address::repeat_byte(0x02);

pub const FUNGIBLE_PREDICATE: Address = Address::repeat_byte(0x50);
pub const NON_FUNGIBLE_PREDICATE: Address = Address::repeat_byte(0x51);
pub const MINTABLE_PREDICATE: Address = Address::repeat_byte(0x52);
pub const MULTI_TOKEN_PREDICATE: Address = Address::repeat_byte(0x53);
pub const NATIVE_PREDICATE: Address = Address::repeat_byte(0x54);

pub const ROOT_ERC20: Address = Address::repeat_byte(0x10);
pub const ROOT_ERC721: Address = Address::repeat_byte(0x11);
pub const ROOT_MINTABLE: Address = Address::repeat_byte(0x12);
pub const ROOT_ERC1155: Address = Address::repeat_byte(0x13);

pub const CHILD_ERC20: Address = Address::repeat_byte(0x20);
pub const CHILD_ERC721: Address = Address::repeat_byte(0x21);
pub const CHILD_MINTABLE: Address = Address::repeat_byte(0x22);
pub const CHILD_ERC1155: Address = Address::repeat_byte(0x23);
pub const CHILD_ETHER: Address = Address::repeat_byte(0x24);

/// Child address allowed to mint child-originated mintable ids
pub const CHILD_MINTER: Address = Address::repeat_byte(0x99);

pub fn ids(values: &[u64]) -> Vec<U256> {
    values.iter().map(|v| U256::from(*v)).collect()
}

pub struct Bridge {
    pub root: RootChainManager,
    pub ledger: RootLedger,
    pub child: ChildChainManager,
    pub chain: MockChildChain,
    next_header_id: u64,
}

impl Bridge {
    /// Both chains with every asset class registered, mapped and relayed
    pub fn new() -> Self {
        let mut bridge = Self {
            root: RootChainManager::new(ADMIN),
            ledger: RootLedger::new(),
            child: ChildChainManager::new(ADMIN),
            chain: MockChildChain::new(1_000),
            next_header_id: 10_000,
        };
        bridge
            .child
            .grant_role(ADMIN, Role::StateSyncer, SYNCER)
            .unwrap();

        for (tag, predicate) in [
            (AssetTypeTag::Fungible, FUNGIBLE_PREDICATE),
            (AssetTypeTag::NonFungible, NON_FUNGIBLE_PREDICATE),
            (AssetTypeTag::MintableNonFungible, MINTABLE_PREDICATE),
            (AssetTypeTag::MultiToken, MULTI_TOKEN_PREDICATE),
            (AssetTypeTag::NativeCurrency, NATIVE_PREDICATE),
        ] {
            bridge.root.register_predicate(ADMIN, tag, predicate).unwrap();
        }

        let ledger = &mut bridge.ledger;
        ledger
            .deploy(ROOT_ERC20, RootAsset::Fungible(FungibleToken::new()))
            .unwrap();
        ledger
            .deploy(ROOT_ERC721, RootAsset::NonFungible(NonFungibleToken::new()))
            .unwrap();
        ledger
            .deploy(
                ROOT_MINTABLE,
                RootAsset::NonFungible(NonFungibleToken::with_minter(MINTABLE_PREDICATE)),
            )
            .unwrap();
        ledger
            .deploy(ROOT_ERC1155, RootAsset::MultiToken(MultiToken::new()))
            .unwrap();

        for (root_token, child_token, tag) in [
            (ROOT_ERC20, CHILD_ERC20, AssetTypeTag::Fungible),
            (ROOT_ERC721, CHILD_ERC721, AssetTypeTag::NonFungible),
            (ROOT_MINTABLE, CHILD_MINTABLE, AssetTypeTag::MintableNonFungible),
            (ROOT_ERC1155, CHILD_ERC1155, AssetTypeTag::MultiToken),
            (NATIVE_CURRENCY, CHILD_ETHER, AssetTypeTag::NativeCurrency),
        ] {
            let child = match tag {
                AssetTypeTag::MintableNonFungible => ChildToken::mintable(child_token, CHILD_MINTER),
                _ => ChildToken::new(child_token, tag),
            };
            bridge.child.add_child_token(ADMIN, child).unwrap();
            let notice = bridge
                .root
                .map_token(ADMIN, root_token, child_token, tag)
                .unwrap();
            bridge.relay(&notice);
        }
        bridge
    }

    /// Deliver a root notice to the child manager.
    pub fn relay(&mut self, notice: &OutboundNotice) -> NoticeOutcome {
        self.child
            .on_receive_notice(SYNCER, notice.id, &notice.encode())
            .unwrap()
    }

    /// Mint root ERC20 to `account` and approve the fungible predicate.
    pub fn fund_erc20(&mut self, account: Address, amount: u64) {
        let token = self.ledger.fungible_mut(ROOT_ERC20).unwrap();
        token.mint(account, U256::from(amount)).unwrap();
        token.approve(account, FUNGIBLE_PREDICATE, U256::MAX);
    }

    /// Deposit on root and relay the notice to child.
    pub fn deposit(&mut self, depositor: Address, root_token: Address, payload: &[u8]) -> Deposited {
        let deposited = self
            .root
            .deposit_for(&mut self.ledger, depositor, depositor, root_token, payload)
            .unwrap();
        self.relay(&deposited.notice);
        deposited
    }

    pub fn child_token(&mut self, address: Address) -> &mut ChildToken {
        self.child.token_mut(address).unwrap()
    }

    /// Put a transaction emitting `logs` on the child chain.
    pub fn include(&mut self, logs: &[LogEntry]) -> TxRef {
        self.chain.include(logs)
    }

    /// Checkpoint every pending child block and submit it on root.
    pub fn checkpoint(&mut self) -> CheckpointHeader {
        let header = self.chain.checkpoint(self.next_header_id);
        self.next_header_id += 10_000;
        self.root.submit_checkpoint(ADMIN, header).unwrap();
        header
    }

    pub fn proof(&self, tx: TxRef, log_index: u64) -> ExitProof {
        self.chain.exit_proof(tx, log_index)
    }

    pub fn erc20_balance(&self, account: Address) -> U256 {
        self.ledger.fungible(ROOT_ERC20).unwrap().balance_of(account)
    }
}
