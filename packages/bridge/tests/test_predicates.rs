//! Exit handling per asset class through the full two-chain flow

mod harness;

use alloy_primitives::{Address, Bytes, U256};

use bridge::{AssetError, BridgeError, DepositPayload};
use harness::*;

// ============================================================================
// Test Setup
// ============================================================================

fn deposit_nfts(bridge: &mut Bridge, root_token: Address, predicate: Address, token_ids: &[U256]) {
    let token = bridge.ledger.non_fungible_mut(root_token).unwrap();
    for id in token_ids {
        token.mint(predicate, USER, *id).unwrap();
    }
    token.set_approval_for_all(USER, predicate, true);
    let payload = DepositPayload::TokenIds(token_ids.to_vec()).encode();
    bridge.deposit(USER, root_token, &payload);
}

fn deposit_multi(bridge: &mut Bridge, token_ids: &[U256], amounts: &[U256]) {
    let token = bridge.ledger.multi_token_mut(ROOT_ERC1155).unwrap();
    token.mint_batch(USER, token_ids, amounts).unwrap();
    token.set_approval_for_all(USER, MULTI_TOKEN_PREDICATE, true);
    let payload = DepositPayload::MultiToken {
        ids: token_ids.to_vec(),
        amounts: amounts.to_vec(),
        data: Bytes::new(),
    }
    .encode();
    bridge.deposit(USER, ROOT_ERC1155, &payload);
}

// ============================================================================
// Non-Fungible
// ============================================================================

#[test]
fn test_non_fungible_batch_round_trip() {
    let mut bridge = Bridge::new();
    deposit_nfts(&mut bridge, ROOT_ERC721, NON_FUNGIBLE_PREDICATE, &ids(&[1, 2, 3]));

    let root = bridge.ledger.non_fungible(ROOT_ERC721).unwrap();
    assert_eq!(root.balance_of(NON_FUNGIBLE_PREDICATE), 3);
    assert_eq!(
        bridge.child.token(CHILD_ERC721).unwrap().owner_of(U256::from(2)),
        Some(USER)
    );

    let log = bridge
        .child_token(CHILD_ERC721)
        .withdraw_batch(USER, &ids(&[3, 1]))
        .unwrap();
    let tx = bridge.include(&[log]);
    bridge.checkpoint();
    let proof = bridge.proof(tx, 0);
    let exited = bridge.root.exit(&mut bridge.ledger, USER, &proof).unwrap();

    assert_eq!(exited.released.assets, DepositPayload::TokenIds(ids(&[3, 1])));
    let root = bridge.ledger.non_fungible(ROOT_ERC721).unwrap();
    assert_eq!(root.owner_of(U256::from(1)), Some(USER));
    assert_eq!(root.owner_of(U256::from(2)), Some(NON_FUNGIBLE_PREDICATE));
    assert_eq!(root.owner_of(U256::from(3)), Some(USER));
    assert_eq!(
        bridge.child.token(CHILD_ERC721).unwrap().owner_of(U256::from(1)),
        None
    );
}

#[test]
fn test_non_fungible_single_withdraw() {
    let mut bridge = Bridge::new();
    deposit_nfts(&mut bridge, ROOT_ERC721, NON_FUNGIBLE_PREDICATE, &ids(&[9]));

    let log = bridge
        .child_token(CHILD_ERC721)
        .withdraw_token(USER, U256::from(9))
        .unwrap();
    let tx = bridge.include(&[log]);
    bridge.checkpoint();
    let proof = bridge.proof(tx, 0);
    bridge.root.exit(&mut bridge.ledger, USER, &proof).unwrap();

    let root = bridge.ledger.non_fungible(ROOT_ERC721).unwrap();
    assert_eq!(root.owner_of(U256::from(9)), Some(USER));
}

#[test]
fn test_non_fungible_rejects_amount_shaped_transfer() {
    let mut bridge = Bridge::new();
    deposit_nfts(&mut bridge, ROOT_ERC721, NON_FUNGIBLE_PREDICATE, &ids(&[4]));

    bridge.fund_erc20(USER, 10);
    let payload = DepositPayload::Amount(U256::from(10)).encode();
    bridge.deposit(USER, ROOT_ERC20, &payload);

    // Same Transfer signature as a non-fungible burn, but the id is not indexed
    let mut log = bridge
        .child_token(CHILD_ERC20)
        .withdraw(USER, U256::from(4))
        .unwrap();
    log.emitter = CHILD_ERC721;
    let tx = bridge.include(&[log]);
    bridge.checkpoint();
    let proof = bridge.proof(tx, 0);

    let err = bridge.root.exit(&mut bridge.ledger, USER, &proof).unwrap_err();
    assert!(matches!(err, BridgeError::InvalidLogData { .. }));
    assert!(!bridge.root.is_exit_processed(&proof.exit_id()));
}

#[test]
fn test_batch_withdraw_limit_enforced_on_child() {
    let mut bridge = Bridge::new();
    let token_ids: Vec<U256> = (1..=21).map(U256::from).collect();
    deposit_nfts(&mut bridge, ROOT_ERC721, NON_FUNGIBLE_PREDICATE, &token_ids[..11]);
    deposit_nfts(&mut bridge, ROOT_ERC721, NON_FUNGIBLE_PREDICATE, &token_ids[11..]);

    let err = bridge
        .child_token(CHILD_ERC721)
        .withdraw_batch(USER, &token_ids)
        .unwrap_err();
    assert_eq!(
        err,
        BridgeError::Asset(AssetError::BatchLimitExceeded { len: 21, max: 20 })
    );
    // Nothing burned
    assert_eq!(bridge.child.token(CHILD_ERC721).unwrap().balance_of(USER), U256::from(21));
}

// ============================================================================
// Mintable Non-Fungible
// ============================================================================

#[test]
fn test_child_minted_token_is_minted_on_root_at_exit() {
    let mut bridge = Bridge::new();
    let id = U256::from(77);

    bridge.child_token(CHILD_MINTABLE).mint(CHILD_MINTER, USER, id).unwrap();
    let log = bridge.child_token(CHILD_MINTABLE).withdraw_token(USER, id).unwrap();
    let tx = bridge.include(&[log]);
    bridge.checkpoint();

    assert!(!bridge.ledger.non_fungible(ROOT_MINTABLE).unwrap().exists(id));
    let proof = bridge.proof(tx, 0);
    let exited = bridge.root.exit(&mut bridge.ledger, USER, &proof).unwrap();

    assert_eq!(exited.released.minted, vec![id]);
    assert_eq!(exited.released.assets, DepositPayload::TokenId(id));
    assert_eq!(
        bridge.ledger.non_fungible(ROOT_MINTABLE).unwrap().owner_of(id),
        Some(USER)
    );
}

#[test]
fn test_withdrawn_mintable_id_cannot_be_reminted_on_child() {
    let mut bridge = Bridge::new();
    let id = U256::from(5);

    bridge.child_token(CHILD_MINTABLE).mint(CHILD_MINTER, USER, id).unwrap();
    bridge.child_token(CHILD_MINTABLE).withdraw_token(USER, id).unwrap();

    let err = bridge
        .child_token(CHILD_MINTABLE)
        .mint(CHILD_MINTER, OTHER, id)
        .unwrap_err();
    assert_eq!(err, BridgeError::Asset(AssetError::TokenWithdrawnToRoot { token_id: id }));
}

#[test]
fn test_mintable_token_returns_through_deposit() {
    let mut bridge = Bridge::new();
    let id = U256::from(12);

    bridge.child_token(CHILD_MINTABLE).mint(CHILD_MINTER, USER, id).unwrap();
    let log = bridge.child_token(CHILD_MINTABLE).withdraw_token(USER, id).unwrap();
    let tx = bridge.include(&[log]);
    bridge.checkpoint();
    let proof = bridge.proof(tx, 0);
    bridge.root.exit(&mut bridge.ledger, USER, &proof).unwrap();

    // Back to child through the predicate
    bridge
        .ledger
        .non_fungible_mut(ROOT_MINTABLE)
        .unwrap()
        .set_approval_for_all(USER, MINTABLE_PREDICATE, true);
    let payload = DepositPayload::TokenId(id).encode();
    bridge.deposit(USER, ROOT_MINTABLE, &payload);
    assert_eq!(
        bridge.ledger.non_fungible(ROOT_MINTABLE).unwrap().owner_of(id),
        Some(MINTABLE_PREDICATE)
    );
    assert_eq!(bridge.child.token(CHILD_MINTABLE).unwrap().owner_of(id), Some(USER));

    // Second exit transfers out of custody instead of minting
    let log = bridge.child_token(CHILD_MINTABLE).withdraw_token(USER, id).unwrap();
    let tx = bridge.include(&[log]);
    bridge.checkpoint();
    let proof = bridge.proof(tx, 0);
    let exited = bridge.root.exit(&mut bridge.ledger, USER, &proof).unwrap();
    assert!(exited.released.minted.is_empty());
    assert_eq!(
        bridge.ledger.non_fungible(ROOT_MINTABLE).unwrap().owner_of(id),
        Some(USER)
    );
}

#[test]
fn test_mintable_batch_mixes_transfer_and_mint() {
    let mut bridge = Bridge::new();
    deposit_nfts(&mut bridge, ROOT_MINTABLE, MINTABLE_PREDICATE, &ids(&[1]));
    bridge
        .child_token(CHILD_MINTABLE)
        .mint(CHILD_MINTER, USER, U256::from(2))
        .unwrap();

    let log = bridge
        .child_token(CHILD_MINTABLE)
        .withdraw_batch(USER, &ids(&[1, 2]))
        .unwrap();
    let tx = bridge.include(&[log]);
    bridge.checkpoint();
    let proof = bridge.proof(tx, 0);
    let exited = bridge.root.exit(&mut bridge.ledger, USER, &proof).unwrap();

    assert_eq!(exited.released.minted, ids(&[2]));
    let root = bridge.ledger.non_fungible(ROOT_MINTABLE).unwrap();
    assert_eq!(root.owner_of(U256::from(1)), Some(USER));
    assert_eq!(root.owner_of(U256::from(2)), Some(USER));
}

// ============================================================================
// Multi-Token
// ============================================================================

#[test]
fn test_multi_token_batch_exit_follows_log_order() {
    let mut bridge = Bridge::new();
    deposit_multi(
        &mut bridge,
        &ids(&[1, 2, 3]),
        &[U256::from(10), U256::from(20), U256::from(30)],
    );

    let log = bridge
        .child_token(CHILD_ERC1155)
        .withdraw_batch_multi(USER, &ids(&[3, 1]), &[U256::from(5), U256::from(4)])
        .unwrap();
    let tx = bridge.include(&[log]);
    bridge.checkpoint();
    let proof = bridge.proof(tx, 0);
    let exited = bridge.root.exit(&mut bridge.ledger, USER, &proof).unwrap();

    let DepositPayload::MultiToken { ids: released, amounts, .. } = exited.released.assets else {
        panic!("expected a multi-token release");
    };
    assert_eq!(released, ids(&[3, 1]));
    assert_eq!(amounts, vec![U256::from(5), U256::from(4)]);

    let root = bridge.ledger.multi_token(ROOT_ERC1155).unwrap();
    assert_eq!(root.balance_of(USER, U256::from(3)), U256::from(5));
    assert_eq!(root.balance_of(USER, U256::from(1)), U256::from(4));
    assert_eq!(root.balance_of(MULTI_TOKEN_PREDICATE, U256::from(1)), U256::from(6));
    assert_eq!(root.balance_of(MULTI_TOKEN_PREDICATE, U256::from(2)), U256::from(20));
    assert_eq!(root.balance_of(MULTI_TOKEN_PREDICATE, U256::from(3)), U256::from(25));
}

#[test]
fn test_multi_token_single_exit() {
    let mut bridge = Bridge::new();
    deposit_multi(&mut bridge, &ids(&[7]), &[U256::from(50)]);

    let log = bridge
        .child_token(CHILD_ERC1155)
        .withdraw_single(USER, U256::from(7), U256::from(50))
        .unwrap();
    let tx = bridge.include(&[log]);
    bridge.checkpoint();
    let proof = bridge.proof(tx, 0);
    bridge.root.exit(&mut bridge.ledger, USER, &proof).unwrap();

    let root = bridge.ledger.multi_token(ROOT_ERC1155).unwrap();
    assert_eq!(root.balance_of(USER, U256::from(7)), U256::from(50));
    assert_eq!(root.balance_of(MULTI_TOKEN_PREDICATE, U256::from(7)), U256::ZERO);
    assert_eq!(
        bridge.child.token(CHILD_ERC1155).unwrap().balance_of_id(USER, U256::from(7)),
        U256::ZERO
    );
}

#[test]
fn test_multi_token_exit_by_other_account_rejected() {
    let mut bridge = Bridge::new();
    deposit_multi(&mut bridge, &ids(&[7]), &[U256::from(50)]);

    let log = bridge
        .child_token(CHILD_ERC1155)
        .withdraw_single(USER, U256::from(7), U256::from(50))
        .unwrap();
    let tx = bridge.include(&[log]);
    bridge.checkpoint();
    let proof = bridge.proof(tx, 0);

    let err = bridge.root.exit(&mut bridge.ledger, OTHER, &proof).unwrap_err();
    assert_eq!(
        err,
        BridgeError::InvalidSender {
            expected: OTHER,
            got: USER
        }
    );
    let root = bridge.ledger.multi_token(ROOT_ERC1155).unwrap();
    assert_eq!(root.balance_of(MULTI_TOKEN_PREDICATE, U256::from(7)), U256::from(50));
}
