//! Integration tests for the token ledger as seen from its callers.
//!
//! Run with:
//! ```bash
//! cargo test --package labtoken --test token
//! ```

use alloy_primitives::{Address, U256};
use ledger::{EventLog, Transfer};
use setup::{deploy, deploy_with, test_config, INITIAL_SUPPLY};

#[tokio::test]
async fn test_deployer_holds_initial_supply() {
    let fixture = deploy();
    let supply = fixture.units(INITIAL_SUPPLY);

    assert_eq!(fixture.token.total_supply().await.unwrap(), supply);
    assert_eq!(fixture.balance(fixture.owner().address()).await, supply);
    assert_eq!(fixture.balance(fixture.alice().address()).await, U256::ZERO);
    assert_eq!(fixture.token.name(), "LabToken");
    assert_eq!(fixture.token.symbol(), "LAB");
    assert_eq!(fixture.token.decimals(), 18);
}

#[tokio::test]
async fn test_transfer_moves_balance() {
    let fixture = deploy();
    let owner = fixture.owner().address();
    let alice = fixture.alice().address();
    let amount = fixture.units("10");

    let receipt = fixture
        .token
        .transfer(alice, amount)
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();

    println!("✓ Transfer mined in block {}", receipt.block_number);
    println!("  Gas used: {}", receipt.gas_used);

    assert!(receipt.status);
    assert_eq!(receipt.from, owner);
    assert_eq!(receipt.to, fixture.token.address());
    assert_eq!(fixture.balance(alice).await, amount);
    assert_eq!(
        fixture.balance(owner).await,
        fixture.units(INITIAL_SUPPLY) - amount
    );
}

#[tokio::test]
async fn test_transfer_emits_event() {
    let fixture = deploy();
    let owner = fixture.owner().address();
    let alice = fixture.alice().address();
    let amount = fixture.units("1");

    let receipt = fixture
        .token
        .transfer(alice, amount)
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(receipt.logs.len(), 1);
    assert_eq!(receipt.logs[0].address, fixture.token.address());
    assert_eq!(
        receipt.transfer_events(),
        vec![Transfer {
            from: owner,
            to: alice,
            value: amount,
        }]
    );
}

#[tokio::test]
async fn test_transfer_chain_between_holders() {
    let fixture = deploy();
    let alice = fixture.alice();
    let bob = fixture.bob().address();

    fixture
        .token
        .transfer(alice.address(), fixture.units("5"))
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();

    let receipt = fixture
        .token
        .connect(alice)
        .transfer(bob, fixture.units("2"))
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert!(receipt.status);
    assert_eq!(receipt.from, alice.address());
    assert_eq!(fixture.balance(alice.address()).await, fixture.units("3"));
    assert_eq!(fixture.balance(bob).await, fixture.units("2"));
}

#[tokio::test]
async fn test_self_transfer_keeps_balance_and_emits_event() {
    let fixture = deploy();
    let owner = fixture.owner().address();
    let amount = fixture.units("1");

    let receipt = fixture
        .token
        .transfer(owner, amount)
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert!(receipt.status);
    assert_eq!(fixture.balance(owner).await, fixture.units(INITIAL_SUPPLY));
    assert_eq!(
        receipt.transfer_events(),
        vec![Transfer {
            from: owner,
            to: owner,
            value: amount,
        }]
    );
}

#[tokio::test]
async fn test_transfer_more_than_balance_reverts() {
    let fixture = deploy();
    let owner = fixture.owner().address();
    let alice = fixture.alice().address();
    let amount = fixture.units(INITIAL_SUPPLY) + U256::from(1);

    let receipt = fixture
        .token
        .transfer(alice, amount)
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert!(!receipt.status);
    assert_eq!(
        receipt.revert_reason().as_deref(),
        Some("INSUFFICIENT_BALANCE")
    );
    assert!(receipt.logs.is_empty());
    assert_eq!(fixture.balance(owner).await, fixture.units(INITIAL_SUPPLY));
    assert_eq!(fixture.balance(alice).await, U256::ZERO);
}

#[tokio::test]
async fn test_empty_account_cannot_send() {
    let fixture = deploy();
    let owner = fixture.owner().address();

    let receipt = fixture
        .token
        .connect(fixture.alice())
        .transfer(owner, U256::from(1))
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(
        receipt.revert_reason().as_deref(),
        Some("INSUFFICIENT_BALANCE")
    );
}

#[tokio::test]
async fn test_transfer_to_zero_address_reverts() {
    let fixture = deploy();

    let receipt = fixture
        .token
        .transfer(Address::ZERO, fixture.units("1"))
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert!(!receipt.status);
    assert_eq!(receipt.revert_reason().as_deref(), Some("ZERO_ADDRESS"));
    assert_eq!(
        fixture.balance(fixture.owner().address()).await,
        fixture.units(INITIAL_SUPPLY)
    );
}

#[tokio::test]
async fn test_zero_amount_reverts() {
    let fixture = deploy();

    let receipt = fixture
        .token
        .transfer(fixture.alice().address(), U256::ZERO)
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert!(!receipt.status);
    assert_eq!(receipt.revert_reason().as_deref(), Some("AMOUNT_ZERO"));
}

#[tokio::test]
async fn test_zero_amount_checked_before_zero_address() {
    let fixture = deploy();

    let receipt = fixture
        .token
        .transfer(Address::ZERO, U256::ZERO)
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(receipt.revert_reason().as_deref(), Some("AMOUNT_ZERO"));
}

#[tokio::test]
async fn test_zero_address_checked_before_balance() {
    let fixture = deploy();

    let receipt = fixture
        .token
        .connect(fixture.alice())
        .transfer(Address::ZERO, U256::from(1))
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(receipt.revert_reason().as_deref(), Some("ZERO_ADDRESS"));
}

#[tokio::test]
async fn test_supply_is_conserved() {
    let fixture = deploy();
    let owner = fixture.owner().address();
    let alice = fixture.alice();
    let bob = fixture.bob().address();

    fixture
        .token
        .transfer(alice.address(), fixture.units("10"))
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();
    fixture
        .token
        .connect(alice)
        .transfer(bob, fixture.units("4"))
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();

    let sum = fixture.balance(owner).await
        + fixture.balance(alice.address()).await
        + fixture.balance(bob).await;
    let supply = fixture.token.total_supply().await.unwrap();
    assert_eq!(sum, supply);

    let summary = fixture.devnet.node().check_invariants().await.unwrap();
    assert_eq!(summary.holders, 3);
    assert_eq!(summary.balance_sum, supply);
}

#[tokio::test]
async fn test_spending_whole_balance_removes_holder() {
    let fixture = deploy();
    let owner = fixture.owner().address();
    let alice = fixture.alice().address();

    fixture
        .token
        .transfer(alice, fixture.units(INITIAL_SUPPLY))
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();

    let holders = fixture.devnet.node().holders().await.unwrap();
    assert_eq!(holders, vec![(alice, fixture.units(INITIAL_SUPPLY))]);
    assert_eq!(fixture.balance(owner).await, U256::ZERO);
    fixture.devnet.node().check_invariants().await.unwrap();
}

#[tokio::test]
async fn test_transfer_gas_estimate() {
    let fixture = deploy();

    let estimate = fixture
        .token
        .estimate_transfer(fixture.alice().address(), fixture.units("1"))
        .await
        .unwrap();

    println!("✓ Estimated gas: {}", estimate);
    assert!(estimate > 21_000);
    assert!(estimate < 150_000);
}

#[tokio::test]
async fn test_estimate_of_failing_transfer_errors() {
    let fixture = deploy();

    let result = fixture
        .token
        .estimate_transfer(Address::ZERO, fixture.units("1"))
        .await;

    match result {
        Err(devnet::NodeError::Reverted(reason)) => assert_eq!(reason, "ZERO_ADDRESS"),
        other => panic!("Expected revert, got {:?}", other),
    }
}

#[tokio::test]
async fn test_transfer_gas_used() {
    let fixture = deploy();

    let receipt = fixture
        .token
        .transfer(fixture.alice().address(), fixture.units("1"))
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert!(receipt.gas_used > 0);
    assert!(receipt.gas_used < 200_000);
}

#[tokio::test]
async fn test_subscriber_sees_only_successful_transfers() {
    let fixture = deploy();
    let events = EventLog::new();
    fixture
        .devnet
        .node()
        .subscribe(events.clone())
        .await
        .unwrap();

    let alice = fixture.alice().address();
    for amount in [fixture.units("1"), U256::ZERO, fixture.units("2")] {
        fixture
            .token
            .transfer(alice, amount)
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();
    }

    let values: Vec<U256> = events.events().iter().map(|event| event.value).collect();
    assert_eq!(values, vec![fixture.units("1"), fixture.units("2")]);
}

#[tokio::test]
async fn test_zero_initial_supply() {
    let mut config = test_config();
    config.token.initial_supply = "0".to_string();
    let fixture = deploy_with(config);

    assert_eq!(fixture.token.total_supply().await.unwrap(), U256::ZERO);
    assert!(fixture.devnet.node().holders().await.unwrap().is_empty());

    let receipt = fixture
        .token
        .transfer(fixture.alice().address(), U256::from(1))
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();
    assert_eq!(
        receipt.revert_reason().as_deref(),
        Some("INSUFFICIENT_BALANCE")
    );
}
