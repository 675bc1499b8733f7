use crate::fixtures::{drain, tokens, Harness, TEST_SIGNER};
use alloy::primitives::{Address, U256};
use restake_core::RestakeError;

#[tokio::test]
async fn stake_moves_native_into_magma_shares() {
    let h = Harness::new();
    h.chain.set_native_balance(TEST_SIGNER, tokens(5));
    let (id, mut subscription) = h.watch("stake-1");

    let outcome = h.orchestrator.stake(Some(id), tokens(2)).await.expect("stake");

    assert!(outcome.receipt.success);
    assert_eq!(outcome.hash, outcome.receipt.tx_hash);
    assert_eq!(h.chain.submitted_labels(), vec!["magma.depositMon"]);
    assert_eq!(h.chain.submitted()[0].value, tokens(2));
    assert_eq!(h.chain.native_balance_of(TEST_SIGNER), tokens(3));
    assert_eq!(h.chain.erc20_balance_of(h.settings.contracts.gmon, TEST_SIGNER), tokens(2));

    let (lines, done) = drain(&mut subscription).await;
    assert!(done);
    assert_eq!(lines.last().map(String::as_str), Some("stake completed"));
}

#[tokio::test]
async fn unstake_without_shares_reports_revert() {
    let h = Harness::new();
    let (id, mut subscription) = h.watch("unstake-empty");

    let err = h.orchestrator.unstake(Some(id), tokens(1)).await.expect_err("nothing to withdraw");
    assert!(matches!(err, RestakeError::Reverted { .. }));

    let (lines, done) = drain(&mut subscription).await;
    assert!(done);
    assert!(lines.iter().any(|line| line.starts_with("magma.withdrawMon reverted")));
    assert!(lines.last().is_some_and(|line| line.starts_with("unstake failed: transaction reverted")));
}

#[tokio::test]
async fn zero_amounts_are_rejected_before_submission() {
    let h = Harness::new();
    assert!(matches!(h.orchestrator.stake(None, U256::ZERO).await, Err(RestakeError::MalformedInput(_))));
    assert!(matches!(h.orchestrator.unstake(None, U256::ZERO).await, Err(RestakeError::MalformedInput(_))));
    assert!(matches!(h.orchestrator.deposit_liquid(None, U256::ZERO, None).await, Err(RestakeError::MalformedInput(_))));
    assert!(matches!(h.orchestrator.request_unlock(None, U256::ZERO).await, Err(RestakeError::MalformedInput(_))));
    assert!(h.chain.submitted().is_empty());
}

#[tokio::test]
async fn liquid_deposit_beyond_96_bits_is_malformed() {
    let h = Harness::new();
    let too_large = U256::from(1u8) << 96;

    let err = h.orchestrator.deposit_liquid(None, too_large, None).await.expect_err("out of range");
    assert!(matches!(err, RestakeError::MalformedInput(_)));
    assert!(h.chain.submitted().is_empty());
}

#[tokio::test]
async fn liquid_deposit_credits_chosen_receiver() {
    let h = Harness::new();
    let receiver = Address::repeat_byte(0x42);
    h.chain.set_native_balance(TEST_SIGNER, tokens(1));

    h.orchestrator.deposit_liquid(None, tokens(1), Some(receiver)).await.expect("deposit");

    assert_eq!(h.chain.erc20_balance_of(h.settings.contracts.liquid_staking, receiver), tokens(1));
    assert_eq!(h.chain.erc20_balance_of(h.settings.contracts.liquid_staking, TEST_SIGNER), U256::ZERO);
}

#[tokio::test]
async fn unlock_then_redeem_submits_both_steps() {
    let h = Harness::new();
    h.chain.set_erc20_balance(h.settings.contracts.liquid_staking, TEST_SIGNER, tokens(4));

    h.orchestrator.request_unlock(None, tokens(4)).await.expect("unlock requested");
    h.orchestrator.redeem(None, U256::from(0u8), None).await.expect("redeemed");

    assert_eq!(h.chain.submitted_labels(), vec!["liquid.requestUnlock", "liquid.redeem"]);
    assert_eq!(h.chain.erc20_balance_of(h.settings.contracts.liquid_staking, TEST_SIGNER), U256::ZERO);
}

#[tokio::test]
async fn balances_report_raw_and_formatted_amounts() {
    let h = Harness::new();
    let contracts = h.settings.contracts.clone();
    h.chain.set_native_balance(TEST_SIGNER, tokens(1) + tokens(1) / U256::from(2u8));
    h.chain.set_erc20_balance(contracts.liquid_staking, TEST_SIGNER, tokens(2));
    h.chain.set_erc20_balance(contracts.gmon, TEST_SIGNER, U256::ZERO);

    let balances = h.orchestrator.balances().await.expect("balances");

    assert_eq!(balances.account, TEST_SIGNER);
    assert_eq!(balances.native.formatted, "1.500000000000000000");
    assert_eq!(balances.liquid_staking.raw, tokens(2));
    assert_eq!(balances.liquid_staking.formatted, "2.000000000000000000");
    assert_eq!(balances.magma.formatted, "0.000000000000000000");
}

#[tokio::test]
async fn read_failures_surface_from_balances() {
    let h = Harness::new();
    h.chain.fail_reads("eth_getBalance");

    let err = h.orchestrator.balances().await.expect_err("read fails");
    assert!(matches!(err, RestakeError::ReadFailure { .. }));
}
