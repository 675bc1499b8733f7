use crate::fixtures::{drain, tokens, Harness, TEST_SIGNER};
use alloy::primitives::{Address, U256};
use restake_core::application::InstantUnstakeParams;
use restake_core::infrastructure::chain::CallKind;
use restake_core::RestakeError;

fn params(amount_in: U256, unwrap: bool) -> InstantUnstakeParams {
    InstantUnstakeParams { amount_in, amount_out_min: amount_in * U256::from(99u8) / U256::from(100u8), unwrap, ..Default::default() }
}

#[tokio::test]
async fn swap_then_unwrap_runs_in_order_and_reports_every_step() {
    let h = Harness::new();
    let contracts = h.settings.contracts.clone();
    h.chain.set_erc20_balance(contracts.liquid_staking, TEST_SIGNER, tokens(10));
    let (id, mut subscription) = h.watch("swap-happy");

    let outcome = h.orchestrator.instant_unstake(Some(id.clone()), params(tokens(2), true)).await.expect("flow succeeds");

    assert_eq!(h.chain.submitted_labels(), vec!["erc20.approve", "registry.approve", "router.execute", "wrapped.withdraw"]);
    assert_eq!(outcome.allowances.corrections_taken(), 2);
    assert!(outcome.swap.receipt.success);
    assert_eq!(outcome.unwrapped_amount, tokens(2));
    assert!(outcome.unwrap.is_some());
    assert_eq!(h.chain.erc20_balance_of(contracts.liquid_staking, TEST_SIGNER), tokens(8));
    assert_eq!(h.chain.erc20_balance_of(contracts.wrapped_native, TEST_SIGNER), U256::ZERO);
    assert_eq!(h.chain.native_balance_of(TEST_SIGNER), tokens(2));

    let (lines, done) = drain(&mut subscription).await;
    assert!(done);
    let position = |needle: &str| lines.iter().position(|line| line.contains(needle)).unwrap_or(usize::MAX);
    assert!(position("direct allowance to registry: current=0") < position("erc20.approve submitted"));
    assert!(position("erc20.approve confirmed") < position("registry.approve submitted"));
    assert!(position("router.execute confirmed") < position("wrapped.withdraw submitted"));
    assert_eq!(lines.last().map(String::as_str), Some("instant-unstake completed"));
    assert!(!h.bus.is_open(&id));
}

#[tokio::test]
async fn swap_deadline_and_path_come_from_settings() {
    let h = Harness::new();
    h.chain.set_erc20_balance(h.settings.contracts.liquid_staking, TEST_SIGNER, tokens(1));

    h.orchestrator.instant_unstake(None, params(tokens(1), false)).await.expect("flow succeeds");

    let swap = h.chain.submitted().into_iter().find(|call| call.label() == "router.execute").expect("swap submitted");
    assert_eq!(swap.to, h.settings.contracts.swap_router);
    let CallKind::RouterSwap(request) = swap.kind else { panic!("router call expected") };
    assert_eq!(request.fee, 2500);
    assert_eq!(request.deadline, crate::fixtures::TEST_NOW_SECS + 1800);
    assert_eq!(request.recipient, TEST_SIGNER);
    assert_eq!(request.token_out, h.settings.contracts.wrapped_native);
}

#[tokio::test]
async fn zero_post_swap_balance_skips_unwrap_and_still_succeeds() {
    let h = Harness::new();
    h.chain.set_erc20_balance(h.settings.contracts.liquid_staking, TEST_SIGNER, tokens(1));
    h.chain.set_swap_rate_bps(0);
    let (id, mut subscription) = h.watch("swap-nothing-to-unwrap");

    let mut request = params(tokens(1), true);
    request.amount_out_min = U256::ZERO;
    let outcome = h.orchestrator.instant_unstake(Some(id), request).await.expect("flow succeeds");

    assert!(outcome.unwrap.is_none());
    assert_eq!(outcome.unwrapped_amount, U256::ZERO);
    assert!(!h.chain.submitted_labels().contains(&"wrapped.withdraw"));

    let (lines, done) = drain(&mut subscription).await;
    assert!(done);
    assert!(lines.iter().any(|line| line == "no balance to unwrap"));
}

#[tokio::test]
async fn failed_swap_submission_closes_channel_and_never_unwraps() {
    let h = Harness::new();
    h.chain.set_erc20_balance(h.settings.contracts.liquid_staking, TEST_SIGNER, tokens(1));
    h.chain.fail_submits("router.execute");
    let (id, mut subscription) = h.watch("swap-write-failure");

    let err = h.orchestrator.instant_unstake(Some(id.clone()), params(tokens(1), true)).await.expect_err("swap fails");
    assert!(matches!(err, RestakeError::WriteFailure { .. }));
    assert!(!h.chain.submitted_labels().contains(&"wrapped.withdraw"));

    let (lines, done) = drain(&mut subscription).await;
    assert!(done, "channel must complete on failure");
    let last = lines.last().expect("error line");
    assert!(last.starts_with("instant-unstake failed: "));
    assert!(last.contains("injected submission failure"));
    assert!(!h.bus.is_open(&id));
}

#[tokio::test]
async fn slippage_floor_violation_reverts() {
    let h = Harness::new();
    h.chain.set_erc20_balance(h.settings.contracts.liquid_staking, TEST_SIGNER, tokens(1));
    h.chain.set_swap_rate_bps(9_800);

    let err = h.orchestrator.instant_unstake(None, params(tokens(1), true)).await.expect_err("min out not met");
    assert!(matches!(err, RestakeError::Reverted { .. }));
}

#[tokio::test]
async fn malformed_request_touches_nothing_on_chain() {
    let h = Harness::new();
    let (id, mut subscription) = h.watch("swap-malformed");

    let mut request = params(U256::ZERO, true);
    request.fee = Some(1 << 24);
    let err = h.orchestrator.instant_unstake(Some(id), request).await.expect_err("malformed");
    assert!(matches!(err, RestakeError::MalformedInput(_)));
    assert!(h.chain.submitted().is_empty());

    let (_, done) = drain(&mut subscription).await;
    assert!(done);
}

#[tokio::test]
async fn amount_beyond_registry_width_fails_before_any_approval() {
    let h = Harness::new();
    let (id, mut subscription) = h.watch("swap-too-wide");

    let err = h.orchestrator.instant_unstake(Some(id), params(U256::from(1u8) << 160usize, true)).await.expect_err("too wide");
    assert!(matches!(err, RestakeError::MalformedInput(_)));
    assert!(h.chain.submitted().is_empty());

    let (lines, done) = drain(&mut subscription).await;
    assert!(done);
    assert!(lines.last().expect("failure line").starts_with("instant-unstake failed: "));
}

#[tokio::test]
async fn foreign_recipient_is_not_unwrapped() {
    let h = Harness::new();
    h.chain.set_erc20_balance(h.settings.contracts.liquid_staking, TEST_SIGNER, tokens(1));
    let mut request = params(tokens(1), true);
    request.recipient = Some(Address::repeat_byte(0x77));

    let outcome = h.orchestrator.instant_unstake(None, request).await.expect("flow succeeds");
    assert!(outcome.unwrap.is_none());
    assert_eq!(h.chain.erc20_balance_of(h.settings.contracts.wrapped_native, Address::repeat_byte(0x77)), tokens(1));
}
