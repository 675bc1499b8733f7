use crate::fixtures::{tokens, Harness, ONE_YEAR_SECS, TEST_NOW_SECS, TEST_SIGNER};
use alloy::primitives::U256;
use restake_core::domain::{is_sufficient, DELEGATED_AMOUNT_BITS};
use restake_core::foundation::util::amount::max_for_bits;
use restake_core::infrastructure::chain::CallKind;
use restake_core::infrastructure::logbus::OperationLog;
use restake_core::RestakeError;

fn silent(h: &Harness) -> OperationLog {
    OperationLog::new(h.bus.clone(), None)
}

#[test]
fn sufficiency_rule_holds_across_edges() {
    let now = TEST_NOW_SECS;
    let cases = [
        (1000u64, 1000u64, None, true),
        (999, 1000, None, false),
        (1000, 1000, Some(now), false),
        (1000, 1000, Some(now + 1), true),
        (0, 0, None, true),
    ];
    for (current, required, expires_at, expected) in cases {
        assert_eq!(
            is_sufficient(U256::from(current), U256::from(required), expires_at, now),
            expected,
            "current={current} required={required} expires_at={expires_at:?}"
        );
    }
}

#[tokio::test]
async fn zero_allowances_are_corrected_direct_first_with_max_amounts() {
    let h = Harness::new();
    let report = h.resolver().resolve(h.swap_target(U256::from(1000u32)), &silent(&h)).await.expect("resolve");

    let submitted = h.chain.submitted();
    assert_eq!(submitted.len(), 2);
    match &submitted[0].kind {
        CallKind::Erc20Approve { spender, amount, .. } => {
            assert_eq!(*spender, h.settings.contracts.allowance_registry);
            assert_eq!(*amount, U256::MAX);
        }
        other => panic!("expected direct approval first, got {other:?}"),
    }
    match &submitted[1].kind {
        CallKind::RegistryApprove { spender, amount, expiration, .. } => {
            assert_eq!(*spender, h.settings.contracts.swap_router);
            assert_eq!(*amount, max_for_bits(DELEGATED_AMOUNT_BITS));
            assert_eq!(*expiration, TEST_NOW_SECS + ONE_YEAR_SECS);
        }
        other => panic!("expected delegated approval second, got {other:?}"),
    }

    assert!(report.direct.action_taken && report.direct.tx_ref.is_some());
    assert!(report.delegated.action_taken && report.delegated.tx_ref.is_some());
    assert_eq!(report.corrections_taken(), 2);
}

#[tokio::test]
async fn expired_short_delegation_is_flagged_and_renewed_for_a_year() {
    let h = Harness::new();
    let token = h.settings.contracts.liquid_staking;
    h.chain.set_erc20_allowance(token, TEST_SIGNER, h.settings.contracts.allowance_registry, U256::MAX);
    h.chain.set_registry_allowance(TEST_SIGNER, token, h.settings.contracts.swap_router, U256::from(500u32), TEST_NOW_SECS - 1);

    let target = h.swap_target(U256::from(1000u32));
    let inspected = h.resolver().inspect(target, &silent(&h)).await.expect("inspect");
    assert!(inspected.direct.sufficient);
    assert!(!inspected.delegated.sufficient);
    assert!(inspected.delegated.expired);

    let report = h.resolver().resolve(target, &silent(&h)).await.expect("resolve");
    assert!(!report.direct.action_taken);
    assert!(report.delegated.action_taken);
    assert_eq!(report.delegated.expires_at, Some(TEST_NOW_SECS + 31_536_000));
    assert_eq!(h.chain.submitted_labels(), vec!["registry.approve"]);
}

#[tokio::test]
async fn second_resolve_on_sufficient_state_submits_nothing() {
    let h = Harness::new();
    let target = h.swap_target(tokens(5));
    h.resolver().resolve(target, &silent(&h)).await.expect("first");
    let after_first = h.chain.submitted().len();

    let report = h.resolver().resolve(target, &silent(&h)).await.expect("second");
    assert_eq!(h.chain.submitted().len(), after_first);
    assert_eq!(report.corrections_taken(), 0);
    assert!(report.direct.sufficient && report.delegated.sufficient);
}

#[tokio::test]
async fn registry_read_failure_counts_as_zero_and_is_logged() {
    let h = Harness::new();
    h.chain.fail_reads("registry.allowance");
    let (id, mut subscription) = h.watch("resolver-read-failure");
    let log = OperationLog::begin(h.bus.clone(), Some(id.clone()));

    let report = h.resolver().resolve(h.swap_target(U256::from(1u8)), &log).await.expect("read failure is not fatal");
    assert!(report.delegated.action_taken);
    h.bus.complete(&id);

    let (lines, done) = crate::fixtures::drain(&mut subscription).await;
    assert!(done);
    assert!(lines.iter().any(|line| line.contains("registry allowance read failed, treating as zero")));
}

#[tokio::test]
async fn direct_read_failure_is_fatal() {
    let h = Harness::new();
    h.chain.fail_reads("erc20.allowance");
    let err = h.resolver().resolve(h.swap_target(U256::from(1u8)), &silent(&h)).await.expect_err("fatal");
    assert!(matches!(err, RestakeError::ReadFailure { .. }));
    assert!(h.chain.submitted().is_empty());
}

#[tokio::test]
async fn failed_direct_approval_aborts_before_delegated_correction() {
    let h = Harness::new();
    h.chain.revert_calls("erc20.approve");
    let err = h.resolver().resolve(h.swap_target(U256::from(1u8)), &silent(&h)).await.expect_err("reverted");
    assert!(matches!(err, RestakeError::Reverted { .. }));
    assert_eq!(h.chain.submitted_labels(), vec!["erc20.approve"]);
}

#[tokio::test]
async fn amounts_beyond_u64_compare_exactly() {
    let h = Harness::new();
    let token = h.settings.contracts.liquid_staking;
    let required = U256::from(1u8) << 100;
    h.chain.set_erc20_allowance(token, TEST_SIGNER, h.settings.contracts.allowance_registry, required);
    h.chain.set_registry_allowance(TEST_SIGNER, token, h.settings.contracts.swap_router, required - U256::from(1u8), 0);

    let report = h.resolver().inspect(h.swap_target(required), &silent(&h)).await.expect("inspect");
    assert!(report.direct.sufficient);
    assert!(!report.delegated.sufficient);
    assert!(!report.delegated.expired);
    assert_eq!(report.delegated.expires_at, None);
}
