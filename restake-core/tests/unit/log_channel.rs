use crate::fixtures::{drain, tokens, Harness, TEST_SIGNER};
use restake_core::foundation::OperationId;
use restake_core::infrastructure::logbus::{LogBus, OperationLog};
use std::sync::Arc;

#[tokio::test]
async fn every_subscriber_sees_the_whole_flow() {
    let h = Harness::new();
    h.chain.set_native_balance(TEST_SIGNER, tokens(1));
    let (id, mut first) = h.watch("shared-op");
    let mut second = h.bus.subscribe(&id);

    h.orchestrator.stake(Some(id.clone()), tokens(1)).await.expect("stake");

    let (first_lines, first_done) = drain(&mut first).await;
    let (second_lines, second_done) = drain(&mut second).await;
    assert!(first_done && second_done);
    assert_eq!(first_lines, second_lines);
    assert!(first_lines.len() >= 3);
}

#[tokio::test]
async fn subscriber_after_completion_gets_an_ended_stream() {
    let h = Harness::new();
    h.chain.set_native_balance(TEST_SIGNER, tokens(1));
    let id = OperationId::from("late-joiner");

    h.orchestrator.stake(Some(id.clone()), tokens(1)).await.expect("stake");

    let mut late = h.bus.subscribe(&id);
    let (lines, done) = drain(&mut late).await;
    assert!(lines.is_empty());
    assert!(!done);
}

#[tokio::test]
async fn reused_id_reopens_for_the_next_flow() {
    let h = Harness::new();
    h.chain.set_native_balance(TEST_SIGNER, tokens(2));
    let id = OperationId::from("reused");

    h.orchestrator.stake(Some(id.clone()), tokens(1)).await.expect("first stake");
    let (_, mut subscription) = h.watch("reused");
    assert!(subscription.recv().await.is_none());

    let log = OperationLog::begin(h.bus.clone(), Some(id.clone()));
    let mut fresh = h.bus.subscribe(&id);
    log.emit("second run");
    log.complete();
    let (lines, done) = drain(&mut fresh).await;
    assert_eq!(lines, vec!["second run".to_string()]);
    assert!(done);
}

#[tokio::test]
async fn flows_without_an_id_emit_nowhere() {
    let h = Harness::new();
    h.chain.set_native_balance(TEST_SIGNER, tokens(1));
    let bus: &Arc<LogBus> = &h.bus;

    h.orchestrator.stake(None, tokens(1)).await.expect("stake");
    assert_eq!(bus.subscriber_count(&OperationId::from("anything")), 0);
}
