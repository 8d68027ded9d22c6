//! Tests for the template cache and notification registry.

use std::time::Duration;

use tokio::time::timeout;

use okapi_chain::{
    address::Address, block, parameters::Network, serialization::DateTime64,
};
use okapi_dag::{template::MockTemplateGenerator, MockBlockDag};

use super::WorkState;

fn tips_a() -> Vec<block::Hash> {
    vec![block::Hash([1; 32]), block::Hash([2; 32])]
}

fn tips_b() -> Vec<block::Hash> {
    vec![block::Hash([9; 32])]
}

fn pay_address() -> Address {
    Address::new(Network::Mainnet, [7; 32])
}

/// Waits briefly for a release signal, returning whether it fired.
async fn released(receiver: &mut tokio::sync::watch::Receiver<()>) -> bool {
    timeout(Duration::from_millis(100), receiver.changed())
        .await
        .is_ok()
}

#[tokio::test]
async fn waiters_with_equal_keys_share_one_signal() {
    let mut state = WorkState::new();

    let mut first = state.subscribe(&tips_a(), 100);
    let mut second = state.subscribe(&tips_a(), 100);
    assert_eq!(state.notify_map_len(), 1);

    // A block arrives on different tips: everyone under tips A is released.
    state.notify_long_pollers(&tips_b(), DateTime64::ZERO);

    assert!(released(&mut first).await);
    assert!(released(&mut second).await);
    assert_eq!(state.notify_map_len(), 0);
}

#[tokio::test]
async fn tip_change_only_releases_other_fingerprints() {
    let mut state = WorkState::new();

    let mut stale = state.subscribe(&tips_a(), 100);
    let mut current = state.subscribe(&tips_b(), 100);

    state.notify_long_pollers(&tips_b(), DateTime64::ZERO);

    assert!(released(&mut stale).await);
    assert!(!released(&mut current).await);
    assert_eq!(state.notify_map_len(), 1);
    assert!(!state.notify_map_has_empty_entries());
}

#[tokio::test]
async fn mempool_staleness_releases_older_templates_only() {
    let mut state = WorkState::new();

    let mut older = state.subscribe(&tips_a(), 100);
    let mut newer = state.subscribe(&tips_a(), 200);

    // The pool changed at t=150s: templates generated before then are stale.
    state.notify_long_pollers(&tips_a(), DateTime64::from_unix_millis(150_000));

    assert!(released(&mut older).await);
    assert!(!released(&mut newer).await);
    assert_eq!(state.notify_map_len(), 1);
    assert!(!state.notify_map_has_empty_entries());
}

#[tokio::test]
async fn zero_mempool_time_skips_the_staleness_pass() {
    let mut state = WorkState::new();

    let mut waiter = state.subscribe(&tips_a(), 100);

    state.notify_long_pollers(&tips_a(), DateTime64::ZERO);

    assert!(!released(&mut waiter).await);
    assert_eq!(state.notify_map_len(), 1);
}

#[tokio::test]
async fn firing_with_no_remaining_receivers_does_not_panic() {
    let mut state = WorkState::new();

    let receiver = state.subscribe(&tips_a(), 100);
    drop(receiver);

    state.notify_long_pollers(&tips_b(), DateTime64::from_unix_millis(500_000));
    assert_eq!(state.notify_map_len(), 0);
}

#[tokio::test]
async fn generation_failure_resets_the_tips_and_the_next_call_retries() {
    let dag = MockBlockDag::default();
    dag.set_tip_hashes(tips_a());
    let generator = MockTemplateGenerator::for_dag(dag.clone());
    generator
        .mock_tx_source()
        .set_last_updated(DateTime64::now());

    let mut state = WorkState::new();

    generator.fail_with("utxo set is not ready");
    let error = state
        .update_block_template(&dag, &generator, &pay_address())
        .expect_err("generator failure surfaces as an RPC error");
    assert!(error.message().contains("Failed to create new block template"));
    assert!(state.tip_hashes.is_empty());
    assert!(state.template.is_none());

    generator.clear_failure();
    state
        .update_block_template(&dag, &generator, &pay_address())
        .expect("the next call regenerates from scratch");
    assert_eq!(state.tip_hashes, tips_a());
    assert!(state.template.is_some());
}

#[tokio::test]
async fn mempool_change_within_the_window_refreshes_in_place() {
    let dag = MockBlockDag::default();
    dag.set_tip_hashes(tips_a());
    let generator = MockTemplateGenerator::for_dag(dag.clone());
    let tx_source = generator.mock_tx_source();
    tx_source.set_last_updated(DateTime64::from_unix_millis(1_000));

    let mut state = WorkState::new();
    state
        .update_block_template(&dag, &generator, &pay_address())
        .expect("template generates");

    let generated = state.last_generated;
    let extra_nonce = generator.last_extra_nonce();
    let transactions_before = state
        .template
        .as_ref()
        .expect("template exists")
        .block
        .transactions
        .clone();

    // The pool changes, but the regeneration window has not passed: the
    // existing template is refreshed, not rebuilt.
    tx_source.set_last_updated(DateTime64::from_unix_millis(2_000));
    state
        .update_block_template(&dag, &generator, &pay_address())
        .expect("refresh succeeds");

    let template = state.template.as_ref().expect("template exists");
    assert_eq!(state.last_generated, generated);
    assert_eq!(generator.last_extra_nonce(), extra_nonce);
    assert_eq!(template.block.transactions, transactions_before);
    assert_eq!(template.block.header.nonce, 0);
    assert_eq!(template.block.header.parent_hashes, tips_a());
}

#[tokio::test]
async fn changing_the_pay_address_regenerates_immediately() {
    let dag = MockBlockDag::default();
    dag.set_tip_hashes(tips_a());
    let generator = MockTemplateGenerator::for_dag(dag.clone());
    generator
        .mock_tx_source()
        .set_last_updated(DateTime64::now());

    let mut state = WorkState::new();
    state
        .update_block_template(&dag, &generator, &pay_address())
        .expect("template generates");
    let coinbase_before = state.template.as_ref().expect("template exists").block.transactions[0].clone();

    let other_address = Address::new(Network::Mainnet, [8; 32]);
    state
        .update_block_template(&dag, &generator, &other_address)
        .expect("template regenerates");

    let coinbase_after = &state.template.as_ref().expect("template exists").block.transactions[0];
    assert_eq!(state.pay_address.as_ref(), Some(&other_address));
    assert_ne!(&coinbase_before, coinbase_after);
}

#[tokio::test]
async fn template_time_past_the_tolerance_window_is_out_of_range() {
    let dag = MockBlockDag::default();
    dag.set_tip_hashes(tips_a());
    dag.set_now(DateTime64::from_unix_millis(1_600_000_000_000));
    dag.set_timestamp_deviation_tolerance(1_000);
    let generator = MockTemplateGenerator::for_dag(dag.clone());
    generator
        .mock_tx_source()
        .set_last_updated(DateTime64::now());

    let mut state = WorkState::new();
    state
        .update_block_template(&dag, &generator, &pay_address())
        .expect("template generates");

    // The local clock jumps backwards after generation.
    dag.set_now(DateTime64::from_unix_millis(1_599_999_000_000));

    let sync_status = okapi_chain::chain_sync_status::MockSyncStatus::default();
    let error = state
        .block_template_result(&dag, &sync_status)
        .expect_err("a template from the future must not be served");

    assert_eq!(error.code(), -1);
    assert!(error.message().contains("maximum allowed time"));
}

#[tokio::test]
async fn regeneration_monotonically_advances_last_generated() {
    let dag = MockBlockDag::default();
    dag.set_tip_hashes(tips_a());
    let generator = MockTemplateGenerator::for_dag(dag.clone());
    generator
        .mock_tx_source()
        .set_last_updated(DateTime64::now());

    let mut state = WorkState::new();
    state
        .update_block_template(&dag, &generator, &pay_address())
        .expect("template generates");
    let first = state.last_generated;

    dag.set_tip_hashes(tips_b());
    state
        .update_block_template(&dag, &generator, &pay_address())
        .expect("template regenerates on a tip change");

    assert!(state.last_generated >= first);
}
