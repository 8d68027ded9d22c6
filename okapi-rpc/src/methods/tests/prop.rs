//! Randomised property tests for the `getBlockTemplate` handler types.

use proptest::prelude::*;

use okapi_chain::{
    address::Address,
    block,
    chain_sync_status::MockSyncStatus,
    parameters::Network,
    serialization::DateTime64,
    transaction::{Input, OutPoint, Output, Transaction},
};
use okapi_dag::{template::BlockTemplate, MockBlockDag};

use crate::{methods::types::long_poll::LongPollId, work::WorkState};

proptest! {
    /// Any ID this service can mint is accepted by its own parser and
    /// identifies the same template.
    #[test]
    fn long_poll_id_round_trips(
        raw_hashes in proptest::collection::vec(any::<[u8; 32]>(), 1..4),
        pay_address in "[a-z0-9]{1,30}",
        last_generated in 0i64..=i64::MAX,
    ) {
        let tip_hashes: Vec<block::Hash> = raw_hashes.into_iter().map(block::Hash).collect();
        let id = LongPollId::new(tip_hashes.clone(), pay_address.clone(), last_generated);

        let decoded: LongPollId = id.to_string().parse().expect("minted IDs parse");

        prop_assert_eq!(decoded.tip_hashes, tip_hashes);
        prop_assert_eq!(decoded.pay_address, pay_address);
        prop_assert_eq!(decoded.last_generated, last_generated);
    }

    /// `depends` lists are sorted, deduplicated, point strictly backwards
    /// into the emitted list, and contain exactly the in-block spends.
    #[test]
    fn depends_indices_are_sound(spend_flags in proptest::collection::vec(any::<bool>(), 1..8)) {
        // Wire up a random spend graph: each transaction spends the one
        // before it when its flag is set, plus an outpoint outside the
        // block to keep IDs distinct.
        let mut txs: Vec<Transaction> = Vec::new();
        for (i, spends_previous) in spend_flags.iter().copied().enumerate() {
            let mut inputs = vec![Input {
                previous_outpoint: OutPoint {
                    tx_id: okapi_chain::transaction::Hash([0xcc; 32]),
                    index: i as u32,
                },
                signature_script: Vec::new(),
                sequence: 0,
            }];
            if spends_previous && i > 0 {
                // Two spends of the same transaction must collapse to one
                // dependency entry.
                for index in [0, 1] {
                    inputs.push(Input {
                        previous_outpoint: OutPoint {
                            tx_id: txs[i - 1].id(),
                            index,
                        },
                        signature_script: Vec::new(),
                        sequence: 0,
                    });
                }
            }
            txs.push(Transaction {
                version: 1,
                inputs,
                outputs: vec![Output { value: 1, script_public_key: Vec::new() }],
                lock_time: 0,
            });
        }

        let coinbase = Transaction {
            version: 1,
            inputs: Vec::new(),
            outputs: vec![Output { value: 50, script_public_key: Vec::new() }],
            lock_time: 0,
        };
        let parent_hashes = vec![block::Hash([1; 32])];
        let timestamp = DateTime64::from_unix_millis(5_000);
        let transaction_count = txs.len() + 1;

        let mut state = WorkState::new();
        state.template = Some(BlockTemplate {
            block: block::Block {
                header: block::Header {
                    version: 1,
                    parent_hashes: parent_hashes.clone(),
                    hash_merkle_root: block::Hash([2; 32]),
                    accepted_id_merkle_root: block::Hash([3; 32]),
                    utxo_commitment: block::Hash([4; 32]),
                    timestamp,
                    bits: 0x207f_ffff,
                    nonce: 0,
                },
                transactions: std::iter::once(coinbase).chain(txs.iter().cloned()).collect(),
            },
            tx_masses: vec![100; transaction_count],
            fees: vec![1; transaction_count],
            height: 10,
        });
        state.tip_hashes = parent_hashes;
        state.pay_address = Some(Address::new(Network::Mainnet, [6; 32]));
        state.last_generated = timestamp;
        state.last_tx_update = timestamp;
        state.min_timestamp = DateTime64::from_unix_millis(1_000);

        let dag = MockBlockDag::default();
        dag.set_now(timestamp);
        dag.set_timestamp_deviation_tolerance(10_000);

        let result = state
            .block_template_result(&dag, &MockSyncStatus::default())
            .expect("a committed template assembles");

        prop_assert_eq!(result.transactions.len(), txs.len());
        for (reply_index, tx_template) in result.transactions.iter().enumerate() {
            // Strictly backwards, sorted, unique.
            prop_assert!(tx_template
                .depends
                .iter()
                .all(|&depend| (depend as usize) < reply_index));
            prop_assert!(tx_template.depends.windows(2).all(|pair| pair[0] < pair[1]));

            // Each dependency's ID is spent by this transaction, and every
            // in-block spend shows up as a dependency.
            let spent_ids: Vec<_> = txs[reply_index]
                .inputs
                .iter()
                .map(|input| input.previous_outpoint.tx_id)
                .collect();
            for &depend in &tx_template.depends {
                prop_assert!(spent_ids.contains(&result.transactions[depend as usize].id));
            }
            let expected: Vec<u64> = (0..reply_index)
                .filter(|&earlier| spent_ids.contains(&txs[earlier].id()))
                .map(|earlier| earlier as u64)
                .collect();
            prop_assert_eq!(&tx_template.depends, &expected);
        }
    }
}
