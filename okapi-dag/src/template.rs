//! The consumed interface of the mining subsystem.
//!
//! The mining subsystem selects transactions and assembles candidate blocks;
//! the template service only drives it and caches its output.

use std::sync::{Arc, Mutex};

use okapi_chain::{
    address::Address,
    block::{Block, Header},
    serialization::DateTime64,
    transaction::{Output, Transaction},
};

use crate::{BlockDag, BoxError, MockBlockDag};

/// A candidate block produced by the mining subsystem, with the metadata the
/// RPC reply reports per transaction.
///
/// `tx_masses` and `fees` are parallel to `block.transactions`, including the
/// coinbase at index 0.
#[derive(Clone, Debug)]
pub struct BlockTemplate {
    /// The candidate block.
    pub block: Block,

    /// The mass of each transaction in the block.
    pub tx_masses: Vec<u64>,

    /// The fee paid by each transaction in the block.
    pub fees: Vec<u64>,

    /// The height of the candidate block above the genesis block.
    pub height: u64,
}

/// An interface for querying when the mempool contents last changed.
pub trait TxSource: Send + Sync {
    /// Returns the time of the last mempool mutation, or the zero value if
    /// the mempool has not signalled an update yet.
    fn last_updated(&self) -> DateTime64;
}

/// An interface for building candidate blocks.
pub trait TemplateGenerator: Send + Sync {
    /// Builds a new candidate block paying to `pay_address`, seeding the
    /// coinbase with `extra_nonce`.
    fn new_block_template(
        &self,
        pay_address: &Address,
        extra_nonce: u64,
    ) -> Result<BlockTemplate, BoxError>;

    /// Moves the header timestamp of `block` forward to the current
    /// median-aware time. On test networks this may also adjust the
    /// difficulty bits.
    fn update_block_time(&self, block: &mut Block) -> Result<(), BoxError>;

    /// The transaction source the candidate blocks are selected from.
    fn tx_source(&self) -> &dyn TxSource;
}

/// A mock [`TxSource`] implementation that replays an externally set time.
#[derive(Clone, Default)]
pub struct MockTxSource {
    last_updated: Arc<Mutex<DateTime64>>,
}

impl MockTxSource {
    /// Sets the value returned by `last_updated()`.
    pub fn set_last_updated(&self, last_updated: DateTime64) {
        *self.last_updated.lock().expect("unpoisoned") = last_updated;
    }
}

impl TxSource for MockTxSource {
    fn last_updated(&self) -> DateTime64 {
        *self.last_updated.lock().expect("unpoisoned")
    }
}

#[derive(Default)]
struct MockTemplateGeneratorInner {
    transactions: Vec<(Transaction, u64, u64)>,
    height: u64,
    bits: u32,
    fail_with: Option<String>,
    last_extra_nonce: Option<u64>,
}

/// A mock [`TemplateGenerator`] that assembles blocks on top of a
/// [`MockBlockDag`]'s tips.
///
/// Clones share state, like the other mocks in this crate.
#[derive(Clone)]
pub struct MockTemplateGenerator {
    dag: MockBlockDag,
    tx_source: MockTxSource,
    inner: Arc<Mutex<MockTemplateGeneratorInner>>,
}

impl MockTemplateGenerator {
    /// Returns a mock generator that reads tips and times from `dag`.
    pub fn for_dag(dag: MockBlockDag) -> Self {
        MockTemplateGenerator {
            dag,
            tx_source: MockTxSource::default(),
            inner: Arc::new(Mutex::new(MockTemplateGeneratorInner {
                bits: 0x207f_ffff,
                ..MockTemplateGeneratorInner::default()
            })),
        }
    }

    /// Sets the non-coinbase transactions, with their masses and fees, that
    /// future templates will carry.
    pub fn set_transactions(&self, transactions: Vec<(Transaction, u64, u64)>) {
        self.inner.lock().expect("unpoisoned").transactions = transactions;
    }

    /// Sets the height reported by future templates.
    pub fn set_height(&self, height: u64) {
        self.inner.lock().expect("unpoisoned").height = height;
    }

    /// Sets the difficulty bits stamped into future templates.
    pub fn set_bits(&self, bits: u32) {
        self.inner.lock().expect("unpoisoned").bits = bits;
    }

    /// Makes every future `new_block_template` call fail with `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        self.inner.lock().expect("unpoisoned").fail_with = Some(message.into());
    }

    /// Makes future `new_block_template` calls succeed again.
    pub fn clear_failure(&self) {
        self.inner.lock().expect("unpoisoned").fail_with = None;
    }

    /// Returns the extra-nonce passed to the most recent successful
    /// `new_block_template` call.
    pub fn last_extra_nonce(&self) -> Option<u64> {
        self.inner.lock().expect("unpoisoned").last_extra_nonce
    }

    /// Returns the shared mock transaction source.
    pub fn mock_tx_source(&self) -> MockTxSource {
        self.tx_source.clone()
    }
}

impl TemplateGenerator for MockTemplateGenerator {
    fn new_block_template(
        &self,
        pay_address: &Address,
        extra_nonce: u64,
    ) -> Result<BlockTemplate, BoxError> {
        let mut inner = self.inner.lock().expect("unpoisoned");
        if let Some(message) = &inner.fail_with {
            return Err(message.clone().into());
        }
        inner.last_extra_nonce = Some(extra_nonce);

        // A stand-in coinbase: pays the miner and commits to the extra-nonce
        // through the script bytes, so templates for different requests
        // differ the way real ones do.
        let mut coinbase_script = pay_address.payload().to_vec();
        coinbase_script.extend_from_slice(&extra_nonce.to_le_bytes());
        let coinbase = Transaction {
            version: 1,
            inputs: Vec::new(),
            outputs: vec![Output {
                value: 50_000_000,
                script_public_key: coinbase_script,
            }],
            lock_time: 0,
        };

        let mut transactions = vec![coinbase];
        let mut tx_masses = vec![0];
        let mut fees = vec![0];
        for (transaction, mass, fee) in &inner.transactions {
            transactions.push(transaction.clone());
            tx_masses.push(*mass);
            fees.push(*fee);
        }

        Ok(BlockTemplate {
            block: Block {
                header: Header {
                    version: 1,
                    parent_hashes: self.dag.tip_hashes(),
                    hash_merkle_root: okapi_chain::block::Hash([0; 32]),
                    accepted_id_merkle_root: okapi_chain::block::Hash([0; 32]),
                    utxo_commitment: okapi_chain::block::Hash([0; 32]),
                    timestamp: self.dag.now(),
                    bits: inner.bits,
                    nonce: 0,
                },
                transactions,
            },
            tx_masses,
            fees,
            height: inner.height,
        })
    }

    fn update_block_time(&self, block: &mut Block) -> Result<(), BoxError> {
        block.header.timestamp = self.dag.now();
        Ok(())
    }

    fn tx_source(&self) -> &dyn TxSource {
        &self.tx_source
    }
}
