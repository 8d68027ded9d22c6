//! Consumed interfaces of the Okapi block DAG engine.
//!
//! The RPC layer drives template construction and proposal validation
//! through the traits in this crate, without depending on the engine's
//! implementation. The engine side lives elsewhere; mock implementations for
//! tests live next to each trait.

#![deny(missing_docs)]

pub mod error;
pub mod template;

use std::sync::{Arc, Mutex};

use okapi_chain::{
    block::{self, Block},
    serialization::DateTime64,
};

use crate::error::RuleError;

/// Error type alias to make working with generic errors easier.
///
/// Note: the 'static lifetime bound means that the *type* cannot have any
/// non-'static lifetimes, (e.g., when a type contains a borrow and is
/// parameterized by 'a), *not* that the object itself has 'static lifetime.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An interface for querying the block DAG engine.
///
/// All methods are cheap synchronous reads; the template service calls them
/// while holding its work-state mutex.
pub trait BlockDag: Send + Sync {
    /// Returns the hashes of the current DAG tips, in the order the engine
    /// selects parents for the next block.
    fn tip_hashes(&self) -> Vec<block::Hash>;

    /// Returns the minimum allowed timestamp for the next block, derived
    /// from the median timestamp of recent blocks.
    fn next_block_minimum_time(&self) -> DateTime64;

    /// Returns the network-adjusted current time.
    fn now(&self) -> DateTime64;

    /// Returns the maximum deviation a header timestamp may have from the
    /// network-adjusted time, in milliseconds.
    fn timestamp_deviation_tolerance(&self) -> u64;

    /// Checks whether `block` would connect to the current tips and pass all
    /// consensus rules except proof-of-work.
    ///
    /// Rule violations are reported as a [`RuleError`] inside the boxed
    /// error, recoverable by downcast; any other error is an engine failure.
    fn check_connect_block_template(&self, block: &Block) -> Result<(), BoxError>;
}

/// The connect-check outcome a [`MockBlockDag`] replays.
#[derive(Clone, Debug, Default)]
pub enum MockConnectResponse {
    /// The block passes the connect check.
    #[default]
    Accept,

    /// The block violates the contained consensus rule.
    Rule(RuleError),

    /// The engine fails with a non-rule error.
    Other(String),
}

#[derive(Default)]
struct MockBlockDagInner {
    tip_hashes: Vec<block::Hash>,
    next_block_minimum_time: DateTime64,
    now: Option<DateTime64>,
    timestamp_deviation_tolerance: u64,
    connect_response: MockConnectResponse,
}

/// A mock [`BlockDag`] implementation that replays externally set values.
///
/// Clones share state, so a test can hand one clone to the service under
/// test and keep another to move the tips.
#[derive(Clone, Default)]
pub struct MockBlockDag {
    inner: Arc<Mutex<MockBlockDagInner>>,
}

impl MockBlockDag {
    /// Sets the tip hashes returned by `tip_hashes()`.
    pub fn set_tip_hashes(&self, tip_hashes: Vec<block::Hash>) {
        self.inner.lock().expect("unpoisoned").tip_hashes = tip_hashes;
    }

    /// Sets the value returned by `next_block_minimum_time()`.
    pub fn set_next_block_minimum_time(&self, minimum_time: DateTime64) {
        self.inner.lock().expect("unpoisoned").next_block_minimum_time = minimum_time;
    }

    /// Pins `now()` to a fixed value instead of the wall clock.
    pub fn set_now(&self, now: DateTime64) {
        self.inner.lock().expect("unpoisoned").now = Some(now);
    }

    /// Sets the value returned by `timestamp_deviation_tolerance()`.
    pub fn set_timestamp_deviation_tolerance(&self, tolerance_millis: u64) {
        self.inner.lock().expect("unpoisoned").timestamp_deviation_tolerance = tolerance_millis;
    }

    /// Sets the outcome replayed by `check_connect_block_template()`.
    pub fn set_connect_response(&self, response: MockConnectResponse) {
        self.inner.lock().expect("unpoisoned").connect_response = response;
    }
}

impl BlockDag for MockBlockDag {
    fn tip_hashes(&self) -> Vec<block::Hash> {
        self.inner.lock().expect("unpoisoned").tip_hashes.clone()
    }

    fn next_block_minimum_time(&self) -> DateTime64 {
        self.inner.lock().expect("unpoisoned").next_block_minimum_time
    }

    fn now(&self) -> DateTime64 {
        self.inner
            .lock()
            .expect("unpoisoned")
            .now
            .unwrap_or_else(DateTime64::now)
    }

    fn timestamp_deviation_tolerance(&self) -> u64 {
        self.inner
            .lock()
            .expect("unpoisoned")
            .timestamp_deviation_tolerance
    }

    fn check_connect_block_template(&self, _block: &Block) -> Result<(), BoxError> {
        match self
            .inner
            .lock()
            .expect("unpoisoned")
            .connect_response
            .clone()
        {
            MockConnectResponse::Accept => Ok(()),
            MockConnectResponse::Rule(rule_error) => Err(rule_error.into()),
            MockConnectResponse::Other(message) => Err(message.into()),
        }
    }
}
