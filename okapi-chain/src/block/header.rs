//! The block header.

use crate::serialization::DateTime64;

use super::Hash;

/// A block header, containing metadata about a block.
///
/// Blocks in a DAG are chained together via the `parent_hashes` list: each
/// block points backwards to every tip it was mined on top of, all the way
/// back to the genesis block.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Header {
    /// The block's version field.
    pub version: u32,

    /// The hashes of the parent blocks this block builds on, in the order
    /// selected by the DAG engine.
    pub parent_hashes: Vec<Hash>,

    /// The root of the transaction merkle tree, binding the header to the
    /// transactions in the block.
    pub hash_merkle_root: Hash,

    /// The root of the merkle tree of transaction IDs accepted from merged
    /// blocks, as computed by the DAG engine.
    pub accepted_id_merkle_root: Hash,

    /// A commitment to the UTXO set after this block is applied.
    pub utxo_commitment: Hash,

    /// The time when the miner started hashing the header (according to the
    /// miner), with millisecond precision.
    pub timestamp: DateTime64,

    /// An encoded version of the target threshold this block's header hash
    /// must be less than or equal to, in compact "nBits" format.
    pub bits: u32,

    /// An arbitrary field that miners change to modify the header hash in
    /// order to produce a hash below the target threshold.
    pub nonce: u64,
}
