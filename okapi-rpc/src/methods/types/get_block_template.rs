//! Types for the `getBlockTemplate` RPC.

pub mod parameters;
pub mod proposal;

pub use parameters::{GetBlockTemplateParameters, GetBlockTemplateRequestMode};
pub use proposal::ProposalResponse;

use okapi_chain::{block, serialization::DateTime64, work::difficulty::ExpandedDifficulty};

use crate::{
    constants::{CAPABILITIES_FIELD, MUTABLE_FIELD},
    methods::types::transaction::TransactionTemplate,
};

/// A `getBlockTemplate` RPC response.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum GetBlockTemplateResponse {
    /// `getBlockTemplate` RPC request in template mode.
    TemplateMode(Box<BlockTemplateResponse>),

    /// `getBlockTemplate` RPC request in proposal mode.
    ProposalMode(ProposalResponse),
}

impl GetBlockTemplateResponse {
    /// Returns the inner template, if the response is in template mode.
    pub fn try_into_template(self) -> Option<BlockTemplateResponse> {
        match self {
            GetBlockTemplateResponse::TemplateMode(template) => Some(*template),
            GetBlockTemplateResponse::ProposalMode(_) => None,
        }
    }

    /// Returns the inner proposal, if the response is in proposal mode.
    pub fn try_into_proposal(self) -> Option<ProposalResponse> {
        match self {
            GetBlockTemplateResponse::TemplateMode(_) => None,
            GetBlockTemplateResponse::ProposalMode(proposal) => Some(proposal),
        }
    }
}

impl From<BlockTemplateResponse> for GetBlockTemplateResponse {
    fn from(template: BlockTemplateResponse) -> Self {
        GetBlockTemplateResponse::TemplateMode(Box::new(template))
    }
}

impl From<ProposalResponse> for GetBlockTemplateResponse {
    fn from(proposal: ProposalResponse) -> Self {
        GetBlockTemplateResponse::ProposalMode(proposal)
    }
}

/// A serialized `getBlockTemplate` RPC response in template mode.
///
/// See [`ProposalResponse`] for the response in 'proposal' mode.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTemplateResponse {
    /// The `getBlockTemplate` RPC capabilities supported by this node.
    pub capabilities: Vec<String>,

    /// The version of the block format.
    pub version: u32,

    /// The hashes of the DAG tips the candidate block builds on.
    pub parent_hashes: Vec<block::Hash>,

    /// The merkle root of the transactions in the candidate block.
    pub hash_merkle_root: block::Hash,

    /// The merkle root of the transaction IDs accepted from merged blocks.
    pub accepted_id_merkle_root: block::Hash,

    /// The commitment to the UTXO set after the candidate block.
    pub utxo_commitment: block::Hash,

    /// The non-coinbase transactions selected for this block template.
    ///
    /// The coinbase transaction is omitted: miners build their own coinbase
    /// paying to their address, seeded by the extra-nonce.
    pub transactions: Vec<TransactionTemplate>,

    /// An ID that represents the DAG tips and generation time of this
    /// template. Returning it in a later request parks that request until
    /// this template is stale.
    pub long_poll_id: String,

    /// The expected difficulty for the new block, in expanded form.
    pub target: ExpandedDifficulty,

    /// The expected difficulty for the new block, in compact form, as
    /// lowercase hex.
    pub bits: String,

    /// The header time of the candidate block, in milliseconds since the
    /// Unix epoch.
    pub cur_time: DateTime64,

    /// The minimum header time the consensus rules allow for the new block,
    /// derived from the median time of recent blocks.
    pub min_time: DateTime64,

    /// The maximum header time the consensus rules allow for the new block.
    pub max_time: DateTime64,

    /// Hardcoded list of block fields the miner is allowed to change.
    pub mutable: Vec<String>,

    /// A range of valid nonces, as two big-endian hexadecimal integers.
    pub nonce_range: String,

    /// The maximum total transaction mass allowed in a block.
    pub mass_limit: u64,

    /// The height of the candidate block above the genesis block.
    pub height: u64,

    /// Whether this node believes it is synced with the rest of the network.
    ///
    /// There is almost never a good reason to mine on top of an unsynced
    /// DAG, but the choice is the miner's, so this is a flag rather than an
    /// error.
    pub is_synced: bool,
}

impl BlockTemplateResponse {
    /// Returns the hardcoded `capabilities` list as owned strings.
    pub fn capabilities() -> Vec<String> {
        CAPABILITIES_FIELD.iter().map(ToString::to_string).collect()
    }

    /// Returns the hardcoded `mutable` list as owned strings.
    pub fn mutable_fields() -> Vec<String> {
        MUTABLE_FIELD.iter().map(ToString::to_string).collect()
    }
}
