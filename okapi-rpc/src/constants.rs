//! Constant values used by the block template RPC.

/// The number of seconds that must pass before a new template is generated
/// when the DAG tips have not changed but the contents of the memory pool
/// have.
pub const TEMPLATE_REGENERATE_SECONDS: u64 = 60;

/// Two 64-bit big-endian hexadecimal integers which represent the valid
/// range of nonces returned with a block template.
pub const NONCE_RANGE_FIELD: &str = "000000000000ffffffffffff";

/// A hardcoded list of block fields the miner is allowed to change in a
/// template.
///
/// <https://en.bitcoin.it/wiki/BIP_0023#Mutations>
pub const MUTABLE_FIELD: &[&str] = &["time", "transactions/add", "parentblock", "coinbase/append"];

/// A hardcoded list of the `getBlockTemplate` capabilities this node
/// supports.
///
/// <https://en.bitcoin.it/wiki/BIP_0023#Block_Proposal>
pub const CAPABILITIES_FIELD: &[&str] = &["proposal"];
