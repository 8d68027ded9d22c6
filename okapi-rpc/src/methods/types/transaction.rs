//! Transaction-related types.

use okapi_chain::transaction;

/// Transaction data and fields needed by miners consuming the
/// `getBlockTemplate` RPC.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransactionTemplate {
    /// The hex-encoded serialized data for this transaction.
    #[serde(with = "hex")]
    pub data: Vec<u8>,

    /// The transaction ID of this transaction.
    pub id: transaction::Hash,

    /// The transactions in this block template that this transaction depends
    /// upon. These are 0-based indexes in the `transactions` list, sorted
    /// ascending, without duplicates.
    ///
    /// The created block must keep every dependency before its spender, so
    /// miners reordering `transactions` must respect this list.
    pub depends: Vec<u64>,

    /// The mass of this transaction, as assigned by the DAG engine.
    pub mass: u64,

    /// The fee this transaction pays, in base units.
    pub fee: u64,
}
