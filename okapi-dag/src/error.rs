//! Errors that can occur when checking consensus rules.
//!
//! Each error variant corresponds to a consensus rule, so enumerating all
//! possible verification failures enumerates the consensus rules the DAG
//! engine enforces, and ensures that blocks and transactions are not
//! rejected for a non-enumerated reason.

use thiserror::Error;

/// A block or transaction violated a consensus rule.
///
/// The RPC layer maps each variant to a protocol-stable rejection string, so
/// new variants need a matching entry in that table.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum RuleError {
    /// The block duplicates a block already in the DAG.
    #[error("already have block")]
    DuplicateBlock,

    /// The total transaction mass in the block is above the limit.
    #[error("block mass is above the limit")]
    BlockMassTooHigh,

    /// The block version is no longer accepted.
    #[error("block version is too old")]
    BlockVersionTooOld,

    /// The header timestamp is not after the median time of recent blocks.
    #[error("block timestamp is not after the median time of its past")]
    TimeTooOld,

    /// The header timestamp is too far in the future.
    #[error("block timestamp is too far in the future")]
    TimeTooNew,

    /// The claimed difficulty is below the required difficulty.
    #[error("block difficulty is lower than the network requires")]
    DifficultyTooLow,

    /// The difficulty bits do not match the expected value.
    #[error("block difficulty does not match the expected value")]
    UnexpectedDifficulty,

    /// The block hash is above its claimed target.
    #[error("block hash is above the target difficulty")]
    HighHash,

    /// The transaction merkle root does not match the block contents.
    #[error("merkle root does not match the block transactions")]
    BadMerkleRoot,

    /// The block timestamp is before the finality point's timestamp.
    #[error("block timestamp is older than the finality point")]
    FinalityPointTimeTooOld,

    /// The block contains no transactions.
    #[error("block has no transactions")]
    NoTransactions,

    /// A non-coinbase transaction has no inputs.
    #[error("transaction has no inputs")]
    NoTxInputs,

    /// A single transaction's mass is above the limit.
    #[error("transaction mass is above the limit")]
    TxMassTooHigh,

    /// A transaction output value is out of range.
    #[error("transaction output value is out of range")]
    BadTxOutValue,

    /// A transaction spends the same outpoint more than once.
    #[error("transaction contains duplicate inputs")]
    DuplicateTxInputs,

    /// A transaction input is malformed.
    #[error("transaction input is malformed")]
    BadTxInput,

    /// A transaction spends an output that does not exist or is spent.
    #[error("transaction input refers to a missing or spent output")]
    MissingTxOut,

    /// A transaction's lock time has not passed yet.
    #[error("transaction is not finalized")]
    UnfinalizedTx,

    /// The block contains a duplicate transaction.
    #[error("block contains a duplicate transaction")]
    DuplicateTx,

    /// A transaction would overwrite an existing unspent transaction.
    #[error("transaction would overwrite an existing transaction")]
    OverwriteTx,

    /// A transaction spends a coinbase output that is not mature yet.
    #[error("transaction spends an immature coinbase output")]
    ImmatureSpend,

    /// A transaction spends more than its inputs provide.
    #[error("transaction spends more than its inputs provide")]
    SpendTooHigh,

    /// The block's total fees are inconsistent.
    #[error("block fees are out of range")]
    BadFees,

    /// The block has too many signature operations.
    #[error("block has too many signature operations")]
    TooManySigOps,

    /// The first transaction in the block is not the coinbase.
    #[error("first transaction in the block is not the coinbase")]
    FirstTxNotCoinbase,

    /// The block has more than one coinbase transaction.
    #[error("block has more than one coinbase transaction")]
    MultipleCoinbases,

    /// The coinbase payload length is out of range.
    #[error("coinbase payload length is out of range")]
    BadCoinbasePayloadLen,

    /// A script failed to parse.
    #[error("script is malformed")]
    ScriptMalformed,

    /// A script failed to validate.
    #[error("script validation failed")]
    ScriptValidation,

    /// A parent block is not known to the DAG.
    #[error("parent block is unknown")]
    ParentBlockUnknown,

    /// A parent block is known to be invalid.
    #[error("parent block is invalid")]
    InvalidAncestorBlock,

    /// The parent blocks are known but are not the current DAG tips.
    #[error("parent blocks are not the current DAG tips")]
    ParentBlockNotCurrentTips,
}
