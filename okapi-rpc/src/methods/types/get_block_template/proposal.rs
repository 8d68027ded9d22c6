//! `getBlockTemplate` proposal mode types.
//!
//! [`ProposalResponse`] is the response to the `getBlockTemplate` RPC in
//! 'proposal' mode, and [`rejection_string`] is the mapping from consensus
//! rule errors to the protocol-stable rejection reasons.
//!
//! <https://en.bitcoin.it/wiki/BIP_0022#Appendix:_Example_Rejection_Reasons>

use okapi_dag::{error::RuleError, BoxError};

/// Response to a `getBlockTemplate` RPC request in proposal mode.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ProposalResponse {
    /// Block proposal was rejected as invalid.
    /// Contains the reason that the proposal was invalid.
    Rejected(String),

    /// Block proposal was successfully validated, returns null.
    Valid,
}

impl ProposalResponse {
    /// Returns a rejected response for `error`, with the protocol rejection
    /// string when `error` is a consensus rule violation.
    pub fn rejected(error: &BoxError) -> Self {
        ProposalResponse::Rejected(rejection_string(error))
    }

    /// Returns true if self is [`ProposalResponse::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Converts an error returned by the DAG engine's connect check into a
/// rejection reason string matching the format described in BIP-0022.
///
/// Rule errors map to a closed set of fixed strings that existing miner
/// software matches on; anything else gets the generic `rejected: ` prefix
/// with the error text.
pub fn rejection_string(error: &BoxError) -> String {
    // When the passed error is not a RuleError, just return a generic
    // rejected string with the error text.
    let Some(rule_error) = error.downcast_ref::<RuleError>() else {
        return format!("rejected: {error}");
    };

    let reason = match rule_error {
        RuleError::DuplicateBlock => "duplicate",
        RuleError::BlockMassTooHigh => "bad-blk-mass",
        RuleError::BlockVersionTooOld => "bad-version",
        RuleError::TimeTooOld => "time-too-old",
        RuleError::TimeTooNew => "time-too-new",
        RuleError::DifficultyTooLow => "bad-diffbits",
        RuleError::UnexpectedDifficulty => "bad-diffbits",
        RuleError::HighHash => "high-hash",
        RuleError::BadMerkleRoot => "bad-txnmrklroot",
        RuleError::FinalityPointTimeTooOld => "finality-point-time-too-old",
        RuleError::NoTransactions => "bad-txns-none",
        RuleError::NoTxInputs => "bad-txns-noinputs",
        RuleError::TxMassTooHigh => "bad-txns-mass",
        RuleError::BadTxOutValue => "bad-txns-outputvalue",
        RuleError::DuplicateTxInputs => "bad-txns-dupinputs",
        RuleError::BadTxInput => "bad-txns-badinput",
        RuleError::MissingTxOut => "bad-txns-missinginput",
        RuleError::UnfinalizedTx => "bad-txns-unfinalizedtx",
        RuleError::DuplicateTx => "bad-txns-duplicate",
        RuleError::OverwriteTx => "bad-txns-overwrite",
        RuleError::ImmatureSpend => "bad-txns-maturity",
        RuleError::SpendTooHigh => "bad-txns-highspend",
        RuleError::BadFees => "bad-txns-fees",
        RuleError::TooManySigOps => "high-sigops",
        RuleError::FirstTxNotCoinbase => "bad-txns-nocoinbase",
        RuleError::MultipleCoinbases => "bad-txns-multicoinbase",
        RuleError::BadCoinbasePayloadLen => "bad-cb-length",
        RuleError::ScriptMalformed => "bad-script-malformed",
        RuleError::ScriptValidation => "bad-script-validate",
        RuleError::ParentBlockUnknown => "parent-blk-not-found",
        RuleError::InvalidAncestorBlock => "bad-parentblk",
        RuleError::ParentBlockNotCurrentTips => "inconclusive-not-best-parentblk",

        // `RuleError` is non-exhaustive; codes without a protocol string
        // fall back to the generic form.
        other => return format!("rejected: {other}"),
    };

    reason.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_proposal_response_serializes_to_null() {
        let encoded = serde_json::to_string(&ProposalResponse::Valid).expect("serializes");
        assert_eq!(encoded, "null");

        let encoded = serde_json::to_string(&ProposalResponse::Rejected("high-hash".to_string()))
            .expect("serializes");
        assert_eq!(encoded, r#""high-hash""#);
    }

    #[test]
    fn non_rule_errors_get_the_generic_prefix() {
        let error: BoxError = "database is on fire".into();
        assert_eq!(rejection_string(&error), "rejected: database is on fire");
    }
}
