//! Parameter types for the `getBlockTemplate` RPC.

use serde::{Deserialize, Serialize};

/// Defines whether the RPC method should generate a block template or
/// attempt to validate a block proposal.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GetBlockTemplateRequestMode {
    /// Indicates a request for a block template.
    #[default]
    Template,

    /// Indicates a request to validate block data.
    Proposal,

    /// A mode this node does not implement.
    ///
    /// Kept as a variant rather than a deserialization failure so the
    /// handler can answer with the protocol's invalid-parameter error.
    #[serde(other)]
    Unknown,
}

/// The request object for the `getBlockTemplate` RPC.
///
/// `data` must be provided in `proposal` mode and is ignored in `template`
/// mode. All fields except `pay_address` are optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct GetBlockTemplateParameters {
    /// Defines whether the RPC method should generate a block template or
    /// attempt to validate block data, checking against all of the node's
    /// usual acceptance rules (excluding the check for a valid
    /// proof-of-work).
    #[serde(default)]
    pub mode: GetBlockTemplateRequestMode,

    /// The address the candidate block's coinbase pays to.
    ///
    /// Required in `template` mode; must carry the prefix of the configured
    /// network.
    #[serde(rename = "payAddress", default)]
    pub pay_address: String,

    /// An ID minted by an earlier template reply.
    ///
    /// When present, the RPC response is delayed until the identified
    /// template becomes stale.
    #[serde(rename = "longPollId", skip_serializing_if = "Option::is_none", default)]
    pub long_poll_id: Option<String>,

    /// Hex-encoded block data to be validated in `proposal` mode.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_defaults_to_template() {
        let params: GetBlockTemplateParameters =
            serde_json::from_str(r#"{"payAddress":"okapi1qqq"}"#).expect("valid parameters");
        assert_eq!(params.mode, GetBlockTemplateRequestMode::Template);
        assert_eq!(params.pay_address, "okapi1qqq");
        assert_eq!(params.long_poll_id, None);
    }

    #[test]
    fn unknown_modes_deserialize_for_the_handler_to_reject() {
        let params: GetBlockTemplateParameters =
            serde_json::from_str(r#"{"mode":"coffee"}"#).expect("unknown modes still parse");
        assert_eq!(params.mode, GetBlockTemplateRequestMode::Unknown);
    }
}
