//! Mining RPC config.

use serde::{Deserialize, Serialize};

use okapi_chain::parameters::Network;

/// Mining configuration section.
///
/// The template service takes the pay address from each request, so the only
/// configuration it needs is the network, which selects the pay address
/// prefix and decides whether mining with zero connected peers is allowed.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// The network the node is running on.
    pub network: Network,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_serde_round_trip() {
        let config = Config {
            network: Network::Testnet,
        };

        let encoded = serde_json::to_string(&config).expect("config serializes");
        assert_eq!(encoded, r#"{"network":"testnet"}"#);

        let decoded: Config = serde_json::from_str(&encoded).expect("config deserializes");
        assert_eq!(decoded, config);
    }

    #[test]
    fn default_config_is_mainnet() {
        assert_eq!(Config::default().network, Network::Mainnet);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<Config, _> = serde_json::from_str(r#"{"listen_addr":"0.0.0.0"}"#);
        assert!(result.is_err());
    }
}
