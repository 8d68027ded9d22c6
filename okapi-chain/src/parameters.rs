//! Definitions of Okapi network parameters.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An enum describing the possible network choices.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// The production network.
    #[default]
    Mainnet,

    /// The oldest public test network.
    Testnet,

    /// The simulation network, used for network simulations with no real
    /// peers.
    Simnet,

    /// The regression test network, used by tests that drive a single node
    /// locally.
    Regtest,
}

impl Network {
    /// Returns the human-readable prefix of pay addresses on this network.
    pub fn address_prefix(&self) -> &'static str {
        match self {
            Network::Mainnet => "okapi",
            Network::Testnet => "okapitest",
            Network::Simnet => "okapisim",
            Network::Regtest => "okapireg",
        }
    }

    /// Returns true for the networks that run a node in isolation.
    ///
    /// On these networks mining RPCs are allowed to proceed with zero
    /// connected peers, since there is nobody to relay a found block to
    /// anyway.
    pub fn is_local_test_network(&self) -> bool {
        matches!(self, Network::Simnet | Network::Regtest)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Simnet => "simnet",
            Network::Regtest => "regtest",
        };
        f.write_str(name)
    }
}
