//! Pay addresses for miner payouts.

use std::fmt;

use bech32::{FromBase32, ToBase32, Variant};
use thiserror::Error;

use crate::parameters::Network;

/// An error that can occur when decoding an [`Address`].
#[derive(Error, Debug)]
pub enum AddressError {
    /// The string is not valid bech32.
    #[error("invalid bech32 encoding: {0}")]
    Encoding(#[from] bech32::Error),

    /// The human-readable prefix belongs to a different network.
    #[error("address prefix {actual:?} does not match the expected prefix {expected:?}")]
    WrongPrefix {
        /// The prefix of the configured network.
        expected: String,
        /// The prefix found in the address string.
        actual: String,
    },

    /// The address does not use the bech32m checksum.
    #[error("address must use the bech32m variant")]
    WrongVariant,

    /// The decoded payload has the wrong length.
    #[error("invalid address payload length: {0}")]
    InvalidPayloadLength(usize),
}

/// A validated pay address.
///
/// Addresses are bech32m strings whose human-readable prefix names the
/// network, with a 32-byte public key hash payload, for example
/// `okapi1...` on mainnet.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Address {
    network: Network,
    payload: [u8; 32],
}

impl Address {
    /// Returns a new address on `network` paying to `payload`.
    pub fn new(network: Network, payload: [u8; 32]) -> Address {
        Address { network, payload }
    }

    /// Decode an address string, checking its prefix against `network`.
    pub fn decode(encoded: &str, network: Network) -> Result<Address, AddressError> {
        let (hrp, data, variant) = bech32::decode(encoded)?;

        let expected = network.address_prefix();
        if hrp != expected {
            return Err(AddressError::WrongPrefix {
                expected: expected.to_string(),
                actual: hrp,
            });
        }
        if variant != Variant::Bech32m {
            return Err(AddressError::WrongVariant);
        }

        let payload = Vec::<u8>::from_base32(&data)?;
        let payload: [u8; 32] = payload
            .try_into()
            .map_err(|payload: Vec<u8>| AddressError::InvalidPayloadLength(payload.len()))?;

        Ok(Address { network, payload })
    }

    /// Returns the network this address belongs to.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Returns the public key hash this address pays to.
    pub fn payload(&self) -> [u8; 32] {
        self.payload
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = bech32::encode(
            self.network.address_prefix(),
            self.payload.to_base32(),
            Variant::Bech32m,
        )
        .expect("static network prefixes are valid bech32 prefixes");
        f.write_str(&encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trip() {
        let address = Address::new(Network::Mainnet, [42; 32]);
        let encoded = address.to_string();

        assert!(encoded.starts_with("okapi1"));
        let decoded = Address::decode(&encoded, Network::Mainnet).expect("valid address");
        assert_eq!(decoded, address);
    }

    #[test]
    fn decode_rejects_the_wrong_network() {
        let address = Address::new(Network::Testnet, [42; 32]).to_string();

        match Address::decode(&address, Network::Mainnet) {
            Err(AddressError::WrongPrefix { expected, actual }) => {
                assert_eq!(expected, "okapi");
                assert_eq!(actual, "okapitest");
            }
            other => panic!("expected a WrongPrefix error, got {other:?}"),
        }
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(Address::decode("not-an-address", Network::Mainnet).is_err());
        assert!(Address::decode("", Network::Mainnet).is_err());
    }
}
