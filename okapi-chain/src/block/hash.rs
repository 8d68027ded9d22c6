use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    serialization::{OkapiSerialize, SerializationError},
    sha256d_writer::Sha256dWriter,
};

use super::Header;

/// A SHA-256d hash of a block [`Header`].
///
/// This is frequently called a 'block hash', as it is used to identify the
/// entire block, since the hash preimage includes the merkle roots of the
/// block contents.
///
/// The hash is displayed, and carried in RPC replies and long poll IDs, in
/// byte-reversed order, following the convention inherited from Bitcoin.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// The number of hex digits in a displayed hash.
    pub const HEX_WIDTH: usize = 64;

    /// Returns the hash bytes in display order: reversed from the internal
    /// byte order.
    pub fn bytes_in_display_order(&self) -> [u8; 32] {
        let mut reversed = self.0;
        reversed.reverse();
        reversed
    }

    /// Returns the hash for the given bytes in display order.
    pub fn from_bytes_in_display_order(bytes: &[u8; 32]) -> Hash {
        let mut internal = *bytes;
        internal.reverse();
        Hash(internal)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.bytes_in_display_order()))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("block::Hash")
            .field(&hex::encode(self.bytes_in_display_order()))
            .finish()
    }
}

impl From<[u8; 32]> for Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Hash(bytes)
    }
}

impl<'a> From<&'a Header> for Hash {
    fn from(header: &'a Header) -> Self {
        let mut hash_writer = Sha256dWriter::default();
        header
            .okapi_serialize(&mut hash_writer)
            .expect("Sha256dWriter is infallible");
        Self(hash_writer.finish())
    }
}

impl std::str::FromStr for Hash {
    type Err = SerializationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0; 32];
        if s.len() != Self::HEX_WIDTH || hex::decode_to_slice(s, &mut bytes[..]).is_err() {
            Err(SerializationError::Parse("hex decoding error"))
        } else {
            Ok(Hash::from_bytes_in_display_order(&bytes))
        }
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex_hash = String::deserialize(deserializer)?;
        hex_hash.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_order_is_byte_reversed() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xab;
        let hash = Hash(bytes);

        let displayed = hash.to_string();
        assert_eq!(displayed.len(), Hash::HEX_WIDTH);
        assert!(displayed.ends_with("ab"));

        let round_tripped: Hash = displayed.parse().expect("valid hex");
        assert_eq!(round_tripped, hash);
    }

    #[test]
    fn from_str_rejects_bad_lengths() {
        assert!("ab".parse::<Hash>().is_err());
        assert!("g".repeat(64).parse::<Hash>().is_err());
    }

    #[test]
    fn serde_uses_hex_strings() {
        let hash = Hash([0xab; 32]);

        let encoded = serde_json::to_string(&hash).expect("hashes serialize");
        assert_eq!(encoded, format!("\"{}\"", "ab".repeat(32)));

        let decoded: Hash = serde_json::from_str(&encoded).expect("hashes deserialize");
        assert_eq!(decoded, hash);
    }
}
