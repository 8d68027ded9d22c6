use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    serialization::{OkapiSerialize, SerializationError},
    sha256d_writer::Sha256dWriter,
};

use super::Transaction;

/// A SHA-256d hash of a [`Transaction`], also called its transaction ID.
///
/// Displayed in byte-reversed order, like [`crate::block::Hash`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Hash(pub [u8; 32]);

impl Hash {
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

impl<'a> From<&'a Transaction> for Hash {
    fn from(transaction: &'a Transaction) -> Self {
        let mut hash_writer = Sha256dWriter::default();
        transaction
            .okapi_serialize(&mut hash_writer)
            .expect("Sha256dWriter is infallible");
        Self(hash_writer.finish())
    }
}

impl From<[u8; 32]> for Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Hash(bytes)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.bytes_in_display_order()))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("transaction::Hash")
            .field(&hex::encode(self.bytes_in_display_order()))
            .finish()
    }
}

impl std::str::FromStr for Hash {
    type Err = SerializationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0; 32];
        if s.len() != 64 || hex::decode_to_slice(s, &mut bytes[..]).is_err() {
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
