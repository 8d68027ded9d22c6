use std::io;

use super::{ReadOkapiExt, SerializationError, MAX_PROTOCOL_MESSAGE_LEN};

/// Consensus-critical deserialization for Okapi.
///
/// This trait provides a generic deserialization for consensus-critical
/// formats, such as network messages, transactions, blocks, etc. It is
/// intended for use only for consensus-critical formats.
pub trait OkapiDeserialize: Sized {
    /// Try to read `self` from the given `reader`.
    fn okapi_deserialize<R: io::Read>(reader: R) -> Result<Self, SerializationError>;
}

impl<T: OkapiDeserialize> OkapiDeserialize for Vec<T> {
    fn okapi_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let len = reader.read_compactsize()?;
        let len = usize::try_from(len)?;
        // Each element takes at least one byte, so this bound stops malformed
        // counts from causing a huge allocation before the read fails.
        if len > MAX_PROTOCOL_MESSAGE_LEN {
            return Err(SerializationError::Parse(
                "compactsize larger than protocol message limit",
            ));
        }
        let mut vec = Vec::with_capacity(len.min(1024));
        for _ in 0..len {
            vec.push(T::okapi_deserialize(&mut reader)?);
        }
        Ok(vec)
    }
}

/// Helper for deserializing more succinctly via type inference
pub trait OkapiDeserializeInto {
    /// Deserialize based on type inference
    fn okapi_deserialize_into<T>(self) -> Result<T, SerializationError>
    where
        T: OkapiDeserialize;
}

impl<R: io::Read> OkapiDeserializeInto for R {
    fn okapi_deserialize_into<T>(self) -> Result<T, SerializationError>
    where
        T: OkapiDeserialize,
    {
        T::okapi_deserialize(self)
    }
}
