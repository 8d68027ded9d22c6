//! Serialization and deserialization for Okapi transactions.

use std::io;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::serialization::{
    OkapiDeserialize, OkapiSerialize, ReadOkapiExt, SerializationError, WriteOkapiExt,
    MAX_PROTOCOL_MESSAGE_LEN,
};

use super::{Hash, Input, OutPoint, Output, Transaction};

/// Write a length-prefixed opaque byte string.
fn write_script<W: io::Write>(mut writer: W, script: &[u8]) -> Result<(), io::Error> {
    writer.write_compactsize(script.len() as u64)?;
    writer.write_all(script)
}

/// Read a length-prefixed opaque byte string.
fn read_script<R: io::Read>(mut reader: R) -> Result<Vec<u8>, SerializationError> {
    let len = usize::try_from(reader.read_compactsize()?)?;
    if len > MAX_PROTOCOL_MESSAGE_LEN {
        return Err(SerializationError::Parse(
            "script length larger than protocol message limit",
        ));
    }
    let mut script = vec![0; len];
    reader.read_exact(&mut script)?;
    Ok(script)
}

impl OkapiSerialize for OutPoint {
    fn okapi_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_all(&self.tx_id.0)?;
        writer.write_u32::<LittleEndian>(self.index)
    }
}

impl OkapiDeserialize for OutPoint {
    fn okapi_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(OutPoint {
            tx_id: Hash(reader.read_32_bytes()?),
            index: reader.read_u32::<LittleEndian>()?,
        })
    }
}

impl OkapiSerialize for Input {
    fn okapi_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.previous_outpoint.okapi_serialize(&mut writer)?;
        write_script(&mut writer, &self.signature_script)?;
        writer.write_u64::<LittleEndian>(self.sequence)
    }
}

impl OkapiDeserialize for Input {
    fn okapi_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(Input {
            previous_outpoint: OutPoint::okapi_deserialize(&mut reader)?,
            signature_script: read_script(&mut reader)?,
            sequence: reader.read_u64::<LittleEndian>()?,
        })
    }
}

impl OkapiSerialize for Output {
    fn okapi_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_u64::<LittleEndian>(self.value)?;
        write_script(&mut writer, &self.script_public_key)
    }
}

impl OkapiDeserialize for Output {
    fn okapi_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(Output {
            value: reader.read_u64::<LittleEndian>()?,
            script_public_key: read_script(&mut reader)?,
        })
    }
}

impl OkapiSerialize for Transaction {
    fn okapi_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_u32::<LittleEndian>(self.version)?;
        self.inputs.okapi_serialize(&mut writer)?;
        self.outputs.okapi_serialize(&mut writer)?;
        writer.write_u64::<LittleEndian>(self.lock_time)
    }
}

impl OkapiDeserialize for Transaction {
    fn okapi_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(Transaction {
            version: reader.read_u32::<LittleEndian>()?,
            inputs: Vec::okapi_deserialize(&mut reader)?,
            outputs: Vec::okapi_deserialize(&mut reader)?,
            lock_time: reader.read_u64::<LittleEndian>()?,
        })
    }
}
