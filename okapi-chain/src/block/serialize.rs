//! Serialization and deserialization for Okapi blocks.

use std::io;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::serialization::{
    DateTime64, OkapiDeserialize, OkapiSerialize, ReadOkapiExt, SerializationError,
};

use super::{Block, Hash, Header};

impl OkapiSerialize for Hash {
    fn okapi_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_all(&self.0)
    }
}

impl OkapiDeserialize for Hash {
    fn okapi_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(Hash(reader.read_32_bytes()?))
    }
}

impl OkapiSerialize for Header {
    fn okapi_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_u32::<LittleEndian>(self.version)?;
        self.parent_hashes.okapi_serialize(&mut writer)?;
        self.hash_merkle_root.okapi_serialize(&mut writer)?;
        self.accepted_id_merkle_root.okapi_serialize(&mut writer)?;
        self.utxo_commitment.okapi_serialize(&mut writer)?;
        self.timestamp.okapi_serialize(&mut writer)?;
        writer.write_u32::<LittleEndian>(self.bits)?;
        writer.write_u64::<LittleEndian>(self.nonce)
    }
}

impl OkapiDeserialize for Header {
    fn okapi_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(Header {
            version: reader.read_u32::<LittleEndian>()?,
            parent_hashes: Vec::okapi_deserialize(&mut reader)?,
            hash_merkle_root: Hash::okapi_deserialize(&mut reader)?,
            accepted_id_merkle_root: Hash::okapi_deserialize(&mut reader)?,
            utxo_commitment: Hash::okapi_deserialize(&mut reader)?,
            timestamp: DateTime64::okapi_deserialize(&mut reader)?,
            bits: reader.read_u32::<LittleEndian>()?,
            nonce: reader.read_u64::<LittleEndian>()?,
        })
    }
}

impl OkapiSerialize for Block {
    fn okapi_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.header.okapi_serialize(&mut writer)?;
        self.transactions.okapi_serialize(&mut writer)
    }
}

impl OkapiDeserialize for Block {
    fn okapi_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(Block {
            header: Header::okapi_deserialize(&mut reader)?,
            transactions: Vec::okapi_deserialize(&mut reader)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        serialization::OkapiDeserializeInto,
        transaction::{Input, OutPoint, Output, Transaction},
    };

    use super::*;

    fn example_block() -> Block {
        let coinbase = Transaction {
            version: 1,
            inputs: Vec::new(),
            outputs: vec![Output {
                value: 50_000_000,
                script_public_key: vec![0x51],
            }],
            lock_time: 0,
        };
        let spend = Transaction {
            version: 1,
            inputs: vec![Input {
                previous_outpoint: OutPoint {
                    tx_id: crate::transaction::Hash([7; 32]),
                    index: 1,
                },
                signature_script: vec![0xaa, 0xbb],
                sequence: u64::MAX,
            }],
            outputs: vec![Output {
                value: 9_999,
                script_public_key: vec![0x52, 0x53],
            }],
            lock_time: 0,
        };

        Block {
            header: Header {
                version: 1,
                parent_hashes: vec![Hash([1; 32]), Hash([2; 32])],
                hash_merkle_root: Hash([3; 32]),
                accepted_id_merkle_root: Hash([4; 32]),
                utxo_commitment: Hash([5; 32]),
                timestamp: DateTime64::from_unix_millis(1_600_000_000_123),
                bits: 0x207f_ffff,
                nonce: 42,
            },
            transactions: vec![coinbase, spend],
        }
    }

    #[test]
    fn block_round_trip() {
        let block = example_block();

        let data = block.okapi_serialize_to_vec().expect("vec write succeeds");
        let parsed: Block = data.as_slice().okapi_deserialize_into().expect("valid data");

        assert_eq!(parsed, block);
    }

    #[test]
    fn truncated_block_fails_to_parse() {
        let block = example_block();

        let data = block.okapi_serialize_to_vec().expect("vec write succeeds");
        let parsed: Result<Block, _> = data[..data.len() - 1].okapi_deserialize_into();

        assert!(parsed.is_err());
    }

    #[test]
    fn block_hash_commits_to_the_header() {
        let block = example_block();
        let mut modified = block.clone();
        modified.header.nonce += 1;

        assert_ne!(block.hash(), modified.hash());
    }
}
