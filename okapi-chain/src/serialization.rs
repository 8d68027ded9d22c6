//! Consensus-critical serialization.
//!
//! This module contains four traits: `OkapiSerialize` and `OkapiDeserialize`,
//! analogous to `Serialize` and `Deserialize` but for the Okapi wire format,
//! and `ReadOkapiExt` and `WriteOkapiExt`, which provide format-specific
//! helper methods on readers and writers.

mod date_time;
mod error;
mod okapi_deserialize;
mod okapi_serialize;
mod read_okapi;
mod write_okapi;

pub use date_time::DateTime64;
pub use error::SerializationError;
pub use okapi_deserialize::{OkapiDeserialize, OkapiDeserializeInto};
pub use okapi_serialize::{OkapiSerialize, MAX_PROTOCOL_MESSAGE_LEN};
pub use read_okapi::ReadOkapiExt;
pub use write_okapi::WriteOkapiExt;
