//! Core chain types for the Okapi block DAG.
//!
//! This crate holds the value types shared between the node's subsystems:
//! blocks and transactions with their consensus-critical serialization,
//! hashes, compact and expanded difficulty, millisecond timestamps, network
//! parameters, and pay addresses. It also defines the small status traits
//! (`ChainSyncStatus`, `ConnectionStatus`) that let the RPC layer query the
//! sync and connection managers without depending on them.

#![deny(missing_docs)]

pub mod address;
pub mod block;
pub mod chain_sync_status;
pub mod connection_status;
pub mod parameters;
pub mod serialization;
pub mod sha256d_writer;
pub mod transaction;
pub mod work;
