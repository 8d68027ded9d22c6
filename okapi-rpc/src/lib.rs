//! The block template RPC service of the Okapi node.
//!
//! This crate implements the BIP-0022-style `getBlockTemplate` method:
//! template construction and caching, long polling with a multi-waiter
//! notification registry, and block proposal validation. The JSON-RPC
//! transport (envelope, authentication, dispatch) lives elsewhere; the
//! handler here returns [`errors::RpcResult`] values ready to be serialized
//! into a JSON-RPC response.

#![deny(missing_docs)]

pub mod config;
pub mod constants;
pub mod errors;
pub mod methods;
pub mod work;

pub use methods::{
    types::get_block_template::{
        proposal::ProposalResponse, BlockTemplateResponse, GetBlockTemplateResponse,
    },
    GetBlockTemplateHandler,
};
