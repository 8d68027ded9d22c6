//! Types used in RPC methods.

pub mod get_block_template;
pub mod long_poll;
pub mod transaction;
