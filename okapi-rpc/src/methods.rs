//! The `getBlockTemplate` RPC handler.

pub mod types;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use okapi_chain::{
    address::Address,
    block::{self, Block},
    chain_sync_status::ChainSyncStatus,
    connection_status::ConnectionStatus,
    parameters::Network,
    serialization::{DateTime64, OkapiDeserializeInto},
};
use okapi_dag::{error::RuleError, template::TemplateGenerator, BlockDag};

use crate::{
    config::Config,
    constants::TEMPLATE_REGENERATE_SECONDS,
    errors::{client_quit_error, LegacyCode, MapError, RpcResult},
    methods::types::{
        get_block_template::{
            GetBlockTemplateParameters, GetBlockTemplateRequestMode, GetBlockTemplateResponse,
            ProposalResponse,
        },
        long_poll::LongPollId,
    },
    work::WorkState,
};

/// Handler for the `getBlockTemplate` RPC.
///
/// One handler exists per node; clones share the work state. The transport
/// layer calls [`get_block_template`](Self::get_block_template) for RPC
/// requests, and the DAG and mempool event loops call
/// [`on_block_added`](Self::on_block_added) and
/// [`on_mempool_transaction`](Self::on_mempool_transaction).
#[derive(Clone)]
pub struct GetBlockTemplateHandler<Dag, Generator, SyncStatus, ConnStatus>
where
    Dag: BlockDag + Clone + Send + Sync + 'static,
    Generator: TemplateGenerator + Clone + Send + Sync + 'static,
    SyncStatus: ChainSyncStatus + Clone + Send + Sync + 'static,
    ConnStatus: ConnectionStatus + Clone + Send + Sync + 'static,
{
    /// The network the node runs on, which selects the pay address prefix.
    network: Network,

    /// The block DAG engine.
    dag: Dag,

    /// The mining subsystem that assembles candidate blocks.
    generator: Generator,

    /// The sync manager, used to report `isSynced` to miners.
    sync_status: SyncStatus,

    /// The connection manager, used to refuse mining with no peers.
    connection_status: ConnStatus,

    /// The template cache and long poll registry.
    pub(crate) work_state: Arc<Mutex<WorkState>>,
}

impl<Dag, Generator, SyncStatus, ConnStatus>
    GetBlockTemplateHandler<Dag, Generator, SyncStatus, ConnStatus>
where
    Dag: BlockDag + Clone + Send + Sync + 'static,
    Generator: TemplateGenerator + Clone + Send + Sync + 'static,
    SyncStatus: ChainSyncStatus + Clone + Send + Sync + 'static,
    ConnStatus: ConnectionStatus + Clone + Send + Sync + 'static,
{
    /// Creates a new [`GetBlockTemplateHandler`].
    pub fn new(
        config: Config,
        dag: Dag,
        generator: Generator,
        sync_status: SyncStatus,
        connection_status: ConnStatus,
    ) -> Self {
        Self {
            network: config.network,
            dag,
            generator,
            sync_status,
            connection_status,
            work_state: Arc::new(Mutex::new(WorkState::new())),
        }
    }

    /// Implements the `getBlockTemplate` RPC.
    ///
    /// `close_signal` fires (or its sender drops) when the requesting client
    /// goes away; a long poll that wakes on it fails with the client-quit
    /// error and the transport sends no reply.
    pub async fn get_block_template(
        &self,
        parameters: GetBlockTemplateParameters,
        close_signal: watch::Receiver<()>,
    ) -> RpcResult<GetBlockTemplateResponse> {
        match parameters.mode {
            GetBlockTemplateRequestMode::Template => {
                self.handle_template_request(parameters, close_signal).await
            }
            GetBlockTemplateRequestMode::Proposal => self.handle_proposal_request(parameters),
            GetBlockTemplateRequestMode::Unknown => {
                Err("Invalid mode").map_error(LegacyCode::InvalidParameter)
            }
        }
    }

    /// Handles both plain and long polling requests in `template` mode.
    async fn handle_template_request(
        &self,
        parameters: GetBlockTemplateParameters,
        close_signal: watch::Receiver<()>,
    ) -> RpcResult<GetBlockTemplateResponse> {
        // Refuse to hand out work there is no way to submit: with zero
        // peers a found block cannot be relayed, and no transactions are
        // arriving. The isolated test networks mine without peers.
        if !self.network.is_local_test_network()
            && self.connection_status.connected_peer_count() == 0
        {
            return Err("Okapi is not connected").map_error(LegacyCode::ClientNotConnected);
        }

        let pay_address = Address::decode(&parameters.pay_address, self.network)
            .map_error(LegacyCode::InvalidAddressOrKey)?;

        // A long poll ID means the client holds a template and wants to be
        // answered once it goes stale.
        if let Some(long_poll_id) = &parameters.long_poll_id {
            if !long_poll_id.is_empty() {
                return self
                    .handle_long_poll(long_poll_id, &pay_address, close_signal)
                    .await;
            }
        }

        let mut state = self.work_state.lock().await;
        state.update_block_template(&self.dag, &self.generator, &pay_address)?;
        Ok(state
            .block_template_result(&self.dag, &self.sync_status)?
            .into())
    }

    /// Parks a request until the template identified by `long_poll_id` is
    /// stale, then replies with a fresh template.
    ///
    /// Replies immediately when the ID does not parse or identifies a
    /// template that is already stale.
    async fn handle_long_poll(
        &self,
        long_poll_id: &str,
        pay_address: &Address,
        mut close_signal: watch::Receiver<()>,
    ) -> RpcResult<GetBlockTemplateResponse> {
        let mut release_signal = {
            let mut state = self.work_state.lock().await;
            state.update_block_template(&self.dag, &self.generator, pay_address)?;

            match long_poll_id.parse::<LongPollId>() {
                Ok(id)
                    if id.tip_hashes == state.tip_hashes
                        && id.last_generated == state.last_generated.unix_seconds() =>
                {
                    // The client's template is still current: register for
                    // the release signal before giving up the mutex, so a
                    // concurrent regeneration cannot be missed.
                    state.subscribe(&id.tip_hashes, id.last_generated)
                }

                // The identified template is already stale.
                Ok(_) => {
                    return Ok(state
                        .block_template_result(&self.dag, &self.sync_status)?
                        .into())
                }

                // An ID this server cannot have minted identifies no
                // template at all, which the protocol treats as stale.
                Err(error) => {
                    tracing::debug!(%error, "replying immediately to an unparseable long poll ID");
                    return Ok(state
                        .block_template_result(&self.dag, &self.sync_status)?
                        .into());
                }
            }
        };

        tokio::select! {
            // When the client closes before it's time to send a reply, just
            // return now so the request task doesn't hang around.
            _ = close_signal.changed() => return Err(client_quit_error()),

            // Wait until a release signal is received to send the reply.
            result = release_signal.changed() => {
                let _ = result;
            }
        }

        let mut state = self.work_state.lock().await;
        state.update_block_template(&self.dag, &self.generator, pay_address)?;
        Ok(state
            .block_template_result(&self.dag, &self.sync_status)?
            .into())
    }

    /// Handles a request in `proposal` mode: deserializes the block and runs
    /// it through the engine's usual acceptance rules, except proof-of-work.
    fn handle_proposal_request(
        &self,
        parameters: GetBlockTemplateParameters,
    ) -> RpcResult<GetBlockTemplateResponse> {
        let hex_data = match parameters.data {
            Some(data) if !data.is_empty() => data,
            _ => {
                return Err(
                    "Data must contain the hex-encoded serialized block that is being proposed",
                )
                .map_error(LegacyCode::Type)
            }
        };

        // Lenient decoding: an odd number of digits gets a leading zero.
        let hex_data = if hex_data.len() % 2 != 0 {
            format!("0{hex_data}")
        } else {
            hex_data
        };
        let data = hex::decode(&hex_data)
            .map_err(|_| format!("Data must be a hexadecimal string (not {hex_data:?})"))
            .map_error(LegacyCode::Deserialization)?;

        let block: Block = data
            .as_slice()
            .okapi_deserialize_into()
            .map_err(|error| format!("Block decode failed: {error}"))
            .map_error(LegacyCode::Deserialization)?;

        // A proposal must build from the current tips; anything else is
        // reported as the fixed rejection string, not an error.
        let expected_parent_hashes = self.dag.tip_hashes();
        if block.header.parent_hashes != expected_parent_hashes {
            return Ok(ProposalResponse::Rejected("bad-parentblk".to_string()).into());
        }

        match self.dag.check_connect_block_template(&block) {
            Ok(()) => Ok(ProposalResponse::Valid.into()),
            Err(error) if error.downcast_ref::<RuleError>().is_some() => {
                tracing::info!(%error, "rejected block proposal");
                Ok(ProposalResponse::rejected(&error).into())
            }
            Err(error) => {
                let message = format!("Failed to process block proposal: {error}");
                tracing::error!("{message}");
                Err(message).map_error(LegacyCode::Verify)
            }
        }
    }

    /// Tells the registry that a block was added to the DAG, waking any long
    /// poll whose template does not build on the new tips.
    ///
    /// Template regeneration itself is lazy: the next RPC request rebuilds.
    pub fn on_block_added(&self, tip_hashes: Vec<block::Hash>) {
        let work_state = self.work_state.clone();
        tokio::spawn(async move {
            let mut state = work_state.lock().await;
            let last_tx_update = state.last_tx_update;
            state.notify_long_pollers(&tip_hashes, last_tx_update);
        });
    }

    /// Tells the registry that the mempool changed at `last_updated`, waking
    /// stale long polls once the regeneration window has passed.
    pub fn on_mempool_transaction(&self, last_updated: DateTime64) {
        let work_state = self.work_state.clone();
        tokio::spawn(async move {
            let mut state = work_state.lock().await;

            // No long poller can hold a template if none was ever built.
            if state.tip_hashes.is_empty() || state.last_generated.is_zero() {
                return;
            }

            if DateTime64::now()
                > state
                    .last_generated
                    .saturating_add_millis(TEMPLATE_REGENERATE_SECONDS * 1000)
            {
                let tip_hashes = state.tip_hashes.clone();
                state.notify_long_pollers(&tip_hashes, last_updated);
            }
        });
    }
}
