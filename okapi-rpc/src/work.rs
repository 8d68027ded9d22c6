//! The block template cache and long poll notification registry.
//!
//! One [`WorkState`] exists per node, owned by the handler behind a single
//! [`tokio::sync::Mutex`]. Every method here MUST be called with that mutex
//! held; the handler is the only module that locks it.

use std::collections::HashMap;

use jsonrpsee_types::ErrorCode;
use rand::{rngs::OsRng, RngCore};
use tokio::sync::watch;

use okapi_chain::{
    address::Address,
    block::{self, MAX_MASS_PER_BLOCK},
    chain_sync_status::ChainSyncStatus,
    serialization::{DateTime64, OkapiSerialize},
    transaction,
    work::difficulty::CompactDifficulty,
};
use okapi_dag::{
    template::{BlockTemplate, TemplateGenerator},
    BlockDag,
};

use crate::{
    constants::{NONCE_RANGE_FIELD, TEMPLATE_REGENERATE_SECONDS},
    errors::{internal_error, LegacyCode, MapError, OkOrError, RpcResult},
    methods::types::{
        get_block_template::BlockTemplateResponse, long_poll::LongPollId,
        transaction::TransactionTemplate,
    },
};

#[cfg(test)]
mod tests;

/// State shared between `getBlockTemplate` invocations.
///
/// The cached template and the inputs it was generated from are mutated
/// together, so readers always observe a consistent set: either everything
/// reflects the latest regeneration, or `tip_hashes` is empty after an
/// error, which forces the next request to regenerate.
#[derive(Default)]
pub struct WorkState {
    /// The mempool's last-updated time when `template` was generated.
    pub(crate) last_tx_update: DateTime64,

    /// When `template` was generated.
    pub(crate) last_generated: DateTime64,

    /// The DAG tips `template` was built on. Empty until the first template
    /// is generated, and reset to empty when a regeneration fails.
    pub(crate) tip_hashes: Vec<block::Hash>,

    /// The minimum header time allowed for `template`'s block.
    pub(crate) min_timestamp: DateTime64,

    /// The current candidate block.
    pub(crate) template: Option<BlockTemplate>,

    /// The pay address `template`'s coinbase pays to.
    pub(crate) pay_address: Option<Address>,

    /// Release signals for parked long poll requests, keyed by the tip
    /// fingerprint and generation second of the template each waiter holds.
    ///
    /// Waiters holding the same template share one signal. An entry is
    /// removed when its signal fires, so no signal ever fires twice and no
    /// fingerprint maps to an empty set.
    notify_map: HashMap<String, HashMap<i64, watch::Sender<()>>>,
}

/// The concatenated hex form of a tip set, used as the notification key and
/// the first long poll ID field.
pub(crate) fn tip_fingerprint(tip_hashes: &[block::Hash]) -> String {
    tip_hashes.iter().map(ToString::to_string).collect()
}

/// Returns 8 bytes of OS randomness as the coinbase extra-nonce.
fn random_extra_nonce() -> Result<u64, rand::Error> {
    let mut bytes = [0; 8];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(u64::from_le_bytes(bytes))
}

impl WorkState {
    /// Returns a new, empty work state.
    pub fn new() -> Self {
        WorkState::default()
    }

    /// Creates or updates the cached block template.
    ///
    /// A new template is generated when the DAG tips have changed, the pay
    /// address has changed, no usable template exists, or the mempool
    /// contents have changed and at least [`TEMPLATE_REGENERATE_SECONDS`]
    /// have passed since the last generation. Otherwise the existing
    /// template's timestamp is moved forward (and possibly its difficulty,
    /// on test networks).
    pub(crate) fn update_block_template<D, G>(
        &mut self,
        dag: &D,
        generator: &G,
        pay_address: &Address,
    ) -> RpcResult<()>
    where
        D: BlockDag,
        G: TemplateGenerator,
    {
        let mut last_tx_update = generator.tx_source().last_updated();
        if last_tx_update.is_zero() {
            last_tx_update = DateTime64::now();
        }

        let tip_hashes = dag.tip_hashes();
        let regenerate = self.template.is_none()
            || self.tip_hashes.is_empty()
            || self.tip_hashes != tip_hashes
            || self.pay_address.as_ref() != Some(pay_address)
            || (self.last_tx_update != last_tx_update
                && DateTime64::now()
                    > self
                        .last_generated
                        .saturating_add_millis(TEMPLATE_REGENERATE_SECONDS * 1000));

        if regenerate {
            // Reset the tips the template was generated against, so any
            // error below causes the next invocation to try again.
            self.tip_hashes = Vec::new();

            let extra_nonce = random_extra_nonce().map_err(|error| {
                internal_error(format!("Failed to randomize extra nonce: {error}"))
            })?;

            let template = generator
                .new_block_template(pay_address, extra_nonce)
                .map_err(|error| {
                    internal_error(format!("Failed to create new block template: {error}"))
                })?;

            // The minimum allowed timestamp for the block, based on the
            // median timestamp of recent blocks per the consensus rules.
            let min_timestamp = dag.next_block_minimum_time();

            let bits = format!("{:x}", template.block.header.bits);
            tracing::debug!(
                timestamp = %template.block.header.timestamp,
                %bits,
                merkle_root = %template.block.header.hash_merkle_root,
                "generated block template",
            );

            self.template = Some(template);
            self.last_generated = DateTime64::now();
            self.last_tx_update = last_tx_update;
            self.tip_hashes = tip_hashes.clone();
            self.min_timestamp = min_timestamp;
            self.pay_address = Some(pay_address.clone());

            // Wake any long pollers whose template just went stale.
            self.notify_long_pollers(&tip_hashes, last_tx_update);
        } else {
            // A saved template exists and neither the tips nor the pool
            // justify a rebuild, so refresh the existing one in place.
            let template = self
                .template
                .as_mut()
                .expect("the regenerate predicate covers a missing template");

            generator
                .update_block_time(&mut template.block)
                .map_err(|error| {
                    internal_error(format!("Failed to update block template time: {error}"))
                })?;
            template.block.header.nonce = 0;

            let bits = format!("{:x}", template.block.header.bits);
            tracing::debug!(
                timestamp = %template.block.header.timestamp,
                %bits,
                "updated block template",
            );
        }

        Ok(())
    }

    /// Returns the signal receiver that is released once the template
    /// identified by `tip_hashes` and `last_generated` is stale.
    ///
    /// Repeated calls with the same parameters return receivers of the same
    /// signal, so any number of clients can wait on one template without a
    /// separate channel each.
    pub(crate) fn subscribe(
        &mut self,
        tip_hashes: &[block::Hash],
        last_generated: i64,
    ) -> watch::Receiver<()> {
        let fingerprint = tip_fingerprint(tip_hashes);
        let signals = self.notify_map.entry(fingerprint).or_default();
        let sender = signals
            .entry(last_generated)
            .or_insert_with(|| watch::channel(()).0);
        sender.subscribe()
    }

    /// Releases every waiter whose template is stale, given the current tips
    /// and the time of the last mempool change.
    ///
    /// Waiters under any fingerprint other than the current tips are always
    /// released. Waiters under the current tips are released if their
    /// template predates the last mempool change.
    pub(crate) fn notify_long_pollers(
        &mut self,
        tip_hashes: &[block::Hash],
        last_tx_update: DateTime64,
    ) {
        let current_fingerprint = tip_fingerprint(tip_hashes);

        // Signals fire at most once: firing removes them from the map, and
        // dropping the sender releases any receiver that missed the send.
        self.notify_map.retain(|fingerprint, signals| {
            if *fingerprint == current_fingerprint {
                return true;
            }
            for sender in signals.values() {
                let _ = sender.send(());
            }
            false
        });

        // Nothing is stale by age if the pool has never signalled a change.
        if last_tx_update.is_zero() {
            return;
        }

        if let Some(signals) = self.notify_map.get_mut(&current_fingerprint) {
            let last_tx_update_seconds = last_tx_update.unix_seconds();
            signals.retain(|&generated_seconds, sender| {
                if generated_seconds < last_tx_update_seconds {
                    let _ = sender.send(());
                    return false;
                }
                true
            });
            if signals.is_empty() {
                self.notify_map.remove(&current_fingerprint);
            }
        }
    }

    /// Converts the committed work state into the RPC reply.
    pub(crate) fn block_template_result<D, S>(
        &self,
        dag: &D,
        sync_status: &S,
    ) -> RpcResult<BlockTemplateResponse>
    where
        D: BlockDag,
        S: ChainSyncStatus,
    {
        let (template, pay_address) = match (&self.template, &self.pay_address) {
            (Some(template), Some(pay_address)) => (template, pay_address),
            _ => return Err(internal_error("no block template has been generated")),
        };
        let header = &template.block.header;

        // Ensure the template's time is still in the valid range. This
        // should only ever happen if the local clock is moved backwards
        // after the template is generated, but serving such a template
        // would make other nodes delay the mined block.
        let adjusted_now = dag.now();
        let max_time = adjusted_now.saturating_add_millis(dag.timestamp_deviation_tolerance());
        if header.timestamp > max_time {
            return Err(format!(
                "The template time is after the maximum allowed time for a block - \
                 template time {}, maximum time {max_time}",
                header.timestamp,
            ))
            .map_error(LegacyCode::OUT_OF_RANGE);
        }

        // Convert each non-coinbase transaction into a reply entry. The
        // reply omits the coinbase, so `depends` indices are positions in
        // the emitted list, and only previously emitted transactions can
        // appear as dependencies.
        let mut transactions = Vec::with_capacity(template.block.transactions.len().saturating_sub(1));
        let mut reply_index: HashMap<transaction::Hash, u64> = HashMap::new();
        for (i, tx) in template.block.transactions.iter().enumerate().skip(1) {
            let mut depends: Vec<u64> = tx
                .inputs
                .iter()
                .filter_map(|input| reply_index.get(&input.previous_outpoint.tx_id))
                .copied()
                .collect();
            depends.sort_unstable();
            depends.dedup();

            let data = tx
                .okapi_serialize_to_vec()
                .map_err(|error| internal_error(format!("Failed to serialize transaction: {error}")))?;

            let id = tx.id();
            reply_index.insert(id, transactions.len() as u64);
            transactions.push(TransactionTemplate {
                data,
                id,
                depends,
                mass: template.tx_masses[i],
                fee: template.fees[i],
            });
        }

        let target = CompactDifficulty(header.bits)
            .to_expanded()
            .ok_or_error(ErrorCode::InternalError, "template difficulty bits are invalid")?;

        let long_poll_id = LongPollId::new(
            self.tip_hashes.clone(),
            pay_address.to_string(),
            self.last_generated.unix_seconds(),
        );

        Ok(BlockTemplateResponse {
            capabilities: BlockTemplateResponse::capabilities(),
            version: header.version,
            parent_hashes: header.parent_hashes.clone(),
            hash_merkle_root: header.hash_merkle_root,
            accepted_id_merkle_root: header.accepted_id_merkle_root,
            utxo_commitment: header.utxo_commitment,
            transactions,
            long_poll_id: long_poll_id.to_string(),
            target,
            bits: format!("{:x}", header.bits),
            cur_time: header.timestamp,
            min_time: self.min_timestamp,
            max_time,
            mutable: BlockTemplateResponse::mutable_fields(),
            nonce_range: NONCE_RANGE_FIELD.to_string(),
            mass_limit: MAX_MASS_PER_BLOCK,
            height: template.height,
            is_synced: sync_status.is_synced(),
        })
    }

    /// Returns how many fingerprints currently have registered waiters.
    #[cfg(test)]
    pub(crate) fn notify_map_len(&self) -> usize {
        self.notify_map.len()
    }

    /// Returns true if any fingerprint maps to an empty signal set.
    #[cfg(test)]
    pub(crate) fn notify_map_has_empty_entries(&self) -> bool {
        self.notify_map.values().any(HashMap::is_empty)
    }
}
