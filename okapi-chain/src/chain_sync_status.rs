//! Defines method signatures for checking if the node is synced with the rest of the network.

/// An interface for checking if the local DAG is synced with the network.
pub trait ChainSyncStatus {
    /// Check if the local DAG is likely caught up to the network tips.
    fn is_synced(&self) -> bool;
}

/// A mock [`ChainSyncStatus`] implementation that allows setting the status externally.
#[derive(Clone, Default)]
pub struct MockSyncStatus {
    is_synced: bool,
}

impl MockSyncStatus {
    /// Sets mock sync status determining the return value of `is_synced()`
    pub fn set_is_synced(&mut self, is_synced: bool) {
        self.is_synced = is_synced;
    }
}

impl ChainSyncStatus for MockSyncStatus {
    fn is_synced(&self) -> bool {
        self.is_synced
    }
}
