//! Defines method signatures for querying the connection manager.

/// An interface for querying how many peers the node is connected to.
///
/// This trait helps avoid a dependency between the RPC layer and the
/// connection manager.
pub trait ConnectionStatus {
    /// Returns the number of currently connected peers.
    fn connected_peer_count(&self) -> usize;
}

/// A mock [`ConnectionStatus`] implementation that allows setting the peer count externally.
#[derive(Clone, Default)]
pub struct MockConnectionStatus {
    connected_peer_count: usize,
}

impl MockConnectionStatus {
    /// Sets the mock peer count returned by `connected_peer_count()`
    pub fn set_connected_peer_count(&mut self, connected_peer_count: usize) {
        self.connected_peer_count = connected_peer_count;
    }
}

impl ConnectionStatus for MockConnectionStatus {
    fn connected_peer_count(&self) -> usize {
        self.connected_peer_count
    }
}
