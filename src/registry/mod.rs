//! Peer Registry Module
//!
//! In-memory, network-partitioned store of registered peers, plus the
//! background sweep that evicts entries whose registration has expired.
//! Registration doubles as keep-alive: every successful upsert refreshes
//! the entry's timestamp.

mod store;
pub mod sweeper;

pub use store::PeerRegistry;

use std::collections::BTreeMap;

/// Snapshot of registry contents for status reporting
#[derive(Debug, Clone, Default)]
pub struct RegistryStats {
    /// Total entries across all networks
    pub total_peers: usize,

    /// Number of networks with at least one entry
    pub network_count: usize,

    /// Entry count per network
    pub peers_per_network: BTreeMap<String, usize>,
}
