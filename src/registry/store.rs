//! Peer Registry Store
//!
//! Network → publicKey → Peer mapping. Pure in-memory: peer knowledge is
//! rebuilt from registrations after a restart, there is nothing worth
//! persisting about peers that must re-announce within the expiry window
//! anyway.
//!
//! The store itself is not internally synchronized; callers share it as
//! `Arc<RwLock<PeerRegistry>>` (write lock for upsert and the sweep pass,
//! read lock for list). Every critical section is a single scan or
//! mutation of one map, so no lock is held across an await point.

use std::collections::HashMap;
use tracing::debug;

use crate::error::RegistryError;
use crate::types::{NetworkPolicy, Peer};

use super::RegistryStats;

/// In-memory peer registry, partitioned by network identifier
pub struct PeerRegistry {
    /// Network → (publicKey → Peer)
    networks: HashMap<String, HashMap<String, Peer>>,

    /// Which network identifiers are accepted
    policy: NetworkPolicy,

    /// Maximum peers returned by a single list call
    max_peers_per_response: usize,
}

impl PeerRegistry {
    pub fn new(policy: NetworkPolicy, max_peers_per_response: usize) -> Self {
        Self {
            networks: HashMap::new(),
            policy,
            max_peers_per_response,
        }
    }

    /// Register a peer or refresh an existing registration.
    ///
    /// Validation fully precedes mutation: a rejected request leaves the
    /// store untouched. On success the entry at (network, publicKey) is
    /// inserted or overwritten with the given address and the current
    /// timestamp, creating the per-network map on demand.
    pub fn upsert(
        &mut self,
        network: &str,
        public_key: &str,
        address: &str,
    ) -> Result<(), RegistryError> {
        if !self.policy.allows(network) {
            return Err(RegistryError::UnsupportedNetwork(network.to_string()));
        }

        if public_key.is_empty() {
            return Err(RegistryError::MissingField("publicKey"));
        }

        if address.is_empty() {
            return Err(RegistryError::MissingField("address"));
        }

        self.networks
            .entry(network.to_string())
            .or_default()
            .insert(public_key.to_string(), Peer::new(address, public_key));

        Ok(())
    }

    /// List up to `max_peers_per_response` peers for a network.
    ///
    /// No ordering guarantee; an empty result is not an error. Entries
    /// already removed by the sweeper are never returned, entries that
    /// are stale but not yet swept may be.
    pub fn list(&self, network: &str) -> Result<Vec<Peer>, RegistryError> {
        if !self.policy.allows(network) {
            return Err(RegistryError::UnsupportedNetwork(network.to_string()));
        }

        let peers = match self.networks.get(network) {
            Some(entries) => entries
                .values()
                .take(self.max_peers_per_response)
                .cloned()
                .collect(),
            None => Vec::new(),
        };

        Ok(peers)
    }

    /// Remove every entry unrefreshed for longer than the expiry window.
    ///
    /// Network sub-maps left empty are dropped as well, so closed-set
    /// deployments do not accumulate dead network keys in status output.
    /// Returns the number of entries removed.
    pub fn remove_expired(&mut self, expiry_window_secs: u64) -> usize {
        let mut removed = 0;

        for entries in self.networks.values_mut() {
            let before = entries.len();
            entries.retain(|_, peer| !peer.is_expired(expiry_window_secs));
            removed += before - entries.len();
        }

        self.networks.retain(|_, entries| !entries.is_empty());

        if removed > 0 {
            debug!("Removed {} expired peers", removed);
        }

        removed
    }

    /// Total entries across all networks
    pub fn total_peer_count(&self) -> usize {
        self.networks.values().map(|entries| entries.len()).sum()
    }

    /// The policy this registry was constructed with
    pub fn policy(&self) -> &NetworkPolicy {
        &self.policy
    }

    /// Snapshot of current contents for status reporting
    pub fn stats(&self) -> RegistryStats {
        let peers_per_network = self
            .networks
            .iter()
            .map(|(network, entries)| (network.clone(), entries.len()))
            .collect();

        RegistryStats {
            total_peers: self.total_peer_count(),
            network_count: self.networks.len(),
            peers_per_network,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::current_timestamp;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    fn open_registry() -> PeerRegistry {
        PeerRegistry::new(NetworkPolicy::Open, 20)
    }

    fn closed_registry() -> PeerRegistry {
        PeerRegistry::new(
            NetworkPolicy::Closed(vec!["MAINNET".to_string(), "TESTNET".to_string()]),
            20,
        )
    }

    #[test]
    fn test_upsert_then_list() {
        let mut registry = open_registry();
        registry.upsert("A", "k1", "1.2.3.4:30303").unwrap();

        let peers = registry.list("A").unwrap();
        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].public_key, "k1");
        assert_eq!(peers[0].addr, "1.2.3.4:30303");
        assert!(peers[0].timestamp > 0);
    }

    #[test]
    fn test_list_unknown_network_is_empty_not_error() {
        let registry = open_registry();
        assert_eq!(registry.list("nothing-here").unwrap(), vec![]);
    }

    #[test]
    fn test_upsert_missing_fields() {
        let mut registry = open_registry();

        assert_eq!(
            registry.upsert("A", "", "1.2.3.4:30303"),
            Err(RegistryError::MissingField("publicKey"))
        );
        assert_eq!(
            registry.upsert("A", "k1", ""),
            Err(RegistryError::MissingField("address"))
        );

        // No partial mutation on error
        assert_eq!(registry.total_peer_count(), 0);
        assert!(registry.list("A").unwrap().is_empty());
    }

    #[test]
    fn test_closed_policy_rejects_unknown_network() {
        let mut registry = closed_registry();

        assert_eq!(
            registry.upsert("DEVNET", "k1", "1.2.3.4:30303"),
            Err(RegistryError::UnsupportedNetwork("DEVNET".to_string()))
        );
        assert_eq!(
            registry.list("DEVNET"),
            Err(RegistryError::UnsupportedNetwork("DEVNET".to_string()))
        );

        // Registry state unchanged, enumerated networks still work
        assert_eq!(registry.total_peer_count(), 0);
        registry.upsert("MAINNET", "k1", "1.2.3.4:30303").unwrap();
        assert_eq!(registry.list("MAINNET").unwrap().len(), 1);
    }

    #[test]
    fn test_upsert_overwrites_not_duplicates() {
        let mut registry = open_registry();
        registry.upsert("A", "k1", "1.1.1.1:30303").unwrap();
        registry.upsert("A", "k1", "2.2.2.2:30303").unwrap();

        let peers = registry.list("A").unwrap();
        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].addr, "2.2.2.2:30303");
    }

    #[test]
    fn test_upsert_refreshes_timestamp() {
        let mut registry = open_registry();
        registry.upsert("A", "k1", "1.2.3.4:30303").unwrap();

        // Back-date the entry, then refresh it
        let old = current_timestamp() - 500;
        registry
            .networks
            .get_mut("A")
            .unwrap()
            .get_mut("k1")
            .unwrap()
            .timestamp = old;

        registry.upsert("A", "k1", "1.2.3.4:30303").unwrap();
        let peers = registry.list("A").unwrap();
        assert!(peers[0].timestamp > old);
    }

    #[test]
    fn test_networks_are_partitioned() {
        let mut registry = open_registry();
        registry.upsert("A", "k1", "1.1.1.1:30303").unwrap();
        registry.upsert("B", "k1", "2.2.2.2:30303").unwrap();

        assert_eq!(registry.list("A").unwrap()[0].addr, "1.1.1.1:30303");
        assert_eq!(registry.list("B").unwrap()[0].addr, "2.2.2.2:30303");
        assert_eq!(registry.total_peer_count(), 2);
    }

    #[test]
    fn test_list_capped_at_max() {
        let mut registry = PeerRegistry::new(NetworkPolicy::Open, 20);
        for i in 0..30 {
            registry
                .upsert("A", &format!("k{}", i), &format!("10.0.0.{}:30303", i))
                .unwrap();
        }

        assert_eq!(registry.total_peer_count(), 30);
        assert_eq!(registry.list("A").unwrap().len(), 20);
    }

    #[test]
    fn test_remove_expired() {
        let mut registry = open_registry();
        registry.upsert("A", "k1", "1.2.3.4:30303").unwrap();
        registry.upsert("A", "k2", "5.6.7.8:30303").unwrap();

        // Expiry window 15s: back-date k1 past it, keep k2 fresh
        registry
            .networks
            .get_mut("A")
            .unwrap()
            .get_mut("k1")
            .unwrap()
            .timestamp = current_timestamp() - 16;

        let removed = registry.remove_expired(15);
        assert_eq!(removed, 1);

        let peers = registry.list("A").unwrap();
        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].public_key, "k2");
    }

    #[test]
    fn test_remove_expired_keeps_entries_within_window() {
        let mut registry = open_registry();
        registry.upsert("A", "k1", "1.2.3.4:30303").unwrap();

        // t=10 with a 15s window: still live
        registry
            .networks
            .get_mut("A")
            .unwrap()
            .get_mut("k1")
            .unwrap()
            .timestamp = current_timestamp() - 10;

        assert_eq!(registry.remove_expired(15), 0);
        assert_eq!(registry.list("A").unwrap().len(), 1);
    }

    #[test]
    fn test_remove_expired_drops_empty_networks() {
        let mut registry = open_registry();
        registry.upsert("A", "k1", "1.2.3.4:30303").unwrap();

        registry
            .networks
            .get_mut("A")
            .unwrap()
            .get_mut("k1")
            .unwrap()
            .timestamp = 1;

        registry.remove_expired(60);
        assert_eq!(registry.stats().network_count, 0);
    }

    #[test]
    fn test_stats() {
        let mut registry = open_registry();
        registry.upsert("A", "k1", "1.1.1.1:30303").unwrap();
        registry.upsert("A", "k2", "2.2.2.2:30303").unwrap();
        registry.upsert("B", "k3", "3.3.3.3:30303").unwrap();

        let stats = registry.stats();
        assert_eq!(stats.total_peers, 3);
        assert_eq!(stats.network_count, 2);
        assert_eq!(stats.peers_per_network["A"], 2);
        assert_eq!(stats.peers_per_network["B"], 1);
    }

    #[tokio::test]
    async fn test_concurrent_upserts_distinct_keys() {
        let registry = Arc::new(RwLock::new(PeerRegistry::new(NetworkPolicy::Open, 100)));

        let mut handles = Vec::new();
        for i in 0..32 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let mut reg = registry.write().await;
                reg.upsert("A", &format!("k{}", i), &format!("10.0.0.{}:30303", i))
            }));
        }

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // All upserts independently visible, no lost updates
        let reg = registry.read().await;
        assert_eq!(reg.list("A").unwrap().len(), 32);
    }
}
