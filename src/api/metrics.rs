//! Metrics Collection
//!
//! Atomic counters and gauges for monitoring the boot node, exported in
//! Prometheus text format and as JSON.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Metrics collector for the bootnode service
#[derive(Default)]
pub struct Metrics {
    /// Start time for uptime calculation
    start_time: Option<Instant>,

    /// Total registration requests received
    pub upserts_received: AtomicU64,

    /// Accepted registrations
    pub upserts_accepted: AtomicU64,

    /// Rejected registrations (validation failures)
    pub upserts_rejected: AtomicU64,

    /// Discovery queries served
    pub list_queries: AtomicU64,

    /// Rate-limited requests
    pub rate_limited_requests: AtomicU64,

    /// Entries removed by the expiry sweeper
    pub peers_swept: AtomicU64,

    /// Current registered peers across all networks
    pub active_peers: AtomicU64,

    /// Networks with at least one entry
    pub tracked_networks: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.map(|t| t.elapsed().as_secs()).unwrap_or(0)
    }

    pub fn inc_upserts_received(&self) {
        self.upserts_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_upserts_accepted(&self) {
        self.upserts_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_upserts_rejected(&self) {
        self.upserts_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_list_queries(&self) {
        self.list_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rate_limited(&self) {
        self.rate_limited_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_peers_swept(&self, count: u64) {
        self.peers_swept.fetch_add(count, Ordering::Relaxed);
    }

    pub fn set_active_peers(&self, count: u64) {
        self.active_peers.store(count, Ordering::Relaxed);
    }

    pub fn set_tracked_networks(&self, count: u64) {
        self.tracked_networks.store(count, Ordering::Relaxed);
    }

    /// Export metrics in Prometheus format
    pub fn to_prometheus(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "# HELP bootnode_uptime_seconds Boot node uptime in seconds\n\
             # TYPE bootnode_uptime_seconds gauge\n\
             bootnode_uptime_seconds {}\n\n",
            self.uptime_secs()
        ));

        output.push_str(&format!(
            "# HELP bootnode_upserts_total Total registration requests received\n\
             # TYPE bootnode_upserts_total counter\n\
             bootnode_upserts_total {}\n\n",
            self.upserts_received.load(Ordering::Relaxed)
        ));

        output.push_str(&format!(
            "# HELP bootnode_upserts_accepted Accepted registrations\n\
             # TYPE bootnode_upserts_accepted counter\n\
             bootnode_upserts_accepted {}\n\n",
            self.upserts_accepted.load(Ordering::Relaxed)
        ));

        output.push_str(&format!(
            "# HELP bootnode_upserts_rejected Rejected registrations\n\
             # TYPE bootnode_upserts_rejected counter\n\
             bootnode_upserts_rejected {}\n\n",
            self.upserts_rejected.load(Ordering::Relaxed)
        ));

        output.push_str(&format!(
            "# HELP bootnode_list_queries Discovery queries served\n\
             # TYPE bootnode_list_queries counter\n\
             bootnode_list_queries {}\n\n",
            self.list_queries.load(Ordering::Relaxed)
        ));

        output.push_str(&format!(
            "# HELP bootnode_rate_limited Rate-limited requests\n\
             # TYPE bootnode_rate_limited counter\n\
             bootnode_rate_limited {}\n\n",
            self.rate_limited_requests.load(Ordering::Relaxed)
        ));

        output.push_str(&format!(
            "# HELP bootnode_peers_swept Entries removed by the expiry sweeper\n\
             # TYPE bootnode_peers_swept counter\n\
             bootnode_peers_swept {}\n\n",
            self.peers_swept.load(Ordering::Relaxed)
        ));

        output.push_str(&format!(
            "# HELP bootnode_active_peers Currently registered peers\n\
             # TYPE bootnode_active_peers gauge\n\
             bootnode_active_peers {}\n\n",
            self.active_peers.load(Ordering::Relaxed)
        ));

        output.push_str(&format!(
            "# HELP bootnode_tracked_networks Networks with at least one entry\n\
             # TYPE bootnode_tracked_networks gauge\n\
             bootnode_tracked_networks {}\n\n",
            self.tracked_networks.load(Ordering::Relaxed)
        ));

        output
    }

    /// Export metrics as JSON
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "uptime_secs": self.uptime_secs(),
            "upserts": {
                "received": self.upserts_received.load(Ordering::Relaxed),
                "accepted": self.upserts_accepted.load(Ordering::Relaxed),
                "rejected": self.upserts_rejected.load(Ordering::Relaxed),
            },
            "list_queries": self.list_queries.load(Ordering::Relaxed),
            "rate_limited": self.rate_limited_requests.load(Ordering::Relaxed),
            "peers_swept": self.peers_swept.load(Ordering::Relaxed),
            "registry": {
                "active_peers": self.active_peers.load(Ordering::Relaxed),
                "tracked_networks": self.tracked_networks.load(Ordering::Relaxed),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_increment() {
        let metrics = Metrics::new();

        metrics.inc_upserts_received();
        metrics.inc_upserts_received();
        metrics.inc_upserts_accepted();
        metrics.add_peers_swept(3);

        assert_eq!(metrics.upserts_received.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.upserts_accepted.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.peers_swept.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn test_prometheus_format() {
        let metrics = Metrics::new();
        metrics.set_active_peers(42);
        metrics.set_tracked_networks(3);

        let output = metrics.to_prometheus();

        assert!(output.contains("bootnode_active_peers 42"));
        assert!(output.contains("bootnode_tracked_networks 3"));
    }

    #[test]
    fn test_json_format() {
        let metrics = Metrics::new();
        metrics.inc_list_queries();
        metrics.set_active_peers(7);

        let json = metrics.to_json();

        assert_eq!(json["list_queries"], 1);
        assert_eq!(json["registry"]["active_peers"], 7);
    }
}
