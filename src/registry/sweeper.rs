//! Expiry Sweeper
//!
//! One long-running background task, spawned eagerly at startup so there
//! is no first-request initialization race. Each tick it takes the write
//! lock once, removes every expired entry, and goes back to sleep; it
//! terminates only with the process.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::api::Metrics;
use crate::api::RateLimiter;
use crate::config::BootnodeConfig;

use super::PeerRegistry;

/// Run the periodic expiry sweep
pub async fn run_sweeper(
    config: Arc<BootnodeConfig>,
    registry: Arc<RwLock<PeerRegistry>>,
    rate_limiter: Arc<RwLock<RateLimiter>>,
    metrics: Arc<Metrics>,
) -> anyhow::Result<()> {
    let mut interval =
        tokio::time::interval(std::time::Duration::from_secs(config.sweep_interval_secs));

    // Rate-limiter bookkeeping does not need to run every tick
    let cleanup_every = (60 / config.sweep_interval_secs).max(1);
    let mut ticks: u64 = 0;

    loop {
        interval.tick().await;
        ticks += 1;

        let removed = {
            let mut reg = registry.write().await;
            reg.remove_expired(config.peer_expiry_secs)
        };

        if removed > 0 {
            metrics.add_peers_swept(removed as u64);
            info!("🧹 Swept {} expired peers", removed);
        }

        if ticks % cleanup_every == 0 {
            let mut limiter = rate_limiter.write().await;
            limiter.cleanup();
        }
    }
}
