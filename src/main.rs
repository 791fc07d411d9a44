// Allow dead code - some methods are kept for API completeness
#![allow(dead_code)]

//! Bootnode Service
//!
//! Bootstrap/rendezvous registry for a peer-to-peer network. Nodes
//! register their address and public key under a network identifier;
//! other nodes query the registry to discover live peers.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                       BOOTNODE                         │
//! ├────────────────────────────────────────────────────────┤
//! │  HTTP API (8080)      ←── POST /peers  register peer   │
//! │                       ←── GET  /peers  discover peers  │
//! │  Peer Registry        ←── in-memory, per-network maps  │
//! │  Expiry Sweeper       ←── evicts unrefreshed entries   │
//! └────────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

mod api;
mod config;
mod error;
mod registry;
mod types;

use api::{Metrics, RateLimiter};
use config::BootnodeConfig;
use registry::PeerRegistry;
use types::AddressSource;

/// Bootnode - bootstrap registry for peer-to-peer discovery
#[derive(Parser, Debug)]
#[command(name = "bootnode")]
#[command(version = "0.1.0")]
#[command(about = "Bootstrap rendezvous service for peer-to-peer network discovery", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "bootnode.toml")]
    config: PathBuf,

    /// HTTP API port
    #[arg(long, default_value = "8080")]
    api_port: u16,

    /// Network accepted by this boot node (repeatable; none = open registration)
    #[arg(long = "net")]
    networks: Vec<String>,

    /// Peer expiry window in seconds
    #[arg(long)]
    expiry_secs: Option<u64>,

    /// Where a registering peer's address comes from
    #[arg(long, value_enum)]
    address_source: Option<AddressSource>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .init();

    info!("🌐 Bootnode v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = if args.config.exists() {
        BootnodeConfig::load(&args.config)?
    } else {
        warn!("Config file not found, using defaults");
        BootnodeConfig::default()
    };

    // Override config with CLI args
    let config = config
        .with_api_port(args.api_port)
        .with_networks(args.networks)
        .with_peer_expiry_secs(args.expiry_secs)
        .with_address_source(args.address_source);

    config.validate()?;

    info!("⚙️  Configuration:");
    info!("   API port: {}", config.api_port);
    info!("   Peer expiry: {}s", config.peer_expiry_secs);
    info!("   Sweep interval: {}s", config.sweep_interval_secs);
    info!("   Address source: {:?}", config.address_source);
    if config.networks.is_empty() {
        info!("   Networks: open (any identifier accepted)");
    } else {
        info!("   Networks: {}", config.networks.join(", "));
    }

    let shared_config = Arc::new(config);

    // Initialize peer registry
    let registry = Arc::new(RwLock::new(PeerRegistry::new(
        shared_config.network_policy(),
        shared_config.max_peers_per_response,
    )));

    // Rate limiter shared between the API and maintenance
    let rate_limiter = Arc::new(RwLock::new(RateLimiter::new(
        shared_config.rate_limit_per_minute,
        shared_config.max_violations_before_ban,
        shared_config.ban_duration_secs,
    )));

    // Initialize metrics
    let metrics = Arc::new(Metrics::new());

    // Sweeper starts eagerly with the process, not on first registration
    let sweeper_handle = tokio::spawn(registry::sweeper::run_sweeper(
        shared_config.clone(),
        registry.clone(),
        rate_limiter.clone(),
        metrics.clone(),
    ));

    let api_handle = tokio::spawn(api::run_api_server(
        shared_config.clone(),
        registry.clone(),
        rate_limiter.clone(),
        metrics.clone(),
    ));

    info!("✅ All services started");
    info!("   Press Ctrl+C to shutdown gracefully");

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("🛑 Shutdown signal received");
        }
        result = sweeper_handle => {
            error!("Expiry sweeper exited: {:?}", result);
        }
        result = api_handle => {
            error!("HTTP API exited: {:?}", result);
        }
    }

    info!("👋 Bootnode shutting down");
    Ok(())
}
