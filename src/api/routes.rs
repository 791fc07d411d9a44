//! API Routes
//!
//! HTTP endpoints for peer registration and discovery, plus health,
//! status and metrics. This layer is thin plumbing: it decodes requests,
//! applies the rate limit, and calls into the registry.

use axum::{
    extract::{ConnectInfo, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};

use crate::api::{Metrics, RateLimiter};
use crate::config::BootnodeConfig;
use crate::error::RegistryError;
use crate::registry::PeerRegistry;

/// Shared API state
pub struct ApiState {
    pub config: Arc<BootnodeConfig>,
    pub registry: Arc<RwLock<PeerRegistry>>,
    pub rate_limiter: Arc<RwLock<RateLimiter>>,
    pub metrics: Arc<Metrics>,
}

/// Registration request body.
///
/// `address` is required in client addressing mode; `port` is only
/// consulted in transport mode, where the advertised address is derived
/// from the connection's source IP.
#[derive(Debug, Deserialize)]
struct UpsertRequest {
    #[serde(default)]
    network: String,

    #[serde(rename = "publicKey", default)]
    public_key: String,

    #[serde(default)]
    address: String,

    #[serde(default)]
    port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct ListParams {
    #[serde(default)]
    network: String,
}

/// Build the application router
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Registration & discovery
        .route("/peers", post(add_peer).get(get_peers))
        // Health & status
        .route("/health", get(health_check))
        .route("/status", get(get_status))
        // Metrics
        .route("/metrics", get(get_metrics_prometheus))
        .route("/metrics/json", get(get_metrics_json))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Run the HTTP API server
pub async fn run_api_server(
    config: Arc<BootnodeConfig>,
    registry: Arc<RwLock<PeerRegistry>>,
    rate_limiter: Arc<RwLock<RateLimiter>>,
    metrics: Arc<Metrics>,
) -> anyhow::Result<()> {
    let state = Arc::new(ApiState {
        config: config.clone(),
        registry,
        rate_limiter,
        metrics,
    });

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
    info!("📊 HTTP API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn registry_error_response(err: RegistryError) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, err.to_string())
}

/// POST /peers - register a peer or refresh its entry
async fn add_peer(
    State(state): State<Arc<ApiState>>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    Json(req): Json<UpsertRequest>,
) -> impl IntoResponse {
    state.metrics.inc_upserts_received();

    {
        let mut limiter = state.rate_limiter.write().await;
        if !limiter.allow(remote.ip()) {
            state.metrics.inc_rate_limited();
            return (StatusCode::TOO_MANY_REQUESTS, "Rate limited".to_string());
        }
    }

    let address = state
        .config
        .address_source
        .resolve(&req.address, req.port, remote);

    let result = {
        let mut reg = state.registry.write().await;
        reg.upsert(&req.network, &req.public_key, &address)
    };

    match result {
        Ok(()) => {
            state.metrics.inc_upserts_accepted();
            debug!(
                "Registered peer {} at {} on network {}",
                req.public_key, address, req.network
            );
            (StatusCode::OK, String::new())
        }
        Err(err) => {
            state.metrics.inc_upserts_rejected();
            debug!("Rejected registration from {}: {}", remote, err);
            registry_error_response(err)
        }
    }
}

/// GET /peers?network=NAME - list peers for discovery
async fn get_peers(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    state.metrics.inc_list_queries();

    let result = {
        let reg = state.registry.read().await;
        reg.list(&params.network)
    };

    match result {
        Ok(peers) => (StatusCode::OK, Json(peers)).into_response(),
        Err(err) => registry_error_response(err).into_response(),
    }
}

/// GET /health - Simple health check
async fn health_check() -> impl IntoResponse {
    "OK"
}

/// GET /status - Detailed status
async fn get_status(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let reg = state.registry.read().await;
    let stats = reg.stats();

    let status = serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.metrics.uptime_secs(),
        "policy": if reg.policy().is_open() { "open" } else { "closed" },
        "networks": state.config.networks,
        "registry": {
            "total_peers": stats.total_peers,
            "network_count": stats.network_count,
            "peers_per_network": stats.peers_per_network,
        }
    });

    Json(status)
}

/// GET /metrics - Prometheus format metrics
async fn get_metrics_prometheus(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    refresh_registry_gauges(&state).await;

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        state.metrics.to_prometheus(),
    )
}

/// GET /metrics/json - JSON format metrics
async fn get_metrics_json(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    refresh_registry_gauges(&state).await;

    Json(state.metrics.to_json())
}

async fn refresh_registry_gauges(state: &ApiState) {
    let reg = state.registry.read().await;
    let stats = reg.stats();
    state.metrics.set_active_peers(stats.total_peers as u64);
    state.metrics.set_tracked_networks(stats.network_count as u64);
}
