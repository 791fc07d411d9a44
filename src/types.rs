//! Core types for the bootstrap registry
//!
//! A peer is identified by its public key within a network. Networks are
//! opaque string identifiers; whether the set of accepted networks is open
//! or closed is a deployment decision, not a per-request one.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// A registered peer as stored and as served over the wire.
///
/// The serialized form uses the field names `addr`, `publicKey` and
/// `timestamp`; each field is omitted entirely when empty/zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    /// Connection endpoint (`ip:port` or similar)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub addr: String,

    /// Identity key within the network
    #[serde(rename = "publicKey", default, skip_serializing_if = "String::is_empty")]
    pub public_key: String,

    /// Last successful registration (Unix epoch seconds)
    #[serde(default, skip_serializing_if = "is_zero")]
    pub timestamp: u64,
}

fn is_zero(v: &u64) -> bool {
    *v == 0
}

impl Peer {
    /// Create a peer entry timestamped now
    pub fn new(addr: impl Into<String>, public_key: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            public_key: public_key.into(),
            timestamp: current_timestamp(),
        }
    }

    /// Check whether the entry has outlived the expiry window
    pub fn is_expired(&self, expiry_window_secs: u64) -> bool {
        current_timestamp().saturating_sub(self.timestamp) > expiry_window_secs
    }
}

/// Which network identifiers the registry accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkPolicy {
    /// Any identifier is accepted; networks are created on demand
    Open,

    /// Only the enumerated identifiers are accepted; unknown networks
    /// are rejected, never silently created
    Closed(Vec<String>),
}

impl NetworkPolicy {
    /// Derive the policy from a configured network list.
    ///
    /// An empty list means open registration, matching the original
    /// boot-node flag semantics.
    pub fn from_list(networks: &[String]) -> Self {
        if networks.is_empty() {
            NetworkPolicy::Open
        } else {
            NetworkPolicy::Closed(networks.to_vec())
        }
    }

    pub fn allows(&self, network: &str) -> bool {
        match self {
            NetworkPolicy::Open => true,
            NetworkPolicy::Closed(list) => list.iter().any(|n| n == network),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, NetworkPolicy::Open)
    }
}

/// Where a registering peer's advertised address comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AddressSource {
    /// The request body supplies the full address
    #[default]
    Client,

    /// The address is derived from the transport-layer source IP, with
    /// the listening port taken from the request body when present
    Transport,
}

impl AddressSource {
    /// Resolve the address a peer should be registered under
    pub fn resolve(&self, body_address: &str, body_port: Option<u16>, remote: SocketAddr) -> String {
        match self {
            AddressSource::Client => body_address.to_string(),
            AddressSource::Transport => {
                SocketAddr::new(remote.ip(), body_port.unwrap_or_else(|| remote.port())).to_string()
            }
        }
    }
}

/// Current Unix timestamp in seconds
pub fn current_timestamp() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}
