//! Bootnode Configuration
//!
//! Configurable parameters for the bootstrap registry service.
//! Defaults match the behavior of the original boot node: day-long peer
//! expiry, one-second sweep ticks, twenty peers per discovery response.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::{AddressSource, NetworkPolicy};

/// Main configuration for the bootnode service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootnodeConfig {
    // === Timing ===

    /// Time after which an unrefreshed peer entry expires (seconds)
    pub peer_expiry_secs: u64,

    /// Interval between expiry sweep passes (seconds)
    pub sweep_interval_secs: u64,

    // === Limits ===

    /// Maximum peers returned by a single discovery query
    pub max_peers_per_response: usize,

    // === Network ===

    /// Port for the HTTP API
    pub api_port: u16,

    /// Networks accepted by this boot node.
    /// Empty list = open registration (any network identifier accepted).
    pub networks: Vec<String>,

    /// Where a registering peer's advertised address comes from
    pub address_source: AddressSource,

    // === Rate limiting ===

    /// Maximum registration requests per IP per minute
    pub rate_limit_per_minute: u32,

    /// Violations before an IP is temporarily banned
    pub max_violations_before_ban: u32,

    /// Ban duration for misbehaving IPs (seconds)
    pub ban_duration_secs: u64,
}

impl Default for BootnodeConfig {
    fn default() -> Self {
        Self {
            // Timing
            peer_expiry_secs: 24 * 60 * 60, // 1 day
            sweep_interval_secs: 1,

            // Limits
            max_peers_per_response: 20,

            // Network
            api_port: 8080,
            networks: vec![],
            address_source: AddressSource::Client,

            // Rate limiting
            rate_limit_per_minute: 60,
            max_violations_before_ban: 5,
            ban_duration_secs: 3600, // 1 hour
        }
    }
}

impl BootnodeConfig {
    /// Load configuration from TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The network policy implied by the configured network list
    pub fn network_policy(&self) -> NetworkPolicy {
        NetworkPolicy::from_list(&self.networks)
    }

    // Builder-style methods for CLI overrides

    pub fn with_api_port(mut self, port: u16) -> Self {
        self.api_port = port;
        self
    }

    pub fn with_networks(mut self, networks: Vec<String>) -> Self {
        if !networks.is_empty() {
            self.networks = networks;
        }
        self
    }

    pub fn with_peer_expiry_secs(mut self, secs: Option<u64>) -> Self {
        if let Some(secs) = secs {
            self.peer_expiry_secs = secs;
        }
        self
    }

    pub fn with_address_source(mut self, source: Option<AddressSource>) -> Self {
        if let Some(source) = source {
            self.address_source = source;
        }
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.peer_expiry_secs == 0 {
            anyhow::bail!("peer_expiry_secs must be greater than zero");
        }

        if self.sweep_interval_secs == 0 {
            anyhow::bail!("sweep_interval_secs must be greater than zero");
        }

        if self.sweep_interval_secs > self.peer_expiry_secs {
            anyhow::bail!(
                "sweep_interval_secs ({}) must not exceed peer_expiry_secs ({})",
                self.sweep_interval_secs,
                self.peer_expiry_secs
            );
        }

        if self.max_peers_per_response == 0 {
            anyhow::bail!("max_peers_per_response must be greater than zero");
        }

        if self.rate_limit_per_minute == 0 {
            anyhow::bail!("rate_limit_per_minute must be greater than zero");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BootnodeConfig::default();
        assert_eq!(config.peer_expiry_secs, 86400);
        assert_eq!(config.sweep_interval_secs, 1);
        assert_eq!(config.max_peers_per_response, 20);
        assert!(config.network_policy().is_open());
    }

    #[test]
    fn test_config_validation() {
        let mut config = BootnodeConfig::default();
        assert!(config.validate().is_ok());

        // Invalid: sweep slower than expiry
        config.peer_expiry_secs = 10;
        config.sweep_interval_secs = 30;
        assert!(config.validate().is_err());

        // Invalid: zero expiry
        config = BootnodeConfig::default();
        config.peer_expiry_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder_methods() {
        let config = BootnodeConfig::default()
            .with_api_port(9090)
            .with_networks(vec!["MAINNET".to_string(), "TESTNET".to_string()])
            .with_peer_expiry_secs(Some(600))
            .with_address_source(Some(AddressSource::Transport));

        assert_eq!(config.api_port, 9090);
        assert_eq!(config.networks.len(), 2);
        assert_eq!(config.peer_expiry_secs, 600);
        assert_eq!(config.address_source, AddressSource::Transport);
        assert!(!config.network_policy().is_open());
    }

    #[test]
    fn test_empty_cli_networks_keep_config_list() {
        let config = BootnodeConfig {
            networks: vec!["MAINNET".to_string()],
            ..Default::default()
        }
        .with_networks(vec![]);

        assert_eq!(config.networks, vec!["MAINNET".to_string()]);
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bootnode.toml");

        let config = BootnodeConfig {
            peer_expiry_secs: 900,
            networks: vec!["MAINNET".to_string()],
            address_source: AddressSource::Transport,
            ..Default::default()
        };

        config.save(&path).unwrap();
        let loaded = BootnodeConfig::load(&path).unwrap();

        assert_eq!(loaded.peer_expiry_secs, 900);
        assert_eq!(loaded.networks, vec!["MAINNET".to_string()]);
        assert_eq!(loaded.address_source, AddressSource::Transport);
    }
}
