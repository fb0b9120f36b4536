//! Environment-based Configuration
//!
//! Configuration loading from environment variables. Sensitive values
//! (signing keys) must come from the environment, never from hardcoded
//! defaults outside devnet.
//!
//! # Environment Variables
//!
//! - `BLOOM_NETWORK` - "mainnet", "testnet", or "devnet" (default: "devnet")
//! - `BLOOM_BRIDGE_API` - HTLC bridge API endpoint URL
//! - `BLOOM_SIGNER_KEY` - hex-encoded 32-byte intent signing key (live mode)
//! - `BLOOM_REDEEM_TTL_SECS` - intent deadline TTL (default: 86400 = 24h)
//! - `BLOOM_RATE_LIMIT_MAX` - requests per address per window (default: 10)
//! - `BLOOM_RATE_LIMIT_WINDOW_SECS` - rate-limit window (default: 3600 = 1h)
//! - `BLOOM_LOG_LEVEL` - logging level (debug, info, warn, error)

use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("network mismatch: expected {0}, got {1}")]
    NetworkMismatch(String, String),
}

/// Network environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Testnet,
    Devnet,
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            "devnet" | "dev" => Ok(Network::Devnet),
            _ => Err(ConfigError::InvalidValue(
                "BLOOM_NETWORK".to_string(),
                format!("unknown network: {}", s),
            )),
        }
    }
}

impl Network {
    /// Devnet runs against the simulated bridge
    pub fn uses_simulated_bridge(&self) -> bool {
        matches!(self, Network::Devnet)
    }

    /// Get default bridge API endpoint for this network
    pub fn default_bridge_api(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://bridge.bloom.money/api",
            Network::Testnet => "https://bridge-testnet.bloom.money/api",
            Network::Devnet => "http://localhost:7070/api",
        }
    }

    /// Get bitcoin network enum
    pub fn bitcoin_network(&self) -> bitcoin::Network {
        match self {
            Network::Mainnet => bitcoin::Network::Bitcoin,
            Network::Testnet | Network::Devnet => bitcoin::Network::Testnet,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Network environment
    pub network: Network,

    /// HTLC bridge API endpoint (live mode)
    pub bridge_api: String,

    /// Hex-encoded intent signing key (live mode; empty on devnet means
    /// "generate an ephemeral key")
    pub signer_key: String,

    /// Intent deadline TTL in seconds
    pub redeem_ttl_secs: u64,

    /// Maximum redemption requests per address per window
    pub rate_limit_max: u32,

    /// Rate-limit window in seconds
    pub rate_limit_window_secs: u64,

    /// Log level
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            network: Network::Devnet,
            bridge_api: Network::Devnet.default_bridge_api().to_string(),
            signer_key: String::new(),
            redeem_ttl_secs: 24 * 60 * 60,
            rate_limit_max: 10,
            rate_limit_window_secs: 60 * 60,
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let network: Network = env::var("BLOOM_NETWORK")
            .unwrap_or_else(|_| "devnet".to_string())
            .parse()?;

        let bridge_api = env::var("BLOOM_BRIDGE_API")
            .unwrap_or_else(|_| network.default_bridge_api().to_string());

        // Signing key required off-devnet
        let signer_key = match env::var("BLOOM_SIGNER_KEY") {
            Ok(key) => key,
            Err(_) if network == Network::Devnet => String::new(),
            Err(_) => return Err(ConfigError::MissingEnvVar("BLOOM_SIGNER_KEY".to_string())),
        };

        let redeem_ttl_secs = parse_env_u64("BLOOM_REDEEM_TTL_SECS", 24 * 60 * 60)?;
        let rate_limit_max = parse_env_u64("BLOOM_RATE_LIMIT_MAX", 10)? as u32;
        let rate_limit_window_secs = parse_env_u64("BLOOM_RATE_LIMIT_WINDOW_SECS", 60 * 60)?;

        let log_level = env::var("BLOOM_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            network,
            bridge_api,
            signer_key,
            redeem_ttl_secs,
            rate_limit_max,
            rate_limit_window_secs,
            log_level,
        })
    }

    /// Validate configuration for production readiness
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        if self.network != Network::Mainnet {
            return Err(ConfigError::NetworkMismatch(
                "mainnet".to_string(),
                format!("{:?}", self.network),
            ));
        }

        if self.signer_key.is_empty() {
            return Err(ConfigError::MissingEnvVar("BLOOM_SIGNER_KEY".to_string()));
        }

        Ok(())
    }

    /// Print configuration summary (hiding sensitive values)
    pub fn print_summary(&self) {
        println!("=== Bloom Redemption Configuration ===");
        println!("Network: {:?}", self.network);
        println!("Bridge API: {}", self.bridge_api);
        println!(
            "Signer Key: {}",
            if self.signer_key.is_empty() {
                "<ephemeral>"
            } else {
                "<set>"
            }
        );
        println!("Redeem TTL: {} secs", self.redeem_ttl_secs);
        println!(
            "Rate Limit: {} requests / {} secs",
            self.rate_limit_max, self.rate_limit_window_secs
        );
        println!("Log Level: {}", self.log_level);
        println!("======================================");
    }
}

fn parse_env_u64(var_name: &str, default: u64) -> Result<u64, ConfigError> {
    match env::var(var_name) {
        Ok(value) => value.parse().map_err(|_| {
            ConfigError::InvalidValue(var_name.to_string(), "must be a number".to_string())
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_parsing() {
        assert!(matches!("mainnet".parse::<Network>(), Ok(Network::Mainnet)));
        assert!(matches!("testnet".parse::<Network>(), Ok(Network::Testnet)));
        assert!(matches!("devnet".parse::<Network>(), Ok(Network::Devnet)));
        assert!("invalid".parse::<Network>().is_err());
    }

    #[test]
    fn test_bridge_mode_selection() {
        assert!(Network::Devnet.uses_simulated_bridge());
        assert!(!Network::Testnet.uses_simulated_bridge());
        assert!(!Network::Mainnet.uses_simulated_bridge());
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.redeem_ttl_secs, 86_400);
        assert_eq!(config.rate_limit_max, 10);
        assert_eq!(config.rate_limit_window_secs, 3_600);
    }

    #[test]
    fn test_production_validation() {
        let config = EngineConfig::default();
        assert!(config.validate_for_production().is_err());

        let config = EngineConfig {
            network: Network::Mainnet,
            signer_key: "ab".repeat(32),
            ..EngineConfig::default()
        };
        assert!(config.validate_for_production().is_ok());
    }
}
