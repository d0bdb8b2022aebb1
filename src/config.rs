//! Environment-based configuration for the zVault indexer.
//!
//! All sensitive values (keys, secrets) MUST come from environment
//! variables, never from hardcoded values.
//!
//! # Environment Variables
//!
//! ## Network
//! - `ZVAULT_NETWORK` - "mainnet", "testnet", or "devnet" (default: "devnet")
//! - `ZVAULT_SOLANA_RPC` - Solana RPC endpoint URL
//!
//! ## Program accounts (must match deployed contracts)
//! - `ZVAULT_PROGRAM_ID` - zVault program ID
//! - `ZVAULT_POOL_STATE` - Pool state PDA
//! - `ZVAULT_COMMITMENT_TREE` - Commitment tree PDA
//! - `ZVAULT_ZBTC_MINT` - zBTC mint address
//!
//! ## Keys
//! - `ZVAULT_RELAYER_KEY` - Base58-encoded Solana keypair used to submit
//!   announcements/claims on a user's behalf
//! - `ZVAULT_ADMIN_KEY` - Base58-encoded Solana keypair with admin rights
//!   over the pool (optional; only needed for admin operations)
//!
//! ## Optional
//! - `ZVAULT_LOG_LEVEL` - logging level (debug, info, warn, error)

use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("network mismatch: expected {0}, got {1}")]
    NetworkMismatch(String, String),
}

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
                "ZVAULT_NETWORK".to_string(),
                format!("unknown network: {}", s),
            )),
        }
    }
}

impl Network {
    pub fn default_solana_rpc(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://api.mainnet-beta.solana.com",
            Network::Testnet => "https://api.testnet.solana.com",
            Network::Devnet => "https://api.devnet.solana.com",
        }
    }
}

/// Indexer configuration.
#[derive(Debug, Clone)]
pub struct ZVaultConfig {
    pub network: Network,
    pub solana_rpc: String,
    pub program_id: String,
    pub pool_state: String,
    pub commitment_tree: String,
    pub zbtc_mint: String,
    /// Base58-encoded relayer keypair, if one was provided.
    pub relayer_key: Option<String>,
    /// Base58-encoded admin keypair, if one was provided.
    pub admin_key: Option<String>,
    pub log_level: String,
}

impl ZVaultConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let network: Network = env::var("ZVAULT_NETWORK")
            .unwrap_or_else(|_| "devnet".to_string())
            .parse()?;

        let solana_rpc = env::var("ZVAULT_SOLANA_RPC")
            .unwrap_or_else(|_| network.default_solana_rpc().to_string());

        let program_id = get_required_or_devnet_default(
            "ZVAULT_PROGRAM_ID",
            "AtztELZfz3GHA8hFQCv7aT9Mt47Xhknv3ZCNb3fmXsgf",
            network,
        )?;

        let pool_state = get_required_or_devnet_default(
            "ZVAULT_POOL_STATE",
            "8bbcVecB619HHsHn2TQMraJ8R8WjQjApdZY7h9JCJW7b",
            network,
        )?;

        let commitment_tree = get_required_or_devnet_default(
            "ZVAULT_COMMITMENT_TREE",
            "HtfDXZ5mBQNBdZrDxJMbXCDkyUqFdTDj7zAqo3aqrqiA",
            network,
        )?;

        let zbtc_mint = get_required_or_devnet_default(
            "ZVAULT_ZBTC_MINT",
            "HiDyAcEBTS7SRiLA49BZ5B6XMBAksgwLEAHpvteR8vbV",
            network,
        )?;

        let relayer_key = env::var("ZVAULT_RELAYER_KEY").ok();
        let admin_key = env::var("ZVAULT_ADMIN_KEY").ok();

        let log_level = env::var("ZVAULT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            network,
            solana_rpc,
            program_id,
            pool_state,
            commitment_tree,
            zbtc_mint,
            relayer_key,
            admin_key,
            log_level,
        })
    }

    /// Validate configuration for production readiness.
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        if self.network != Network::Mainnet {
            return Err(ConfigError::NetworkMismatch(
                "mainnet".to_string(),
                format!("{:?}", self.network),
            ));
        }
        Ok(())
    }

    /// Print configuration summary (hiding sensitive values).
    pub fn print_summary(&self) {
        println!("=== zVault Indexer Configuration ===");
        println!("Network: {:?}", self.network);
        println!("Solana RPC: {}", self.solana_rpc);
        println!("Program ID: {}", self.program_id);
        println!("Pool State: {}", self.pool_state);
        println!("Commitment Tree: {}", self.commitment_tree);
        println!("zBTC Mint: {}", self.zbtc_mint);
        println!("Relayer Key: {}", if self.relayer_key.is_some() { "set" } else { "unset" });
        println!("Admin Key: {}", if self.admin_key.is_some() { "set" } else { "unset" });
        println!("Log Level: {}", self.log_level);
        println!("=====================================");
    }
}

fn get_required_or_devnet_default(
    var_name: &str,
    devnet_default: &str,
    network: Network,
) -> Result<String, ConfigError> {
    match env::var(var_name) {
        Ok(value) => Ok(value),
        Err(_) => {
            if network == Network::Devnet {
                Ok(devnet_default.to_string())
            } else {
                Err(ConfigError::MissingEnvVar(var_name.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_parses_common_aliases() {
        assert!(matches!("mainnet".parse::<Network>(), Ok(Network::Mainnet)));
        assert!(matches!("testnet".parse::<Network>(), Ok(Network::Testnet)));
        assert!(matches!("devnet".parse::<Network>(), Ok(Network::Devnet)));
        assert!("invalid".parse::<Network>().is_err());
    }

    #[test]
    fn production_validation_requires_mainnet() {
        let mut config = ZVaultConfig {
            network: Network::Devnet,
            solana_rpc: String::new(),
            program_id: String::new(),
            pool_state: String::new(),
            commitment_tree: String::new(),
            zbtc_mint: String::new(),
            relayer_key: None,
            admin_key: None,
            log_level: "info".to_string(),
        };
        assert!(config.validate_for_production().is_err());
        config.network = Network::Mainnet;
        assert!(config.validate_for_production().is_ok());
    }
}
