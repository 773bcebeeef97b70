//! Centralized configuration (environment variables + defaults).
//!
//! Binaries call `dotenv::dotenv().ok()` first, so a local `.env` file can
//! provide any of these.

use alloy::primitives::Address;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::crypto::wallet::{DEFAULT_MNEMONIC, DEFAULT_POOL_SIZE};
use crate::error::ConfigError;

pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// First contract address a fresh anvil node assigns to a deployment from account 0.
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// JSON-RPC endpoint of the chain hosting the registry.
pub fn rpc_url() -> Result<String, ConfigError> {
    let value = var_or("RPC_URL", DEFAULT_RPC_URL);
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(ConfigError::Invalid {
            var: "RPC_URL",
            expected: "http(s) URL",
            value,
        });
    }
    Ok(value)
}

/// Address of the deployed registry contract.
pub fn contract_address() -> Result<Address, ConfigError> {
    let value = var_or("CONTRACT_ADDRESS", DEFAULT_CONTRACT_ADDRESS);
    Address::from_str(value.trim()).map_err(|_| ConfigError::Invalid {
        var: "CONTRACT_ADDRESS",
        expected: "20-byte hex address",
        value,
    })
}

/// Seed phrase for the test identity pool.
pub fn mnemonic() -> String {
    var_or("MNEMONIC", DEFAULT_MNEMONIC)
}

/// Number of identities derived from the seed phrase.
pub fn wallet_count() -> Result<usize, ConfigError> {
    let value = var_or("WALLET_COUNT", &DEFAULT_POOL_SIZE.to_string());
    value
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or(ConfigError::Invalid {
            var: "WALLET_COUNT",
            expected: "positive integer",
            value,
        })
}

/// Listen address of the HTTP API.
pub fn bind_addr() -> Result<SocketAddr, ConfigError> {
    let value = var_or("API_BIND_ADDR", DEFAULT_BIND_ADDR);
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        var: "API_BIND_ADDR",
        expected: "socket address",
        value,
    })
}

/// Snapshot of every recognized option, resolved once at start-up.
#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub contract_address: Address,
    pub mnemonic: String,
    pub wallet_count: usize,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            rpc_url: rpc_url()?,
            contract_address: contract_address()?,
            mnemonic: mnemonic(),
            wallet_count: wallet_count()?,
            bind_addr: bind_addr()?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            contract_address: Address::from_str(DEFAULT_CONTRACT_ADDRESS)
                .unwrap_or(Address::ZERO),
            mnemonic: DEFAULT_MNEMONIC.to_string(),
            wallet_count: DEFAULT_POOL_SIZE,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_contract_address_parses() {
        let cfg = Config::default();
        assert_ne!(cfg.contract_address, Address::ZERO);
        assert_eq!(cfg.wallet_count, 10);
        assert_eq!(cfg.rpc_url, "http://localhost:8545");
    }
}
