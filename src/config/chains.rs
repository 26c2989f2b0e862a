// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Sepolia chain ID
pub const SEPOLIA_CHAIN_ID: u64 = 11155111;

/// Deployed ChainVote contract on Sepolia
pub const DEFAULT_CHAINVOTE_CONTRACT: &str = "0xA51A41827dA62e60eBeA86291f587c502Ad791F7";

pub const DEFAULT_RPC_URL: &str = "https://rpc.sepolia.org";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid RPC URL '{url}': {reason}")]
    InvalidRpcUrl { url: String, reason: String },

    #[error("Invalid ChainVote contract address '{0}'")]
    InvalidContract(String),

    #[error("Contract address must not be zero")]
    ZeroContract,

    #[error("Poll interval must be greater than 0")]
    ZeroPollInterval,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainVoteConfig {
    pub chain_id: u64,
    pub name: String,
    pub rpc_url: String,
    pub contract_address: Address,
    pub poll_interval: Duration,
    /// First block the event watcher scans
    pub start_block: Option<u64>,
}

impl ChainVoteConfig {
    pub fn sepolia() -> Self {
        ChainVoteConfig {
            chain_id: SEPOLIA_CHAIN_ID,
            name: "Sepolia".to_string(),
            rpc_url: DEFAULT_RPC_URL.to_string(),
            contract_address: Address::from_str(DEFAULT_CHAINVOTE_CONTRACT)
                .unwrap_or_else(|_| Address::zero()),
            poll_interval: Duration::from_millis(4000),
            start_block: None,
        }
    }

    /// Load configuration from environment variables
    ///
    /// Unset variables fall back to the Sepolia deployment. A contract
    /// address that does not parse is reported rather than replaced.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::sepolia();

        let contract_address = match std::env::var("CHAINVOTE_CONTRACT") {
            Ok(addr) => {
                Address::from_str(&addr).map_err(|_| ConfigError::InvalidContract(addr))?
            }
            Err(_) => defaults.contract_address,
        };

        let config = Self {
            chain_id: std::env::var("CHAINVOTE_CHAIN_ID")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.chain_id),
            name: defaults.name,
            rpc_url: std::env::var("CHAINVOTE_RPC_URL").unwrap_or(defaults.rpc_url),
            contract_address,
            poll_interval: std::env::var("CHAINVOTE_POLL_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
            start_block: std::env::var("CHAINVOTE_START_BLOCK")
                .ok()
                .and_then(|v| v.parse().ok()),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.rpc_url).map_err(|e| ConfigError::InvalidRpcUrl {
            url: self.rpc_url.clone(),
            reason: e.to_string(),
        })?;
        if self.contract_address.is_zero() {
            return Err(ConfigError::ZeroContract);
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }
}

impl Default for ChainVoteConfig {
    fn default() -> Self {
        Self::sepolia()
    }
}
