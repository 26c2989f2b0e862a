// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Relayer SDK surface
//!
//! The FHE relayer SDK is consumed as a black box. These traits describe the
//! parts of it the session manager touches: the global library binding, the
//! instance it creates, and the per-call encrypted-input builder.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

use super::provider::NetworkTransport;

/// Name of the default network configuration the library must export
pub const DEFAULT_CONFIG_NAME: &str = "SepoliaConfig";

/// Key the transport is merged under in the instance configuration
pub const NETWORK_KEY: &str = "network";

/// Plain settings of a network configuration (chain id, relayer URL, ...)
pub type NetworkConfig = Map<String, Value>;

/// Members the loaded library binding actually exposes
#[derive(Debug, Clone, Default)]
pub struct SdkExports {
    pub init_sdk: bool,
    pub create_instance: bool,
    pub default_config: Option<NetworkConfig>,
}

impl SdkExports {
    /// Names of the expected members that are missing
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.init_sdk {
            missing.push("initSDK");
        }
        if !self.create_instance {
            missing.push("createInstance");
        }
        if self.default_config.is_none() {
            missing.push(DEFAULT_CONFIG_NAME);
        }
        missing
    }
}

/// Configuration handed to `createInstance`
#[derive(Clone)]
pub struct InstanceConfig {
    pub settings: NetworkConfig,
    pub network: Arc<dyn NetworkTransport>,
}

impl InstanceConfig {
    /// Library defaults with the transport taking the `network` slot
    pub fn merge(defaults: &NetworkConfig, network: Arc<dyn NetworkTransport>) -> Self {
        let mut settings = defaults.clone();
        settings.remove(NETWORK_KEY);
        Self { settings, network }
    }
}

/// The library's global entry point
#[async_trait]
pub trait RelayerSdk: Send + Sync {
    /// Members present on the binding
    fn exports(&self) -> SdkExports;

    /// One-time global setup; `Ok(false)` means the library refused
    async fn init_sdk(&self) -> Result<bool>;

    /// Build an encryption-capable instance bound to a transport
    async fn create_instance(&self, config: InstanceConfig) -> Result<Arc<dyn FheInstance>>;
}

/// An initialized encryption instance
pub trait FheInstance: Send + Sync {
    /// Start an encrypted input bound to (contract, user)
    fn create_encrypted_input(
        &self,
        contract_address: &str,
        user_address: &str,
    ) -> Box<dyn EncryptedInput>;
}

/// Builder for one encrypted input
#[async_trait]
pub trait EncryptedInput: Send {
    fn add64(&mut self, value: u64);

    async fn encrypt(&mut self) -> Result<EncryptionOutput>;
}

/// Raw result of `input.encrypt()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionOutput {
    pub handles: Vec<Vec<u8>>,
    pub input_proof: Vec<u8>,
}
