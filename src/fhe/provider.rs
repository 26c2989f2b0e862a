// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Wallet transport discovery
//!
//! The FHE instance needs an EIP-1193 style network transport. Callers may
//! pass one explicitly; otherwise the known wallet-extension bindings are
//! probed in a fixed priority order and the first present one wins.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use ethers::providers::{Http, Provider};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Minimal network-provider shape expected by `createInstance`
#[async_trait]
pub trait NetworkTransport: Send + Sync {
    /// Label used in logs (e.g. "metamask", "okx")
    fn label(&self) -> &str;

    /// Forward a JSON-RPC request
    async fn request(&self, method: &str, params: Value) -> Result<Value>;
}

/// Global bindings wallet extensions inject into the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalletBinding {
    /// `window.ethereum`
    Ethereum,
    /// `window.okxwallet.provider`
    OkxWalletProvider,
    /// `window.okxwallet`
    OkxWallet,
    /// `window.coinbaseWalletExtension`
    CoinbaseWalletExtension,
}

/// Probe order used when no transport is supplied
pub const DISCOVERY_ORDER: [WalletBinding; 4] = [
    WalletBinding::Ethereum,
    WalletBinding::OkxWalletProvider,
    WalletBinding::OkxWallet,
    WalletBinding::CoinbaseWalletExtension,
];

impl WalletBinding {
    pub fn global_name(&self) -> &'static str {
        match self {
            WalletBinding::Ethereum => "ethereum",
            WalletBinding::OkxWalletProvider => "okxwallet.provider",
            WalletBinding::OkxWallet => "okxwallet",
            WalletBinding::CoinbaseWalletExtension => "coinbaseWalletExtension",
        }
    }
}

impl fmt::Display for WalletBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.global_name())
    }
}

/// Wallet globals currently present on the page
#[derive(Default)]
pub struct WalletBindings {
    bindings: RwLock<HashMap<WalletBinding, Arc<dyn NetworkTransport>>>,
}

impl WalletBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// An extension injected its global
    pub fn register(&self, binding: WalletBinding, transport: Arc<dyn NetworkTransport>) {
        let mut bindings = self.bindings.write().unwrap_or_else(|e| e.into_inner());
        bindings.insert(binding, transport);
    }

    /// An extension withdrew its global
    pub fn remove(&self, binding: WalletBinding) -> Option<Arc<dyn NetworkTransport>> {
        let mut bindings = self.bindings.write().unwrap_or_else(|e| e.into_inner());
        bindings.remove(&binding)
    }

    pub fn get(&self, binding: WalletBinding) -> Option<Arc<dyn NetworkTransport>> {
        let bindings = self.bindings.read().unwrap_or_else(|e| e.into_inner());
        bindings.get(&binding).cloned()
    }

    /// First present binding in [`DISCOVERY_ORDER`]
    pub fn discover(&self) -> Option<(WalletBinding, Arc<dyn NetworkTransport>)> {
        let bindings = self.bindings.read().unwrap_or_else(|e| e.into_inner());
        for binding in DISCOVERY_ORDER {
            if let Some(transport) = bindings.get(&binding) {
                debug!("Wallet transport discovered via {}", binding);
                return Some((binding, transport.clone()));
            }
        }
        None
    }

    /// Comma-separated list of probed bindings, for error messages
    pub fn probed_names() -> String {
        DISCOVERY_ORDER
            .iter()
            .map(|b| b.global_name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// JSON-RPC transport over an HTTP node, for use outside a browser wallet
pub struct HttpTransport {
    provider: Provider<Http>,
    label: String,
}

impl HttpTransport {
    pub fn new(rpc_url: &str) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| anyhow!("Failed to create provider: {}", e))?;
        Ok(Self {
            provider,
            label: format!("http:{}", rpc_url),
        })
    }
}

#[async_trait]
impl NetworkTransport for HttpTransport {
    fn label(&self) -> &str {
        &self.label
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        self.provider
            .request::<Value, Value>(method, params)
            .await
            .map_err(|e| anyhow!("RPC request {} failed: {}", method, e))
    }
}
