// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! SDK script acquisition
//!
//! A [`PageScope`] stands in for the browser page: it holds the global SDK
//! binding, the script fetches currently in flight, and the wallet globals.
//! It is shared by reference between every session manager on the page,
//! which is what makes "one fetch per URL" and "one `initSDK()` per page"
//! hold across managers.
//!
//! ## Acquisition order
//!
//! 1. SDK binding already present: use it, no fetch
//! 2. Fetch for the same URL in flight: attach to it
//! 3. Otherwise issue exactly one fetch and validate the binding it installed

use anyhow::Result;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock, Weak};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::error::FheError;
use super::provider::WalletBindings;
use super::sdk::{NetworkConfig, RelayerSdk};

/// Fetches and evaluates the SDK script
#[async_trait]
pub trait ScriptFetcher: Send + Sync {
    /// Returns the global binding the script installed, `None` if it loaded
    /// without defining one
    async fn fetch(&self, url: &str) -> Result<Option<Arc<dyn RelayerSdk>>>;
}

/// A validated SDK binding plus its page-wide "initialized" flag
#[derive(Clone)]
pub struct SdkHandle {
    sdk: Arc<dyn RelayerSdk>,
    default_config: NetworkConfig,
    initialized: Arc<OnceCell<()>>,
}

impl std::fmt::Debug for SdkHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdkHandle")
            .field("default_config", &self.default_config)
            .finish_non_exhaustive()
    }
}

impl SdkHandle {
    /// Check the binding exposes `initSDK`, `createInstance` and the default config
    pub fn validated(url: &str, sdk: Arc<dyn RelayerSdk>) -> Result<Self, FheError> {
        let exports = sdk.exports();
        let missing = exports.missing();
        match exports.default_config {
            Some(default_config) if missing.is_empty() => Ok(Self {
                sdk,
                default_config,
                initialized: Arc::new(OnceCell::new()),
            }),
            _ => Err(FheError::ScriptLoad {
                url: url.to_string(),
                reason: format!("SDK binding is malformed, missing: {}", missing.join(", ")),
            }),
        }
    }

    pub fn sdk(&self) -> &Arc<dyn RelayerSdk> {
        &self.sdk
    }

    pub fn default_config(&self) -> &NetworkConfig {
        &self.default_config
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.initialized()
    }

    /// Run `initSDK()` unless it already succeeded on this page
    ///
    /// Concurrent callers wait on the same call. A failure leaves the flag
    /// unset so a later bootstrap may try again.
    pub async fn ensure_initialized(&self) -> Result<(), FheError> {
        if self.is_initialized() {
            debug!("FHE SDK already initialized");
            return Ok(());
        }

        let sdk = self.sdk.clone();
        self.initialized
            .get_or_try_init(|| async move {
                info!("🔧 Initializing FHE SDK...");
                match sdk.init_sdk().await {
                    Ok(true) => {
                        info!("✅ FHE SDK initialized");
                        Ok(())
                    }
                    Ok(false) => Err(FheError::LibraryInit {
                        reason: "initSDK() returned false".to_string(),
                    }),
                    Err(e) => Err(FheError::LibraryInit {
                        reason: e.to_string(),
                    }),
                }
            })
            .await
            .map(|_| ())
    }
}

type ScriptFetch = Shared<BoxFuture<'static, Result<SdkHandle, FheError>>>;

/// Shared page state: SDK global, in-flight script fetches, wallet globals
pub struct PageScope {
    sdk: RwLock<Option<SdkHandle>>,
    pending_scripts: Mutex<HashMap<String, ScriptFetch>>,
    fetcher: Arc<dyn ScriptFetcher>,
    wallets: WalletBindings,
}

impl PageScope {
    pub fn new(fetcher: Arc<dyn ScriptFetcher>) -> Arc<Self> {
        Arc::new(Self {
            sdk: RwLock::new(None),
            pending_scripts: Mutex::new(HashMap::new()),
            fetcher,
            wallets: WalletBindings::new(),
        })
    }

    pub fn wallets(&self) -> &WalletBindings {
        &self.wallets
    }

    /// The SDK was already included by the page (e.g. a static script tag)
    pub fn install_sdk(&self, url: &str, sdk: Arc<dyn RelayerSdk>) -> Result<(), FheError> {
        let handle = SdkHandle::validated(url, sdk)?;
        self.set_sdk(handle);
        Ok(())
    }

    pub fn sdk(&self) -> Option<SdkHandle> {
        self.sdk.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_sdk_loaded(&self) -> bool {
        self.sdk().is_some()
    }

    /// Number of script fetches currently in flight
    pub fn pending_fetches(&self) -> usize {
        self.pending_scripts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Store `handle` unless a binding is already present; returns the stored one
    fn set_sdk(&self, handle: SdkHandle) -> SdkHandle {
        let mut slot = self.sdk.write().unwrap_or_else(|e| e.into_inner());
        slot.get_or_insert(handle).clone()
    }

    /// Resolve the SDK binding, fetching `url` at most once at a time
    pub async fn acquire_sdk(self: &Arc<Self>, url: &str) -> Result<SdkHandle, FheError> {
        let fetch = {
            let mut pending = self
                .pending_scripts
                .lock()
                .unwrap_or_else(|e| e.into_inner());

            if let Some(handle) = self.sdk() {
                debug!("FHE SDK already loaded");
                return Ok(handle);
            }

            match pending.get(url) {
                Some(fetch) => {
                    debug!("FHE SDK fetch already in flight for {}, attaching", url);
                    fetch.clone()
                }
                None => {
                    let fetch = self.start_fetch(url);
                    pending.insert(url.to_string(), fetch.clone());
                    fetch
                }
            }
        };

        fetch.await
    }

    fn start_fetch(self: &Arc<Self>, url: &str) -> ScriptFetch {
        let fetcher = self.fetcher.clone();
        let page: Weak<Self> = Arc::downgrade(self);
        let url = url.to_string();

        async move {
            info!("📦 Loading FHE SDK script from {}", url);
            let result = match fetcher.fetch(&url).await {
                Ok(Some(sdk)) => SdkHandle::validated(&url, sdk),
                Ok(None) => Err(FheError::ScriptLoad {
                    url: url.clone(),
                    reason: "script loaded but the SDK global is undefined".to_string(),
                }),
                Err(e) => Err(FheError::ScriptLoad {
                    url: url.clone(),
                    reason: e.to_string(),
                }),
            };

            match &result {
                Ok(_) => info!("✅ FHE SDK script loaded"),
                Err(e) => warn!("❌ {}", e),
            }

            match page.upgrade() {
                Some(page) => {
                    // Waiters share the page's binding so its init flag is the only one
                    let result = result.map(|handle| page.set_sdk(handle));
                    page.pending_scripts
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .remove(&url);
                    result
                }
                None => result,
            }
        }
        .boxed()
        .shared()
    }
}
