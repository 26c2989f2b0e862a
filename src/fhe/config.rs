// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for the FHE encryption session

use std::env;
use std::time::Duration;

/// Relayer SDK bundle loaded when the page does not already provide one
pub const DEFAULT_SDK_URL: &str = "https://cdn.zama.ai/relayer-sdk-js/0.2.0/relayer-sdk-js.js";

/// Configuration for the encryption session manager
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// URL of the relayer SDK script
    pub sdk_url: String,
    /// Bound on the whole bootstrap (script load, init, instance creation)
    pub bootstrap_timeout: Duration,
    /// Bound on a single `encrypt()` call
    pub encrypt_timeout: Duration,
}

impl SessionConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            sdk_url: env::var("FHE_SDK_URL").unwrap_or(defaults.sdk_url),
            bootstrap_timeout: env::var("FHE_BOOTSTRAP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.bootstrap_timeout),
            encrypt_timeout: env::var("FHE_ENCRYPT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.encrypt_timeout),
        }
    }

    pub fn with_timeouts(mut self, bootstrap: Duration, encrypt: Duration) -> Self {
        self.bootstrap_timeout = bootstrap;
        self.encrypt_timeout = encrypt;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        url::Url::parse(&self.sdk_url)
            .map_err(|e| format!("Invalid SDK URL '{}': {}", self.sdk_url, e))?;
        if self.bootstrap_timeout.is_zero() {
            return Err("Bootstrap timeout must be greater than 0".to_string());
        }
        if self.encrypt_timeout.is_zero() {
            return Err("Encrypt timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sdk_url: DEFAULT_SDK_URL.to_string(),
            bootstrap_timeout: Duration::from_secs(30),
            encrypt_timeout: Duration::from_secs(30),
        }
    }
}
