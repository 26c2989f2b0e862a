// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! FHE Session Error Types
//!
//! Every failure names the phase it came from so callers can tell the user
//! whether the problem was "no wallet", "network" or "timeout".
//!
//! ## Phases
//!
//! - **Discovery**: no wallet transport could be found
//! - **ScriptLoad**: the relayer SDK could not be fetched or is malformed
//! - **LibraryInit**: the one-time `initSDK()` step failed
//! - **InstanceCreation**: `createInstance(config)` failed
//! - **Bootstrap**: the whole bootstrap timed out or was cancelled
//! - **Encryption**: per-call address validation or encryption failed
//!
//! Bootstrap errors are delivered to every waiter of the same attempt, which
//! is why `FheError` is `Clone` and keeps its causes as strings.

use std::fmt;
use thiserror::Error;

/// Lifecycle phase an [`FheError`] originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Discovery,
    ScriptLoad,
    LibraryInit,
    InstanceCreation,
    Bootstrap,
    Encryption,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Discovery => "wallet discovery",
            SessionPhase::ScriptLoad => "script load",
            SessionPhase::LibraryInit => "library init",
            SessionPhase::InstanceCreation => "instance creation",
            SessionPhase::Bootstrap => "bootstrap",
            SessionPhase::Encryption => "encryption",
        };
        f.write_str(name)
    }
}

/// Errors raised by the encryption session manager
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FheError {
    /// No wallet transport was supplied and none of the known bindings exist
    #[error("No wallet provider found (checked: {checked})")]
    NoProvider {
        /// Bindings probed, in order
        checked: String,
    },

    /// The SDK script failed to load, or loaded without the expected surface
    #[error("Failed to load FHE SDK from {url}: {reason}")]
    ScriptLoad { url: String, reason: String },

    /// `initSDK()` returned `false` or raised
    #[error("FHE SDK initialization failed: {reason}")]
    LibraryInit { reason: String },

    /// `createInstance(config)` raised
    #[error("FHE instance creation failed: {reason}")]
    InstanceCreation { reason: String },

    /// The bootstrap did not settle within the configured duration
    #[error("FHE session initialization timed out after {timeout_ms}ms")]
    InitializationTimeout { timeout_ms: u64 },

    /// The bootstrap was abandoned by `reset_session`
    #[error("FHE session initialization was cancelled by a session reset")]
    BootstrapCancelled,

    /// Input is not `0x` followed by 40 hex digits
    #[error("Invalid {field} address '{value}': {reason}")]
    InvalidAddress {
        field: String,
        value: String,
        reason: String,
    },

    /// The encryption step did not settle within the configured duration
    #[error("Encryption timed out after {timeout_ms}ms")]
    EncryptionTimeout { timeout_ms: u64 },

    /// The encryption step raised or returned an unusable result
    #[error("Encryption failed: {reason}")]
    EncryptionFailed { reason: String },
}

impl FheError {
    /// Phase the error belongs to
    pub fn phase(&self) -> SessionPhase {
        match self {
            FheError::NoProvider { .. } => SessionPhase::Discovery,
            FheError::ScriptLoad { .. } => SessionPhase::ScriptLoad,
            FheError::LibraryInit { .. } => SessionPhase::LibraryInit,
            FheError::InstanceCreation { .. } => SessionPhase::InstanceCreation,
            FheError::InitializationTimeout { .. } | FheError::BootstrapCancelled => {
                SessionPhase::Bootstrap
            }
            FheError::InvalidAddress { .. }
            | FheError::EncryptionTimeout { .. }
            | FheError::EncryptionFailed { .. } => SessionPhase::Encryption,
        }
    }

    /// True for errors produced by the bootstrap sequence
    pub fn is_bootstrap_error(&self) -> bool {
        !matches!(self.phase(), SessionPhase::Encryption)
    }

    /// True for the two timeout variants
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            FheError::InitializationTimeout { .. } | FheError::EncryptionTimeout { .. }
        )
    }

    /// Message suitable for a UI toast: phase first, then the cause
    pub fn user_message(&self) -> String {
        format!("{} failed: {}", self.phase(), self)
    }
}
