// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! FHE Client Session
//!
//! Owns the lifecycle of the homomorphic-encryption client used to seal
//! votes before they reach the ChainVote contract:
//!
//! - **Loader**: acquires the relayer SDK binding once per page
//! - **Provider**: discovers a wallet transport in a fixed priority order
//! - **Session**: initializes the SDK once, caches one instance, and shares
//!   a single in-flight bootstrap between concurrent callers
//! - **Payload**: the `{cipherHandle, proof}` pair forwarded to the contract
//!
//! ## Security Considerations
//!
//! - Payloads are bound to one (contract, account) pair and never cached
//! - Session state lives in memory only and is dropped on reset
//!
//! ## Flow
//!
//! 1. Caller asks for an encrypted vote value
//! 2. Session is ensured (script → `initSDK()` → `createInstance`)
//! 3. An encrypted input is built for the checksummed contract address
//! 4. The resulting handle and proof are returned as hex for the gateway

pub mod address;
pub mod config;
pub mod error;
pub mod loader;
pub mod payload;
pub mod provider;
pub mod sdk;
pub mod session;

pub use address::{checksum_address, parse_address};
pub use config::{SessionConfig, DEFAULT_SDK_URL};
pub use error::{FheError, SessionPhase};
pub use loader::{PageScope, ScriptFetcher, SdkHandle};
pub use payload::{EncryptedVotePayload, CIPHER_HANDLE_LEN};
pub use provider::{HttpTransport, NetworkTransport, WalletBinding, WalletBindings, DISCOVERY_ORDER};
pub use sdk::{
    EncryptedInput, EncryptionOutput, FheInstance, InstanceConfig, NetworkConfig, RelayerSdk,
    SdkExports, DEFAULT_CONFIG_NAME,
};
pub use session::{EncryptionSessionManager, SessionStatus};
