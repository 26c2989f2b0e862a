// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Encryption Session Manager
//!
//! Guarantees a single, safely shared FHE instance exists before any
//! encryption runs, however many callers ask for one at the same time.
//!
//! ## State machine
//!
//! ```text
//! Idle --ensure_session--> Loading --success--> Ready
//!                          Loading --failure/timeout--> Error
//! Error --ensure_session--> Loading
//! Ready | Loading --reset_session--> Idle
//! ```
//!
//! ## Concurrency
//!
//! - One bootstrap per manager at a time; every concurrent caller awaits the
//!   same shared outcome
//! - The bootstrap runs as its own task so it keeps progressing if a waiter
//!   is dropped
//! - Each attempt carries a generation number and a cancellation token; a
//!   settlement is applied only while its generation is still current
//! - Session state sits behind a `std::sync::Mutex` that is never held
//!   across an await

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::address::{checksum_address, parse_address};
use super::config::SessionConfig;
use super::error::FheError;
use super::loader::PageScope;
use super::payload::EncryptedVotePayload;
use super::provider::{NetworkTransport, WalletBindings};
use super::sdk::{FheInstance, InstanceConfig};

/// Lifecycle status of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

type BootstrapOutcome = Result<Arc<dyn FheInstance>, FheError>;
type SharedBootstrap = Shared<BoxFuture<'static, BootstrapOutcome>>;

struct PendingBootstrap {
    generation: u64,
    cancel: CancellationToken,
    outcome: SharedBootstrap,
}

#[derive(Default)]
struct SessionState {
    status: SessionStatus,
    instance: Option<Arc<dyn FheInstance>>,
    pending: Option<PendingBootstrap>,
    generation: u64,
    last_error: Option<FheError>,
}

/// Owns the lifecycle of one FHE client session
pub struct EncryptionSessionManager {
    config: SessionConfig,
    page: Arc<PageScope>,
    state: Arc<Mutex<SessionState>>,
}

impl EncryptionSessionManager {
    pub fn new(config: SessionConfig, page: Arc<PageScope>) -> Self {
        Self {
            config,
            page,
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn page(&self) -> &Arc<PageScope> {
        &self.page
    }

    pub fn status(&self) -> SessionStatus {
        self.lock_state().status
    }

    /// Cached instance, present only while `Ready`
    pub fn instance(&self) -> Option<Arc<dyn FheInstance>> {
        self.lock_state().instance.clone()
    }

    /// Error of the most recent failed bootstrap
    pub fn last_error(&self) -> Option<FheError> {
        self.lock_state().last_error.clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Return the ready instance, bootstrapping it on first use
    ///
    /// Without a transport override the wallet bindings are probed in
    /// discovery order. When the session is already `Ready` this returns
    /// without awaiting anything.
    pub async fn ensure_session(
        &self,
        transport: Option<Arc<dyn NetworkTransport>>,
    ) -> Result<Arc<dyn FheInstance>, FheError> {
        let outcome = {
            let mut state = self.lock_state();

            if let Some(instance) = state.instance.as_ref() {
                return Ok(instance.clone());
            }

            match state.pending.as_ref() {
                Some(pending) => {
                    debug!(
                        "FHE bootstrap #{} already in flight, waiting",
                        pending.generation
                    );
                    pending.outcome.clone()
                }
                None => {
                    let transport = match transport {
                        Some(transport) => transport,
                        None => self.discover_transport()?,
                    };
                    self.start_bootstrap(&mut state, transport)
                }
            }
        };

        outcome.await
    }

    fn discover_transport(&self) -> Result<Arc<dyn NetworkTransport>, FheError> {
        match self.page.wallets().discover() {
            Some((_, transport)) => Ok(transport),
            None => {
                warn!("No wallet provider available for FHE session");
                Err(FheError::NoProvider {
                    checked: WalletBindings::probed_names(),
                })
            }
        }
    }

    fn start_bootstrap(
        &self,
        state: &mut SessionState,
        transport: Arc<dyn NetworkTransport>,
    ) -> SharedBootstrap {
        state.generation += 1;
        let generation = state.generation;
        let cancel = CancellationToken::new();

        state.status = SessionStatus::Loading;
        state.last_error = None;
        info!(
            "🚀 Starting FHE session bootstrap #{} (transport: {})",
            generation,
            transport.label()
        );

        let task = tokio::spawn(run_attempt(
            self.page.clone(),
            self.state.clone(),
            self.config.clone(),
            transport,
            generation,
            cancel.clone(),
        ));

        let state_handle = self.state.clone();
        let outcome = async move {
            match task.await {
                Ok(result) => result,
                Err(e) => {
                    let result = Err(FheError::InstanceCreation {
                        reason: format!("bootstrap task failed: {}", e),
                    });
                    settle(&state_handle, generation, &result);
                    result
                }
            }
        }
        .boxed()
        .shared();

        state.pending = Some(PendingBootstrap {
            generation,
            cancel,
            outcome: outcome.clone(),
        });
        outcome
    }

    /// Abandon any in-flight bootstrap and drop the cached instance
    ///
    /// Used when the wallet account or network changed. Waiters of the
    /// abandoned bootstrap receive [`FheError::BootstrapCancelled`].
    pub fn reset_session(&self) {
        let mut state = self.lock_state();
        if let Some(pending) = state.pending.take() {
            info!("🛑 Cancelling FHE bootstrap #{}", pending.generation);
            pending.cancel.cancel();
        }
        state.instance = None;
        state.last_error = None;
        state.status = SessionStatus::Idle;
        info!("🔄 FHE session reset");
    }

    /// Encrypt one 64-bit value for (contract, account)
    ///
    /// The contract address is normalized to its checksummed form. Failures
    /// here never change the session status.
    pub async fn encrypt(
        &self,
        value: u64,
        contract_address: &str,
        account_address: &str,
    ) -> Result<EncryptedVotePayload, FheError> {
        let contract = checksum_address("contract", contract_address)?;
        parse_address("account", account_address)?;

        let instance = self.ensure_session(None).await?;

        debug!("Creating encrypted input for contract {}", contract);
        let mut input = instance.create_encrypted_input(&contract, account_address);
        input.add64(value);

        let timeout_ms = millis(self.config.encrypt_timeout);
        let output = match tokio::time::timeout(self.config.encrypt_timeout, input.encrypt()).await
        {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!("❌ Encryption failed: {}", e);
                return Err(FheError::EncryptionFailed {
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                warn!("⏱️ Encryption timed out after {}ms", timeout_ms);
                return Err(FheError::EncryptionTimeout { timeout_ms });
            }
        };

        let payload = EncryptedVotePayload::from_output(output)?;
        debug!("✅ Encryption complete");
        Ok(payload)
    }
}

async fn run_attempt(
    page: Arc<PageScope>,
    state: Arc<Mutex<SessionState>>,
    config: SessionConfig,
    transport: Arc<dyn NetworkTransport>,
    generation: u64,
    cancel: CancellationToken,
) -> BootstrapOutcome {
    let timeout_ms = millis(config.bootstrap_timeout);

    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(FheError::BootstrapCancelled),
        attempt = tokio::time::timeout(
            config.bootstrap_timeout,
            bootstrap(&page, &config.sdk_url, transport, &cancel),
        ) => match attempt {
            Ok(result) => result,
            Err(_) => Err(FheError::InitializationTimeout { timeout_ms }),
        },
    };

    settle(&state, generation, &result);
    result
}

async fn bootstrap(
    page: &Arc<PageScope>,
    sdk_url: &str,
    transport: Arc<dyn NetworkTransport>,
    cancel: &CancellationToken,
) -> BootstrapOutcome {
    let handle = page.acquire_sdk(sdk_url).await?;
    check_cancelled(cancel)?;

    handle.ensure_initialized().await?;
    check_cancelled(cancel)?;

    info!("🔐 Creating FHE instance...");
    let config = InstanceConfig::merge(handle.default_config(), transport);
    let instance = handle
        .sdk()
        .create_instance(config)
        .await
        .map_err(|e| FheError::InstanceCreation {
            reason: e.to_string(),
        })?;
    check_cancelled(cancel)?;

    Ok(instance)
}

/// Milliseconds for error reporting, saturating at `u64::MAX`
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn check_cancelled(cancel: &CancellationToken) -> Result<(), FheError> {
    if cancel.is_cancelled() {
        Err(FheError::BootstrapCancelled)
    } else {
        Ok(())
    }
}

/// Apply a bootstrap result if its attempt is still the current one
fn settle(state: &Mutex<SessionState>, generation: u64, result: &BootstrapOutcome) {
    let mut state = state.lock().unwrap_or_else(|e| e.into_inner());

    let current = state
        .pending
        .as_ref()
        .map(|pending| pending.generation == generation)
        .unwrap_or(false);
    if !current {
        debug!("Ignoring settlement of abandoned FHE bootstrap #{}", generation);
        return;
    }

    state.pending = None;
    match result {
        Ok(instance) => {
            state.instance = Some(instance.clone());
            state.status = SessionStatus::Ready;
            info!("✅ FHE session ready (bootstrap #{})", generation);
        }
        Err(e) => {
            state.instance = None;
            state.status = SessionStatus::Error;
            state.last_error = Some(e.clone());
            error!("❌ FHE bootstrap #{} failed: {}", generation, e);
        }
    }
}
