// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Bootstrap timeout and session reset

use super::mock_sdk::*;
use chainvote_client::fhe::{EncryptionSessionManager, FheError, SessionPhase, SessionStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

fn manager_with_timeout(
    timeout: Duration,
) -> (Arc<MockSdk>, Arc<MockFetcher>, Arc<EncryptionSessionManager>) {
    let sdk = MockSdk::new();
    let fetcher = MockFetcher::serving(sdk.clone());
    let config = test_config().with_timeouts(timeout, Duration::from_secs(2));
    let manager = Arc::new(EncryptionSessionManager::new(
        config,
        page_with_wallet(fetcher.clone()),
    ));
    (sdk, fetcher, manager)
}

#[tokio::test]
async fn test_bootstrap_timeout_sets_error() {
    let (sdk, _fetcher, manager) = manager_with_timeout(Duration::from_millis(100));
    sdk.delay_create(Duration::from_millis(500));

    let err = manager.ensure_session(None).await.err().unwrap();
    assert_eq!(err, FheError::InitializationTimeout { timeout_ms: 100 });
    assert_eq!(err.phase(), SessionPhase::Bootstrap);
    assert!(err.is_timeout());
    assert_eq!(manager.status(), SessionStatus::Error);
    assert_eq!(manager.last_error(), Some(err));
}

#[tokio::test]
async fn test_retry_after_timeout() {
    let (sdk, fetcher, manager) = manager_with_timeout(Duration::from_millis(100));
    sdk.delay_create(Duration::from_millis(500));
    assert!(manager.ensure_session(None).await.is_err());

    sdk.delay_create(Duration::ZERO);
    manager.ensure_session(None).await.unwrap();

    assert_eq!(manager.status(), SessionStatus::Ready);
    assert_eq!(fetcher.count(), 1);
    assert_eq!(sdk.init_count(), 1);
    assert_eq!(sdk.create_count(), 2);
}

#[tokio::test]
async fn test_reset_when_idle_is_noop() {
    let (_sdk, _fetcher, manager) = setup();
    manager.reset_session();
    assert_eq!(manager.status(), SessionStatus::Idle);
    assert!(manager.instance().is_none());
}

#[tokio::test]
async fn test_reset_when_ready_forces_new_instance() {
    let (sdk, fetcher, manager) = setup();
    manager.ensure_session(None).await.unwrap();

    manager.reset_session();
    assert_eq!(manager.status(), SessionStatus::Idle);
    assert!(manager.instance().is_none());

    manager.ensure_session(None).await.unwrap();
    assert_eq!(manager.status(), SessionStatus::Ready);
    assert_eq!(sdk.create_count(), 2);
    // Script and init are page-wide and survive a reset
    assert_eq!(fetcher.count(), 1);
    assert_eq!(sdk.init_count(), 1);
}

#[tokio::test]
async fn test_reset_during_loading_cancels_waiters() {
    let (sdk, _fetcher, manager) = setup();
    sdk.delay_create(Duration::from_millis(300));

    let waiter = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.ensure_session(None).await.err() })
    };
    sleep(Duration::from_millis(80)).await;
    assert_eq!(manager.status(), SessionStatus::Loading);

    manager.reset_session();
    assert_eq!(manager.status(), SessionStatus::Idle);

    let err = waiter.await.unwrap();
    assert_eq!(err, Some(FheError::BootstrapCancelled));

    // The abandoned attempt must not flip the state later
    sleep(Duration::from_millis(400)).await;
    assert_eq!(manager.status(), SessionStatus::Idle);
    assert!(manager.instance().is_none());
    assert!(manager.last_error().is_none());
}

#[tokio::test]
async fn test_new_bootstrap_after_reset_wins() {
    let (sdk, _fetcher, manager) = setup();
    sdk.delay_create(Duration::from_millis(200));

    let abandoned = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.ensure_session(None).await.is_ok() })
    };
    sleep(Duration::from_millis(80)).await;
    manager.reset_session();

    sdk.delay_create(Duration::ZERO);
    manager.ensure_session(None).await.unwrap();
    assert_eq!(manager.status(), SessionStatus::Ready);

    assert!(!abandoned.await.unwrap());
    sleep(Duration::from_millis(250)).await;
    assert_eq!(manager.status(), SessionStatus::Ready);
    assert!(manager.instance().is_some());
    assert_eq!(sdk.create_count(), 2);
}

#[tokio::test]
async fn test_encrypt_after_reset_uses_new_instance() {
    let (sdk, _fetcher, manager) = setup();
    let before = manager.encrypt(1, CONTRACT_LOWER, ACCOUNT).await.unwrap();

    manager.reset_session();
    let after = manager.encrypt(1, CONTRACT_LOWER, ACCOUNT).await.unwrap();

    // Mock handles are seeded with the instance number
    assert_ne!(before.cipher_handle, after.cipher_handle);
    assert_eq!(sdk.create_count(), 2);
}
