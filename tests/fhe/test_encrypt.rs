// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Encrypting values for a (contract, account) pair

use super::mock_sdk::*;
use chainvote_client::fhe::{
    EncryptedVotePayload, EncryptionSessionManager, FheError, SessionStatus, CIPHER_HANDLE_LEN,
};
use std::time::Duration;
use tokio_test::assert_ok;

#[tokio::test]
async fn test_encrypt_bootstraps_on_demand() {
    let (sdk, fetcher, manager) = setup();

    let payload = manager.encrypt(1, CONTRACT_LOWER, ACCOUNT).await.unwrap();

    assert_eq!(manager.status(), SessionStatus::Ready);
    assert_eq!(fetcher.count(), 1);
    assert_eq!(sdk.create_count(), 1);
    assert!(payload.cipher_handle.starts_with("0x"));
}

#[tokio::test]
async fn test_payload_hex_shape() {
    let (_sdk, _fetcher, manager) = setup();

    let payload = assert_ok!(manager.encrypt(1, CONTRACT_LOWER, ACCOUNT).await);

    assert_eq!(payload.cipher_handle.len(), 2 + CIPHER_HANDLE_LEN * 2);
    assert_eq!(payload.cipher_handle, format!("0x{}", "01".repeat(32)));
    assert_eq!(payload.proof, "0xdeadbeef");
    assert_eq!(payload.handle_bytes().unwrap(), [1u8; 32]);

    let json = serde_json::to_value(&payload).unwrap();
    assert!(json.get("cipherHandle").is_some());
    assert!(json.get("proof").is_some());
}

#[tokio::test]
async fn test_contract_address_is_checksummed() {
    let (sdk, _fetcher, manager) = setup();

    manager.encrypt(1, CONTRACT_LOWER, ACCOUNT).await.unwrap();
    manager
        .encrypt(1, &CONTRACT_LOWER.to_uppercase().replacen("0X", "0x", 1), ACCOUNT)
        .await
        .unwrap();
    manager.encrypt(1, CONTRACT_CHECKSUM, ACCOUNT).await.unwrap();

    let inputs = sdk.recorded_inputs();
    assert_eq!(inputs.len(), 3);
    for input in inputs {
        assert_eq!(input.contract, CONTRACT_CHECKSUM);
        assert_eq!(input.user, ACCOUNT);
    }
}

#[tokio::test]
async fn test_each_encrypt_gets_fresh_input() {
    let (sdk, _fetcher, manager) = setup();

    manager.encrypt(1, CONTRACT_LOWER, ACCOUNT).await.unwrap();
    manager.encrypt(42, CONTRACT_LOWER, ACCOUNT).await.unwrap();

    let inputs = sdk.recorded_inputs();
    assert_eq!(inputs.len(), 2);
    assert_eq!(inputs[0].values, vec![1]);
    assert_eq!(inputs[1].values, vec![42]);
    assert_eq!(sdk.create_count(), 1);
}

#[tokio::test]
async fn test_invalid_addresses_rejected_before_bootstrap() {
    let (_sdk, fetcher, manager) = setup();

    let err = manager.encrypt(1, "0x1234", ACCOUNT).await.unwrap_err();
    match err {
        FheError::InvalidAddress { field, .. } => assert_eq!(field, "contract"),
        other => panic!("expected InvalidAddress, got {:?}", other),
    }

    let err = manager
        .encrypt(1, CONTRACT_LOWER, "not-an-address")
        .await
        .unwrap_err();
    match err {
        FheError::InvalidAddress { field, .. } => assert_eq!(field, "account"),
        other => panic!("expected InvalidAddress, got {:?}", other),
    }

    assert_eq!(fetcher.count(), 0);
    assert_eq!(manager.status(), SessionStatus::Idle);
}

#[tokio::test]
async fn test_encrypt_failure_keeps_session_ready() {
    let (sdk, _fetcher, manager) = setup();
    manager.ensure_session(None).await.unwrap();
    sdk.set_encrypt(EncryptBehavior::Fail("relayer rejected input".to_string()));

    let err = manager.encrypt(1, CONTRACT_LOWER, ACCOUNT).await.unwrap_err();
    match &err {
        FheError::EncryptionFailed { reason } => assert!(reason.contains("relayer rejected")),
        other => panic!("expected EncryptionFailed, got {:?}", other),
    }
    assert!(!err.is_bootstrap_error());
    assert_eq!(manager.status(), SessionStatus::Ready);

    sdk.set_encrypt(EncryptBehavior::Succeed);
    assert_ok!(manager.encrypt(1, CONTRACT_LOWER, ACCOUNT).await);
    assert_eq!(sdk.create_count(), 1);
}

#[tokio::test]
async fn test_encrypt_timeout() {
    let sdk = MockSdk::new();
    let fetcher = MockFetcher::serving(sdk.clone());
    let config = test_config().with_timeouts(Duration::from_secs(2), Duration::from_millis(50));
    let manager = EncryptionSessionManager::new(config, page_with_wallet(fetcher));
    sdk.set_encrypt(EncryptBehavior::Hang);

    let err = manager.encrypt(1, CONTRACT_LOWER, ACCOUNT).await.unwrap_err();
    assert_eq!(err, FheError::EncryptionTimeout { timeout_ms: 50 });
    assert!(err.is_timeout());
    assert_eq!(manager.status(), SessionStatus::Ready);
}

#[tokio::test]
async fn test_short_handle_is_rejected() {
    let (sdk, _fetcher, manager) = setup();
    sdk.set_encrypt(EncryptBehavior::HandleLen(16));

    let err = manager.encrypt(1, CONTRACT_LOWER, ACCOUNT).await.unwrap_err();
    assert!(matches!(err, FheError::EncryptionFailed { .. }));
    assert!(err.to_string().contains("32 bytes"));
}

#[tokio::test]
async fn test_payload_round_trips_to_call_arguments() {
    let (_sdk, _fetcher, manager) = setup();
    let payload = manager.encrypt(1, CONTRACT_LOWER, ACCOUNT).await.unwrap();

    let restored = EncryptedVotePayload {
        cipher_handle: payload.cipher_handle.clone(),
        proof: payload.proof.clone(),
    };
    assert_eq!(restored.proof_bytes().unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
}
