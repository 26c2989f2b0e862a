// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Casting encrypted ballots through the vote service

use super::mock_gateway::*;
use super::mock_sdk::*;
use chainvote_client::contracts::{GatewayError, VotingPhase};
use chainvote_client::fhe::{EncryptionSessionManager, FheError, PageScope};
use chainvote_client::{VoteError, VoteService};
use ethers::types::{Address, U256};
use std::str::FromStr;
use std::sync::Arc;
use tokio_test::assert_ok;

fn voter() -> Address {
    Address::from_str(ACCOUNT).unwrap()
}

fn service() -> (Arc<MockSdk>, Arc<MockGateway>, VoteService) {
    let (sdk, _fetcher, manager) = setup();
    let gateway = Arc::new(MockGateway::new(CONTRACT_CHECKSUM));
    let service = VoteService::new(manager, gateway.clone());
    (sdk, gateway, service)
}

#[tokio::test]
async fn test_cast_vote_forwards_encrypted_ballot() {
    let (sdk, gateway, service) = service();
    let id = gateway.add_proposal(&["Yes", "No"], NOW - 60, NOW + 3600);

    let tx = assert_ok!(service.cast_vote_at(id, U256::from(1), voter(), NOW).await);
    assert!(!tx.is_zero());

    let votes = gateway.recorded_votes();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].proposal_id, id);
    assert_eq!(votes[0].choice_id, U256::from(1));
    assert_eq!(votes[0].payload.cipher_handle.len(), 66);
    assert_eq!(votes[0].payload.proof, "0xdeadbeef");

    let inputs = sdk.recorded_inputs();
    assert_eq!(inputs.len(), 1);
    assert_eq!(inputs[0].values, vec![1]);
    assert_eq!(inputs[0].contract, CONTRACT_CHECKSUM);
    assert_eq!(inputs[0].user, ACCOUNT);
}

#[tokio::test]
async fn test_invalid_choice_rejected_before_encryption() {
    let (sdk, gateway, service) = service();
    let id = gateway.add_proposal(&["A", "B", "C"], NOW - 60, NOW + 3600);

    let err = service
        .cast_vote_at(id, U256::from(3), voter(), NOW)
        .await
        .unwrap_err();
    assert!(matches!(err, VoteError::InvalidChoice { choices: 3, .. }));
    assert_eq!(sdk.create_count(), 0);
    assert!(gateway.recorded_votes().is_empty());
}

#[tokio::test]
async fn test_vote_outside_window_rejected() {
    let (_sdk, gateway, service) = service();
    let pending = gateway.add_proposal(&["Yes", "No"], NOW + 60, NOW + 3600);
    let ended = gateway.add_proposal(&["Yes", "No"], NOW - 3600, NOW);

    let err = service
        .cast_vote_at(pending, U256::zero(), voter(), NOW)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        VoteError::NotActive {
            phase: VotingPhase::Pending,
            ..
        }
    ));

    let err = service
        .cast_vote_at(ended, U256::zero(), voter(), NOW)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        VoteError::NotActive {
            phase: VotingPhase::Ended,
            ..
        }
    ));
    assert!(gateway.recorded_votes().is_empty());
}

#[tokio::test]
async fn test_double_vote_rejected() {
    let (sdk, gateway, service) = service();
    let id = gateway.add_proposal(&["Yes", "No"], NOW - 60, NOW + 3600);
    gateway.mark_voted(id, voter());

    let err = service
        .cast_vote_at(id, U256::zero(), voter(), NOW)
        .await
        .unwrap_err();
    assert!(matches!(err, VoteError::AlreadyVoted { .. }));
    assert!(err.to_string().contains("already voted"));
    assert_eq!(sdk.create_count(), 0);
}

#[tokio::test]
async fn test_contract_revert_is_surfaced() {
    let (_sdk, gateway, service) = service();
    let id = gateway.add_proposal(&["Yes", "No"], NOW - 60, NOW + 3600);
    *gateway.revert_cast.lock().unwrap() = Some("VotingEnded".to_string());

    let err = service
        .cast_vote_at(id, U256::zero(), voter(), NOW)
        .await
        .unwrap_err();
    match err {
        VoteError::Gateway(GatewayError::Reverted { method, reason }) => {
            assert_eq!(method, "castVote");
            assert_eq!(reason, "VotingEnded");
        }
        other => panic!("expected revert, got {:?}", other),
    }
}

#[tokio::test]
async fn test_encryption_failure_aborts_vote() {
    let sdk = MockSdk::new();
    let fetcher = MockFetcher::serving(sdk.clone());
    // No wallet injected
    let page = PageScope::new(fetcher);
    let manager = Arc::new(EncryptionSessionManager::new(test_config(), page));
    let gateway = Arc::new(MockGateway::new(CONTRACT_CHECKSUM));
    let service = VoteService::new(manager, gateway.clone());
    let id = gateway.add_proposal(&["Yes", "No"], NOW - 60, NOW + 3600);

    let err = service
        .cast_vote_at(id, U256::zero(), voter(), NOW)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        VoteError::Encryption(FheError::NoProvider { .. })
    ));
    assert!(gateway.recorded_votes().is_empty());
}

#[tokio::test]
async fn test_votes_reuse_one_session() {
    let (sdk, gateway, service) = service();
    let first = gateway.add_proposal(&["Yes", "No"], NOW - 60, NOW + 3600);
    let second = gateway.add_proposal(&["Red", "Green", "Blue"], NOW - 60, NOW + 3600);

    service
        .cast_vote_at(first, U256::zero(), voter(), NOW)
        .await
        .unwrap();
    service
        .cast_vote_at(second, U256::from(2), voter(), NOW)
        .await
        .unwrap();

    assert_eq!(gateway.recorded_votes().len(), 2);
    assert_eq!(sdk.recorded_inputs().len(), 2);
    assert_eq!(sdk.create_count(), 1);
}
