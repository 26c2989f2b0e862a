// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Proposal creation, decryption requests and results

use super::mock_gateway::*;
use super::mock_sdk::*;
use chainvote_client::contracts::{ProposalDraft, ProposalError};
use chainvote_client::{VoteError, VoteService};
use ethers::types::U256;
use std::sync::Arc;

fn service() -> (Arc<MockGateway>, VoteService) {
    let (_sdk, _fetcher, manager) = setup();
    let gateway = Arc::new(MockGateway::new(CONTRACT_CHECKSUM));
    let service = VoteService::new(manager, gateway.clone());
    (gateway, service)
}

fn draft() -> ProposalDraft {
    ProposalDraft {
        name: "  Treasury allocation ".to_string(),
        details: "Where should the Q3 budget go?".to_string(),
        choices: vec![
            "Grants".to_string(),
            " ".to_string(),
            "Audits".to_string(),
            "Marketing ".to_string(),
        ],
        voting_start: NOW + 60,
        voting_end: NOW + 86_400,
    }
}

#[tokio::test]
async fn test_create_proposal_pays_fee() {
    let (gateway, service) = service();

    service.create_proposal(&draft(), NOW).await.unwrap();

    let created = gateway.created.lock().unwrap().clone();
    assert_eq!(created.len(), 1);
    let (submitted, fee) = &created[0];
    assert_eq!(*fee, U256::from(FEE));
    assert_eq!(submitted.name, "Treasury allocation");
    assert_eq!(submitted.choices, vec!["Grants", "Audits", "Marketing"]);
}

#[tokio::test]
async fn test_invalid_proposal_not_submitted() {
    let (gateway, service) = service();
    let mut bad = draft();
    bad.choices = vec!["Only".to_string()];

    let err = service.create_proposal(&bad, NOW).await.unwrap_err();
    assert!(matches!(
        err,
        VoteError::InvalidProposal(ProposalError::TooFewChoices { count: 1, .. })
    ));
    assert!(gateway.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_proposal_ending_in_past_rejected() {
    let (_gateway, service) = service();
    let mut bad = draft();
    bad.voting_start = NOW - 7200;
    bad.voting_end = NOW - 60;

    let err = service.create_proposal(&bad, NOW).await.unwrap_err();
    assert!(matches!(
        err,
        VoteError::InvalidProposal(ProposalError::EndInPast { .. })
    ));
}

#[tokio::test]
async fn test_decryption_requires_ended_voting() {
    let (gateway, service) = service();
    let active = gateway.add_proposal(&["Yes", "No"], NOW - 60, NOW + 3600);

    let err = service
        .request_results_decryption_at(active, NOW)
        .await
        .unwrap_err();
    assert!(matches!(err, VoteError::VotingNotEnded { .. }));
    assert!(gateway.decryption_requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_decryption_requested_once_ended() {
    let (gateway, service) = service();
    let id = gateway.add_proposal(&["Yes", "No"], NOW - 3600, NOW - 1);

    service
        .request_results_decryption_at(id, NOW)
        .await
        .unwrap();
    assert_eq!(*gateway.decryption_requests.lock().unwrap(), vec![id]);

    gateway.publish(id, &[3, 1]);
    let err = service
        .request_results_decryption_at(id, NOW)
        .await
        .unwrap_err();
    assert!(matches!(err, VoteError::ResultsAlreadyPublished { .. }));
}

#[tokio::test]
async fn test_results_require_publication() {
    let (gateway, service) = service();
    let id = gateway.add_proposal(&["A", "B", "C"], NOW - 3600, NOW - 1);

    let err = service.results(id).await.unwrap_err();
    assert!(matches!(err, VoteError::ResultsNotPublished { .. }));

    gateway.publish(id, &[30, 50, 20]);
    let results = service.results(id).await.unwrap();
    assert_eq!(results.total(), U256::from(100));
    assert_eq!(results.percentages(), vec![30.0, 50.0, 20.0]);
    assert_eq!(results.leading_choice(), Some(1));
}

#[tokio::test]
async fn test_list_proposals_in_order() {
    let (gateway, service) = service();
    assert!(service.proposals().await.unwrap().is_empty());

    gateway.add_proposal(&["Yes", "No"], NOW, NOW + 10);
    gateway.add_proposal(&["Up", "Down"], NOW, NOW + 20);

    let proposals = service.proposals().await.unwrap();
    assert_eq!(proposals.len(), 2);
    assert_eq!(proposals[0].id, U256::zero());
    assert_eq!(proposals[1].choices, vec!["Up", "Down"]);
}

#[tokio::test]
async fn test_unknown_proposal_is_gateway_error() {
    let (_gateway, service) = service();
    let err = service.proposal(U256::from(9)).await.unwrap_err();
    assert!(matches!(err, VoteError::Gateway(_)));
}
