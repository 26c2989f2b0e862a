// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Call encoding against the ChainVote ABI

use chainvote_client::contracts::types::{CastVoteCall, ChainVoteCalls, CreateProposalCall};
use chainvote_client::fhe::EncryptedVotePayload;
use ethers::abi::{AbiDecode, AbiEncode};
use ethers::types::{Bytes, U256};
use ethers::utils::id;

fn payload() -> EncryptedVotePayload {
    EncryptedVotePayload {
        cipher_handle: format!("0x{}", "ab".repeat(32)),
        proof: "0x0102030405".to_string(),
    }
}

#[test]
fn test_cast_vote_selector() {
    let payload = payload();
    let call = CastVoteCall {
        proposal_id: U256::from(7),
        choice_id: U256::from(2),
        encrypted_vote: payload.handle_bytes().unwrap(),
        proof: Bytes::from(payload.proof_bytes().unwrap()),
    };

    let encoded = call.clone().encode();
    assert_eq!(
        &encoded[..4],
        &id("castVote(uint256,uint256,bytes32,bytes)")[..]
    );

    match ChainVoteCalls::decode(&encoded).unwrap() {
        ChainVoteCalls::CastVote(decoded) => {
            assert_eq!(decoded, call);
            assert_eq!(decoded.encrypted_vote, [0xab; 32]);
        }
        other => panic!("unexpected call {:?}", other),
    }
}

#[test]
fn test_create_proposal_selector() {
    let call = CreateProposalCall {
        name: "Budget".to_string(),
        details: "Allocate".to_string(),
        choices: vec!["Yes".to_string(), "No".to_string()],
        voting_start: U256::from(100),
        voting_end: U256::from(200),
    };
    let encoded = call.encode();
    assert_eq!(
        &encoded[..4],
        &id("createProposal(string,string,string[],uint256,uint256)")[..]
    );
}

#[test]
fn test_malformed_payload_is_rejected() {
    let short = EncryptedVotePayload {
        cipher_handle: "0xabcd".to_string(),
        proof: "0x00".to_string(),
    };
    assert!(short.handle_bytes().is_err());

    let unprefixed = EncryptedVotePayload {
        cipher_handle: "ab".repeat(32),
        proof: "0x00".to_string(),
    };
    assert!(unprefixed.handle_bytes().is_err());
}
