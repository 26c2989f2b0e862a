// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ChainVote contract gateway
//!
//! The only place the client talks to the voting contract. Business rules
//! (fees, tallying, decryption authorization) stay on-chain; this layer
//! encodes calls and decodes results and reverts.

use async_trait::async_trait;
use ethers::prelude::*;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use super::proposal::{ProposalDraft, ProposalInfo, ProposalResults};
use super::types::{ChainVote, ChainVoteErrors};
use crate::fhe::EncryptedVotePayload;

/// Errors that can occur talking to the ChainVote contract
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Encrypted payload could not be decoded into call arguments
    #[error("Invalid encrypted payload: {0}")]
    InvalidPayload(String),

    /// The contract reverted with a known custom error
    #[error("ChainVote {method} reverted: {reason}")]
    Reverted { method: String, reason: String },

    /// Transport, signing or decoding failure
    #[error("ChainVote {method} failed: {reason}")]
    Call { method: String, reason: String },
}

/// Opaque sink for proposals and encrypted votes
#[async_trait]
pub trait ContractGateway: Send + Sync {
    fn contract_address(&self) -> Address;

    async fn proposal_count(&self) -> Result<U256, GatewayError>;

    async fn proposal_fee(&self) -> Result<U256, GatewayError>;

    async fn proposal_info(&self, proposal_id: U256) -> Result<ProposalInfo, GatewayError>;

    async fn proposal_results(&self, proposal_id: U256) -> Result<ProposalResults, GatewayError>;

    async fn has_voted(&self, proposal_id: U256, voter: Address) -> Result<bool, GatewayError>;

    async fn create_proposal(&self, draft: &ProposalDraft, fee: U256) -> Result<H256, GatewayError>;

    async fn cast_vote(
        &self,
        proposal_id: U256,
        choice_id: U256,
        payload: &EncryptedVotePayload,
    ) -> Result<H256, GatewayError>;

    async fn request_results_decryption(&self, proposal_id: U256) -> Result<H256, GatewayError>;
}

/// [`ContractGateway`] over ethers `abigen!` bindings
pub struct ChainVoteClient<M: Middleware> {
    contract: ChainVote<M>,
}

impl<M: Middleware + 'static> ChainVoteClient<M> {
    pub fn new(address: Address, client: Arc<M>) -> Self {
        Self {
            contract: ChainVote::new(address, client),
        }
    }

    pub fn contract(&self) -> &ChainVote<M> {
        &self.contract
    }
}

/// Map a contract error, preferring the decoded custom revert name
fn contract_error<M: Middleware>(method: &str, err: ContractError<M>) -> GatewayError {
    if let Some(revert) = err.decode_contract_revert::<ChainVoteErrors>() {
        return GatewayError::Reverted {
            method: method.to_string(),
            reason: revert_name(&revert),
        };
    }
    GatewayError::Call {
        method: method.to_string(),
        reason: err.to_string(),
    }
}

fn revert_name(revert: &ChainVoteErrors) -> String {
    let debug = format!("{:?}", revert);
    match debug.split_once('(') {
        Some((name, _)) => name.to_string(),
        None => debug,
    }
}

fn to_u64(method: &str, field: &str, value: U256) -> Result<u64, GatewayError> {
    if value > U256::from(u64::MAX) {
        return Err(GatewayError::Call {
            method: method.to_string(),
            reason: format!("{} {} does not fit in u64", field, value),
        });
    }
    Ok(value.as_u64())
}

#[async_trait]
impl<M: Middleware + 'static> ContractGateway for ChainVoteClient<M> {
    fn contract_address(&self) -> Address {
        self.contract.address()
    }

    async fn proposal_count(&self) -> Result<U256, GatewayError> {
        self.contract
            .get_proposal_count()
            .call()
            .await
            .map_err(|e| contract_error("getProposalCount", e))
    }

    async fn proposal_fee(&self) -> Result<U256, GatewayError> {
        self.contract
            .proposal_fee()
            .call()
            .await
            .map_err(|e| contract_error("proposalFee", e))
    }

    async fn proposal_info(&self, proposal_id: U256) -> Result<ProposalInfo, GatewayError> {
        let (name, details, choices, voting_start, voting_end, results_published, proposer, voter_count) =
            self.contract
                .get_proposal_info(proposal_id)
                .call()
                .await
                .map_err(|e| contract_error("getProposalInfo", e))?;

        Ok(ProposalInfo {
            id: proposal_id,
            name,
            details,
            choices,
            voting_start: to_u64("getProposalInfo", "votingStart", voting_start)?,
            voting_end: to_u64("getProposalInfo", "votingEnd", voting_end)?,
            results_published,
            proposer,
            voter_count,
        })
    }

    async fn proposal_results(&self, proposal_id: U256) -> Result<ProposalResults, GatewayError> {
        let votes = self
            .contract
            .get_proposal_results(proposal_id)
            .call()
            .await
            .map_err(|e| contract_error("getProposalResults", e))?;
        Ok(ProposalResults { proposal_id, votes })
    }

    async fn has_voted(&self, proposal_id: U256, voter: Address) -> Result<bool, GatewayError> {
        self.contract
            .has_voted(proposal_id, voter)
            .call()
            .await
            .map_err(|e| contract_error("hasVoted", e))
    }

    async fn create_proposal(&self, draft: &ProposalDraft, fee: U256) -> Result<H256, GatewayError> {
        let call = self
            .contract
            .create_proposal(
                draft.name.clone(),
                draft.details.clone(),
                draft.choices.clone(),
                U256::from(draft.voting_start),
                U256::from(draft.voting_end),
            )
            .value(fee);
        let pending = call
            .send()
            .await
            .map_err(|e| contract_error("createProposal", e))?;
        let tx_hash = pending.tx_hash();
        info!("📝 createProposal submitted: {:?}", tx_hash);
        Ok(tx_hash)
    }

    async fn cast_vote(
        &self,
        proposal_id: U256,
        choice_id: U256,
        payload: &EncryptedVotePayload,
    ) -> Result<H256, GatewayError> {
        let handle = payload
            .handle_bytes()
            .map_err(GatewayError::InvalidPayload)?;
        let proof = payload
            .proof_bytes()
            .map_err(GatewayError::InvalidPayload)?;

        debug!(
            "castVote(proposal={}, choice={}, proof={} bytes)",
            proposal_id,
            choice_id,
            proof.len()
        );
        let call = self
            .contract
            .cast_vote(proposal_id, choice_id, handle, Bytes::from(proof));
        let pending = call
            .send()
            .await
            .map_err(|e| contract_error("castVote", e))?;
        let tx_hash = pending.tx_hash();
        info!("🗳️ castVote submitted: {:?}", tx_hash);
        Ok(tx_hash)
    }

    async fn request_results_decryption(&self, proposal_id: U256) -> Result<H256, GatewayError> {
        let call = self.contract.request_results_decryption(proposal_id);
        let pending = call
            .send()
            .await
            .map_err(|e| contract_error("requestResultsDecryption", e))?;
        let tx_hash = pending.tx_hash();
        info!("🔓 requestResultsDecryption submitted: {:?}", tx_hash);
        Ok(tx_hash)
    }
}
