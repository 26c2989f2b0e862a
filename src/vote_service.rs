// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vote Service
//!
//! Composes the encryption session with the contract gateway. Pre-checks
//! mirror the contract's own require rules.

use chrono::Utc;
use ethers::types::{Address, H256, U256};
use ethers::utils::to_checksum;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::contracts::{
    ContractGateway, GatewayError, ProposalDraft, ProposalError, ProposalInfo, ProposalResults,
    VotingPhase,
};
use crate::fhe::{EncryptionSessionManager, FheError};

/// Plaintext value sealed for every ballot; the choice travels in the clear
pub const VOTE_WEIGHT: u64 = 1;

#[derive(Debug, Error)]
pub enum VoteError {
    #[error(transparent)]
    Encryption(#[from] FheError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    InvalidProposal(#[from] ProposalError),

    #[error("Choice {choice_id} is out of range for proposal {proposal_id} ({choices} choices)")]
    InvalidChoice {
        proposal_id: U256,
        choice_id: U256,
        choices: usize,
    },

    #[error("Proposal {proposal_id} is not open for voting ({phase:?})")]
    NotActive {
        proposal_id: U256,
        phase: VotingPhase,
    },

    #[error("{voter:?} has already voted on proposal {proposal_id}")]
    AlreadyVoted { proposal_id: U256, voter: Address },

    #[error("Voting on proposal {proposal_id} has not ended")]
    VotingNotEnded { proposal_id: U256 },

    #[error("Results for proposal {proposal_id} are already published")]
    ResultsAlreadyPublished { proposal_id: U256 },

    #[error("Results for proposal {proposal_id} are not published yet")]
    ResultsNotPublished { proposal_id: U256 },
}

pub struct VoteService {
    session: Arc<EncryptionSessionManager>,
    gateway: Arc<dyn ContractGateway>,
}

impl VoteService {
    pub fn new(session: Arc<EncryptionSessionManager>, gateway: Arc<dyn ContractGateway>) -> Self {
        Self { session, gateway }
    }

    pub fn session(&self) -> &Arc<EncryptionSessionManager> {
        &self.session
    }

    pub fn gateway(&self) -> &Arc<dyn ContractGateway> {
        &self.gateway
    }

    /// All proposals, oldest first
    pub async fn proposals(&self) -> Result<Vec<ProposalInfo>, VoteError> {
        let count = self.gateway.proposal_count().await?;
        let mut proposals = Vec::new();
        let mut id = U256::zero();
        while id < count {
            proposals.push(self.gateway.proposal_info(id).await?);
            id += U256::one();
        }
        Ok(proposals)
    }

    pub async fn proposal(&self, proposal_id: U256) -> Result<ProposalInfo, VoteError> {
        Ok(self.gateway.proposal_info(proposal_id).await?)
    }

    pub async fn has_voted(&self, proposal_id: U256, voter: Address) -> Result<bool, VoteError> {
        Ok(self.gateway.has_voted(proposal_id, voter).await?)
    }

    pub async fn cast_vote(
        &self,
        proposal_id: U256,
        choice_id: U256,
        voter: Address,
    ) -> Result<H256, VoteError> {
        self.cast_vote_at(proposal_id, choice_id, voter, unix_now())
            .await
    }

    /// Encrypt a ballot for `voter` and forward it to the contract
    pub async fn cast_vote_at(
        &self,
        proposal_id: U256,
        choice_id: U256,
        voter: Address,
        now: u64,
    ) -> Result<H256, VoteError> {
        let info = self.gateway.proposal_info(proposal_id).await?;
        if !info.is_valid_choice(choice_id) {
            return Err(VoteError::InvalidChoice {
                proposal_id,
                choice_id,
                choices: info.choices.len(),
            });
        }
        let phase = info.phase_at(now);
        if phase != VotingPhase::Active {
            return Err(VoteError::NotActive { proposal_id, phase });
        }
        if self.gateway.has_voted(proposal_id, voter).await? {
            return Err(VoteError::AlreadyVoted { proposal_id, voter });
        }

        let contract = to_checksum(&self.gateway.contract_address(), None);
        let account = to_checksum(&voter, None);
        debug!(
            "Encrypting ballot for proposal {} choice {} from {}",
            proposal_id, choice_id, account
        );
        let payload = self
            .session
            .encrypt(VOTE_WEIGHT, &contract, &account)
            .await
            .map_err(|e| {
                warn!("Ballot encryption failed: {}", e.user_message());
                e
            })?;

        let tx_hash = self
            .gateway
            .cast_vote(proposal_id, choice_id, &payload)
            .await?;
        info!("🗳️ Vote cast on proposal {} (tx {:?})", proposal_id, tx_hash);
        Ok(tx_hash)
    }

    /// Validate `draft` against `now` and submit it with the current fee
    pub async fn create_proposal(
        &self,
        draft: &ProposalDraft,
        now: u64,
    ) -> Result<H256, VoteError> {
        let draft = draft.validated(now)?;
        let fee = self.gateway.proposal_fee().await?;
        debug!(
            "Creating proposal '{}' with {} choices, fee {}",
            draft.name,
            draft.choices.len(),
            fee
        );
        let tx_hash = self.gateway.create_proposal(&draft, fee).await?;
        info!("📝 Proposal '{}' submitted (tx {:?})", draft.name, tx_hash);
        Ok(tx_hash)
    }

    pub async fn request_results_decryption(&self, proposal_id: U256) -> Result<H256, VoteError> {
        self.request_results_decryption_at(proposal_id, unix_now())
            .await
    }

    /// Ask the contract to decrypt tallies once voting has ended
    pub async fn request_results_decryption_at(
        &self,
        proposal_id: U256,
        now: u64,
    ) -> Result<H256, VoteError> {
        let info = self.gateway.proposal_info(proposal_id).await?;
        if info.phase_at(now) != VotingPhase::Ended {
            return Err(VoteError::VotingNotEnded { proposal_id });
        }
        if info.results_published {
            return Err(VoteError::ResultsAlreadyPublished { proposal_id });
        }
        let tx_hash = self.gateway.request_results_decryption(proposal_id).await?;
        info!(
            "🔓 Decryption requested for proposal {} (tx {:?})",
            proposal_id, tx_hash
        );
        Ok(tx_hash)
    }

    /// Published tallies for a proposal
    pub async fn results(&self, proposal_id: U256) -> Result<ProposalResults, VoteError> {
        let info = self.gateway.proposal_info(proposal_id).await?;
        if !info.results_published {
            return Err(VoteError::ResultsNotPublished { proposal_id });
        }
        Ok(self.gateway.proposal_results(proposal_id).await?)
    }
}

pub(crate) fn unix_now() -> u64 {
    Utc::now().timestamp().max(0) as u64
}
