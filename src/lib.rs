// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod cli;
pub mod config;
pub mod contracts;
pub mod fhe;
pub mod version;
pub mod vote_service;

// Re-export main types
pub use config::{ChainVoteConfig, ConfigError};
pub use contracts::{
    ChainVoteClient, ChainVoteEvent, ContractGateway, EventWatcher, GatewayError, ProposalDraft,
    ProposalInfo, ProposalResults, VotingPhase,
};
pub use fhe::{
    EncryptedVotePayload, EncryptionSessionManager, FheError, PageScope, SessionConfig,
    SessionStatus,
};
pub use vote_service::{VoteError, VoteService};
