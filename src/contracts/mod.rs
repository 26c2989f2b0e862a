// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod gateway;
pub mod monitor;
pub mod proposal;
pub mod types;

pub use gateway::{ChainVoteClient, ContractGateway, GatewayError};
pub use monitor::{ChainVoteEvent, EventWatcher, EventWatcherConfig, WatchedEvent};
pub use proposal::{
    ProposalDraft, ProposalError, ProposalInfo, ProposalResults, VotingPhase, MAX_CHOICES,
    MAX_NAME_LEN, MIN_CHOICES,
};
pub use types::ChainVote;
