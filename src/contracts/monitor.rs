// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ChainVote event watcher
//!
//! Polls the contract's logs and forwards decoded events over a channel so
//! callers can refresh proposal lists and results when something changes.

use ethers::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::gateway::GatewayError;
use super::types::{ChainVote, ChainVoteEvents};

#[derive(Debug, Clone)]
pub struct EventWatcherConfig {
    pub poll_interval: Duration,
    /// First block to scan; the current head when `None`
    pub start_block: Option<u64>,
    pub event_buffer_size: usize,
}

impl Default for EventWatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(4),
            start_block: None,
            event_buffer_size: 100,
        }
    }
}

/// Decoded ChainVote event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChainVoteEvent {
    #[serde(rename_all = "camelCase")]
    ProposalCreated {
        proposal_id: U256,
        proposer: Address,
        name: String,
        voting_start: U256,
        voting_end: U256,
        choices_count: U256,
    },
    #[serde(rename_all = "camelCase")]
    VoteCast {
        proposal_id: U256,
        voter: Address,
        choice_id: U256,
    },
    #[serde(rename_all = "camelCase")]
    ResultsDecryptionRequested { proposal_id: U256, request_id: U256 },
    #[serde(rename_all = "camelCase")]
    ResultsPublished {
        proposal_id: U256,
        votes: Vec<U256>,
        total_voters: U256,
    },
    #[serde(rename_all = "camelCase")]
    ProposalFeeUpdated { old_fee: U256, new_fee: U256 },
    FundsWithdrawn { amount: U256, recipient: Address },
}

impl From<ChainVoteEvents> for ChainVoteEvent {
    fn from(event: ChainVoteEvents) -> Self {
        match event {
            ChainVoteEvents::ProposalCreatedFilter(e) => ChainVoteEvent::ProposalCreated {
                proposal_id: e.proposal_id,
                proposer: e.proposer,
                name: e.name,
                voting_start: e.voting_start,
                voting_end: e.voting_end,
                choices_count: e.choices_count,
            },
            ChainVoteEvents::VoteCastFilter(e) => ChainVoteEvent::VoteCast {
                proposal_id: e.proposal_id,
                voter: e.voter,
                choice_id: e.choice_id,
            },
            ChainVoteEvents::ResultsDecryptionRequestedFilter(e) => {
                ChainVoteEvent::ResultsDecryptionRequested {
                    proposal_id: e.proposal_id,
                    request_id: e.request_id,
                }
            }
            ChainVoteEvents::ResultsPublishedFilter(e) => ChainVoteEvent::ResultsPublished {
                proposal_id: e.proposal_id,
                votes: e.votes,
                total_voters: e.total_voters,
            },
            ChainVoteEvents::ProposalFeeUpdatedFilter(e) => ChainVoteEvent::ProposalFeeUpdated {
                old_fee: e.old_fee,
                new_fee: e.new_fee,
            },
            ChainVoteEvents::FundsWithdrawnFilter(e) => ChainVoteEvent::FundsWithdrawn {
                amount: e.amount,
                recipient: e.recipient,
            },
        }
    }
}

impl ChainVoteEvent {
    /// Proposal the event concerns, if any
    pub fn proposal_id(&self) -> Option<U256> {
        match self {
            ChainVoteEvent::ProposalCreated { proposal_id, .. }
            | ChainVoteEvent::VoteCast { proposal_id, .. }
            | ChainVoteEvent::ResultsDecryptionRequested { proposal_id, .. }
            | ChainVoteEvent::ResultsPublished { proposal_id, .. } => Some(*proposal_id),
            ChainVoteEvent::ProposalFeeUpdated { .. } | ChainVoteEvent::FundsWithdrawn { .. } => {
                None
            }
        }
    }
}

/// Event plus where it was logged
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchedEvent {
    pub block_number: u64,
    pub tx_hash: H256,
    pub event: ChainVoteEvent,
}

pub struct EventWatcher<M: Middleware> {
    contract: ChainVote<M>,
    client: Arc<M>,
    config: EventWatcherConfig,
    next_block: Option<u64>,
}

impl<M: Middleware + 'static> EventWatcher<M> {
    pub fn new(address: Address, client: Arc<M>, config: EventWatcherConfig) -> Self {
        let next_block = config.start_block;
        Self {
            contract: ChainVote::new(address, client.clone()),
            client,
            config,
            next_block,
        }
    }

    /// Scan new blocks once and return their events in log order
    pub async fn poll_once(&mut self) -> Result<Vec<WatchedEvent>, GatewayError> {
        let head = self
            .client
            .get_block_number()
            .await
            .map_err(|e| GatewayError::Call {
                method: "eth_blockNumber".to_string(),
                reason: e.to_string(),
            })?
            .as_u64();

        let from = self.next_block.unwrap_or(head);
        if head < from {
            return Ok(Vec::new());
        }

        let logs = self
            .contract
            .events()
            .from_block(from)
            .to_block(head)
            .query_with_meta()
            .await
            .map_err(|e| GatewayError::Call {
                method: "eth_getLogs".to_string(),
                reason: e.to_string(),
            })?;
        self.next_block = Some(head + 1);

        debug!("Scanned blocks {}..={}: {} events", from, head, logs.len());
        Ok(logs
            .into_iter()
            .map(|(event, meta)| WatchedEvent {
                block_number: meta.block_number.as_u64(),
                tx_hash: meta.transaction_hash,
                event: event.into(),
            })
            .collect())
    }

    /// Poll until `cancel` fires or the receiver is dropped
    pub fn spawn(
        mut self,
        cancel: CancellationToken,
    ) -> (mpsc::Receiver<WatchedEvent>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(self.config.event_buffer_size);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.config.poll_interval);
            info!("👀 Watching ChainVote events at {:?}", self.contract.address());

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {}
                }

                match self.poll_once().await {
                    Ok(events) => {
                        for event in events {
                            if tx.send(event).await.is_err() {
                                debug!("Event receiver dropped, stopping watcher");
                                return;
                            }
                        }
                    }
                    Err(e) => warn!("Event poll failed: {}", e),
                }
            }
            info!("Event watcher stopped");
        });
        (rx, handle)
    }
}
