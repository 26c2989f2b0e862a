// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Proposal data read from and submitted to the ChainVote contract

use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fewest choices a proposal may offer
pub const MIN_CHOICES: usize = 2;
/// Most choices a proposal may offer
pub const MAX_CHOICES: usize = 10;
/// Longest accepted proposal name, in bytes
pub const MAX_NAME_LEN: usize = 255;

/// Where a proposal is in its voting window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VotingPhase {
    Pending,
    Active,
    Ended,
}

impl VotingPhase {
    /// `start <= now < end` is active
    pub fn at(voting_start: u64, voting_end: u64, now: u64) -> Self {
        if now < voting_start {
            VotingPhase::Pending
        } else if now < voting_end {
            VotingPhase::Active
        } else {
            VotingPhase::Ended
        }
    }
}

/// Output of `getProposalInfo`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalInfo {
    pub id: U256,
    pub name: String,
    pub details: String,
    pub choices: Vec<String>,
    pub voting_start: u64,
    pub voting_end: u64,
    pub results_published: bool,
    pub proposer: Address,
    pub voter_count: U256,
}

impl ProposalInfo {
    pub fn phase_at(&self, now: u64) -> VotingPhase {
        VotingPhase::at(self.voting_start, self.voting_end, now)
    }

    pub fn is_valid_choice(&self, choice_id: U256) -> bool {
        choice_id < U256::from(self.choices.len())
    }
}

/// Published tallies, one count per choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalResults {
    pub proposal_id: U256,
    pub votes: Vec<U256>,
}

impl ProposalResults {
    pub fn total(&self) -> U256 {
        self.votes.iter().fold(U256::zero(), |acc, v| acc.saturating_add(*v))
    }

    /// Share of the total per choice; all zeros when nobody voted
    pub fn percentages(&self) -> Vec<f64> {
        let total = self.total();
        if total.is_zero() {
            return vec![0.0; self.votes.len()];
        }
        let total = u256_to_f64(total);
        self.votes
            .iter()
            .map(|v| u256_to_f64(*v) * 100.0 / total)
            .collect()
    }

    /// Index of the choice with the most votes; `None` on no votes or a tie
    pub fn leading_choice(&self) -> Option<usize> {
        let max = self.votes.iter().max()?;
        if max.is_zero() {
            return None;
        }
        let mut leaders = self
            .votes
            .iter()
            .enumerate()
            .filter(|(_, v)| *v == max)
            .map(|(i, _)| i);
        let leader = leaders.next()?;
        match leaders.next() {
            Some(_) => None,
            None => Some(leader),
        }
    }
}

fn u256_to_f64(value: U256) -> f64 {
    value.to_string().parse().unwrap_or(f64::MAX)
}

/// Reasons a proposal draft is rejected before submission
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProposalError {
    #[error("Proposal name is required")]
    EmptyName,

    #[error("Proposal details are required")]
    EmptyDetails,

    #[error("Proposal name is {len} bytes, maximum is {max}")]
    NameTooLong { len: usize, max: usize },

    #[error("Please provide at least {min} options (got {count})")]
    TooFewChoices { count: usize, min: usize },

    #[error("Maximum {max} options allowed (got {count})")]
    TooManyChoices { count: usize, max: usize },

    #[error("End time {end} must be after start time {start}")]
    InvalidTimeWindow { start: u64, end: u64 },

    #[error("End time {end} must be in the future (now {now})")]
    EndInPast { end: u64, now: u64 },
}

/// Input to `createProposal`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalDraft {
    pub name: String,
    pub details: String,
    pub choices: Vec<String>,
    pub voting_start: u64,
    pub voting_end: u64,
}

impl ProposalDraft {
    /// Validated copy with blank choices dropped and the rest trimmed
    pub fn validated(&self, now: u64) -> Result<Self, ProposalError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ProposalError::EmptyName);
        }
        if name.len() > MAX_NAME_LEN {
            return Err(ProposalError::NameTooLong {
                len: name.len(),
                max: MAX_NAME_LEN,
            });
        }
        if self.details.trim().is_empty() {
            return Err(ProposalError::EmptyDetails);
        }

        let choices: Vec<String> = self
            .choices
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        if choices.len() < MIN_CHOICES {
            return Err(ProposalError::TooFewChoices {
                count: choices.len(),
                min: MIN_CHOICES,
            });
        }
        if choices.len() > MAX_CHOICES {
            return Err(ProposalError::TooManyChoices {
                count: choices.len(),
                max: MAX_CHOICES,
            });
        }

        if self.voting_end <= self.voting_start {
            return Err(ProposalError::InvalidTimeWindow {
                start: self.voting_start,
                end: self.voting_end,
            });
        }
        if self.voting_end <= now {
            return Err(ProposalError::EndInPast {
                end: self.voting_end,
                now,
            });
        }

        Ok(Self {
            name: name.to_string(),
            details: self.details.trim().to_string(),
            choices,
            voting_start: self.voting_start,
            voting_end: self.voting_end,
        })
    }
}
