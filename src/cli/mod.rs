// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// ChainVote CLI
#[derive(Parser, Debug)]
#[command(name = "chainvote-cli")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Inspect and manage ChainVote proposals", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all proposals
    Proposals(commands::ConnectionArgs),

    /// Show a single proposal
    Proposal(commands::ProposalArgs),

    /// Show published results for a proposal
    Results(commands::ProposalArgs),

    /// Check whether an address has voted
    HasVoted(commands::HasVotedArgs),

    /// Create a new proposal (pays the proposal fee)
    CreateProposal(commands::CreateProposalArgs),

    /// Request decryption of results after voting ends
    RequestDecryption(commands::RequestDecryptionArgs),

    /// Stream contract events
    Watch(commands::WatchArgs),
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Proposals(args) => commands::list_proposals(args).await,
        Commands::Proposal(args) => commands::show_proposal(args).await,
        Commands::Results(args) => commands::show_results(args).await,
        Commands::HasVoted(args) => commands::has_voted(args).await,
        Commands::CreateProposal(args) => commands::create_proposal(args).await,
        Commands::RequestDecryption(args) => commands::request_decryption(args).await,
        Commands::Watch(args) => commands::watch(args).await,
    }
}
