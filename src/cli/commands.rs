// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use clap::Args;
use ethers::middleware::SignerMiddleware;
use ethers::prelude::*;
use std::str::FromStr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::ChainVoteConfig;
use crate::contracts::{
    ChainVoteClient, ContractGateway, EventWatcher, EventWatcherConfig, ProposalDraft,
    ProposalInfo, VotingPhase,
};
use crate::fhe::{
    EncryptionSessionManager, HttpTransport, PageScope, RelayerSdk, ScriptFetcher, SessionConfig,
    WalletBinding,
};
use crate::vote_service::{unix_now, VoteService};

/// Connection settings shared by every command
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// JSON-RPC endpoint (defaults to the public Sepolia node)
    #[arg(long, env = "CHAINVOTE_RPC_URL")]
    pub rpc_url: Option<String>,

    /// ChainVote contract address
    #[arg(long, env = "CHAINVOTE_CONTRACT")]
    pub contract: Option<String>,
}

impl ConnectionArgs {
    fn config(&self) -> Result<ChainVoteConfig> {
        let mut config = ChainVoteConfig::from_env()?;
        if let Some(ref rpc_url) = self.rpc_url {
            config.rpc_url = rpc_url.clone();
        }
        if let Some(ref contract) = self.contract {
            config.contract_address = Address::from_str(contract)
                .map_err(|_| anyhow!("Invalid contract address: {}", contract))?;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Arguments for commands that only read a proposal
#[derive(Args, Debug)]
pub struct ProposalArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Proposal ID
    #[arg(long)]
    pub id: u64,
}

/// Arguments for has-voted command
#[derive(Args, Debug)]
pub struct HasVotedArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Proposal ID
    #[arg(long)]
    pub id: u64,

    /// Voter address
    #[arg(long)]
    pub voter: String,
}

/// Arguments for create-proposal command
#[derive(Args, Debug)]
pub struct CreateProposalArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Proposal name
    #[arg(long)]
    pub name: String,

    /// Proposal description
    #[arg(long)]
    pub details: String,

    /// Comma-separated list of choices
    #[arg(long, value_delimiter = ',')]
    pub choices: Vec<String>,

    /// Voting start (unix seconds, defaults to now)
    #[arg(long)]
    pub start: Option<u64>,

    /// Voting duration in hours
    #[arg(long, default_value_t = 24)]
    pub duration_hours: u64,

    /// Private key of the proposer
    #[arg(long, env = "CHAINVOTE_PRIVATE_KEY")]
    pub private_key: Option<String>,

    /// Validate only, don't submit a transaction
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for request-decryption command
#[derive(Args, Debug)]
pub struct RequestDecryptionArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Proposal ID
    #[arg(long)]
    pub id: u64,

    /// Private key of the requester
    #[arg(long, env = "CHAINVOTE_PRIVATE_KEY")]
    pub private_key: Option<String>,
}

/// Arguments for watch command
#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// First block to scan (defaults to the current head)
    #[arg(long, env = "CHAINVOTE_START_BLOCK")]
    pub from_block: Option<u64>,
}

/// Script host for a terminal session: there is no page to inject the
/// relayer SDK into, so ballots cannot be encrypted from the CLI
struct HeadlessFetcher;

#[async_trait]
impl ScriptFetcher for HeadlessFetcher {
    async fn fetch(&self, _url: &str) -> Result<Option<Arc<dyn RelayerSdk>>> {
        Err(anyhow!("no script host available in a terminal session"))
    }
}

fn read_service(config: &ChainVoteConfig) -> Result<VoteService> {
    let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
        .map_err(|e| anyhow!("Failed to create provider: {}", e))?;
    let gateway = ChainVoteClient::new(config.contract_address, Arc::new(provider));
    service_with(config, Arc::new(gateway))
}

fn signing_service(config: &ChainVoteConfig, private_key: Option<String>) -> Result<VoteService> {
    let private_key = private_key.ok_or_else(|| {
        anyhow!("Private key required. Use --private-key or set CHAINVOTE_PRIVATE_KEY env var")
    })?;
    let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
        .map_err(|e| anyhow!("Failed to create provider: {}", e))?;
    let wallet = private_key
        .parse::<LocalWallet>()
        .map_err(|e| anyhow!("Invalid private key: {}", e))?
        .with_chain_id(config.chain_id);
    info!("Using signer {:?}", wallet.address());

    let signer = Arc::new(SignerMiddleware::new(provider, wallet));
    let gateway = ChainVoteClient::new(config.contract_address, signer);
    service_with(config, Arc::new(gateway))
}

fn service_with(config: &ChainVoteConfig, gateway: Arc<dyn ContractGateway>) -> Result<VoteService> {
    let session_config = SessionConfig::from_env();
    session_config.validate().map_err(|e| anyhow!(e))?;

    let page = PageScope::new(Arc::new(HeadlessFetcher));
    page.wallets().register(
        WalletBinding::Ethereum,
        Arc::new(HttpTransport::new(&config.rpc_url)?),
    );
    let session = Arc::new(EncryptionSessionManager::new(session_config, page));
    Ok(VoteService::new(session, gateway))
}

fn phase_label(info: &ProposalInfo, now: u64) -> &'static str {
    match info.phase_at(now) {
        VotingPhase::Pending => "⏳ pending",
        VotingPhase::Active => "🟢 active",
        VotingPhase::Ended if info.results_published => "✅ results published",
        VotingPhase::Ended => "🔒 ended",
    }
}

fn format_timestamp(ts: u64) -> String {
    chrono::DateTime::from_timestamp(ts as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// List all proposals
pub async fn list_proposals(connection: ConnectionArgs) -> Result<()> {
    let config = connection.config()?;
    let service = read_service(&config)?;
    let proposals = service.proposals().await?;
    let now = unix_now();

    println!("📋 {} proposals on {:?}", proposals.len(), config.contract_address);
    for info in &proposals {
        println!(
            "  #{:<4} {:<40} {} ({} voters)",
            info.id.to_string(),
            info.name,
            phase_label(info, now),
            info.voter_count
        );
    }
    Ok(())
}

/// Show one proposal
pub async fn show_proposal(args: ProposalArgs) -> Result<()> {
    let config = args.connection.config()?;
    let service = read_service(&config)?;
    let info = service.proposal(U256::from(args.id)).await?;
    let now = unix_now();

    println!("\n📋 Proposal #{}", info.id);
    println!("  Name:      {}", info.name);
    println!("  Details:   {}", info.details);
    println!("  Proposer:  {:?}", info.proposer);
    println!("  Start:     {}", format_timestamp(info.voting_start));
    println!("  End:       {}", format_timestamp(info.voting_end));
    println!("  Status:    {}", phase_label(&info, now));
    println!("  Voters:    {}", info.voter_count);
    println!("  Choices:");
    for (i, choice) in info.choices.iter().enumerate() {
        println!("    [{}] {}", i, choice);
    }
    Ok(())
}

/// Show published results
pub async fn show_results(args: ProposalArgs) -> Result<()> {
    let config = args.connection.config()?;
    let service = read_service(&config)?;
    let proposal_id = U256::from(args.id);
    let info = service.proposal(proposal_id).await?;
    let results = service.results(proposal_id).await?;

    println!("\n📊 Results for '{}' ({} votes)", info.name, results.total());
    for ((choice, votes), pct) in info
        .choices
        .iter()
        .zip(results.votes.iter())
        .zip(results.percentages())
    {
        println!("  {:<30} {:>6} ({:.1}%)", choice, votes.to_string(), pct);
    }
    match results.leading_choice().and_then(|i| info.choices.get(i)) {
        Some(winner) => println!("🏆 Leading: {}", winner),
        None => println!("🤝 No single leading choice"),
    }
    Ok(())
}

/// Check whether an address has voted
pub async fn has_voted(args: HasVotedArgs) -> Result<()> {
    let config = args.connection.config()?;
    let service = read_service(&config)?;
    let voter =
        Address::from_str(&args.voter).map_err(|_| anyhow!("Invalid address format"))?;

    if service.has_voted(U256::from(args.id), voter).await? {
        println!("✅ {:?} has voted on proposal {}", voter, args.id);
    } else {
        println!("❌ {:?} has not voted on proposal {}", voter, args.id);
    }
    Ok(())
}

/// Create a proposal
pub async fn create_proposal(args: CreateProposalArgs) -> Result<()> {
    let config = args.connection.config()?;
    let now = unix_now();
    let start = args.start.unwrap_or(now);
    let draft = ProposalDraft {
        name: args.name,
        details: args.details,
        choices: args.choices,
        voting_start: start,
        voting_end: start + args.duration_hours * 3600,
    };

    let validated = draft.validated(now)?;
    println!("\n📋 Proposal Details:");
    println!("  Name:    {}", validated.name);
    println!("  Choices: {:?}", validated.choices);
    println!("  Start:   {}", format_timestamp(validated.voting_start));
    println!("  End:     {}", format_timestamp(validated.voting_end));

    if args.dry_run {
        println!("\n🔍 DRY RUN MODE - No transactions will be submitted");
        println!("✅ Proposal is valid");
        return Ok(());
    }

    let service = signing_service(&config, args.private_key)?;
    println!("\n🚀 Submitting proposal...");
    let tx_hash = service.create_proposal(&validated, now).await?;
    println!("✅ Proposal transaction submitted!");
    println!("   Transaction hash: {:?}", tx_hash);
    println!("   https://sepolia.etherscan.io/tx/{:?}", tx_hash);
    Ok(())
}

/// Request decryption of results after voting ends
pub async fn request_decryption(args: RequestDecryptionArgs) -> Result<()> {
    let config = args.connection.config()?;
    let service = signing_service(&config, args.private_key)?;

    println!("🔓 Requesting results decryption for proposal {}...", args.id);
    let tx_hash = service
        .request_results_decryption(U256::from(args.id))
        .await?;
    println!("✅ Decryption request submitted!");
    println!("   Transaction hash: {:?}", tx_hash);
    Ok(())
}

/// Stream contract events until Ctrl-C
pub async fn watch(args: WatchArgs) -> Result<()> {
    let config = args.connection.config()?;
    let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
        .map_err(|e| anyhow!("Failed to create provider: {}", e))?;

    let watcher = EventWatcher::new(
        config.contract_address,
        Arc::new(provider),
        EventWatcherConfig {
            poll_interval: config.poll_interval,
            start_block: args.from_block.or(config.start_block),
            ..Default::default()
        },
    );

    let cancel = CancellationToken::new();
    let (mut events, handle) = watcher.spawn(cancel.clone());
    println!("👀 Watching {:?} (Ctrl-C to stop)", config.contract_address);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                cancel.cancel();
                break;
            }
            event = events.recv() => match event {
                Some(event) => println!("{}", serde_json::to_string(&event)?),
                None => {
                    warn!("Event stream closed");
                    break;
                }
            }
        }
    }

    handle.await.map_err(|e| anyhow!("Watcher task failed: {}", e))?;
    Ok(())
}
