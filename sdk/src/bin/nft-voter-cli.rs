//! NFT Voter CLI Tool
//!
//! Inspect voting power and the voter weight instructions the plugin client
//! would place around a governance action.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::{Parser, Subcommand, ValueEnum};
use nft_voter_sdk::{
    utils::string_to_pubkey, ClientConfig, GovernanceAction, Instruction, NftVoterWeightPluginClient,
    ProtocolVersion, Pubkey, VoterWeightPlugin,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nft-voter-cli")]
#[command(about = "Inspect NFT voter weight plugin state and instructions")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to a TOML configuration file; environment variables are used otherwise
    #[arg(long, env = "NFT_VOTER_CONFIG")]
    config: Option<String>,

    /// Override the configured plugin program version
    #[arg(long, value_enum)]
    program_version: Option<Version>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Version {
    V1,
    V2,
}

#[derive(Clone, Copy, ValueEnum)]
enum Action {
    CastVote,
    CommentProposal,
    CreateGovernance,
    CreateProposal,
    SignOffProposal,
}

impl From<Action> for GovernanceAction {
    fn from(action: Action) -> Self {
        match action {
            Action::CastVote => GovernanceAction::CastVote,
            Action::CommentProposal => GovernanceAction::CommentProposal,
            Action::CreateGovernance => GovernanceAction::CreateGovernance,
            Action::CreateProposal => GovernanceAction::CreateProposal,
            Action::SignOffProposal => GovernanceAction::SignOffProposal,
        }
    }
}

#[derive(clap::Args)]
struct Target {
    /// Realm address
    #[arg(long)]
    realm: String,
    /// Governing token mint
    #[arg(long)]
    mint: String,
    /// Voter wallet
    #[arg(long)]
    voter: String,
}

impl Target {
    fn parse(&self) -> Result<(Pubkey, Pubkey, Pubkey)> {
        Ok((
            string_to_pubkey(&self.realm).context("realm")?,
            string_to_pubkey(&self.mint).context("mint")?,
            string_to_pubkey(&self.voter).context("voter")?,
        ))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the voter's governance power
    Weight {
        #[command(flatten)]
        target: Target,
    },
    /// Print the voter weight instruction bundle for an action
    Update {
        #[command(flatten)]
        target: Target,
        /// Governance action the weight is recorded for
        #[arg(long, value_enum, default_value_t = Action::CastVote)]
        action: Action,
    },
    /// Print the PDAs the plugin uses for a voter
    Addresses {
        #[command(flatten)]
        target: Target,
    },
}

fn instruction_json(ix: &Instruction) -> Value {
    json!({
        "program_id": ix.program_id.to_string(),
        "accounts": ix.accounts.iter().map(|meta| json!({
            "pubkey": meta.pubkey.to_string(),
            "is_signer": meta.is_signer,
            "is_writable": meta.is_writable,
        })).collect::<Vec<_>>(),
        "data": STANDARD.encode(&ix.data),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let mut client = NftVoterWeightPluginClient::from_config(&config)?;
    if let Some(version) = cli.program_version {
        let version = match version {
            Version::V1 => ProtocolVersion::V1,
            Version::V2 => ProtocolVersion::V2,
        };
        client = client.with_version_flag(Arc::new(version));
    }

    let output = match &cli.command {
        Commands::Weight { target } => {
            let (realm, mint, voter) = target.parse()?;
            match client.calculate_voter_weight(&voter, &realm, &mint).await? {
                Some(weight) => json!({ "voter": voter.to_string(), "weight": weight }),
                None => json!({ "voter": voter.to_string(), "weight": Value::Null, "status": "absent" }),
            }
        }
        Commands::Update { target, action } => {
            let (realm, mint, voter) = target.parse()?;
            let bundle = client
                .update_voter_weight_record(&voter, &realm, &mint, (*action).into())
                .await?;
            json!({
                "version": bundle.version.to_string(),
                "pre": bundle.pre.iter().map(instruction_json).collect::<Vec<_>>(),
                "post": bundle.post.iter().map(instruction_json).collect::<Vec<_>>(),
            })
        }
        Commands::Addresses { target } => {
            let (realm, mint, voter) = target.parse()?;
            json!({
                "registrar": client.get_registrar_pda(&realm, &mint)?.to_string(),
                "voter_weight_record": client.get_voter_weight_record_pda(&realm, &mint, &voter)?.to_string(),
                "token_owner_record": client.get_token_owner_record_pda(&realm, &mint, &voter)?.to_string(),
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
