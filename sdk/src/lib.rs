//! NFT Voter Rust SDK
//! Client for the spl-governance NFT voter weight plugin
//!
//! This SDK discovers the NFTs a voter holds, derives the plugin PDAs and
//! builds the instruction bundle that refreshes the voter weight record
//! around a governance action, for both the V1 and V2 plugin programs.
pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod governance_power;
pub mod instructions;
pub mod program;
pub mod types;
pub mod utils;

// Re-export the main client and types
pub use client::{NftVoterWeightPluginClient, VoterWeightPlugin};
pub use config::ClientConfig;
pub use discovery::{DasNftDiscovery, NftDiscovery};
pub use error::*;
pub use governance_power::{GovernancePower, RegistrarGovernancePower};
pub use program::{PluginProgram, Provider};
pub use types::*;

// Re-export commonly used Solana types
pub use solana_sdk::{
    commitment_config::CommitmentConfig,
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};
