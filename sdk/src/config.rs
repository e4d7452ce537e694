//! Configuration for connecting the NFT voter client

use crate::{
    discovery::DEFAULT_DAS_PAGE_LIMIT, utils::string_to_pubkey, NftVoterError, NftVoterResult,
    ProtocolVersion, Provider,
};
use serde::Deserialize;
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use std::{fs, str::FromStr};

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Solana RPC URL
    pub rpc_url: String,

    /// DAS endpoint for asset queries, defaults to the RPC URL
    #[serde(default)]
    pub das_url: Option<String>,

    /// NFT voter plugin program ID
    pub plugin_program_id: String,

    /// spl-governance program ID
    #[serde(default = "default_governance_program_id")]
    pub governance_program_id: String,

    /// Whether the client targets devnet
    #[serde(default)]
    pub devnet: bool,

    /// Build instructions for the V2 plugin program
    #[serde(default)]
    pub nft_voter_v2: bool,

    /// Commitment level for RPC queries
    #[serde(default = "default_commitment")]
    pub commitment: String,

    /// Page size for DAS `getAssetsByOwner`
    #[serde(default = "default_das_page_limit")]
    pub das_page_limit: u32,
}

impl ClientConfig {
    /// Load configuration from file or environment variables
    pub fn load(config_path: Option<&str>) -> NftVoterResult<Self> {
        // Load from .env file if it exists
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!("Could not load .env file: {}", e);
        }

        let config = if let Some(path) = config_path {
            let content = fs::read_to_string(path)?;
            Self::from_toml(&content)?
        } else {
            Self::from_env()?
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> NftVoterResult<Self> {
        toml::from_str(content).map_err(|e| {
            NftVoterError::invalid_configuration(format!("Failed to parse config: {}", e))
        })
    }

    /// Load configuration from environment variables
    fn from_env() -> NftVoterResult<Self> {
        let required = |name: &str| {
            std::env::var(name).map_err(|_| {
                NftVoterError::invalid_configuration(format!(
                    "{} environment variable is required",
                    name
                ))
            })
        };
        let flag = |name: &str| {
            std::env::var(name)
                .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false)
        };

        Ok(ClientConfig {
            rpc_url: required("NFT_VOTER_RPC_URL")?,
            das_url: std::env::var("NFT_VOTER_DAS_URL").ok(),
            plugin_program_id: required("NFT_VOTER_PLUGIN_ID")?,
            governance_program_id: std::env::var("NFT_VOTER_GOVERNANCE_ID")
                .unwrap_or_else(|_| default_governance_program_id()),
            devnet: flag("NFT_VOTER_DEVNET"),
            nft_voter_v2: flag("NFT_VOTER_V2"),
            commitment: std::env::var("NFT_VOTER_COMMITMENT")
                .unwrap_or_else(|_| default_commitment()),
            das_page_limit: std::env::var("NFT_VOTER_DAS_PAGE_LIMIT")
                .ok()
                .map(|value| {
                    value.parse().map_err(|_| {
                        NftVoterError::invalid_configuration(format!(
                            "Invalid DAS page limit: {}",
                            value
                        ))
                    })
                })
                .transpose()?
                .unwrap_or_else(default_das_page_limit),
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> NftVoterResult<()> {
        if !self.rpc_url.starts_with("http") {
            return Err(NftVoterError::invalid_configuration(
                "RPC URL must start with http or https",
            ));
        }
        if let Some(das_url) = &self.das_url {
            if !das_url.starts_with("http") {
                return Err(NftVoterError::invalid_configuration(
                    "DAS URL must start with http or https",
                ));
            }
        }
        if self.das_page_limit == 0 || self.das_page_limit > DEFAULT_DAS_PAGE_LIMIT {
            return Err(NftVoterError::invalid_configuration(format!(
                "DAS page limit must be between 1 and {}",
                DEFAULT_DAS_PAGE_LIMIT
            )));
        }

        self.plugin_program_id()?;
        self.governance_program_id()?;
        self.commitment()?;
        Ok(())
    }

    /// Get the plugin program ID as a Pubkey
    pub fn plugin_program_id(&self) -> NftVoterResult<Pubkey> {
        string_to_pubkey(&self.plugin_program_id)
    }

    /// Get the governance program ID as a Pubkey
    pub fn governance_program_id(&self) -> NftVoterResult<Pubkey> {
        string_to_pubkey(&self.governance_program_id)
    }

    pub fn commitment(&self) -> NftVoterResult<CommitmentConfig> {
        CommitmentConfig::from_str(&self.commitment).map_err(|_| {
            NftVoterError::invalid_configuration(format!("Invalid commitment: {}", self.commitment))
        })
    }

    pub fn protocol_version(&self) -> ProtocolVersion {
        if self.nft_voter_v2 {
            ProtocolVersion::V2
        } else {
            ProtocolVersion::V1
        }
    }

    /// Build the cluster connection described by this configuration
    pub fn provider(&self) -> NftVoterResult<Provider> {
        let provider = Provider::new(&self.rpc_url, self.commitment()?);
        Ok(match &self.das_url {
            Some(das_url) => provider.with_das_url(das_url.clone()),
            None => provider,
        })
    }
}

// Default value functions
fn default_governance_program_id() -> String {
    crate::utils::DEFAULT_GOVERNANCE_PROGRAM_ID.to_string()
}

fn default_commitment() -> String {
    "confirmed".to_string()
}

fn default_das_page_limit() -> u32 {
    DEFAULT_DAS_PAGE_LIMIT
}
