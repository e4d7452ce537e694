//! Error types for the NFT voter SDK
//!
//! Collaborator failures (RPC, DAS, account decoding) are surfaced unchanged;
//! nothing in this crate retries.

use thiserror::Error;

/// Main error type for the NFT voter SDK
#[derive(Error, Debug)]
pub enum NftVoterError {
    // Derivation Errors (1000-1099)
    #[error("Address derivation failed: {0}")]
    AddressDerivation(String),

    // Account Errors (3000-3099)
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Invalid account data: {0}")]
    InvalidAccountData(String),

    // Discovery Errors (5000-5099)
    #[error("DAS request failed: {0}")]
    Das(String),

    // SDK Errors (8000-8099)
    #[error("Invalid SDK configuration: {0}")]
    InvalidConfiguration(String),

    // Wrapped errors
    #[error("Anchor error: {0}")]
    AnchorError(#[from] anchor_lang::error::Error),

    #[error("Solana client error: {0}")]
    SolanaClientError(Box<solana_client::client_error::ClientError>),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<solana_client::client_error::ClientError> for NftVoterError {
    fn from(err: solana_client::client_error::ClientError) -> Self {
        Self::SolanaClientError(Box::new(err))
    }
}

impl NftVoterError {
    /// Get the error code for this error
    pub fn code(&self) -> u32 {
        match self {
            NftVoterError::AddressDerivation(_) => 1000,

            NftVoterError::AccountNotFound(_) => 3000,
            NftVoterError::InvalidAccountData(_) => 3001,

            NftVoterError::Das(_) => 5000,

            NftVoterError::InvalidConfiguration(_) => 8000,

            // Wrapped errors use generic codes
            NftVoterError::AnchorError(_) => 9000,
            NftVoterError::SolanaClientError(_) => 9001,
            NftVoterError::HttpError(_) => 9002,
            NftVoterError::JsonError(_) => 9004,
            NftVoterError::IoError(_) => 9005,
        }
    }

    /// Create a new account data error
    pub fn invalid_account_data<T: std::fmt::Display>(msg: T) -> Self {
        NftVoterError::InvalidAccountData(msg.to_string())
    }

    /// Create a new configuration error
    pub fn invalid_configuration<T: std::fmt::Display>(msg: T) -> Self {
        NftVoterError::InvalidConfiguration(msg.to_string())
    }

    /// Create a new DAS error
    pub fn das<T: std::fmt::Display>(msg: T) -> Self {
        NftVoterError::Das(msg.to_string())
    }
}

/// Result type for SDK operations
pub type NftVoterResult<T> = std::result::Result<T, NftVoterError>;
