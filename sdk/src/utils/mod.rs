//! Utilities and Helpers for the NFT voter SDK
//!
//! Address derivation, account decoding and Anchor discriminators.

pub mod accounts;
pub mod addresses;

pub use accounts::*;
pub use addresses::*;

use crate::{NftVoterError, NftVoterResult};
use solana_sdk::pubkey::Pubkey;

/// Calculate SHA256 hash
pub fn sha256(data: &[u8]) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Anchor instruction discriminator: `sha256("global:<name>")[..8]`
pub fn instruction_discriminator(name: &str) -> [u8; 8] {
    discriminator("global", name)
}

/// Anchor account discriminator: `sha256("account:<Name>")[..8]`
pub fn account_discriminator(name: &str) -> [u8; 8] {
    discriminator("account", name)
}

fn discriminator(namespace: &str, name: &str) -> [u8; 8] {
    let hash = sha256(format!("{}:{}", namespace, name).as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&hash[..8]);
    out
}

/// Convert string to Pubkey
pub fn string_to_pubkey(s: &str) -> NftVoterResult<Pubkey> {
    s.parse::<Pubkey>()
        .map_err(|_| NftVoterError::InvalidConfiguration(format!("Invalid pubkey: {}", s)))
}
