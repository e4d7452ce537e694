//! Address derivation utilities and PDA helpers for the NFT voter plugin
//!
//! Registrar, voter weight record and ticket PDAs live under the plugin program;
//! token owner records live under spl-governance; metadata under Metaplex.

use crate::{ActionType, NftVoterError, NftVoterResult};
use solana_sdk::{pubkey, pubkey::Pubkey};

/// spl-governance program deployed on mainnet and devnet
pub const DEFAULT_GOVERNANCE_PROGRAM_ID: Pubkey =
    pubkey!("GovER5Lthms3bLBqWub97yVrMmEogzX7xNjdXpPPCVZw");

/// Metaplex token metadata program
pub const TOKEN_METADATA_PROGRAM_ID: Pubkey =
    pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

fn derive(seeds: &[&[u8]], program_id: &Pubkey, what: &str) -> NftVoterResult<(Pubkey, u8)> {
    Pubkey::try_find_program_address(seeds, program_id).ok_or_else(|| {
        NftVoterError::AddressDerivation(format!("no viable bump for {} under {}", what, program_id))
    })
}

/// Find the registrar PDA configuring the plugin for a realm and governing mint
pub fn find_registrar_address(
    program_id: &Pubkey,
    realm: &Pubkey,
    governing_token_mint: &Pubkey,
) -> NftVoterResult<(Pubkey, u8)> {
    derive(
        &[b"registrar", realm.as_ref(), governing_token_mint.as_ref()],
        program_id,
        "registrar",
    )
}

/// Find the voter weight record PDA of a governing token owner
pub fn find_voter_weight_record_address(
    program_id: &Pubkey,
    realm: &Pubkey,
    governing_token_mint: &Pubkey,
    governing_token_owner: &Pubkey,
) -> NftVoterResult<(Pubkey, u8)> {
    derive(
        &[
            b"voter-weight-record",
            realm.as_ref(),
            governing_token_mint.as_ref(),
            governing_token_owner.as_ref(),
        ],
        program_id,
        "voter weight record",
    )
}

/// Find the spl-governance token owner record PDA
pub fn find_token_owner_record_address(
    governance_program_id: &Pubkey,
    realm: &Pubkey,
    governing_token_mint: &Pubkey,
    governing_token_owner: &Pubkey,
) -> NftVoterResult<(Pubkey, u8)> {
    derive(
        &[
            b"governance",
            realm.as_ref(),
            governing_token_mint.as_ref(),
            governing_token_owner.as_ref(),
        ],
        governance_program_id,
        "token owner record",
    )
}

/// Find the V2 NFT action ticket PDA for one NFT and action
pub fn find_nft_action_ticket_address(
    program_id: &Pubkey,
    action_type: ActionType,
    registrar: &Pubkey,
    owner: &Pubkey,
    nft_mint: &Pubkey,
) -> NftVoterResult<(Pubkey, u8)> {
    let prefix = format!("nft-{}-ticket", action_type.as_str());
    derive(
        &[
            prefix.as_bytes(),
            registrar.as_ref(),
            owner.as_ref(),
            nft_mint.as_ref(),
        ],
        program_id,
        "nft action ticket",
    )
}

/// Find the Metaplex metadata PDA of a mint
pub fn find_metadata_address(mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            b"metadata",
            TOKEN_METADATA_PROGRAM_ID.as_ref(),
            mint.as_ref(),
        ],
        &TOKEN_METADATA_PROGRAM_ID,
    )
}
