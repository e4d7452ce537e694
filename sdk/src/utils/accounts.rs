//! On-chain account layouts read by the client
//!
//! Only the leading fields the client needs are decoded for spl-governance
//! accounts; trailing data is ignored.

use crate::{NftVoterError, NftVoterResult};
use anchor_lang::{error::ErrorCode, AccountDeserialize, Discriminator};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::pubkey::Pubkey;

/// spl-governance `GovernanceAccountType` values accepted as realms
const REALM_ACCOUNT_TYPES: [u8; 2] = [1, 16];

/// spl-governance `GovernanceAccountType` values accepted as token owner records
const TOKEN_OWNER_RECORD_ACCOUNT_TYPES: [u8; 2] = [2, 17];

/// Weight configuration of one NFT collection
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CollectionConfig {
    /// Verified collection mint
    pub collection: Pubkey,
    /// Number of NFTs in the collection
    pub size: u32,
    /// Vote weight of every NFT in the collection
    pub weight: u64,
    pub reserved: [u8; 8],
}

/// NFT voter registrar for a realm and governing token mint
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Registrar {
    pub governance_program_id: Pubkey,
    pub realm: Pubkey,
    pub governing_token_mint: Pubkey,
    pub collection_configs: Vec<CollectionConfig>,
    pub reserved: [u8; 128],
}

impl Discriminator for Registrar {
    // sha256("account:Registrar")[..8]
    const DISCRIMINATOR: &'static [u8] = &[193, 202, 205, 51, 78, 168, 150, 128];
}

impl AccountDeserialize for Registrar {
    fn try_deserialize(buf: &mut &[u8]) -> anchor_lang::Result<Self> {
        if !buf.starts_with(Self::DISCRIMINATOR) {
            return Err(ErrorCode::AccountDiscriminatorMismatch.into());
        }
        Self::try_deserialize_unchecked(buf)
    }

    fn try_deserialize_unchecked(buf: &mut &[u8]) -> anchor_lang::Result<Self> {
        let mut body = buf.get(Self::DISCRIMINATOR.len()..).unwrap_or_default();
        BorshDeserialize::deserialize(&mut body)
            .map_err(|_| ErrorCode::AccountDidNotDeserialize.into())
    }
}

impl Registrar {
    /// Decode raw account data, checking the Anchor discriminator
    pub fn try_from_account_data(data: &[u8]) -> NftVoterResult<Self> {
        let mut buf = data;
        Ok(Registrar::try_deserialize(&mut buf)?)
    }

    pub fn collection_config(&self, collection: &Pubkey) -> Option<&CollectionConfig> {
        self.collection_configs
            .iter()
            .find(|config| config.collection == *collection)
    }

    /// Weight an NFT of `collection` contributes, zero if the collection is not configured
    pub fn collection_weight(&self, collection: &Pubkey) -> u64 {
        self.collection_config(collection)
            .map_or(0, |config| config.weight)
    }
}

/// Leading fields of an spl-governance realm
#[derive(Debug, Clone, PartialEq, Eq, BorshDeserialize)]
pub struct RealmHeader {
    pub account_type: u8,
    pub community_mint: Pubkey,
}

impl RealmHeader {
    pub fn try_from_account_data(data: &[u8]) -> NftVoterResult<Self> {
        let mut body = data;
        let header = RealmHeader::deserialize(&mut body)
            .map_err(|e| NftVoterError::invalid_account_data(format!("realm: {}", e)))?;
        if !REALM_ACCOUNT_TYPES.contains(&header.account_type) {
            return Err(NftVoterError::invalid_account_data(format!(
                "unexpected realm account type {}",
                header.account_type
            )));
        }
        Ok(header)
    }
}

/// Leading fields of an spl-governance token owner record
#[derive(Debug, Clone, PartialEq, Eq, BorshDeserialize)]
pub struct TokenOwnerRecordHeader {
    pub account_type: u8,
    pub realm: Pubkey,
    pub governing_token_mint: Pubkey,
    pub governing_token_owner: Pubkey,
    pub governing_token_deposit_amount: u64,
}

impl TokenOwnerRecordHeader {
    pub fn try_from_account_data(data: &[u8]) -> NftVoterResult<Self> {
        let mut body = data;
        let header = TokenOwnerRecordHeader::deserialize(&mut body).map_err(|e| {
            NftVoterError::invalid_account_data(format!("token owner record: {}", e))
        })?;
        if !TOKEN_OWNER_RECORD_ACCOUNT_TYPES.contains(&header.account_type) {
            return Err(NftVoterError::invalid_account_data(format!(
                "unexpected token owner record account type {}",
                header.account_type
            )));
        }
        Ok(header)
    }
}
