//! Governance power lookup keyed by token owner record

use crate::{
    discovery::{fetch_account_data, load_registrar},
    utils::{Registrar, TokenOwnerRecordHeader},
    EligibleNft, NftDiscovery, NftVoterError, NftVoterResult, Provider,
};
use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::debug;

/// Reports the governance power behind a token owner record.
///
/// `Ok(None)` means the record does not exist yet, which is not the same as zero power.
#[async_trait]
pub trait GovernancePower: Send + Sync {
    async fn query_governance_power(
        &self,
        realm: &Pubkey,
        token_owner_record: &Pubkey,
    ) -> NftVoterResult<Option<u64>>;
}

/// Sum of the registrar weights of every eligible NFT
pub fn nft_voter_weight(registrar: &Registrar, nfts: &[EligibleNft]) -> NftVoterResult<u64> {
    nfts.iter()
        .map(|nft| registrar.collection_weight(&nft.collection))
        .try_fold(0u64, u64::checked_add)
        .ok_or_else(|| NftVoterError::invalid_account_data("voter weight overflows u64"))
}

/// Computes power the way the plugin program does: registrar weights over held NFTs
pub struct RegistrarGovernancePower {
    provider: Provider,
    plugin_id: Pubkey,
    discovery: Arc<dyn NftDiscovery>,
}

impl RegistrarGovernancePower {
    pub fn new(provider: Provider, plugin_id: Pubkey, discovery: Arc<dyn NftDiscovery>) -> Self {
        Self {
            provider,
            plugin_id,
            discovery,
        }
    }
}

#[async_trait]
impl GovernancePower for RegistrarGovernancePower {
    async fn query_governance_power(
        &self,
        realm: &Pubkey,
        token_owner_record: &Pubkey,
    ) -> NftVoterResult<Option<u64>> {
        let rpc = self.provider.rpc();
        let Some(data) = fetch_account_data(rpc, token_owner_record).await? else {
            debug!(%token_owner_record, "token owner record not initialized");
            return Ok(None);
        };
        let record = TokenOwnerRecordHeader::try_from_account_data(&data)?;

        let registrar =
            load_registrar(rpc, &self.plugin_id, realm, &record.governing_token_mint).await?;
        // Filter and weigh against the registrar of the record's own mint
        let nfts = self
            .discovery
            .discover_for_registrar(&registrar, &record.governing_token_owner)
            .await?;

        nft_voter_weight(&registrar, &nfts).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::CollectionConfig;

    fn config(collection: Pubkey, weight: u64) -> CollectionConfig {
        CollectionConfig {
            collection,
            size: 10,
            weight,
            reserved: [0; 8],
        }
    }

    fn registrar(configs: Vec<CollectionConfig>) -> Registrar {
        Registrar {
            governance_program_id: Pubkey::new_unique(),
            realm: Pubkey::new_unique(),
            governing_token_mint: Pubkey::new_unique(),
            collection_configs: configs,
            reserved: [0; 128],
        }
    }

    #[test]
    fn test_weight_sums_collection_weights() {
        let owner = Pubkey::new_unique();
        let apes = Pubkey::new_unique();
        let punks = Pubkey::new_unique();
        let registrar = registrar(vec![config(apes, 2), config(punks, 5)]);

        let nfts = vec![
            EligibleNft::new(&owner, Pubkey::new_unique(), apes),
            EligibleNft::new(&owner, Pubkey::new_unique(), apes),
            EligibleNft::new(&owner, Pubkey::new_unique(), punks),
        ];
        assert_eq!(nft_voter_weight(&registrar, &nfts).unwrap(), 9);
        assert_eq!(nft_voter_weight(&registrar, &[]).unwrap(), 0);
    }

    #[test]
    fn test_weight_overflow_is_an_error() {
        let owner = Pubkey::new_unique();
        let whales = Pubkey::new_unique();
        let registrar = registrar(vec![config(whales, u64::MAX)]);

        let nfts = vec![
            EligibleNft::new(&owner, Pubkey::new_unique(), whales),
            EligibleNft::new(&owner, Pubkey::new_unique(), whales),
        ];
        assert!(nft_voter_weight(&registrar, &nfts).is_err());
    }
}
