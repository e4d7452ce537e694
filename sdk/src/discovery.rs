//! Eligible NFT discovery
//!
//! The default implementation lists the voter's assets through the DAS
//! `getAssetsByOwner` method and keeps those whose verified collection is
//! configured in the realm's registrar.

use crate::{
    utils::{find_registrar_address, string_to_pubkey, RealmHeader, Registrar},
    EligibleNft, NftVoterError, NftVoterResult, Provider,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, warn};

/// Maximum page size accepted by DAS providers
pub const DEFAULT_DAS_PAGE_LIMIT: u32 = 1000;

/// Lists the NFTs a voter holds that count towards governance weight
#[async_trait]
pub trait NftDiscovery: Send + Sync {
    /// Eligible NFTs under the registrar of the realm's community mint
    async fn discover_eligible_nfts(
        &self,
        realm: &Pubkey,
        voter: &Pubkey,
    ) -> NftVoterResult<Vec<EligibleNft>>;

    /// Eligible NFTs under an already loaded registrar
    async fn discover_for_registrar(
        &self,
        registrar: &Registrar,
        voter: &Pubkey,
    ) -> NftVoterResult<Vec<EligibleNft>>;
}

/// Fetch raw account data, `None` when the account does not exist
pub async fn fetch_account_data(rpc: &RpcClient, address: &Pubkey) -> NftVoterResult<Option<Vec<u8>>> {
    let response = rpc
        .get_account_with_commitment(address, rpc.commitment())
        .await?;
    Ok(response.value.map(|account| account.data))
}

/// Load the registrar of `realm` and `governing_token_mint`
pub async fn load_registrar(
    rpc: &RpcClient,
    plugin_id: &Pubkey,
    realm: &Pubkey,
    governing_token_mint: &Pubkey,
) -> NftVoterResult<Registrar> {
    let (registrar, _) = find_registrar_address(plugin_id, realm, governing_token_mint)?;
    let data = fetch_account_data(rpc, &registrar)
        .await?
        .ok_or_else(|| NftVoterError::AccountNotFound(format!("registrar {}", registrar)))?;
    Registrar::try_from_account_data(&data)
}

// ================================
// DAS wire types
// ================================

#[derive(Debug, Serialize)]
struct DasRequest<'a, P> {
    jsonrpc: &'a str,
    id: &'a str,
    method: &'a str,
    params: P,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GetAssetsByOwnerParams {
    owner_address: String,
    page: u32,
    limit: u32,
}

#[derive(Debug, Deserialize)]
struct DasResponse<T> {
    result: Option<T>,
    error: Option<DasRpcError>,
}

#[derive(Debug, Deserialize)]
struct DasRpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct AssetPage {
    #[serde(default)]
    items: Vec<DasAsset>,
}

/// Subset of a DAS asset the discovery filter reads
#[derive(Debug, Clone, Deserialize)]
pub struct DasAsset {
    pub id: String,
    #[serde(default)]
    pub grouping: Vec<AssetGrouping>,
    #[serde(default)]
    pub compression: Option<AssetCompression>,
    #[serde(default)]
    pub burnt: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetGrouping {
    pub group_key: String,
    pub group_value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetCompression {
    #[serde(default)]
    pub compressed: bool,
}

impl DasAsset {
    fn collection(&self) -> Option<&str> {
        self.grouping
            .iter()
            .find(|group| group.group_key == "collection")
            .and_then(|group| group.group_value.as_deref())
    }

    fn is_compressed(&self) -> bool {
        self.compression.as_ref().is_some_and(|c| c.compressed)
    }
}

/// Keep the assets of `owner` whose collection the registrar weighs, in DAS order
pub fn eligible_from_assets(
    owner: &Pubkey,
    assets: &[DasAsset],
    registrar: &Registrar,
) -> Vec<EligibleNft> {
    assets
        .iter()
        .filter_map(|asset| {
            if asset.burnt {
                return None;
            }
            let collection = asset.collection()?;
            let collection = match string_to_pubkey(collection) {
                Ok(key) => key,
                Err(e) => {
                    warn!(asset = %asset.id, error = %e, "skipping asset with malformed collection");
                    return None;
                }
            };
            registrar.collection_config(&collection)?;

            if asset.is_compressed() {
                warn!(asset = %asset.id, "skipping compressed asset from a configured collection");
                return None;
            }
            match string_to_pubkey(&asset.id) {
                Ok(mint) => Some(EligibleNft::new(owner, mint, collection)),
                Err(e) => {
                    warn!(asset = %asset.id, error = %e, "skipping asset with malformed id");
                    None
                }
            }
        })
        .collect()
}

/// DAS-backed discovery scoped to one plugin deployment
#[derive(Clone)]
pub struct DasNftDiscovery {
    provider: Provider,
    plugin_id: Pubkey,
    http: reqwest::Client,
    page_limit: u32,
}

impl DasNftDiscovery {
    pub fn new(provider: Provider, plugin_id: Pubkey) -> Self {
        Self {
            provider,
            plugin_id,
            http: reqwest::Client::new(),
            page_limit: DEFAULT_DAS_PAGE_LIMIT,
        }
    }

    pub fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit.clamp(1, DEFAULT_DAS_PAGE_LIMIT);
        self
    }

    async fn assets_by_owner(&self, owner: &Pubkey) -> NftVoterResult<Vec<DasAsset>> {
        let mut assets = Vec::new();
        let mut page = 1;
        loop {
            let request = DasRequest {
                jsonrpc: "2.0",
                id: "nft-voter-sdk",
                method: "getAssetsByOwner",
                params: GetAssetsByOwnerParams {
                    owner_address: owner.to_string(),
                    page,
                    limit: self.page_limit,
                },
            };
            let response: DasResponse<AssetPage> = self
                .http
                .post(self.provider.das_url())
                .json(&request)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            if let Some(error) = response.error {
                return Err(NftVoterError::das(format!("{} ({})", error.message, error.code)));
            }
            let items = response
                .result
                .ok_or_else(|| NftVoterError::das("response carries neither result nor error"))?
                .items;

            // Providers may cap pages below the requested limit
            if items.is_empty() {
                break;
            }
            assets.extend(items);
            page += 1;
        }
        Ok(assets)
    }
}

#[async_trait]
impl NftDiscovery for DasNftDiscovery {
    async fn discover_eligible_nfts(
        &self,
        realm: &Pubkey,
        voter: &Pubkey,
    ) -> NftVoterResult<Vec<EligibleNft>> {
        let rpc = self.provider.rpc();
        let realm_data = fetch_account_data(rpc, realm)
            .await?
            .ok_or_else(|| NftVoterError::AccountNotFound(format!("realm {}", realm)))?;
        let realm_header = RealmHeader::try_from_account_data(&realm_data)?;

        let registrar =
            load_registrar(rpc, &self.plugin_id, realm, &realm_header.community_mint).await?;
        self.discover_for_registrar(&registrar, voter).await
    }

    async fn discover_for_registrar(
        &self,
        registrar: &Registrar,
        voter: &Pubkey,
    ) -> NftVoterResult<Vec<EligibleNft>> {
        let assets = self.assets_by_owner(voter).await?;
        let eligible = eligible_from_assets(voter, &assets, registrar);

        debug!(
            realm = %registrar.realm,
            mint = %registrar.governing_token_mint,
            %voter,
            assets = assets.len(),
            eligible = eligible.len(),
            "discovered voting nfts"
        );
        Ok(eligible)
    }
}
