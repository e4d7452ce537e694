//! Voter weight plugin client for the NFT voter program
//!
//! Every operation is a single request/response; the client keeps no state
//! between calls beyond its collaborators.

use crate::{
    config::ClientConfig,
    instructions::{build_update_voter_weight_bundle, UpdateVoterWeightAccounts},
    map_action,
    utils::{
        find_registrar_address, find_token_owner_record_address,
        find_voter_weight_record_address, DEFAULT_GOVERNANCE_PROGRAM_ID,
    },
    DasNftDiscovery, GovernanceAction, GovernancePower, InstructionBundle, NftDiscovery,
    NftVoterResult, PluginProgram, ProtocolVersion, Provider, RegistrarGovernancePower,
    VersionFlag,
};
use async_trait::async_trait;
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};
use std::sync::Arc;
use tracing::debug;

/// Lifecycle shared by governance voter weight plugins.
///
/// `None` from the record operations means the plugin needs no instruction,
/// which is distinct from a failure to build one.
#[async_trait]
pub trait VoterWeightPlugin: Send + Sync {
    /// Whether the plugin consumes the weight of a preceding plugin
    fn requires_input_voter_weight(&self) -> bool;

    async fn create_voter_weight_record(&self) -> Option<Instruction>;

    async fn create_max_voter_weight_record(&self) -> Option<Instruction>;

    async fn update_voter_weight_record(
        &self,
        voter: &Pubkey,
        realm: &Pubkey,
        mint: &Pubkey,
        action: GovernanceAction,
    ) -> NftVoterResult<InstructionBundle>;

    async fn update_max_voter_weight_record(&self) -> Option<Instruction>;

    async fn calculate_voter_weight(
        &self,
        voter: &Pubkey,
        realm: &Pubkey,
        mint: &Pubkey,
    ) -> NftVoterResult<Option<u64>>;
}

/// Client for the NFT voter weight plugin
pub struct NftVoterWeightPluginClient {
    program: PluginProgram,
    devnet: bool,
    governance_program_id: Pubkey,
    discovery: Arc<dyn NftDiscovery>,
    governance_power: Arc<dyn GovernancePower>,
    version: Arc<dyn VersionFlag>,
}

impl NftVoterWeightPluginClient {
    /// Assemble a client from explicit collaborators
    pub fn new(
        program: PluginProgram,
        devnet: bool,
        discovery: Arc<dyn NftDiscovery>,
        governance_power: Arc<dyn GovernancePower>,
        version: Arc<dyn VersionFlag>,
    ) -> Self {
        Self {
            program,
            devnet,
            governance_program_id: DEFAULT_GOVERNANCE_PROGRAM_ID,
            discovery,
            governance_power,
            version,
        }
    }

    /// Connect to the plugin deployed at `plugin_id` with the RPC-backed collaborators.
    ///
    /// Instructions target the V1 program unless a different flag is supplied
    /// through [`NftVoterWeightPluginClient::with_version_flag`].
    pub fn connect(provider: Provider, plugin_id: Pubkey, devnet: bool) -> Self {
        let program = PluginProgram::new(plugin_id, provider.clone());
        let discovery: Arc<dyn NftDiscovery> =
            Arc::new(DasNftDiscovery::new(provider.clone(), plugin_id));
        let governance_power = Arc::new(RegistrarGovernancePower::new(
            provider,
            plugin_id,
            discovery.clone(),
        ));

        Self::new(
            program,
            devnet,
            discovery,
            governance_power,
            Arc::new(ProtocolVersion::V1),
        )
    }

    /// Connect using a loaded configuration
    pub fn from_config(config: &ClientConfig) -> NftVoterResult<Self> {
        let provider = config.provider()?;
        let plugin_id = config.plugin_program_id()?;
        let discovery: Arc<dyn NftDiscovery> = Arc::new(
            DasNftDiscovery::new(provider.clone(), plugin_id)
                .with_page_limit(config.das_page_limit),
        );
        let governance_power = Arc::new(RegistrarGovernancePower::new(
            provider.clone(),
            plugin_id,
            discovery.clone(),
        ));

        Ok(Self::new(
            PluginProgram::new(plugin_id, provider),
            config.devnet,
            discovery,
            governance_power,
            Arc::new(config.protocol_version()),
        )
        .with_governance_program_id(config.governance_program_id()?))
    }

    pub fn with_version_flag(mut self, version: Arc<dyn VersionFlag>) -> Self {
        self.version = version;
        self
    }

    pub fn with_governance_program_id(mut self, governance_program_id: Pubkey) -> Self {
        self.governance_program_id = governance_program_id;
        self
    }

    pub fn program(&self) -> &PluginProgram {
        &self.program
    }

    pub fn is_devnet(&self) -> bool {
        self.devnet
    }

    pub fn governance_program_id(&self) -> Pubkey {
        self.governance_program_id
    }

    /// Get the registrar PDA for a realm and governing mint
    pub fn get_registrar_pda(&self, realm: &Pubkey, mint: &Pubkey) -> NftVoterResult<Pubkey> {
        Ok(find_registrar_address(&self.program.id(), realm, mint)?.0)
    }

    /// Get the voter weight record PDA of `voter`
    pub fn get_voter_weight_record_pda(
        &self,
        realm: &Pubkey,
        mint: &Pubkey,
        voter: &Pubkey,
    ) -> NftVoterResult<Pubkey> {
        Ok(find_voter_weight_record_address(&self.program.id(), realm, mint, voter)?.0)
    }

    /// Get the spl-governance token owner record of `voter`
    pub fn get_token_owner_record_pda(
        &self,
        realm: &Pubkey,
        mint: &Pubkey,
        voter: &Pubkey,
    ) -> NftVoterResult<Pubkey> {
        Ok(find_token_owner_record_address(&self.governance_program_id, realm, mint, voter)?.0)
    }
}

#[async_trait]
impl VoterWeightPlugin for NftVoterWeightPluginClient {
    fn requires_input_voter_weight(&self) -> bool {
        false
    }

    // TODO: confirm the plugin never needs an explicit create; the update path covers it today
    async fn create_voter_weight_record(&self) -> Option<Instruction> {
        None
    }

    async fn create_max_voter_weight_record(&self) -> Option<Instruction> {
        None
    }

    async fn update_voter_weight_record(
        &self,
        voter: &Pubkey,
        realm: &Pubkey,
        mint: &Pubkey,
        action: GovernanceAction,
    ) -> NftVoterResult<InstructionBundle> {
        let accounts = UpdateVoterWeightAccounts {
            voter: *voter,
            registrar: self.get_registrar_pda(realm, mint)?,
            voter_weight_record: self.get_voter_weight_record_pda(realm, mint, voter)?,
        };
        let nfts = self.discovery.discover_eligible_nfts(realm, voter).await?;
        let action_type = map_action(action);

        // Single snapshot so one bundle never mixes versions
        let version = self.version.load();
        debug!(%voter, %realm, ?action, %version, "updating voter weight record");

        build_update_voter_weight_bundle(&self.program, version, &accounts, &nfts, action_type)
    }

    async fn update_max_voter_weight_record(&self) -> Option<Instruction> {
        None
    }

    async fn calculate_voter_weight(
        &self,
        voter: &Pubkey,
        realm: &Pubkey,
        mint: &Pubkey,
    ) -> NftVoterResult<Option<u64>> {
        let token_owner_record = self.get_token_owner_record_pda(realm, mint, voter)?;
        self.governance_power
            .query_governance_power(realm, &token_owner_record)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::commitment_config::CommitmentConfig;

    fn connected() -> NftVoterWeightPluginClient {
        let provider = Provider::new("http://127.0.0.1:8899", CommitmentConfig::confirmed());
        NftVoterWeightPluginClient::connect(provider, Pubkey::new_unique(), true)
    }

    #[tokio::test]
    async fn test_lifecycle_no_ops() {
        let client = connected();

        assert!(client.create_voter_weight_record().await.is_none());
        assert!(client.create_max_voter_weight_record().await.is_none());
        assert!(client.update_max_voter_weight_record().await.is_none());
        assert!(!client.requires_input_voter_weight());
    }

    #[test]
    fn test_connect_binds_plugin_id() {
        let plugin_id = Pubkey::new_unique();
        let provider = Provider::new("http://127.0.0.1:8899", CommitmentConfig::confirmed());
        let client = NftVoterWeightPluginClient::connect(provider, plugin_id, false);

        assert_eq!(client.program().id(), plugin_id);
        assert!(!client.is_devnet());
        assert_eq!(client.governance_program_id(), DEFAULT_GOVERNANCE_PROGRAM_ID);
    }

    #[test]
    fn test_pda_helpers() {
        let client = connected();
        let realm = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let voter = Pubkey::new_unique();

        assert_eq!(
            client.get_registrar_pda(&realm, &mint).unwrap(),
            find_registrar_address(&client.program().id(), &realm, &mint)
                .unwrap()
                .0
        );
        assert_eq!(
            client.get_token_owner_record_pda(&realm, &mint, &voter).unwrap(),
            find_token_owner_record_address(&DEFAULT_GOVERNANCE_PROGRAM_ID, &realm, &mint, &voter)
                .unwrap()
                .0
        );
        assert_ne!(
            client.get_voter_weight_record_pda(&realm, &mint, &voter).unwrap(),
            client.get_token_owner_record_pda(&realm, &mint, &voter).unwrap()
        );
    }

    #[test]
    fn test_from_config() {
        let plugin_id = Pubkey::new_unique();
        let config = ClientConfig::from_toml(&format!(
            "rpc_url = \"http://127.0.0.1:8899\"\nplugin_program_id = \"{}\"\ndevnet = true\n",
            plugin_id
        ))
        .unwrap();

        let client = NftVoterWeightPluginClient::from_config(&config).unwrap();
        assert_eq!(client.program().id(), plugin_id);
        assert!(client.is_devnet());
    }
}
