//! End-to-end behavior of the plugin client with mocked collaborators

use async_trait::async_trait;
use mockall::{mock, predicate::eq};
use nft_voter_sdk::{
    instructions::{CREATE_NFT_ACTION_TICKET, UPDATE_VOTER_WEIGHT_RECORD},
    utils::{
        find_registrar_address, find_token_owner_record_address,
        find_voter_weight_record_address, instruction_discriminator, Registrar,
        DEFAULT_GOVERNANCE_PROGRAM_ID,
    },
    CommitmentConfig, EligibleNft, Instruction, GovernanceAction, GovernancePower, NftDiscovery,
    NftVoterError, NftVoterResult, NftVoterWeightPluginClient, PluginProgram, ProtocolVersion,
    Provider, Pubkey, SharedVersionFlag, VersionFlag, VoterWeightPlugin,
};
use std::sync::Arc;

mock! {
    pub Discovery {}

    #[async_trait]
    impl NftDiscovery for Discovery {
        async fn discover_eligible_nfts(
            &self,
            realm: &Pubkey,
            voter: &Pubkey,
        ) -> NftVoterResult<Vec<EligibleNft>>;

        async fn discover_for_registrar(
            &self,
            registrar: &Registrar,
            voter: &Pubkey,
        ) -> NftVoterResult<Vec<EligibleNft>>;
    }
}

mock! {
    pub Power {}

    #[async_trait]
    impl GovernancePower for Power {
        async fn query_governance_power(
            &self,
            realm: &Pubkey,
            token_owner_record: &Pubkey,
        ) -> NftVoterResult<Option<u64>>;
    }
}

struct Fixture {
    plugin_id: Pubkey,
    realm: Pubkey,
    mint: Pubkey,
    voter: Pubkey,
}

impl Fixture {
    fn new() -> Self {
        Self {
            plugin_id: Pubkey::new_unique(),
            realm: Pubkey::new_unique(),
            mint: Pubkey::new_unique(),
            voter: Pubkey::new_unique(),
        }
    }

    fn nfts(&self, count: usize) -> Vec<EligibleNft> {
        let collection = Pubkey::new_unique();
        (0..count)
            .map(|_| EligibleNft::new(&self.voter, Pubkey::new_unique(), collection))
            .collect()
    }

    fn discovery_returning(&self, nfts: Vec<EligibleNft>) -> MockDiscovery {
        let mut discovery = MockDiscovery::new();
        discovery
            .expect_discover_eligible_nfts()
            .with(eq(self.realm), eq(self.voter))
            .times(1)
            .returning(move |_, _| Ok(nfts.clone()));
        discovery
    }

    fn client(
        &self,
        discovery: MockDiscovery,
        power: MockPower,
        version: Arc<dyn VersionFlag>,
    ) -> NftVoterWeightPluginClient {
        let provider = Provider::new("http://127.0.0.1:8899", CommitmentConfig::confirmed());
        NftVoterWeightPluginClient::new(
            PluginProgram::new(self.plugin_id, provider),
            false,
            Arc::new(discovery),
            Arc::new(power),
            version,
        )
    }
}

#[tokio::test]
async fn test_v1_cast_vote_with_three_nfts() {
    let fx = Fixture::new();
    let nfts = fx.nfts(3);
    let client = fx.client(
        fx.discovery_returning(nfts.clone()),
        MockPower::new(),
        Arc::new(ProtocolVersion::V1),
    );

    let bundle = client
        .update_voter_weight_record(&fx.voter, &fx.realm, &fx.mint, GovernanceAction::CastVote)
        .await
        .unwrap();

    assert_eq!(bundle.version, ProtocolVersion::V1);
    assert_eq!(bundle.pre.len(), 1);
    assert!(bundle.post.is_empty());

    let update = &bundle.pre[0];
    assert_eq!(update.program_id, fx.plugin_id);
    assert_eq!(&update.data[..8], &instruction_discriminator(UPDATE_VOTER_WEIGHT_RECORD));
    // castVote
    assert_eq!(update.data[8], 0);

    let registrar = find_registrar_address(&fx.plugin_id, &fx.realm, &fx.mint).unwrap().0;
    let record = find_voter_weight_record_address(&fx.plugin_id, &fx.realm, &fx.mint, &fx.voter)
        .unwrap()
        .0;
    assert_eq!(update.accounts[0].pubkey, registrar);
    assert_eq!(update.accounts[1].pubkey, record);
    assert_eq!(update.accounts.len(), 2 + 2 * nfts.len());
}

#[tokio::test]
async fn test_v2_cast_vote_with_three_nfts() {
    let fx = Fixture::new();
    let client = fx.client(
        fx.discovery_returning(fx.nfts(3)),
        MockPower::new(),
        Arc::new(ProtocolVersion::V2),
    );

    let bundle = client
        .update_voter_weight_record(&fx.voter, &fx.realm, &fx.mint, GovernanceAction::CastVote)
        .await
        .unwrap();

    assert_eq!(bundle.version, ProtocolVersion::V2);
    assert_eq!(bundle.pre.len(), 1);
    assert_eq!(bundle.post.len(), 3);
    assert_eq!(&bundle.pre[0].data[..8], &instruction_discriminator(UPDATE_VOTER_WEIGHT_RECORD));
    for ticket in &bundle.post {
        assert_eq!(&ticket.data[..8], &instruction_discriminator(CREATE_NFT_ACTION_TICKET));
    }

    // Tickets land after the governance action
    let action = Instruction::new_with_bytes(
        DEFAULT_GOVERNANCE_PROGRAM_ID,
        &[13],
        vec![],
    );
    let ordered = bundle.wrap(vec![action.clone()]);
    assert_eq!(ordered.len(), 5);
    assert_eq!(ordered[1], action);
}

#[tokio::test]
async fn test_comment_without_nfts_in_both_versions() {
    for version in [ProtocolVersion::V1, ProtocolVersion::V2] {
        let fx = Fixture::new();
        let client = fx.client(fx.discovery_returning(vec![]), MockPower::new(), Arc::new(version));

        let bundle = client
            .update_voter_weight_record(
                &fx.voter,
                &fx.realm,
                &fx.mint,
                GovernanceAction::CommentProposal,
            )
            .await
            .unwrap();

        assert_eq!(bundle.version, version);
        assert_eq!(bundle.pre.len(), 1);
        assert!(bundle.post.is_empty());
        // commentProposal
        assert_eq!(bundle.pre[0].data[8], 1);
    }
}

#[tokio::test]
async fn test_discovery_failure_is_propagated() {
    let fx = Fixture::new();
    let mut discovery = MockDiscovery::new();
    discovery
        .expect_discover_eligible_nfts()
        .times(1)
        .returning(|_, _| Err(NftVoterError::das("upstream unavailable")));
    let client = fx.client(discovery, MockPower::new(), Arc::new(ProtocolVersion::V2));

    let err = client
        .update_voter_weight_record(&fx.voter, &fx.realm, &fx.mint, GovernanceAction::CastVote)
        .await
        .unwrap_err();

    assert_eq!(err.code(), 5000);
    assert!(err.to_string().contains("upstream unavailable"));
}

#[tokio::test]
async fn test_version_switch_between_calls_never_mixes_shapes() {
    let fx = Fixture::new();
    let nfts = fx.nfts(2);
    let mut discovery = MockDiscovery::new();
    discovery
        .expect_discover_eligible_nfts()
        .times(2)
        .returning(move |_, _| Ok(nfts.clone()));

    let flag = SharedVersionFlag::new(ProtocolVersion::V1);
    let client = fx.client(discovery, MockPower::new(), Arc::new(flag.clone()));

    let first = client
        .update_voter_weight_record(&fx.voter, &fx.realm, &fx.mint, GovernanceAction::CreateProposal)
        .await
        .unwrap();
    flag.set(ProtocolVersion::V2);
    let second = client
        .update_voter_weight_record(&fx.voter, &fx.realm, &fx.mint, GovernanceAction::CreateProposal)
        .await
        .unwrap();

    assert_eq!(first.version, ProtocolVersion::V1);
    assert!(first.post.is_empty());
    assert_eq!(second.version, ProtocolVersion::V2);
    assert_eq!(second.pre.len(), 1);
    assert_eq!(second.post.len(), 2);
}

async fn weight_of(client: &NftVoterWeightPluginClient, fx: &Fixture) -> Option<u64> {
    client
        .calculate_voter_weight(&fx.voter, &fx.realm, &fx.mint)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_calculate_voter_weight_absent_vs_zero() {
    let fx = Fixture::new();
    let tor = find_token_owner_record_address(
        &DEFAULT_GOVERNANCE_PROGRAM_ID,
        &fx.realm,
        &fx.mint,
        &fx.voter,
    )
    .unwrap()
    .0;

    let mut power = MockPower::new();
    let mut answers = vec![Some(7), Some(0), None];
    power
        .expect_query_governance_power()
        .with(eq(fx.realm), eq(tor))
        .times(3)
        .returning(move |_, _| Ok(answers.pop().flatten()));
    let client = fx.client(MockDiscovery::new(), power, Arc::new(ProtocolVersion::V1));

    assert_eq!(weight_of(&client, &fx).await, None);
    assert_eq!(weight_of(&client, &fx).await, Some(0));
    assert_eq!(weight_of(&client, &fx).await, Some(7));
}

#[tokio::test]
async fn test_calculate_voter_weight_propagates_errors() {
    let fx = Fixture::new();
    let mut power = MockPower::new();
    power
        .expect_query_governance_power()
        .returning(|_, _| Err(NftVoterError::invalid_account_data("token owner record")));
    let client = fx.client(MockDiscovery::new(), power, Arc::new(ProtocolVersion::V1));

    let err = client
        .calculate_voter_weight(&fx.voter, &fx.realm, &fx.mint)
        .await
        .unwrap_err();
    assert_eq!(err.code(), 3001);
}

#[tokio::test]
async fn test_concurrent_updates_for_different_voters() {
    let fx = Fixture::new();
    let other_voter = Pubkey::new_unique();
    let mut discovery = MockDiscovery::new();
    discovery
        .expect_discover_eligible_nfts()
        .times(2)
        .returning(move |_, voter| {
            let count = if *voter == other_voter { 1 } else { 4 };
            Ok((0..count)
                .map(|_| EligibleNft::new(voter, Pubkey::new_unique(), Pubkey::new_unique()))
                .collect())
        });
    let client = fx.client(discovery, MockPower::new(), Arc::new(ProtocolVersion::V2));

    let (mine, theirs) = tokio::join!(
        client.update_voter_weight_record(&fx.voter, &fx.realm, &fx.mint, GovernanceAction::CastVote),
        client.update_voter_weight_record(&other_voter, &fx.realm, &fx.mint, GovernanceAction::CastVote),
    );

    assert_eq!(mine.unwrap().post.len(), 4);
    assert_eq!(theirs.unwrap().post.len(), 1);
}
