//! Program handle for the NFT voter plugin

use crate::{utils::instruction_discriminator, NftVoterResult};
use borsh::BorshSerialize;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};
use std::sync::Arc;

/// Cluster connection shared by the program handle and the RPC collaborators
#[derive(Clone)]
pub struct Provider {
    rpc: Arc<RpcClient>,
    das_url: String,
}

impl Provider {
    /// Connect to `rpc_url`; DAS queries go to the same endpoint
    pub fn new(rpc_url: &str, commitment: CommitmentConfig) -> Self {
        Self {
            rpc: Arc::new(RpcClient::new_with_commitment(rpc_url.to_string(), commitment)),
            das_url: rpc_url.to_string(),
        }
    }

    /// Send DAS asset queries to a dedicated endpoint
    pub fn with_das_url(mut self, das_url: impl Into<String>) -> Self {
        self.das_url = das_url.into();
        self
    }

    pub fn from_rpc(rpc: Arc<RpcClient>) -> Self {
        let das_url = rpc.url();
        Self { rpc, das_url }
    }

    pub fn rpc(&self) -> &Arc<RpcClient> {
        &self.rpc
    }

    pub fn das_url(&self) -> &str {
        &self.das_url
    }
}

/// Builds Anchor-encoded instructions against one plugin program id
#[derive(Clone)]
pub struct PluginProgram {
    program_id: Pubkey,
    provider: Provider,
}

impl PluginProgram {
    pub fn new(program_id: Pubkey, provider: Provider) -> Self {
        Self {
            program_id,
            provider,
        }
    }

    pub fn id(&self) -> Pubkey {
        self.program_id
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    /// Encode `method` with Borsh `args` as `sighash ++ args`
    pub fn instruction<A: BorshSerialize>(
        &self,
        method: &str,
        args: &A,
        accounts: Vec<AccountMeta>,
    ) -> NftVoterResult<Instruction> {
        let mut data = instruction_discriminator(method).to_vec();
        args.serialize(&mut data)?;
        Ok(Instruction {
            program_id: self.program_id,
            accounts,
            data,
        })
    }
}
