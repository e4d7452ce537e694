//! Voter weight update instructions for both NFT voter program versions
//!
//! V1 updates the voter weight record from the NFT accounts alone. V2 also
//! records one NFT action ticket per NFT after the governance action.

use crate::{
    utils::find_nft_action_ticket_address, ActionType, EligibleNft, InstructionBundle,
    NftVoterResult, PluginProgram, ProtocolVersion,
};
use solana_sdk::{instruction::AccountMeta, pubkey::Pubkey};
use solana_system_interface::program as system_program;
use tracing::{debug, info};

pub const UPDATE_VOTER_WEIGHT_RECORD: &str = "update_voter_weight_record";
pub const CREATE_NFT_ACTION_TICKET: &str = "create_nft_action_ticket";

/// Accounts shared by every voter weight update
#[derive(Debug, Clone, Copy)]
pub struct UpdateVoterWeightAccounts {
    pub voter: Pubkey,
    pub registrar: Pubkey,
    pub voter_weight_record: Pubkey,
}

/// Token account then metadata, per NFT, in discovery order
fn nft_remaining_accounts(nfts: &[EligibleNft]) -> Vec<AccountMeta> {
    nfts.iter()
        .flat_map(|nft| {
            [
                AccountMeta::new_readonly(nft.token_account, false),
                AccountMeta::new_readonly(nft.metadata, false),
            ]
        })
        .collect()
}

/// Build the bundle for `version`; an empty `nfts` yields a zero weight update
pub fn build_update_voter_weight_bundle(
    program: &PluginProgram,
    version: ProtocolVersion,
    accounts: &UpdateVoterWeightAccounts,
    nfts: &[EligibleNft],
    action_type: ActionType,
) -> NftVoterResult<InstructionBundle> {
    let bundle = match version {
        ProtocolVersion::V1 => {
            debug!(voter = %accounts.voter, "on nft voter v1");
            build_v1(program, accounts, nfts, action_type)?
        }
        ProtocolVersion::V2 => {
            debug!(voter = %accounts.voter, "on nft voter v2");
            build_v2(program, accounts, nfts, action_type)?
        }
    };

    info!(
        version = %version,
        action = %action_type,
        nfts = nfts.len(),
        pre = bundle.pre.len(),
        post = bundle.post.len(),
        "built voter weight bundle"
    );
    Ok(bundle)
}

fn build_v1(
    program: &PluginProgram,
    accounts: &UpdateVoterWeightAccounts,
    nfts: &[EligibleNft],
    action_type: ActionType,
) -> NftVoterResult<InstructionBundle> {
    let mut metas = vec![
        AccountMeta::new_readonly(accounts.registrar, false),
        AccountMeta::new(accounts.voter_weight_record, false),
    ];
    metas.extend(nft_remaining_accounts(nfts));

    let update = program.instruction(UPDATE_VOTER_WEIGHT_RECORD, &action_type, metas)?;
    Ok(InstructionBundle {
        version: ProtocolVersion::V1,
        pre: vec![update],
        post: vec![],
    })
}

fn build_v2(
    program: &PluginProgram,
    accounts: &UpdateVoterWeightAccounts,
    nfts: &[EligibleNft],
    action_type: ActionType,
) -> NftVoterResult<InstructionBundle> {
    let mut metas = vec![
        AccountMeta::new_readonly(accounts.registrar, false),
        AccountMeta::new(accounts.voter_weight_record, false),
        AccountMeta::new_readonly(accounts.voter, true),
    ];
    metas.extend(nft_remaining_accounts(nfts));
    let update = program.instruction(UPDATE_VOTER_WEIGHT_RECORD, &action_type, metas)?;

    let tickets = nfts
        .iter()
        .map(|nft| create_nft_action_ticket(program, accounts, nft, action_type))
        .collect::<NftVoterResult<Vec<_>>>()?;

    Ok(InstructionBundle {
        version: ProtocolVersion::V2,
        pre: vec![update],
        post: tickets,
    })
}

fn create_nft_action_ticket(
    program: &PluginProgram,
    accounts: &UpdateVoterWeightAccounts,
    nft: &EligibleNft,
    action_type: ActionType,
) -> NftVoterResult<solana_sdk::instruction::Instruction> {
    let (ticket, _) = find_nft_action_ticket_address(
        &program.id(),
        action_type,
        &accounts.registrar,
        &accounts.voter,
        &nft.mint,
    )?;

    program.instruction(
        CREATE_NFT_ACTION_TICKET,
        &action_type,
        vec![
            AccountMeta::new_readonly(accounts.registrar, false),
            AccountMeta::new_readonly(accounts.voter_weight_record, false),
            AccountMeta::new(accounts.voter, true),
            AccountMeta::new_readonly(nft.token_account, false),
            AccountMeta::new_readonly(nft.metadata, false),
            AccountMeta::new(ticket, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
    )
}
