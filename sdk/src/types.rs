//! Core types for the NFT voter weight plugin client
//!
//! Governance actions, their on-chain tags, discovered NFTs, the program
//! version switch and the instruction bundle handed back to callers.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};
use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

// ================================
// Governance actions
// ================================

/// Governance action the voter weight is being recorded for.
///
/// Mirrors spl-governance `VoterWeightAction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GovernanceAction {
    /// Cast vote for a proposal. Target: Proposal
    CastVote,
    /// Comment a proposal. Target: Proposal
    CommentProposal,
    /// Create Governance within a realm. Target: Realm
    CreateGovernance,
    /// Create a proposal for a governance. Target: Governance
    CreateProposal,
    /// Signs off a proposal for a governance. Target: Proposal
    SignOffProposal,
}

impl GovernanceAction {
    pub const ALL: [GovernanceAction; 5] = [
        GovernanceAction::CastVote,
        GovernanceAction::CommentProposal,
        GovernanceAction::CreateGovernance,
        GovernanceAction::CreateProposal,
        GovernanceAction::SignOffProposal,
    ];
}

/// Instruction-level action tag understood by the plugin program.
///
/// Borsh encodes as the variant index, which is the `voter_weight_action`
/// argument of `update_voter_weight_record` and `create_nft_action_ticket`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize)]
pub enum ActionType {
    CastVote,
    CommentProposal,
    CreateGovernance,
    CreateProposal,
    SignOffProposal,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::CastVote => "castVote",
            ActionType::CommentProposal => "commentProposal",
            ActionType::CreateGovernance => "createGovernance",
            ActionType::CreateProposal => "createProposal",
            ActionType::SignOffProposal => "signOffProposal",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a governance action to the tag the plugin instructions carry.
///
/// Exhaustive: a new action must be mapped here before it compiles.
pub fn map_action(action: GovernanceAction) -> ActionType {
    match action {
        GovernanceAction::CastVote => ActionType::CastVote,
        GovernanceAction::CommentProposal => ActionType::CommentProposal,
        GovernanceAction::CreateGovernance => ActionType::CreateGovernance,
        GovernanceAction::CreateProposal => ActionType::CreateProposal,
        GovernanceAction::SignOffProposal => ActionType::SignOffProposal,
    }
}

// ================================
// Eligible NFTs
// ================================

/// An NFT held by the voter that counts towards governance weight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibleNft {
    /// NFT mint (DAS asset id)
    pub mint: Pubkey,
    /// Verified collection the registrar weighs
    pub collection: Pubkey,
    /// Voter's token account holding the NFT
    pub token_account: Pubkey,
    /// Metaplex metadata account of the mint
    pub metadata: Pubkey,
}

impl EligibleNft {
    /// Build the record for `mint` held by `owner`, deriving its token and metadata accounts
    pub fn new(owner: &Pubkey, mint: Pubkey, collection: Pubkey) -> Self {
        Self {
            mint,
            collection,
            token_account: spl_associated_token_account::get_associated_token_address(
                owner, &mint,
            ),
            metadata: crate::utils::addresses::find_metadata_address(&mint).0,
        }
    }
}

// ================================
// Program version
// ================================

/// Which deployment of the NFT voter program instructions are built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProtocolVersion {
    #[default]
    V1,
    V2,
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolVersion::V1 => f.write_str("v1"),
            ProtocolVersion::V2 => f.write_str("v2"),
        }
    }
}

/// Source of the active program version.
///
/// The client calls `load` once per update and threads the snapshot through
/// the builder.
pub trait VersionFlag: Send + Sync {
    fn load(&self) -> ProtocolVersion;
}

impl VersionFlag for ProtocolVersion {
    fn load(&self) -> ProtocolVersion {
        *self
    }
}

/// Process-wide switch that can be flipped while clients hold it
#[derive(Debug, Clone, Default)]
pub struct SharedVersionFlag {
    v2: Arc<AtomicBool>,
}

impl SharedVersionFlag {
    pub fn new(version: ProtocolVersion) -> Self {
        Self {
            v2: Arc::new(AtomicBool::new(version == ProtocolVersion::V2)),
        }
    }

    pub fn set(&self, version: ProtocolVersion) {
        self.v2.store(version == ProtocolVersion::V2, Ordering::SeqCst);
    }
}

impl VersionFlag for SharedVersionFlag {
    fn load(&self) -> ProtocolVersion {
        if self.v2.load(Ordering::SeqCst) {
            ProtocolVersion::V2
        } else {
            ProtocolVersion::V1
        }
    }
}

// ================================
// Instruction bundle
// ================================

/// Instructions to place around the governance action instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionBundle {
    /// Version the bundle was shaped for
    pub version: ProtocolVersion,
    /// Must run strictly before the governance action
    pub pre: Vec<Instruction>,
    /// Must run strictly after the governance action
    pub post: Vec<Instruction>,
}

impl InstructionBundle {
    /// Lay out `pre`, the governance action instructions and `post` in transaction order
    pub fn wrap(self, action: Vec<Instruction>) -> Vec<Instruction> {
        let mut ordered = self.pre;
        ordered.extend(action);
        ordered.extend(self.post);
        ordered
    }

    pub fn len(&self) -> usize {
        self.pre.len() + self.post.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pre.is_empty() && self.post.is_empty()
    }
}
