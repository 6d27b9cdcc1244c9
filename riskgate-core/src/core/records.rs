// riskgate-core/src/core/records.rs
// ============================================================================
// Module: riskgate Persistence Records
// Description: Proposal, commit, nonce, and baseline row types.
// Purpose: Define the canonical shapes persisted through the proposal store.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! These are the rows the store contract persists. A proposal is written once
//! and its decision is final; commit records are append-only with exactly one
//! row per commit attempt; a nonce row's existence means the token it belongs
//! to has been consumed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::CommitId;
use crate::core::identifiers::NonceValue;
use crate::core::identifiers::ProposalId;
use crate::core::identifiers::TokenId;
use crate::core::identifiers::ToolName;
use crate::core::policy::Decision;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Proposal
// ============================================================================

/// Recorded decision about whether a tool invocation may proceed.
///
/// # Invariants
/// - `proposal_id` is unique and immutable.
/// - `decision` is final once persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    /// Proposal identifier.
    pub proposal_id: ProposalId,
    /// Tool the proposal gates.
    pub tool_name: ToolName,
    /// Canonical JSON of the proposed arguments.
    pub args_json: String,
    /// Exact prompt hash.
    pub prompt_hash: String,
    /// Composite risk score; absent when no signals were observable.
    pub composite_score: Option<f64>,
    /// Final policy decision.
    pub decision: Decision,
    /// Creation time.
    pub created_at: Timestamp,
}

// ============================================================================
// SECTION: Commit Record
// ============================================================================

/// Outcome label for a commit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitDecision {
    /// The commit was authorized.
    Committed,
    /// The commit was rejected.
    Rejected,
}

impl CommitDecision {
    /// Returns the stable persisted label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Committed => "committed",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a persisted label.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "committed" => Some(Self::Committed),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Audit row written for every commit attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Commit attempt identifier.
    pub commit_id: CommitId,
    /// Proposal the attempt targeted.
    pub proposal_id: ProposalId,
    /// Token presented with the attempt, when any.
    pub token_id: Option<TokenId>,
    /// Outcome of the attempt.
    pub decision: CommitDecision,
    /// Stable verification reason label.
    pub verification_reason: String,
    /// Attempt time.
    pub created_at: Timestamp,
}

// ============================================================================
// SECTION: Nonce
// ============================================================================

/// Consumed-nonce row; presence means the token has been used.
///
/// # Invariants
/// - Nonce uniqueness is the sole replay defence; insertion is atomic with
///   respect to concurrent verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceRecord {
    /// Nonce value; primary key.
    pub nonce: NonceValue,
    /// Token the nonce belongs to.
    pub token_id: TokenId,
    /// Expiry after which the row may be purged.
    pub expires_at: Timestamp,
}

// ============================================================================
// SECTION: Prompt Baseline
// ============================================================================

/// Administratively maintained baseline for prompt drift detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptBaseline {
    /// Tool the baseline applies to.
    pub tool_name: ToolName,
    /// Normalized prompt hash recorded as the baseline.
    pub prompt_hash: String,
}
