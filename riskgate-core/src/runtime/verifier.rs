// riskgate-core/src/runtime/verifier.rs
// ============================================================================
// Module: riskgate Verifier
// Description: Commit-phase validation, nonce consumption, and audit trail.
// Purpose: Authorize the second phase without executing tool side effects.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! `commit` validates a commit request against the persisted proposal and the
//! presented token, then consumes the nonce atomically with the success
//! commit record. The nonce insert is the replay boundary: for any token,
//! exactly one commit can return committed; every later attempt observes the
//! existing nonce row and is rejected. Every attempt, successful or not,
//! leaves exactly one commit record.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::hashing::HashError;
use crate::core::hashing::canonical_args_hash;
use crate::core::identifiers::CommitId;
use crate::core::identifiers::ProposalId;
use crate::core::identifiers::TokenId;
use crate::core::identifiers::ToolName;
use crate::core::policy::Decision;
use crate::core::policy::PolicyEngine;
use crate::core::records::CommitDecision;
use crate::core::records::CommitRecord;
use crate::core::records::NonceRecord;
use crate::core::time::Timestamp;
use crate::interfaces::Deadline;
use crate::interfaces::NonceConsume;
use crate::interfaces::ProposalStore;
use crate::interfaces::SharedProposalStore;
use crate::interfaces::StoreError;
use crate::runtime::audit::DecisionEvent;
use crate::runtime::audit::DecisionSink;
use crate::runtime::registry::ToolProfileRegistry;
use crate::runtime::token::TokenCodec;
use crate::runtime::token::VerifyFailure;
use crate::runtime::token::token_fingerprint;

// ============================================================================
// SECTION: Request and Outcome
// ============================================================================

/// Second-phase request presenting a token (when required) and the arguments
/// about to be executed.
#[derive(Debug, Clone)]
pub struct CommitRequest {
    /// Proposal to commit.
    pub proposal_id: ProposalId,
    /// Execution token blob, when the proposal required one.
    pub commit_token: Option<String>,
    /// Arguments the caller is about to execute.
    pub args: Map<String, Value>,
}

/// Stable commit outcome reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitReason {
    /// The commit was authorized.
    Ok,
    /// No such proposal.
    UnknownProposal,
    /// The proposal's decision was not ALLOW.
    BlockedByPolicy,
    /// A token was required but absent.
    MissingToken,
    /// HMAC mismatch or malformed token structure.
    BadSignature,
    /// The token has expired.
    Expired,
    /// Canonical argument hash does not match the token binding.
    ArgsHashMismatch,
    /// The token's tool does not match the proposal's tool.
    ToolMismatch,
    /// The nonce was already consumed.
    NonceReplay,
}

impl CommitReason {
    /// Returns the stable reason label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::UnknownProposal => "unknown_proposal",
            Self::BlockedByPolicy => "blocked_by_policy",
            Self::MissingToken => "missing_token",
            Self::BadSignature => "bad_signature",
            Self::Expired => "expired",
            Self::ArgsHashMismatch => "args_hash_mismatch",
            Self::ToolMismatch => "tool_mismatch",
            Self::NonceReplay => "nonce_replay",
        }
    }
}

impl From<VerifyFailure> for CommitReason {
    fn from(failure: VerifyFailure) -> Self {
        match failure {
            VerifyFailure::BadSignature => Self::BadSignature,
            VerifyFailure::Expired => Self::Expired,
            VerifyFailure::ToolMismatch => Self::ToolMismatch,
            VerifyFailure::ArgsHashMismatch => Self::ArgsHashMismatch,
        }
    }
}

/// Result of a commit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommitOutcome {
    /// Whether the commit was authorized.
    pub committed: bool,
    /// Stable outcome reason.
    pub reason: CommitReason,
}

impl CommitOutcome {
    /// Builds a committed outcome.
    #[must_use]
    pub const fn committed() -> Self {
        Self {
            committed: true,
            reason: CommitReason::Ok,
        }
    }

    /// Builds a rejected outcome.
    #[must_use]
    pub const fn rejected(reason: CommitReason) -> Self {
        Self {
            committed: false,
            reason,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Commit-phase errors.
#[derive(Debug, Error)]
pub enum CommitError {
    /// Arguments could not be canonicalized.
    #[error(transparent)]
    Hashing(#[from] HashError),
    /// Backend storage failed; the caller decides retry policy.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

// ============================================================================
// SECTION: Verifier
// ============================================================================

/// Commit-phase engine.
pub struct Verifier {
    /// Tool profile registry.
    registry: ToolProfileRegistry,
    /// Policy engine used to re-derive the token requirement.
    policy: PolicyEngine,
    /// Token codec.
    codec: Arc<TokenCodec>,
    /// Proposal store.
    store: SharedProposalStore,
    /// Decision telemetry sink.
    sink: Arc<dyn DecisionSink>,
}

impl Verifier {
    /// Creates a verifier over explicit collaborators.
    #[must_use]
    pub fn new(
        registry: ToolProfileRegistry,
        policy: PolicyEngine,
        codec: Arc<TokenCodec>,
        store: SharedProposalStore,
        sink: Arc<dyn DecisionSink>,
    ) -> Self {
        Self {
            registry,
            policy,
            codec,
            store,
            sink,
        }
    }

    /// Validates a commit request and consumes its nonce atomically.
    ///
    /// The verifier performs no tool execution; a committed outcome is the
    /// caller's authorization to proceed.
    ///
    /// # Errors
    ///
    /// Returns [`CommitError`] on hashing or storage failure. Policy and
    /// token rejections are reported through [`CommitOutcome`].
    pub fn commit(
        &self,
        request: &CommitRequest,
        deadline: Deadline,
    ) -> Result<CommitOutcome, CommitError> {
        let fingerprint = request.commit_token.as_deref().map(token_fingerprint);

        let Some(proposal) = self.store.get_proposal(&request.proposal_id, deadline)? else {
            return self.reject(
                request,
                None,
                None,
                CommitReason::UnknownProposal,
                fingerprint,
                deadline,
            );
        };
        let tool_name = proposal.tool_name.clone();

        if proposal.decision != Decision::Allow {
            return self.reject(
                request,
                Some(tool_name),
                None,
                CommitReason::BlockedByPolicy,
                fingerprint,
                deadline,
            );
        }

        let profile = self.registry.resolve(&tool_name);
        let token_required = self.policy.token_required_for(&profile);
        let args_hash = canonical_args_hash(&request.args)?;

        let Some(token_blob) = request.commit_token.as_deref() else {
            if token_required {
                return self.reject(
                    request,
                    Some(tool_name),
                    None,
                    CommitReason::MissingToken,
                    fingerprint,
                    deadline,
                );
            }
            // Tokenless commit: the arguments must still match the proposal.
            if canonical_args_hash_of_json(&proposal.args_json)? != args_hash {
                return self.reject(
                    request,
                    Some(tool_name),
                    None,
                    CommitReason::ArgsHashMismatch,
                    None,
                    deadline,
                );
            }
            let record = self.build_record(request, None, CommitDecision::Committed, CommitReason::Ok);
            self.store.put_commit(&record, deadline)?;
            self.emit(Some(tool_name), request, &record, None);
            return Ok(CommitOutcome::committed());
        };

        let payload = match self.codec.verify(token_blob, &tool_name, &args_hash, Timestamp::now())
        {
            Ok(payload) => payload,
            Err(failure) => {
                return self.reject(
                    request,
                    Some(tool_name),
                    None,
                    failure.into(),
                    fingerprint,
                    deadline,
                );
            }
        };

        if payload.proposal_id != request.proposal_id {
            // A valid token for a different proposal is an unknown binding.
            return self.reject(
                request,
                Some(tool_name),
                Some(payload.token_id),
                CommitReason::UnknownProposal,
                fingerprint,
                deadline,
            );
        }

        let nonce = NonceRecord {
            nonce: payload.nonce.clone(),
            token_id: payload.token_id.clone(),
            expires_at: payload.expires_at,
        };
        let record = self.build_record(
            request,
            Some(payload.token_id.clone()),
            CommitDecision::Committed,
            CommitReason::Ok,
        );
        match self.store.finalize_commit(&record, &nonce, deadline)? {
            NonceConsume::Inserted => {
                self.emit(Some(tool_name), request, &record, fingerprint);
                Ok(CommitOutcome::committed())
            }
            NonceConsume::AlreadyExists => self.reject(
                request,
                Some(tool_name),
                Some(payload.token_id),
                CommitReason::NonceReplay,
                fingerprint,
                deadline,
            ),
        }
    }

    /// Writes the rejection record, emits the event, and returns the outcome.
    fn reject(
        &self,
        request: &CommitRequest,
        tool_name: Option<ToolName>,
        token_id: Option<TokenId>,
        reason: CommitReason,
        token_fingerprint: Option<String>,
        deadline: Deadline,
    ) -> Result<CommitOutcome, CommitError> {
        let record = self.build_record(request, token_id, CommitDecision::Rejected, reason);
        self.store.put_commit(&record, deadline)?;
        self.emit(tool_name, request, &record, token_fingerprint);
        Ok(CommitOutcome::rejected(reason))
    }

    /// Builds the commit record for one attempt.
    fn build_record(
        &self,
        request: &CommitRequest,
        token_id: Option<TokenId>,
        decision: CommitDecision,
        reason: CommitReason,
    ) -> CommitRecord {
        CommitRecord {
            commit_id: CommitId::generate(),
            proposal_id: request.proposal_id.clone(),
            token_id,
            decision,
            verification_reason: reason.label().to_string(),
            created_at: Timestamp::now(),
        }
    }

    /// Emits the commit-phase decision event.
    fn emit(
        &self,
        tool_name: Option<ToolName>,
        request: &CommitRequest,
        record: &CommitRecord,
        token_fingerprint: Option<String>,
    ) {
        let event = DecisionEvent::commit(
            tool_name,
            request.proposal_id.clone(),
            record.commit_id.clone(),
            record.decision.label(),
            &record.verification_reason,
            token_fingerprint,
        );
        self.sink.record(&event);
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Recomputes the canonical hash of a stored canonical-JSON argument string.
fn canonical_args_hash_of_json(args_json: &str) -> Result<String, HashError> {
    let value: Value = serde_json::from_str(args_json)
        .map_err(|err| HashError::Canonicalization(err.to_string()))?;
    canonical_args_hash(&value)
}
