// riskgate-core/src/runtime/proposer.rs
// ============================================================================
// Module: riskgate Proposer
// Description: Proposal-phase orchestration from signals to persisted decision.
// Purpose: Score, decide, issue or deny, and persist before responding.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! `propose` is the first phase of the two-phase protocol. It never executes
//! tool side effects: it scores the request, evaluates policy, persists the
//! proposal row, and returns either an allow response (with an execution token
//! when the profile requires one) or a deterministic fallback draft. The
//! fallback payload is a pure function of the inputs and the policy outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::fallback::FallbackResponse;
use crate::core::fallback::FallbackStatus;
use crate::core::fallback::primary_risk_reason;
use crate::core::hashing::DEFAULT_HASH_ALGORITHM;
use crate::core::hashing::HashError;
use crate::core::hashing::MAX_CANONICAL_ARGS_BYTES;
use crate::core::hashing::bounded_canonical_json;
use crate::core::hashing::hash_bytes;
use crate::core::hashing::normalized_prompt_hash;
use crate::core::hashing::prompt_hash;
use crate::core::identifiers::ProposalId;
use crate::core::identifiers::ToolName;
use crate::core::policy::Decision;
use crate::core::policy::PolicyEngine;
use crate::core::records::Proposal;
use crate::core::risk::Composite;
use crate::core::risk::RiskScorer;
use crate::core::risk::RiskSignals;
use crate::core::time::Timestamp;
use crate::interfaces::Deadline;
use crate::interfaces::ProposalStore;
use crate::interfaces::SharedProposalStore;
use crate::interfaces::StoreError;
use crate::runtime::audit::DecisionEvent;
use crate::runtime::audit::DecisionSink;
use crate::runtime::registry::ToolProfileRegistry;
use crate::runtime::token::TokenCodec;
use crate::runtime::token::TokenIssueError;
use crate::runtime::token::token_fingerprint;

// ============================================================================
// SECTION: Request and Response
// ============================================================================

/// Inputs observed for one proposed tool call.
#[derive(Debug, Clone)]
pub struct ProposeRequest {
    /// Tool to gate.
    pub tool_name: ToolName,
    /// Proposed arguments as an ordered string-keyed mapping.
    pub args: Map<String, Value>,
    /// Prompt that produced the answer.
    pub prompt: String,
    /// Primary model answer.
    pub model_answer: String,
    /// Secondary answer sampled for self-consistency.
    pub secondary_answer: Option<String>,
    /// Summary of the tool result the answer describes.
    pub tool_result_summary: Option<String>,
    /// Retrieved context the answer should be grounded in.
    pub retrieved_context: Option<String>,
    /// External verifier score in [0, 1].
    pub verifier_score: Option<f64>,
    /// Prompt template identifier, carried into telemetry.
    pub prompt_template_id: Option<String>,
}

impl ProposeRequest {
    /// Creates a request with only the required signals.
    #[must_use]
    pub fn new(
        tool_name: impl Into<ToolName>,
        args: Map<String, Value>,
        prompt: impl Into<String>,
        model_answer: impl Into<String>,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            args,
            prompt: prompt.into(),
            model_answer: model_answer.into(),
            secondary_answer: None,
            tool_result_summary: None,
            retrieved_context: None,
            verifier_score: None,
            prompt_template_id: None,
        }
    }
}

/// Allowed proposal response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllowedProposal {
    /// Response status; always `allow`.
    pub status: &'static str,
    /// Proposal identifier for the commit phase.
    pub proposal_id: ProposalId,
    /// Execution token, present when the profile requires one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_token: Option<String>,
}

/// Denied proposal response with its deterministic fallback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeniedProposal {
    /// Proposal identifier recorded for the denial.
    pub proposal_id: ProposalId,
    /// Deterministic fallback payload.
    #[serde(flatten)]
    pub fallback: FallbackResponse,
}

/// Response returned by [`Proposer::propose`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProposalResponse {
    /// The call may proceed.
    Allow(AllowedProposal),
    /// The call was blocked or requires review.
    Denied(DeniedProposal),
}

impl ProposalResponse {
    /// Returns the proposal identifier.
    #[must_use]
    pub const fn proposal_id(&self) -> &ProposalId {
        match self {
            Self::Allow(allowed) => &allowed.proposal_id,
            Self::Denied(denied) => &denied.proposal_id,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Proposal-phase errors.
#[derive(Debug, Error)]
pub enum ProposeError {
    /// Arguments could not be canonicalized.
    #[error(transparent)]
    Hashing(#[from] HashError),
    /// Token issue failed.
    #[error(transparent)]
    Token(#[from] TokenIssueError),
    /// Backend storage failed; the caller decides retry policy.
    #[error(transparent)]
    Storage(#[from] StoreError),
    /// Canonical argument bytes are not valid UTF-8.
    #[error("canonical argument json is not utf-8: {0}")]
    ArgsEncoding(String),
}

// ============================================================================
// SECTION: Proposer
// ============================================================================

/// Proposal-phase engine.
pub struct Proposer {
    /// Tool profile registry.
    registry: ToolProfileRegistry,
    /// Risk scorer.
    scorer: RiskScorer,
    /// Policy engine.
    policy: PolicyEngine,
    /// Token codec.
    codec: Arc<TokenCodec>,
    /// Proposal store.
    store: SharedProposalStore,
    /// Decision telemetry sink.
    sink: Arc<dyn DecisionSink>,
}

impl Proposer {
    /// Creates a proposer over explicit collaborators.
    #[must_use]
    pub fn new(
        registry: ToolProfileRegistry,
        scorer: RiskScorer,
        policy: PolicyEngine,
        codec: Arc<TokenCodec>,
        store: SharedProposalStore,
        sink: Arc<dyn DecisionSink>,
    ) -> Self {
        Self {
            registry,
            scorer,
            policy,
            codec,
            store,
            sink,
        }
    }

    /// Scores a proposed tool call, evaluates policy, persists the proposal,
    /// and returns the response.
    ///
    /// # Errors
    ///
    /// Returns [`ProposeError`] on hashing, token-issue, or storage failure.
    pub fn propose(
        &self,
        request: &ProposeRequest,
        deadline: Deadline,
    ) -> Result<ProposalResponse, ProposeError> {
        let profile = self.registry.resolve(&request.tool_name);

        let args_bytes = bounded_canonical_json(&request.args, MAX_CANONICAL_ARGS_BYTES)?;
        let args_hash = hash_bytes(DEFAULT_HASH_ALGORITHM, &args_bytes).value;
        let args_json = String::from_utf8(args_bytes)
            .map_err(|err| ProposeError::ArgsEncoding(err.to_string()))?;
        let exact_prompt_hash = prompt_hash(&request.prompt);
        let norm_prompt_hash = normalized_prompt_hash(&request.prompt);

        let baseline = self.store.get_prompt_baseline(&request.tool_name, deadline)?;
        if baseline.is_none() {
            // First sighting of the tool seeds the drift baseline.
            self.store.set_prompt_baseline(&request.tool_name, &norm_prompt_hash, deadline)?;
        }

        let signals = RiskSignals {
            answer: &request.model_answer,
            secondary_answer: request.secondary_answer.as_deref(),
            retrieved_context: request.retrieved_context.as_deref(),
            tool_result_summary: request.tool_result_summary.as_deref(),
            verifier_score: request.verifier_score,
            baseline_prompt_hash: baseline.as_deref(),
        };
        let (vector, composite) = self.scorer.score(&norm_prompt_hash, &signals);
        let outcome = self.policy.decide(&profile, composite);

        let proposal_id = ProposalId::generate();
        let proposal = Proposal {
            proposal_id: proposal_id.clone(),
            tool_name: request.tool_name.clone(),
            args_json,
            prompt_hash: exact_prompt_hash,
            composite_score: composite.score(),
            decision: outcome.decision,
            created_at: Timestamp::now(),
        };
        self.store.put_proposal(&proposal, deadline)?;

        let response = match outcome.decision {
            Decision::Block | Decision::Review => {
                let status = if outcome.decision == Decision::Block {
                    FallbackStatus::Blocked
                } else {
                    FallbackStatus::Review
                };
                let reason = primary_risk_reason(&vector, &self.scorer.weights);
                let fallback = FallbackResponse::new(
                    status,
                    reason,
                    request.tool_name.clone(),
                    Value::Object(request.args.clone()),
                );
                self.emit(request, &proposal_id, &outcome.decision, reason, &composite, None);
                ProposalResponse::Denied(DeniedProposal {
                    proposal_id,
                    fallback,
                })
            }
            Decision::Allow if outcome.token_required => {
                let token = self.codec.issue(
                    &proposal_id,
                    &request.tool_name,
                    &args_hash,
                    composite.score(),
                )?;
                self.emit(
                    request,
                    &proposal_id,
                    &outcome.decision,
                    outcome.reason,
                    &composite,
                    Some(token_fingerprint(&token.blob)),
                );
                ProposalResponse::Allow(AllowedProposal {
                    status: "allow",
                    proposal_id,
                    commit_token: Some(token.blob),
                })
            }
            Decision::Allow => {
                self.emit(request, &proposal_id, &outcome.decision, outcome.reason, &composite, None);
                ProposalResponse::Allow(AllowedProposal {
                    status: "allow",
                    proposal_id,
                    commit_token: None,
                })
            }
        };
        Ok(response)
    }

    /// Emits the proposal-phase decision event.
    fn emit(
        &self,
        request: &ProposeRequest,
        proposal_id: &ProposalId,
        decision: &Decision,
        reason: &str,
        composite: &Composite,
        token_fingerprint: Option<String>,
    ) {
        let event = DecisionEvent::proposal(
            request.tool_name.clone(),
            proposal_id.clone(),
            decision.label(),
            reason,
            composite.score(),
            token_fingerprint,
            request.prompt_template_id.clone(),
        );
        self.sink.record(&event);
    }
}
