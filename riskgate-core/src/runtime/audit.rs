// riskgate-core/src/runtime/audit.rs
// ============================================================================
// Module: riskgate Decision Audit
// Description: Telemetry records exported for propose and commit decisions.
// Purpose: Give downstream exporters one JSON-shaped event per decision.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every propose and every commit attempt emits exactly one decision event to
//! the configured sink. Events carry identifiers, labels, and fingerprints,
//! never token blobs or signing material. The sink trait is the seam to the
//! external telemetry exporter; the provided sinks write JSON lines to stderr
//! or drop events for tests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::core::identifiers::CommitId;
use crate::core::identifiers::ProposalId;
use crate::core::identifiers::ToolName;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Decision Event
// ============================================================================

/// Surface that produced a decision event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSurface {
    /// Proposal phase.
    Propose,
    /// Commit phase.
    Commit,
}

/// Telemetry record for one decision.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Phase that produced the event.
    pub surface: DecisionSurface,
    /// Tool the decision concerns; absent when the proposal was unknown.
    pub tool_name: Option<ToolName>,
    /// Proposal identifier.
    pub proposal_id: ProposalId,
    /// Commit identifier, for commit-phase events.
    pub commit_id: Option<CommitId>,
    /// Decision label (`ALLOW`/`BLOCK`/`REVIEW` or `committed`/`rejected`).
    pub decision: String,
    /// Stable reason label.
    pub reason: String,
    /// Composite score, when defined.
    pub composite_score: Option<f64>,
    /// SHA-256 fingerprint of the presented token, when any.
    pub token_fingerprint: Option<String>,
    /// Prompt template identifier, when the caller supplied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_template_id: Option<String>,
    /// Event time.
    pub created_at: Timestamp,
}

impl DecisionEvent {
    /// Builds a proposal-phase event.
    #[must_use]
    pub fn proposal(
        tool_name: ToolName,
        proposal_id: ProposalId,
        decision: &str,
        reason: &str,
        composite_score: Option<f64>,
        token_fingerprint: Option<String>,
        prompt_template_id: Option<String>,
    ) -> Self {
        Self {
            event: "tool_proposal",
            surface: DecisionSurface::Propose,
            tool_name: Some(tool_name),
            proposal_id,
            commit_id: None,
            decision: decision.to_string(),
            reason: reason.to_string(),
            composite_score,
            token_fingerprint,
            prompt_template_id,
            created_at: Timestamp::now(),
        }
    }

    /// Builds a commit-phase event.
    #[must_use]
    pub fn commit(
        tool_name: Option<ToolName>,
        proposal_id: ProposalId,
        commit_id: CommitId,
        decision: &str,
        reason: &str,
        token_fingerprint: Option<String>,
    ) -> Self {
        Self {
            event: "tool_commit",
            surface: DecisionSurface::Commit,
            tool_name,
            proposal_id,
            commit_id: Some(commit_id),
            decision: decision.to_string(),
            reason: reason.to_string(),
            composite_score: None,
            token_fingerprint,
            prompt_template_id: None,
            created_at: Timestamp::now(),
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Sink for decision events.
pub trait DecisionSink: Send + Sync {
    /// Records a decision event.
    fn record(&self, event: &DecisionEvent);
}

/// Sink that logs JSON lines to stderr.
pub struct StderrDecisionSink;

impl DecisionSink for StderrDecisionSink {
    fn record(&self, event: &DecisionEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            eprintln!("{payload}");
        }
    }
}

/// No-op sink for tests.
pub struct NoopDecisionSink;

impl DecisionSink for NoopDecisionSink {
    fn record(&self, _event: &DecisionEvent) {}
}
