// riskgate-core/src/core/fallback.rs
// ============================================================================
// Module: riskgate Deterministic Fallback
// Description: Side-effect-free draft payloads for blocked and reviewed calls.
// Purpose: Give denied callers a reproducible next step instead of a dead end.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! When policy blocks or reviews a proposal, the caller receives a draft of
//! the attempted call instead of an executed side effect. The payload is a
//! pure function of the inputs and the policy outcome: no clocks, randomness,
//! or network reads enter it, so an audit can reproduce it exactly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::ToolName;
use crate::core::risk::RiskVector;
use crate::core::risk::RiskWeights;

// ============================================================================
// SECTION: Fallback Payload
// ============================================================================

/// Status of a denied proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackStatus {
    /// Policy blocked the call outright.
    Blocked,
    /// Policy requires human review before the call may proceed.
    Review,
}

/// Action the caller is steered toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackAction {
    /// Create a draft of the attempted call for later review.
    CreateDraft,
}

/// Draft of the attempted tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackDraft {
    /// Tool that was attempted.
    pub tool: ToolName,
    /// Arguments exactly as proposed.
    pub args: Value,
}

/// Deterministic response returned for blocked and reviewed proposals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackResponse {
    /// Denial status.
    pub status: FallbackStatus,
    /// Suggested caller action.
    pub action: FallbackAction,
    /// Primary risk reason label.
    pub reason: String,
    /// Draft of the attempted call.
    pub draft: FallbackDraft,
}

impl FallbackResponse {
    /// Builds the fallback payload for a denied proposal.
    #[must_use]
    pub fn new(status: FallbackStatus, reason: &str, tool: ToolName, args: Value) -> Self {
        Self {
            status,
            action: FallbackAction::CreateDraft,
            reason: reason.to_string(),
            draft: FallbackDraft {
                tool,
                args,
            },
        }
    }
}

// ============================================================================
// SECTION: Primary Risk Reason
// ============================================================================

/// Selects the stable reason label for a denied proposal.
///
/// A claimed-success/tool-failure mismatch dominates every other signal; past
/// that, the component with the largest weighted contribution names the
/// reason. A denial with no present components falls back to a generic label.
#[must_use]
pub fn primary_risk_reason(vector: &RiskVector, weights: &RiskWeights) -> &'static str {
    if vector.tool_mismatch_risk == Some(1.0) {
        return "low_integrity";
    }
    let contributions = [
        (vector.grounding_risk, weights.grounding, "ungrounded_answer"),
        (vector.self_consistency_risk, weights.self_consistency, "unstable_answer"),
        (vector.verifier_risk, weights.verifier, "low_verifier_score"),
        (vector.numeric_instability_risk, weights.numeric, "numeric_instability"),
        (vector.drift_risk, weights.drift, "prompt_drift"),
    ];
    let mut best: Option<(f64, &'static str)> = None;
    for (value, weight, label) in contributions {
        let Some(value) = value else {
            continue;
        };
        let contribution = value * weight;
        if best.is_none_or(|(top, _)| contribution > top) {
            best = Some((contribution, label));
        }
    }
    best.map_or("policy_threshold", |(_, label)| label)
}
