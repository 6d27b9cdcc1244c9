// riskgate-core/src/core/policy.rs
// ============================================================================
// Module: riskgate Policy Engine
// Description: Criticality/score matrix mapping composites to decisions.
// Purpose: Decide ALLOW/REVIEW/BLOCK and whether a commit token is required.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The policy engine is a pure function of the tool profile and the composite
//! score. Boundaries are closed on the upper side: a HIGH tool at exactly the
//! block threshold is blocked, at exactly the review threshold is reviewed.
//! REVIEW and BLOCK never issue tokens. An undefined composite (no observable
//! signals) is its own row: HIGH is reviewed, MEDIUM and LOW are allowed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::profile::Criticality;
use crate::core::profile::ToolProfile;
use crate::core::risk::Composite;

// ============================================================================
// SECTION: Decision
// ============================================================================

/// Policy outcome for a proposed tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    /// The call may proceed.
    Allow,
    /// The call is denied.
    Block,
    /// The call requires human review before proceeding.
    Review,
}

impl Decision {
    /// Returns the stable persisted label for this decision.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Allow => "ALLOW",
            Self::Block => "BLOCK",
            Self::Review => "REVIEW",
        }
    }

    /// Parses a persisted decision label.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ALLOW" => Some(Self::Allow),
            "BLOCK" => Some(Self::Block),
            "REVIEW" => Some(Self::Review),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configurable thresholds for the policy matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Stable policy identifier carried into decision records.
    pub policy_id: String,
    /// Policy version label.
    pub policy_version: String,
    /// HIGH tools at or above this score are blocked.
    pub high_block_threshold: f64,
    /// HIGH tools at or above this score (below block) are reviewed.
    pub high_review_threshold: f64,
    /// MEDIUM tools at or above this score are reviewed.
    pub medium_review_threshold: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            policy_id: "risk-bound-exec".to_string(),
            policy_version: "1.0.0".to_string(),
            high_block_threshold: 0.35,
            high_review_threshold: 0.20,
            medium_review_threshold: 0.50,
        }
    }
}

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Result of policy evaluation for one proposal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyOutcome {
    /// Final decision.
    pub decision: Decision,
    /// Whether an execution token must gate the commit.
    pub token_required: bool,
    /// Stable reason label for audit records.
    pub reason: &'static str,
    /// Threshold the score was compared against.
    pub threshold_used: f64,
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Evaluates the policy matrix.
#[derive(Debug, Clone, Default)]
pub struct PolicyEngine {
    /// Matrix thresholds.
    config: PolicyConfig,
}

impl PolicyEngine {
    /// Creates a policy engine with explicit thresholds.
    #[must_use]
    pub const fn new(config: PolicyConfig) -> Self {
        Self {
            config,
        }
    }

    /// Returns the configured thresholds.
    #[must_use]
    pub const fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Decides the outcome for a profile and composite.
    #[must_use]
    pub fn decide(&self, profile: &ToolProfile, composite: Composite) -> PolicyOutcome {
        let cfg = &self.config;
        let outcome = match composite {
            Composite::Undefined => match profile.criticality {
                Criticality::High => PolicyOutcome {
                    decision: Decision::Review,
                    token_required: false,
                    reason: "high_criticality_undefined_composite",
                    threshold_used: cfg.high_review_threshold,
                },
                Criticality::Medium => PolicyOutcome {
                    decision: Decision::Allow,
                    token_required: false,
                    reason: "medium_criticality_allow",
                    threshold_used: cfg.medium_review_threshold,
                },
                Criticality::Low => PolicyOutcome {
                    decision: Decision::Allow,
                    token_required: false,
                    reason: "low_criticality_allow",
                    threshold_used: 1.0,
                },
            },
            Composite::Scored {
                score, ..
            } => match profile.criticality {
                Criticality::High => {
                    if score >= cfg.high_block_threshold {
                        PolicyOutcome {
                            decision: Decision::Block,
                            token_required: false,
                            reason: "high_criticality_block_threshold",
                            threshold_used: cfg.high_block_threshold,
                        }
                    } else if score >= cfg.high_review_threshold {
                        PolicyOutcome {
                            decision: Decision::Review,
                            token_required: false,
                            reason: "high_criticality_review_threshold",
                            threshold_used: cfg.high_review_threshold,
                        }
                    } else {
                        PolicyOutcome {
                            decision: Decision::Allow,
                            token_required: true,
                            reason: "high_criticality_allow",
                            threshold_used: cfg.high_review_threshold,
                        }
                    }
                }
                Criticality::Medium => {
                    if score >= cfg.medium_review_threshold {
                        PolicyOutcome {
                            decision: Decision::Review,
                            token_required: false,
                            reason: "medium_criticality_review_threshold",
                            threshold_used: cfg.medium_review_threshold,
                        }
                    } else {
                        PolicyOutcome {
                            decision: Decision::Allow,
                            token_required: false,
                            reason: "medium_criticality_allow",
                            threshold_used: cfg.medium_review_threshold,
                        }
                    }
                }
                Criticality::Low => PolicyOutcome {
                    decision: Decision::Allow,
                    token_required: false,
                    reason: "low_criticality_allow",
                    threshold_used: 1.0,
                },
            },
        };
        Self::apply_token_override(profile, outcome)
    }

    /// Returns whether an ALLOW decision for this profile carries a token
    /// requirement. Used by the verifier to re-derive the commit contract.
    #[must_use]
    pub fn token_required_for(&self, profile: &ToolProfile) -> bool {
        profile.require_token.unwrap_or(profile.criticality == Criticality::High)
    }

    /// Applies the per-tool `require_token` override to ALLOW outcomes.
    fn apply_token_override(profile: &ToolProfile, mut outcome: PolicyOutcome) -> PolicyOutcome {
        if outcome.decision == Decision::Allow {
            if let Some(require) = profile.require_token {
                outcome.token_required = require;
            }
        } else {
            outcome.token_required = false;
        }
        outcome
    }
}
