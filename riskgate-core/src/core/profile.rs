// riskgate-core/src/core/profile.rs
// ============================================================================
// Module: riskgate Tool Profiles
// Description: Per-tool criticality and policy attributes.
// Purpose: Provide the configuration consulted by the policy engine.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A tool profile captures how dangerous a tool is. Profiles are registered at
//! startup and immutable for the process lifetime; unknown tools fall back to
//! a MEDIUM-criticality default so unregistered side effects are never treated
//! as harmless.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ToolName;

// ============================================================================
// SECTION: Criticality
// ============================================================================

/// Tool criticality level consulted by the policy matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Criticality {
    /// Low-impact tools; always allowed.
    Low,
    /// Default tier for unknown or moderately risky tools.
    Medium,
    /// High-impact tools; gated by score thresholds and execution tokens.
    High,
}

// ============================================================================
// SECTION: Tool Profile
// ============================================================================

/// Risk profile metadata for a single tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolProfile {
    /// Tool name; unique registry key.
    pub tool_name: ToolName,
    /// Criticality tier.
    pub criticality: Criticality,
    /// Whether the tool's side effect cannot be undone.
    pub irreversible: bool,
    /// Whether the tool touches regulated data or money movement.
    pub regulatory: bool,
    /// Free-form risk tier label carried into decision records.
    pub risk_tier: Option<String>,
    /// Per-tool override of the policy engine's token requirement.
    pub require_token: Option<bool>,
}

impl ToolProfile {
    /// Creates a profile with the given name and criticality.
    #[must_use]
    pub fn new(tool_name: impl Into<ToolName>, criticality: Criticality) -> Self {
        Self {
            tool_name: tool_name.into(),
            criticality,
            irreversible: false,
            regulatory: false,
            risk_tier: None,
            require_token: None,
        }
    }

    /// Returns the default profile applied to unregistered tools.
    #[must_use]
    pub fn unknown(tool_name: ToolName) -> Self {
        Self::new(tool_name, Criticality::Medium)
    }

    /// Returns a copy marked irreversible.
    #[must_use]
    pub const fn irreversible(mut self) -> Self {
        self.irreversible = true;
        self
    }

    /// Returns a copy marked regulatory.
    #[must_use]
    pub const fn regulatory(mut self) -> Self {
        self.regulatory = true;
        self
    }

    /// Returns a copy with a risk tier label.
    #[must_use]
    pub fn with_risk_tier(mut self, tier: impl Into<String>) -> Self {
        self.risk_tier = Some(tier.into());
        self
    }

    /// Returns a copy with an explicit token requirement override.
    #[must_use]
    pub const fn with_require_token(mut self, require: bool) -> Self {
        self.require_token = Some(require);
        self
    }
}
