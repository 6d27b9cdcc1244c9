// riskgate-core/src/runtime/registry.rs
// ============================================================================
// Module: riskgate Tool Profile Registry
// Description: Process-wide mapping from tool names to registered profiles.
// Purpose: Serve profile lookups for policy evaluation.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The registry is read-mostly: profiles are registered at startup and read on
//! every propose and commit. Registration is an idempotent replace. The
//! registry is wired explicitly into the proposer and verifier rather than
//! looked up ambiently.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::RwLock;

use crate::core::identifiers::ToolName;
use crate::core::profile::ToolProfile;

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Process-wide tool profile registry.
#[derive(Debug, Default, Clone)]
pub struct ToolProfileRegistry {
    /// Profile map behind a read-preferring lock.
    profiles: Arc<RwLock<BTreeMap<ToolName, ToolProfile>>>,
}

impl ToolProfileRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a profile, replacing any existing profile for the tool.
    pub fn register(&self, profile: ToolProfile) {
        if let Ok(mut guard) = self.profiles.write() {
            guard.insert(profile.tool_name.clone(), profile);
        }
    }

    /// Returns the registered profile for a tool, when any.
    #[must_use]
    pub fn get(&self, tool_name: &ToolName) -> Option<ToolProfile> {
        self.profiles.read().ok().and_then(|guard| guard.get(tool_name).cloned())
    }

    /// Returns the profile for a tool, falling back to the MEDIUM default for
    /// unregistered tools.
    #[must_use]
    pub fn resolve(&self, tool_name: &ToolName) -> ToolProfile {
        self.get(tool_name).unwrap_or_else(|| ToolProfile::unknown(tool_name.clone()))
    }

    /// Returns all registered profiles.
    #[must_use]
    pub fn all(&self) -> BTreeMap<ToolName, ToolProfile> {
        self.profiles.read().map(|guard| guard.clone()).unwrap_or_default()
    }
}
