// riskgate-core/src/runtime/engine.rs
// ============================================================================
// Module: riskgate Control Plane
// Description: Wires registry, scorer, policy, codec, proposer, and verifier.
// Purpose: Provide the single canonical propose/commit execution path.
// Dependencies: crate::{config, core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! The control plane is the assembled engine: one registry, one signing
//! secret, one store, one sink, shared by the proposer and verifier. Any host
//! surface (server, worker, test harness) should call through these methods so
//! every decision follows the same path and leaves the same audit trail.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::config::GateConfig;
use crate::config::GateConfigError;
use crate::core::policy::PolicyEngine;
use crate::core::profile::ToolProfile;
use crate::core::risk::RiskScorer;
use crate::interfaces::Deadline;
use crate::interfaces::SharedProposalStore;
use crate::runtime::audit::DecisionSink;
use crate::runtime::proposer::ProposalResponse;
use crate::runtime::proposer::ProposeError;
use crate::runtime::proposer::ProposeRequest;
use crate::runtime::proposer::Proposer;
use crate::runtime::registry::ToolProfileRegistry;
use crate::runtime::token::SecretError;
use crate::runtime::token::SigningSecret;
use crate::runtime::token::TokenCodec;
use crate::runtime::verifier::CommitError;
use crate::runtime::verifier::CommitOutcome;
use crate::runtime::verifier::CommitRequest;
use crate::runtime::verifier::Verifier;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Control plane construction errors.
#[derive(Debug, Error)]
pub enum ControlPlaneError {
    /// Configuration validation failed.
    #[error(transparent)]
    Config(#[from] GateConfigError),
    /// Signing secret construction failed.
    #[error(transparent)]
    Secret(#[from] SecretError),
}

// ============================================================================
// SECTION: Control Plane
// ============================================================================

/// Assembled proposal/commit control plane.
pub struct ControlPlane {
    /// Tool profile registry shared by both phases.
    registry: ToolProfileRegistry,
    /// Proposal-phase engine.
    proposer: Proposer,
    /// Commit-phase engine.
    verifier: Verifier,
}

impl ControlPlane {
    /// Builds a control plane from validated configuration, a store, and a
    /// decision sink.
    ///
    /// # Errors
    ///
    /// Returns [`ControlPlaneError`] when the configuration is invalid.
    pub fn new(
        config: &GateConfig,
        store: SharedProposalStore,
        sink: Arc<dyn DecisionSink>,
    ) -> Result<Self, ControlPlaneError> {
        config.validate()?;
        let registry = ToolProfileRegistry::new();
        let secret = SigningSecret::from_bytes(config.signing_secret.as_bytes())?;
        let codec = Arc::new(TokenCodec::new(secret, config.token_ttl()));
        let scorer = RiskScorer::new(config.risk_weights, config.risk_thresholds);
        let policy = PolicyEngine::new(config.policy_config());
        let proposer = Proposer::new(
            registry.clone(),
            scorer,
            policy.clone(),
            Arc::clone(&codec),
            store.clone(),
            Arc::clone(&sink),
        );
        let verifier = Verifier::new(registry.clone(), policy, codec, store, sink);
        Ok(Self {
            registry,
            proposer,
            verifier,
        })
    }

    /// Registers a tool profile; replaces any existing profile for the tool.
    pub fn register_profile(&self, profile: ToolProfile) {
        self.registry.register(profile);
    }

    /// Returns the shared registry.
    #[must_use]
    pub const fn registry(&self) -> &ToolProfileRegistry {
        &self.registry
    }

    /// Runs the proposal phase.
    ///
    /// # Errors
    ///
    /// Returns [`ProposeError`] on hashing, token-issue, or storage failure.
    pub fn propose(
        &self,
        request: &ProposeRequest,
        deadline: Deadline,
    ) -> Result<ProposalResponse, ProposeError> {
        self.proposer.propose(request, deadline)
    }

    /// Runs the commit phase.
    ///
    /// # Errors
    ///
    /// Returns [`CommitError`] on hashing or storage failure.
    pub fn commit(
        &self,
        request: &CommitRequest,
        deadline: Deadline,
    ) -> Result<CommitOutcome, CommitError> {
        self.verifier.commit(request, deadline)
    }
}
