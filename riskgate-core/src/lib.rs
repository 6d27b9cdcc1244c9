// riskgate-core/src/lib.rs
// ============================================================================
// Module: riskgate Core Library
// Description: Public API surface for the riskgate decision engine.
// Purpose: Expose core types, store interfaces, and runtime components.
// Dependencies: crate::{config, core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! riskgate is a risk-bound execution control plane for tool invocations
//! issued by model-driven agents. A propose call scores the request, evaluates
//! the per-tool policy matrix, and either denies with a deterministic fallback
//! or allows it, issuing a short-lived HMAC-signed execution token for
//! high-criticality tools. A commit call presents the token, which is verified
//! and its nonce consumed atomically, so every token authorizes at most one
//! side effect. The engine is library-shaped and backend-agnostic: stores and
//! telemetry sinks plug in through explicit interfaces.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use self::core::*;

pub use config::GateConfig;
pub use config::GateConfigError;
pub use config::SecretString;
pub use config::StoreBackend;
pub use interfaces::Deadline;
pub use interfaces::NonceConsume;
pub use interfaces::ProposalStore;
pub use interfaces::SharedProposalStore;
pub use interfaces::StoreError;
pub use runtime::AllowedProposal;
pub use runtime::CommitError;
pub use runtime::CommitOutcome;
pub use runtime::CommitReason;
pub use runtime::CommitRequest;
pub use runtime::ControlPlane;
pub use runtime::ControlPlaneError;
pub use runtime::DecisionEvent;
pub use runtime::DecisionSink;
pub use runtime::DeniedProposal;
pub use runtime::ExecutionToken;
pub use runtime::InMemoryProposalStore;
pub use runtime::NoopDecisionSink;
pub use runtime::ProposalResponse;
pub use runtime::ProposeError;
pub use runtime::ProposeRequest;
pub use runtime::Proposer;
pub use runtime::SigningSecret;
pub use runtime::StderrDecisionSink;
pub use runtime::TokenCodec;
pub use runtime::TokenPayload;
pub use runtime::ToolProfileRegistry;
pub use runtime::Verifier;
pub use runtime::VerifyFailure;
