// riskgate-core/src/runtime/mod.rs
// ============================================================================
// Module: riskgate Runtime
// Description: Engine components assembled around the store contract.
// Purpose: Expose token codec, registry, proposer, verifier, and wiring.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime components hold the process-lifetime state: the signing secret
//! inside the token codec, the tool profile registry, and the store and sink
//! handles shared by the proposer and verifier.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;
pub mod engine;
pub mod proposer;
pub mod registry;
pub mod store;
pub mod token;
pub mod verifier;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::DecisionEvent;
pub use audit::DecisionSink;
pub use audit::DecisionSurface;
pub use audit::NoopDecisionSink;
pub use audit::StderrDecisionSink;
pub use engine::ControlPlane;
pub use engine::ControlPlaneError;
pub use proposer::AllowedProposal;
pub use proposer::DeniedProposal;
pub use proposer::ProposalResponse;
pub use proposer::ProposeError;
pub use proposer::ProposeRequest;
pub use proposer::Proposer;
pub use registry::ToolProfileRegistry;
pub use store::InMemoryProposalStore;
pub use token::DEFAULT_TOKEN_TTL;
pub use token::ExecutionToken;
pub use token::MIN_SECRET_BYTES;
pub use token::SecretError;
pub use token::SigningSecret;
pub use token::TokenCodec;
pub use token::TokenIssueError;
pub use token::TokenPayload;
pub use token::VerifyFailure;
pub use token::token_fingerprint;
pub use verifier::CommitError;
pub use verifier::CommitOutcome;
pub use verifier::CommitReason;
pub use verifier::CommitRequest;
pub use verifier::Verifier;
