// riskgate-core/src/core/mod.rs
// ============================================================================
// Module: riskgate Core Types
// Description: Pure types and algorithms of the decision engine.
// Purpose: Provide hashing, scoring, policy, and record types without I/O.
// Dependencies: regex, serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! Everything in `core` is CPU-bound and deterministic: canonical hashing,
//! risk scoring, the policy matrix, fallback templates, and the row types the
//! store persists. Nothing here reads a clock or touches storage.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod fallback;
pub mod hashing;
pub mod identifiers;
pub mod policy;
pub mod profile;
pub mod records;
pub mod risk;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use fallback::FallbackAction;
pub use fallback::FallbackDraft;
pub use fallback::FallbackResponse;
pub use fallback::FallbackStatus;
pub use fallback::primary_risk_reason;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use hashing::MAX_CANONICAL_ARGS_BYTES;
pub use hashing::canonical_args_hash;
pub use hashing::normalized_prompt_hash;
pub use hashing::prompt_hash;
pub use identifiers::CommitId;
pub use identifiers::NonceValue;
pub use identifiers::ProposalId;
pub use identifiers::TokenId;
pub use identifiers::ToolName;
pub use policy::Decision;
pub use policy::PolicyConfig;
pub use policy::PolicyEngine;
pub use policy::PolicyOutcome;
pub use profile::Criticality;
pub use profile::ToolProfile;
pub use records::CommitDecision;
pub use records::CommitRecord;
pub use records::NonceRecord;
pub use records::PromptBaseline;
pub use records::Proposal;
pub use risk::Composite;
pub use risk::RiskLevel;
pub use risk::RiskScorer;
pub use risk::RiskSignals;
pub use risk::RiskThresholds;
pub use risk::RiskVector;
pub use risk::RiskWeights;
pub use time::Timestamp;
