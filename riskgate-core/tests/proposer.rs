// riskgate-core/tests/proposer.rs
// ============================================================================
// Module: Proposer Tests
// Description: Tests for proposal-phase scoring, policy, and persistence.
// ============================================================================
//! ## Overview
//! Validates the propose flow: profile resolution, deterministic fallbacks,
//! token issue for high-criticality tools, baseline seeding, and that every
//! proposal row is persisted with its final decision.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;

use riskgate_core::ControlPlane;
use riskgate_core::Criticality;
use riskgate_core::Deadline;
use riskgate_core::Decision;
use riskgate_core::FallbackAction;
use riskgate_core::FallbackStatus;
use riskgate_core::GateConfig;
use riskgate_core::InMemoryProposalStore;
use riskgate_core::NoopDecisionSink;
use riskgate_core::ProposalResponse;
use riskgate_core::ProposalStore;
use riskgate_core::ProposeRequest;
use riskgate_core::SharedProposalStore;
use riskgate_core::ToolProfile;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

fn args(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn plane(store: &InMemoryProposalStore) -> ControlPlane {
    let config = GateConfig::with_secret("k".repeat(32));
    ControlPlane::new(
        &config,
        SharedProposalStore::from_store(store.clone()),
        Arc::new(NoopDecisionSink),
    )
    .unwrap()
}

fn grounded_transfer_request() -> ProposeRequest {
    let mut request = ProposeRequest::new(
        "transfer_funds",
        args(json!({"amount": 100, "to": "acct_123"})),
        "Transfer 100 to acct_123",
        "Transfer 100 to acct_123",
    );
    request.retrieved_context = Some("Transfer 100 to acct_123".to_string());
    request.verifier_score = Some(0.95);
    request
}

fn mismatched_transfer_request() -> ProposeRequest {
    let mut request = ProposeRequest::new(
        "transfer_funds",
        args(json!({"amount": 100, "to": "acct_123"})),
        "Transfer 100 to acct_123",
        "Transferred $9999 successfully",
    );
    request.retrieved_context = Some("declined".to_string());
    request.tool_result_summary = Some("payment API failed".to_string());
    request
}

// ============================================================================
// SECTION: Allow Paths
// ============================================================================

/// Verifies a grounded HIGH-criticality call is allowed with a token.
#[test]
fn high_tool_low_risk_allows_with_token() {
    let store = InMemoryProposalStore::new();
    let plane = plane(&store);
    plane.register_profile(ToolProfile::new("transfer_funds", Criticality::High));

    let response = plane.propose(&grounded_transfer_request(), Deadline::none()).unwrap();
    let ProposalResponse::Allow(allowed) = response else {
        panic!("expected allow");
    };
    assert_eq!(allowed.status, "allow");
    assert!(allowed.commit_token.is_some());

    let proposal = store.get_proposal(&allowed.proposal_id, Deadline::none()).unwrap().unwrap();
    assert_eq!(proposal.decision, Decision::Allow);
    assert!(proposal.composite_score.unwrap() < 0.20);
}

/// Verifies unknown tools default to MEDIUM criticality: allowed, no token.
#[test]
fn unknown_tool_defaults_to_medium() {
    let store = InMemoryProposalStore::new();
    let plane = plane(&store);

    let response = plane.propose(&grounded_transfer_request(), Deadline::none()).unwrap();
    let ProposalResponse::Allow(allowed) = response else {
        panic!("expected allow");
    };
    assert!(allowed.commit_token.is_none());
}

/// Verifies a signal-free request on a LOW tool is allowed without a token.
#[test]
fn signal_free_low_tool_is_allowed() {
    let store = InMemoryProposalStore::new();
    let plane = plane(&store);
    plane.register_profile(ToolProfile::new("lookup_rate", Criticality::Low));

    let request = ProposeRequest::new(
        "lookup_rate",
        args(json!({"currency": "EUR"})),
        "What is the rate?",
        "The rate lookup is pending",
    );
    let response = plane.propose(&request, Deadline::none()).unwrap();
    let ProposalResponse::Allow(allowed) = response else {
        panic!("expected allow");
    };
    assert!(allowed.commit_token.is_none());

    let proposal = store.get_proposal(&allowed.proposal_id, Deadline::none()).unwrap().unwrap();
    assert_eq!(proposal.composite_score, None);
}

// ============================================================================
// SECTION: Denial Paths
// ============================================================================

/// Verifies the blocked fallback carries the claimed-success mismatch reason
/// and a draft of the attempted call.
#[test]
fn high_risk_block_returns_low_integrity_draft() {
    let store = InMemoryProposalStore::new();
    let plane = plane(&store);
    plane.register_profile(ToolProfile::new("transfer_funds", Criticality::High));

    let response = plane.propose(&mismatched_transfer_request(), Deadline::none()).unwrap();
    let ProposalResponse::Denied(denied) = response else {
        panic!("expected denial");
    };
    assert_eq!(denied.fallback.status, FallbackStatus::Blocked);
    assert_eq!(denied.fallback.action, FallbackAction::CreateDraft);
    assert_eq!(denied.fallback.reason, "low_integrity");
    assert_eq!(denied.fallback.draft.tool.as_str(), "transfer_funds");
    assert_eq!(denied.fallback.draft.args, json!({"amount": 100, "to": "acct_123"}));

    let proposal = store.get_proposal(&denied.proposal_id, Deadline::none()).unwrap().unwrap();
    assert_eq!(proposal.decision, Decision::Block);
}

/// Verifies the fallback payload is identical across repeated proposes of the
/// same inputs.
#[test]
fn fallback_payload_is_deterministic() {
    let store = InMemoryProposalStore::new();
    let plane = plane(&store);
    plane.register_profile(ToolProfile::new("transfer_funds", Criticality::High));

    let first = plane.propose(&mismatched_transfer_request(), Deadline::none()).unwrap();
    let second = plane.propose(&mismatched_transfer_request(), Deadline::none()).unwrap();
    let (ProposalResponse::Denied(first), ProposalResponse::Denied(second)) = (first, second)
    else {
        panic!("expected denials");
    };

    assert_ne!(first.proposal_id, second.proposal_id);
    assert_eq!(first.fallback, second.fallback);
}

/// Verifies a reviewed MEDIUM call returns the review fallback, no token.
#[test]
fn medium_review_returns_draft_without_token() {
    let store = InMemoryProposalStore::new();
    let plane = plane(&store);
    plane.register_profile(ToolProfile::new("update_ledger", Criticality::Medium));

    // Verifier score 0.30 is the only present component: composite 0.70.
    let mut request = ProposeRequest::new(
        "update_ledger",
        args(json!({"entry": "adjustment"})),
        "Update the ledger",
        "Ledger adjustment prepared",
    );
    request.verifier_score = Some(0.30);

    let response = plane.propose(&request, Deadline::none()).unwrap();
    let ProposalResponse::Denied(denied) = response else {
        panic!("expected denial");
    };
    assert_eq!(denied.fallback.status, FallbackStatus::Review);
    assert_eq!(denied.fallback.reason, "low_verifier_score");

    let proposal = store.get_proposal(&denied.proposal_id, Deadline::none()).unwrap().unwrap();
    assert_eq!(proposal.decision, Decision::Review);
}

// ============================================================================
// SECTION: Baselines and Drift
// ============================================================================

/// Verifies the first propose seeds the baseline and a reshaped prompt then
/// raises drift risk.
#[test]
fn baseline_seeds_then_detects_drift() {
    let store = InMemoryProposalStore::new();
    let plane = plane(&store);
    plane.register_profile(ToolProfile::new("transfer_funds", Criticality::High));

    let first = plane.propose(&grounded_transfer_request(), Deadline::none()).unwrap();
    assert!(matches!(first, ProposalResponse::Allow(_)));
    let tool = riskgate_core::ToolName::new("transfer_funds");
    let seeded = store.get_prompt_baseline(&tool, Deadline::none()).unwrap();
    assert!(seeded.is_some());

    // Same prompt shape: numbers are masked, so drift stays quiet.
    let mut same_shape = grounded_transfer_request();
    same_shape.prompt = "Transfer 250 to acct_999".to_string();
    let response = plane.propose(&same_shape, Deadline::none()).unwrap();
    assert!(matches!(response, ProposalResponse::Allow(_)));

    // A reshaped prompt flips the drift component to 1.0. With no other
    // signals present the composite is pure drift, which blocks a HIGH tool.
    let reshaped = ProposeRequest::new(
        "transfer_funds",
        args(json!({"amount": 100, "to": "acct_123"})),
        "Urgent wire with escalated privileges to acct_123",
        "Wire prepared",
    );
    let response = plane.propose(&reshaped, Deadline::none()).unwrap();
    let ProposalResponse::Denied(denied) = response else {
        panic!("expected drift denial");
    };
    assert_eq!(denied.fallback.status, FallbackStatus::Blocked);
    assert_eq!(denied.fallback.reason, "prompt_drift");
}
