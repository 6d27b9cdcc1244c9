// riskgate-core/tests/control_plane.rs
// ============================================================================
// Module: Control Plane Scenarios
// Description: End-to-end propose/commit flows through the assembled engine.
// ============================================================================
//! ## Overview
//! Exercises the full decision path with literal scenario values: the token
//! happy path with replay, the blocked low-integrity path, threshold-driven
//! review, the concurrent-commit race, and the decision event stream.

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
use std::sync::Mutex;
use std::thread;

use riskgate_core::CommitDecision;
use riskgate_core::CommitReason;
use riskgate_core::CommitRequest;
use riskgate_core::ControlPlane;
use riskgate_core::Criticality;
use riskgate_core::Deadline;
use riskgate_core::DecisionEvent;
use riskgate_core::DecisionSink;
use riskgate_core::FallbackStatus;
use riskgate_core::GateConfig;
use riskgate_core::InMemoryProposalStore;
use riskgate_core::NoopDecisionSink;
use riskgate_core::ProposalResponse;
use riskgate_core::ProposeRequest;
use riskgate_core::SharedProposalStore;
use riskgate_core::ToolProfile;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

/// Sink that captures every decision event for assertions.
#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<DecisionEvent>>,
}

impl DecisionSink for RecordingSink {
    fn record(&self, event: &DecisionEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event.clone());
        }
    }
}

fn args(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn plane_with_sink(
    store: &InMemoryProposalStore,
    sink: Arc<dyn DecisionSink>,
) -> ControlPlane {
    let config = GateConfig::with_secret("k".repeat(32));
    ControlPlane::new(&config, SharedProposalStore::from_store(store.clone()), sink).unwrap()
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

// ============================================================================
// SECTION: Token Happy Path
// ============================================================================

/// HIGH tool, low risk: allow with token, commit once, replay rejected.
#[test]
fn high_tool_token_path_commits_once() {
    let store = InMemoryProposalStore::new();
    let plane = plane_with_sink(&store, Arc::new(NoopDecisionSink));
    plane.register_profile(
        ToolProfile::new("transfer_funds", Criticality::High).irreversible().regulatory(),
    );

    let response = plane.propose(&grounded_transfer_request(), Deadline::none()).unwrap();
    let ProposalResponse::Allow(allowed) = response else {
        panic!("expected allow");
    };
    let token = allowed.commit_token.expect("HIGH allow issues a token");

    let commit = CommitRequest {
        proposal_id: allowed.proposal_id.clone(),
        commit_token: Some(token),
        args: args(json!({"amount": 100, "to": "acct_123"})),
    };
    let first = plane.commit(&commit, Deadline::none()).unwrap();
    assert!(first.committed);
    assert_eq!(first.reason, CommitReason::Ok);

    let second = plane.commit(&commit, Deadline::none()).unwrap();
    assert!(!second.committed);
    assert_eq!(second.reason, CommitReason::NonceReplay);
}

// ============================================================================
// SECTION: Blocked Path
// ============================================================================

/// HIGH tool, claimed success over a failed tool call: blocked with a draft,
/// and the proposal can never be committed afterwards.
#[test]
fn high_tool_low_integrity_is_blocked_for_good() {
    let store = InMemoryProposalStore::new();
    let plane = plane_with_sink(&store, Arc::new(NoopDecisionSink));
    plane.register_profile(ToolProfile::new("transfer_funds", Criticality::High));

    let mut request = ProposeRequest::new(
        "transfer_funds",
        args(json!({"amount": 100, "to": "acct_123"})),
        "Transfer 100 to acct_123",
        "Transferred $9999 successfully",
    );
    request.retrieved_context = Some("declined".to_string());
    request.tool_result_summary = Some("payment API failed".to_string());

    let response = plane.propose(&request, Deadline::none()).unwrap();
    let ProposalResponse::Denied(denied) = response else {
        panic!("expected denial");
    };
    assert_eq!(denied.fallback.status, FallbackStatus::Blocked);
    assert_eq!(denied.fallback.reason, "low_integrity");
    assert_eq!(denied.fallback.draft.args, json!({"amount": 100, "to": "acct_123"}));

    let commit = CommitRequest {
        proposal_id: denied.proposal_id,
        commit_token: None,
        args: args(json!({"amount": 100, "to": "acct_123"})),
    };
    let outcome = plane.commit(&commit, Deadline::none()).unwrap();
    assert_eq!(outcome.reason, CommitReason::BlockedByPolicy);
}

// ============================================================================
// SECTION: Threshold-Driven Review
// ============================================================================

/// A composite of 0.42 on a MEDIUM tool sits below the default 0.50 review
/// gate; a tightened gate flips the same request into review.
#[test]
fn medium_review_gate_is_configurable() {
    // Verifier score 0.58 is the only present component: composite 0.42.
    let mut request = ProposeRequest::new(
        "update_ledger",
        args(json!({"entry": "adjustment"})),
        "Update the ledger",
        "Ledger adjustment prepared",
    );
    request.verifier_score = Some(0.58);

    // Default matrix: 0.42 < 0.50, so the call is allowed without a token.
    let store = InMemoryProposalStore::new();
    let plane = plane_with_sink(&store, Arc::new(NoopDecisionSink));
    plane.register_profile(ToolProfile::new("update_ledger", Criticality::Medium));
    let response = plane.propose(&request, Deadline::none()).unwrap();
    let ProposalResponse::Allow(allowed) = response else {
        panic!("expected allow under the default gate");
    };
    assert!(allowed.commit_token.is_none());

    // Tightened gate: the same request is reviewed with a draft, no token.
    let mut config = GateConfig::with_secret("k".repeat(32));
    config.medium_review_threshold = 0.40;
    let store = InMemoryProposalStore::new();
    let plane = ControlPlane::new(
        &config,
        SharedProposalStore::from_store(store.clone()),
        Arc::new(NoopDecisionSink),
    )
    .unwrap();
    plane.register_profile(ToolProfile::new("update_ledger", Criticality::Medium));
    let response = plane.propose(&request, Deadline::none()).unwrap();
    let ProposalResponse::Denied(denied) = response else {
        panic!("expected review under the tightened gate");
    };
    assert_eq!(denied.fallback.status, FallbackStatus::Review);

    let commit = CommitRequest {
        proposal_id: denied.proposal_id,
        commit_token: None,
        args: args(json!({"entry": "adjustment"})),
    };
    let outcome = plane.commit(&commit, Deadline::none()).unwrap();
    assert_eq!(outcome.reason, CommitReason::BlockedByPolicy);
}

// ============================================================================
// SECTION: Concurrency
// ============================================================================

/// Two parallel commits of the same token: exactly one wins, both audited.
#[test]
fn concurrent_commits_race_to_one_winner() {
    let store = InMemoryProposalStore::new();
    let plane = Arc::new(plane_with_sink(&store, Arc::new(NoopDecisionSink)));
    plane.register_profile(ToolProfile::new("transfer_funds", Criticality::High));

    let response = plane.propose(&grounded_transfer_request(), Deadline::none()).unwrap();
    let ProposalResponse::Allow(allowed) = response else {
        panic!("expected allow");
    };
    let commit = CommitRequest {
        proposal_id: allowed.proposal_id.clone(),
        commit_token: Some(allowed.commit_token.unwrap()),
        args: args(json!({"amount": 100, "to": "acct_123"})),
    };

    let mut handles = Vec::new();
    for _ in 0..2 {
        let plane = Arc::clone(&plane);
        let commit = commit.clone();
        handles.push(thread::spawn(move || {
            plane.commit(&commit, Deadline::none()).unwrap()
        }));
    }
    let outcomes: Vec<_> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();

    let winners = outcomes.iter().filter(|outcome| outcome.committed).count();
    assert_eq!(winners, 1);
    let replays = outcomes
        .iter()
        .filter(|outcome| outcome.reason == CommitReason::NonceReplay)
        .count();
    assert_eq!(replays, 1);

    let records = store.commit_records_for(&allowed.proposal_id).unwrap();
    assert_eq!(records.len(), 2);
    let committed = records
        .iter()
        .filter(|record| record.decision == CommitDecision::Committed)
        .count();
    assert_eq!(committed, 1);
}

// ============================================================================
// SECTION: Decision Events
// ============================================================================

/// Every propose and every commit attempt emits exactly one decision event.
#[test]
fn one_decision_event_per_surface_call() {
    let store = InMemoryProposalStore::new();
    let sink = Arc::new(RecordingSink::default());
    let plane = plane_with_sink(&store, Arc::clone(&sink) as Arc<dyn DecisionSink>);
    plane.register_profile(ToolProfile::new("transfer_funds", Criticality::High));

    let response = plane.propose(&grounded_transfer_request(), Deadline::none()).unwrap();
    let ProposalResponse::Allow(allowed) = response else {
        panic!("expected allow");
    };
    let commit = CommitRequest {
        proposal_id: allowed.proposal_id,
        commit_token: Some(allowed.commit_token.unwrap()),
        args: args(json!({"amount": 100, "to": "acct_123"})),
    };
    plane.commit(&commit, Deadline::none()).unwrap();
    plane.commit(&commit, Deadline::none()).unwrap();

    let events = sink.events.lock().unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].event, "tool_proposal");
    assert_eq!(events[0].decision, "ALLOW");
    assert!(events[0].token_fingerprint.is_some());
    assert_eq!(events[1].event, "tool_commit");
    assert_eq!(events[1].reason, "ok");
    assert_eq!(events[2].reason, "nonce_replay");
}
