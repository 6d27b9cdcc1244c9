// riskgate-core/tests/token.rs
// ============================================================================
// Module: Token Codec Tests
// Description: Tests for HMAC-signed execution token issue and verification.
// ============================================================================
//! ## Overview
//! Validates the round trip, expiry, binding checks, and that any single-bit
//! mutation of the wire blob verifies as a bad signature.

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

use std::thread;
use std::time::Duration;

use riskgate_core::ProposalId;
use riskgate_core::SigningSecret;
use riskgate_core::Timestamp;
use riskgate_core::TokenCodec;
use riskgate_core::ToolName;
use riskgate_core::VerifyFailure;
use riskgate_core::runtime::token_fingerprint;

fn codec() -> TokenCodec {
    let secret = SigningSecret::from_bytes("k".repeat(32).into_bytes()).unwrap();
    TokenCodec::new(secret, Duration::from_secs(60))
}

fn issue_default(codec: &TokenCodec) -> riskgate_core::ExecutionToken {
    codec
        .issue(&ProposalId::new("p1"), &ToolName::new("transfer_funds"), "abc123", Some(0.2))
        .unwrap()
}

// ============================================================================
// SECTION: Round Trip
// ============================================================================

/// Verifies issue then verify succeeds with matching tool and args.
#[test]
fn verify_accepts_freshly_issued_token() {
    let codec = codec();
    let token = issue_default(&codec);

    let payload = codec
        .verify(&token.blob, &ToolName::new("transfer_funds"), "abc123", Timestamp::now())
        .unwrap();
    assert_eq!(payload.proposal_id.as_str(), "p1");
    assert_eq!(payload, token.payload);
}

/// Verifies the wire form is two URL-safe base64 segments.
#[test]
fn wire_form_is_dot_separated_base64url() {
    let codec = codec();
    let token = issue_default(&codec);

    let mut parts = token.blob.split('.');
    let payload = parts.next().unwrap();
    let signature = parts.next().unwrap();
    assert!(parts.next().is_none());
    for segment in [payload, signature] {
        assert!(!segment.is_empty());
        assert!(
            segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }
}

/// Verifies issued identifiers and nonces are unique per token.
#[test]
fn issued_tokens_carry_fresh_nonces() {
    let codec = codec();
    let a = issue_default(&codec);
    let b = issue_default(&codec);

    assert_ne!(a.payload.token_id, b.payload.token_id);
    assert_ne!(a.payload.nonce, b.payload.nonce);
}

// ============================================================================
// SECTION: Rejections
// ============================================================================

/// Verifies a wrong-secret codec rejects the signature.
#[test]
fn verify_rejects_foreign_secret() {
    let issuing = codec();
    let token = issue_default(&issuing);

    let other_secret = SigningSecret::from_bytes("x".repeat(32).into_bytes()).unwrap();
    let other = TokenCodec::new(other_secret, Duration::from_secs(60));
    let result =
        other.verify(&token.blob, &ToolName::new("transfer_funds"), "abc123", Timestamp::now());
    assert_eq!(result.unwrap_err(), VerifyFailure::BadSignature);
}

/// Verifies every single-bit mutation of the blob fails as a bad signature.
#[test]
fn any_single_bit_mutation_is_a_bad_signature() {
    let codec = codec();
    let token = issue_default(&codec);
    let bytes = token.blob.as_bytes();

    // Walk a spread of positions covering payload, separator, and signature.
    for index in (0..bytes.len()).step_by(7) {
        let mut mutated = bytes.to_vec();
        mutated[index] ^= 0x01;
        let Ok(blob) = String::from_utf8(mutated) else {
            continue;
        };
        if blob == token.blob {
            continue;
        }
        let result =
            codec.verify(&blob, &ToolName::new("transfer_funds"), "abc123", Timestamp::now());
        assert_eq!(result.unwrap_err(), VerifyFailure::BadSignature, "index {index}");
    }
}

/// Verifies structural deviations are rejected as bad signatures.
#[test]
fn malformed_blobs_are_bad_signatures() {
    let codec = codec();
    for blob in ["", "no-separator", "only.", ".only", "a.b.c", "!!!.???"] {
        let result =
            codec.verify(blob, &ToolName::new("transfer_funds"), "abc123", Timestamp::now());
        assert_eq!(result.unwrap_err(), VerifyFailure::BadSignature, "blob {blob:?}");
    }
}

/// Verifies an expired token is rejected with its own reason.
#[test]
fn expired_token_is_rejected() {
    let codec = codec();
    let token = codec
        .issue_with_ttl(
            &ProposalId::new("p1"),
            &ToolName::new("transfer_funds"),
            "abc123",
            Some(0.2),
            Duration::from_millis(1),
        )
        .unwrap();
    thread::sleep(Duration::from_millis(10));

    let result =
        codec.verify(&token.blob, &ToolName::new("transfer_funds"), "abc123", Timestamp::now());
    assert_eq!(result.unwrap_err(), VerifyFailure::Expired);
}

/// Verifies the tool binding check has its own reason.
#[test]
fn tool_mismatch_is_rejected() {
    let codec = codec();
    let token = issue_default(&codec);

    let result =
        codec.verify(&token.blob, &ToolName::new("delete_account"), "abc123", Timestamp::now());
    assert_eq!(result.unwrap_err(), VerifyFailure::ToolMismatch);
}

/// Verifies the argument binding check has its own reason.
#[test]
fn args_hash_mismatch_is_rejected() {
    let codec = codec();
    let token = issue_default(&codec);

    let result = codec.verify(
        &token.blob,
        &ToolName::new("transfer_funds"),
        "tampered-hash",
        Timestamp::now(),
    );
    assert_eq!(result.unwrap_err(), VerifyFailure::ArgsHashMismatch);
}

// ============================================================================
// SECTION: Fingerprint
// ============================================================================

/// Verifies fingerprints are stable and never reproduce the blob.
#[test]
fn fingerprint_is_stable_and_opaque() {
    let codec = codec();
    let token = issue_default(&codec);

    let a = token_fingerprint(&token.blob);
    let b = token_fingerprint(&token.blob);
    assert_eq!(a, b);
    assert_eq!(a.len(), 64);
    assert_ne!(a, token.blob);
}
