// riskgate-core/src/runtime/token.rs
// ============================================================================
// Module: riskgate Token Codec
// Description: HMAC-SHA256 signed execution tokens with expiry and nonce.
// Purpose: Bind an allowed proposal to its exact arguments for the commit step.
// Dependencies: base64, hmac, serde, sha2, subtle
// ============================================================================

//! ## Overview
//! An execution token is an internal, single-purpose capability: it proves
//! that a specific proposal was allowed for a specific tool and argument hash,
//! and it expires within minutes. The wire form is
//! `base64url(payload_json).base64url(signature)` with canonical (RFC 8785)
//! payload bytes. Signature comparison is constant time; any structural
//! deviation verifies as a bad signature. The signing secret lives only in
//! process configuration and is never persisted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::Hmac;
use hmac::Mac;
use serde::Deserialize;
use serde::Serialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::core::hashing::DEFAULT_HASH_ALGORITHM;
use crate::core::hashing::canonical_json_bytes;
use crate::core::hashing::hash_bytes;
use crate::core::identifiers::NonceValue;
use crate::core::identifiers::ProposalId;
use crate::core::identifiers::TokenId;
use crate::core::identifiers::ToolName;
use crate::core::time::Timestamp;

/// HMAC-SHA256 instantiation used for token signatures.
type HmacSha256 = Hmac<Sha256>;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Minimum accepted signing secret length in bytes.
pub const MIN_SECRET_BYTES: usize = 32;

/// Default token time-to-live.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(120);

// ============================================================================
// SECTION: Signing Secret
// ============================================================================

/// Process-lifetime signing secret.
///
/// # Invariants
/// - At least [`MIN_SECRET_BYTES`] bytes.
/// - Never serialized, persisted, or printed; `Debug` is redacted.
#[derive(Clone)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    /// Creates a signing secret from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::TooShort`] when fewer than
    /// [`MIN_SECRET_BYTES`] bytes are provided.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, SecretError> {
        let bytes = bytes.into();
        if bytes.len() < MIN_SECRET_BYTES {
            return Err(SecretError::TooShort {
                min: MIN_SECRET_BYTES,
                actual: bytes.len(),
            });
        }
        Ok(Self(bytes))
    }

    /// Returns the secret bytes for MAC computation.
    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(redacted)")
    }
}

/// Signing secret construction errors.
#[derive(Debug, Error)]
pub enum SecretError {
    /// The secret is shorter than the minimum.
    #[error("signing secret too short: {actual} bytes (min {min})")]
    TooShort {
        /// Minimum required bytes.
        min: usize,
        /// Provided bytes.
        actual: usize,
    },
}

// ============================================================================
// SECTION: Token Payload
// ============================================================================

/// Signed token payload; canonical JSON of this struct is the MAC input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenPayload {
    /// Token identifier.
    pub token_id: TokenId,
    /// Proposal the token authorizes.
    pub proposal_id: ProposalId,
    /// Tool the token is bound to.
    pub tool_name: ToolName,
    /// Canonical argument hash the token is bound to.
    pub tool_args_hash: String,
    /// Issue time.
    pub issued_at: Timestamp,
    /// Expiry time.
    pub expires_at: Timestamp,
    /// Single-use nonce.
    pub nonce: NonceValue,
    /// Composite score at issue time; absent when undefined.
    pub composite_score: Option<f64>,
}

/// Issued token: wire blob plus the payload it encodes.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionToken {
    /// URL-safe wire form presented at commit.
    pub blob: String,
    /// Decoded payload, mainly for audit fields.
    pub payload: TokenPayload,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Token issue errors.
#[derive(Debug, Error)]
pub enum TokenIssueError {
    /// Payload canonicalization failed.
    #[error("token payload canonicalization failed: {0}")]
    Canonicalize(String),
    /// MAC initialization failed.
    #[error("token mac initialization failed: {0}")]
    Mac(String),
}

/// Token verification failures, each with a distinct stable reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerifyFailure {
    /// Structure deviation or HMAC mismatch.
    #[error("bad_signature")]
    BadSignature,
    /// The token has expired.
    #[error("expired")]
    Expired,
    /// The token's tool name does not match the expected tool.
    #[error("tool_mismatch")]
    ToolMismatch,
    /// The token's argument hash does not match the presented arguments.
    #[error("args_hash_mismatch")]
    ArgsHashMismatch,
}

impl VerifyFailure {
    /// Returns the stable reason label.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::BadSignature => "bad_signature",
            Self::Expired => "expired",
            Self::ToolMismatch => "tool_mismatch",
            Self::ArgsHashMismatch => "args_hash_mismatch",
        }
    }
}

// ============================================================================
// SECTION: Codec
// ============================================================================

/// Issues and verifies HMAC-SHA256 execution tokens.
pub struct TokenCodec {
    /// Signing secret; read-only after construction.
    secret: SigningSecret,
    /// Default token time-to-live.
    ttl: Duration,
}

impl TokenCodec {
    /// Creates a codec with the given secret and default TTL.
    #[must_use]
    pub const fn new(secret: SigningSecret, ttl: Duration) -> Self {
        Self {
            secret,
            ttl,
        }
    }

    /// Returns the default token TTL.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for an allowed proposal using the default TTL.
    ///
    /// # Errors
    ///
    /// Returns [`TokenIssueError`] when the payload cannot be signed.
    pub fn issue(
        &self,
        proposal_id: &ProposalId,
        tool_name: &ToolName,
        tool_args_hash: &str,
        composite_score: Option<f64>,
    ) -> Result<ExecutionToken, TokenIssueError> {
        self.issue_with_ttl(proposal_id, tool_name, tool_args_hash, composite_score, self.ttl)
    }

    /// Issues a token with an explicit TTL.
    ///
    /// # Errors
    ///
    /// Returns [`TokenIssueError`] when the payload cannot be signed.
    pub fn issue_with_ttl(
        &self,
        proposal_id: &ProposalId,
        tool_name: &ToolName,
        tool_args_hash: &str,
        composite_score: Option<f64>,
        ttl: Duration,
    ) -> Result<ExecutionToken, TokenIssueError> {
        let issued_at = Timestamp::now();
        let payload = TokenPayload {
            token_id: TokenId::generate(),
            proposal_id: proposal_id.clone(),
            tool_name: tool_name.clone(),
            tool_args_hash: tool_args_hash.to_string(),
            issued_at,
            expires_at: issued_at.saturating_add(ttl),
            nonce: NonceValue::generate(),
            composite_score,
        };
        let payload_bytes = canonical_json_bytes(&payload)
            .map_err(|err| TokenIssueError::Canonicalize(err.to_string()))?;
        let signature = self.sign(&payload_bytes)?;
        let blob = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload_bytes),
            URL_SAFE_NO_PAD.encode(signature)
        );
        Ok(ExecutionToken {
            blob,
            payload,
        })
    }

    /// Verifies a token blob against the expected tool and argument hash.
    ///
    /// Signature comparison is constant time. The nonce is NOT consumed here;
    /// that is the verifier's atomic responsibility.
    ///
    /// # Errors
    ///
    /// Returns a [`VerifyFailure`] naming the first failed check.
    pub fn verify(
        &self,
        blob: &str,
        expected_tool: &ToolName,
        expected_args_hash: &str,
        now: Timestamp,
    ) -> Result<TokenPayload, VerifyFailure> {
        let (payload_b64, signature_b64) =
            blob.split_once('.').ok_or(VerifyFailure::BadSignature)?;
        let payload_bytes =
            URL_SAFE_NO_PAD.decode(payload_b64).map_err(|_| VerifyFailure::BadSignature)?;
        let signature =
            URL_SAFE_NO_PAD.decode(signature_b64).map_err(|_| VerifyFailure::BadSignature)?;

        let expected = self.sign(&payload_bytes).map_err(|_| VerifyFailure::BadSignature)?;
        let matches: bool = expected.ct_eq(signature.as_slice()).into();
        if !matches {
            return Err(VerifyFailure::BadSignature);
        }

        let payload: TokenPayload =
            serde_json::from_slice(&payload_bytes).map_err(|_| VerifyFailure::BadSignature)?;

        if !now.is_before(payload.expires_at) {
            return Err(VerifyFailure::Expired);
        }
        if payload.tool_name != *expected_tool {
            return Err(VerifyFailure::ToolMismatch);
        }
        if payload.tool_args_hash != expected_args_hash {
            return Err(VerifyFailure::ArgsHashMismatch);
        }
        Ok(payload)
    }

    /// Computes the HMAC-SHA256 signature over payload bytes.
    fn sign(&self, payload_bytes: &[u8]) -> Result<Vec<u8>, TokenIssueError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|err| TokenIssueError::Mac(err.to_string()))?;
        mac.update(payload_bytes);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

// ============================================================================
// SECTION: Fingerprinting
// ============================================================================

/// Returns the SHA-256 fingerprint of a token blob for audit records.
///
/// The fingerprint identifies a token in logs without reproducing a usable
/// capability.
#[must_use]
pub fn token_fingerprint(blob: &str) -> String {
    hash_bytes(DEFAULT_HASH_ALGORITHM, blob.as_bytes()).value
}
