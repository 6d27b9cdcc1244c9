// riskgate-core/src/core/hashing.rs
// ============================================================================
// Module: riskgate Canonical Hashing
// Description: RFC 8785 JSON canonicalization, argument and prompt hashing.
// Purpose: Provide deterministic hashes binding tokens to arguments and prompts.
// Dependencies: regex, serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! riskgate hashes tool arguments over RFC 8785 (JCS) canonical JSON so the
//! digest is invariant to key ordering in the input, across processes and
//! platforms. Prompts are hashed both exactly and in a normalized form that
//! masks volatile literals (UUIDs, timestamps, numbers) so drift detection
//! compares prompt shape rather than prompt instance.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum canonical JSON size accepted for tool arguments.
pub const MAX_CANONICAL_ARGS_BYTES: usize = 256 * 1024;

#[allow(clippy::expect_used, reason = "Pattern is a compile-time constant.")]
static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .expect("uuid pattern compiles")
});

#[allow(clippy::expect_used, reason = "Pattern is a compile-time constant.")]
static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}-\d{2}-\d{2}[Tt ]\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:[Zz]|[+-]\d{2}:?\d{2})?")
        .expect("timestamp pattern compiles")
});

#[allow(clippy::expect_used, reason = "Pattern is a compile-time constant.")]
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?\d*\.?\d+").expect("number pattern compiles"));

#[allow(clippy::expect_used, reason = "Pattern is a compile-time constant.")]
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern compiles"));

// ============================================================================
// SECTION: Hash Algorithm
// ============================================================================

/// Supported hash algorithms for riskgate digests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// SHA-256 hashing.
    Sha256,
}

/// Default hash algorithm for riskgate.
pub const DEFAULT_HASH_ALGORITHM: HashAlgorithm = HashAlgorithm::Sha256;

/// Deterministic content hash representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashDigest {
    /// Hash algorithm identifier.
    pub algorithm: HashAlgorithm,
    /// Lowercase hex-encoded digest bytes.
    pub value: String,
}

impl HashDigest {
    /// Builds a digest record from raw hash output, hex-encoding it.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm, bytes: &[u8]) -> Self {
        let mut value = String::with_capacity(bytes.len() * 2);
        for byte in bytes {
            // Writing into a String cannot fail.
            let _ = write!(value, "{byte:02x}");
        }
        Self {
            algorithm,
            value,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when computing canonical hashes.
#[derive(Debug, Error)]
pub enum HashError {
    /// JSON canonicalization failed.
    #[error("failed to canonicalize json: {0}")]
    Canonicalization(String),
    /// Canonical JSON exceeds the configured size limit.
    #[error("canonical json exceeds size limit ({actual} > {limit})")]
    SizeLimitExceeded {
        /// Maximum allowed bytes.
        limit: usize,
        /// Observed size in bytes.
        actual: usize,
    },
}

// ============================================================================
// SECTION: Canonical JSON and Digests
// ============================================================================

/// Encodes a serializable value as RFC 8785 canonical JSON bytes.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when the value cannot be encoded.
pub fn canonical_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, HashError> {
    serde_jcs::to_vec(value).map_err(|err| HashError::Canonicalization(err.to_string()))
}

/// Encodes a value as canonical JSON, rejecting encodings over `max_bytes`.
///
/// The bound is enforced after encoding; canonical argument payloads are
/// capped well below the point where the intermediate buffer matters.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when the value cannot be encoded
/// and [`HashError::SizeLimitExceeded`] when the encoding is too large.
pub fn bounded_canonical_json<T: Serialize + ?Sized>(
    value: &T,
    max_bytes: usize,
) -> Result<Vec<u8>, HashError> {
    let bytes = canonical_json_bytes(value)?;
    if bytes.len() > max_bytes {
        return Err(HashError::SizeLimitExceeded {
            limit: max_bytes,
            actual: bytes.len(),
        });
    }
    Ok(bytes)
}

/// Hashes raw bytes with the given algorithm.
#[must_use]
pub fn hash_bytes(algorithm: HashAlgorithm, bytes: &[u8]) -> HashDigest {
    match algorithm {
        HashAlgorithm::Sha256 => HashDigest::new(algorithm, &Sha256::digest(bytes)),
    }
}

// ============================================================================
// SECTION: Argument and Prompt Hashing
// ============================================================================

/// Computes the canonical SHA-256 hex hash of tool arguments.
///
/// The digest is invariant to key ordering in the input, recursively.
///
/// # Errors
///
/// Returns [`HashError`] when the arguments cannot be canonicalized or exceed
/// the size limit.
pub fn canonical_args_hash<T: Serialize + ?Sized>(args: &T) -> Result<String, HashError> {
    let bytes = bounded_canonical_json(args, MAX_CANONICAL_ARGS_BYTES)?;
    Ok(hash_bytes(DEFAULT_HASH_ALGORITHM, &bytes).value)
}

/// Computes the SHA-256 hex hash of the exact prompt text.
#[must_use]
pub fn prompt_hash(prompt: &str) -> String {
    hash_bytes(DEFAULT_HASH_ALGORITHM, prompt.as_bytes()).value
}

/// Computes the SHA-256 hex hash of the normalized prompt text.
#[must_use]
pub fn normalized_prompt_hash(prompt: &str) -> String {
    hash_bytes(DEFAULT_HASH_ALGORITHM, normalize_prompt(prompt).as_bytes()).value
}

/// Normalizes prompt text for drift comparison.
///
/// Substitutes UUIDs, ISO-8601 timestamps, and numeric literals with stable
/// placeholders, collapses whitespace runs to single spaces, trims, and
/// lowercases.
#[must_use]
pub fn normalize_prompt(prompt: &str) -> String {
    let masked = UUID_RE.replace_all(prompt, "<uuid>");
    let masked = TIMESTAMP_RE.replace_all(&masked, "<timestamp>");
    let masked = NUMBER_RE.replace_all(&masked, "<number>");
    let collapsed = WHITESPACE_RE.replace_all(&masked, " ");
    collapsed.trim().to_lowercase()
}

/// Normalizes free text for token-set comparison.
///
/// Collapses whitespace, trims, and lowercases without masking literals.
#[must_use]
pub fn normalize_text(value: &str) -> String {
    WHITESPACE_RE.replace_all(value, " ").trim().to_lowercase()
}
