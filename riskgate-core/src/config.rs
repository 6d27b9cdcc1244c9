// riskgate-core/src/config.rs
// ============================================================================
// Module: riskgate Configuration
// Description: Process configuration for the control plane.
// Purpose: Load, default, and validate the gate's tunable surface.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! Configuration covers the signing secret, token TTL, risk weights and
//! thresholds, and the store backend selection. Files are TOML with every
//! field defaulted except the secret. Validation fails closed: a config that
//! parses but carries a weak secret or inconsistent thresholds is rejected
//! before any component is built.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::core::policy::PolicyConfig;
use crate::core::risk::RiskConfigError;
use crate::core::risk::RiskThresholds;
use crate::core::risk::RiskWeights;
use crate::runtime::token::MIN_SECRET_BYTES;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default token time-to-live in seconds.
const DEFAULT_TOKEN_TTL_SECS: u64 = 120;
/// Default MEDIUM-criticality review threshold.
const DEFAULT_MEDIUM_REVIEW_THRESHOLD: f64 = 0.50;

/// Returns the default token TTL in seconds.
const fn default_token_ttl_secs() -> u64 {
    DEFAULT_TOKEN_TTL_SECS
}

/// Returns the default MEDIUM review threshold.
const fn default_medium_review_threshold() -> f64 {
    DEFAULT_MEDIUM_REVIEW_THRESHOLD
}

// ============================================================================
// SECTION: Secret String
// ============================================================================

/// Configuration-held secret with a redacted `Debug` form.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    /// Creates a secret string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the secret bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString(redacted)")
    }
}

// ============================================================================
// SECTION: Store Backend
// ============================================================================

/// Store backend selection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum StoreBackend {
    /// In-memory backend for tests and development.
    Memory,
    /// Postgres backend with a connection string.
    Postgres {
        /// Connection string passed to the Postgres store.
        dsn: String,
    },
}

impl StoreBackend {
    /// Parses a backend selector of the form `memory` or `postgres+<dsn>`.
    ///
    /// # Errors
    ///
    /// Returns [`GateConfigError::InvalidBackend`] for unrecognized selectors.
    pub fn parse(value: &str) -> Result<Self, GateConfigError> {
        if value == "memory" {
            return Ok(Self::Memory);
        }
        if let Some(dsn) = value.strip_prefix("postgres+") {
            if dsn.is_empty() {
                return Err(GateConfigError::InvalidBackend(value.to_string()));
            }
            return Ok(Self::Postgres {
                dsn: dsn.to_string(),
            });
        }
        Err(GateConfigError::InvalidBackend(value.to_string()))
    }
}

impl TryFrom<String> for StoreBackend {
    type Error = GateConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl Default for StoreBackend {
    fn default() -> Self {
        Self::Memory
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum GateConfigError {
    /// Configuration file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// Configuration file could not be parsed.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Signing secret shorter than the required minimum.
    #[error("signing secret must be at least {min} bytes (got {actual})")]
    WeakSecret {
        /// Minimum required bytes.
        min: usize,
        /// Provided bytes.
        actual: usize,
    },
    /// Unrecognized store backend selector.
    #[error("invalid store backend: {0} (expected `memory` or `postgres+<dsn>`)")]
    InvalidBackend(String),
    /// Risk weight or threshold validation failed.
    #[error(transparent)]
    Risk(#[from] RiskConfigError),
    /// MEDIUM review threshold out of range.
    #[error("medium review threshold must be in (0, 1] (got {0})")]
    InvalidMediumThreshold(f64),
}

// ============================================================================
// SECTION: Gate Config
// ============================================================================

/// Process configuration for the control plane.
#[derive(Debug, Clone, Deserialize)]
pub struct GateConfig {
    /// Token signing secret; at least 32 bytes.
    pub signing_secret: SecretString,
    /// Token time-to-live in seconds.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
    /// Component risk weights.
    #[serde(default)]
    pub risk_weights: RiskWeights,
    /// Composite level thresholds; also drive the HIGH-criticality gates.
    #[serde(default)]
    pub risk_thresholds: RiskThresholds,
    /// MEDIUM-criticality review threshold.
    #[serde(default = "default_medium_review_threshold")]
    pub medium_review_threshold: f64,
    /// Store backend selection.
    #[serde(default)]
    pub store_backend: StoreBackend,
}

impl GateConfig {
    /// Creates a config with defaults around the given secret.
    #[must_use]
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            signing_secret: SecretString::new(secret),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            risk_weights: RiskWeights::default(),
            risk_thresholds: RiskThresholds::default(),
            medium_review_threshold: DEFAULT_MEDIUM_REVIEW_THRESHOLD,
            store_backend: StoreBackend::default(),
        }
    }

    /// Parses a TOML configuration string.
    ///
    /// # Errors
    ///
    /// Returns [`GateConfigError::Parse`] on malformed TOML and validation
    /// errors from [`GateConfig::validate`].
    pub fn from_toml_str(raw: &str) -> Result<Self, GateConfigError> {
        let config: Self =
            toml::from_str(raw).map_err(|err| GateConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`GateConfigError`] on read, parse, or validation failure.
    pub fn load(path: &Path) -> Result<Self, GateConfigError> {
        let raw = fs::read_to_string(path).map_err(|err| GateConfigError::Io(err.to_string()))?;
        Self::from_toml_str(&raw)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GateConfigError`] when any field is out of contract.
    pub fn validate(&self) -> Result<(), GateConfigError> {
        let secret_len = self.signing_secret.as_bytes().len();
        if secret_len < MIN_SECRET_BYTES {
            return Err(GateConfigError::WeakSecret {
                min: MIN_SECRET_BYTES,
                actual: secret_len,
            });
        }
        self.risk_weights.validate()?;
        self.risk_thresholds.validate()?;
        if !(self.medium_review_threshold > 0.0 && self.medium_review_threshold <= 1.0) {
            return Err(GateConfigError::InvalidMediumThreshold(self.medium_review_threshold));
        }
        Ok(())
    }

    /// Returns the token TTL as a duration.
    #[must_use]
    pub const fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    /// Builds the policy matrix thresholds from the risk thresholds.
    #[must_use]
    pub fn policy_config(&self) -> PolicyConfig {
        PolicyConfig {
            high_block_threshold: self.risk_thresholds.medium,
            high_review_threshold: self.risk_thresholds.low,
            medium_review_threshold: self.medium_review_threshold,
            ..PolicyConfig::default()
        }
    }
}
