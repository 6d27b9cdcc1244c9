// riskgate-core/src/interfaces/mod.rs
// ============================================================================
// Module: riskgate Store Interfaces
// Description: Backend-agnostic persistence contract for proposals and nonces.
// Purpose: Define the storage surface the proposer and verifier depend on.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The proposal store persists proposals, commit records, consumed nonces,
//! and prompt baselines. Implementations must make `consume_nonce` atomic
//! with respect to concurrent commits: the row either inserts or the call
//! reports the existing row untouched. Deadlines fail closed; an expired
//! deadline must not leave partial state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::core::identifiers::ProposalId;
use crate::core::identifiers::ToolName;
use crate::core::records::CommitRecord;
use crate::core::records::NonceRecord;
use crate::core::records::Proposal;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Deadline
// ============================================================================

/// Wall-clock cutoff for one storage call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Deadline {
    /// Cutoff instant; `None` means unbounded.
    cutoff: Option<Timestamp>,
}

impl Deadline {
    /// Returns an unbounded deadline.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            cutoff: None,
        }
    }

    /// Returns a deadline at the given instant.
    #[must_use]
    pub const fn at(cutoff: Timestamp) -> Self {
        Self {
            cutoff: Some(cutoff),
        }
    }

    /// Returns a deadline the given duration from now.
    #[must_use]
    pub fn within(budget: Duration) -> Self {
        Self::at(Timestamp::now().saturating_add(budget))
    }

    /// Fails when the deadline has passed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when `now` is at or past the cutoff.
    pub fn check(&self, now: Timestamp) -> Result<(), StoreError> {
        match self.cutoff {
            Some(cutoff) if !now.is_before(cutoff) => {
                Err(StoreError::Unavailable("storage deadline exceeded".to_string()))
            }
            _ => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Proposal store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transient backend failure; the caller decides retry policy.
    #[error("proposal store unavailable: {0}")]
    Unavailable(String),
    /// Store I/O error.
    #[error("proposal store io error: {0}")]
    Io(String),
    /// A row conflicts with an existing unique key.
    #[error("proposal store conflict: {0}")]
    Conflict(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("proposal store corruption: {0}")]
    Corrupt(String),
    /// Store data is invalid.
    #[error("proposal store invalid data: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Nonce Consumption
// ============================================================================

/// Outcome of an atomic nonce insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceConsume {
    /// The nonce row was inserted; this commit wins.
    Inserted,
    /// The nonce row already existed; the token was replayed.
    AlreadyExists,
}

// ============================================================================
// SECTION: Proposal Store
// ============================================================================

/// Backend-agnostic store for proposals, commits, nonces, and baselines.
pub trait ProposalStore: Send + Sync {
    /// Inserts a proposal row. `proposal_id` is unique.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] on a duplicate proposal identifier and
    /// [`StoreError`] on backend failure.
    fn put_proposal(&self, proposal: &Proposal, deadline: Deadline) -> Result<(), StoreError>;

    /// Fetches a proposal by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on backend failure.
    fn get_proposal(
        &self,
        proposal_id: &ProposalId,
        deadline: Deadline,
    ) -> Result<Option<Proposal>, StoreError>;

    /// Appends a commit record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on backend failure.
    fn put_commit(&self, record: &CommitRecord, deadline: Deadline) -> Result<(), StoreError>;

    /// Atomically inserts a nonce row, reporting an existing row untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on backend failure.
    fn consume_nonce(
        &self,
        nonce: &NonceRecord,
        deadline: Deadline,
    ) -> Result<NonceConsume, StoreError>;

    /// Commit success path: inserts the nonce and writes the commit record in
    /// one transaction (or one mutex region). On [`NonceConsume::AlreadyExists`]
    /// nothing is written.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on backend failure.
    fn finalize_commit(
        &self,
        record: &CommitRecord,
        nonce: &NonceRecord,
        deadline: Deadline,
    ) -> Result<NonceConsume, StoreError>;

    /// Deletes nonce rows expired at `now`; idempotent. Returns rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on backend failure.
    fn purge_expired_nonces(&self, now: Timestamp, deadline: Deadline)
    -> Result<u64, StoreError>;

    /// Fetches the baseline normalized prompt hash for a tool.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on backend failure.
    fn get_prompt_baseline(
        &self,
        tool_name: &ToolName,
        deadline: Deadline,
    ) -> Result<Option<String>, StoreError>;

    /// Upserts the baseline normalized prompt hash for a tool. Administrative.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on backend failure.
    fn set_prompt_baseline(
        &self,
        tool_name: &ToolName,
        prompt_hash: &str,
        deadline: Deadline,
    ) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Shared Store Wrapper
// ============================================================================

/// Shared proposal store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedProposalStore {
    /// Inner store implementation.
    inner: Arc<dyn ProposalStore>,
}

impl SharedProposalStore {
    /// Wraps a proposal store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl ProposalStore + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(store: Arc<dyn ProposalStore>) -> Self {
        Self {
            inner: store,
        }
    }
}

impl ProposalStore for SharedProposalStore {
    fn put_proposal(&self, proposal: &Proposal, deadline: Deadline) -> Result<(), StoreError> {
        self.inner.put_proposal(proposal, deadline)
    }

    fn get_proposal(
        &self,
        proposal_id: &ProposalId,
        deadline: Deadline,
    ) -> Result<Option<Proposal>, StoreError> {
        self.inner.get_proposal(proposal_id, deadline)
    }

    fn put_commit(&self, record: &CommitRecord, deadline: Deadline) -> Result<(), StoreError> {
        self.inner.put_commit(record, deadline)
    }

    fn consume_nonce(
        &self,
        nonce: &NonceRecord,
        deadline: Deadline,
    ) -> Result<NonceConsume, StoreError> {
        self.inner.consume_nonce(nonce, deadline)
    }

    fn finalize_commit(
        &self,
        record: &CommitRecord,
        nonce: &NonceRecord,
        deadline: Deadline,
    ) -> Result<NonceConsume, StoreError> {
        self.inner.finalize_commit(record, nonce, deadline)
    }

    fn purge_expired_nonces(
        &self,
        now: Timestamp,
        deadline: Deadline,
    ) -> Result<u64, StoreError> {
        self.inner.purge_expired_nonces(now, deadline)
    }

    fn get_prompt_baseline(
        &self,
        tool_name: &ToolName,
        deadline: Deadline,
    ) -> Result<Option<String>, StoreError> {
        self.inner.get_prompt_baseline(tool_name, deadline)
    }

    fn set_prompt_baseline(
        &self,
        tool_name: &ToolName,
        prompt_hash: &str,
        deadline: Deadline,
    ) -> Result<(), StoreError> {
        self.inner.set_prompt_baseline(tool_name, prompt_hash, deadline)
    }
}
