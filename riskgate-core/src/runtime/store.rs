// riskgate-core/src/runtime/store.rs
// ============================================================================
// Module: riskgate In-Memory Store
// Description: Mutex-guarded proposal store for tests and development.
// Purpose: Provide the full store contract without external dependencies.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The in-memory backend guards its tables (proposals, commits, nonces,
//! baselines) with a single mutex; critical sections are short. Nonce
//! consumption and the commit success path run inside one lock acquisition,
//! which makes them atomic with respect to concurrent commits.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::identifiers::NonceValue;
use crate::core::identifiers::ProposalId;
use crate::core::identifiers::ToolName;
use crate::core::records::CommitRecord;
use crate::core::records::NonceRecord;
use crate::core::records::Proposal;
use crate::core::time::Timestamp;
use crate::interfaces::Deadline;
use crate::interfaces::NonceConsume;
use crate::interfaces::ProposalStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Tables
// ============================================================================

/// Mutable tables guarded by the store mutex.
#[derive(Debug, Default)]
struct Tables {
    /// Proposals by identifier.
    proposals: BTreeMap<String, Proposal>,
    /// Append-only commit records.
    commits: Vec<CommitRecord>,
    /// Consumed nonces.
    nonces: BTreeMap<NonceValue, NonceRecord>,
    /// Prompt baselines by tool name.
    baselines: BTreeMap<ToolName, String>,
}

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory proposal store for tests and development.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProposalStore {
    /// Tables protected by a single mutex.
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryProposalStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all commit records, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store mutex is poisoned.
    pub fn commit_records(&self) -> Result<Vec<CommitRecord>, StoreError> {
        Ok(self.lock()?.commits.clone())
    }

    /// Returns the commit records targeting one proposal, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store mutex is poisoned.
    pub fn commit_records_for(
        &self,
        proposal_id: &ProposalId,
    ) -> Result<Vec<CommitRecord>, StoreError> {
        Ok(self
            .lock()?
            .commits
            .iter()
            .filter(|record| record.proposal_id == *proposal_id)
            .cloned()
            .collect())
    }

    /// Returns the number of live nonce rows.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store mutex is poisoned.
    pub fn nonce_count(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.nonces.len())
    }

    /// Acquires the table lock.
    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Io("proposal store mutex poisoned".to_string()))
    }
}

impl ProposalStore for InMemoryProposalStore {
    fn put_proposal(&self, proposal: &Proposal, deadline: Deadline) -> Result<(), StoreError> {
        deadline.check(Timestamp::now())?;
        let mut tables = self.lock()?;
        let key = proposal.proposal_id.as_str().to_string();
        if tables.proposals.contains_key(&key) {
            return Err(StoreError::Conflict(format!("proposal {key} already exists")));
        }
        tables.proposals.insert(key, proposal.clone());
        Ok(())
    }

    fn get_proposal(
        &self,
        proposal_id: &ProposalId,
        deadline: Deadline,
    ) -> Result<Option<Proposal>, StoreError> {
        deadline.check(Timestamp::now())?;
        Ok(self.lock()?.proposals.get(proposal_id.as_str()).cloned())
    }

    fn put_commit(&self, record: &CommitRecord, deadline: Deadline) -> Result<(), StoreError> {
        deadline.check(Timestamp::now())?;
        let mut tables = self.lock()?;
        if tables.commits.iter().any(|existing| existing.commit_id == record.commit_id) {
            return Err(StoreError::Conflict(format!(
                "commit {} already exists",
                record.commit_id.as_str()
            )));
        }
        tables.commits.push(record.clone());
        Ok(())
    }

    fn consume_nonce(
        &self,
        nonce: &NonceRecord,
        deadline: Deadline,
    ) -> Result<NonceConsume, StoreError> {
        deadline.check(Timestamp::now())?;
        let mut tables = self.lock()?;
        if tables.nonces.contains_key(&nonce.nonce) {
            return Ok(NonceConsume::AlreadyExists);
        }
        tables.nonces.insert(nonce.nonce.clone(), nonce.clone());
        Ok(NonceConsume::Inserted)
    }

    fn finalize_commit(
        &self,
        record: &CommitRecord,
        nonce: &NonceRecord,
        deadline: Deadline,
    ) -> Result<NonceConsume, StoreError> {
        deadline.check(Timestamp::now())?;
        let mut tables = self.lock()?;
        if tables.nonces.contains_key(&nonce.nonce) {
            return Ok(NonceConsume::AlreadyExists);
        }
        tables.nonces.insert(nonce.nonce.clone(), nonce.clone());
        tables.commits.push(record.clone());
        Ok(NonceConsume::Inserted)
    }

    fn purge_expired_nonces(
        &self,
        now: Timestamp,
        deadline: Deadline,
    ) -> Result<u64, StoreError> {
        deadline.check(Timestamp::now())?;
        let mut tables = self.lock()?;
        let before = tables.nonces.len();
        tables.nonces.retain(|_, record| now.is_before(record.expires_at));
        Ok(u64::try_from(before - tables.nonces.len()).unwrap_or(u64::MAX))
    }

    fn get_prompt_baseline(
        &self,
        tool_name: &ToolName,
        deadline: Deadline,
    ) -> Result<Option<String>, StoreError> {
        deadline.check(Timestamp::now())?;
        Ok(self.lock()?.baselines.get(tool_name).cloned())
    }

    fn set_prompt_baseline(
        &self,
        tool_name: &ToolName,
        prompt_hash: &str,
        deadline: Deadline,
    ) -> Result<(), StoreError> {
        deadline.check(Timestamp::now())?;
        self.lock()?.baselines.insert(tool_name.clone(), prompt_hash.to_string());
        Ok(())
    }
}
