// riskgate-store-postgres/src/lib.rs
// ============================================================================
// Module: riskgate Postgres Store Library
// Description: Public API surface for the Postgres proposal store.
// Purpose: Expose the durable backend and its configuration.
// Dependencies: crate::store
// ============================================================================

//! ## Overview
//! Durable `ProposalStore` backend for riskgate. Nonce replay protection is
//! enforced by the primary key on the `nonces` table; the commit success path
//! writes the nonce and commit record in a single transaction.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::PostgresProposalStore;
pub use store::PostgresStoreConfig;
pub use store::PostgresStoreError;

use riskgate_core::SharedProposalStore;

/// Builds a shared store wrapper around a Postgres backend.
///
/// # Errors
///
/// Returns [`PostgresStoreError`] when initialization fails.
pub fn shared_postgres_store(
    config: &PostgresStoreConfig,
) -> Result<SharedProposalStore, PostgresStoreError> {
    let store = PostgresProposalStore::new(config)?;
    Ok(SharedProposalStore::from_store(store))
}
