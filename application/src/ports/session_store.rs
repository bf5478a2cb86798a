//! Session store port
//!
//! Persistence contract for the session collection: load once at startup,
//! replace the whole snapshot after every mutation.

use async_trait::async_trait;
use palaver_domain::SessionCollection;
use thiserror::Error;

/// Errors from writing the session snapshot.
///
/// Corruption on load is deliberately not an error: the store recovers
/// locally by dropping bad entries.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to serialize sessions: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write sessions: {0}")]
    Write(#[from] std::io::Error),
}

/// Store for the persisted session collection.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Reconstruct the collection from persisted state.
    ///
    /// Fails soft: a missing or unreadable snapshot yields an empty
    /// collection, and individually corrupt entries are dropped rather
    /// than aborting the whole load. The caller bootstraps a default
    /// session when the result is empty.
    async fn load(&self) -> SessionCollection;

    /// Replace the persisted snapshot with `collection`.
    ///
    /// Whole-snapshot semantics: a crash between mutation and save must
    /// never leave a truncated document. Awaited to completion before the
    /// mutating operation's caller is considered done.
    async fn save(&self, collection: &SessionCollection) -> Result<(), StoreError>;
}
