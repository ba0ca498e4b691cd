//! Session registry (port)
//!
//! Owns every session record and the staged file pair of each session.
//! Implementations must be safe under concurrent use and must never let a
//! sweep interleave with staging or retrieval.

use async_trait::async_trait;

use gerber_shared::SessionId;

use crate::domain::{FilePair, Session};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// Return the live session for `id`, touching it when it is past the refresh
    /// threshold, or allocate a brand-new session.
    async fn get_or_create(&self, id: Option<SessionId>) -> Session;

    /// Touch a live session when it is past the refresh threshold. `None` when
    /// `id` is not live. Never allocates.
    async fn touch(&self, id: SessionId) -> Option<Session>;

    /// Pure lookup.
    async fn is_valid(&self, id: SessionId) -> Option<Session>;

    /// Fails with [`DomainError::NoSuchSession`] when `id` is not live.
    async fn stage_files(&self, id: SessionId, files: FilePair) -> Result<(), DomainError>;

    /// `Ok(None)` when the session or its file does not exist.
    async fn retrieve_files(&self, id: SessionId) -> Result<Option<FilePair>, DomainError>;

    /// Idempotent.
    async fn clear_files(&self, id: SessionId) -> Result<(), DomainError>;
}
