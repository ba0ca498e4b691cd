//! File pairs staged against the session a bearer token is bound to

use std::sync::Arc;

use tracing::{debug, warn};

use gerber_shared::SessionId;

use crate::domain::FilePair;
use crate::error::DomainError;
use crate::repositories::SessionRegistry;

pub struct SessionFileService {
    sessions: Arc<dyn SessionRegistry>,
}

impl SessionFileService {
    pub fn new(sessions: Arc<dyn SessionRegistry>) -> Self {
        Self { sessions }
    }

    pub async fn stage_session_files(&self, session_id: SessionId, files: FilePair) -> Result<(), DomainError> {
        debug!(
            "Staging {} + {} bytes for session {}",
            files.file1.len(),
            files.file2.len(),
            session_id
        );
        self.sessions.stage_files(session_id, files).await.map_err(|e| {
            warn!("Staging for session {} failed: {}", session_id, e);
            e
        })
    }

    /// [`DomainError::NoSuchSession`] when nothing is staged or the session is gone.
    pub async fn fetch_session_files(&self, session_id: SessionId) -> Result<FilePair, DomainError> {
        self.sessions
            .retrieve_files(session_id)
            .await?
            .ok_or(DomainError::NoSuchSession)
    }

    pub async fn clear_session_files(&self, session_id: SessionId) -> Result<(), DomainError> {
        self.sessions.clear_files(session_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MockSessionRegistry;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_fetch_missing_pair_is_no_such_session() {
        let mut sessions = MockSessionRegistry::new();
        sessions.expect_retrieve_files().returning(|_| Ok(None));

        let svc = SessionFileService::new(Arc::new(sessions));
        assert_eq!(
            svc.fetch_session_files(Uuid::new_v4()).await,
            Err(DomainError::NoSuchSession)
        );
    }

    #[tokio::test]
    async fn test_stage_failure_is_propagated() {
        let mut sessions = MockSessionRegistry::new();
        sessions
            .expect_stage_files()
            .returning(|_, _| Err(DomainError::NoSuchSession));

        let svc = SessionFileService::new(Arc::new(sessions));
        let result = svc
            .stage_session_files(Uuid::new_v4(), FilePair::new(vec![1u8], vec![2u8]))
            .await;
        assert_eq!(result, Err(DomainError::NoSuchSession));
    }
}
