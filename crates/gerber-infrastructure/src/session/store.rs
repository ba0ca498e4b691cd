// ============================================================================
// Gerber Infrastructure - Session Store
// File: crates/gerber-infrastructure/src/session/store.rs
// ============================================================================
//! Session registry with per-session file staging and a background sweeper.
//!
//! Lock discipline:
//! - `gate` read side: lookup, create, stage, retrieve and clear. These run
//!   concurrently with each other.
//! - `gate` write side: one sweep pass, start to finish.
//! - per-session `staging` mutex: serializes staging I/O on one record file.
//!
//! A session is live while it has a record. Expired records stay live until
//! the next sweep, so a session may outlive the timeout by up to one sweep
//! interval.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock};
use tokio::time::sleep;
use tracing::{debug, error, info};

use gerber_core::repositories::SessionRegistry;
use gerber_core::{DomainError, FilePair, Session};
use gerber_shared::config::SessionSettings;
use gerber_shared::{new_session_id, Clock, SessionId};

use crate::staging::FileStaging;

struct SessionRecord {
    session: Session,
    staging: Arc<Mutex<()>>,
}

impl SessionRecord {
    fn new(session: Session) -> Self {
        Self {
            session,
            staging: Arc::new(Mutex::new(())),
        }
    }
}

pub struct SessionStore {
    records: DashMap<SessionId, SessionRecord>,
    gate: RwLock<()>,
    files: FileStaging,
    clock: Arc<dyn Clock>,
    timeout: Duration,
    refresh_after: Duration,
    sweep_interval: std::time::Duration,
}

impl SessionStore {
    pub fn new(settings: &SessionSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: DashMap::new(),
            gate: RwLock::new(()),
            files: FileStaging::new(settings.staging_path()),
            clock,
            timeout: Duration::seconds(settings.timeout_seconds as i64),
            refresh_after: Duration::seconds(settings.refresh_after_seconds as i64),
            sweep_interval: settings.sweep_interval(),
        }
    }

    pub fn files(&self) -> &FileStaging {
        &self.files
    }

    pub fn live_count(&self) -> usize {
        self.records.len()
    }

    /// Remove every session older than the timeout together with its staged
    /// record. Returns the number of sessions removed.
    pub async fn sweep(&self) -> usize {
        let _exclusive = self.gate.write().await;
        let now = self.clock.now();

        let expired: Vec<SessionId> = self
            .records
            .iter()
            .filter(|r| r.session.is_older_than(now, self.timeout))
            .map(|r| *r.key())
            .collect();

        for id in &expired {
            // file before record
            if let Err(e) = self.files.remove(*id).await {
                error!("Failed to delete staged files of expired session {}: {}", id, e);
            }
            self.records.remove(id);
        }

        if !expired.is_empty() {
            info!("Swept {} expired sessions, {} remain", expired.len(), self.records.len());
        }
        expired.len()
    }

    /// Sweep forever at the configured interval.
    pub async fn run_sweeper(self: Arc<Self>) {
        info!("Session sweeper started: interval={:?}, timeout={}s", self.sweep_interval, self.timeout.num_seconds());
        loop {
            sleep(self.sweep_interval).await;
            let removed = self.sweep().await;
            debug!("Sweep pass removed {} sessions", removed);
        }
    }

    fn allocate(&self) -> Session {
        let now = self.clock.now();
        loop {
            let id = new_session_id();
            if let Entry::Vacant(slot) = self.records.entry(id) {
                let session = Session::new(id, now);
                slot.insert(SessionRecord::new(session));
                debug!("Created session {}", id);
                return session;
            }
        }
    }

    /// Caller holds the gate.
    fn touch_live(&self, id: SessionId) -> Option<Session> {
        let mut record = self.records.get_mut(&id)?;
        let now = self.clock.now();
        if record.session.age(now) > self.refresh_after {
            record.session.last_touched = now;
            debug!("Refreshed session {}", id);
        }
        Some(record.session)
    }

    fn staging_lock(&self, id: SessionId) -> Option<Arc<Mutex<()>>> {
        self.records.get(&id).map(|r| r.staging.clone())
    }
}

#[async_trait]
impl SessionRegistry for SessionStore {
    async fn get_or_create(&self, id: Option<SessionId>) -> Session {
        let _shared = self.gate.read().await;

        if let Some(session) = id.and_then(|id| self.touch_live(id)) {
            return session;
        }
        self.allocate()
    }

    async fn touch(&self, id: SessionId) -> Option<Session> {
        let _shared = self.gate.read().await;
        self.touch_live(id)
    }

    async fn is_valid(&self, id: SessionId) -> Option<Session> {
        let _shared = self.gate.read().await;
        self.records.get(&id).map(|r| r.session)
    }

    async fn stage_files(&self, id: SessionId, files: FilePair) -> Result<(), DomainError> {
        let _shared = self.gate.read().await;
        let lock = self.staging_lock(id).ok_or(DomainError::NoSuchSession)?;
        let _staging = lock.lock().await;

        self.files.write(id, &files).await?;
        Ok(())
    }

    async fn retrieve_files(&self, id: SessionId) -> Result<Option<FilePair>, DomainError> {
        let _shared = self.gate.read().await;
        let Some(lock) = self.staging_lock(id) else {
            return Ok(None);
        };
        let _staging = lock.lock().await;

        Ok(self.files.read(id).await?)
    }

    async fn clear_files(&self, id: SessionId) -> Result<(), DomainError> {
        let _shared = self.gate.read().await;
        let lock = self.staging_lock(id);
        let _staging = match &lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        Ok(self.files.remove(id).await?)
    }
}
