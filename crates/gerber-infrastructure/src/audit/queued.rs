// ============================================================================
// Gerber Infrastructure - Queued Audit Log
// File: crates/gerber-infrastructure/src/audit/queued.rs
// ============================================================================
//! Fire-and-forget audit sink.
//!
//! Callers enqueue onto a bounded channel and never wait. A background worker
//! drains the queue, emits each entry as a `tracing` event under the `audit`
//! target and keeps the most recent entries in memory for diagnostics.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use flume::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{error, info, warn};

use gerber_core::repositories::AuditSink;
use gerber_shared::config::AuditSettings;
use gerber_shared::Clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AuditKind {
    Error,
    UserAction,
    ClientError,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub kind: AuditKind,
    pub user_id: Option<String>,
    pub message: String,
    pub recorded_at: DateTime<Utc>,
}

type History = Arc<Mutex<VecDeque<AuditEntry>>>;

#[derive(Clone)]
pub struct QueuedAuditLog {
    sender: Sender<AuditEntry>,
    history: History,
    clock: Arc<dyn Clock>,
}

impl QueuedAuditLog {
    /// Must be called from within a tokio runtime; spawns the drain worker.
    pub fn new(settings: &AuditSettings, clock: Arc<dyn Clock>) -> Self {
        let (sender, receiver) = bounded(settings.queue_capacity);
        let history: History = Arc::new(Mutex::new(VecDeque::with_capacity(settings.retained_entries)));

        info!(
            "Initializing audit log: queue={}, retained={}",
            settings.queue_capacity, settings.retained_entries
        );

        let retained = settings.retained_entries;
        let worker_history = history.clone();
        tokio::spawn(async move {
            Self::worker_loop(receiver, worker_history, retained).await;
        });

        Self {
            sender,
            history,
            clock,
        }
    }

    /// Retained entries attributed to `user_id`, oldest first.
    pub fn history_for(&self, user_id: &str) -> Vec<AuditEntry> {
        self.history
            .lock()
            .iter()
            .filter(|e| e.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect()
    }

    fn enqueue(&self, kind: AuditKind, message: &str, user_id: Option<&str>) {
        let entry = AuditEntry {
            kind,
            user_id: user_id.map(str::to_string),
            message: message.to_string(),
            recorded_at: self.clock.now(),
        };

        if let Err(e) = self.sender.try_send(entry) {
            warn!("Failed to enqueue audit entry (queue full?): {}", e);
        }
    }

    async fn worker_loop(receiver: Receiver<AuditEntry>, history: History, retained: usize) {
        while let Ok(entry) = receiver.recv_async().await {
            match entry.kind {
                AuditKind::Error => {
                    error!(target: "audit", user_id = ?entry.user_id, "{}", entry.message)
                }
                AuditKind::ClientError => {
                    warn!(target: "audit", user_id = ?entry.user_id, client = true, "{}", entry.message)
                }
                AuditKind::UserAction => {
                    info!(target: "audit", user_id = ?entry.user_id, "{}", entry.message)
                }
            }

            Self::retain(&history, entry, retained);
        }
        info!("Audit worker shutting down (channel closed)");
    }

    fn retain(history: &Mutex<VecDeque<AuditEntry>>, entry: AuditEntry, retained: usize) {
        if retained == 0 {
            return;
        }
        let mut history = history.lock();
        while history.len() >= retained {
            history.pop_front();
        }
        history.push_back(entry);
    }
}

impl AuditSink for QueuedAuditLog {
    fn record_error(&self, message: &str, user_id: Option<&str>) {
        self.enqueue(AuditKind::Error, message, user_id);
    }

    fn record_user_action(&self, user_id: &str, description: &str) {
        self.enqueue(AuditKind::UserAction, description, Some(user_id));
    }

    fn record_client_error(&self, message: &str, user_id: Option<&str>) {
        self.enqueue(AuditKind::ClientError, message, user_id);
    }
}
