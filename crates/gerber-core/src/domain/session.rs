//! Server-side session and its staged artifacts

use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use gerber_shared::SessionId;

/// Liveness record for one session id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub last_touched: DateTime<Utc>,
}

impl Session {
    pub fn new(id: SessionId, now: DateTime<Utc>) -> Self {
        Self { id, last_touched: now }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.last_touched
    }

    /// Strictly older than `timeout`.
    pub fn is_older_than(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        self.age(now) > timeout
    }
}

/// The two artifacts staged for a session (e.g. front and back renders).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilePair {
    pub file1: Bytes,
    pub file2: Bytes,
}

impl FilePair {
    pub fn new(file1: impl Into<Bytes>, file2: impl Into<Bytes>) -> Self {
        Self {
            file1: file1.into(),
            file2: file2.into(),
        }
    }
}
