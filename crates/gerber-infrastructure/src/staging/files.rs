//! One record file per session under the staging directory

use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::PathBuf;

use bytes::Bytes;
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

use gerber_core::FilePair;
use gerber_shared::SessionId;

use super::codec::{self, StagingError};

const PARTIAL_SUFFIX: &str = "partial";

pub struct FileStaging {
    dir: PathBuf,
}

impl FileStaging {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the staging directory and drop records left by a previous process.
    ///
    /// Sessions live in memory only, so any record found here is unreachable.
    /// Files not named like a record are left alone.
    pub async fn prepare(&self) -> Result<usize, StagingError> {
        fs::create_dir_all(&self.dir).await?;

        let mut removed = 0;
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() || !is_record_name(&entry.file_name()) {
                continue;
            }
            fs::remove_file(entry.path()).await?;
            removed += 1;
        }

        if removed > 0 {
            info!("Removed {} orphaned staging records from {}", removed, self.dir.display());
        }
        Ok(removed)
    }

    /// Replace the record of `id`.
    ///
    /// The old record is removed first, the new one is written next to it and
    /// renamed into place. A failure after the removal leaves no record.
    pub async fn write(&self, id: SessionId, files: &FilePair) -> Result<(), StagingError> {
        let record = codec::encode(files)?;
        let path = self.record_path(id);
        let partial = self.partial_path(id);

        self.remove(id).await?;
        let staged = match fs::write(&partial, &record).await {
            Ok(()) => fs::rename(&partial, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = staged {
            warn!("Could not stage record for session {}: {}", id, e);
            let _ = fs::remove_file(&partial).await;
            return Err(e.into());
        }

        debug!("Staged {} bytes for session {}", record.len(), id);
        Ok(())
    }

    pub async fn read(&self, id: SessionId) -> Result<Option<FilePair>, StagingError> {
        match fs::read(self.record_path(id)).await {
            Ok(raw) => codec::decode(Bytes::from(raw)).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Idempotent.
    pub async fn remove(&self, id: SessionId) -> Result<(), StagingError> {
        match fs::remove_file(self.record_path(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn record_path(&self, id: SessionId) -> PathBuf {
        self.dir.join(id.to_string())
    }

    fn partial_path(&self, id: SessionId) -> PathBuf {
        self.dir.join(format!("{}.{}", id, PARTIAL_SUFFIX))
    }
}

/// `<uuid>` or `<uuid>.partial`
fn is_record_name(name: &OsStr) -> bool {
    let Some(name) = name.to_str() else {
        return false;
    };
    let stem = name
        .strip_suffix(PARTIAL_SUFFIX)
        .and_then(|s| s.strip_suffix('.'))
        .unwrap_or(name);
    Uuid::parse_str(stem).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_overwrite_with_shorter_pair_leaves_no_trailing_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let staging = FileStaging::new(dir.path());
        let id = Uuid::new_v4();

        staging
            .write(id, &FilePair::new(vec![1u8; 4096], vec![2u8; 4096]))
            .await
            .unwrap();
        let short = FilePair::new(b"x".to_vec(), Vec::new());
        staging.write(id, &short).await.unwrap();

        let on_disk = std::fs::read(dir.path().join(id.to_string())).unwrap();
        assert_eq!(on_disk.len(), 8 + 1);
        assert_eq!(staging.read(id).await.unwrap(), Some(short));
        assert!(!dir.path().join(format!("{}.partial", id)).exists());
    }

    #[tokio::test]
    async fn test_missing_record_reads_absent_and_removes_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let staging = FileStaging::new(dir.path());
        let id = Uuid::new_v4();

        assert_eq!(staging.read(id).await.unwrap(), None);
        staging.remove(id).await.unwrap();
        staging.remove(id).await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_record_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let staging = FileStaging::new(dir.path());
        let id = Uuid::new_v4();

        std::fs::write(dir.path().join(id.to_string()), [5u8, 0, 0, 0, 0, 0, 0, 0, 1]).unwrap();
        assert!(matches!(staging.read(id).await, Err(StagingError::Corrupt(_))));
    }

    #[tokio::test]
    async fn test_prepare_creates_dir_and_drops_orphans() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("Session");
        let staging = FileStaging::new(&dir);

        assert_eq!(staging.prepare().await.unwrap(), 0);
        std::fs::write(dir.join(Uuid::new_v4().to_string()), b"stale").unwrap();
        std::fs::write(dir.join(format!("{}.partial", Uuid::new_v4())), b"half").unwrap();
        assert_eq!(staging.prepare().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_prepare_keeps_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let staging = FileStaging::new(dir.path());

        for name in ["notes.txt", "config.toml", "partial", "not-a-uuid.partial"] {
            std::fs::write(dir.path().join(name), b"keep me").unwrap();
        }
        std::fs::write(dir.path().join(Uuid::new_v4().to_string()), b"stale").unwrap();

        assert_eq!(staging.prepare().await.unwrap(), 1);
        assert!(dir.path().join("notes.txt").exists());
        assert!(dir.path().join("config.toml").exists());
        assert!(dir.path().join("partial").exists());
        assert!(dir.path().join("not-a-uuid.partial").exists());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_no_record() {
        let dir = tempfile::tempdir().unwrap();
        let staging = FileStaging::new(dir.path());
        let id = Uuid::new_v4();

        staging.write(id, &FilePair::new(b"old".to_vec(), Vec::new())).await.unwrap();
        // a directory in the partial slot makes the write fail
        std::fs::create_dir(dir.path().join(format!("{}.partial", id))).unwrap();

        let result = staging.write(id, &FilePair::new(b"new".to_vec(), Vec::new())).await;
        assert!(matches!(result, Err(StagingError::Io(_))));
        assert_eq!(staging.read(id).await.unwrap(), None);
        assert!(!dir.path().join(id.to_string()).exists());
    }
}
