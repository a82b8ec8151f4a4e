use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::types::error::FixupError;

/// Appends keys of failed objects to a local file, one key per line.
///
/// The file is opened on the first failure in append mode and created if absent, so a
/// run without failures leaves no file behind. Appends from all workers are serialized.
pub struct FailureSink {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl FailureSink {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            file: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, key: &str) -> Result<()> {
        let mut file = self.file.lock().await;

        if file.is_none() {
            *file = Some(self.open().await?);
        }

        if let Some(file) = file.as_mut() {
            file.write_all(format!("{key}\n").as_bytes())
                .await
                .with_context(|| format!("failed to write {}", self.path.display()))
                .context(FixupError::FailureSinkUnavailable)?;
            file.flush()
                .await
                .with_context(|| format!("failed to flush {}", self.path.display()))
                .context(FixupError::FailureSinkUnavailable)?;
        }

        debug!(key = key, path = %self.path.display(), "failed key has been recorded.");

        Ok(())
    }

    async fn open(&self) -> Result<File> {
        OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .await
            .with_context(|| format!("failed to open {}", self.path.display()))
            .context(FixupError::FailureSinkUnavailable)
    }
}
