use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, trace};

use crate::types::KeySource;

use super::stage::{SendResult, Stage};

/// Feeds object keys into the fix-up queue. The queue is closed when the lister is dropped.
pub struct KeyLister {
    base: Stage,
}

impl KeyLister {
    pub fn new(base: Stage) -> Self {
        Self { base }
    }

    pub async fn list(&self) -> Result<()> {
        trace!("key lister has started.");

        match self.base.config.key_source.clone() {
            KeySource::Listing { start_after } => self.list_source_bucket(start_after).await?,
            KeySource::Stdin => self.read_keys(BufReader::new(tokio::io::stdin())).await?,
            KeySource::File(path) => {
                let file = tokio::fs::File::open(&path)
                    .await
                    .with_context(|| format!("failed to open keys file: {}", path.display()))?;
                self.read_keys(BufReader::new(file)).await?
            }
        }

        trace!("key lister has been completed.");
        Ok(())
    }

    async fn list_source_bucket(&self, start_after: Option<String>) -> Result<()> {
        let mut start_after = start_after;
        let mut continuation_token = None;

        loop {
            if self.base.cancellation_token.is_cancelled() {
                info!("key lister has been cancelled.");
                return Ok(());
            }

            let page = self
                .base
                .source
                .list_objects_page(
                    self.base.config.max_keys,
                    start_after.take(),
                    continuation_token.take(),
                )
                .await?;

            for key in page.keys {
                if self.send_key(key).await? == SendResult::Closed {
                    return Ok(());
                }
            }

            if self
                .base
                .run_context
                .is_cap_reached(self.base.config.max_objects)
            {
                info!(
                    max_objects = ?self.base.config.max_objects,
                    "max objects has been reached. listing stopped."
                );
                return Ok(());
            }

            match page.next_continuation_token {
                Some(token) => continuation_token = Some(token),
                None => return Ok(()),
            }
        }
    }

    /// One key per line. Empty lines are ignored and `\r\n` line endings are accepted.
    pub async fn read_keys<R>(&self, reader: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();

        loop {
            let line = tokio::select! {
                line = lines.next_line() => line.context("failed to read a key.")?,
                _ = self.base.cancellation_token.cancelled() => {
                    info!("key lister has been cancelled.");
                    return Ok(());
                }
            };

            let Some(line) = line else {
                return Ok(());
            };

            let key = line.trim_end_matches('\r');
            if key.is_empty() {
                continue;
            }

            if self.send_key(key.to_string()).await? == SendResult::Closed {
                return Ok(());
            }
        }
    }

    async fn send_key(&self, key: String) -> Result<SendResult> {
        tokio::select! {
            result = self.base.send(key) => result,
            _ = self.base.cancellation_token.cancelled() => {
                info!("key lister has been cancelled.");
                Ok(SendResult::Closed)
            }
        }
    }
}
