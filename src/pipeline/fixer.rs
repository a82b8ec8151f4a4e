use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use async_channel::Sender;
use tracing::{debug, info};

use crate::Config;
use crate::storage::Storage;
use crate::types::error::FixupError;
use crate::types::run_context::RunContext;
use crate::types::{
    CONTENT_TYPE_JPEG, CONTENT_TYPE_PDF, CONTENT_TYPE_PNG, FALLBACK_CONTENT_TYPE,
    FixupStatistics, FixupStatus, ObjectMetadata,
};

#[derive(Debug, Clone, PartialEq)]
pub enum FixupAction {
    Leave(FixupStatus),
    Write {
        status: FixupStatus,
        content_type: String,
    },
}

/// Brings the cache-control (and content type) of one object in line with the configuration.
pub struct FixupEngine {
    config: Config,
    source: Storage,
    target: Storage,
    run_context: Arc<RunContext>,
    stats_sender: Sender<FixupStatistics>,
}

impl FixupEngine {
    pub fn new(
        config: Config,
        source: Storage,
        target: Storage,
        run_context: Arc<RunContext>,
        stats_sender: Sender<FixupStatistics>,
    ) -> Self {
        Self {
            config,
            source,
            target,
            run_context,
            stats_sender,
        }
    }

    /// Never retries. Store errors are returned without touching the counters.
    pub async fn fix(&self, key: &str) -> Result<FixupStatus> {
        let source_metadata = self
            .source
            .head_object_metadata(key)
            .await
            .context(FixupError::SourceMetadataReadFailed)?
            .ok_or_else(|| anyhow!(FixupError::SourceObjectNotFound))?;

        let target_metadata = if self.config.is_in_place() {
            Some(source_metadata.clone())
        } else {
            self.target
                .head_object_metadata(key)
                .await
                .context("target metadata read failed.")?
        };
        if target_metadata.is_none() {
            debug!(key = key, "no existing target object.");
        }

        let status = match self.decide_action(key, &source_metadata, target_metadata.as_ref()) {
            FixupAction::Leave(status) => {
                debug!(key = key, status = ?status, "object left unchanged.");
                status
            }
            FixupAction::Write {
                status,
                content_type,
            } => {
                self.write(key, &content_type).await?;
                self.run_context.record_copied();
                status
            }
        };

        if let Some(report) =
            self.run_context
                .record_outcome(key, status, source_metadata.content_type())
        {
            let _ = self
                .stats_sender
                .send(FixupStatistics::Progress(Box::new(report)))
                .await;
        }
        let _ = self
            .stats_sender
            .send(FixupStatistics::FixupComplete {
                key: key.to_string(),
                status,
            })
            .await;

        Ok(status)
    }

    /// A write slot is reserved only when the returned action is a write.
    pub fn decide_action(
        &self,
        key: &str,
        source: &ObjectMetadata,
        target: Option<&ObjectMetadata>,
    ) -> FixupAction {
        if self.config.is_excluded_key(key) && source.is_picture() {
            return FixupAction::Leave(FixupStatus::Excluded);
        }

        if target.is_some_and(|target| {
            target.cache_control() == Some(self.config.cache_control.as_str())
                && target.content_type().is_some()
        }) {
            return FixupAction::Leave(FixupStatus::Skipped);
        }

        if !self.run_context.try_admit_write(self.config.max_objects) {
            return FixupAction::Leave(FixupStatus::CapReached);
        }

        let (status, content_type) = classify_content_type(source.content_type());
        FixupAction::Write {
            status,
            content_type: content_type.to_string(),
        }
    }

    async fn write(&self, key: &str, content_type: &str) -> Result<()> {
        if self.config.dry_run {
            info!(
                source_bucket = self.source.bucket(),
                target_bucket = self.target.bucket(),
                key = key,
                content_type = content_type,
                cache_control = self.config.cache_control,
                "[dry-run] object would be copied."
            );
            return Ok(());
        }

        self.target
            .copy_object_with_metadata_replace(
                self.source.bucket(),
                key,
                key,
                content_type,
                &self.config.cache_control,
            )
            .await?;

        debug!(
            target_bucket = self.target.bucket(),
            key = key,
            content_type = content_type,
            "object copied."
        );

        Ok(())
    }
}

/// Returns the outcome code and the content type to write for a source content type.
pub fn classify_content_type(content_type: Option<&str>) -> (FixupStatus, &str) {
    match content_type {
        None => (FixupStatus::TypeWasUnset, FALLBACK_CONTENT_TYPE),
        Some(CONTENT_TYPE_JPEG) => (FixupStatus::Jpeg, CONTENT_TYPE_JPEG),
        Some(CONTENT_TYPE_PNG) => (FixupStatus::Png, CONTENT_TYPE_PNG),
        Some(CONTENT_TYPE_PDF) => (FixupStatus::Pdf, CONTENT_TYPE_PDF),
        Some(content_type) => (FixupStatus::Other, content_type),
    }
}
