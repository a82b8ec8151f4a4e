use anyhow::{Context, Result, anyhow};
use async_channel::{Receiver, Sender};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::Config;
use crate::storage::Storage;
use crate::types::FixupStatistics;
use crate::types::run_context::RunContext;
use crate::types::token::PipelineCancellationToken;

pub struct Stage {
    pub config: Config,
    pub source: Storage,
    pub receiver: Option<Receiver<String>>,
    pub sender: Option<Sender<String>>,
    pub cancellation_token: PipelineCancellationToken,
    pub has_warning: Arc<AtomicBool>,
    pub run_context: Arc<RunContext>,
    stats_sender: Sender<FixupStatistics>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SendResult {
    Success,
    Closed,
}

impl Stage {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Config,
        source: Storage,
        receiver: Option<Receiver<String>>,
        sender: Option<Sender<String>>,
        cancellation_token: PipelineCancellationToken,
        has_warning: Arc<AtomicBool>,
        run_context: Arc<RunContext>,
        stats_sender: Sender<FixupStatistics>,
    ) -> Self {
        Self {
            config,
            source,
            receiver,
            sender,
            cancellation_token,
            has_warning,
            run_context,
            stats_sender,
        }
    }

    pub async fn send(&self, key: String) -> Result<SendResult> {
        let Some(sender) = self.sender.as_ref() else {
            return Err(anyhow!("stage has no sender."));
        };

        let result = sender
            .send(key)
            .await
            .context("async_channel::Sender::send() failed.");

        if let Err(e) = result {
            return if !self.is_channel_closed() {
                Err(anyhow!(e))
            } else {
                Ok(SendResult::Closed)
            };
        }

        Ok(SendResult::Success)
    }

    pub fn is_channel_closed(&self) -> bool {
        self.sender
            .as_ref()
            .is_none_or(|sender| sender.is_closed())
    }

    pub async fn send_stats(&self, stats: FixupStatistics) {
        let _ = self.stats_sender.send(stats).await;
    }

    pub fn set_warning(&self) {
        self.has_warning.store(true, Ordering::SeqCst);
    }
}
