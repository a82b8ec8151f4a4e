use std::sync::Arc;

use anyhow::{Result, anyhow};
use tracing::{error, info, trace};

use crate::pipeline::failure_sink::FailureSink;
use crate::pipeline::fixer::FixupEngine;
use crate::storage::s3::is_access_denied_error;
use crate::types::FixupStatistics::{FixupError, Progress};

use super::stage::Stage;

pub struct FixupWorker {
    worker_index: u16,
    base: Stage,
    engine: FixupEngine,
    failure_sink: Arc<FailureSink>,
}

impl FixupWorker {
    pub fn new(
        base: Stage,
        worker_index: u16,
        engine: FixupEngine,
        failure_sink: Arc<FailureSink>,
    ) -> Self {
        Self {
            worker_index,
            base,
            engine,
            failure_sink,
        }
    }

    pub async fn run(&self) -> Result<()> {
        trace!(worker_index = self.worker_index, "fixup worker has started.");

        let Some(receiver) = self.base.receiver.as_ref() else {
            return Err(anyhow!("fixup worker has no receiver."));
        };

        loop {
            tokio::select! {
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(key) => {
                            if let Err(e) = self.fix_object(&key).await {
                                self.base.cancellation_token.cancel();
                                error!(worker_index = self.worker_index, "fixup worker has been cancelled with error.");
                                return Err(e);
                            }
                        },
                        Err(_) => {
                            // normal shutdown
                            trace!(worker_index = self.worker_index, "fixup worker has been completed.");
                            break;
                        }
                    }
                },
                _ = self.base.cancellation_token.cancelled() => {
                    info!(worker_index = self.worker_index, "fixup worker has been cancelled.");
                    return Ok(());
                }
            }
        }

        Ok(())
    }

    /// Per-object failures are recorded and swallowed. Only a failure sink error is returned.
    async fn fix_object(&self, key: &str) -> Result<()> {
        let e = match self.engine.fix(key).await {
            Ok(_) => return Ok(()),
            Err(e) => e,
        };

        self.log_failure(key, &e);
        self.base.set_warning();

        if let Some(report) = self.base.run_context.record_failure(key) {
            self.base.send_stats(Progress(Box::new(report))).await;
        }
        self.base
            .send_stats(FixupError {
                key: key.to_string(),
                error: format!("{e:#}"),
            })
            .await;

        self.failure_sink.append(key).await
    }

    fn log_failure(&self, key: &str, e: &anyhow::Error) {
        let error = e.to_string();
        let source = e.source();
        if is_access_denied_error(e) {
            error!(
                worker_index = self.worker_index,
                key = key,
                error = error,
                source = source,
                "access denied."
            );
        } else {
            error!(
                worker_index = self.worker_index,
                key = key,
                error = error,
                source = source,
                "fixup object failed."
            );
        }
    }
}
