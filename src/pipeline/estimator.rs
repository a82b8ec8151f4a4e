use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::EstimateConfig;
use crate::storage::cloudwatch::Metrics;
use crate::types::run_context::RunContext;

/// Seeds the expected object count used for the ETA.
///
/// `metrics` are tried in order until one of them returns a count. Any failure only
/// leaves the estimate unknown.
pub struct ObjectCountEstimator {
    estimate_config: EstimateConfig,
    bucket: String,
    metrics: Vec<Metrics>,
    run_context: Arc<RunContext>,
}

impl ObjectCountEstimator {
    pub fn new(
        estimate_config: EstimateConfig,
        bucket: String,
        metrics: Vec<Metrics>,
        run_context: Arc<RunContext>,
    ) -> Self {
        Self {
            estimate_config,
            bucket,
            metrics,
            run_context,
        }
    }

    pub async fn run(&self) {
        let Some(expected_total) = self.estimate().await else {
            info!(bucket = self.bucket, "number of objects is unknown. ETA is not shown.");
            return;
        };

        if self.run_context.set_expected_total(expected_total) {
            info!(
                bucket = self.bucket,
                expected_total = expected_total,
                "number of objects has been estimated."
            );
        }
    }

    pub async fn estimate(&self) -> Option<u64> {
        if let Some(expected_objects) = self.estimate_config.expected_objects {
            return Some(expected_objects);
        }
        if self.estimate_config.disable_estimate {
            debug!("object count estimation is disabled.");
            return None;
        }

        for (index, metrics) in self.metrics.iter().enumerate() {
            match metrics.estimate_object_count(&self.bucket).await {
                Ok(Some(estimate)) => return Some(estimate),
                Ok(None) => {
                    warn!(
                        bucket = self.bucket,
                        attempt = index + 1,
                        "NumberOfObjects metric has no datapoints."
                    );
                }
                Err(e) => {
                    let error = e.to_string();
                    let source = e.source();
                    warn!(
                        bucket = self.bucket,
                        attempt = index + 1,
                        error = error,
                        source = source,
                        "failed to get NumberOfObjects metric."
                    );
                }
            }
        }

        None
    }
}
