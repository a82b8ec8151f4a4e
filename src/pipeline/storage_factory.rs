use crate::Config;
use crate::storage::cloudwatch::{CloudWatchMetrics, Metrics};
use crate::storage::s3::S3StorageFactory;
use crate::storage::{StorageFactory, StoragePair};
use leaky_bucket::RateLimiter;
use std::sync::Arc;

// default refill interval 100ms
const REFILL_PER_INTERVAL_DIVIDER: usize = 10;

/// Only the source storage is rate limited. Every fix-up reads the source exactly once.
pub async fn create_storage_pair(config: &Config) -> StoragePair {
    let rate_limit_objects_per_sec = config.rate_limit_objects.map(build_rate_limiter);

    let source = S3StorageFactory::create(
        &config.client_config,
        config.source_bucket.clone(),
        rate_limit_objects_per_sec,
    )
    .await;
    let target = S3StorageFactory::create(
        &config.client_config,
        config.target_bucket.clone(),
        None,
    )
    .await;

    StoragePair { source, target }
}

/// The default credentials first, then the assumed role if one is configured.
pub async fn create_metrics(config: &Config) -> Vec<Metrics> {
    if !config.estimate_config.is_metrics_query_required() {
        return vec![];
    }

    let mut metrics = vec![CloudWatchMetrics::boxed_new(&config.client_config, None).await];
    if let Some(metrics_role_arn) = config.estimate_config.metrics_role_arn.as_deref() {
        metrics.push(
            CloudWatchMetrics::boxed_new(&config.client_config, Some(metrics_role_arn)).await,
        );
    }

    metrics
}

fn build_rate_limiter(rate_limit_value: u32) -> Arc<RateLimiter> {
    let refill = if rate_limit_value <= REFILL_PER_INTERVAL_DIVIDER as u32 {
        1
    } else {
        rate_limit_value as usize / REFILL_PER_INTERVAL_DIVIDER
    };

    Arc::new(
        RateLimiter::builder()
            .max(rate_limit_value as usize)
            .initial(rate_limit_value as usize)
            .refill(refill)
            .fair(true)
            .build(),
    )
}
