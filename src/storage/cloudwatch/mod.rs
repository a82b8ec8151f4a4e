use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_cloudwatch::Client;
use aws_sdk_cloudwatch::primitives::DateTime;
use aws_sdk_cloudwatch::types::{Datapoint, Dimension, Statistic};
use aws_smithy_types_convert::date_time::DateTimeExt;
use chrono::{TimeDelta, Utc};
use tracing::debug;

use crate::config::ClientConfig;

const NAMESPACE: &str = "AWS/S3";
const METRIC_NAME: &str = "NumberOfObjects";
const STORAGE_TYPE_ALL: &str = "AllStorageTypes";
const LOOKBACK_DAYS: i64 = 3;
const PERIOD_SECONDS: i32 = 24 * 60 * 60;

pub type Metrics = Box<dyn MetricsTrait + Send + Sync>;

/// Source of an approximate object count for a bucket.
#[async_trait]
pub trait MetricsTrait {
    /// `Ok(None)` when the metric has no recent datapoints.
    async fn estimate_object_count(&self, bucket: &str) -> Result<Option<u64>>;
}

pub struct CloudWatchMetrics {
    client: Client,
}

impl CloudWatchMetrics {
    pub async fn boxed_new(client_config: &ClientConfig, assume_role_arn: Option<&str>) -> Metrics {
        Box::new(CloudWatchMetrics {
            client: client_config
                .create_cloudwatch_client(assume_role_arn)
                .await,
        })
    }
}

#[async_trait]
impl MetricsTrait for CloudWatchMetrics {
    async fn estimate_object_count(&self, bucket: &str) -> Result<Option<u64>> {
        let end_time = Utc::now();
        let start_time = end_time - TimeDelta::days(LOOKBACK_DAYS);

        let output = self
            .client
            .get_metric_statistics()
            .namespace(NAMESPACE)
            .metric_name(METRIC_NAME)
            .set_dimensions(Some(build_dimensions(bucket)))
            .start_time(DateTime::from_chrono_utc(start_time))
            .end_time(DateTime::from_chrono_utc(end_time))
            .period(PERIOD_SECONDS)
            .statistics(Statistic::Maximum)
            .send()
            .await
            .context("aws_sdk_cloudwatch::client::get_metric_statistics() failed.")?;

        let estimate = max_datapoint(output.datapoints());
        debug!(
            bucket = bucket,
            datapoints = output.datapoints().len(),
            estimate = ?estimate,
            "NumberOfObjects metric received."
        );

        Ok(estimate)
    }
}

fn build_dimensions(bucket: &str) -> Vec<Dimension> {
    vec![
        Dimension::builder().name("BucketName").value(bucket).build(),
        Dimension::builder()
            .name("StorageType")
            .value(STORAGE_TYPE_ALL)
            .build(),
    ]
}

fn max_datapoint(datapoints: &[Datapoint]) -> Option<u64> {
    datapoints
        .iter()
        .filter_map(|datapoint| datapoint.maximum())
        .filter(|maximum| maximum.is_finite() && *maximum >= 0.0)
        .fold(None, |max: Option<f64>, value| {
            Some(max.map_or(value, |max| max.max(value)))
        })
        .map(|max| max as u64)
}
