#![allow(dead_code)]

use std::path::Path;

use s3cachectl::Config;
use s3cachectl::config::args::build_config_from_args;
use s3cachectl::pipeline::Pipeline;
use s3cachectl::storage::StoragePair;
use s3cachectl::storage::in_memory::InMemoryStore;
use s3cachectl::types::token::create_pipeline_cancellation_token;
use s3cachectl::types::{FixupStatistics, FixupStatus};

pub const SOURCE_BUCKET: &str = "source-bucket";
pub const TARGET_BUCKET: &str = "target-bucket";
pub const DESIRED_CACHE_CONTROL: &str = "public, max-age=31536000";
pub const STALE_CACHE_CONTROL: &str = "no-cache";

/// In-place configuration against `TARGET_BUCKET` with estimation disabled.
pub fn build_config(failed_keys_file: &Path, extra_args: &[&str]) -> Config {
    let failed_keys_file = failed_keys_file.to_string_lossy().to_string();
    let mut args = vec![
        "s3cachectl".to_string(),
        "--disable-estimate".to_string(),
        "--failed-keys-file".to_string(),
        failed_keys_file,
        "--target-bucket".to_string(),
        TARGET_BUCKET.to_string(),
    ];
    args.extend(extra_args.iter().map(|arg| arg.to_string()));

    build_config_from_args(args).unwrap()
}

pub fn create_pipeline(store: &InMemoryStore, config: Config) -> Pipeline {
    let storage_pair = StoragePair {
        source: store.storage(&config.source_bucket),
        target: store.storage(&config.target_bucket),
    };

    Pipeline::with_storage(
        config,
        storage_pair,
        vec![],
        create_pipeline_cancellation_token(),
    )
}

/// Runs the pipeline to completion and returns every statistic it emitted.
pub async fn run_pipeline(pipeline: &mut Pipeline) -> Vec<FixupStatistics> {
    let stats_receiver = pipeline.get_stats_receiver();
    pipeline.run().await;

    let mut stats = vec![];
    while let Ok(stat) = stats_receiver.try_recv() {
        stats.push(stat);
    }
    stats
}

pub fn completed_statuses(stats: &[FixupStatistics]) -> Vec<(String, FixupStatus)> {
    stats
        .iter()
        .filter_map(|stat| match stat {
            FixupStatistics::FixupComplete { key, status } => Some((key.clone(), *status)),
            _ => None,
        })
        .collect()
}

pub fn status_of(stats: &[FixupStatistics], key: &str) -> Option<FixupStatus> {
    completed_statuses(stats)
        .into_iter()
        .find(|(completed_key, _)| completed_key == key)
        .map(|(_, status)| status)
}

pub fn init_dummy_tracing_subscriber() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("dummy=trace")
        .try_init();
}
