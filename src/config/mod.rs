use std::path::PathBuf;
use std::time::Duration;

use regex::Regex;

use crate::types::{ClientConfigLocation, KeySource, S3Credentials};

pub mod args;

#[derive(Debug, Clone)]
pub struct Config {
    pub source_bucket: String,
    pub target_bucket: String,
    pub client_config: ClientConfig,
    pub tracing_config: Option<TracingConfig>,
    pub cache_control: String,
    pub worker_size: u16,
    pub dry_run: bool,
    pub exclude_regex: Option<Regex>,
    pub max_objects: Option<u64>,
    pub key_source: KeySource,
    pub max_keys: i32,
    pub estimate_config: EstimateConfig,
    pub failed_keys_file: PathBuf,
    pub progress_interval: Duration,
    pub rate_limit_objects: Option<u32>,
    pub auto_complete_shell: Option<clap_complete::shells::Shell>,
}

impl Config {
    pub fn is_in_place(&self) -> bool {
        self.source_bucket == self.target_bucket
    }

    pub fn is_excluded_key(&self, key: &str) -> bool {
        self.exclude_regex
            .as_ref()
            .is_some_and(|regex| regex.is_match(key))
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub client_config_location: ClientConfigLocation,
    pub credential: S3Credentials,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
    pub retry_config: RetryConfig,
    pub cli_timeout_config: CLITimeoutConfig,
    pub disable_stalled_stream_protection: bool,
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub aws_max_attempts: u32,
    pub initial_backoff_milliseconds: u64,
}

#[derive(Debug, Clone)]
pub struct CLITimeoutConfig {
    pub operation_timeout_milliseconds: Option<u64>,
    pub operation_attempt_timeout_milliseconds: Option<u64>,
    pub connect_timeout_milliseconds: Option<u64>,
    pub read_timeout_milliseconds: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
pub struct TracingConfig {
    pub tracing_level: log::Level,
    pub json_tracing: bool,
    pub aws_sdk_tracing: bool,
    pub span_events_tracing: bool,
    pub disable_color_tracing: bool,
}

/// How the expected object count used for the ETA is obtained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EstimateConfig {
    pub expected_objects: Option<u64>,
    pub disable_estimate: bool,
    pub metrics_role_arn: Option<String>,
}

impl EstimateConfig {
    pub fn is_metrics_query_required(&self) -> bool {
        !self.disable_estimate && self.expected_objects.is_none()
    }
}
