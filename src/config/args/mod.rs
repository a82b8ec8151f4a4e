use crate::Config;
use crate::config::args::value_parser::{bucket, file_exist, url};
use crate::config::{CLITimeoutConfig, ClientConfig, EstimateConfig, RetryConfig, TracingConfig};
use crate::types::{AccessKeys, ClientConfigLocation, KeySource, S3Credentials};
use clap::Parser;
use clap::builder::NonEmptyStringValueParser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use regex::Regex;
#[cfg(feature = "version")]
use shadow_rs::shadow;
use std::ffi::OsString;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

mod tests;
mod value_parser;

const DEFAULT_CACHE_CONTROL: &str = "public, max-age=31536000";
const DEFAULT_WORKER_SIZE: u16 = 200;
const DEFAULT_FAILED_KEYS_FILE: &str = "error_keys.txt";
const DEFAULT_MAX_KEYS: i32 = 1000;
const DEFAULT_PROGRESS_INTERVAL_SECONDS: u64 = 10;
const DEFAULT_AWS_MAX_ATTEMPTS: u32 = 10;
const DEFAULT_INITIAL_BACKOFF_MILLISECONDS: u64 = 100;
const DEFAULT_JSON_TRACING: bool = false;
const DEFAULT_AWS_SDK_TRACING: bool = false;
const DEFAULT_SPAN_EVENTS_TRACING: bool = false;
const DEFAULT_DISABLE_COLOR_TRACING: bool = false;
const DEFAULT_DRY_RUN: bool = false;
const DEFAULT_READ_KEYS_FROM_STDIN: bool = false;
const DEFAULT_DISABLE_ESTIMATE: bool = false;
const DEFAULT_FORCE_PATH_STYLE: bool = false;
const DEFAULT_DISABLE_STALLED_STREAM_PROTECTION: bool = false;

const NO_TARGET_BUCKET_SPECIFIED: &str = "--target-bucket must be specified\n";
const INVALID_EXCLUDE_REGEX: &str = "--exclude-regex is not supported by the regex engine: ";

#[cfg(feature = "version")]
shadow!(build);

#[derive(Parser, Clone, Debug)]
#[cfg_attr(feature = "version", command(version=format!("{} ({} {}), {}", build::PKG_VERSION, build::SHORT_COMMIT, build::BUILD_TARGET, build::RUST_VERSION)))]
pub struct CLIArgs {
    /// bucket whose objects get the new Cache-Control. s3://<BUCKET_NAME> or <BUCKET_NAME>
    #[arg(long, short = 't', env, value_parser = bucket::check_bucket_name, required_unless_present = "auto_complete_shell", help_heading = "General")]
    target_bucket: Option<String>,

    /// bucket to copy objects from. The default is the target bucket (in-place update)
    #[arg(long, env, value_parser = bucket::check_bucket_name, help_heading = "General")]
    source_bucket: Option<String>,

    /// Cache-Control value to set on every object
    #[arg(long, env, default_value = DEFAULT_CACHE_CONTROL, value_parser = NonEmptyStringValueParser::new(), help_heading = "General")]
    cache_control: String,

    /// A simulation mode. no objects will be modified
    #[arg(long, env, default_value_t = DEFAULT_DRY_RUN, help_heading = "General")]
    dry_run: bool,

    /// do not modify jpeg/png objects whose key matches given regular expression
    #[arg(long, env, value_parser = crate::config::args::value_parser::regex::parse_regex, help_heading = "General")]
    exclude_regex: Option<String>,

    /// stop modifying objects after this number of objects has been written
    #[arg(long, env, value_parser = clap::value_parser!(u64).range(1..), help_heading = "General")]
    max_objects: Option<u64>,

    /// file that keys of failed objects are appended to. It can be passed to --keys-file later
    #[arg(long, env, value_name = "FILE", default_value = DEFAULT_FAILED_KEYS_FILE, help_heading = "General")]
    failed_keys_file: PathBuf,

    /// start listing after this key (resume a previous run)
    #[arg(long, env, value_parser = NonEmptyStringValueParser::new(), help_heading = "Key Source")]
    start_after: Option<String>,

    /// read keys from stdin(one key per line) instead of listing the source bucket
    #[arg(long, env, conflicts_with_all = ["keys_file", "start_after"], default_value_t = DEFAULT_READ_KEYS_FROM_STDIN, help_heading = "Key Source")]
    read_keys_from_stdin: bool,

    /// read keys from a file(one key per line) instead of listing the source bucket
    #[arg(long, env, value_name = "FILE", conflicts_with_all = ["start_after"], value_parser = file_exist::check_file_exist, help_heading = "Key Source")]
    keys_file: Option<String>,

    /// assume this role when the NumberOfObjects metric is not readable with the default credentials
    #[arg(long, env, conflicts_with_all = ["expected_objects", "disable_estimate"], value_parser = NonEmptyStringValueParser::new(), help_heading = "Progress")]
    metrics_role_arn: Option<String>,

    /// expected number of objects for ETA. The CloudWatch query is skipped
    #[arg(long, env, conflicts_with_all = ["disable_estimate"], help_heading = "Progress")]
    expected_objects: Option<u64>,

    /// do not query CloudWatch for the number of objects. ETA is not shown
    #[arg(long, env, default_value_t = DEFAULT_DISABLE_ESTIMATE, help_heading = "Progress")]
    disable_estimate: bool,

    /// interval(seconds) between status lines
    #[arg(long, env, default_value_t = DEFAULT_PROGRESS_INTERVAL_SECONDS, help_heading = "Progress")]
    progress_interval_seconds: u64,

    /// location of the file that the AWS CLI uses to store configuration profiles
    #[arg(long, env, value_name = "FILE", help_heading = "AWS Configuration")]
    aws_config_file: Option<PathBuf>,

    /// location of the file that the AWS CLI uses to store access keys
    #[arg(long, env, value_name = "FILE", help_heading = "AWS Configuration")]
    aws_shared_credentials_file: Option<PathBuf>,

    /// AWS CLI profile
    #[arg(long, env, conflicts_with_all = ["access_key", "secret_access_key", "session_token"], help_heading = "AWS Configuration")]
    profile: Option<String>,

    /// access key
    #[arg(long, env, conflicts_with_all = ["profile"], requires = "secret_access_key", help_heading = "AWS Configuration")]
    access_key: Option<String>,

    /// secret access key
    #[arg(long, env, conflicts_with_all = ["profile"], requires = "access_key", help_heading = "AWS Configuration")]
    secret_access_key: Option<String>,

    /// session token
    #[arg(long, env, conflicts_with_all = ["profile"], requires = "access_key", help_heading = "AWS Configuration")]
    session_token: Option<String>,

    /// region
    #[arg(long, env, value_parser = NonEmptyStringValueParser::new(), help_heading = "AWS Configuration")]
    region: Option<String>,

    /// endpoint url for S3-compatible storage
    #[arg(long, env, value_parser = url::check_scheme, help_heading = "AWS Configuration")]
    endpoint_url: Option<String>,

    /// force path-style addressing
    #[arg(long, env, default_value_t = DEFAULT_FORCE_PATH_STYLE, help_heading = "AWS Configuration")]
    force_path_style: bool,

    /// number of workers
    #[arg(long, env, default_value_t = DEFAULT_WORKER_SIZE, value_parser = clap::value_parser!(u16).range(1..), help_heading = "Performance")]
    worker_size: u16,

    /// rate limit objects per second
    #[arg(long, env, value_parser = clap::value_parser!(u32).range(10..), help_heading = "Performance")]
    rate_limit_objects: Option<u32>,

    /// trace verbosity(-v: show info, -vv: show debug, -vvv show trace)
    #[clap(flatten)]
    verbosity: Verbosity<WarnLevel>,

    /// show trace as json format
    #[arg(long, env, default_value_t = DEFAULT_JSON_TRACING, help_heading = "Tracing/Logging")]
    json_tracing: bool,

    /// enable aws sdk tracing
    #[arg(long, env, default_value_t = DEFAULT_AWS_SDK_TRACING, help_heading = "Tracing/Logging")]
    aws_sdk_tracing: bool,

    /// show span event tracing
    #[arg(long, env, default_value_t = DEFAULT_SPAN_EVENTS_TRACING, help_heading = "Tracing/Logging")]
    span_events_tracing: bool,

    /// disable ANSI terminal colors
    #[arg(long, env, default_value_t = DEFAULT_DISABLE_COLOR_TRACING, help_heading = "Tracing/Logging")]
    disable_color_tracing: bool,

    /// maximum retry attempts that the AWS SDK retry handler uses
    #[arg(long, env, default_value_t = DEFAULT_AWS_MAX_ATTEMPTS, value_name = "max_attempts", help_heading = "Retry Options")]
    aws_max_attempts: u32,

    /// a multiplier value used when calculating backoff times as part of an exponential backoff with jitter strategy.
    #[arg(long, env, default_value_t = DEFAULT_INITIAL_BACKOFF_MILLISECONDS, value_name = "initial_backoff", help_heading = "Retry Options")]
    initial_backoff_milliseconds: u64,

    /// operation timeout (milliseconds). For details, see the AWS SDK for Rust TimeoutConfig documentation.
    /// The default has no timeout.
    #[arg(
        long,
        env,
        value_name = "operation_timeout",
        help_heading = "Timeout Options"
    )]
    operation_timeout_milliseconds: Option<u64>,

    /// operation attempt timeout (milliseconds). For details, see the AWS SDK for Rust TimeoutConfig documentation.
    /// The default has no timeout.
    #[arg(
        long,
        env,
        value_name = "operation_attempt_timeout",
        help_heading = "Timeout Options"
    )]
    operation_attempt_timeout_milliseconds: Option<u64>,

    /// connect timeout (milliseconds).
    /// The default has AWS SDK default timeout (Currently 3100 milliseconds).
    #[arg(
        long,
        env,
        value_name = "connect_timeout",
        help_heading = "Timeout Options"
    )]
    connect_timeout_milliseconds: Option<u64>,

    /// read timeout (milliseconds).
    /// The default has no timeout.
    #[arg(
        long,
        env,
        value_name = "read_timeout",
        help_heading = "Timeout Options"
    )]
    read_timeout_milliseconds: Option<u64>,

    /// maximum number of objects returned in a single list object request
    #[arg(long, env, default_value_t = DEFAULT_MAX_KEYS, value_parser = clap::value_parser!(i32).range(1..=32767), help_heading = "Advanced")]
    max_keys: i32,

    /// generate a auto completions script. Valid values: bash, fish, zsh, powershell, elvish.
    #[arg(long, env, value_name = "SHELL", value_parser = clap_complete::shells::Shell::from_str, help_heading = "Advanced")]
    auto_complete_shell: Option<clap_complete::shells::Shell>,

    /// disable stalled stream protection
    #[arg(long, env, default_value_t = DEFAULT_DISABLE_STALLED_STREAM_PROTECTION, help_heading = "Advanced")]
    disable_stalled_stream_protection: bool,
}

pub fn parse_from_args<I, T>(args: I) -> Result<CLIArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    CLIArgs::try_parse_from(args)
}

pub fn build_config_from_args<I, T>(args: I) -> Result<Config, String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let config_args = CLIArgs::try_parse_from(args).map_err(|e| e.to_string())?;
    crate::Config::try_from(config_args)
}

impl CLIArgs {
    fn build_client_config(&self) -> ClientConfig {
        let credential = if let Some(profile) = self.profile.clone() {
            S3Credentials::Profile(profile)
        } else if let (Some(access_key), Some(secret_access_key)) =
            (self.access_key.clone(), self.secret_access_key.clone())
        {
            S3Credentials::Credentials {
                access_keys: AccessKeys {
                    access_key,
                    secret_access_key,
                    session_token: self.session_token.clone(),
                },
            }
        } else {
            S3Credentials::FromEnvironment
        };

        ClientConfig {
            client_config_location: ClientConfigLocation {
                aws_config_file: self.aws_config_file.clone(),
                aws_shared_credentials_file: self.aws_shared_credentials_file.clone(),
            },
            credential,
            region: self.region.clone(),
            endpoint_url: self.endpoint_url.clone(),
            force_path_style: self.force_path_style,
            retry_config: RetryConfig {
                aws_max_attempts: self.aws_max_attempts,
                initial_backoff_milliseconds: self.initial_backoff_milliseconds,
            },
            cli_timeout_config: CLITimeoutConfig {
                operation_timeout_milliseconds: self.operation_timeout_milliseconds,
                operation_attempt_timeout_milliseconds: self.operation_attempt_timeout_milliseconds,
                connect_timeout_milliseconds: self.connect_timeout_milliseconds,
                read_timeout_milliseconds: self.read_timeout_milliseconds,
            },
            disable_stalled_stream_protection: self.disable_stalled_stream_protection,
        }
    }

    fn build_tracing_config(&self) -> Option<TracingConfig> {
        let tracing_config = self.verbosity.log_level().map(|log_level| TracingConfig {
            tracing_level: log_level,
            json_tracing: self.json_tracing,
            aws_sdk_tracing: self.aws_sdk_tracing,
            span_events_tracing: self.span_events_tracing,
            disable_color_tracing: self.disable_color_tracing,
        });

        if !self.dry_run {
            return tracing_config;
        }

        // dry-run results are reported through info level events.
        match tracing_config {
            None => Some(TracingConfig {
                tracing_level: log::Level::Info,
                json_tracing: DEFAULT_JSON_TRACING,
                aws_sdk_tracing: DEFAULT_AWS_SDK_TRACING,
                span_events_tracing: DEFAULT_SPAN_EVENTS_TRACING,
                disable_color_tracing: DEFAULT_DISABLE_COLOR_TRACING,
            }),
            Some(tracing_config) if tracing_config.tracing_level < log::Level::Info => {
                Some(TracingConfig {
                    tracing_level: log::Level::Info,
                    ..tracing_config
                })
            }
            tracing_config => tracing_config,
        }
    }

    fn build_key_source(&self) -> KeySource {
        if self.read_keys_from_stdin {
            KeySource::Stdin
        } else if let Some(keys_file) = self.keys_file.as_ref() {
            KeySource::File(PathBuf::from(keys_file))
        } else {
            KeySource::Listing {
                start_after: self.start_after.clone(),
            }
        }
    }
}

impl TryFrom<CLIArgs> for Config {
    type Error = String;

    fn try_from(value: CLIArgs) -> Result<Self, Self::Error> {
        let target_bucket = match (value.target_bucket.clone(), value.auto_complete_shell) {
            (Some(target_bucket), _) => target_bucket,
            (None, Some(_)) => String::new(),
            (None, None) => return Err(NO_TARGET_BUCKET_SPECIFIED.to_string()),
        };
        let source_bucket = value
            .source_bucket
            .clone()
            .unwrap_or_else(|| target_bucket.clone());

        let exclude_regex = value
            .exclude_regex
            .as_ref()
            .map(|regex| Regex::new(regex).map_err(|e| format!("{INVALID_EXCLUDE_REGEX}{e}\n")))
            .transpose()?;

        Ok(Config {
            source_bucket,
            target_bucket,
            client_config: value.build_client_config(),
            tracing_config: value.build_tracing_config(),
            cache_control: value.cache_control.clone(),
            worker_size: value.worker_size,
            dry_run: value.dry_run,
            exclude_regex,
            max_objects: value.max_objects,
            key_source: value.build_key_source(),
            max_keys: value.max_keys,
            estimate_config: EstimateConfig {
                expected_objects: value.expected_objects,
                disable_estimate: value.disable_estimate,
                metrics_role_arn: value.metrics_role_arn.clone(),
            },
            failed_keys_file: value.failed_keys_file.clone(),
            progress_interval: Duration::from_secs(value.progress_interval_seconds),
            rate_limit_objects: value.rate_limit_objects,
            auto_complete_shell: value.auto_complete_shell,
        })
    }
}
