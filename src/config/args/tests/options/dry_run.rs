#[cfg(test)]
mod tests {
    use crate::config::args::*;

    #[test]
    fn with_default_value() {
        init_dummy_tracing_subscriber();

        let args = vec!["s3cachectl", "--target-bucket", "target-bucket"];

        let config = build_config_from_args(args).unwrap();

        assert!(!config.dry_run);
    }

    #[test]
    fn with_custom_value() {
        init_dummy_tracing_subscriber();

        let args = vec!["s3cachectl", "--dry-run", "--target-bucket", "target-bucket"];

        let config = build_config_from_args(args).unwrap();

        assert!(config.dry_run);
        assert_eq!(
            config.tracing_config.unwrap().tracing_level,
            log::Level::Info
        );
        assert!(!config.tracing_config.unwrap().json_tracing);
        assert!(!config.tracing_config.unwrap().aws_sdk_tracing);
        assert!(!config.tracing_config.unwrap().span_events_tracing);
        assert!(!config.tracing_config.unwrap().disable_color_tracing);
    }

    #[test]
    fn with_custom_value_with_tracing_option() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3cachectl",
            "--dry-run",
            "-vvv",
            "--json-tracing",
            "--disable-color-tracing",
            "--target-bucket",
            "target-bucket",
        ];

        let config = build_config_from_args(args).unwrap();

        assert!(config.dry_run);
        assert_eq!(
            config.tracing_config.unwrap().tracing_level,
            log::Level::Trace
        );
        assert!(config.tracing_config.unwrap().json_tracing);
        assert!(config.tracing_config.unwrap().disable_color_tracing);
    }

    #[test]
    fn with_silent_option() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3cachectl",
            "--dry-run",
            "-qq",
            "--json-tracing",
            "--target-bucket",
            "target-bucket",
        ];

        let config = build_config_from_args(args).unwrap();

        assert_eq!(
            config.tracing_config.unwrap().tracing_level,
            log::Level::Info
        );
        assert!(!config.tracing_config.unwrap().json_tracing);
    }

    #[test]
    fn with_quiet_error_level() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3cachectl",
            "--dry-run",
            "-q",
            "--json-tracing",
            "--target-bucket",
            "target-bucket",
        ];

        let config = build_config_from_args(args).unwrap();

        assert_eq!(
            config.tracing_config.unwrap().tracing_level,
            log::Level::Info
        );
        assert!(config.tracing_config.unwrap().json_tracing);
    }

    fn init_dummy_tracing_subscriber() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("dummy=trace")
            .try_init();
    }
}
