#[cfg(test)]
mod tests {
    use crate::config::args::*;

    #[test]
    fn with_default_value() {
        init_dummy_tracing_subscriber();

        let args = vec!["s3cachectl", "--target-bucket", "target-bucket"];

        let config = build_config_from_args(args).unwrap();

        let timeout_config = config.client_config.cli_timeout_config;
        assert!(timeout_config.operation_timeout_milliseconds.is_none());
        assert!(
            timeout_config
                .operation_attempt_timeout_milliseconds
                .is_none()
        );
        assert!(timeout_config.connect_timeout_milliseconds.is_none());
        assert!(timeout_config.read_timeout_milliseconds.is_none());
    }

    #[test]
    fn with_custom_value() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3cachectl",
            "--operation-timeout-milliseconds",
            "1000",
            "--operation-attempt-timeout-milliseconds",
            "2000",
            "--connect-timeout-milliseconds",
            "3000",
            "--read-timeout-milliseconds",
            "4000",
            "--target-bucket",
            "target-bucket",
        ];

        let config = build_config_from_args(args).unwrap();

        let timeout_config = config.client_config.cli_timeout_config;
        assert_eq!(timeout_config.operation_timeout_milliseconds, Some(1000));
        assert_eq!(
            timeout_config.operation_attempt_timeout_milliseconds,
            Some(2000)
        );
        assert_eq!(timeout_config.connect_timeout_milliseconds, Some(3000));
        assert_eq!(timeout_config.read_timeout_milliseconds, Some(4000));
    }

    fn init_dummy_tracing_subscriber() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("dummy=trace")
            .try_init();
    }
}
