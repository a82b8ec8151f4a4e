#[cfg(test)]
mod tests {
    use crate::config::args::*;

    #[test]
    fn with_expected_objects() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3cachectl",
            "--expected-objects",
            "3867874",
            "--target-bucket",
            "target-bucket",
        ];

        let config = build_config_from_args(args).unwrap();

        assert_eq!(config.estimate_config.expected_objects, Some(3_867_874));
        assert!(!config.estimate_config.is_metrics_query_required());
    }

    #[test]
    fn with_disable_estimate() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3cachectl",
            "--disable-estimate",
            "--target-bucket",
            "target-bucket",
        ];

        let config = build_config_from_args(args).unwrap();

        assert!(config.estimate_config.disable_estimate);
        assert!(!config.estimate_config.is_metrics_query_required());
    }

    #[test]
    fn with_metrics_role_arn() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3cachectl",
            "--metrics-role-arn",
            "arn:aws:iam::123456789012:role/metrics",
            "--target-bucket",
            "target-bucket",
        ];

        let config = build_config_from_args(args).unwrap();

        assert_eq!(
            config.estimate_config.metrics_role_arn,
            Some("arn:aws:iam::123456789012:role/metrics".to_string())
        );
        assert!(config.estimate_config.is_metrics_query_required());
    }

    #[test]
    fn with_progress_interval() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3cachectl",
            "--progress-interval-seconds",
            "0",
            "--target-bucket",
            "target-bucket",
        ];

        let config = build_config_from_args(args).unwrap();

        assert_eq!(config.progress_interval, Duration::ZERO);
    }

    #[test]
    fn conflicting_estimate_options() {
        init_dummy_tracing_subscriber();

        let conflicting_args = vec![
            vec![
                "s3cachectl",
                "--expected-objects",
                "10",
                "--disable-estimate",
                "-t",
                "target-bucket",
            ],
            vec![
                "s3cachectl",
                "--expected-objects",
                "10",
                "--metrics-role-arn",
                "arn:aws:iam::123456789012:role/metrics",
                "-t",
                "target-bucket",
            ],
            vec![
                "s3cachectl",
                "--disable-estimate",
                "--metrics-role-arn",
                "arn:aws:iam::123456789012:role/metrics",
                "-t",
                "target-bucket",
            ],
        ];

        for args in conflicting_args {
            assert!(parse_from_args(args.clone()).is_err(), "{args:?}");
        }
    }

    fn init_dummy_tracing_subscriber() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("dummy=trace")
            .try_init();
    }
}
