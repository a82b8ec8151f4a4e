#[cfg(test)]
mod tests {
    use crate::config::args::*;

    #[test]
    fn with_cache_control() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3cachectl",
            "--cache-control",
            "public, max-age=86400",
            "--target-bucket",
            "target-bucket",
        ];

        let config = build_config_from_args(args).unwrap();

        assert_eq!(config.cache_control, "public, max-age=86400");
    }

    #[test]
    fn with_exclude_regex() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3cachectl",
            "--exclude-regex",
            r"^thumbnails/",
            "--target-bucket",
            "target-bucket",
        ];

        let config = build_config_from_args(args).unwrap();

        assert!(config.is_excluded_key("thumbnails/a.png"));
        assert!(!config.is_excluded_key("images/thumbnails/a.png"));
    }

    #[test]
    fn with_invalid_exclude_regex() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3cachectl",
            "--exclude-regex",
            r"(unclosed",
            "--target-bucket",
            "target-bucket",
        ];
        assert!(build_config_from_args(args).is_err());

        // accepted by the command line parser but not by the key matcher.
        let args = vec![
            "s3cachectl",
            "--exclude-regex",
            r"^(?!thumbnails/)",
            "--target-bucket",
            "target-bucket",
        ];
        let result = build_config_from_args(args);
        assert!(result.unwrap_err().starts_with(INVALID_EXCLUDE_REGEX));
    }

    #[test]
    fn with_max_objects() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3cachectl",
            "--max-objects",
            "5",
            "--target-bucket",
            "target-bucket",
        ];

        let config = build_config_from_args(args).unwrap();

        assert_eq!(config.max_objects, Some(5));

        let args = vec![
            "s3cachectl",
            "--max-objects",
            "0",
            "--target-bucket",
            "target-bucket",
        ];
        assert!(build_config_from_args(args).is_err());
    }

    fn init_dummy_tracing_subscriber() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("dummy=trace")
            .try_init();
    }
}
