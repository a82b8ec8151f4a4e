#[cfg(test)]
mod tests {
    use crate::config::args::*;

    #[test]
    fn listing_with_start_after() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3cachectl",
            "--start-after",
            "images/2019/",
            "--target-bucket",
            "target-bucket",
        ];

        let config = build_config_from_args(args).unwrap();

        assert_eq!(
            config.key_source,
            KeySource::Listing {
                start_after: Some("images/2019/".to_string())
            }
        );
    }

    #[test]
    fn read_keys_from_stdin() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3cachectl",
            "--read-keys-from-stdin",
            "--target-bucket",
            "target-bucket",
        ];

        let config = build_config_from_args(args).unwrap();

        assert_eq!(config.key_source, KeySource::Stdin);
    }

    #[test]
    fn keys_file() {
        init_dummy_tracing_subscriber();

        let keys_file = tempfile::NamedTempFile::new().unwrap();
        let path = keys_file.path().to_string_lossy().to_string();

        let args = vec![
            "s3cachectl",
            "--keys-file",
            path.as_str(),
            "--target-bucket",
            "target-bucket",
        ];

        let config = build_config_from_args(args).unwrap();

        assert_eq!(config.key_source, KeySource::File(PathBuf::from(path)));
    }

    #[test]
    fn keys_file_not_found() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3cachectl",
            "--keys-file",
            "./test_data/no_such_keys_file.txt",
            "--target-bucket",
            "target-bucket",
        ];

        assert!(build_config_from_args(args).is_err());
    }

    #[test]
    fn conflicting_key_sources() {
        init_dummy_tracing_subscriber();

        let keys_file = tempfile::NamedTempFile::new().unwrap();
        let path = keys_file.path().to_string_lossy().to_string();

        let conflicting_args = vec![
            vec![
                "s3cachectl",
                "--read-keys-from-stdin",
                "--keys-file",
                path.as_str(),
                "-t",
                "target-bucket",
            ],
            vec![
                "s3cachectl",
                "--read-keys-from-stdin",
                "--start-after",
                "key",
                "-t",
                "target-bucket",
            ],
            vec![
                "s3cachectl",
                "--keys-file",
                path.as_str(),
                "--start-after",
                "key",
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
