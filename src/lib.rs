/*!
# Overview
s3cachectl is a bulk Cache-Control maintenance tool for Amazon S3.
It walks every object in a bucket (or a list of keys), inspects the stored content type and
rewrites the Cache-Control metadata of objects that do not already carry the desired value.
Objects can be rewritten in place or copied into another bucket.

## Features
- Fast
  Objects are processed by many concurrent workers (`--worker-size`, default 200) that share one
  bounded queue fed by the listing.

- Safe to repeat
  Objects whose Cache-Control already matches are skipped without a write, so a second run over
  the same bucket writes nothing.

- Resumable
  Keys of objects that could not be fixed are appended to `error_keys.txt`. The file can be passed
  back with `--keys-file` to retry only the failed objects. `--start-after` resumes a listing.

- Progress with ETA
  The number of objects in the bucket is estimated from the CloudWatch `NumberOfObjects` metric
  (optionally through an assumed role), or given with `--expected-objects`.

- Content type repair
  Objects without a content type are written as `image/png`. Pictures matching `--exclude-regex`
  are left untouched.

## As a library
s3cachectl CLI is a thin wrapper of the s3cachectl library.

Example usage
=============

```Toml
[dependencies]
s3cachectl = "0.3"
tokio = { version = "1", features = ["full"] }
```

```no_run
use s3cachectl::config::Config;
use s3cachectl::config::args::parse_from_args;
use s3cachectl::pipeline::Pipeline;
use s3cachectl::types::FixupStatistics;
use s3cachectl::types::token::create_pipeline_cancellation_token;

#[tokio::main]
async fn main() {
    // You can use all the arguments for s3cachectl CLI.
    let args = vec![
        "program_name",
        "--cache-control",
        "public, max-age=86400",
        "--max-objects",
        "100",
        "--target-bucket",
        "s3://test-bucket",
    ];

    let config = Config::try_from(parse_from_args(args).unwrap()).unwrap();

    let cancellation_token = create_pipeline_cancellation_token();
    let mut pipeline = Pipeline::new(config, cancellation_token).await;
    let stats_receiver = pipeline.get_stats_receiver();

    pipeline.run().await;

    let mut total_fixup_count = 0;
    while let Ok(stats) = stats_receiver.try_recv() {
        if matches!(stats, FixupStatistics::FixupComplete { .. }) {
            total_fixup_count += 1;
        }
    }
    println!("Total fixup count: {total_fixup_count}");

    let run_context = pipeline.get_run_context();
    println!(
        "processed: {}, copied: {}, failed: {}",
        run_context.processed(),
        run_context.copied(),
        run_context.failed()
    );

    if pipeline.has_error() {
        println!("An error has occurred.\n\n");
        println!("{:?}", pipeline.get_errors_and_consume().unwrap()[0]);
    }
}
```

For more information about s3cachectl binary, see `s3cachectl -h`.
*/

pub use config::Config;
pub use config::args::CLIArgs;

pub mod config;
pub mod pipeline;
pub mod storage;
pub mod types;
