mod common;

use std::time::Duration;

use s3cachectl::storage::in_memory::InMemoryStore;
use s3cachectl::types::FixupStatistics;

use common::*;

const NUMBER_OF_OBJECTS: usize = 3000;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_objects_few_workers() {
    init_dummy_tracing_subscriber();

    let store = InMemoryStore::with_jitter(Duration::from_micros(500));
    let mut expected_writes = 0;
    for index in 0..NUMBER_OF_OBJECTS {
        let content_type = match index % 4 {
            0 => Some("image/jpeg"),
            1 => Some("image/png"),
            2 => None,
            _ => Some("text/css"),
        };
        let cache_control = if index % 5 == 0 {
            Some(DESIRED_CACHE_CONTROL)
        } else {
            None
        };
        if content_type.is_none() || cache_control.is_none() {
            expected_writes += 1;
        }

        store.put(
            TARGET_BUCKET,
            &format!("dir{}/object-{index:05}", index % 7),
            content_type,
            cache_control,
        );
    }

    let dir = tempfile::tempdir().unwrap();
    let config = build_config(
        &dir.path().join("error_keys.txt"),
        &[
            "--worker-size",
            "16",
            "--max-keys",
            "250",
            "--progress-interval-seconds",
            "0",
        ],
    );
    let mut pipeline = create_pipeline(&store, config);

    let stats = run_pipeline(&mut pipeline).await;

    assert!(!pipeline.has_error());

    let run_context = pipeline.get_run_context();
    assert_eq!(run_context.processed(), NUMBER_OF_OBJECTS as u64);
    assert_eq!(run_context.copied(), expected_writes);
    assert_eq!(run_context.histograms().total(), NUMBER_OF_OBJECTS as u64);
    assert_eq!(
        run_context.histograms().content_type.values().sum::<u64>(),
        NUMBER_OF_OBJECTS as u64
    );
    assert_eq!(store.copies().len() as u64, expected_writes);

    let mut keys: Vec<String> = completed_statuses(&stats)
        .into_iter()
        .map(|(key, _)| key)
        .collect();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), NUMBER_OF_OBJECTS);

    let progress_reports: Vec<u64> = stats
        .iter()
        .filter_map(|stat| match stat {
            FixupStatistics::Progress(report) => Some(report.processed),
            _ => None,
        })
        .collect();
    assert!(!progress_reports.is_empty());
    assert!(
        progress_reports
            .iter()
            .all(|processed| *processed <= NUMBER_OF_OBJECTS as u64)
    );
}
