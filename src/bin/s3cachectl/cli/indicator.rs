use std::collections::BTreeMap;
use std::io;
use std::io::Write;
use std::sync::Arc;

use async_channel::Receiver;
use indicatif::{HumanCount, HumanDuration, ProgressBar, ProgressStyle};
use s3cachectl::types::run_context::RunContext;
use s3cachectl::types::{FixupStatistics, FixupStatus, ProgressReport};
use tokio::task::JoinHandle;

const UNKNOWN_EXPECTED_TOTAL: &str = "?";

pub fn show_indicator(
    stats_receiver: Receiver<FixupStatistics>,
    run_context: Arc<RunContext>,
    show_progress: bool,
    show_result: bool,
    dry_run: bool,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Ok(stats) = stats_receiver.recv().await {
            match stats {
                FixupStatistics::FixupComplete { status, .. } => {
                    if show_progress {
                        print!("{status}");
                        let _ = io::stdout().flush();
                    }
                }
                FixupStatistics::Progress(report) => {
                    if show_progress {
                        print!("{}", format_progress_report(&report));
                        let _ = io::stdout().flush();
                    }
                }
                FixupStatistics::FixupError { key, error } => {
                    eprintln!("{}", format_failure(&key, &error, show_progress));
                }
            }
        }

        if show_result {
            let report = run_context.progress_report("");
            let progress_text = ProgressBar::new(0);
            if let Ok(progress_style) = ProgressStyle::with_template("{msg}") {
                progress_text.set_style(progress_style);
            }

            println!();
            progress_text.finish_with_message(format_result(&report, dry_run));
            println!();
            let _ = io::stdout().flush();
        }
    })
}

pub fn format_progress_report(report: &ProgressReport) -> String {
    let expected_total = report
        .expected_total
        .map_or(UNKNOWN_EXPECTED_TOTAL.to_string(), |expected| {
            expected.to_string()
        });

    format!(
        "\n{:<30} Totals: {}/{} objects. Avg: {:.2} obj/s. ETA: {}    \n{}\n{}\n",
        report.key,
        report.processed,
        expected_total,
        report.objects_per_sec,
        report.eta,
        format_status_histogram(&report.status_histogram),
        format_content_type_histogram(&report.content_type_histogram),
    )
}

/// Status characters share the line, so a failure starts on a new one while they are drawn.
pub fn format_failure(key: &str, error: &str, show_progress: bool) -> String {
    let line_break = if show_progress { "\n" } else { "" };
    format!("{line_break}failed to fix up {key}: {error}")
}

fn format_status_histogram(histogram: &BTreeMap<FixupStatus, u64>) -> String {
    histogram
        .iter()
        .map(|(status, count)| format!("{status}({status:?}): {count}"))
        .collect::<Vec<_>>()
        .join("  ")
}

fn format_content_type_histogram(histogram: &BTreeMap<String, u64>) -> String {
    histogram
        .iter()
        .map(|(content_type, count)| format!("{content_type}: {count}"))
        .collect::<Vec<_>>()
        .join("  ")
}

fn format_result(report: &ProgressReport, dry_run: bool) -> String {
    let written = if dry_run { "would write" } else { "written" };
    format!(
        "processed {:>3} objects | {:.2} objects/sec,  {} {} objects,  failed {} objects,  duration {}",
        HumanCount(report.processed),
        report.objects_per_sec,
        written,
        HumanCount(report.copied),
        HumanCount(report.failed),
        HumanDuration(report.elapsed),
    )
}
