use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

use crate::types::{FixupStatus, ProgressReport};

const SECS_PER_HOUR: u64 = 60 * 60;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;
const UNSET_CONTENT_TYPE_LABEL: &str = "(unset)";
const UNKNOWN_ETA: &str = "-";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Histograms {
    pub status: BTreeMap<FixupStatus, u64>,
    pub content_type: BTreeMap<String, u64>,
}

impl Histograms {
    pub fn total(&self) -> u64 {
        self.status.values().sum()
    }

    /// Objects that were written, or would have been with `--dry-run`.
    pub fn written(&self) -> u64 {
        self.status
            .iter()
            .filter(|(status, _)| status.is_written())
            .map(|(_, count)| count)
            .sum()
    }
}

/// Counters and histograms shared by every worker of one run.
///
/// Counters are atomics. The histograms and the last-shown instant of the status line
/// are guarded by two independent mutexes, so a worker updating the histograms never
/// waits for the one producing a status report and vice versa.
pub struct RunContext {
    processed: AtomicU64,
    copied: AtomicU64,
    failed: AtomicU64,
    admitted_writes: AtomicU64,
    expected_total: OnceLock<u64>,
    start_time: Instant,
    progress_interval: Duration,
    last_status_shown: Mutex<Instant>,
    histograms: Mutex<Histograms>,
}

impl RunContext {
    pub fn new(progress_interval: Duration) -> Self {
        let start_time = Instant::now();
        Self {
            processed: AtomicU64::new(0),
            copied: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            admitted_writes: AtomicU64::new(0),
            expected_total: OnceLock::new(),
            start_time,
            progress_interval,
            last_status_shown: Mutex::new(start_time),
            histograms: Mutex::new(Histograms::default()),
        }
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::SeqCst)
    }

    pub fn copied(&self) -> u64 {
        self.copied.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::SeqCst)
    }

    /// `None` until an estimate has been stored. A stored zero is also treated as unknown.
    pub fn expected_total(&self) -> Option<u64> {
        self.expected_total
            .get()
            .copied()
            .filter(|expected| *expected > 0)
    }

    /// Returns false if an estimate has already been stored.
    pub fn set_expected_total(&self, expected_total: u64) -> bool {
        self.expected_total.set(expected_total).is_ok()
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Reserves one write slot under `max_objects`.
    pub fn try_admit_write(&self, max_objects: Option<u64>) -> bool {
        let Some(max_objects) = max_objects else {
            return true;
        };

        self.admitted_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |admitted| {
                (admitted < max_objects).then_some(admitted + 1)
            })
            .is_ok()
    }

    /// True once every write slot has been handed out, including slots whose copy failed.
    pub fn is_cap_reached(&self, max_objects: Option<u64>) -> bool {
        max_objects.is_some_and(|max_objects| {
            max_objects <= self.admitted_writes.load(Ordering::SeqCst)
        })
    }

    pub fn record_copied(&self) {
        self.copied.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_outcome(
        &self,
        key: &str,
        status: FixupStatus,
        content_type: Option<&str>,
    ) -> Option<ProgressReport> {
        self.processed.fetch_add(1, Ordering::SeqCst);

        {
            let mut histograms = self.histograms.lock().unwrap();
            *histograms.status.entry(status).or_insert(0) += 1;
            *histograms
                .content_type
                .entry(content_type.unwrap_or(UNSET_CONTENT_TYPE_LABEL).to_string())
                .or_insert(0) += 1;
        }

        self.report_if_due(key)
    }

    pub fn record_failure(&self, key: &str) -> Option<ProgressReport> {
        self.processed.fetch_add(1, Ordering::SeqCst);
        self.failed.fetch_add(1, Ordering::SeqCst);

        self.report_if_due(key)
    }

    pub fn histograms(&self) -> Histograms {
        self.histograms.lock().unwrap().clone()
    }

    pub fn progress_report(&self, key: &str) -> ProgressReport {
        let elapsed = self.elapsed();
        let processed = self.processed();
        let expected_total = self.expected_total();
        let objects_per_sec = objects_per_sec(processed, elapsed);
        let Histograms {
            status,
            content_type,
        } = self.histograms();

        ProgressReport {
            key: key.to_string(),
            processed,
            copied: self.copied(),
            failed: self.failed(),
            expected_total,
            objects_per_sec,
            eta: format_eta(expected_total, processed, objects_per_sec),
            elapsed,
            status_histogram: status,
            content_type_histogram: content_type,
        }
    }

    fn report_if_due(&self, key: &str) -> Option<ProgressReport> {
        {
            let now = Instant::now();
            let mut last_status_shown = self.last_status_shown.lock().unwrap();
            if now.duration_since(*last_status_shown) < self.progress_interval {
                return None;
            }
            *last_status_shown = now;
        }

        Some(self.progress_report(key))
    }
}

pub fn objects_per_sec(processed: u64, elapsed: Duration) -> f64 {
    let elapsed_secs = elapsed.as_secs_f64();
    if elapsed_secs <= 0.0 {
        return 0.0;
    }

    processed as f64 / elapsed_secs
}

pub fn format_eta(expected_total: Option<u64>, processed: u64, objects_per_sec: f64) -> String {
    let Some(expected_total) = expected_total else {
        return UNKNOWN_ETA.to_string();
    };
    if expected_total <= processed || objects_per_sec <= 0.0 {
        return UNKNOWN_ETA.to_string();
    }

    let remaining_secs = ((expected_total - processed) as f64 / objects_per_sec) as u64;
    if remaining_secs == 0 {
        return UNKNOWN_ETA.to_string();
    }

    let days = remaining_secs / SECS_PER_DAY;
    if days > 0 {
        let hours = (remaining_secs - days * SECS_PER_DAY) as f64 / SECS_PER_HOUR as f64;
        return format!("{days}d {hours:.1}h");
    }

    let hours = remaining_secs / SECS_PER_HOUR;
    let minutes = (remaining_secs - hours * SECS_PER_HOUR) as f64 / 60.0;
    format!("{hours}h {minutes:.1}m")
}
