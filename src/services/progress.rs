//! Rate-limited elapsed time and ETA reporting.
//!
//! Workers call into one shared [`ProgressReporter`]. Each kind of report
//! keeps the time of its last emission in an atomic; a report is emitted
//! only by the caller that wins the compare-and-swap on that slot.

use crate::services::worker_pool::ProgressSink;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Estimated time left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eta {
    /// Not enough progress yet to extrapolate.
    Unknown,
    Remaining(Duration),
}

impl std::fmt::Display for Eta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Eta::Unknown => f.write_str("unknown"),
            Eta::Remaining(left) => f.write_str(&format_hms(*left)),
        }
    }
}

/// Extrapolate the time left from the throughput so far.
///
/// Throughput is measured in whole elapsed seconds; before the first full
/// second, or while nothing has been processed, the estimate is unknown.
pub fn estimate_eta(total_pixels: u64, pixels_left: u64, elapsed: Duration) -> Eta {
    if pixels_left == 0 {
        return Eta::Remaining(Duration::ZERO);
    }
    let seconds = elapsed.as_secs();
    let done = total_pixels.saturating_sub(pixels_left);
    if seconds == 0 || done == 0 {
        return Eta::Unknown;
    }

    let per_second = done as f64 / seconds as f64;
    Eta::Remaining(Duration::from_secs((pixels_left as f64 / per_second) as u64))
}

/// Format as zero-padded `HH:MM:SS`. Hours grow past two digits.
pub fn format_hms(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
}

/// Shared progress reporter for one downscale run.
#[derive(Debug)]
pub struct ProgressReporter {
    start: Instant,
    interval_ms: u64,
    total_pixels: u64,
    task_pixels: u64,
    last_elapsed_ms: AtomicU64,
    last_eta_ms: AtomicU64,
}

impl ProgressReporter {
    /// Start the clock. `total_pixels` is the number of source pixels the
    /// queued tasks cover, `task_pixels` the pixels of one task.
    pub fn new(total_pixels: u64, task_pixels: u64, interval: Duration) -> Self {
        Self {
            start: Instant::now(),
            interval_ms: interval.as_millis() as u64,
            total_pixels,
            task_pixels,
            last_elapsed_ms: AtomicU64::new(0),
            last_eta_ms: AtomicU64::new(0),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Log the elapsed time if the interval has passed since the last log.
    pub fn report_elapsed(&self) -> Option<Duration> {
        self.report_elapsed_at(self.elapsed())
    }

    pub fn report_elapsed_at(&self, elapsed: Duration) -> Option<Duration> {
        if !self.claim(&self.last_elapsed_ms, elapsed) {
            return None;
        }
        tracing::info!(elapsed = %format_hms(elapsed), "Time elapsed");
        Some(elapsed)
    }

    /// Log the ETA if the interval has passed since the last ETA log.
    pub fn estimate_time_left(&self, pixels_left: u64) -> Option<Eta> {
        self.estimate_time_left_at(pixels_left, self.elapsed())
    }

    pub fn estimate_time_left_at(&self, pixels_left: u64, elapsed: Duration) -> Option<Eta> {
        if !self.claim(&self.last_eta_ms, elapsed) {
            return None;
        }
        let eta = estimate_eta(self.total_pixels, pixels_left, elapsed);
        match eta {
            Eta::Unknown => tracing::info!("ETA unknown"),
            Eta::Remaining(left) => tracing::info!(eta = %format_hms(left), "Estimated time left"),
        }
        Some(eta)
    }

    /// Log the total elapsed time regardless of the interval.
    pub fn finish(&self) -> Duration {
        let elapsed = self.elapsed();
        tracing::info!(elapsed = %format_hms(elapsed), "Finished");
        elapsed
    }

    fn claim(&self, slot: &AtomicU64, elapsed: Duration) -> bool {
        let now = elapsed.as_millis() as u64;
        let last = slot.load(Ordering::Relaxed);
        if now.saturating_sub(last) < self.interval_ms {
            return false;
        }
        slot.compare_exchange(last, now, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
    }
}

impl ProgressSink for ProgressReporter {
    fn on_take(&self, tasks_left: usize) {
        let pixels_left = tasks_left as u64 * self.task_pixels;
        tracing::debug!(pixels_left, "Pixels left");
        let elapsed = self.elapsed();
        self.report_elapsed_at(elapsed);
        self.estimate_time_left_at(pixels_left, elapsed);
    }
}
