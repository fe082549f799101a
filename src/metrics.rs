// Pipeline metrics
//
// Counters for what the launch pipeline did during this process's lifetime

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Launch pipeline metrics
///
/// Uses atomic operations so the orchestrator can record from any task
/// without locking. Logged as a summary when the launcher exits.
#[derive(Debug)]
pub struct Metrics {
    /// Runtime installer runs that completed and verified
    pub runtime_installs: AtomicUsize,

    /// Install checks that found the runtime already present
    pub runtime_install_skips: AtomicUsize,

    /// Files copied by asset synchronization
    pub asset_files_copied: AtomicUsize,

    /// Syncs skipped because no reference mod set was found
    pub asset_sources_missing: AtomicUsize,

    /// Play requests that reached a spawned game process
    pub launches_succeeded: AtomicUsize,

    /// Play requests that ended in an error result
    pub launches_failed: AtomicUsize,

    /// Total time spent inside the pipeline in milliseconds
    pub total_pipeline_time_ms: AtomicU64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            runtime_installs: AtomicUsize::new(0),
            runtime_install_skips: AtomicUsize::new(0),
            asset_files_copied: AtomicUsize::new(0),
            asset_sources_missing: AtomicUsize::new(0),
            launches_succeeded: AtomicUsize::new(0),
            launches_failed: AtomicUsize::new(0),
            total_pipeline_time_ms: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_runtime_install(&self) {
        self.runtime_installs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_runtime_install_skip(&self) {
        self.runtime_install_skips.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_assets_copied(&self, files: usize) {
        self.asset_files_copied.fetch_add(files, Ordering::Relaxed);
    }

    pub fn record_asset_source_missing(&self) {
        self.asset_sources_missing.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome and duration of one play request
    pub fn record_launch(&self, ok: bool, duration: Duration) {
        if ok {
            self.launches_succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.launches_failed.fetch_add(1, Ordering::Relaxed);
        }
        self.total_pipeline_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average pipeline time per play request in milliseconds
    pub fn avg_pipeline_time_ms(&self) -> f64 {
        let total = self.total_pipeline_time_ms.load(Ordering::Relaxed);
        let count = self.launches_succeeded.load(Ordering::Relaxed)
            + self.launches_failed.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        tracing::info!("=== Launcher Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Launches: {} succeeded, {} failed (avg pipeline {:.0}ms)",
            self.launches_succeeded.load(Ordering::Relaxed),
            self.launches_failed.load(Ordering::Relaxed),
            self.avg_pipeline_time_ms()
        );
        tracing::info!(
            "Runtime: {} installed, {} already present",
            self.runtime_installs.load(Ordering::Relaxed),
            self.runtime_install_skips.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Assets: {} files copied, {} missing sources",
            self.asset_files_copied.load(Ordering::Relaxed),
            self.asset_sources_missing.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new();
        assert_eq!(metrics.launches_succeeded.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.avg_pipeline_time_ms(), 0.0);
    }

    #[test]
    fn test_record_launches() {
        let metrics = Metrics::new();

        metrics.record_launch(true, Duration::from_millis(100));
        metrics.record_launch(false, Duration::from_millis(200));

        assert_eq!(metrics.launches_succeeded.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.launches_failed.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.total_pipeline_time_ms.load(Ordering::Relaxed), 300);
        assert_eq!(metrics.avg_pipeline_time_ms(), 150.0);
    }

    #[test]
    fn test_install_and_asset_counters() {
        let metrics = Metrics::new();

        metrics.record_runtime_install();
        metrics.record_runtime_install_skip();
        metrics.record_runtime_install_skip();
        metrics.record_assets_copied(12);
        metrics.record_assets_copied(3);
        metrics.record_asset_source_missing();

        assert_eq!(metrics.runtime_installs.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.runtime_install_skips.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.asset_files_copied.load(Ordering::Relaxed), 15);
        assert_eq!(metrics.asset_sources_missing.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_uptime() {
        let metrics = Metrics::new();
        thread::sleep(Duration::from_millis(10));
        assert!(metrics.uptime().as_millis() >= 10);
    }
}
