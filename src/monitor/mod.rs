//! Resource monitor
//!
//! Caches status snapshots, answers safety checks, runs the optional polling
//! task and keeps a bounded history of finished operations.

pub mod history;
pub mod polling;

pub use history::OperationHistory;
pub use polling::MonitoringOptions;

use crate::constants::{DEFAULT_CACHE_TIMEOUT_MS, DEFAULT_LOG_CAPACITY, DEFAULT_STORAGE_TIMEOUT_MS};
use crate::evaluator::evaluate;
use crate::lock_recover;
use crate::logging::EventLogger;
use crate::models::{
    EnvironmentProfile, OperationKind, OperationLogEntry, ResourceStatus, ResourceThresholds,
    SafetyCheck, StorageInfo,
};
use crate::operations::CostTable;
use crate::probe::{HostProbe, SystemProbe};
use crate::thresholds::{get_thresholds, DEFAULT_THRESHOLDS};
use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

struct CachedStatus {
    status: Arc<ResourceStatus>,
    taken_at: Instant,
}

pub(crate) struct MonitorInner<P: SystemProbe> {
    probe: P,
    thresholds: ResourceThresholds,
    costs: CostTable,
    cache_timeout: Duration,
    storage_timeout: Duration,
    enable_caching: bool,
    cache: Mutex<Option<CachedStatus>>,
    /// Serializes probing so the cache has a single writer
    refresh_gate: tokio::sync::Mutex<()>,
    history: Mutex<OperationHistory>,
    polling: Mutex<Option<JoinHandle<()>>>,
    logger: EventLogger,
}

impl<P: SystemProbe> Drop for MonitorInner<P> {
    fn drop(&mut self) {
        let slot = self.polling.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }
}

/// Explicitly constructed monitor service. Clones share the same cache,
/// history and polling task.
pub struct ResourceMonitor<P: SystemProbe = HostProbe> {
    inner: Arc<MonitorInner<P>>,
}

impl<P: SystemProbe> Clone for ResourceMonitor<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl ResourceMonitor<HostProbe> {
    /// Host-backed monitor with the thresholds of `profile` and built-in costs
    pub fn new(profile: EnvironmentProfile) -> Self {
        ResourceMonitor::builder(HostProbe::new(profile))
            .thresholds(get_thresholds(profile))
            .build()
    }
}

impl<P: SystemProbe> ResourceMonitor<P> {
    pub fn builder(probe: P) -> MonitorBuilder<P> {
        MonitorBuilder::new(probe)
    }

    /// Current snapshot, served from cache while younger than the cache timeout
    pub async fn get_status(&self) -> Arc<ResourceStatus> {
        if let Some(status) = self.cached_status() {
            return status;
        }

        let _gate = self.inner.refresh_gate.lock().await;
        // Another caller may have refreshed while this one waited
        if let Some(status) = self.cached_status() {
            return status;
        }

        let status = Arc::new(self.probe_status().await);
        if self.inner.enable_caching {
            *lock_recover(&self.inner.cache) = Some(CachedStatus {
                status: Arc::clone(&status),
                taken_at: Instant::now(),
            });
        }
        status
    }

    /// Whether `kind` over `size` input bytes can run now
    pub async fn check_operation(&self, kind: OperationKind, size: u64) -> SafetyCheck {
        let status = self.get_status().await;
        let check = evaluate(&status, kind, size, &self.inner.thresholds, &self.inner.costs);
        self.inner.logger.log_check(kind, size, &check);
        check
    }

    /// Report a status to `callback` every interval until stopped.
    ///
    /// Replaces any monitoring already running on this monitor.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn start_monitoring<F>(&self, callback: F, options: MonitoringOptions)
    where
        F: Fn(Arc<ResourceStatus>) + Send + Sync + 'static,
    {
        let interval = options.effective_interval();
        let mut slot = lock_recover(&self.inner.polling);

        if let Some(previous) = slot.take() {
            previous.abort();
            self.inner.logger.log_monitoring_stopped("replaced by a new monitoring request");
        }

        *slot = Some(polling::spawn_polling(Arc::downgrade(&self.inner), interval, callback));
        self.inner.logger.log_monitoring_started(interval);
    }

    /// Stop the polling task. Does nothing when none is running.
    pub fn stop_monitoring(&self) {
        if let Some(handle) = lock_recover(&self.inner.polling).take() {
            handle.abort();
            self.inner.logger.log_monitoring_stopped("stopped by caller");
        }
    }

    pub fn is_monitoring(&self) -> bool {
        lock_recover(&self.inner.polling)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Append to the operation history, evicting the oldest entry when full
    pub fn log_operation(&self, entry: OperationLogEntry) {
        self.inner.logger.log_operation(&entry);
        lock_recover(&self.inner.history).push(entry);
    }

    /// Operation history, oldest first
    pub fn get_operation_logs(&self) -> Vec<OperationLogEntry> {
        lock_recover(&self.inner.history).to_vec()
    }

    /// Force the next `get_status` to probe
    pub fn clear_cache(&self) {
        *lock_recover(&self.inner.cache) = None;
    }

    /// Run `operation`, recording memory use, duration and outcome in the history
    pub async fn track_operation<F, T, E>(
        &self,
        kind: OperationKind,
        file_size: Option<u64>,
        operation: F,
    ) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: Display,
    {
        let timestamp = chrono::Utc::now();
        let memory_before = self.inner.probe.sample_memory().used;
        let started = Instant::now();

        let result = operation.await;

        let mut entry = OperationLogEntry::new(kind, memory_before, result.is_ok());
        entry.timestamp = timestamp;
        entry.file_size = file_size;
        entry.duration_ms = Some(started.elapsed().as_millis() as u64);
        entry.memory_after = Some(self.inner.probe.sample_memory().used);
        if let Err(e) = &result {
            entry.error = Some(e.to_string());
        }

        self.log_operation(entry);
        result
    }

    pub fn thresholds(&self) -> &ResourceThresholds {
        &self.inner.thresholds
    }

    pub fn costs(&self) -> &CostTable {
        &self.inner.costs
    }

    pub fn probe(&self) -> &P {
        &self.inner.probe
    }

    pub fn cache_timeout(&self) -> Duration {
        self.inner.cache_timeout
    }

    fn cached_status(&self) -> Option<Arc<ResourceStatus>> {
        if !self.inner.enable_caching {
            return None;
        }
        lock_recover(&self.inner.cache)
            .as_ref()
            .filter(|cached| cached.taken_at.elapsed() < self.inner.cache_timeout)
            .map(|cached| Arc::clone(&cached.status))
    }

    /// Sample memory, CPU and storage in that order into one snapshot
    async fn probe_status(&self) -> ResourceStatus {
        let memory = self.inner.probe.sample_memory();
        let cpu = self.inner.probe.sample_cpu();
        let storage = self.read_storage().await;

        let status = ResourceStatus::compose(memory, cpu, storage, &self.inner.thresholds);
        self.inner.logger.log_status(&status);
        status
    }

    /// Storage reading, or unknown when the probe outlives the storage timeout
    async fn read_storage(&self) -> Option<StorageInfo> {
        let timeout = self.inner.storage_timeout;
        match tokio::time::timeout(timeout, self.inner.probe.sample_storage()).await {
            Ok(storage) => storage,
            Err(_) => {
                self.inner.logger.log_probe_degraded(
                    "storage",
                    &format!("storage read did not finish within {}ms", timeout.as_millis()),
                );
                None
            }
        }
    }
}

/// Builder for `ResourceMonitor`
pub struct MonitorBuilder<P: SystemProbe> {
    probe: P,
    thresholds: ResourceThresholds,
    costs: CostTable,
    cache_timeout: Duration,
    storage_timeout: Duration,
    enable_caching: bool,
    log_capacity: usize,
    logger: EventLogger,
}

impl<P: SystemProbe> MonitorBuilder<P> {
    fn new(probe: P) -> Self {
        Self {
            probe,
            thresholds: DEFAULT_THRESHOLDS,
            costs: CostTable::default(),
            cache_timeout: Duration::from_millis(DEFAULT_CACHE_TIMEOUT_MS),
            storage_timeout: Duration::from_millis(DEFAULT_STORAGE_TIMEOUT_MS),
            enable_caching: true,
            log_capacity: DEFAULT_LOG_CAPACITY,
            logger: EventLogger::default(),
        }
    }

    pub fn thresholds(mut self, thresholds: ResourceThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn costs(mut self, costs: CostTable) -> Self {
        self.costs = costs;
        self
    }

    pub fn cache_timeout(mut self, timeout: Duration) -> Self {
        self.cache_timeout = timeout;
        self
    }

    /// Bound on a storage read; a slower read reports storage as unknown
    pub fn storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }

    pub fn enable_caching(mut self, enabled: bool) -> Self {
        self.enable_caching = enabled;
        self
    }

    pub fn log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity;
        self
    }

    pub fn logger(mut self, logger: EventLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn build(self) -> ResourceMonitor<P> {
        ResourceMonitor {
            inner: Arc::new(MonitorInner {
                probe: self.probe,
                thresholds: self.thresholds,
                costs: self.costs,
                cache_timeout: self.cache_timeout,
                storage_timeout: self.storage_timeout,
                enable_caching: self.enable_caching,
                cache: Mutex::new(None),
                refresh_gate: tokio::sync::Mutex::new(()),
                history: Mutex::new(OperationHistory::new(self.log_capacity)),
                polling: Mutex::new(None),
                logger: self.logger,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{GB, MB};
    use crate::models::{CpuInfo, MemoryInfo, Recommendation};
    use crate::probe::FixedProbe;

    /// Memory and CPU answer at once; the storage read never completes
    struct StalledStorage(FixedProbe);

    impl SystemProbe for StalledStorage {
        fn sample_memory(&self) -> MemoryInfo {
            self.0.sample_memory()
        }

        fn sample_cpu(&self) -> CpuInfo {
            self.0.sample_cpu()
        }

        fn sample_storage(&self) -> impl Future<Output = Option<StorageInfo>> + Send {
            std::future::pending()
        }
    }

    fn monitor(available: u64) -> ResourceMonitor<FixedProbe> {
        ResourceMonitor::builder(FixedProbe::with_available_memory(available)).build()
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_is_cached_within_window() {
        let monitor = monitor(GB);
        let first = monitor.get_status().await;
        tokio::time::advance(Duration::from_millis(4999)).await;
        let second = monitor.get_status().await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(monitor.probe().sample_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_refreshes_after_window() {
        let monitor = monitor(GB);
        let first = monitor.get_status().await;
        monitor.probe().set_available_memory(2 * GB);
        tokio::time::advance(Duration::from_millis(5000)).await;
        let second = monitor.get_status().await;

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.memory.available, 2 * GB);
        assert_eq!(monitor.probe().sample_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_cache_forces_probe() {
        let monitor = monitor(GB);
        monitor.get_status().await;
        monitor.clear_cache();
        monitor.get_status().await;
        assert_eq!(monitor.probe().sample_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_storage_read_reports_unknown() {
        let monitor = ResourceMonitor::builder(StalledStorage(FixedProbe::with_available_memory(GB)))
            .storage_timeout(Duration::from_millis(250))
            .build();

        let started = Instant::now();
        let status = monitor.get_status().await;

        assert!(status.storage.is_none());
        assert_eq!(status.memory.available, GB);
        assert!(started.elapsed() >= Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_storage_read_releases_checks() {
        let monitor = ResourceMonitor::builder(StalledStorage(FixedProbe::with_available_memory(2 * GB)))
            .enable_caching(false)
            .build();

        // Each check takes the refresh gate; none may hang behind the storage read
        for _ in 0..3 {
            let check = monitor.check_operation(OperationKind::FileUpload, MB).await;
            assert!(check.safe);
        }
    }

    #[tokio::test]
    async fn test_disabled_cache_probes_every_call() {
        let monitor = ResourceMonitor::builder(FixedProbe::with_available_memory(GB))
            .enable_caching(false)
            .build();
        monitor.get_status().await;
        monitor.get_status().await;
        assert_eq!(monitor.probe().sample_count(), 2);
    }

    #[tokio::test]
    async fn test_clones_share_cache() {
        let monitor = monitor(GB);
        let clone = monitor.clone();
        monitor.get_status().await;
        clone.get_status().await;
        assert_eq!(monitor.probe().sample_count(), 1);
    }

    #[tokio::test]
    async fn test_check_operation_uses_injected_costs() {
        let costs = CostTable::default()
            .with_override(
                OperationKind::Waveform,
                crate::models::OperationCost::new(1.0, 1.0, MB, 2 * MB, "tiny"),
            )
            .unwrap();
        let monitor = ResourceMonitor::builder(FixedProbe::with_available_memory(2 * GB))
            .costs(costs)
            .build();

        let check = monitor.check_operation(OperationKind::Waveform, 10 * MB).await;
        assert_eq!(check.estimated_memory_needed, 10 * MB);
        assert_eq!(check.recommendation, Recommendation::Proceed);
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let monitor = ResourceMonitor::builder(FixedProbe::with_available_memory(GB))
            .log_capacity(2)
            .build();
        for i in 0..3 {
            monitor.log_operation(OperationLogEntry::new(OperationKind::DataExport, i, true));
        }
        let logs = monitor.get_operation_logs();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].memory_before, 1);
    }

    #[tokio::test]
    async fn test_track_operation_records_failure() {
        let monitor = monitor(GB);
        let result: Result<(), String> = monitor
            .track_operation(OperationKind::Waveform, Some(10 * MB), async {
                Err("decoder crashed".to_string())
            })
            .await;

        assert!(result.is_err());
        let logs = monitor.get_operation_logs();
        assert_eq!(logs.len(), 1);
        assert!(!logs[0].success);
        assert_eq!(logs[0].error.as_deref(), Some("decoder crashed"));
        assert_eq!(logs[0].file_size, Some(10 * MB));
        assert!(logs[0].memory_after.is_some());
        assert!(logs[0].duration_ms.is_some());
    }
}
