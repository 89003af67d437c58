//! sysinfo-backed probe for the local machine

use crate::constants::DEFAULT_CPU_CORES;
use crate::lock_recover;
use crate::logging::EventLogger;
use crate::models::{CpuInfo, CpuSource, EnvironmentProfile, MemoryInfo, MemorySource, StorageInfo};
use crate::probe::{estimate, SystemProbe};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;
use sysinfo::{Disks, System, MINIMUM_CPU_UPDATE_INTERVAL};

struct HostState {
    system: System,
    /// When CPU counters were last refreshed; usage is only meaningful
    /// once two refreshes are far enough apart
    last_cpu_refresh: Option<Instant>,
}

/// Probe reading the host through sysinfo
pub struct HostProbe {
    state: Mutex<HostState>,
    profile: EnvironmentProfile,
    storage_path: PathBuf,
    logger: EventLogger,
}

impl HostProbe {
    pub fn new(profile: EnvironmentProfile) -> Self {
        Self {
            state: Mutex::new(HostState {
                system: System::new(),
                last_cpu_refresh: None,
            }),
            profile,
            storage_path: std::env::temp_dir(),
            logger: EventLogger::default(),
        }
    }

    /// Report storage for the disk holding `path`
    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = path.into();
        self
    }

    pub fn with_logger(mut self, logger: EventLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }
}

impl Default for HostProbe {
    fn default() -> Self {
        Self::new(EnvironmentProfile::default())
    }
}

impl SystemProbe for HostProbe {
    fn sample_memory(&self) -> MemoryInfo {
        let mut state = lock_recover(&self.state);
        state.system.refresh_memory();

        let system_total = state.system.total_memory();

        // A container limit below physical memory is the real budget
        if let Some(limits) = state.system.cgroup_limits() {
            if limits.total_memory > 0 && limits.total_memory < system_total {
                let available = limits.free_memory.min(limits.total_memory);
                return MemoryInfo {
                    available,
                    total: limits.total_memory,
                    used: limits.total_memory - available,
                    source: MemorySource::ContainerLimit,
                };
            }
        }

        if system_total == 0 {
            drop(state);
            self.logger.log_probe_degraded("memory", "host reports no memory figures, using device estimate");
            return estimate::device_memory(self.profile);
        }

        let available = state.system.available_memory().min(system_total);
        MemoryInfo {
            available,
            total: system_total,
            used: system_total - available,
            source: MemorySource::System,
        }
    }

    fn sample_cpu(&self) -> CpuInfo {
        let mut state = lock_recover(&self.state);
        let previous = state.last_cpu_refresh.replace(Instant::now());
        state.system.refresh_cpu_usage();

        let cores = match state.system.cpus().len() {
            0 => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(DEFAULT_CPU_CORES),
            n => n,
        };

        if previous.is_some_and(|at| at.elapsed() >= MINIMUM_CPU_UPDATE_INTERVAL) {
            let usage = f64::from(state.system.global_cpu_usage()).clamp(0.0, 100.0);
            return CpuInfo {
                cores,
                usage_percent: usage,
                source: CpuSource::Sampled,
            };
        }
        drop(state);

        // No usable counter delta yet
        if let Some(usage) = load_average_percent(cores) {
            return CpuInfo {
                cores,
                usage_percent: usage,
                source: CpuSource::LoadAverage,
            };
        }

        self.logger.log_probe_degraded("cpu", "no counters or load average, timing reference loop");
        estimate::busy_loop_cpu(cores)
    }

    fn sample_storage(&self) -> impl Future<Output = Option<StorageInfo>> + Send {
        let path = self.storage_path.clone();
        let logger = self.logger;

        // Disk enumeration blocks; the monitor bounds how long it may take
        async move {
            match tokio::task::spawn_blocking(move || storage_for_path(&path)).await {
                Ok(Some(info)) => Some(info),
                Ok(None) => {
                    logger.log_probe_degraded("storage", "no disk with known capacity holds the storage path");
                    None
                }
                Err(e) => {
                    logger.log_probe_degraded("storage", &format!("disk scan failed: {}", e));
                    None
                }
            }
        }
    }
}

/// One-minute load average as a percentage of all cores
fn load_average_percent(cores: usize) -> Option<f64> {
    // Windows reports zeros rather than an error
    if !sysinfo::IS_SUPPORTED_SYSTEM || cfg!(windows) {
        return None;
    }
    let load = System::load_average();
    Some((load.one / cores.max(1) as f64 * 100.0).clamp(0.0, 100.0))
}

/// Free/total space of the disk whose mount point is the longest prefix of `path`
fn storage_for_path(path: &Path) -> Option<StorageInfo> {
    let target = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let disks = Disks::new_with_refreshed_list();

    disks
        .list()
        .iter()
        .filter(|disk| target.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())
        .filter(|disk| disk.total_space() > 0)
        .map(|disk| StorageInfo {
            available: disk.available_space().min(disk.total_space()),
            total: disk.total_space(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_reading_is_consistent() {
        let probe = HostProbe::default();
        let memory = probe.sample_memory();

        assert!(memory.total > 0);
        assert!(memory.available <= memory.total);
        assert_eq!(memory.available + memory.used, memory.total);
    }

    #[test]
    fn test_cpu_reading_is_in_range() {
        let probe = HostProbe::default();
        let first = probe.sample_cpu();

        assert!(first.cores >= 1);
        assert!((0.0..=100.0).contains(&first.usage_percent));
        assert_ne!(first.source, CpuSource::Sampled, "first reading has no counter delta");
    }

    #[test]
    fn test_cpu_uses_counters_after_minimum_interval() {
        let probe = HostProbe::default();
        probe.sample_cpu();
        std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL + std::time::Duration::from_millis(50));
        let second = probe.sample_cpu();

        assert_eq!(second.source, CpuSource::Sampled);
        assert!((0.0..=100.0).contains(&second.usage_percent));
    }

    #[tokio::test]
    async fn test_storage_for_temp_dir_never_reports_zero_capacity() {
        let probe = HostProbe::default();
        if let Some(storage) = probe.sample_storage().await {
            assert!(storage.total > 0);
            assert!(storage.available <= storage.total);
        }
    }

    #[tokio::test]
    async fn test_storage_for_missing_path_is_unknown_or_root() {
        let probe = HostProbe::default().with_storage_path("/definitely/not/a/real/path");
        // Falls back to whichever mount holds the literal path, typically "/"
        let storage = probe.sample_storage().await;
        if let Some(storage) = storage {
            assert!(storage.total > 0);
        }
    }
}
