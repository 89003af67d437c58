//! Probe with caller-controlled readings

use crate::constants::{GB, MB};
use crate::lock_recover;
use crate::models::{CpuInfo, CpuSource, MemoryInfo, MemorySource, StorageInfo};
use crate::probe::SystemProbe;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy)]
struct Readings {
    memory: MemoryInfo,
    cpu: CpuInfo,
    storage: Option<StorageInfo>,
}

/// Returns whatever readings it was given. Counts memory samples, which is
/// one per composed snapshot.
#[derive(Debug)]
pub struct FixedProbe {
    readings: Mutex<Readings>,
    samples: AtomicUsize,
}

impl FixedProbe {
    pub fn new(memory: MemoryInfo, cpu: CpuInfo, storage: Option<StorageInfo>) -> Self {
        Self {
            readings: Mutex::new(Readings { memory, cpu, storage }),
            samples: AtomicUsize::new(0),
        }
    }

    /// Idle 8-core machine with `available` bytes of free memory
    pub fn with_available_memory(available: u64) -> Self {
        let probe = Self::new(
            MemoryInfo { available: 0, total: 0, used: 0, source: MemorySource::System },
            CpuInfo { cores: 8, usage_percent: 10.0, source: CpuSource::Fixed },
            Some(StorageInfo { available: 50 * GB, total: 100 * GB }),
        );
        probe.set_available_memory(available);
        probe
    }

    /// Set free memory, growing the total so it stays consistent
    pub fn set_available_memory(&self, available: u64) {
        let total = available.max(8 * GB).saturating_add(512 * MB);
        lock_recover(&self.readings).memory = MemoryInfo {
            available,
            total,
            used: total - available,
            source: MemorySource::System,
        };
    }

    pub fn set_cpu_usage(&self, usage_percent: f64) {
        lock_recover(&self.readings).cpu.usage_percent = usage_percent;
    }

    pub fn set_storage(&self, storage: Option<StorageInfo>) {
        lock_recover(&self.readings).storage = storage;
    }

    /// Number of snapshots taken through this probe
    pub fn sample_count(&self) -> usize {
        self.samples.load(Ordering::SeqCst)
    }
}

impl SystemProbe for FixedProbe {
    fn sample_memory(&self) -> MemoryInfo {
        self.samples.fetch_add(1, Ordering::SeqCst);
        lock_recover(&self.readings).memory
    }

    fn sample_cpu(&self) -> CpuInfo {
        lock_recover(&self.readings).cpu
    }

    fn sample_storage(&self) -> impl Future<Output = Option<StorageInfo>> + Send {
        std::future::ready(lock_recover(&self.readings).storage)
    }
}
