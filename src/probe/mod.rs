//! System probes
//!
//! A probe reads memory, CPU and storage from whatever instrumentation the
//! host offers. Probes never fail: missing instrumentation degrades to an
//! estimate, and storage may come back as `None` meaning "unknown".
//!
//! - `HostProbe`: sysinfo-backed probe for the machine this process runs on
//! - `FixedProbe`: caller-controlled readings, for tests and simulations
//! - `estimate`: heuristics used when nothing can be measured

pub mod estimate;
pub mod fixed;
pub mod host;

pub use fixed::FixedProbe;
pub use host::HostProbe;

use crate::models::{CpuInfo, MemoryInfo, StorageInfo};
use std::future::Future;

/// Source of raw resource readings
pub trait SystemProbe: Send + Sync + 'static {
    /// Current memory budget in bytes
    fn sample_memory(&self) -> MemoryInfo;

    /// Logical core count and current busyness
    fn sample_cpu(&self) -> CpuInfo;

    /// Free and total storage, or `None` when it cannot be determined.
    /// `None` is "unknown", never zero and never unlimited.
    fn sample_storage(&self) -> impl Future<Output = Option<StorageInfo>> + Send;
}
