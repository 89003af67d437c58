//! headroom - Resource Safety Checking Library
//!
//! Decides whether a resource-intensive operation can run on this machine
//! right now, from live memory, CPU and storage readings and a per-operation
//! memory cost model.

pub mod config;
pub mod constants;
pub mod evaluator;
pub mod logging;
pub mod models;
pub mod monitor;
pub mod operations;
pub mod output;
pub mod probe;
pub mod thresholds;

pub use config::HeadroomConfig;
pub use evaluator::{evaluate, format_bytes};
pub use logging::{EventLogger, LogLevel};
pub use models::{
    EnvironmentProfile, MonitorError, OperationCost, OperationKind, OperationLogEntry,
    Recommendation, ResourceStatus, ResourceThresholds, SafetyCheck, SafetyReason,
};
pub use monitor::{MonitorBuilder, MonitoringOptions, ResourceMonitor};
pub use operations::CostTable;
pub use probe::{FixedProbe, HostProbe, SystemProbe};
pub use thresholds::{get_thresholds, FileSizeCategory};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, taking over the data if a previous holder panicked
pub(crate) fn lock_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
