//! Structured event logging
//!
//! Events go through the `log` facade as `message | {json}` lines under the
//! application subsystem target; the binary decides where they end up.

use crate::constants::APP_SUBSYSTEM;
use crate::models::{OperationKind, OperationLogEntry, ResourceStatus, SafetyCheck};
use serde_json::json;
use std::time::Duration;

/// Event logger for status, check and history events
#[derive(Debug, Clone, Copy)]
pub struct EventLogger {
    /// Current logging level
    level: LogLevel,
}

/// Log levels for monitor events
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Info,
    Debug,
}

impl EventLogger {
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }

    /// Log a freshly composed snapshot
    pub fn log_status(&self, status: &ResourceStatus) {
        let data = json!({
            "event": "status_sampled",
            "memory_available": status.memory.available,
            "memory_total": status.memory.total,
            "memory_source": status.memory.source,
            "cpu_usage": status.cpu.usage_percent,
            "cpu_source": status.cpu.source,
            "storage_available": status.storage.map(|s| s.available),
            "is_low_memory": status.is_low_memory,
            "is_high_cpu": status.is_high_cpu,
            "is_low_storage": status.is_low_storage,
            "timestamp": status.timestamp.to_rfc3339(),
        });

        self.log_structured(LogLevel::Debug, "Resource status sampled", &data);
    }

    /// Log the verdict for a proposed operation
    pub fn log_check(&self, kind: OperationKind, size: u64, check: &SafetyCheck) {
        let data = json!({
            "event": "operation_checked",
            "kind": kind,
            "size": size,
            "safe": check.safe,
            "reason": check.reason,
            "recommendation": check.recommendation,
            "memory_needed": check.estimated_memory_needed,
            "memory_available": check.available_memory,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let level = if check.safe { LogLevel::Debug } else { LogLevel::Info };
        self.log_structured(level, &format!("Operation {} checked: {}", kind, check.recommendation), &data);
    }

    /// Log an entry appended to the operation history
    pub fn log_operation(&self, entry: &OperationLogEntry) {
        let data = json!({
            "event": "operation_logged",
            "kind": entry.kind,
            "success": entry.success,
            "duration_ms": entry.duration_ms,
            "memory_before": entry.memory_before,
            "memory_after": entry.memory_after,
            "error": entry.error,
            "timestamp": entry.timestamp.to_rfc3339(),
        });

        let level = if entry.success { LogLevel::Debug } else { LogLevel::Error };
        self.log_structured(level, &format!("Operation {} finished", entry.kind), &data);
    }

    /// Log a probe falling back to an estimate or "unknown"
    pub fn log_probe_degraded(&self, probe: &str, reason: &str) {
        let data = json!({
            "event": "probe_degraded",
            "probe": probe,
            "reason": reason,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        self.log_structured(LogLevel::Debug, &format!("{} probe degraded", probe), &data);
    }

    pub fn log_monitoring_started(&self, interval: Duration) {
        let data = json!({
            "event": "monitoring_started",
            "interval_ms": interval.as_millis() as u64,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        self.log_structured(LogLevel::Info, "Monitoring started", &data);
    }

    pub fn log_monitoring_stopped(&self, reason: &str) {
        let data = json!({
            "event": "monitoring_stopped",
            "reason": reason,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        self.log_structured(LogLevel::Info, "Monitoring stopped", &data);
    }

    fn log_structured(&self, level: LogLevel, message: &str, data: &serde_json::Value) {
        // Skip logging if below configured level
        if !self.should_log(level) {
            return;
        }

        let full_message = format!("{} | {}", message, data);

        match level {
            LogLevel::Error => log::error!(target: APP_SUBSYSTEM, "{}", full_message),
            LogLevel::Info => log::info!(target: APP_SUBSYSTEM, "{}", full_message),
            LogLevel::Debug => log::debug!(target: APP_SUBSYSTEM, "{}", full_message),
        }
    }

    /// Check if we should log at this level
    fn should_log(&self, level: LogLevel) -> bool {
        level <= self.level
    }
}

impl Default for EventLogger {
    fn default() -> Self {
        Self::new(LogLevel::Debug)
    }
}
