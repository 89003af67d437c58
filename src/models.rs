//! Data models module
//!
//! Defines core data structures:
//! - OperationKind / OperationCost: what is about to run and what it costs
//! - ResourceThresholds / EnvironmentProfile: the limits a host runs under
//! - MemoryInfo, CpuInfo, StorageInfo: raw probe readings
//! - ResourceStatus: one composed snapshot of the machine
//! - SafetyCheck: verdict for one proposed operation
//! - OperationLogEntry: diagnostic record of a finished operation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classification of a resource-intensive task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    Waveform,
    VideoProcess,
    AudioProcess,
    FileUpload,
    FileDownload,
    FileProcess,
    DataImport,
    DataExport,
    ReportGeneration,
    AiProcessing,
    Transcription,
    HeavyOperation,
    /// Unrecognized tags deserialize to this variant
    #[serde(other)]
    Custom,
}

impl OperationKind {
    pub const ALL: [OperationKind; 13] = [
        OperationKind::Waveform,
        OperationKind::VideoProcess,
        OperationKind::AudioProcess,
        OperationKind::FileUpload,
        OperationKind::FileDownload,
        OperationKind::FileProcess,
        OperationKind::DataImport,
        OperationKind::DataExport,
        OperationKind::ReportGeneration,
        OperationKind::AiProcessing,
        OperationKind::Transcription,
        OperationKind::HeavyOperation,
        OperationKind::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Waveform => "waveform",
            OperationKind::VideoProcess => "video-process",
            OperationKind::AudioProcess => "audio-process",
            OperationKind::FileUpload => "file-upload",
            OperationKind::FileDownload => "file-download",
            OperationKind::FileProcess => "file-process",
            OperationKind::DataImport => "data-import",
            OperationKind::DataExport => "data-export",
            OperationKind::ReportGeneration => "report-generation",
            OperationKind::AiProcessing => "ai-processing",
            OperationKind::Transcription => "transcription",
            OperationKind::HeavyOperation => "heavy-operation",
            OperationKind::Custom => "custom",
        }
    }

    /// Parse a kind tag, mapping anything unrecognized to `Custom`.
    pub fn parse_lossy(tag: &str) -> Self {
        tag.parse().unwrap_or_else(|_| {
            log::debug!("Unrecognized operation kind '{}', treating as custom", tag);
            OperationKind::Custom
        })
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        OperationKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| MonitorError::UnknownOperationKind(s.to_string()))
    }
}

/// Static memory cost profile of one operation kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationCost {
    /// Working memory as a multiple of the input size
    pub memory_multiplier: f64,
    /// Headroom for transient peaks on top of the working memory
    pub safety_factor: f64,
    /// Floor applied regardless of input size (bytes)
    pub min_memory_required: u64,
    /// Comfortable budget for this kind (bytes)
    pub preferred_memory: u64,
    pub description: String,
}

impl OperationCost {
    pub fn new(
        memory_multiplier: f64,
        safety_factor: f64,
        min_memory_required: u64,
        preferred_memory: u64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            memory_multiplier,
            safety_factor,
            min_memory_required,
            preferred_memory,
            description: description.into(),
        }
    }

    /// Check the cost entry invariants for `kind`
    pub fn validate(&self, kind: OperationKind) -> Result<(), MonitorError> {
        let invalid = |reason: String| MonitorError::InvalidCost { kind, reason };

        if !self.memory_multiplier.is_finite() || self.memory_multiplier < 1.0 {
            return Err(invalid(format!(
                "memory_multiplier must be >= 1, got {}",
                self.memory_multiplier
            )));
        }
        if !self.safety_factor.is_finite() || self.safety_factor < 1.0 {
            return Err(invalid(format!(
                "safety_factor must be >= 1, got {}",
                self.safety_factor
            )));
        }
        if self.min_memory_required > self.preferred_memory {
            return Err(invalid(format!(
                "min_memory_required ({}) exceeds preferred_memory ({})",
                self.min_memory_required, self.preferred_memory
            )));
        }
        Ok(())
    }
}

/// Three-tier limits per resource.
///
/// Memory and storage are amounts of free space, so a lower value is more
/// severe. CPU is a usage percentage, so a higher value is more severe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceThresholds {
    // Critical levels - operations are blocked
    pub critical_memory: u64,
    pub critical_cpu: f64,
    pub critical_storage: u64,

    // Warning levels - operations proceed with a warning
    pub warning_memory: u64,
    pub warning_cpu: f64,
    pub warning_storage: u64,

    // Safe levels - no restrictions
    pub safe_memory: u64,
    pub safe_cpu: f64,
    pub safe_storage: u64,
}

impl ResourceThresholds {
    /// Check the severity ordering of every resource
    pub fn validate(&self) -> Result<(), MonitorError> {
        if !(self.critical_memory < self.warning_memory && self.warning_memory < self.safe_memory) {
            return Err(MonitorError::InvalidThresholds(format!(
                "memory must satisfy critical < warning < safe, got {} / {} / {}",
                self.critical_memory, self.warning_memory, self.safe_memory
            )));
        }
        if !(self.critical_storage < self.warning_storage && self.warning_storage < self.safe_storage) {
            return Err(MonitorError::InvalidThresholds(format!(
                "storage must satisfy critical < warning < safe, got {} / {} / {}",
                self.critical_storage, self.warning_storage, self.safe_storage
            )));
        }
        let cpu_in_range = [self.critical_cpu, self.warning_cpu, self.safe_cpu]
            .iter()
            .all(|v| (0.0..=100.0).contains(v));
        if !cpu_in_range || !(self.critical_cpu > self.warning_cpu && self.warning_cpu > self.safe_cpu) {
            return Err(MonitorError::InvalidThresholds(format!(
                "cpu must satisfy 100 >= critical > warning > safe >= 0, got {} / {} / {}",
                self.critical_cpu, self.warning_cpu, self.safe_cpu
            )));
        }
        Ok(())
    }
}

/// Host environment class, determined once at startup and injected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentProfile {
    Mobile,
    #[default]
    Desktop,
    Development,
}

impl EnvironmentProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentProfile::Mobile => "mobile",
            EnvironmentProfile::Desktop => "desktop",
            EnvironmentProfile::Development => "development",
        }
    }
}

impl fmt::Display for EnvironmentProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnvironmentProfile {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mobile" => Ok(EnvironmentProfile::Mobile),
            "desktop" | "production" => Ok(EnvironmentProfile::Desktop),
            "development" | "dev" => Ok(EnvironmentProfile::Development),
            _ => Err(MonitorError::UnknownProfile(s.to_string())),
        }
    }
}

/// Where a memory reading came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemorySource {
    /// Memory limit of the control group the process runs in
    ContainerLimit,
    /// Whole-system physical memory
    System,
    /// Device-class guess; nothing was measured
    DeviceEstimate,
}

/// Where a CPU usage reading came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CpuSource {
    /// Delta between two kernel CPU counters
    Sampled,
    /// One-minute load average normalized by core count
    LoadAverage,
    /// Timing of a fixed counting loop
    BusyLoop,
    /// Supplied by the caller
    Fixed,
}

/// Raw memory reading in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryInfo {
    pub available: u64,
    pub total: u64,
    pub used: u64,
    pub source: MemorySource,
}

/// Raw CPU reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CpuInfo {
    pub cores: usize,
    /// 0-100
    pub usage_percent: f64,
    pub source: CpuSource,
}

/// Raw storage reading in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageInfo {
    pub available: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryStatus {
    pub available: u64,
    pub total: u64,
    pub used: u64,
    pub percent: f64,
    pub source: MemorySource,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CpuStatus {
    pub cores: usize,
    pub usage_percent: f64,
    pub source: CpuSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StorageStatus {
    pub available: u64,
    pub total: u64,
    pub percent: f64,
}

/// Point-in-time snapshot of memory, CPU and storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceStatus {
    pub memory: MemoryStatus,
    pub cpu: CpuStatus,
    /// `None` when the host does not expose storage figures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageStatus>,
    pub timestamp: DateTime<Utc>,
    pub is_low_memory: bool,
    pub is_high_cpu: bool,
    pub is_low_storage: bool,
}

impl ResourceStatus {
    /// Compose one snapshot from probe readings, deriving the warning flags
    /// from `thresholds`. Unknown storage never counts as low.
    pub fn compose(
        memory: MemoryInfo,
        cpu: CpuInfo,
        storage: Option<StorageInfo>,
        thresholds: &ResourceThresholds,
    ) -> Self {
        let storage = storage.map(|s| StorageStatus {
            available: s.available,
            total: s.total,
            percent: percent_of(s.total.saturating_sub(s.available), s.total),
        });

        Self {
            memory: MemoryStatus {
                available: memory.available,
                total: memory.total,
                used: memory.used,
                percent: percent_of(memory.used, memory.total),
                source: memory.source,
            },
            cpu: CpuStatus {
                cores: cpu.cores,
                usage_percent: cpu.usage_percent,
                source: cpu.source,
            },
            timestamp: Utc::now(),
            is_low_memory: memory.available <= thresholds.warning_memory,
            is_high_cpu: cpu.usage_percent > thresholds.warning_cpu,
            is_low_storage: storage
                .map(|s| s.available < thresholds.warning_storage)
                .unwrap_or(false),
            storage,
        }
    }
}

fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Why an operation was flagged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SafetyReason {
    InsufficientMemory,
    HighCpu,
    LowStorage,
    OperationTooLarge,
    SystemBusy,
}

impl SafetyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SafetyReason::InsufficientMemory => "insufficient-memory",
            SafetyReason::HighCpu => "high-cpu",
            SafetyReason::LowStorage => "low-storage",
            SafetyReason::OperationTooLarge => "operation-too-large",
            SafetyReason::SystemBusy => "system-busy",
        }
    }
}

/// What the caller should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Recommendation {
    Proceed,
    ProceedWithCaution,
    Wait,
    UseAlternative,
    UseChunked,
    UseServer,
    CloseOtherApps,
    Abort,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Proceed => "proceed",
            Recommendation::ProceedWithCaution => "proceed-with-caution",
            Recommendation::Wait => "wait",
            Recommendation::UseAlternative => "use-alternative",
            Recommendation::UseChunked => "use-chunked",
            Recommendation::UseServer => "use-server",
            Recommendation::CloseOtherApps => "close-other-apps",
            Recommendation::Abort => "abort",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shortfall figures attached to a flagged check
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SafetyDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_shortfall: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_overload: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_needed: Option<u64>,
}

/// Verdict for one proposed operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyCheck {
    pub safe: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SafetyReason>,
    pub recommendation: Recommendation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative_method: Option<String>,
    pub estimated_memory_needed: u64,
    pub available_memory: u64,
    pub message: String,
    pub message_hebrew: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<SafetyDetails>,
}

/// Diagnostic record written by callers after an operation completes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationLogEntry {
    pub kind: OperationKind,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    pub memory_before: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_after: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OperationLogEntry {
    /// Entry stamped now, with only the mandatory fields set
    pub fn new(kind: OperationKind, memory_before: u64, success: bool) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
            file_size: None,
            memory_before,
            memory_after: None,
            duration_ms: None,
            success,
            error: None,
        }
    }
}

/// Custom error types for monitoring operations
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// Note: bounds must match POLLING_INTERVAL_MIN/MAX in constants.rs
    #[error("Invalid polling interval: {0}. Must be between 0.1 and 300.0 seconds")]
    InvalidInterval(f64),

    #[error("Invalid cost entry for '{kind}': {reason}")]
    InvalidCost { kind: OperationKind, reason: String },

    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(String),

    #[error("Unknown operation kind: '{0}'")]
    UnknownOperationKind(String),

    #[error("Unknown environment profile: '{0}'. Expected mobile, desktop or development")]
    UnknownProfile(String),

    #[error("Invalid size: '{0}'. Use bytes or a K/M/G suffix, e.g. 10MB")]
    InvalidSize(String),
}
