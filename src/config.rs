//! Configuration file handling
//!
//! Parses and validates the optional TOML configuration file. Every section
//! and key is optional; anything left out keeps its built-in default.

use crate::constants::{
    DEFAULT_CACHE_TIMEOUT_MS, DEFAULT_MONITOR_INTERVAL_MS, DEFAULT_STORAGE_TIMEOUT_MS,
};
use crate::models::{EnvironmentProfile, MonitorError, OperationCost, OperationKind, ResourceThresholds};
use crate::monitor::polling::validate_interval;
use crate::operations::CostTable;
use crate::thresholds::get_thresholds;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeadroomConfig {
    pub monitor: MonitorSettings,
    pub thresholds: ThresholdOverrides,
    /// Full replacement cost entries keyed by operation kind tag
    pub costs: BTreeMap<String, OperationCost>,
}

/// Monitor runtime settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorSettings {
    /// Overrides host detection when set
    pub profile: Option<EnvironmentProfile>,
    pub cache_timeout_ms: u64,
    pub enable_caching: bool,
    /// Polling interval in seconds (0.1-300.0)
    pub polling_interval: f64,
    pub storage_timeout_ms: u64,
    /// Directory whose disk is reported; the temp directory when unset
    pub storage_path: Option<PathBuf>,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            profile: None,
            cache_timeout_ms: DEFAULT_CACHE_TIMEOUT_MS,
            enable_caching: true,
            polling_interval: DEFAULT_MONITOR_INTERVAL_MS as f64 / 1000.0,
            storage_timeout_ms: DEFAULT_STORAGE_TIMEOUT_MS,
            storage_path: None,
        }
    }
}

/// Partial threshold overrides applied on top of the profile's tier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdOverrides {
    pub critical_memory: Option<u64>,
    pub critical_cpu: Option<f64>,
    pub critical_storage: Option<u64>,
    pub warning_memory: Option<u64>,
    pub warning_cpu: Option<f64>,
    pub warning_storage: Option<u64>,
    pub safe_memory: Option<u64>,
    pub safe_cpu: Option<f64>,
    pub safe_storage: Option<u64>,
}

impl ThresholdOverrides {
    pub fn apply(&self, base: ResourceThresholds) -> ResourceThresholds {
        ResourceThresholds {
            critical_memory: self.critical_memory.unwrap_or(base.critical_memory),
            critical_cpu: self.critical_cpu.unwrap_or(base.critical_cpu),
            critical_storage: self.critical_storage.unwrap_or(base.critical_storage),
            warning_memory: self.warning_memory.unwrap_or(base.warning_memory),
            warning_cpu: self.warning_cpu.unwrap_or(base.warning_cpu),
            warning_storage: self.warning_storage.unwrap_or(base.warning_storage),
            safe_memory: self.safe_memory.unwrap_or(base.safe_memory),
            safe_cpu: self.safe_cpu.unwrap_or(base.safe_cpu),
            safe_storage: self.safe_storage.unwrap_or(base.safe_storage),
        }
    }
}

impl HeadroomConfig {
    /// Load and validate a configuration file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: HeadroomConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    /// Load `path` when given, else the default location if it exists, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::load_from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Check interval bounds and cost entries.
    ///
    /// Threshold overrides depend on the profile finally selected, which a
    /// command line flag may still change, so they are checked through
    /// `thresholds_for` once that profile is known.
    pub fn validate(&self) -> Result<(), MonitorError> {
        validate_interval(self.monitor.polling_interval)?;
        self.cost_table()?;
        Ok(())
    }

    /// Configured profile, or `fallback` when the file leaves it open
    pub fn profile_or(&self, fallback: EnvironmentProfile) -> EnvironmentProfile {
        self.monitor.profile.unwrap_or(fallback)
    }

    pub fn resolved_thresholds(&self, profile: EnvironmentProfile) -> ResourceThresholds {
        self.thresholds.apply(get_thresholds(profile))
    }

    /// Merged thresholds for `profile`, rejected when the overrides break tier ordering
    pub fn thresholds_for(&self, profile: EnvironmentProfile) -> Result<ResourceThresholds, MonitorError> {
        let thresholds = self.resolved_thresholds(profile);
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Built-in costs with the configured entries swapped in.
    ///
    /// Keys are parsed strictly so a misspelled kind is an error rather than
    /// a silent override of `custom`.
    pub fn cost_table(&self) -> Result<CostTable, MonitorError> {
        self.costs.iter().try_fold(CostTable::default(), |table, (tag, cost)| {
            let kind: OperationKind = tag.parse()?;
            table.with_override(kind, cost.clone())
        })
    }

    pub fn polling_duration(&self) -> Duration {
        Duration::from_secs_f64(self.monitor.polling_interval)
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.monitor.cache_timeout_ms)
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_millis(self.monitor.storage_timeout_ms)
    }
}

/// `<config dir>/headroom/config.toml`, when the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("headroom").join("config.toml"))
}
