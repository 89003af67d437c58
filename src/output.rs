//! Output formatting module
//!
//! Handles:
//! - Human-readable rendering of snapshots, verdicts, costs and thresholds
//! - JSON rendering of the same records
//! - One-line watch events, so `watch` output stays greppable

use crate::evaluator::format_bytes;
use crate::models::{
    EnvironmentProfile, OperationCost, OperationKind, ResourceStatus, ResourceThresholds,
    SafetyCheck,
};
use crate::operations::CostTable;
use anyhow::Result;
use serde::Serialize;

/// One row of the `costs` listing
#[derive(Debug, Clone, Serialize)]
pub struct CostRow<'a> {
    pub kind: OperationKind,
    #[serde(flatten)]
    pub cost: &'a OperationCost,
    pub memory_intensive: bool,
}

/// Active thresholds together with the profile they came from
#[derive(Debug, Clone, Serialize)]
pub struct ThresholdReport {
    pub profile: EnvironmentProfile,
    #[serde(flatten)]
    pub thresholds: ResourceThresholds,
}

/// Format any record as pretty JSON
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Format a record as compact single-line JSON for streaming output
pub fn format_json_line<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

pub fn cost_rows(costs: &CostTable) -> Vec<CostRow<'_>> {
    costs
        .iter()
        .map(|(kind, cost)| CostRow {
            kind,
            cost,
            memory_intensive: costs.is_memory_intensive(kind),
        })
        .collect()
}

/// Format a status snapshot in human-readable form
pub fn format_status_human(status: &ResourceStatus) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "Memory:  {} available of {} ({:.1}% used, {}){}",
        format_bytes(status.memory.available),
        format_bytes(status.memory.total),
        status.memory.percent,
        memory_source_label(status),
        flag(status.is_low_memory, "LOW"),
    ));
    lines.push(format!(
        "CPU:     {:.1}% across {} cores ({}){}",
        status.cpu.usage_percent,
        status.cpu.cores,
        cpu_source_label(status),
        flag(status.is_high_cpu, "HIGH"),
    ));
    match &status.storage {
        Some(storage) => lines.push(format!(
            "Storage: {} available of {} ({:.1}% used){}",
            format_bytes(storage.available),
            format_bytes(storage.total),
            storage.percent,
            flag(status.is_low_storage, "LOW"),
        )),
        None => lines.push("Storage: unknown".to_string()),
    }
    lines.push(format!("Sampled: {}", status.timestamp.to_rfc3339()));

    lines.join("\n")
}

/// One-line status summary used by `watch`
pub fn format_status_line(status: &ResourceStatus) -> String {
    let storage = status
        .storage
        .map(|s| format_bytes(s.available))
        .unwrap_or_else(|| "unknown".to_string());

    format!(
        "[{}] memory {} free{} | cpu {:.1}%{} | storage {} free{}",
        status.timestamp.format("%Y-%m-%dT%H:%M:%S"),
        format_bytes(status.memory.available),
        flag(status.is_low_memory, "LOW"),
        status.cpu.usage_percent,
        flag(status.is_high_cpu, "HIGH"),
        storage,
        flag(status.is_low_storage, "LOW"),
    )
}

/// Format a safety verdict in human-readable form
pub fn format_check_human(kind: OperationKind, size: u64, check: &SafetyCheck) -> String {
    let verdict = if check.safe { "SAFE" } else { "NOT SAFE" };
    let mut lines = vec![
        format!("{} {} ({}): {}", verdict, kind, format_bytes(size), check.message),
        format!("  Recommendation: {}", check.recommendation),
        format!(
            "  Memory needed:  {} (available {})",
            format_bytes(check.estimated_memory_needed),
            format_bytes(check.available_memory)
        ),
    ];

    if let Some(reason) = check.reason {
        lines.push(format!("  Reason:         {}", reason.as_str()));
    }
    if let Some(alternative) = &check.alternative_method {
        lines.push(format!("  Alternative:    {}", alternative));
    }
    if let Some(shortfall) = check.details.and_then(|d| d.memory_shortfall).filter(|s| *s > 0) {
        lines.push(format!("  Shortfall:      {}", format_bytes(shortfall)));
    }
    if let Some(overload) = check.details.and_then(|d| d.cpu_overload) {
        lines.push(format!("  CPU over limit: {:.1} points", overload));
    }

    lines.join("\n")
}

/// Format the cost table as aligned columns
pub fn format_costs_human(costs: &CostTable) -> String {
    let mut lines = vec![format!(
        "{:<18} {:>6} {:>6} {:>10} {:>10}  {}",
        "KIND", "MULT", "SAFETY", "MIN", "PREFERRED", "DESCRIPTION"
    )];

    for row in cost_rows(costs) {
        lines.push(format!(
            "{:<18} {:>6.1} {:>6.1} {:>10} {:>10}  {}{}",
            row.kind.as_str(),
            row.cost.memory_multiplier,
            row.cost.safety_factor,
            format_bytes(row.cost.min_memory_required),
            format_bytes(row.cost.preferred_memory),
            row.cost.description,
            if row.memory_intensive { " [intensive]" } else { "" },
        ));
    }

    lines.join("\n")
}

/// Format the active thresholds as a tier table
pub fn format_thresholds_human(profile: EnvironmentProfile, thresholds: &ResourceThresholds) -> String {
    [
        format!("Profile: {}", profile),
        format!("{:<9} {:>10} {:>8} {:>10}", "TIER", "MEMORY", "CPU", "STORAGE"),
        format!(
            "{:<9} {:>10} {:>7.0}% {:>10}",
            "critical",
            format_bytes(thresholds.critical_memory),
            thresholds.critical_cpu,
            format_bytes(thresholds.critical_storage)
        ),
        format!(
            "{:<9} {:>10} {:>7.0}% {:>10}",
            "warning",
            format_bytes(thresholds.warning_memory),
            thresholds.warning_cpu,
            format_bytes(thresholds.warning_storage)
        ),
        format!(
            "{:<9} {:>10} {:>7.0}% {:>10}",
            "safe",
            format_bytes(thresholds.safe_memory),
            thresholds.safe_cpu,
            format_bytes(thresholds.safe_storage)
        ),
    ]
    .join("\n")
}

fn flag(set: bool, label: &str) -> String {
    if set {
        format!(" [{}]", label)
    } else {
        String::new()
    }
}

fn memory_source_label(status: &ResourceStatus) -> &'static str {
    use crate::models::MemorySource;
    match status.memory.source {
        MemorySource::ContainerLimit => "container limit",
        MemorySource::System => "system",
        MemorySource::DeviceEstimate => "estimated",
    }
}

fn cpu_source_label(status: &ResourceStatus) -> &'static str {
    use crate::models::CpuSource;
    match status.cpu.source {
        CpuSource::Sampled => "sampled",
        CpuSource::LoadAverage => "load average",
        CpuSource::BusyLoop => "estimated",
        CpuSource::Fixed => "fixed",
    }
}
