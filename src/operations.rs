//! Operation cost estimates and configurations
//!
//! Defines how much memory each operation kind typically requires and turns
//! an input size into a memory requirement.

use crate::constants::MB;
use crate::models::{MonitorError, OperationCost, OperationKind};
use std::collections::HashMap;

impl OperationKind {
    /// Built-in cost entry for this kind
    pub fn default_cost(&self) -> OperationCost {
        match self {
            OperationKind::Waveform => OperationCost::new(
                3.0, 2.0, 50 * MB, 200 * MB,
                "Waveform generation requires decoding audio to PCM",
            ),
            OperationKind::VideoProcess => OperationCost::new(
                5.0, 2.0, 100 * MB, 500 * MB,
                "Video processing requires frame buffering",
            ),
            OperationKind::AudioProcess => OperationCost::new(
                2.0, 1.5, 30 * MB, 100 * MB,
                "Audio processing with effects",
            ),
            OperationKind::FileUpload => OperationCost::new(
                1.5, 1.5, 10 * MB, 50 * MB,
                "File upload with progress tracking",
            ),
            OperationKind::FileDownload => OperationCost::new(
                1.2, 1.5, 10 * MB, 50 * MB,
                "File download buffering",
            ),
            OperationKind::FileProcess => OperationCost::new(
                2.0, 2.0, 20 * MB, 100 * MB,
                "Generic file processing",
            ),
            OperationKind::DataImport => OperationCost::new(
                2.0, 2.0, 20 * MB, 200 * MB,
                "Data import with validation",
            ),
            OperationKind::DataExport => OperationCost::new(
                1.5, 1.5, 20 * MB, 100 * MB,
                "Data export formatting",
            ),
            OperationKind::ReportGeneration => OperationCost::new(
                2.5, 2.0, 50 * MB, 300 * MB,
                "Report generation with charts",
            ),
            OperationKind::AiProcessing => OperationCost::new(
                4.0, 2.5, 100 * MB, 1024 * MB,
                "AI model processing",
            ),
            OperationKind::Transcription => OperationCost::new(
                3.0, 2.0, 100 * MB, 500 * MB,
                "Audio transcription processing",
            ),
            OperationKind::HeavyOperation => OperationCost::new(
                3.0, 2.0, 50 * MB, 300 * MB,
                "Generic heavy operation",
            ),
            OperationKind::Custom => OperationCost::new(
                2.0, 2.0, 30 * MB, 100 * MB,
                "Custom operation",
            ),
        }
    }
}

/// Memory needed to run `cost` over `input_size` bytes:
/// input scaled by the multiplier and safety factor, never below the floor.
fn requirement_for(cost: &OperationCost, input_size: u64) -> u64 {
    let base = input_size as f64 * cost.memory_multiplier;
    let with_safety = (base * cost.safety_factor).ceil();
    // `as` saturates, so absurd inputs pin at u64::MAX instead of wrapping
    (with_safety as u64).max(cost.min_memory_required)
}

fn intensive(cost: &OperationCost) -> bool {
    cost.memory_multiplier >= 3.0 || cost.preferred_memory >= 300 * MB
}

fn alternative_for(kind: OperationKind, cost: &OperationCost, available_memory: u64) -> Option<String> {
    if available_memory >= cost.min_memory_required {
        return None;
    }

    let suggestion = match kind {
        OperationKind::Waveform => "Use server-side waveform generation",
        OperationKind::VideoProcess => "Process video in smaller chunks",
        OperationKind::FileUpload => "Use chunked upload for large files",
        OperationKind::DataImport => "Import data in batches",
        OperationKind::ReportGeneration => "Generate report in sections",
        OperationKind::AiProcessing => "Use cloud AI processing",
        _ => "Try processing smaller amounts of data",
    };
    Some(suggestion.to_string())
}

/// Calculate memory requirement for an operation using the built-in table
pub fn calculate_memory_requirement(kind: OperationKind, input_size: u64) -> u64 {
    requirement_for(&kind.default_cost(), input_size)
}

/// Built-in cost details for an operation kind
pub fn get_operation_cost(kind: OperationKind) -> OperationCost {
    kind.default_cost()
}

/// Whether the kind deserves a safety check at all
pub fn is_memory_intensive(kind: OperationKind) -> bool {
    intensive(&kind.default_cost())
}

/// Suggested alternative when less than the kind's floor is available
pub fn get_alternative_method(kind: OperationKind, available_memory: u64) -> Option<String> {
    alternative_for(kind, &kind.default_cost(), available_memory)
}

/// Overridable cost table.
///
/// Starts from the built-in entries. A kind missing from the table resolves
/// to the table's `custom` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CostTable {
    entries: HashMap<OperationKind, OperationCost>,
    custom: OperationCost,
}

impl CostTable {
    /// Table holding nothing but the `custom` fallback entry
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
            custom: OperationKind::Custom.default_cost(),
        }
    }

    /// Replace the entry for `kind` after validating it
    pub fn with_override(mut self, kind: OperationKind, cost: OperationCost) -> Result<Self, MonitorError> {
        cost.validate(kind)?;
        if kind == OperationKind::Custom {
            self.custom = cost;
        } else {
            self.entries.insert(kind, cost);
        }
        Ok(self)
    }

    pub fn get(&self, kind: OperationKind) -> &OperationCost {
        self.entries.get(&kind).unwrap_or(&self.custom)
    }

    pub fn calculate_memory_requirement(&self, kind: OperationKind, input_size: u64) -> u64 {
        requirement_for(self.get(kind), input_size)
    }

    pub fn is_memory_intensive(&self, kind: OperationKind) -> bool {
        intensive(self.get(kind))
    }

    pub fn get_alternative_method(&self, kind: OperationKind, available_memory: u64) -> Option<String> {
        alternative_for(kind, self.get(kind), available_memory)
    }

    /// Entries in `OperationKind::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = (OperationKind, &OperationCost)> + '_ {
        OperationKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}

impl Default for CostTable {
    fn default() -> Self {
        let entries = OperationKind::ALL
            .iter()
            .filter(|kind| **kind != OperationKind::Custom)
            .map(|kind| (*kind, kind.default_cost()))
            .collect();
        Self {
            entries,
            custom: OperationKind::Custom.default_cost(),
        }
    }
}
