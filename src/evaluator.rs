//! Safety evaluation
//!
//! Turns one status snapshot plus the cost model into a verdict for a
//! proposed operation. Every verdict carries an English and a Hebrew message;
//! both come from the single `match` in `Verdict::messages`, so a verdict
//! cannot be added without its translations.

use crate::constants::{GB, KB, MB};
use crate::models::{
    OperationKind, Recommendation, ResourceStatus, ResourceThresholds, SafetyCheck,
    SafetyDetails, SafetyReason,
};
use crate::operations::CostTable;

/// Outcome of the decision ladder, before rendering
#[derive(Debug, Clone, Copy, PartialEq)]
enum Verdict {
    /// Free memory below the critical floor
    CriticalMemory,
    /// Operation needs more than is free
    MemoryShortfall { needed: u64, available: u64 },
    /// CPU above the critical level
    CpuCritical,
    /// Free memory at or below the warning level
    LowMemory,
    /// CPU above the warning level
    HighCpu,
    Clear,
}

impl Verdict {
    /// (English, Hebrew)
    fn messages(&self) -> (String, String) {
        match *self {
            Verdict::CriticalMemory => (
                "Critical: Not enough memory to proceed safely".to_string(),
                "קריטי: אין מספיק זיכרון להמשיך בבטחה".to_string(),
            ),
            Verdict::MemoryShortfall { needed, available } => (
                format!("Need {} but only {} available", format_bytes(needed), format_bytes(available)),
                format!("נדרש {} אך רק {} זמין", format_bytes(needed), format_bytes(available)),
            ),
            Verdict::CpuCritical => (
                "System is too busy, please wait".to_string(),
                "המערכת עמוסה מדי, אנא המתן".to_string(),
            ),
            Verdict::LowMemory => (
                "Low memory - operation may be slow".to_string(),
                "זיכרון נמוך - הפעולה עלולה להיות איטית".to_string(),
            ),
            Verdict::HighCpu => (
                "High CPU usage - operation may be slow".to_string(),
                "שימוש גבוה במעבד - הפעולה עלולה להיות איטית".to_string(),
            ),
            Verdict::Clear => (
                "Safe to proceed".to_string(),
                "בטוח להמשיך".to_string(),
            ),
        }
    }
}

/// Decide whether `kind` over `size` input bytes can run given `status`.
///
/// First match wins:
/// 1. free < critical memory            -> blocked, abort (alternative still attached)
/// 2. free < memory needed              -> blocked, alternative or close other apps
/// 3. cpu > critical cpu                -> blocked, wait
/// 4. free <= warning memory            -> allowed with caution
/// 5. cpu > warning cpu                 -> allowed with caution
/// 6. otherwise                         -> proceed
pub fn evaluate(
    status: &ResourceStatus,
    kind: OperationKind,
    size: u64,
    thresholds: &ResourceThresholds,
    costs: &CostTable,
) -> SafetyCheck {
    let needed = costs.calculate_memory_requirement(kind, size);
    let available = status.memory.available;
    let cpu = status.cpu.usage_percent;

    let memory_details = || SafetyDetails {
        memory_shortfall: Some(needed.saturating_sub(available)),
        ..SafetyDetails::default()
    };
    let cpu_details = |limit: f64| SafetyDetails {
        cpu_overload: Some(cpu - limit),
        ..SafetyDetails::default()
    };

    let (safe, reason, recommendation, alternative, details, verdict) = if available < thresholds.critical_memory {
        (
            false,
            Some(SafetyReason::InsufficientMemory),
            Recommendation::Abort,
            costs.get_alternative_method(kind, available),
            Some(memory_details()),
            Verdict::CriticalMemory,
        )
    } else if available < needed {
        let alternative = costs.get_alternative_method(kind, available);
        let recommendation = if alternative.is_some() {
            Recommendation::UseAlternative
        } else {
            Recommendation::CloseOtherApps
        };
        (
            false,
            Some(SafetyReason::InsufficientMemory),
            recommendation,
            alternative,
            Some(memory_details()),
            Verdict::MemoryShortfall { needed, available },
        )
    } else if cpu > thresholds.critical_cpu {
        (
            false,
            Some(SafetyReason::HighCpu),
            Recommendation::Wait,
            None,
            Some(cpu_details(thresholds.critical_cpu)),
            Verdict::CpuCritical,
        )
    } else if available <= thresholds.warning_memory {
        (
            true,
            Some(SafetyReason::InsufficientMemory),
            Recommendation::ProceedWithCaution,
            None,
            Some(memory_details()),
            Verdict::LowMemory,
        )
    } else if cpu > thresholds.warning_cpu {
        (
            true,
            Some(SafetyReason::HighCpu),
            Recommendation::ProceedWithCaution,
            None,
            Some(cpu_details(thresholds.warning_cpu)),
            Verdict::HighCpu,
        )
    } else {
        (true, None, Recommendation::Proceed, None, None, Verdict::Clear)
    };

    let (message, message_hebrew) = verdict.messages();

    SafetyCheck {
        safe,
        reason,
        recommendation,
        alternative_method: alternative,
        estimated_memory_needed: needed,
        available_memory: available,
        message,
        message_hebrew,
        details,
    }
}

/// Format bytes for display
pub fn format_bytes(bytes: u64) -> String {
    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    }
}
