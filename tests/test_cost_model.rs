//! Contract tests for the operation cost model

use headroom::constants::{GB, MB};
use headroom::models::{OperationCost, OperationKind};
use headroom::operations::{
    calculate_memory_requirement, get_alternative_method, get_operation_cost, is_memory_intensive,
};
use headroom::CostTable;

const SIZES: &[u64] = &[0, 1, 1023, MB, 7 * MB + 3, 100 * MB, GB, 50 * GB];

#[test]
fn test_zero_size_requires_exactly_the_floor() {
    for kind in OperationKind::ALL {
        assert_eq!(
            calculate_memory_requirement(kind, 0),
            get_operation_cost(kind).min_memory_required,
            "{}",
            kind
        );
    }
}

#[test]
fn test_requirement_is_monotonic_in_size() {
    for kind in OperationKind::ALL {
        for pair in SIZES.windows(2) {
            assert!(
                calculate_memory_requirement(kind, pair[0]) <= calculate_memory_requirement(kind, pair[1]),
                "{} not monotonic between {} and {}",
                kind,
                pair[0],
                pair[1]
            );
        }
    }
}

#[test]
fn test_no_alternative_at_or_above_floor() {
    for kind in OperationKind::ALL {
        let floor = get_operation_cost(kind).min_memory_required;
        for available in [floor, floor + 1, 2 * floor, 16 * GB] {
            assert_eq!(get_alternative_method(kind, available), None, "{} at {}", kind, available);
        }
        assert!(get_alternative_method(kind, floor - 1).is_some(), "{} below floor", kind);
    }
}

#[test]
fn test_heavy_kinds_are_memory_intensive() {
    let intensive: Vec<_> = OperationKind::ALL
        .into_iter()
        .filter(|kind| is_memory_intensive(*kind))
        .collect();

    assert_eq!(
        intensive,
        vec![
            OperationKind::Waveform,
            OperationKind::VideoProcess,
            OperationKind::ReportGeneration,
            OperationKind::AiProcessing,
            OperationKind::Transcription,
            OperationKind::HeavyOperation,
        ]
    );
}

#[test]
fn test_table_overrides_leave_free_functions_untouched() {
    let table = CostTable::default()
        .with_override(
            OperationKind::VideoProcess,
            OperationCost::new(1.0, 1.0, MB, 400 * MB, "hardware decoder"),
        )
        .unwrap();

    assert_eq!(table.calculate_memory_requirement(OperationKind::VideoProcess, 10 * MB), 10 * MB);
    assert_eq!(calculate_memory_requirement(OperationKind::VideoProcess, 10 * MB), 100 * MB);
    // Preferred memory alone keeps it intensive
    assert!(table.is_memory_intensive(OperationKind::VideoProcess));
}
