//! # Mejlis Check
//!
//! Consistency warnings for a room plan, in the form the order form shows
//! them. A plan with any `Error` finding cannot be submitted.

pub mod violation;

pub use violation::{Severity, Violation, ViolationType};

use mejlis_core::side::{is_valid_segment_length, segment_sum};
use mejlis_core::RoomPlan;

/// Inspect every side of the plan, then the side total.
pub fn check_plan(plan: &RoomPlan) -> Vec<Violation> {
    let mut violations = Vec::new();

    for side in plan.side_keys() {
        let length = plan.side_length(side).unwrap_or_default();
        let Some(segments) = plan.segments().get(&side) else {
            violations.push(Violation {
                violation_type: ViolationType::MissingSide,
                severity: Severity::Error,
                side: Some(side),
                segment_index: None,
                expected: length,
                actual: 0,
                message: format!("No segments defined for {side} ({length}m)"),
            });
            continue;
        };

        let sum = segment_sum(segments);
        if sum != length {
            violations.push(Violation {
                violation_type: ViolationType::SegmentSumMismatch,
                severity: Severity::Error,
                side: Some(side),
                segment_index: None,
                expected: length,
                actual: sum,
                message: format!("Segments sum ({sum}m) must equal side length ({length}m)"),
            });
        }

        for (index, &value) in segments.iter().enumerate() {
            if !is_valid_segment_length(value) {
                violations.push(Violation {
                    violation_type: ViolationType::SegmentOutOfRange,
                    severity: Severity::Warning,
                    side: Some(side),
                    segment_index: Some(index),
                    expected: value.clamp(mejlis_core::MIN_SEGMENT, mejlis_core::MAX_SEGMENT),
                    actual: value,
                    message: format!(
                        "Segment {} on {side} is {value}m, outside the 1-3m range",
                        index + 1
                    ),
                });
            }
        }
    }

    let total = plan.sides_total();
    let available = plan.available_length();
    if total != available {
        violations.push(Violation {
            violation_type: ViolationType::SidesTotalMismatch,
            severity: Severity::Warning,
            side: None,
            segment_index: None,
            expected: available,
            actual: total,
            message: format!(
                "Total of all sides ({total}m) must equal {available}m (room size {}m minus {}m corner deduction)",
                plan.room_size(),
                plan.shape().corner_deduction()
            ),
        });
    }

    if !violations.is_empty() {
        log::debug!("Plan check found {} issue(s)", violations.len());
    }
    violations
}

/// True iff any finding is an error.
pub fn blocks_submission(violations: &[Violation]) -> bool {
    violations.iter().any(Violation::is_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mejlis_core::{RoomShape, SideKey};

    #[test]
    fn test_fresh_plan_is_clean() {
        let plan = RoomPlan::new(RoomShape::L, 12).unwrap();
        assert!(check_plan(&plan).is_empty());
    }

    #[test]
    fn test_removed_segment_blocks_submission() {
        let mut plan = RoomPlan::new(RoomShape::L, 12).unwrap();
        plan.remove_segment(SideKey::new(1), 1).unwrap();

        let violations = check_plan(&plan);
        assert_eq!(violations.len(), 1);
        let v = &violations[0];
        assert_eq!(v.violation_type, ViolationType::SegmentSumMismatch);
        assert_eq!(v.side, Some(SideKey::new(1)));
        assert_eq!((v.expected, v.actual), (5, 2));
        assert_eq!(v.message, "Segments sum (2m) must equal side length (5m)");
        assert!(blocks_submission(&violations));
        assert_eq!(blocks_submission(&violations), !plan.segments_are_valid());
    }

    #[test]
    fn test_collapsed_side_warns() {
        let mut plan = RoomPlan::new(RoomShape::L, 12).unwrap();
        plan.change_side_length(0, 4).unwrap();

        let violations = check_plan(&plan);
        let types: Vec<_> = violations.iter().map(|v| v.violation_type).collect();
        assert_eq!(
            types,
            vec![ViolationType::SegmentOutOfRange, ViolationType::SidesTotalMismatch]
        );
        assert!(!blocks_submission(&violations));
        assert_eq!(violations[1].expected, 10);
        assert_eq!(violations[1].actual, 9);
    }

    #[test]
    fn test_straight_default_segments_over_range() {
        // A 10m straight run splits into 5 + 5, both too long to fabricate.
        let plan = RoomPlan::new(RoomShape::Straight, 10).unwrap();
        let violations = check_plan(&plan);
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().all(|v| v.severity == Severity::Warning));
        assert_eq!(violations[0].segment_index, Some(0));
    }

    #[test]
    fn test_emptied_side() {
        let mut plan = RoomPlan::new(RoomShape::L, 12).unwrap();
        plan.remove_segment(SideKey::new(2), 0).unwrap();
        plan.remove_segment(SideKey::new(2), 0).unwrap();
        let violations = check_plan(&plan);
        // An emptied list still exists; it is a sum mismatch, not missing.
        assert_eq!(violations[0].violation_type, ViolationType::SegmentSumMismatch);
        assert_eq!(violations[0].actual, 0);
    }

    #[test]
    fn test_missing_side() {
        let mut segments = mejlis_core::Segments::new();
        segments.insert(SideKey::new(1), vec![2, 3]);
        let plan = RoomPlan::from_parts(RoomShape::L, 12, vec![5, 5], segments).unwrap();

        let violations = check_plan(&plan);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].violation_type, ViolationType::MissingSide);
        assert_eq!(violations[0].side, Some(SideKey::new(2)));
        assert!(blocks_submission(&violations));
    }
}
