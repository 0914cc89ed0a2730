use serde::{Deserialize, Serialize};

use mejlis_core::SideKey;

/// Kind of inconsistency found in a room plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// A side's segments do not add up to its length.
    SegmentSumMismatch,
    /// The side lengths do not add up to room size minus corners.
    SidesTotalMismatch,
    /// A segment lies outside the fabricable 1-3 range.
    SegmentOutOfRange,
    /// A side has no segment list at all.
    MissingSide,
}

/// Severity level of a violation. Errors block order submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

/// A single finding with the numbers needed to explain it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub violation_type: ViolationType,
    pub severity: Severity,
    /// Affected side, if the finding is about one side.
    pub side: Option<SideKey>,
    /// Affected segment position within the side.
    pub segment_index: Option<usize>,
    pub expected: u32,
    pub actual: u32,
    pub message: String,
}

impl Violation {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
