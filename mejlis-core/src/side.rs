use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PlanError;

/// Shortest fabricable segment, in units.
pub const MIN_SEGMENT: u32 = 1;
/// Longest fabricable segment, in units.
pub const MAX_SEGMENT: u32 = 3;

/// Identifies one side of the room: `side1`, `side2`, ...
///
/// Ordering follows the numeric suffix, so `side10` sorts after `side2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SideKey(usize);

impl SideKey {
    /// Build from the 1-based side number. `number` must be at least 1.
    pub fn new(number: usize) -> Self {
        debug_assert!(number >= 1, "side numbers start at 1");
        Self(number.max(1))
    }

    /// Checked form of [`SideKey::new`].
    pub fn try_new(number: usize) -> Result<Self, PlanError> {
        if number == 0 {
            return Err(PlanError::InvalidSideKey(format!("side{number}")));
        }
        Ok(Self(number))
    }

    /// Build from the 0-based position in the `sides` list.
    pub fn from_index(index: usize) -> Self {
        Self(index + 1)
    }

    pub fn number(&self) -> usize {
        self.0
    }

    /// 0-based position in the `sides` list.
    pub fn index(&self) -> usize {
        self.0 - 1
    }
}

impl fmt::Display for SideKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "side{}", self.0)
    }
}

impl FromStr for SideKey {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("side")
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|&n| n >= 1)
            .map(SideKey)
            .ok_or_else(|| PlanError::InvalidSideKey(s.to_string()))
    }
}

impl Serialize for SideKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SideKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Segment lengths per side. Serializes as `{"side1": [2, 3], ...}`.
pub type Segments = BTreeMap<SideKey, Vec<u32>>;

/// Total of a segment list, saturating at `u32::MAX`.
pub fn segment_sum(segments: &[u32]) -> u32 {
    segments.iter().fold(0u32, |acc, &len| acc.saturating_add(len))
}

pub fn is_valid_segment_length(length: u32) -> bool {
    (MIN_SEGMENT..=MAX_SEGMENT).contains(&length)
}

/// Replace one segment value. Returns the previous value.
///
/// Rejected without touching `segments` when the value is outside 1-3 or
/// the side would become over-allocated. Under-allocation is allowed.
pub fn change_segment(
    segments: &mut Segments,
    side: SideKey,
    index: usize,
    value: u32,
    side_length: u32,
) -> Result<u32, PlanError> {
    if !is_valid_segment_length(value) {
        return Err(PlanError::SegmentOutOfRange(value));
    }

    let list = segments
        .get_mut(&side)
        .ok_or(PlanError::SegmentIndexOutOfRange { side, index })?;
    let previous = *list
        .get(index)
        .ok_or(PlanError::SegmentIndexOutOfRange { side, index })?;

    let sum = segment_sum(list).saturating_sub(previous).saturating_add(value);
    if sum > side_length {
        return Err(PlanError::SideOverflow {
            side,
            sum,
            length: side_length,
        });
    }

    list[index] = value;
    Ok(previous)
}

/// Append a segment covering as much of the remainder as allowed (max 3).
/// Returns the appended length.
pub fn add_segment(
    segments: &mut Segments,
    side: SideKey,
    side_length: u32,
) -> Result<u32, PlanError> {
    let sum = segments.get(&side).map_or(0, |s| segment_sum(s));
    if sum >= side_length {
        return Err(PlanError::SideFull {
            side,
            length: side_length,
        });
    }

    let length = MAX_SEGMENT.min(side_length - sum);
    segments.entry(side).or_default().push(length);
    Ok(length)
}

/// Remove a segment by position. Returns the removed length.
pub fn remove_segment(
    segments: &mut Segments,
    side: SideKey,
    index: usize,
) -> Result<u32, PlanError> {
    match segments.get_mut(&side) {
        Some(list) if index < list.len() => Ok(list.remove(index)),
        _ => Err(PlanError::SegmentIndexOutOfRange { side, index }),
    }
}

/// Read-only view of a side for display and reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideSummary {
    pub key: SideKey,
    pub length: u32,
    pub segments: Vec<u32>,
    pub segment_sum: u32,
    pub valid: bool,
}
