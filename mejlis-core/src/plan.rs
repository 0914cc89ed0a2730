use serde::{Deserialize, Serialize};

use crate::commands::{Command, CommandHistory};
use crate::error::PlanError;
use crate::shape::{default_segments, derive_sides, RoomShape};
use crate::side::{self, segment_sum, SideKey, SideSummary, Segments};

/// Editable seating layout for one room: the shape, the total size, the
/// derived side lengths and the user's segment split of every side.
#[derive(Debug, Serialize, Deserialize)]
#[serde(try_from = "StoredPlan")]
pub struct RoomPlan {
    pub(crate) shape: RoomShape,
    pub(crate) room_size: u32,
    pub(crate) sides: Vec<u32>,
    pub(crate) segments: Segments,
    /// Edit history for undo/redo.
    #[serde(skip)]
    history: CommandHistory,
}

/// Serialized form of a plan, checked by [`RoomPlan::from_parts`] before use.
#[derive(Deserialize)]
struct StoredPlan {
    shape: RoomShape,
    room_size: u32,
    sides: Vec<u32>,
    #[serde(default)]
    segments: Segments,
}

impl TryFrom<StoredPlan> for RoomPlan {
    type Error = PlanError;

    fn try_from(stored: StoredPlan) -> Result<Self, Self::Error> {
        RoomPlan::from_parts(stored.shape, stored.room_size, stored.sides, stored.segments)
    }
}

/// Full copy of the editable state, used by commands that reset sides.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlanSnapshot {
    shape: RoomShape,
    room_size: u32,
    sides: Vec<u32>,
    segments: Segments,
}

impl RoomPlan {
    /// Create a plan with evenly derived sides and a two-way split per side.
    pub fn new(shape: RoomShape, room_size: u32) -> Result<Self, PlanError> {
        let sides = derive_sides(shape, room_size)?;
        let segments = default_segments(&sides);
        log::debug!("New {shape} plan for {room_size}m: sides {sides:?}");
        Ok(Self {
            shape,
            room_size,
            sides,
            segments,
            history: CommandHistory::new(),
        })
    }

    /// Rebuild a plan from stored sides and segments without re-deriving
    /// anything (used when editing an existing order).
    pub fn from_parts(
        shape: RoomShape,
        room_size: u32,
        sides: Vec<u32>,
        segments: Segments,
    ) -> Result<Self, PlanError> {
        shape.available_length(room_size)?;
        Ok(Self {
            shape,
            room_size,
            sides,
            segments,
            history: CommandHistory::new(),
        })
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn shape(&self) -> RoomShape {
        self.shape
    }

    pub fn room_size(&self) -> u32 {
        self.room_size
    }

    pub fn sides(&self) -> &[u32] {
        &self.sides
    }

    pub fn segments(&self) -> &Segments {
        &self.segments
    }

    pub fn side_length(&self, side: SideKey) -> Option<u32> {
        self.sides.get(side.index()).copied()
    }

    pub fn side_keys(&self) -> impl Iterator<Item = SideKey> + '_ {
        (0..self.sides.len()).map(SideKey::from_index)
    }

    /// `room_size - corner_deduction` for the current shape.
    pub fn available_length(&self) -> u32 {
        self.room_size.saturating_sub(self.shape.corner_deduction())
    }

    // ── Shape and size ───────────────────────────────────────────────

    /// Switch shape. Sides are initialized once per shape transition: they
    /// are re-derived only when the side count changes, so segment edits
    /// survive re-selecting the same shape.
    pub fn set_shape(&mut self, shape: RoomShape) -> Result<(), PlanError> {
        shape.available_length(self.room_size)?;
        self.shape = shape;
        if self.sides.len() != shape.side_count() {
            log::info!("Shape changed to {shape}, re-deriving sides");
            self.reinitialize()?;
        }
        Ok(())
    }

    /// Store a new room size. Sides are not re-derived; use
    /// [`RoomPlan::reset_sides`] to redistribute.
    pub fn set_room_size(&mut self, room_size: u32) -> Result<(), PlanError> {
        self.shape.available_length(room_size)?;
        self.room_size = room_size;
        Ok(())
    }

    /// Re-derive sides and default segments from the current shape and size.
    pub fn reset_sides(&mut self) -> Result<(), PlanError> {
        self.reinitialize()
    }

    fn reinitialize(&mut self) -> Result<(), PlanError> {
        let sides = derive_sides(self.shape, self.room_size)?;
        self.segments = default_segments(&sides);
        self.sides = sides;
        Ok(())
    }

    // ── Side and segment editing ─────────────────────────────────────

    /// Override a side length. If the side's segments no longer fit, they
    /// collapse into a single segment of the new length.
    pub fn change_side_length(&mut self, index: usize, length: u32) -> Result<(), PlanError> {
        let slot = self
            .sides
            .get_mut(index)
            .ok_or(PlanError::SideIndexOutOfRange(index))?;
        *slot = length;

        let key = SideKey::from_index(index);
        if self.segment_sum(key) > length {
            log::debug!("Segments on {key} exceed {length}m, collapsing to one segment");
            self.segments.insert(key, vec![length]);
        }
        Ok(())
    }

    /// Set one segment value (1-3) without over-allocating the side.
    pub fn change_segment(
        &mut self,
        side: SideKey,
        index: usize,
        value: u32,
    ) -> Result<u32, PlanError> {
        let length = self.require_side(side)?;
        side::change_segment(&mut self.segments, side, index, value, length).inspect_err(|e| {
            log::debug!("Rejected segment edit on {side}[{index}] = {value}: {e}");
        })
    }

    /// Append a segment of `min(3, remaining)`. Fails once the side is full.
    pub fn add_segment(&mut self, side: SideKey) -> Result<u32, PlanError> {
        let length = self.require_side(side)?;
        side::add_segment(&mut self.segments, side, length)
    }

    pub fn remove_segment(&mut self, side: SideKey, index: usize) -> Result<u32, PlanError> {
        side::remove_segment(&mut self.segments, side, index)
    }

    fn require_side(&self, side: SideKey) -> Result<u32, PlanError> {
        self.side_length(side).ok_or(PlanError::UnknownSide(side))
    }

    // ── Validation ───────────────────────────────────────────────────

    pub fn segment_sum(&self, side: SideKey) -> u32 {
        self.segments.get(&side).map_or(0, |s| segment_sum(s))
    }

    pub fn side_is_valid(&self, index: usize) -> bool {
        self.sides
            .get(index)
            .is_some_and(|&len| self.segment_sum(SideKey::from_index(index)) == len)
    }

    /// True iff every side's segments sum exactly to its length. Gates
    /// order submission.
    pub fn segments_are_valid(&self) -> bool {
        (0..self.sides.len()).all(|i| self.side_is_valid(i))
    }

    pub fn can_add_segment(&self, side: SideKey) -> bool {
        self.side_length(side)
            .is_some_and(|len| self.segment_sum(side) < len)
    }

    pub fn sides_total(&self) -> u32 {
        self.sides.iter().fold(0u32, |acc, &len| acc.saturating_add(len))
    }

    /// Whether user side overrides still add up to the available run.
    pub fn sides_total_is_valid(&self) -> bool {
        self.sides_total() == self.available_length()
    }

    pub fn summary(&self) -> Vec<SideSummary> {
        self.sides
            .iter()
            .enumerate()
            .map(|(i, &length)| {
                let key = SideKey::from_index(i);
                let segments = self.segments.get(&key).cloned().unwrap_or_default();
                let sum = segment_sum(&segments);
                SideSummary {
                    key,
                    length,
                    segments,
                    segment_sum: sum,
                    valid: sum == length,
                }
            })
            .collect()
    }

    // ── Undo / Redo ──────────────────────────────────────────────────

    /// Apply an edit and record it. Rejected edits leave no history entry.
    pub fn execute(&mut self, mut command: Box<dyn Command>) -> Result<(), PlanError> {
        command.execute(self)?;
        self.history.record(command);
        Ok(())
    }

    pub fn undo(&mut self) -> bool {
        let Some(mut command) = self.history.pop_undo() else {
            return false;
        };
        log::debug!("Undo: {}", command.description());
        command.undo(self);
        self.history.push_redo(command);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(mut command) = self.history.pop_redo() else {
            return false;
        };
        match command.execute(self) {
            Ok(()) => {
                log::debug!("Redo: {}", command.description());
                self.history.push_undo(command);
                true
            }
            Err(e) => {
                log::warn!("Redo of '{}' failed: {}", command.description(), e);
                false
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub(crate) fn snapshot(&self) -> PlanSnapshot {
        PlanSnapshot {
            shape: self.shape,
            room_size: self.room_size,
            sides: self.sides.clone(),
            segments: self.segments.clone(),
        }
    }

    pub(crate) fn restore(&mut self, snapshot: PlanSnapshot) {
        self.shape = snapshot.shape;
        self.room_size = snapshot.room_size;
        self.sides = snapshot.sides;
        self.segments = snapshot.segments;
    }

    // ── Serialization ────────────────────────────────────────────────

    pub fn to_json(&self) -> Result<String, PlanError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PlanError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_plan_is_valid() {
        let plan = RoomPlan::new(RoomShape::Straight, 10).unwrap();
        assert_eq!(plan.sides(), &[10]);
        assert_eq!(plan.segments()[&SideKey::new(1)], vec![5, 5]);
        assert!(plan.segments_are_valid());
        assert!(plan.sides_total_is_valid());
    }

    #[test]
    fn test_rejected_segment_edit_keeps_state() {
        let mut plan = RoomPlan::new(RoomShape::L, 12).unwrap();
        assert!(plan.change_segment(SideKey::new(1), 0, 4).is_err());
        assert_eq!(plan.segments()[&SideKey::new(1)], vec![2, 3]);
        assert!(matches!(
            plan.change_segment(SideKey::new(3), 0, 1),
            Err(PlanError::UnknownSide(_))
        ));
    }

    #[test]
    fn test_remove_segment_invalidates_side() {
        let mut plan = RoomPlan::new(RoomShape::L, 12).unwrap();
        plan.remove_segment(SideKey::new(1), 1).unwrap();
        assert_eq!(plan.segments()[&SideKey::new(1)], vec![2]);
        assert!(!plan.side_is_valid(0));
        assert!(plan.side_is_valid(1));
        assert!(!plan.segments_are_valid());

        plan.add_segment(SideKey::new(1)).unwrap();
        assert_eq!(plan.segments()[&SideKey::new(1)], vec![2, 3]);
        assert!(plan.segments_are_valid());
        assert!(!plan.can_add_segment(SideKey::new(1)));
    }

    #[test]
    fn test_change_side_length_collapses_segments() {
        let mut plan = RoomPlan::new(RoomShape::L, 12).unwrap();
        plan.change_side_length(0, 4).unwrap();
        assert_eq!(plan.sides(), &[4, 5]);
        assert_eq!(plan.segments()[&SideKey::new(1)], vec![4]);
        assert!(!plan.sides_total_is_valid());

        // Growing a side keeps the existing segments.
        plan.change_side_length(1, 8).unwrap();
        assert_eq!(plan.segments()[&SideKey::new(2)], vec![2, 3]);
        assert!(!plan.side_is_valid(1));

        assert!(matches!(
            plan.change_side_length(2, 1),
            Err(PlanError::SideIndexOutOfRange(2))
        ));
    }

    #[test]
    fn test_set_shape_initializes_once_per_transition() {
        let mut plan = RoomPlan::new(RoomShape::L, 12).unwrap();
        plan.change_segment(SideKey::new(1), 1, 1).unwrap();

        // Same side count: user edits survive.
        plan.set_shape(RoomShape::L).unwrap();
        assert_eq!(plan.segments()[&SideKey::new(1)], vec![2, 1]);

        plan.set_shape(RoomShape::U).unwrap();
        assert_eq!(plan.sides(), &[3, 3, 2]);
        assert_eq!(plan.segments()[&SideKey::new(3)], vec![1, 1]);
    }

    #[test]
    fn test_set_room_size_does_not_reset_edits() {
        let mut plan = RoomPlan::new(RoomShape::L, 12).unwrap();
        plan.set_room_size(14).unwrap();
        assert_eq!(plan.sides(), &[5, 5]);
        assert!(!plan.sides_total_is_valid());

        plan.reset_sides().unwrap();
        assert_eq!(plan.sides(), &[6, 6]);
        assert!(plan.sides_total_is_valid());
    }

    #[test]
    fn test_too_small_room_is_rejected_without_change() {
        let mut plan = RoomPlan::new(RoomShape::Straight, 3).unwrap();
        assert!(plan.set_shape(RoomShape::U).is_err());
        assert_eq!(plan.shape(), RoomShape::Straight);
        assert!(plan.set_room_size(0).is_err());
        assert_eq!(plan.room_size(), 3);
        assert!(RoomPlan::new(RoomShape::L, 1).is_err());
    }

    #[test]
    fn test_stored_room_too_small_is_rejected() {
        let json = r#"{"shape":"U","room_size":1,"sides":[0,0,0],"segments":{}}"#;
        assert!(matches!(
            RoomPlan::from_json(json),
            Err(PlanError::Json(_))
        ));
        let err = RoomPlan::from_json(json).unwrap_err().to_string();
        assert!(err.contains("1m is smaller than the 4m corner deduction"), "{err}");
    }

    #[test]
    fn test_json_roundtrip() {
        let mut plan = RoomPlan::new(RoomShape::U, 13).unwrap();
        plan.remove_segment(SideKey::new(2), 0).unwrap();
        let json = plan.to_json().unwrap();
        assert!(json.contains("\"side2\""));
        let back = RoomPlan::from_json(&json).unwrap();
        assert_eq!(back.sides(), plan.sides());
        assert_eq!(back.segments(), plan.segments());
        assert!(!back.can_undo());
    }
}
