use crate::error::PlanError;
use crate::plan::{PlanSnapshot, RoomPlan};
use crate::shape::RoomShape;
use crate::side::SideKey;

/// A reversible edit for the undo/redo system.
pub trait Command: std::fmt::Debug + Send {
    /// Apply the edit. A rejected edit must leave the plan untouched.
    fn execute(&mut self, plan: &mut RoomPlan) -> Result<(), PlanError>;
    /// Reverse a previously successful `execute`.
    fn undo(&mut self, plan: &mut RoomPlan);
    /// Human-readable description for the undo/redo history.
    fn description(&self) -> &str;
}

// ══════════════════════════════════════════════════════════════════════
// Concrete Commands
// ══════════════════════════════════════════════════════════════════════

/// Override the length of one side.
#[derive(Debug)]
pub struct ChangeSideLengthCommand {
    pub index: usize,
    pub length: u32,
    /// Previous length and segment list (set on execute).
    previous: Option<(u32, Option<Vec<u32>>)>,
}

impl ChangeSideLengthCommand {
    pub fn new(index: usize, length: u32) -> Self {
        Self {
            index,
            length,
            previous: None,
        }
    }
}

impl Command for ChangeSideLengthCommand {
    fn execute(&mut self, plan: &mut RoomPlan) -> Result<(), PlanError> {
        let old_length = plan
            .sides
            .get(self.index)
            .copied()
            .ok_or(PlanError::SideIndexOutOfRange(self.index))?;
        let old_segments = plan.segments.get(&SideKey::from_index(self.index)).cloned();
        plan.change_side_length(self.index, self.length)?;
        self.previous = Some((old_length, old_segments));
        Ok(())
    }

    fn undo(&mut self, plan: &mut RoomPlan) {
        let Some((length, segments)) = self.previous.take() else {
            return;
        };
        let key = SideKey::from_index(self.index);
        if let Some(slot) = plan.sides.get_mut(self.index) {
            *slot = length;
        }
        match segments {
            Some(list) => plan.segments.insert(key, list),
            None => plan.segments.remove(&key),
        };
    }

    fn description(&self) -> &str {
        "Change side length"
    }
}

/// Set one segment's length.
#[derive(Debug)]
pub struct ChangeSegmentCommand {
    pub side: SideKey,
    pub index: usize,
    pub value: u32,
    previous: Option<u32>,
}

impl ChangeSegmentCommand {
    pub fn new(side: SideKey, index: usize, value: u32) -> Self {
        Self {
            side,
            index,
            value,
            previous: None,
        }
    }
}

impl Command for ChangeSegmentCommand {
    fn execute(&mut self, plan: &mut RoomPlan) -> Result<(), PlanError> {
        self.previous = Some(plan.change_segment(self.side, self.index, self.value)?);
        Ok(())
    }

    fn undo(&mut self, plan: &mut RoomPlan) {
        if let Some(value) = self.previous.take() {
            if let Some(slot) = plan
                .segments
                .get_mut(&self.side)
                .and_then(|list| list.get_mut(self.index))
            {
                *slot = value;
            }
        }
    }

    fn description(&self) -> &str {
        "Change segment"
    }
}

/// Append a segment to a side.
#[derive(Debug)]
pub struct AddSegmentCommand {
    pub side: SideKey,
    added: bool,
}

impl AddSegmentCommand {
    pub fn new(side: SideKey) -> Self {
        Self { side, added: false }
    }
}

impl Command for AddSegmentCommand {
    fn execute(&mut self, plan: &mut RoomPlan) -> Result<(), PlanError> {
        plan.add_segment(self.side)?;
        self.added = true;
        Ok(())
    }

    fn undo(&mut self, plan: &mut RoomPlan) {
        if self.added {
            if let Some(list) = plan.segments.get_mut(&self.side) {
                list.pop();
            }
            self.added = false;
        }
    }

    fn description(&self) -> &str {
        "Add segment"
    }
}

/// Remove a segment by position.
#[derive(Debug)]
pub struct RemoveSegmentCommand {
    pub side: SideKey,
    pub index: usize,
    /// The removed length (saved for undo).
    removed: Option<u32>,
}

impl RemoveSegmentCommand {
    pub fn new(side: SideKey, index: usize) -> Self {
        Self {
            side,
            index,
            removed: None,
        }
    }
}

impl Command for RemoveSegmentCommand {
    fn execute(&mut self, plan: &mut RoomPlan) -> Result<(), PlanError> {
        self.removed = Some(plan.remove_segment(self.side, self.index)?);
        Ok(())
    }

    fn undo(&mut self, plan: &mut RoomPlan) {
        if let Some(value) = self.removed.take() {
            let list = plan.segments.entry(self.side).or_default();
            // Re-insert at the original index
            if self.index <= list.len() {
                list.insert(self.index, value);
            } else {
                list.push(value);
            }
        }
    }

    fn description(&self) -> &str {
        "Remove segment"
    }
}

/// Switch the room shape (may re-derive sides).
#[derive(Debug)]
pub struct SetShapeCommand {
    pub shape: RoomShape,
    previous: Option<PlanSnapshot>,
}

impl SetShapeCommand {
    pub fn new(shape: RoomShape) -> Self {
        Self {
            shape,
            previous: None,
        }
    }
}

impl Command for SetShapeCommand {
    fn execute(&mut self, plan: &mut RoomPlan) -> Result<(), PlanError> {
        let snapshot = plan.snapshot();
        plan.set_shape(self.shape)?;
        self.previous = Some(snapshot);
        Ok(())
    }

    fn undo(&mut self, plan: &mut RoomPlan) {
        if let Some(snapshot) = self.previous.take() {
            plan.restore(snapshot);
        }
    }

    fn description(&self) -> &str {
        "Change room shape"
    }
}

/// Change the total room size.
#[derive(Debug)]
pub struct SetRoomSizeCommand {
    pub room_size: u32,
    previous: Option<u32>,
}

impl SetRoomSizeCommand {
    pub fn new(room_size: u32) -> Self {
        Self {
            room_size,
            previous: None,
        }
    }
}

impl Command for SetRoomSizeCommand {
    fn execute(&mut self, plan: &mut RoomPlan) -> Result<(), PlanError> {
        let old = plan.room_size;
        plan.set_room_size(self.room_size)?;
        self.previous = Some(old);
        Ok(())
    }

    fn undo(&mut self, plan: &mut RoomPlan) {
        if let Some(size) = self.previous.take() {
            plan.room_size = size;
        }
    }

    fn description(&self) -> &str {
        "Change room size"
    }
}

/// Redistribute sides and segments from the current shape and size.
#[derive(Debug, Default)]
pub struct ResetSidesCommand {
    previous: Option<PlanSnapshot>,
}

impl ResetSidesCommand {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Command for ResetSidesCommand {
    fn execute(&mut self, plan: &mut RoomPlan) -> Result<(), PlanError> {
        let snapshot = plan.snapshot();
        plan.reset_sides()?;
        self.previous = Some(snapshot);
        Ok(())
    }

    fn undo(&mut self, plan: &mut RoomPlan) {
        if let Some(snapshot) = self.previous.take() {
            plan.restore(snapshot);
        }
    }

    fn description(&self) -> &str {
        "Reset sides"
    }
}

/// Manages the undo/redo history stack.
#[derive(Debug, Default)]
pub struct CommandHistory {
    undo_stack: Vec<Box<dyn Command>>,
    redo_stack: Vec<Box<dyn Command>>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Record an executed command. A new edit clears the redo stack.
    pub fn record(&mut self, command: Box<dyn Command>) {
        self.undo_stack.push(command);
        self.redo_stack.clear();
    }

    pub(crate) fn pop_undo(&mut self) -> Option<Box<dyn Command>> {
        self.undo_stack.pop()
    }

    pub(crate) fn pop_redo(&mut self) -> Option<Box<dyn Command>> {
        self.redo_stack.pop()
    }

    pub(crate) fn push_undo(&mut self, command: Box<dyn Command>) {
        self.undo_stack.push(command);
    }

    pub(crate) fn push_redo(&mut self, command: Box<dyn Command>) {
        self.redo_stack.push(command);
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|c| c.description())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|c| c.description())
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_segment_edits() {
        let mut plan = RoomPlan::new(RoomShape::L, 12).unwrap();
        let side1 = SideKey::new(1);

        plan.execute(Box::new(RemoveSegmentCommand::new(side1, 0))).unwrap();
        plan.execute(Box::new(ChangeSegmentCommand::new(side1, 0, 2))).unwrap();
        assert_eq!(plan.segments()[&side1], vec![2]);
        assert_eq!(plan.history().undo_description(), Some("Change segment"));

        assert!(plan.undo());
        assert_eq!(plan.segments()[&side1], vec![3]);
        assert!(plan.undo());
        assert_eq!(plan.segments()[&side1], vec![2, 3]);
        assert!(!plan.undo());

        assert!(plan.redo());
        assert_eq!(plan.segments()[&side1], vec![3]);
        assert!(plan.can_redo());
    }

    #[test]
    fn test_rejected_command_not_recorded() {
        let mut plan = RoomPlan::new(RoomShape::L, 12).unwrap();
        let result = plan.execute(Box::new(ChangeSegmentCommand::new(SideKey::new(1), 0, 4)));
        assert!(result.is_err());
        assert!(!plan.can_undo());

        let result = plan.execute(Box::new(AddSegmentCommand::new(SideKey::new(1))));
        assert!(matches!(result, Err(PlanError::SideFull { .. })));
        assert!(!plan.can_undo());
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut plan = RoomPlan::new(RoomShape::Straight, 10).unwrap();
        let side1 = SideKey::new(1);
        plan.execute(Box::new(RemoveSegmentCommand::new(side1, 1))).unwrap();
        plan.undo();
        assert!(plan.can_redo());
        plan.execute(Box::new(AddSegmentCommand::new(side1))).unwrap_err();
        assert!(plan.can_redo());
        plan.execute(Box::new(ChangeSegmentCommand::new(side1, 0, 4))).unwrap_err();
        plan.execute(Box::new(ChangeSideLengthCommand::new(0, 12))).unwrap();
        assert!(!plan.can_redo());
    }

    #[test]
    fn test_undo_side_length_restores_segments() {
        let mut plan = RoomPlan::new(RoomShape::L, 12).unwrap();
        plan.execute(Box::new(ChangeSideLengthCommand::new(1, 3))).unwrap();
        assert_eq!(plan.segments()[&SideKey::new(2)], vec![3]);
        plan.undo();
        assert_eq!(plan.sides(), &[5, 5]);
        assert_eq!(plan.segments()[&SideKey::new(2)], vec![2, 3]);
    }

    #[test]
    fn test_undo_shape_change_and_resize() {
        let mut plan = RoomPlan::new(RoomShape::L, 12).unwrap();
        plan.execute(Box::new(SetShapeCommand::new(RoomShape::Straight))).unwrap();
        assert_eq!(plan.sides(), &[12]);
        plan.execute(Box::new(SetRoomSizeCommand::new(14))).unwrap();
        plan.execute(Box::new(ResetSidesCommand::new())).unwrap();
        assert_eq!(plan.sides(), &[14]);

        plan.undo();
        assert_eq!(plan.sides(), &[12]);
        plan.undo();
        assert_eq!(plan.room_size(), 12);
        plan.undo();
        assert_eq!(plan.shape(), RoomShape::L);
        assert_eq!(plan.sides(), &[5, 5]);
        assert_eq!(plan.segments()[&SideKey::new(2)], vec![2, 3]);
    }
}
