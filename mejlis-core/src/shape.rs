use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::side::{SideKey, Segments};

/// Topology of the seating run along the room walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RoomShape {
    Straight,
    #[default]
    L,
    U,
}

impl RoomShape {
    pub const ALL: [RoomShape; 3] = [RoomShape::Straight, RoomShape::L, RoomShape::U];

    /// Length (units) taken by the corner joints.
    pub fn corner_deduction(&self) -> u32 {
        match self {
            RoomShape::Straight => 0,
            RoomShape::L => 2,
            RoomShape::U => 4,
        }
    }

    pub fn side_count(&self) -> usize {
        match self {
            RoomShape::Straight => 1,
            RoomShape::L => 2,
            RoomShape::U => 3,
        }
    }

    /// Side indices (0-based) that are followed by a corner joint.
    pub fn corner_positions(&self) -> &'static [usize] {
        match self {
            RoomShape::Straight => &[],
            RoomShape::L => &[0],
            RoomShape::U => &[0, 1],
        }
    }

    pub fn has_corner_after(&self, side_index: usize) -> bool {
        self.corner_positions().contains(&side_index)
    }

    /// Whether the run turns 90 degrees between sides.
    pub fn turns(&self) -> bool {
        !matches!(self, RoomShape::Straight)
    }

    /// Length left for the sides once corners are taken out.
    pub fn available_length(&self, room_size: u32) -> Result<u32, PlanError> {
        if room_size == 0 {
            return Err(PlanError::ZeroRoomSize);
        }
        let deduction = self.corner_deduction();
        room_size
            .checked_sub(deduction)
            .ok_or(PlanError::RoomTooSmall {
                size: room_size,
                deduction,
            })
    }
}

impl fmt::Display for RoomShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoomShape::Straight => "Straight",
            RoomShape::L => "L",
            RoomShape::U => "U",
        };
        f.write_str(name)
    }
}

impl FromStr for RoomShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "straight" => Ok(RoomShape::Straight),
            "l" => Ok(RoomShape::L),
            "u" => Ok(RoomShape::U),
            other => Err(format!("unknown room shape '{other}' (expected L, U or Straight)")),
        }
    }
}

/// Split the available run evenly across the shape's sides.
///
/// When the length does not divide evenly, the first `remainder` sides get
/// one extra unit, so the result always sums to
/// `room_size - corner_deduction`.
pub fn derive_sides(shape: RoomShape, room_size: u32) -> Result<Vec<u32>, PlanError> {
    let available = shape.available_length(room_size)?;
    let count = shape.side_count() as u32;

    let base = available / count;
    let remainder = (available - base * count) as usize;

    let mut sides = vec![base; count as usize];
    for side in sides.iter_mut().take(remainder) {
        *side += 1;
    }
    Ok(sides)
}

/// Two-way default split of every side: `[floor(L/2), L - floor(L/2)]`.
pub fn default_segments(sides: &[u32]) -> Segments {
    sides
        .iter()
        .enumerate()
        .map(|(i, &len)| {
            let half = len / 2;
            (SideKey::from_index(i), vec![half, len - half])
        })
        .collect()
}
