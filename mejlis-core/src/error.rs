use thiserror::Error;

use crate::side::SideKey;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Room size must be positive")]
    ZeroRoomSize,

    #[error("Room size {size}m is smaller than the {deduction}m corner deduction")]
    RoomTooSmall { size: u32, deduction: u32 },

    #[error("Side {0} does not exist")]
    UnknownSide(SideKey),

    #[error("Side index {0} is out of range")]
    SideIndexOutOfRange(usize),

    #[error("Invalid side key '{0}', expected 'side<N>' with N >= 1")]
    InvalidSideKey(String),

    #[error("Segment length {0}m is outside the allowed 1-3m range")]
    SegmentOutOfRange(u32),

    #[error("Segments on {side} would sum to {sum}m, exceeding the side length of {length}m")]
    SideOverflow { side: SideKey, sum: u32, length: u32 },

    #[error("Side {side} is already fully allocated ({length}m)")]
    SideFull { side: SideKey, length: u32 },

    #[error("Segment {index} does not exist on {side}")]
    SegmentIndexOutOfRange { side: SideKey, index: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
