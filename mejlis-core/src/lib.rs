//! # Mejlis Core
//!
//! Room-shape segmentation engine for Mejlis seating orders: derives the
//! per-side run lengths from a room shape and total size, manages the
//! fabrication segments (1-3 units each) of every side, validates that
//! they reconcile, and records edits for undo/redo.
//!
//! The order module maps the finished configuration into the backend's
//! order payload.

pub mod commands;
pub mod error;
pub mod geometry;
pub mod order;
pub mod plan;
pub mod shape;
pub mod side;

pub use error::PlanError;
pub use geometry::{BBox, Point, Rect};
pub use order::{OrderForm, OrderPayload};
pub use plan::RoomPlan;
pub use shape::{default_segments, derive_sides, RoomShape};
pub use side::{SideKey, SideSummary, Segments, MAX_SEGMENT, MIN_SEGMENT};
