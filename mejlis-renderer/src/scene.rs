use serde::{Deserialize, Serialize};

use mejlis_core::{BBox, Point, Rect, SideKey};

use crate::palette::Color;

/// Heading of the layout walk. Turning cycles right → down → left → up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    /// Rotate 90 degrees clockwise (screen coordinates).
    pub fn turned(self) -> Self {
        match self {
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
            Direction::Up => Direction::Right,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Right | Direction::Left)
    }

    /// Offset for moving `distance` pixels along this heading.
    pub fn step(self, distance: f64) -> (f64, f64) {
        match self {
            Direction::Right => (distance, 0.0),
            Direction::Down => (0.0, distance),
            Direction::Left => (-distance, 0.0),
            Direction::Up => (0.0, -distance),
        }
    }
}

/// What a drawn piece stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PieceKind {
    Segment { side: SideKey, index: usize },
    /// Corner block drawn at the start (`leading`) or end of a side.
    Corner { side: SideKey, leading: bool },
}

/// One drawable rectangle of the floor plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenePiece {
    pub kind: PieceKind,
    /// Length in units (what the label shows).
    pub length: u32,
    pub rect: Rect,
    pub direction: Direction,
    pub fill: Color,
    pub label: String,
}

impl ScenePiece {
    pub fn is_corner(&self) -> bool {
        matches!(self.kind, PieceKind::Corner { .. })
    }
}

/// Result of one render pass: pieces in walk order plus their extent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub pieces: Vec<ScenePiece>,
    /// Running bounds of the walk, starting at the origin.
    pub bounds: BBox,
    /// Padding applied around `bounds` for the view box.
    pub margin: f64,
}

impl Scene {
    pub fn empty(origin: Point, margin: f64) -> Self {
        Self {
            pieces: Vec::new(),
            bounds: BBox::at(origin),
            margin,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Bounds padded by the margin: the exported drawing area.
    pub fn view_box(&self) -> BBox {
        self.bounds.padded(self.margin)
    }

    /// Tight bounds of the drawn pieces only (ignores the walk origin).
    pub fn content_bounds(&self) -> Option<BBox> {
        let (first, rest) = self.pieces.split_first()?;
        Some(
            rest.iter()
                .fold(first.rect.bbox(), |acc, p| acc.union(&p.rect.bbox())),
        )
    }

    pub fn segments(&self) -> impl Iterator<Item = &ScenePiece> {
        self.pieces.iter().filter(|p| !p.is_corner())
    }

    pub fn corners(&self) -> impl Iterator<Item = &ScenePiece> {
        self.pieces.iter().filter(|p| p.is_corner())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
