//! Walks the sides of a room plan and lays every segment out as a
//! rectangle, turning 90 degrees between sides and inserting corner
//! blocks where the shape has joints.
//!
//! The walk does not close the outline: the last side ends wherever the
//! cursor stops.

use mejlis_core::{BBox, Point, Rect, RoomPlan, RoomShape, SideKey, Segments};

use crate::palette::Color;
use crate::scene::{Direction, PieceKind, Scene, ScenePiece};
use crate::settings::RenderSettings;

/// Lay out the plan's current segments.
pub fn layout_plan(plan: &RoomPlan, settings: &RenderSettings) -> Scene {
    layout(plan.shape(), plan.segments(), settings)
}

/// Lay out `segments` for `shape`. Sides are visited in key order.
pub fn layout(shape: RoomShape, segments: &Segments, settings: &RenderSettings) -> Scene {
    let mut walker = Walker::new(settings);

    for (side_index, (&side, lengths)) in segments.iter().enumerate() {
        if side_index > 0 && shape.has_corner_after(side_index - 1) {
            walker.place_corner(side, true);
        }

        for (segment_index, &length) in lengths.iter().enumerate() {
            let fill = settings.segment_color(side_index, segment_index);
            walker.place(
                PieceKind::Segment {
                    side,
                    index: segment_index,
                },
                length,
                fill,
            );
        }

        if shape.has_corner_after(side_index) {
            walker.place_corner(side, false);
        }

        if shape.turns() {
            walker.turn();
        }
    }

    log::debug!(
        "Laid out {} pieces for {} shape, bounds {:?}",
        walker.pieces.len(),
        shape,
        walker.bounds
    );
    walker.finish()
}

/// Cursor state carried along the walk.
struct Walker<'a> {
    settings: &'a RenderSettings,
    direction: Direction,
    cursor: Point,
    bounds: BBox,
    pieces: Vec<ScenePiece>,
}

impl<'a> Walker<'a> {
    fn new(settings: &'a RenderSettings) -> Self {
        Self {
            settings,
            direction: Direction::Right,
            cursor: settings.origin,
            bounds: BBox::at(settings.origin),
            pieces: Vec::new(),
        }
    }

    fn place_corner(&mut self, side: SideKey, leading: bool) {
        self.place(
            PieceKind::Corner { side, leading },
            self.settings.corner_length,
            self.settings.corner_color,
        );
    }

    /// Emit a piece at the cursor, then advance past it.
    fn place(&mut self, kind: PieceKind, length: u32, fill: Color) {
        let px = f64::from(length) * self.settings.scale;
        let thickness = self.settings.thickness;
        let (width, height) = if self.direction.is_horizontal() {
            (px, thickness)
        } else {
            (thickness, px)
        };

        // Pieces heading left/up extend backwards from the cursor.
        let x = match self.direction {
            Direction::Left => self.cursor.x - px,
            _ => self.cursor.x,
        };
        let y = match self.direction {
            Direction::Up => self.cursor.y - px,
            _ => self.cursor.y,
        };

        let rect = Rect::new(x, y, width, height);
        let bbox = rect.bbox();
        self.bounds.include_point(&bbox.min);
        self.bounds.include_point(&bbox.max);

        self.pieces.push(ScenePiece {
            kind,
            length,
            rect,
            direction: self.direction,
            fill,
            label: format!("{length}m"),
        });
        self.advance(px + self.settings.spacing);
    }

    fn advance(&mut self, distance: f64) {
        let (dx, dy) = self.direction.step(distance);
        self.cursor = self.cursor.translate(dx, dy);
    }

    fn turn(&mut self) {
        self.direction = self.direction.turned();
    }

    fn finish(self) -> Scene {
        Scene {
            pieces: self.pieces,
            bounds: self.bounds,
            margin: self.settings.margin,
        }
    }
}
