use rstar::{RTree, RTreeObject, AABB};

use mejlis_core::{BBox, Point};

use crate::scene::{Scene, ScenePiece};

/// An entry in the R-tree, referencing a scene piece by its index.
#[derive(Debug, Clone)]
pub struct SpatialEntry {
    /// Index into `Scene::pieces`.
    pub piece_index: usize,
    pub bbox: BBox,
}

impl RTreeObject for SpatialEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bbox.min.x, self.bbox.min.y],
            [self.bbox.max.x, self.bbox.max.y],
        )
    }
}

/// Hit-testing index over a rendered scene, so a click on the drawing can
/// be mapped back to the segment it shows.
pub struct SceneIndex {
    tree: RTree<SpatialEntry>,
}

impl SceneIndex {
    pub fn build(scene: &Scene) -> Self {
        let entries = scene
            .pieces
            .iter()
            .enumerate()
            .map(|(piece_index, piece)| SpatialEntry {
                piece_index,
                bbox: piece.rect.bbox(),
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Index of the piece under `point`, preferring the earliest drawn.
    /// Points on a piece's border count as inside.
    pub fn piece_at(&self, point: &Point) -> Option<usize> {
        self.tree
            .locate_in_envelope_intersecting(&AABB::from_point([point.x, point.y]))
            .map(|e| e.piece_index)
            .min()
    }

    /// Resolve [`SceneIndex::piece_at`] against the scene it was built from.
    pub fn pick<'s>(&self, scene: &'s Scene, point: &Point) -> Option<&'s ScenePiece> {
        self.piece_at(point).and_then(|i| scene.pieces.get(i))
    }

    /// Indices of all pieces intersecting `area`, in drawing order.
    pub fn pieces_in(&self, area: &BBox) -> Vec<usize> {
        let envelope = AABB::from_corners([area.min.x, area.min.y], [area.max.x, area.max.y]);
        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|e| e.piece_index)
            .collect();
        hits.sort_unstable();
        hits
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::layout_plan;
    use crate::scene::PieceKind;
    use crate::settings::RenderSettings;
    use mejlis_core::{RoomPlan, RoomShape, SideKey};

    #[test]
    fn test_pick_segment() {
        let plan = RoomPlan::new(RoomShape::L, 12).unwrap();
        let scene = layout_plan(&plan, &RenderSettings::default());
        let index = SceneIndex::build(&scene);
        assert_eq!(index.len(), 6);

        // Inside the second segment of side 1 (x 304..454).
        let piece = index.pick(&scene, &Point::new(350.0, 220.0)).unwrap();
        assert_eq!(piece.kind, PieceKind::Segment { side: SideKey::new(1), index: 1 });

        // The gap between pieces hits nothing.
        assert!(index.piece_at(&Point::new(302.0, 220.0)).is_none());
        assert!(index.piece_at(&Point::new(-50.0, -50.0)).is_none());
    }

    #[test]
    fn test_pick_on_piece_border() {
        let plan = RoomPlan::new(RoomShape::L, 12).unwrap();
        let scene = layout_plan(&plan, &RenderSettings::default());
        let index = SceneIndex::build(&scene);

        for (i, piece) in scene.pieces.iter().enumerate() {
            let bbox = piece.rect.bbox();
            assert_eq!(index.piece_at(&bbox.min), Some(i));
            assert_eq!(index.piece_at(&piece.rect.center()), Some(i));
        }
    }

    #[test]
    fn test_area_query() {
        let plan = RoomPlan::new(RoomShape::L, 12).unwrap();
        let scene = layout_plan(&plan, &RenderSettings::default());
        let index = SceneIndex::build(&scene);

        // The vertical run of side 2.
        let area = BBox::new(Point::new(520.0, 250.0), Point::new(530.0, 600.0));
        assert_eq!(index.pieces_in(&area), vec![3, 4, 5]);
        assert!(SceneIndex::build(&Scene::empty(Point::default(), 0.0)).is_empty());
    }
}
