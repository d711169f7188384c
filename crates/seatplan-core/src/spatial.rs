use rstar::{RTree, RTreeObject, AABB};

use crate::entities::AreaId;
use crate::geometry::{BBox, Point};
use crate::scene::Scene;

/// An entry in the R-tree, referencing an area by its position in the scene.
#[derive(Debug, Clone)]
pub struct AreaEntry {
    /// Index into the scene's area list; higher means drawn on top.
    pub order: usize,
    pub area_id: AreaId,
    pub bbox: BBox,
}

impl RTreeObject for AreaEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bbox.min.x, self.bbox.min.y],
            [self.bbox.max.x, self.bbox.max.y],
        )
    }
}

/// Bounding-box index over a scene's areas for pointer hit-testing and
/// viewport culling. Rebuild it whenever the scene snapshot changes.
#[derive(Debug)]
pub struct AreaIndex {
    tree: RTree<AreaEntry>,
}

impl AreaIndex {
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    pub fn build(scene: &Scene) -> Self {
        let entries: Vec<AreaEntry> = scene
            .areas()
            .enumerate()
            .filter_map(|(order, area)| {
                area.bbox().map(|bbox| AreaEntry {
                    order,
                    area_id: area.id.clone(),
                    bbox,
                })
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Areas whose bounding box contains `point`, topmost first.
    pub fn candidates_at(&self, point: &Point) -> Vec<&AreaEntry> {
        let mut hits: Vec<&AreaEntry> = self
            .tree
            .locate_in_envelope_intersecting(&AABB::from_point([point.x, point.y]))
            .collect();
        hits.sort_by(|a, b| b.order.cmp(&a.order));
        hits
    }

    /// The topmost area whose ring contains `point`.
    pub fn area_at<'a>(&self, scene: &'a Scene, point: &Point) -> Option<&'a AreaId> {
        self.candidates_at(point).into_iter().find_map(|entry| {
            scene
                .area(&entry.area_id)
                .filter(|area| area.contains(point))
                .map(|area| &area.id)
        })
    }

    /// Areas whose bounding box intersects `view`, in draw order.
    pub fn query_viewport(&self, view: &BBox) -> Vec<&AreaEntry> {
        let envelope = AABB::from_corners([view.min.x, view.min.y], [view.max.x, view.max.y]);
        let mut hits: Vec<&AreaEntry> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .collect();
        hits.sort_by_key(|e| e.order);
        hits
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for AreaIndex {
    fn default() -> Self {
        Self::new()
    }
}
