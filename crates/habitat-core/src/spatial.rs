use rstar::{RTree, RTreeObject, AABB};

use crate::geometry::BBox;
use crate::module::ModuleInstance;

/// An entry in the R-tree spatial index, referencing a module by its index.
#[derive(Debug, Clone)]
pub struct SpatialEntry {
    /// Index into the layout's module vector.
    pub module_index: usize,
    /// Bounding box of the rotated footprint.
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

/// Broad-phase index over the footprints of one floor.
pub struct SpatialIndex {
    tree: RTree<SpatialEntry>,
}

impl SpatialIndex {
    pub fn build(entries: Vec<SpatialEntry>) -> Self {
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Index every module on `floor`.
    pub fn for_floor(modules: &[ModuleInstance], floor: u32) -> Self {
        let entries = modules
            .iter()
            .enumerate()
            .filter(|(_, m)| m.floor == floor)
            .map(|(i, m)| SpatialEntry {
                module_index: i,
                bbox: m.footprint().bbox(),
            })
            .collect();
        Self::build(entries)
    }

    /// All entries whose bounding box intersects `bbox`.
    pub fn query_bbox(&self, bbox: &BBox) -> Vec<&SpatialEntry> {
        let envelope = AABB::from_corners([bbox.min.x, bbox.min.y], [bbox.max.x, bbox.max.y]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .collect()
    }
}

/// Unordered pairs `(i, j)`, `i < j`, of same-floor modules whose oriented
/// footprints overlap.
pub fn overlapping_pairs(modules: &[ModuleInstance]) -> Vec<(usize, usize)> {
    let mut floors: Vec<u32> = modules.iter().map(|m| m.floor).collect();
    floors.sort_unstable();
    floors.dedup();

    let mut pairs = Vec::new();
    for floor in floors {
        let index = SpatialIndex::for_floor(modules, floor);
        for (i, m) in modules.iter().enumerate().filter(|(_, m)| m.floor == floor) {
            let fp = m.footprint();
            for entry in index.query_bbox(&fp.bbox()) {
                let j = entry.module_index;
                if j > i && fp.overlaps(&modules[j].footprint()) {
                    pairs.push((i, j));
                }
            }
        }
    }
    pairs.sort_unstable();
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::geometry::Point;

    fn module_at(x: f64, y: f64, floor: u32) -> ModuleInstance {
        let catalog = Catalog::baseline();
        let mut m = ModuleInstance::new(catalog.lookup("stowage").unwrap(), floor, 2.0);
        m.position = Point::new(x, y);
        m
    }

    #[test]
    fn test_spatial_query() {
        let modules = vec![module_at(0.0, 0.0, 1), module_at(5.0, 5.0, 1), module_at(0.0, 0.0, 2)];
        let index = SpatialIndex::for_floor(&modules, 1);

        let everything = BBox::new(Point::new(-100.0, -100.0), Point::new(100.0, 100.0));
        assert_eq!(index.query_bbox(&everything).len(), 2);

        let window = BBox::new(Point::new(-0.5, -0.5), Point::new(0.5, 0.5));
        let hits = index.query_bbox(&window);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].module_index, 0);
    }

    #[test]
    fn test_overlapping_pairs_respect_floors() {
        let modules = vec![
            module_at(0.0, 0.0, 1),
            module_at(1.0, 0.0, 1),
            module_at(0.5, 0.0, 2),
            // Touches module 1 along an edge only.
            module_at(3.0, 0.0, 1),
        ];
        assert_eq!(overlapping_pairs(&modules), vec![(0, 1)]);
    }
}
