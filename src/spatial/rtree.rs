//! R-tree based spatial index using the rstar crate.
//!
//! Indexes bubbles as disks and provides:
//! - Point hit testing (which bubble is under the cursor)
//! - Nearest bubble (distance to the disk edge)
//! - Rectangle intersection

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::chart::{Bubble, BubbleId};

/// A bubble disk in the spatial index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BubbleDisk {
    /// Position of the bubble in the chart sequence.
    pub id: BubbleId,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl BubbleDisk {
    pub fn new(id: BubbleId, x: f64, y: f64, radius: f64) -> Self {
        Self { id, x, y, radius }
    }
}

impl RTreeObject for BubbleDisk {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.x - self.radius, self.y - self.radius],
            [self.x + self.radius, self.y + self.radius],
        )
    }
}

impl PointDistance for BubbleDisk {
    /// Squared distance from the point to the disk (zero inside it).
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        let outside = ((dx * dx + dy * dy).sqrt() - self.radius).max(0.0);
        outside * outside
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

/// Spatial index over one snapshot of bubbles.
///
/// Uses an R*-tree; rebuild it after positions change.
#[derive(Debug)]
pub struct SpatialIndex {
    tree: RTree<BubbleDisk>,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Build an index from bubbles in sequence order.
    pub fn from_bubbles(bubbles: &[Bubble]) -> Self {
        let mut index = Self::new();
        index.rebuild(bubbles);
        index
    }

    /// Replace the index contents with the given bubbles.
    ///
    /// Bulk loading is faster than incremental inserts.
    pub fn rebuild(&mut self, bubbles: &[Bubble]) {
        let disks: Vec<_> = bubbles
            .iter()
            .enumerate()
            .map(|(i, b)| BubbleDisk::new(BubbleId(i as u32), b.x(), b.y(), b.radius()))
            .collect();

        self.tree = RTree::bulk_load(disks);
    }

    /// Find the bubble drawn on top at a point.
    ///
    /// Bubbles are drawn in sequence order (largest first), so among the
    /// disks containing the point the one with the highest id wins.
    pub fn bubble_at(&self, x: f64, y: f64) -> Option<BubbleId> {
        self.tree
            .locate_all_at_point(&[x, y])
            .map(|disk| disk.id)
            .max()
    }

    /// Find the bubble whose edge is closest to a point.
    pub fn nearest(&self, x: f64, y: f64) -> Option<BubbleId> {
        self.tree.nearest_neighbor(&[x, y]).map(|disk| disk.id)
    }

    /// Find the nearest bubble whose edge is within `max_distance`.
    pub fn nearest_within(&self, x: f64, y: f64, max_distance: f64) -> Option<BubbleId> {
        let max_distance_sq = max_distance * max_distance;
        self.tree
            .nearest_neighbor(&[x, y])
            .filter(|disk| disk.distance_2(&[x, y]) <= max_distance_sq)
            .map(|disk| disk.id)
    }

    /// Find all bubbles whose bounding boxes intersect a rectangle.
    pub fn in_rect(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<BubbleId> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|disk| disk.id)
            .collect()
    }

    /// Clear all bubbles from the index.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }

    /// Get the number of bubbles in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SpatialIndex {
        SpatialIndex::from_bubbles(&[
            Bubble::new(50.0, 40.0, "Technology", 100.0, 100.0),
            Bubble::new(20.0, 10.0, "Health", 130.0, 100.0),
            Bubble::new(5.0, 5.0, "Travel", 300.0, 300.0),
        ])
    }

    #[test]
    fn test_bubble_at_prefers_topmost() {
        let index = sample();

        // Inside both the big bubble and the small one drawn over it
        assert_eq!(index.bubble_at(132.0, 100.0), Some(BubbleId(1)));
        // Inside only the big bubble
        assert_eq!(index.bubble_at(80.0, 100.0), Some(BubbleId(0)));
        // Empty space
        assert_eq!(index.bubble_at(200.0, 200.0), None);
    }

    #[test]
    fn test_nearest_uses_edge_distance() {
        let index = sample();
        // Closer to the big bubble's edge (10 away) than the small bubble's center
        assert_eq!(index.nearest(100.0, 150.0), Some(BubbleId(0)));
        assert_eq!(index.nearest(310.0, 300.0), Some(BubbleId(2)));
    }

    #[test]
    fn test_nearest_within() {
        let index = sample();
        assert_eq!(index.nearest_within(300.0, 310.0, 6.0), Some(BubbleId(2)));
        assert_eq!(index.nearest_within(300.0, 320.0, 6.0), None);
    }

    #[test]
    fn test_in_rect() {
        let index = sample();
        let found = index.in_rect(0.0, 0.0, 150.0, 150.0);
        assert_eq!(found.len(), 2);
        assert!(found.contains(&BubbleId(0)));
        assert!(found.contains(&BubbleId(1)));
    }

    #[test]
    fn test_rebuild_and_clear() {
        let mut index = sample();
        assert_eq!(index.len(), 3);

        index.rebuild(&[Bubble::new(1.0, 2.0, "Health", 0.0, 0.0)]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.bubble_at(0.5, 0.5), Some(BubbleId(0)));

        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.nearest(0.0, 0.0), None);
    }
}
