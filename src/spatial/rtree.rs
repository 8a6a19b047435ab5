//! R-tree over the node rectangles of a computed layout.
//!
//! Provides O(log n) queries for:
//! - Point hit testing (which person was tapped)
//! - Nearest node (centering on a person)
//! - Rectangle intersection (viewport culling)

use rstar::{AABB, Envelope, PointDistance, RTree, RTreeObject};

use crate::graph::PersonId;
use crate::layout::FamilyLayout;

/// A node rectangle in the spatial index.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRect {
    /// Position of the node in [`FamilyLayout::nodes`].
    pub slot: usize,
    pub id: PersonId,
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl RTreeObject for NodeRect {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

impl PointDistance for NodeRect {
    /// Zero inside the rectangle, squared distance to its edge outside.
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        self.envelope().distance_2(point)
    }

    fn contains_point(&self, point: &[f32; 2]) -> bool {
        self.envelope().contains_point(point)
    }
}

/// Spatial index for layout nodes.
pub struct SpatialIndex {
    tree: RTree<NodeRect>,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk-load the node rectangles of a layout.
    pub fn from_layout(layout: &FamilyLayout) -> Self {
        let mut index = Self::new();
        index.rebuild(layout);
        index
    }

    /// Replace the contents with the node rectangles of `layout`.
    pub fn rebuild(&mut self, layout: &FamilyLayout) {
        let rects: Vec<NodeRect> = layout
            .nodes
            .iter()
            .enumerate()
            .map(|(slot, n)| NodeRect {
                slot,
                id: n.person_id.clone(),
                min: [n.x, n.y],
                max: [n.x + n.width, n.y + n.height],
            })
            .collect();
        self.tree = RTree::bulk_load(rects);
    }

    /// The node whose rectangle contains the point.
    ///
    /// Nodes never overlap in a valid layout; if they touch, the one earlier
    /// in node order wins.
    pub fn node_at(&self, x: f32, y: f32) -> Option<&NodeRect> {
        let probe = AABB::from_point([x, y]);
        self.tree
            .locate_in_envelope_intersecting(&probe)
            .min_by_key(|rect| rect.slot)
    }

    /// The node closest to the point (distance zero when inside one).
    pub fn nearest(&self, x: f32, y: f32) -> Option<&NodeRect> {
        self.tree.nearest_neighbor(&[x, y])
    }

    /// Every node intersecting the rectangle, in node order.
    pub fn nodes_in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<&NodeRect> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        let mut hits: Vec<&NodeRect> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .collect();
        hits.sort_by_key(|rect| rect.slot);
        hits
    }

    /// Clear all nodes from the index.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

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
    use crate::graph::Person;
    use crate::layout::{FamilyTreeLayout, LayoutConfig};

    /// Parent `p` over children `a` and `b`, 100x50 nodes, padding 10.
    fn layout() -> FamilyLayout {
        let persons = vec![
            Person::new("p").with_children(["a", "b"]),
            Person::new("a"),
            Person::new("b"),
        ];
        let config = LayoutConfig {
            node_width: 100.0,
            node_height: 50.0,
            couple_gap: 10.0,
            unit_gap: 20.0,
            level_gap: 50.0,
            padding: 10.0,
        };
        FamilyTreeLayout::new(config).compute(&persons, &[], "p")
    }

    fn ids(rects: &[&NodeRect]) -> Vec<String> {
        rects.iter().map(|r| r.id.to_string()).collect()
    }

    #[test]
    fn test_node_at() {
        let layout = layout();
        let index = SpatialIndex::from_layout(&layout);
        assert_eq!(index.len(), 3);

        let a = layout.node("a").unwrap();
        let hit = index.node_at(a.x + 1.0, a.y + 1.0).unwrap();
        assert_eq!(hit.id.as_str(), "a");
        assert_eq!(layout.nodes[hit.slot].person_id.as_str(), "a");

        // Between the two rows.
        assert!(index.node_at(a.x + 1.0, a.y - 10.0).is_none());
    }

    #[test]
    fn test_nearest() {
        let layout = layout();
        let index = SpatialIndex::from_layout(&layout);
        let b = layout.node("b").unwrap();

        let hit = index.nearest(b.x + b.width + 500.0, b.y).unwrap();
        assert_eq!(hit.id.as_str(), "b");
    }

    #[test]
    fn test_nodes_in_rect() {
        let layout = layout();
        let index = SpatialIndex::from_layout(&layout);
        let p = layout.node("p").unwrap();

        // Only the parent row.
        let top = index.nodes_in_rect(0.0, 0.0, layout.width, p.y + p.height);
        assert_eq!(ids(&top), vec!["p"]);

        let all = index.nodes_in_rect(0.0, 0.0, layout.width, layout.height);
        assert_eq!(ids(&all), vec!["p", "a", "b"]);
    }

    #[test]
    fn test_rect_point_distance() {
        let rect = NodeRect {
            slot: 0,
            id: PersonId::from("r"),
            min: [10.0, 10.0],
            max: [30.0, 20.0],
        };
        assert!(rect.contains_point(&[10.0, 20.0]));
        assert!(rect.contains_point(&[15.0, 15.0]));
        assert!(!rect.contains_point(&[31.0, 15.0]));

        assert_eq!(rect.distance_2(&[15.0, 15.0]), 0.0);
        assert_eq!(rect.distance_2(&[33.0, 24.0]), 25.0);
    }

    #[test]
    fn test_clear() {
        let mut index = SpatialIndex::from_layout(&layout());
        index.clear();
        assert!(index.is_empty());
        assert!(index.nearest(0.0, 0.0).is_none());
    }
}
