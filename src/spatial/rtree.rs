//! R-tree based member index using the rstar crate.
//!
//! Provides O(log n) queries over laid-out member boxes:
//! - Member under a point
//! - Nearest member to a point
//! - Members intersecting a rectangle

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::layout::{LayoutConfig, TreeLayout};

/// A member's box in layout space.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberBox {
    /// The member identifier.
    pub id: String,
    /// Top-left corner.
    pub min: [f32; 2],
    /// Bottom-right corner.
    pub max: [f32; 2],
}

impl MemberBox {
    /// Create a box from its top-left corner and size.
    pub fn new(id: impl Into<String>, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            id: id.into(),
            min: [x, y],
            max: [x + width, y + height],
        }
    }
}

impl RTreeObject for MemberBox {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

impl PointDistance for MemberBox {
    /// Squared distance from the point to the box; zero inside it.
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = (self.min[0] - point[0]).max(point[0] - self.max[0]).max(0.0);
        let dy = (self.min[1] - point[1]).max(point[1] - self.max[1]).max(0.0);
        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[f32; 2]) -> bool {
        point[0] >= self.min[0]
            && point[0] <= self.max[0]
            && point[1] >= self.min[1]
            && point[1] <= self.max[1]
    }
}

/// Spatial index over the member boxes of one layout.
///
/// Uses an R*-tree for efficient spatial queries.
pub struct MemberIndex {
    tree: RTree<MemberBox>,
}

impl MemberIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk load the boxes of every positioned member.
    pub fn from_layout(layout: &TreeLayout, config: &LayoutConfig) -> Self {
        let boxes: Vec<_> = layout
            .positions
            .iter()
            .map(|(id, p)| MemberBox::new(id.as_str(), p.x, p.y, config.node_width, config.node_height))
            .collect();
        Self {
            tree: RTree::bulk_load(boxes),
        }
    }

    /// Member whose box contains the point.
    pub fn member_at(&self, x: f32, y: f32) -> Option<&str> {
        self.tree
            .locate_at_point(&[x, y])
            .map(|b| b.id.as_str())
    }

    /// Member whose box is closest to the point.
    pub fn nearest(&self, x: f32, y: f32) -> Option<&str> {
        self.tree
            .nearest_neighbor(&[x, y])
            .map(|b| b.id.as_str())
    }

    /// Closest member, if its box is within `max_distance` of the point.
    pub fn nearest_within(&self, x: f32, y: f32, max_distance: f32) -> Option<&str> {
        let max_distance_sq = max_distance * max_distance;
        self.tree
            .nearest_neighbor(&[x, y])
            .filter(|b| b.distance_2(&[x, y]) <= max_distance_sq)
            .map(|b| b.id.as_str())
    }

    /// Members whose boxes intersect the rectangle, sorted by id.
    pub fn in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<&str> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        let mut ids: Vec<&str> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|b| b.id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Number of members in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for MemberIndex {
    fn default() -> Self {
        Self::new()
    }
}
