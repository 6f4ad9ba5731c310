//! Generational family tree layout.
//!
//! This module turns a flat member list into a `TreeLayout`: a generation per
//! member, a collision-free position per member, and the edges a renderer
//! needs. The whole pipeline is a pure function of its input; every map and
//! set is rebuilt per call.
//!
//! # Pipeline
//!
//! 1. **Relation graph** (`graph::FamilyGraph`): parent → children and
//!    spouse adjacency.
//! 2. **Generations** (`generation`): BFS depth from parentless roots.
//! 3. **Spousal units** (`units`): union-find over spouse links, unit depth
//!    reconciliation, longest-path depth over the unit graph.
//! 4. **Subtree widths** (`width`): horizontal space per unit and descendants.
//! 5. **Horizontal positions** (`position`): top-down sibling blocks, then
//!    bottom-up re-centering, each followed by a collision sweep.
//! 6. **Member placement** (`placement`): unit centers → member positions.
//! 7. **Edges** (`edges`): parent, joint-parent and spouse edges.

pub mod edges;
pub mod generation;
pub mod placement;
pub mod position;
pub mod units;
pub mod width;

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::graph::{FamilyGraph, Member};

use generation::assign_generations;
use units::UnitGraph;

/// Spacing constants for the family tree layout, in abstract layout units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Width of one member box.
    pub node_width: f32,
    /// Height of one member box. Only used for bounds and hit testing.
    pub node_height: f32,
    /// Horizontal distance between adjacent members of one spousal unit.
    /// Must be at least `node_width`.
    pub member_gap: f32,
    /// Minimum gap between adjacent subtree footprints.
    pub unit_gap: f32,
    /// Vertical distance between generations.
    pub level_height: f32,
    /// Y coordinate of the first generation.
    pub y_offset: f32,
    /// Smallest x any member may end up at.
    pub min_left_margin: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 120.0,
            node_height: 60.0,
            member_gap: 150.0,
            unit_gap: 40.0,
            level_height: 160.0,
            y_offset: 40.0,
            min_left_margin: 20.0,
        }
    }
}

impl LayoutConfig {
    /// Check that every constant is finite and the spacing cannot produce
    /// overlapping member boxes.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let positive = [
            ("nodeWidth", self.node_width),
            ("levelHeight", self.level_height),
        ];
        let non_negative = [
            ("nodeHeight", self.node_height),
            ("memberGap", self.member_gap),
            ("unitGap", self.unit_gap),
        ];
        let finite = [
            ("yOffset", self.y_offset),
            ("minLeftMargin", self.min_left_margin),
        ];

        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(LayoutError::InvalidConfig { field, value });
            }
        }
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::InvalidConfig { field, value });
            }
        }
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(LayoutError::InvalidConfig { field, value });
            }
        }
        if self.member_gap < self.node_width {
            return Err(LayoutError::MemberGapTooSmall {
                member_gap: self.member_gap,
                node_width: self.node_width,
            });
        }
        Ok(())
    }

    /// Y coordinate of a generation.
    #[inline]
    pub fn generation_y(&self, depth: u32) -> f32 {
        depth as f32 * self.level_height + self.y_offset
    }
}

/// Top-left corner of a member box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A drawable edge.
///
/// Parent edges run `from` parent `to` child. A joint edge carries the second
/// parent in `parent2`. Spouse edges hold the pair with `from < to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEdge {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_joint: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent2: Option<String>,
}

impl LayoutEdge {
    /// A plain edge between two members.
    pub fn single(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            is_joint: false,
            parent2: None,
        }
    }

    /// A joint parent edge: `parent1` and `parent2` share `child`.
    pub fn joint(
        parent1: impl Into<String>,
        child: impl Into<String>,
        parent2: impl Into<String>,
    ) -> Self {
        Self {
            from: parent1.into(),
            to: child.into(),
            is_joint: true,
            parent2: Some(parent2.into()),
        }
    }
}

/// Axis-aligned bounding box of a layout, including node dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    #[inline]
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

/// Result of a layout call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeLayout {
    /// Member ids per generation, left to right.
    pub layers: Vec<Vec<String>>,
    /// One position per input member id.
    pub positions: BTreeMap<String, Position>,
    /// Parent → child edges, joint edges included.
    pub edges: Vec<LayoutEdge>,
    /// One edge per spouse/partner pair.
    pub spouse_edges: Vec<LayoutEdge>,
}

impl TreeLayout {
    /// Whether the layout has no members.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position of a member.
    pub fn position(&self, id: &str) -> Option<Position> {
        self.positions.get(id).copied()
    }

    /// Bounding box of all member boxes, or None for an empty layout.
    pub fn bounds(&self, config: &LayoutConfig) -> Option<Bounds> {
        let mut iter = self.positions.values();
        let first = iter.next()?;
        let mut bounds = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in iter {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.max_y = bounds.max_y.max(p.y);
        }
        bounds.max_x += config.node_width;
        bounds.max_y += config.node_height;
        Some(bounds)
    }
}

/// Lay out a family tree with the default spacing.
///
/// # Arguments
///
/// * `members` - The member set. Never mutated. May contain dangling,
///   one-sided or cyclic relations.
/// * `viewport_width` - Fallback centering hint for the top generation.
///   Non-finite or negative values are ignored.
/// * `focus_id` - Member to list first among the roots, if it is one.
pub fn compute_layout(
    members: &[Member],
    viewport_width: f32,
    focus_id: Option<&str>,
) -> TreeLayout {
    run_pipeline(members, viewport_width, focus_id, &LayoutConfig::default())
}

/// Lay out a family tree with custom spacing.
///
/// Only the config can be rejected; relation data never causes an error.
pub fn compute_layout_with_config(
    members: &[Member],
    viewport_width: f32,
    focus_id: Option<&str>,
    config: &LayoutConfig,
) -> Result<TreeLayout, LayoutError> {
    config.validate()?;
    Ok(run_pipeline(members, viewport_width, focus_id, config))
}

fn run_pipeline(
    members: &[Member],
    viewport_width: f32,
    focus_id: Option<&str>,
    config: &LayoutConfig,
) -> TreeLayout {
    if members.is_empty() {
        return TreeLayout::default();
    }

    let viewport_width = if viewport_width.is_finite() && viewport_width > 0.0 {
        viewport_width
    } else {
        0.0
    };

    let graph = FamilyGraph::build(members);
    let focus = focus_id.and_then(|id| graph.index_of(id));
    let generations = assign_generations(&graph, focus);
    let units = UnitGraph::resolve(&graph, &generations);
    let widths = width::subtree_widths(&units, config);
    let centers = position::solve_centers(&units, &widths, config, viewport_width);
    let placed = placement::place_members(&graph, &generations, &units, &centers, config);
    let (edges, spouse_edges) = edges::synthesize_edges(&graph);

    debug!(
        "Laid out {} members in {} units over {} generations ({} edges, {} spouse edges)",
        graph.len(),
        units.len(),
        placed.layers.len(),
        edges.len(),
        spouse_edges.len()
    );

    TreeLayout {
        layers: placed.layers,
        positions: placed.positions,
        edges,
        spouse_edges,
    }
}
