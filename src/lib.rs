//! Family Tree Layout - WASM Module
//!
//! This module computes generational layouts for family trees: one
//! generation and one collision-free position per member, plus the parent,
//! joint-parent and spouse edges a renderer draws. It is compiled to
//! WebAssembly and exposes a JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `graph`: Member/relation model and the relation graph builder
//! - `layout`: Generation, spousal unit, width, position and edge stages
//! - `spatial`: R-tree hit testing over laid-out member boxes
//! - `error`: Config and interop errors (relation data never errors)
//! - `logging`: `log` facade sink for the browser console

use js_sys::Float32Array;
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod error;
pub mod graph;
pub mod layout;
pub mod logging;
pub mod spatial;

pub use error::LayoutError;
pub use graph::{FamilyGraph, Member, Relation, RelationKind};
pub use layout::{
    Bounds, LayoutConfig, LayoutEdge, Position, TreeLayout, compute_layout,
    compute_layout_with_config,
};
pub use spatial::MemberIndex;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
}

/// Route debug-level layout logging to the console.
#[wasm_bindgen(js_name = setVerboseLogging)]
pub fn set_verbose_logging(verbose: bool) {
    log::set_max_level(if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    });
}

/// Serialize to plain JS objects (maps become objects keyed by member id).
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, LayoutError> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    Ok(value.serialize(&serializer)?)
}

/// Compute a family tree layout in one call.
///
/// # Arguments
///
/// * `members` - Array of `{id, name, dob?, email?, photo?, relations: [{type, targetId}]}`
/// * `viewport_width` - Fallback centering hint for the top generation
/// * `focus_id` - Member to list first among roots, if it is one
///
/// Returns `{layers, positions, edges, spouseEdges}`.
#[wasm_bindgen(js_name = computeTreeLayout)]
pub fn compute_tree_layout(
    members: JsValue,
    viewport_width: f32,
    focus_id: Option<String>,
) -> Result<JsValue, JsError> {
    let members: Vec<Member> = serde_wasm_bindgen::from_value(members).map_err(LayoutError::from)?;
    let layout = compute_layout(&members, viewport_width, focus_id.as_deref());
    Ok(to_js(&layout)?)
}

/// A computed layout with hit testing.
///
/// The layout is computed once in the constructor. Re-create the object
/// after the member set changes; nothing carries over between layouts.
#[wasm_bindgen]
pub struct FamilyTreeLayoutWasm {
    layout: TreeLayout,
    config: LayoutConfig,
    index: MemberIndex,
}

#[wasm_bindgen]
impl FamilyTreeLayoutWasm {
    /// Lay out `members` with the default spacing.
    #[wasm_bindgen(constructor)]
    pub fn new(
        members: JsValue,
        viewport_width: f32,
        focus_id: Option<String>,
    ) -> Result<FamilyTreeLayoutWasm, JsError> {
        let members: Vec<Member> =
            serde_wasm_bindgen::from_value(members).map_err(LayoutError::from)?;
        Ok(Self::build(
            &members,
            viewport_width,
            focus_id.as_deref(),
            LayoutConfig::default(),
        )?)
    }

    /// Lay out `members` with a partial config object; missing fields keep
    /// their defaults.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(
        members: JsValue,
        viewport_width: f32,
        focus_id: Option<String>,
        config: JsValue,
    ) -> Result<FamilyTreeLayoutWasm, JsError> {
        let members: Vec<Member> =
            serde_wasm_bindgen::from_value(members).map_err(LayoutError::from)?;
        let config: LayoutConfig = if config.is_undefined() || config.is_null() {
            LayoutConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(LayoutError::from)?
        };
        Ok(Self::build(
            &members,
            viewport_width,
            focus_id.as_deref(),
            config,
        )?)
    }

    // =========================================================================
    // Layout Access
    // =========================================================================

    /// The full layout as `{layers, positions, edges, spouseEdges}`.
    pub fn layout(&self) -> Result<JsValue, JsError> {
        Ok(to_js(&self.layout)?)
    }

    /// The spacing used for this layout.
    pub fn config(&self) -> Result<JsValue, JsError> {
        Ok(to_js(&self.config)?)
    }

    /// Number of generations.
    #[wasm_bindgen(js_name = layerCount)]
    pub fn layer_count(&self) -> usize {
        self.layout.layers.len()
    }

    /// Number of positioned members.
    #[wasm_bindgen(js_name = memberCount)]
    pub fn member_count(&self) -> usize {
        self.layout.positions.len()
    }

    /// Position of one member as `[x, y]`.
    #[wasm_bindgen(js_name = getPosition)]
    pub fn get_position(&self, id: &str) -> Option<Vec<f32>> {
        self.layout.position(id).map(|p| vec![p.x, p.y])
    }

    /// Positions as a Float32Array `[x0, y0, x1, y1, ...]`, members in
    /// layer order (top generation first, left to right).
    #[wasm_bindgen(js_name = positionsFlat)]
    pub fn positions_flat(&self) -> Float32Array {
        Float32Array::from(&self.flat_positions()[..])
    }

    /// Member ids in the same order as `positionsFlat`.
    #[wasm_bindgen(js_name = memberOrder)]
    pub fn member_order(&self) -> Vec<String> {
        self.layout.layers.iter().flatten().cloned().collect()
    }

    /// Get the bounding box of all member boxes.
    ///
    /// Returns [min_x, min_y, max_x, max_y], or None if the layout is empty.
    #[wasm_bindgen(js_name = getBounds)]
    pub fn get_bounds(&self) -> Option<Vec<f32>> {
        self.layout
            .bounds(&self.config)
            .map(|b| vec![b.min_x, b.min_y, b.max_x, b.max_y])
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Member whose box contains the point.
    #[wasm_bindgen(js_name = memberAt)]
    pub fn member_at(&self, x: f32, y: f32) -> Option<String> {
        self.index.member_at(x, y).map(str::to_string)
    }

    /// Closest member to the point, optionally within a maximum distance.
    #[wasm_bindgen(js_name = nearestMember)]
    pub fn nearest_member(&self, x: f32, y: f32, max_distance: Option<f32>) -> Option<String> {
        match max_distance {
            Some(max) => self.index.nearest_within(x, y, max),
            None => self.index.nearest(x, y),
        }
        .map(str::to_string)
    }

    /// Members whose boxes intersect the rectangle, sorted by id.
    #[wasm_bindgen(js_name = membersInRect)]
    pub fn members_in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<String> {
        self.index
            .in_rect(min_x, min_y, max_x, max_y)
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

impl FamilyTreeLayoutWasm {
    /// Validate the config, lay out and index. No JS types involved.
    pub fn build(
        members: &[Member],
        viewport_width: f32,
        focus_id: Option<&str>,
        config: LayoutConfig,
    ) -> Result<Self, LayoutError> {
        let layout = compute_layout_with_config(members, viewport_width, focus_id, &config)?;
        let index = MemberIndex::from_layout(&layout, &config);
        Ok(Self {
            layout,
            config,
            index,
        })
    }

    /// The computed layout.
    pub fn tree_layout(&self) -> &TreeLayout {
        &self.layout
    }

    fn flat_positions(&self) -> Vec<f32> {
        let mut flat = Vec::with_capacity(self.layout.positions.len() * 2);
        for id in self.layout.layers.iter().flatten() {
            if let Some(p) = self.layout.position(id) {
                flat.push(p.x);
                flat.push(p.y);
            }
        }
        flat
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    fn member(id: &str, relations: &[(&str, &str)]) -> Member {
        relations
            .iter()
            .fold(Member::new(id, id.to_uppercase()), |m, &(kind, target)| {
                m.with_relation(RelationKind::from(kind), target)
            })
    }

    fn assert_complete_and_finite(members: &[Member], layout: &TreeLayout) {
        for m in members {
            let p = layout
                .position(&m.id)
                .unwrap_or_else(|| panic!("member {} has no position", m.id));
            assert!(
                p.x.is_finite() && p.y.is_finite(),
                "member {} has non-finite position {p:?}",
                m.id
            );
        }
        let layered: usize = layout.layers.iter().map(Vec::len).sum();
        assert_eq!(layered, layout.positions.len(), "every member is in one layer");
        for edge in layout.edges.iter().chain(&layout.spouse_edges) {
            assert!(layout.positions.contains_key(&edge.from));
            assert!(layout.positions.contains_key(&edge.to));
            if let Some(other) = &edge.parent2 {
                assert!(layout.positions.contains_key(other));
            }
        }
    }

    fn assert_no_overlap(layout: &TreeLayout, config: &LayoutConfig) {
        for layer in &layout.layers {
            let mut xs: Vec<f32> = layer
                .iter()
                .filter_map(|id| layout.position(id))
                .map(|p| p.x)
                .collect();
            xs.sort_by(f32::total_cmp);
            for pair in xs.windows(2) {
                assert!(
                    pair[1] - pair[0] >= config.node_width - 1e-3,
                    "Members overlap in layer {layer:?}: {} and {}",
                    pair[0],
                    pair[1]
                );
            }
        }
    }

    /// A three-generation family with a married-in spouse, a remarriage and
    /// an unrelated member.
    fn sample_family() -> Vec<Member> {
        vec![
            member("grandpa", &[("spouse", "grandma"), ("child", "dad"), ("child", "aunt")]),
            member("grandma", &[("child", "dad"), ("child", "aunt")]),
            member("dad", &[("parent", "grandpa"), ("spouse", "mom")]),
            member("mom", &[("child", "me"), ("child", "sis")]),
            member("aunt", &[("partner", "uncle"), ("child", "cousin")]),
            member("uncle", &[("child", "cousin")]),
            member("me", &[("parent", "dad")]),
            member("sis", &[("parent", "dad"), ("sibling", "me")]),
            member("cousin", &[]),
            member("stranger", &[("other", "me")]),
        ]
    }

    #[test]
    fn test_scenario_married_in_spouse() {
        let members = vec![
            member("A", &[("spouse", "C")]),
            member("C", &[("spouse", "A"), ("child", "D")]),
            member("D", &[("parent", "C")]),
        ];
        let config = LayoutConfig::default();
        let layout = compute_layout(&members, 800.0, None);

        let a = layout.position("A").expect("A placed");
        let c = layout.position("C").expect("C placed");
        let d = layout.position("D").expect("D placed");
        assert_eq!(a.y, c.y, "spouses share a generation");
        assert!((d.y - c.y - config.level_height).abs() < 1e-3);
        assert_eq!(layout.spouse_edges, vec![LayoutEdge::single("A", "C")]);
        assert_eq!(layout.edges, vec![LayoutEdge::single("C", "D")]);
        assert_complete_and_finite(&members, &layout);
    }

    #[test]
    fn test_empty_member_list() {
        let layout = compute_layout(&[], 800.0, None);
        assert_eq!(layout, TreeLayout::default());
    }

    #[test]
    fn test_joint_edge_merge() {
        let members = vec![
            member("A", &[("spouse", "B"), ("child", "C")]),
            member("B", &[("child", "C")]),
            member("C", &[]),
        ];
        let layout = compute_layout(&members, 800.0, None);

        assert_eq!(layout.edges, vec![LayoutEdge::joint("A", "C", "B")]);
        assert_eq!(layout.spouse_edges.len(), 1);
    }

    #[test]
    fn test_two_cycle_is_safe() {
        let members = vec![member("A", &[("child", "B")]), member("B", &[("child", "A")])];
        let layout = compute_layout(&members, 800.0, None);

        assert_complete_and_finite(&members, &layout);
        assert_eq!(layout.positions.len(), 2);
    }

    #[test]
    fn test_descendants_of_a_cycle_stay_below_their_parents() {
        let members = vec![
            member("x", &[("parent", "a")]),
            member("a", &[("child", "b")]),
            member("b", &[("child", "a"), ("child", "y")]),
            member("y", &[("child", "z"), ("spouse", "w")]),
            member("w", &[("child", "z")]),
            member("z", &[]),
        ];
        let config = LayoutConfig::default();
        let layout = compute_layout(&members, 800.0, None);
        assert_complete_and_finite(&members, &layout);
        assert_no_overlap(&layout, &config);

        let on_cycle = |edge: &LayoutEdge| {
            matches!((edge.from.as_str(), edge.to.as_str()), ("a", "b") | ("b", "a"))
        };
        let checked: Vec<&LayoutEdge> = layout.edges.iter().filter(|e| !on_cycle(e)).collect();
        assert_eq!(checked.len(), 3);
        for edge in checked {
            let parents = std::iter::once(&edge.from).chain(edge.parent2.as_ref());
            let child = layout.position(&edge.to).expect("child placed");
            for parent in parents {
                let p = layout.position(parent).expect("parent placed");
                assert!(
                    child.y > p.y,
                    "{} ({}) should be below {} ({})",
                    edge.to,
                    child.y,
                    parent,
                    p.y
                );
            }
        }
    }

    #[test]
    fn test_sample_family_properties() {
        let members = sample_family();
        let config = LayoutConfig::default();
        let layout = compute_layout(&members, 1200.0, None);

        assert_complete_and_finite(&members, &layout);
        assert_no_overlap(&layout, &config);

        // Depth monotonicity along every parent edge.
        for edge in &layout.edges {
            let parent = layout.position(&edge.from).expect("parent placed");
            let child = layout.position(&edge.to).expect("child placed");
            assert!(
                child.y > parent.y,
                "{} should be below {}",
                edge.to,
                edge.from
            );
        }

        // Spouse alignment.
        for edge in &layout.spouse_edges {
            let a = layout.position(&edge.from).expect("spouse placed");
            let b = layout.position(&edge.to).expect("spouse placed");
            assert_eq!(a.y, b.y, "{} and {} share a generation", edge.from, edge.to);
        }

        assert_eq!(layout.layers.len(), 3);
        assert!(layout.edges.contains(&LayoutEdge::joint("grandma", "dad", "grandpa")));
        assert!(layout.edges.contains(&LayoutEdge::joint("aunt", "cousin", "uncle")));
        assert!(layout.edges.contains(&LayoutEdge::joint("dad", "me", "mom")));
        assert_eq!(layout.edges.len(), 5);
    }

    #[test]
    fn test_deterministic_output() {
        let members = sample_family();
        let first = compute_layout(&members, 1200.0, Some("grandpa"));
        let second = compute_layout(&members, 1200.0, Some("grandpa"));

        assert_eq!(first, second);
        for (id, p) in &first.positions {
            let q = second.positions[id];
            assert_eq!(p.x.to_bits(), q.x.to_bits());
            assert_eq!(p.y.to_bits(), q.y.to_bits());
        }
    }

    #[test]
    fn test_input_is_not_mutated() {
        let members = sample_family();
        let before = members.clone();
        let _ = compute_layout(&members, 1200.0, None);
        assert_eq!(members, before);
    }

    #[test]
    fn test_dangling_and_one_sided_relations() {
        let members = vec![
            member("kid", &[("parent", "mum"), ("parent", "ghost")]),
            member("mum", &[("spouse", "nobody")]),
        ];
        let layout = compute_layout(&members, 0.0, None);

        assert_complete_and_finite(&members, &layout);
        assert_eq!(layout.edges, vec![LayoutEdge::single("mum", "kid")]);
        assert!(layout.spouse_edges.is_empty());
        assert!(layout.position("kid").expect("kid").y > layout.position("mum").expect("mum").y);
    }

    #[test]
    fn test_large_generated_family() {
        // 4 generations, every couple has three children who each marry in.
        let mut members = vec![member("root-a", &[("spouse", "root-b")]), member("root-b", &[])];
        let mut couples = vec![("root-a".to_string(), "root-b".to_string())];
        let mut next = 0;
        for _ in 0..3 {
            let mut next_couples = Vec::new();
            for (a, b) in &couples {
                for _ in 0..3 {
                    let child = format!("c{next}");
                    let spouse = format!("s{next}");
                    next += 1;
                    let parent = members.iter_mut().find(|m| &m.id == a).expect("parent exists");
                    parent.relations.push(Relation::new(RelationKind::Child, child.as_str()));
                    members.push(
                        member(&child, &[("parent", b.as_str()), ("spouse", spouse.as_str())]),
                    );
                    members.push(member(&spouse, &[]));
                    next_couples.push((child, spouse));
                }
            }
            couples = next_couples;
        }

        let config = LayoutConfig::default();
        let layout = compute_layout(&members, 0.0, None);
        assert_eq!(layout.positions.len(), members.len());
        assert_eq!(layout.layers.len(), 4);
        assert_complete_and_finite(&members, &layout);
        assert_no_overlap(&layout, &config);
        // Every child links to both parents through one joint edge.
        assert!(layout.edges.iter().all(|e| e.is_joint));
    }

    #[test]
    fn test_wrapper_build_and_queries() {
        let members = sample_family();
        let config = LayoutConfig::default();
        let wrapper = FamilyTreeLayoutWasm::build(&members, 1200.0, None, config.clone())
            .expect("default config is valid");

        assert_eq!(wrapper.member_count(), members.len());
        assert_eq!(wrapper.layer_count(), 3);
        assert_eq!(wrapper.flat_positions().len(), members.len() * 2);
        assert_eq!(wrapper.member_order().len(), members.len());

        let me = wrapper.tree_layout().position("me").expect("me placed");
        let hit = wrapper.member_at(me.x + 1.0, me.y + 1.0);
        assert_eq!(hit.as_deref(), Some("me"));

        let bounds = wrapper.get_bounds().expect("non-empty");
        assert!(bounds[0] >= config.min_left_margin - 1e-3);
        assert!(bounds[2] > bounds[0]);
    }

    #[test]
    fn test_wrapper_rejects_bad_config() {
        let config = LayoutConfig {
            member_gap: 10.0,
            ..Default::default()
        };
        let result = FamilyTreeLayoutWasm::build(&sample_family(), 0.0, None, config);
        assert!(matches!(result, Err(LayoutError::MemberGapTooSmall { .. })));
    }
}
