//! Subtree width computation.
//!
//! A unit needs room for its own members side by side, and for all of its
//! layout descendants. Only child units strictly deeper than the parent
//! count, so back-edges left over from parent/child cycles never feed a
//! unit's width into itself.

use super::LayoutConfig;
use super::units::{SpousalUnit, UnitGraph};

/// Width of a unit's own members laid out side by side.
#[inline]
pub fn unit_width(unit: &SpousalUnit, config: &LayoutConfig) -> f32 {
    config.node_width + unit.members.len().saturating_sub(1) as f32 * config.member_gap
}

/// Subtree width of every unit.
///
/// Units are visited deepest generation first, so each unit's children are
/// always finished before the unit itself. This is a post-order over the unit
/// DAG without recursion: pathological inputs cannot exhaust the stack.
pub fn subtree_widths(units: &UnitGraph, config: &LayoutConfig) -> Vec<f32> {
    let mut order: Vec<usize> = (0..units.len()).collect();
    order.sort_by_key(|&u| std::cmp::Reverse(units.unit(u).depth));

    // A child not yet computed would mean a cycle; it counts as a single node.
    let mut widths: Vec<Option<f32>> = vec![None; units.len()];
    for unit in order {
        let own = unit_width(units.unit(unit), config);
        let children: f32 = units
            .layout_children(unit)
            .into_iter()
            .map(|child| widths[child].unwrap_or(config.node_width) + config.unit_gap)
            .sum();
        widths[unit] = Some(own.max(children));
    }

    widths
        .into_iter()
        .map(|w| w.unwrap_or(config.node_width))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{FamilyGraph, Member, RelationKind};
    use crate::layout::generation::assign_generations;

    fn widths_for<'a>(
        members: &'a [Member],
        config: &LayoutConfig,
    ) -> (FamilyGraph<'a>, UnitGraph, Vec<f32>) {
        let family = FamilyGraph::build(members);
        let generations = assign_generations(&family, None);
        let units = UnitGraph::resolve(&family, &generations);
        let widths = subtree_widths(&units, config);
        (family, units, widths)
    }

    fn config() -> LayoutConfig {
        LayoutConfig {
            node_width: 100.0,
            member_gap: 120.0,
            unit_gap: 20.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_single_member_unit() {
        let config = config();
        let members = vec![Member::new("a", "A")];
        let (_, _, widths) = widths_for(&members, &config);
        assert_eq!(widths, vec![100.0]);
    }

    #[test]
    fn test_couple_unit_width() {
        let config = config();
        let members = vec![
            Member::new("a", "A").with_relation(RelationKind::Spouse, "b"),
            Member::new("b", "B"),
        ];
        let (_, units, widths) = widths_for(&members, &config);
        assert_eq!(unit_width(units.unit(0), &config), 220.0);
        assert_eq!(widths, vec![220.0]);
    }

    #[test]
    fn test_children_widen_parent() {
        let config = config();
        let members = vec![
            Member::new("p", "P")
                .with_relation(RelationKind::Child, "c1")
                .with_relation(RelationKind::Child, "c2")
                .with_relation(RelationKind::Child, "c3"),
            Member::new("c1", "C1"),
            Member::new("c2", "C2"),
            Member::new("c3", "C3"),
        ];
        let (family, units, widths) = widths_for(&members, &config);
        let parent = units.unit_of(family.index_of("p").expect("p exists"));

        // Three leaves, each node width plus one unit gap.
        assert_eq!(widths[parent], 3.0 * (100.0 + 20.0));
    }

    #[test]
    fn test_wide_couple_over_single_child() {
        let config = config();
        let members = vec![
            Member::new("a", "A")
                .with_relation(RelationKind::Spouse, "b")
                .with_relation(RelationKind::Child, "c"),
            Member::new("b", "B"),
            Member::new("c", "C"),
        ];
        let (_, units, widths) = widths_for(&members, &config);
        assert_eq!(units.len(), 2);
        assert_eq!(widths[0], 220.0);
        assert_eq!(widths[1], 100.0);
    }

    #[test]
    fn test_cycle_has_finite_widths() {
        let config = config();
        let members = vec![
            Member::new("a", "A").with_relation(RelationKind::Child, "b"),
            Member::new("b", "B").with_relation(RelationKind::Child, "a"),
        ];
        let (_, _, widths) = widths_for(&members, &config);
        assert!(widths.iter().all(|w| w.is_finite()));
        assert_eq!(widths[1], 100.0);
        assert_eq!(widths[0], 120.0);
    }
}
