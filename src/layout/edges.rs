//! Edge synthesis.
//!
//! Parent edges come straight from the parent → children adjacency, except
//! where two spouses are both recorded parents of the same child: that pair
//! becomes a single joint edge, and neither parent keeps a plain edge to the
//! child. Spouse edges are emitted once per unordered pair.

use std::collections::HashSet;

use super::LayoutEdge;
use crate::graph::FamilyGraph;

enum DraftEdge {
    Single { parent: usize, child: usize },
    Joint { first: usize, second: usize, child: usize },
}

/// Build parent edges and spouse edges for a family graph.
pub fn synthesize_edges(family: &FamilyGraph) -> (Vec<LayoutEdge>, Vec<LayoutEdge>) {
    (parent_edges(family), spouse_edges(family))
}

/// Parent → child edges with co-parenting spouses merged.
pub fn parent_edges(family: &FamilyGraph) -> Vec<LayoutEdge> {
    let mut drafts = Vec::new();
    let mut joints: HashSet<(usize, usize, usize)> = HashSet::new();
    let mut covered: HashSet<(usize, usize)> = HashSet::new();

    for (parent, child) in family.parent_edges() {
        match co_parent(family, parent, child) {
            Some(other) => {
                let (first, second) = ordered_pair(family, parent, other);
                if joints.insert((first, second, child)) {
                    covered.insert((first, child));
                    covered.insert((second, child));
                    drafts.push(DraftEdge::Joint {
                        first,
                        second,
                        child,
                    });
                }
            }
            None => drafts.push(DraftEdge::Single { parent, child }),
        }
    }

    drafts
        .into_iter()
        .filter_map(|draft| match draft {
            DraftEdge::Single { parent, child } if covered.contains(&(parent, child)) => None,
            DraftEdge::Single { parent, child } => {
                Some(LayoutEdge::single(family.id(parent), family.id(child)))
            }
            DraftEdge::Joint {
                first,
                second,
                child,
            } => Some(LayoutEdge::joint(
                family.id(first),
                family.id(child),
                family.id(second),
            )),
        })
        .collect()
}

/// A spouse of `parent` who is also a recorded parent of `child`. When more
/// than one qualifies the smallest id wins.
fn co_parent(family: &FamilyGraph, parent: usize, child: usize) -> Option<usize> {
    family
        .spouses(parent)
        .iter()
        .copied()
        .filter(|&other| other != parent && family.is_parent_of(other, child))
        .min_by(|&a, &b| family.id(a).cmp(family.id(b)))
}

fn ordered_pair(family: &FamilyGraph, a: usize, b: usize) -> (usize, usize) {
    if family.id(a) <= family.id(b) {
        (a, b)
    } else {
        (b, a)
    }
}

/// One edge per spouse/partner pair, `from` holding the smaller id.
pub fn spouse_edges(family: &FamilyGraph) -> Vec<LayoutEdge> {
    let mut edges = Vec::new();
    for a in 0..family.len() {
        for &b in family.spouses(a).iter().filter(|&&b| a < b) {
            let (first, second) = ordered_pair(family, a, b);
            edges.push(LayoutEdge::single(family.id(first), family.id(second)));
        }
    }
    edges
}
