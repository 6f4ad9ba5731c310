//! Spousal unit resolution.
//!
//! Members linked by spouse/partner relations, directly or transitively, are
//! laid out side by side as one unit. Units are found with a union-find over
//! the spouse adjacency. Each unit then gets a single generation:
//!
//! 1. **Reconciliation:** the unit is pulled to the shallowest BFS depth of a
//!    member who is someone's child, else of a member with any parent/child
//!    edge. A spouse with no family of their own never drags the unit up.
//! 2. **Longest path:** member edges are projected onto a unit-level graph
//!    and every unit sits one generation below its deepest parent unit.
//!    Source units sit in generation 0. When a cycle stalls the pass, the
//!    first stalled unit is released at its reconciled depth.
//!
//! Depths are finally compacted so no generation is left empty.

use std::collections::{HashMap, VecDeque};

use log::{debug, trace};
use petgraph::algo::tarjan_scc;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::unionfind::UnionFind;
use petgraph::{Directed, Direction};

use super::generation::Generations;
use crate::graph::FamilyGraph;

/// A maximal set of members linked by spouse/partner relations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpousalUnit {
    /// Member indices in input order.
    pub members: Vec<usize>,
    /// Member that keeps the unit's base x position.
    pub anchor: usize,
    /// Resolved generation.
    pub depth: u32,
    /// Smallest BFS rank of any member; orders siblings.
    pub rank: usize,
}

/// Spousal units plus the parent → child graph between them.
#[derive(Debug)]
pub struct UnitGraph {
    units: Vec<SpousalUnit>,
    unit_of: Vec<usize>,
    /// Node `i` carries unit `i`; nodes are never removed.
    graph: StableGraph<usize, (), Directed>,
}

impl UnitGraph {
    /// Group members into units and resolve each unit's generation.
    pub fn resolve(family: &FamilyGraph, generations: &Generations) -> Self {
        let (groups, unit_of) = group_spouses(family);

        let mut graph = StableGraph::with_capacity(groups.len(), family.parent_edge_count());
        for unit in 0..groups.len() {
            graph.add_node(unit);
        }
        for (parent, child) in family.parent_edges() {
            let (from, to) = (unit_of[parent], unit_of[child]);
            if from != to {
                graph.update_edge(NodeIndex::new(from), NodeIndex::new(to), ());
            }
        }

        let reconciled: Vec<u32> = groups
            .iter()
            .map(|members| reconcile_depth(family, generations, members))
            .collect();
        let depths = compact(longest_path_depths(&graph, &reconciled));

        let units: Vec<SpousalUnit> = groups
            .into_iter()
            .zip(depths)
            .map(|(members, depth)| SpousalUnit {
                anchor: choose_anchor(family, &members),
                rank: members
                    .iter()
                    .map(|&m| generations.rank[m])
                    .min()
                    .unwrap_or(usize::MAX),
                members,
                depth,
            })
            .collect();

        trace!(
            "Resolved {} spousal units with {} unit edges",
            units.len(),
            graph.edge_count()
        );

        Self {
            units,
            unit_of,
            graph,
        }
    }

    /// Number of units.
    #[inline]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether there are no units.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// All units, ordered by their first member in input order.
    #[inline]
    pub fn units(&self) -> &[SpousalUnit] {
        &self.units
    }

    /// A single unit.
    #[inline]
    pub fn unit(&self, unit: usize) -> &SpousalUnit {
        &self.units[unit]
    }

    /// Unit a member belongs to.
    #[inline]
    pub fn unit_of(&self, member: usize) -> usize {
        self.unit_of[member]
    }

    /// Number of generations after compaction.
    pub fn generation_count(&self) -> usize {
        self.units
            .iter()
            .map(|u| u.depth as usize + 1)
            .max()
            .unwrap_or(0)
    }

    /// Units with an edge into `unit`, ascending.
    pub fn parent_units(&self, unit: usize) -> Vec<usize> {
        self.neighbors(unit, Direction::Incoming)
    }

    /// Units `unit` has an edge into, ascending.
    pub fn child_units(&self, unit: usize) -> Vec<usize> {
        self.neighbors(unit, Direction::Outgoing)
    }

    /// Child units strictly deeper than `unit`. Only these count as layout
    /// descendants.
    pub fn layout_children(&self, unit: usize) -> Vec<usize> {
        let depth = self.units[unit].depth;
        let mut children = self.child_units(unit);
        children.retain(|&c| self.units[c].depth > depth);
        children
    }

    /// Parent units strictly shallower than `unit`.
    pub fn layout_parents(&self, unit: usize) -> Vec<usize> {
        let depth = self.units[unit].depth;
        let mut parents = self.parent_units(unit);
        parents.retain(|&p| self.units[p].depth < depth);
        parents
    }

    fn neighbors(&self, unit: usize, direction: Direction) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .graph
            .neighbors_directed(NodeIndex::new(unit), direction)
            .map(|n| n.index())
            .collect();
        out.sort_unstable();
        out
    }
}

/// Union spouses and return the member groups (ordered by first member)
/// alongside the unit index of every member.
fn group_spouses(family: &FamilyGraph) -> (Vec<Vec<usize>>, Vec<usize>) {
    let n = family.len();
    let mut sets = UnionFind::<usize>::new(n);
    for a in 0..n {
        for &b in family.spouses(a) {
            if a < b {
                sets.union(a, b);
            }
        }
    }
    let labels = sets.into_labeling();

    let mut unit_by_label: HashMap<usize, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut unit_of = vec![0; n];
    for (member, &label) in labels.iter().enumerate() {
        let unit = *unit_by_label.entry(label).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[unit].push(member);
        unit_of[member] = unit;
    }
    (groups, unit_of)
}

/// Pick the anchor: the lexicographically smallest id among members with a
/// parent/child edge, else the smallest id overall.
pub fn choose_anchor(family: &FamilyGraph, members: &[usize]) -> usize {
    let by_id = |a: &usize, b: &usize| family.id(*a).cmp(family.id(*b));
    members
        .iter()
        .copied()
        .filter(|&m| family.in_lineage(m))
        .min_by(by_id)
        .or_else(|| members.iter().copied().min_by(by_id))
        // groups are never empty
        .unwrap_or_default()
}

/// Depth the whole unit is pulled to before the unit-level pass.
pub fn reconcile_depth(family: &FamilyGraph, generations: &Generations, members: &[usize]) -> u32 {
    let depth_of = |m: &usize| generations.depth[*m];
    let child_depth = members
        .iter()
        .filter(|&&m| family.has_parent(m))
        .map(depth_of)
        .min();
    let anchored_depth = members
        .iter()
        .filter(|&&m| family.in_lineage(m))
        .map(depth_of)
        .min();

    child_depth
        .or(anchored_depth)
        .or_else(|| members.iter().map(depth_of).min())
        .unwrap_or(0)
}

/// Longest-path depth per unit node.
///
/// Kahn's algorithm over the unit graph. When the queue runs dry with units
/// left, some cycle has no unresolved parent outside itself. The lowest-index
/// unit of such a cycle is released at the larger of its `fallback` depth and
/// what its resolved parents imply, and the pass continues from there. Units
/// merely downstream of a cycle are never released early, so every edge off
/// a cycle still points one generation down.
fn longest_path_depths(graph: &StableGraph<usize, (), Directed>, fallback: &[u32]) -> Vec<u32> {
    let count = fallback.len();
    let mut in_degree: Vec<usize> = (0..count)
        .map(|u| {
            graph
                .neighbors_directed(NodeIndex::new(u), Direction::Incoming)
                .count()
        })
        .collect();
    let mut depth = vec![0u32; count];
    let mut resolved = vec![false; count];
    let mut queue: VecDeque<usize> = (0..count).filter(|&u| in_degree[u] == 0).collect();
    let mut remaining = count;

    let mut component = vec![0usize; count];
    for (id, scc) in tarjan_scc(graph).into_iter().enumerate() {
        for node in scc {
            component[node.index()] = id;
        }
    }
    let releasable = |u: usize, resolved: &[bool]| {
        graph
            .neighbors_directed(NodeIndex::new(u), Direction::Incoming)
            .all(|p| resolved[p.index()] || component[p.index()] == component[u])
    };

    loop {
        while let Some(unit) = queue.pop_front() {
            resolved[unit] = true;
            remaining -= 1;
            for child in graph.neighbors_directed(NodeIndex::new(unit), Direction::Outgoing) {
                let child = child.index();
                if resolved[child] {
                    continue;
                }
                depth[child] = depth[child].max(depth[unit] + 1);
                in_degree[child] = in_degree[child].saturating_sub(1);
                if in_degree[child] == 0 {
                    queue.push_back(child);
                }
            }
        }

        if remaining == 0 {
            break;
        }
        let Some(stalled) = (0..count)
            .find(|&u| !resolved[u] && in_degree[u] > 0 && releasable(u, &resolved))
        else {
            break;
        };
        debug!("Breaking unit cycle at unit {stalled}");
        depth[stalled] = depth[stalled].max(fallback[stalled]);
        in_degree[stalled] = 0;
        queue.push_back(stalled);
    }

    depth
}

/// Renumber depths densely, keeping their order.
fn compact(depths: Vec<u32>) -> Vec<u32> {
    let mut distinct = depths.clone();
    distinct.sort_unstable();
    distinct.dedup();
    depths
        .into_iter()
        .map(|d| distinct.binary_search(&d).map_or(d, |i| i as u32))
        .collect()
}
