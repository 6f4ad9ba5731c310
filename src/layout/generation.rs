//! Generation assignment by breadth-first search.
//!
//! Roots are members nobody lists as a child. Each root is walked
//! breadth-first and every newly reached child gets `parent depth + 1`.
//! A member is never visited twice, so parent/child cycles cannot loop the
//! walk. Members no root reaches are appended to generation 0.

use std::collections::VecDeque;

use log::debug;

use crate::graph::FamilyGraph;

/// Output of the generation walk, indexed by member.
#[derive(Debug, Clone)]
pub struct Generations {
    /// Members per BFS depth, in visit order.
    pub layers: Vec<Vec<usize>>,
    /// BFS depth of each member.
    pub depth: Vec<u32>,
    /// The member through which each member was first reached.
    pub bfs_parent: Vec<Option<usize>>,
    /// Global visit order of each member.
    pub rank: Vec<usize>,
    /// Position of each member within its BFS layer.
    pub layer_index: Vec<usize>,
}

/// Root candidates in walk order.
///
/// A focus member that is itself a root goes first. A non-empty graph with
/// no parentless member (every member sits on a cycle) falls back to the
/// first member so the walk has somewhere to start.
pub fn root_candidates(graph: &FamilyGraph, focus: Option<usize>) -> Vec<usize> {
    let mut roots: Vec<usize> = (0..graph.len()).filter(|&i| !graph.has_parent(i)).collect();

    if let Some(focus) = focus {
        if let Some(pos) = roots.iter().position(|&r| r == focus) {
            let focus = roots.remove(pos);
            roots.insert(0, focus);
        }
    }

    if roots.is_empty() && !graph.is_empty() {
        debug!("No parentless member; forcing {:?} as root", graph.id(0));
        roots.push(0);
    }
    roots
}

/// Assign a BFS depth to every member.
pub fn assign_generations(graph: &FamilyGraph, focus: Option<usize>) -> Generations {
    let n = graph.len();
    let mut visited = vec![false; n];
    let mut depth = vec![0u32; n];
    let mut bfs_parent = vec![None; n];
    let mut order = Vec::with_capacity(n);
    let mut queue = VecDeque::new();

    for root in root_candidates(graph, focus) {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        queue.push_back(root);

        while let Some(node) = queue.pop_front() {
            order.push(node);
            for &child in graph.children(node) {
                if !visited[child] {
                    visited[child] = true;
                    depth[child] = depth[node] + 1;
                    bfs_parent[child] = Some(node);
                    queue.push_back(child);
                }
            }
        }
    }

    let reached = order.len();
    for (member, seen) in visited.iter_mut().enumerate() {
        if !*seen {
            *seen = true;
            order.push(member);
        }
    }
    if order.len() > reached {
        debug!(
            "{} members unreachable from any root, placed in generation 0",
            order.len() - reached
        );
    }

    let mut layers: Vec<Vec<usize>> = Vec::new();
    let mut rank = vec![0; n];
    let mut layer_index = vec![0; n];
    for (visit, &member) in order.iter().enumerate() {
        let d = depth[member] as usize;
        if layers.len() <= d {
            layers.resize_with(d + 1, Vec::new);
        }
        rank[member] = visit;
        layer_index[member] = layers[d].len();
        layers[d].push(member);
    }

    Generations {
        layers,
        depth,
        bfs_parent,
        rank,
        layer_index,
    }
}
