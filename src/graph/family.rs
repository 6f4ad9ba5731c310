//! FamilyGraph - relation graph built from a flat member list.
//!
//! Members are addressed by their position in the input slice (after
//! dropping duplicate ids), so every later stage can work with dense
//! `usize` indices and `Vec` storage instead of string-keyed maps.
//!
//! The graph keeps:
//! - A directed parent → children adjacency (deduplicated, insertion order)
//! - The reverse child → parents adjacency (same order)
//! - An undirected spouse/partner adjacency, symmetric by construction

use std::collections::{BTreeSet, HashMap, HashSet};

use log::{debug, trace};

use super::member::{Member, RelationKind};

/// Relation graph over one member set.
///
/// Borrows ids from the input members; nothing here outlives a layout call.
#[derive(Debug)]
pub struct FamilyGraph<'a> {
    /// Member ids in input order.
    ids: Vec<&'a str>,

    /// Map from member id to dense index
    index: HashMap<&'a str, usize>,

    /// Parent → children, insertion order, no duplicates
    children: Vec<Vec<usize>>,

    /// Child → parents, insertion order, no duplicates
    parents: Vec<Vec<usize>>,

    /// Spouse/partner adjacency (always symmetric)
    spouses: Vec<BTreeSet<usize>>,

    /// Set of (parent, child) pairs already recorded
    parent_edges: HashSet<(usize, usize)>,
}

impl<'a> FamilyGraph<'a> {
    /// Build the relation graph for a member list.
    ///
    /// Relations pointing at ids outside the member set are ignored, as are
    /// self-relations and relation types that carry no structure (`sibling`,
    /// `other`, free text). A member id that appears twice keeps its first
    /// occurrence; the duplicate's relations are ignored.
    pub fn build(members: &'a [Member]) -> Self {
        let mut ids = Vec::with_capacity(members.len());
        let mut index = HashMap::with_capacity(members.len());
        let mut sources = Vec::with_capacity(members.len());

        for member in members {
            let id = member.id.as_str();
            if index.contains_key(id) {
                debug!("Ignoring duplicate member id {id:?}");
                continue;
            }
            index.insert(id, ids.len());
            ids.push(id);
            sources.push(member);
        }

        let n = ids.len();
        let mut graph = Self {
            ids,
            index,
            children: vec![Vec::new(); n],
            parents: vec![Vec::new(); n],
            spouses: vec![BTreeSet::new(); n],
            parent_edges: HashSet::new(),
        };

        for (me, member) in sources.into_iter().enumerate() {
            for relation in &member.relations {
                let Some(&target) = graph.index.get(relation.target_id.as_str()) else {
                    debug!(
                        "Ignoring {} relation from {:?} to unknown member {:?}",
                        relation.kind, member.id, relation.target_id
                    );
                    continue;
                };
                if target == me {
                    debug!("Ignoring {} self-relation on {:?}", relation.kind, member.id);
                    continue;
                }

                match &relation.kind {
                    RelationKind::Parent => graph.add_parent_edge(target, me),
                    RelationKind::Child => graph.add_parent_edge(me, target),
                    kind if kind.is_spousal() => {
                        graph.spouses[me].insert(target);
                        graph.spouses[target].insert(me);
                    }
                    _ => {}
                }
            }
        }

        trace!(
            "Built family graph: {} members, {} parent edges",
            graph.len(),
            graph.parent_edges.len()
        );
        graph
    }

    fn add_parent_edge(&mut self, parent: usize, child: usize) {
        if self.parent_edges.insert((parent, child)) {
            self.children[parent].push(child);
            self.parents[child].push(parent);
        }
    }

    /// Number of distinct members.
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the graph has no members.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Id of the member at `index`.
    #[inline]
    pub fn id(&self, index: usize) -> &'a str {
        self.ids[index]
    }

    /// All member ids in input order.
    pub fn ids(&self) -> &[&'a str] {
        &self.ids
    }

    /// Dense index of a member id.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Children of a member, in the order they were first declared.
    #[inline]
    pub fn children(&self, index: usize) -> &[usize] {
        &self.children[index]
    }

    /// Parents of a member, in the order they were first declared.
    #[inline]
    pub fn parents(&self, index: usize) -> &[usize] {
        &self.parents[index]
    }

    /// Spouses and partners of a member, ascending by index.
    #[inline]
    pub fn spouses(&self, index: usize) -> &BTreeSet<usize> {
        &self.spouses[index]
    }

    /// Whether `child` has at least one recorded parent.
    #[inline]
    pub fn has_parent(&self, child: usize) -> bool {
        !self.parents[child].is_empty()
    }

    /// Whether `parent` → `child` is a recorded edge.
    #[inline]
    pub fn is_parent_of(&self, parent: usize, child: usize) -> bool {
        self.parent_edges.contains(&(parent, child))
    }

    /// Whether the member takes part in at least one parent/child edge.
    #[inline]
    pub fn in_lineage(&self, index: usize) -> bool {
        !self.parents[index].is_empty() || !self.children[index].is_empty()
    }

    /// Number of distinct parent → child edges.
    pub fn parent_edge_count(&self) -> usize {
        self.parent_edges.len()
    }

    /// Iterate parent → child edges, parents in input order and children in
    /// declaration order.
    pub fn parent_edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.children
            .iter()
            .enumerate()
            .flat_map(|(parent, children)| children.iter().map(move |&child| (parent, child)))
    }
}
