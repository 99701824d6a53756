//! Union-find clustering of match edges.
//!
//! Exact (identifier) edges are applied first and always unite their
//! endpoints. Fuzzy edges are applied afterwards in score order and are
//! refused when they would join two groups that already carry different
//! values for the same identifier type.

use std::collections::{BTreeMap, BTreeSet};

use litscope_core::{IdentifierType, PriorityConfig};
use serde::{Deserialize, Serialize};

use crate::edge::MatchEdge;
use crate::index::IdentifierIndex;

pub type IdentifierTable = BTreeMap<IdentifierType, BTreeSet<String>>;

/// A fuzzy edge refused because its endpoints' groups disagree on an
/// identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedEdge {
    pub edge: MatchEdge,
    /// Highest-priority identifier type in conflict.
    pub kind: IdentifierType,
    pub left_values: BTreeSet<String>,
    pub right_values: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Batch positions, ascending.
    pub members: Vec<usize>,
    /// Normalized identifiers of all members.
    pub identifiers: IdentifierTable,
    /// Edges that joined members of this cluster.
    pub edges: Vec<MatchEdge>,
    /// Refused fuzzy edges with one endpoint in this cluster.
    pub rejected: Vec<RejectedEdge>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clustering {
    /// Ordered by smallest member.
    pub clusters: Vec<Cluster>,
    pub exact_edges: usize,
    pub fuzzy_accepted: usize,
    pub rejected: Vec<RejectedEdge>,
}

#[derive(Debug, Clone)]
pub struct ClusterBuilder {
    priority: PriorityConfig,
}

impl ClusterBuilder {
    pub fn new(priority: PriorityConfig) -> Self {
        Self { priority }
    }

    /// Group `len` records. `exact` edges are applied in the given order;
    /// `fuzzy` edges are sorted best-first before use.
    pub fn build(
        &self,
        len: usize,
        index: &IdentifierIndex,
        exact: Vec<MatchEdge>,
        mut fuzzy: Vec<MatchEdge>,
    ) -> Clustering {
        let mut dsu = DisjointSet::new(len);
        let mut tables: Vec<IdentifierTable> = (0..len)
            .map(|idx| {
                let mut table = IdentifierTable::new();
                for (kind, value) in index.keys_of(idx).into_iter().flatten() {
                    table.entry(*kind).or_default().insert(value.clone());
                }
                table
            })
            .collect();

        let mut accepted: Vec<MatchEdge> = Vec::new();
        let exact_edges = exact.len();
        for edge in exact {
            unite(&mut dsu, &mut tables, edge.left, edge.right);
            accepted.push(edge);
        }

        fuzzy.sort_by(MatchEdge::cmp_fuzzy);
        let mut fuzzy_accepted = 0;
        let mut rejected = Vec::new();
        for edge in fuzzy {
            let left_root = dsu.find(edge.left);
            let right_root = dsu.find(edge.right);
            if left_root != right_root
                && let Some(kind) = self.conflict(&tables[left_root], &tables[right_root])
            {
                tracing::debug!(
                    left = edge.left,
                    right = edge.right,
                    score = edge.score,
                    identifier = %kind,
                    "fuzzy edge refused: identifier conflict"
                );
                rejected.push(RejectedEdge {
                    left_values: tables[left_root].get(&kind).cloned().unwrap_or_default(),
                    right_values: tables[right_root].get(&kind).cloned().unwrap_or_default(),
                    edge,
                    kind,
                });
                continue;
            }
            unite(&mut dsu, &mut tables, edge.left, edge.right);
            fuzzy_accepted += 1;
            accepted.push(edge);
        }

        let mut by_root: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for idx in 0..len {
            by_root.entry(dsu.find(idx)).or_default().push(idx);
        }

        let mut clusters: Vec<Cluster> = Vec::with_capacity(by_root.len());
        let mut slot_of_root: BTreeMap<usize, usize> = BTreeMap::new();
        let mut groups: Vec<(usize, Vec<usize>)> = by_root.into_iter().collect();
        groups.sort_by_key(|(_, members)| members[0]);
        for (root, members) in groups {
            slot_of_root.insert(root, clusters.len());
            clusters.push(Cluster {
                members,
                identifiers: std::mem::take(&mut tables[root]),
                edges: Vec::new(),
                rejected: Vec::new(),
            });
        }

        for edge in accepted {
            let slot = slot_of_root[&dsu.find(edge.left)];
            clusters[slot].edges.push(edge);
        }
        for refused in &rejected {
            let left = slot_of_root[&dsu.find(refused.edge.left)];
            let right = slot_of_root[&dsu.find(refused.edge.right)];
            clusters[left].rejected.push(refused.clone());
            if right != left {
                clusters[right].rejected.push(refused.clone());
            }
        }

        Clustering {
            clusters,
            exact_edges,
            fuzzy_accepted,
            rejected,
        }
    }

    /// Highest-priority identifier type for which both groups carry values
    /// and the values differ.
    fn conflict(&self, left: &IdentifierTable, right: &IdentifierTable) -> Option<IdentifierType> {
        let mut conflicts: Vec<IdentifierType> = left
            .iter()
            .filter_map(|(kind, left_values)| {
                let right_values = right.get(kind)?;
                let differ = !left_values.is_empty()
                    && !right_values.is_empty()
                    && left_values != right_values;
                differ.then_some(*kind)
            })
            .collect();
        conflicts.sort_by_key(|kind| (self.priority.identifier_rank(*kind), *kind));
        conflicts.into_iter().next()
    }
}

fn unite(dsu: &mut DisjointSet, tables: &mut [IdentifierTable], a: usize, b: usize) {
    let a_root = dsu.find(a);
    let b_root = dsu.find(b);
    if let Some((root, absorbed)) = dsu.union(a_root, b_root) {
        let moved = std::mem::take(&mut tables[absorbed]);
        for (kind, values) in moved {
            tables[root].entry(kind).or_default().extend(values);
        }
    }
}

#[derive(Debug, Clone)]
struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Returns `(new_root, absorbed_root)` when two sets were joined.
    fn union(&mut self, left: usize, right: usize) -> Option<(usize, usize)> {
        let left_root = self.find(left);
        let right_root = self.find(right);

        if left_root == right_root {
            return None;
        }

        let left_rank = self.rank[left_root];
        let right_rank = self.rank[right_root];

        if left_rank < right_rank {
            self.parent[left_root] = right_root;
            Some((right_root, left_root))
        } else if left_rank > right_rank {
            self.parent[right_root] = left_root;
            Some((left_root, right_root))
        } else {
            self.parent[right_root] = left_root;
            self.rank[left_root] += 1;
            Some((left_root, right_root))
        }
    }
}
