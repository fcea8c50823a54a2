//! Sequential Kruskal oracle for GHS property verification.
//!
//! A simple, trusted reference: with distinct weights the minimum spanning
//! forest is unique, so the protocol's tree must match it edge for edge.

use std::collections::{BTreeSet, HashMap};

use crate::graph::WeightedEdge;

use super::helpers::find_root;

/// Result of the sequential Kruskal oracle.
#[derive(Clone, Debug)]
pub(super) struct SequentialMstResult {
    /// Forest edges as canonical `(a, b, weight)` triples, sorted.
    pub edges: Vec<(i64, i64, i64)>,
    /// Sum of forest weights.
    pub total_weight: i128,
    /// Connected components among the nodes named by the input.
    pub component_count: usize,
}

/// Computes the minimum spanning forest of `edges`, ignoring self-loops.
pub(super) fn sequential_kruskal(edges: &[WeightedEdge]) -> SequentialMstResult {
    let usable: Vec<&WeightedEdge> = edges.iter().filter(|edge| edge.a != edge.b).collect();
    let nodes: BTreeSet<i64> = usable
        .iter()
        .flat_map(|edge| [edge.a.get(), edge.b.get()])
        .collect();
    let index: HashMap<i64, usize> = nodes
        .iter()
        .enumerate()
        .map(|(position, &id)| (id, position))
        .collect();

    let mut sorted = usable;
    sorted.sort_unstable_by_key(|edge| edge.weight);

    let mut parent: Vec<usize> = (0..nodes.len()).collect();
    let mut components = nodes.len();
    let mut forest = Vec::new();
    let mut total_weight: i128 = 0;

    for edge in sorted {
        let (a, b) = (edge.a.get(), edge.b.get());
        let ra = find_root(&mut parent, index[&a]);
        let rb = find_root(&mut parent, index[&b]);
        if ra != rb {
            parent[rb] = ra;
            components -= 1;
            total_weight += i128::from(edge.weight);
            forest.push((a.min(b), a.max(b), edge.weight));
        }
    }
    forest.sort_unstable();

    SequentialMstResult {
        edges: forest,
        total_weight,
        component_count: components,
    }
}
