//! Input graph model.
//!
//! A [`Graph`] is built once from the `(node, node, weight)` triples supplied
//! by a [`crate::GraphSource`] and never changes during a run. Nodes are the
//! set of endpoints named by the edges; each gets a dense index used for
//! routing inside the runtimes.

use std::{
    collections::{BTreeSet, HashMap, hash_map::Entry},
    fmt,
};

use tracing::debug;

use crate::{
    edge::{Edge, EdgeId, Weight},
    error::GraphError,
};

/// External node identifier taken from the input.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeId(i64);

impl NodeId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for NodeId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

/// One input triple: two endpoints and a weight.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct WeightedEdge {
    /// First endpoint.
    pub a: NodeId,
    /// Second endpoint.
    pub b: NodeId,
    /// Edge weight; must be unique across the graph.
    pub weight: Weight,
}

impl WeightedEdge {
    /// Builds a triple from raw identifiers.
    ///
    /// # Examples
    /// ```
    /// use ghs_core::{NodeId, WeightedEdge};
    ///
    /// let edge = WeightedEdge::new(1, 2, 10);
    /// assert_eq!(edge.a, NodeId::new(1));
    /// assert_eq!(edge.weight, 10);
    /// ```
    #[must_use]
    pub const fn new(a: i64, b: i64, weight: Weight) -> Self {
        Self {
            a: NodeId::new(a),
            b: NodeId::new(b),
            weight,
        }
    }
}

/// Immutable weighted multigraph with dense node and edge indices.
#[derive(Clone, Debug)]
pub struct Graph {
    nodes: Vec<NodeId>,
    index: HashMap<NodeId, usize>,
    edges: Vec<Edge>,
    endpoints: Vec<(usize, usize)>,
    incidence: Vec<Vec<EdgeId>>,
}

impl Graph {
    /// Builds a graph from input triples.
    ///
    /// Self-loops are ignored. Parallel edges are kept; they are told apart
    /// by [`EdgeId`].
    ///
    /// # Errors
    /// Returns [`GraphError::Empty`] when no usable edge remains and
    /// [`GraphError::DuplicateWeight`] when two edges share a weight.
    ///
    /// # Examples
    /// ```
    /// use ghs_core::{Graph, WeightedEdge};
    ///
    /// let graph = Graph::from_edges([
    ///     WeightedEdge::new(1, 2, 1),
    ///     WeightedEdge::new(2, 3, 2),
    /// ])?;
    /// assert_eq!(graph.node_count(), 3);
    /// assert_eq!(graph.edge_count(), 2);
    /// # Ok::<(), ghs_core::GraphError>(())
    /// ```
    pub fn from_edges(edges: impl IntoIterator<Item = WeightedEdge>) -> Result<Self, GraphError> {
        let mut kept: Vec<WeightedEdge> = Vec::new();
        let mut seen: HashMap<Weight, (NodeId, NodeId)> = HashMap::new();

        for edge in edges {
            if edge.a == edge.b {
                debug!(node = %edge.a, weight = edge.weight, "ignoring self-loop");
                continue;
            }
            match seen.entry(edge.weight) {
                Entry::Occupied(existing) => {
                    let (first_a, first_b) = *existing.get();
                    return Err(GraphError::DuplicateWeight {
                        weight: edge.weight,
                        first_a,
                        first_b,
                        second_a: edge.a,
                        second_b: edge.b,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert((edge.a, edge.b));
                }
            }
            kept.push(edge);
        }

        if kept.is_empty() {
            return Err(GraphError::Empty);
        }

        let nodes: Vec<NodeId> = kept
            .iter()
            .flat_map(|edge| [edge.a, edge.b])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let index: HashMap<NodeId, usize> = nodes
            .iter()
            .enumerate()
            .map(|(position, id)| (*id, position))
            .collect();

        let mut incidence = vec![Vec::new(); nodes.len()];
        let mut built = Vec::with_capacity(kept.len());
        let mut endpoints = Vec::with_capacity(kept.len());
        for (position, edge) in kept.into_iter().enumerate() {
            let id = EdgeId::new(position);
            let (Some(&left), Some(&right)) = (index.get(&edge.a), index.get(&edge.b)) else {
                continue;
            };
            built.push(Edge::new(id, edge.a, edge.b, edge.weight));
            endpoints.push((left, right));
            if let Some(list) = incidence.get_mut(left) {
                list.push(id);
            }
            if let Some(list) = incidence.get_mut(right) {
                list.push(id);
            }
        }

        Ok(Self {
            nodes,
            index,
            edges: built,
            endpoints,
            incidence,
        })
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns node identifiers in ascending order.
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Returns all edges in input order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Looks up an edge by identifier.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index())
    }

    /// Returns the dense index for `node`.
    #[must_use]
    pub fn index_of(&self, node: NodeId) -> Option<usize> {
        self.index.get(&node).copied()
    }

    pub(crate) fn endpoints(&self, id: EdgeId) -> Option<(usize, usize)> {
        self.endpoints.get(id.index()).copied()
    }

    pub(crate) fn incident(&self, node: usize) -> &[EdgeId] {
        self.incidence.get(node).map_or(&[], Vec::as_slice)
    }
}
