//! Minimum spanning tree assembled from the nodes' final edge views.

use std::fmt;

use crate::{
    edge::{Edge, EdgeState, Weight},
    error::{GhsError, Result},
    graph::{Graph, NodeId},
    node::Node,
    union_find::DisjointSet,
};

/// An edge of the computed spanning tree with endpoints in ascending order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TreeEdge {
    a: NodeId,
    b: NodeId,
    weight: Weight,
}

impl TreeEdge {
    /// Builds a tree edge, ordering the endpoints so that `a <= b`.
    ///
    /// # Examples
    /// ```
    /// use ghs_core::{NodeId, TreeEdge};
    ///
    /// let edge = TreeEdge::new(NodeId::new(9), NodeId::new(2), 4);
    /// assert_eq!(edge.a(), NodeId::new(2));
    /// assert_eq!(edge.b(), NodeId::new(9));
    /// ```
    #[must_use]
    pub fn new(a: NodeId, b: NodeId, weight: Weight) -> Self {
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        Self { a, b, weight }
    }

    /// Returns the smaller endpoint.
    #[must_use]
    pub const fn a(&self) -> NodeId {
        self.a
    }

    /// Returns the larger endpoint.
    #[must_use]
    pub const fn b(&self) -> NodeId {
        self.b
    }

    /// Returns the edge weight.
    #[must_use]
    pub const fn weight(&self) -> Weight {
        self.weight
    }
}

impl fmt::Display for TreeEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) w={}", self.a, self.b, self.weight)
    }
}

/// The minimum spanning tree of a connected graph.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SpanningTree {
    edges: Vec<TreeEdge>,
    total_weight: i128,
    node_count: usize,
}

impl SpanningTree {
    /// Builds a tree from its edges, sorting them by `(a, b, weight)`.
    #[must_use]
    pub fn from_edges(mut edges: Vec<TreeEdge>, node_count: usize) -> Self {
        edges.sort_unstable();
        let total_weight = edges.iter().map(|edge| i128::from(edge.weight)).sum();
        Self {
            edges,
            total_weight,
            node_count,
        }
    }

    /// Returns the tree edges in ascending `(a, b, weight)` order.
    #[must_use]
    pub fn edges(&self) -> &[TreeEdge] {
        &self.edges
    }

    /// Returns the sum of all tree edge weights.
    #[must_use]
    pub const fn total_weight(&self) -> i128 {
        self.total_weight
    }

    /// Returns the number of nodes the tree spans.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.node_count
    }
}

/// The final classification of one graph edge, agreed by both endpoints.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ClassifiedEdge {
    edge: Edge,
    state: EdgeState,
}

impl ClassifiedEdge {
    /// Returns the classified edge.
    #[must_use]
    pub const fn edge(&self) -> Edge {
        self.edge
    }

    /// Returns the agreed classification.
    #[must_use]
    pub const fn state(&self) -> EdgeState {
        self.state
    }
}

/// Collects the edges that both endpoints classify as branches.
///
/// # Errors
/// Returns [`GhsError::ClassificationMismatch`] when the two endpoint views of
/// an edge disagree, [`GhsError::ProtocolViolation`] when the branch edges
/// contain a cycle, and [`GhsError::NotConnected`] when they leave more than
/// one fragment.
pub(crate) fn extract(
    graph: &Graph,
    nodes: &[Node],
) -> Result<(SpanningTree, Vec<ClassifiedEdge>)> {
    let mut components = DisjointSet::new(nodes.len());
    let mut edges = Vec::with_capacity(nodes.len().saturating_sub(1));
    let mut classifications = Vec::with_capacity(graph.edge_count());

    for edge in graph.edges() {
        let Some((left, right)) = graph.endpoints(edge.id()) else {
            continue;
        };
        let view = |position: usize| {
            nodes
                .get(position)
                .and_then(|node| node.edge_state(edge.id()))
                .unwrap_or_default()
        };
        let (left_view, right_view) = (view(left), view(right));
        if left_view != right_view {
            return Err(GhsError::ClassificationMismatch {
                edge: edge.id(),
                left: left_view,
                right: right_view,
            });
        }
        classifications.push(ClassifiedEdge {
            edge: *edge,
            state: left_view,
        });
        if left_view != EdgeState::Branch {
            continue;
        }
        if !components.union(left, right) {
            return Err(GhsError::ProtocolViolation {
                node: edge.a(),
                violation: "branch edges form a cycle",
            });
        }
        edges.push(TreeEdge::new(edge.a(), edge.b(), edge.weight()));
    }

    if components.components() > 1 {
        return Err(GhsError::NotConnected {
            fragments: components.components(),
        });
    }
    Ok((SpanningTree::from_edges(edges, nodes.len()), classifications))
}
