//! Type definitions for GHS property-based tests.

use test_strategy::Arbitrary;

use crate::graph::WeightedEdge;

/// Shape of a generated input graph.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Arbitrary)]
pub(super) enum Topology {
    /// A single chain visiting every node once.
    #[weight(1)]
    Path,
    /// One hub connected to every other node.
    #[weight(1)]
    Star,
    /// Random spanning tree plus a few extra edges and self-loops.
    #[weight(3)]
    Sparse,
    /// Edge probability between 0.6 and 0.95.
    #[weight(2)]
    Dense,
    /// Connected graph with parallel edges between some node pairs.
    #[weight(2)]
    Multigraph,
    /// Two to four components with no edges between them.
    #[weight(2)]
    Disconnected,
}

/// Generated input together with the context needed to diagnose failures.
#[derive(Clone, Debug)]
pub(super) struct GraphFixture {
    /// Distinct node identifiers that appear in `edges`.
    pub node_count: usize,
    /// Input triples with globally distinct weights.
    pub edges: Vec<WeightedEdge>,
    /// Generator used to build the fixture.
    pub topology: Topology,
}
