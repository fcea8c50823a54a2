//! Shared helper functions for GHS property-based tests.

use proptest::test_runner::TestCaseError;

use crate::{
    graph::Graph,
    tree::SpanningTree,
};

use super::types::GraphFixture;

/// Path-halving find for union-find verification.
pub(super) fn find_root(parent: &mut [usize], mut node: usize) -> usize {
    while parent[node] != node {
        parent[node] = parent[parent[node]];
        node = parent[node];
    }
    node
}

/// Returns the tree as canonical `(a, b, weight)` triples in sorted order.
pub(super) fn tree_triples(tree: &SpanningTree) -> Vec<(i64, i64, i64)> {
    tree.edges()
        .iter()
        .map(|edge| (edge.a().get(), edge.b().get(), edge.weight()))
        .collect()
}

/// Builds the fixture's graph, failing the case on invalid input.
pub(super) fn fixture_graph(fixture: &GraphFixture) -> Result<Graph, TestCaseError> {
    Graph::from_edges(fixture.edges.iter().copied()).map_err(|err| fail(fixture, &err))
}

/// Formats a failure with the fixture context.
pub(super) fn fail(fixture: &GraphFixture, reason: &dyn std::fmt::Display) -> TestCaseError {
    TestCaseError::fail(format!(
        "{reason} (topology={:?}, nodes={}, edges={})",
        fixture.topology,
        fixture.node_count,
        fixture.edges.len(),
    ))
}
