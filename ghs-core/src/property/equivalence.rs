//! Property 1: Equivalence with the sequential oracle.
//!
//! For any generated input, the protocol's tree equals the oracle's
//! minimum spanning tree edge for edge. Disconnected inputs fail with the
//! oracle's component count.

use proptest::test_runner::{TestCaseError, TestCaseResult};

use crate::{builder::GhsBuilder, error::GhsError, scheduler::Schedule};

use super::helpers::{fail, tree_triples};
use super::oracle::sequential_kruskal;
use super::types::GraphFixture;

/// Runs the oracle equivalence property under `schedule`.
pub(super) fn run_oracle_equivalence_property(
    fixture: &GraphFixture,
    schedule: Schedule,
) -> TestCaseResult {
    let ghs = GhsBuilder::new()
        .with_schedule(schedule)
        .build()
        .map_err(|err| fail(fixture, &err))?;
    let oracle = sequential_kruskal(&fixture.edges);

    match ghs.run(&fixture.edges) {
        Ok(tree) => {
            if oracle.component_count != 1 {
                return Err(fail(
                    fixture,
                    &format!(
                        "run succeeded on a graph with {} components",
                        oracle.component_count
                    ),
                ));
            }
            let actual = tree_triples(&tree);
            if actual != oracle.edges {
                return Err(fail(
                    fixture,
                    &format!("tree mismatch: ghs={actual:?}, oracle={:?}", oracle.edges),
                ));
            }
            if tree.total_weight() != oracle.total_weight {
                return Err(fail(
                    fixture,
                    &format!(
                        "total weight mismatch: ghs={}, oracle={}",
                        tree.total_weight(),
                        oracle.total_weight
                    ),
                ));
            }
            if tree.node_count() != fixture.node_count {
                return Err(fail(
                    fixture,
                    &format!(
                        "tree spans {} nodes, expected {}",
                        tree.node_count(),
                        fixture.node_count
                    ),
                ));
            }
            Ok(())
        }
        Err(GhsError::NotConnected { fragments }) if fragments == oracle.component_count => Ok(()),
        Err(err) => Err(TestCaseError::fail(format!(
            "run failed: {err} (topology={:?}, oracle components={})",
            fixture.topology, oracle.component_count,
        ))),
    }
}
