//! Property 2: Quiescent state invariants.
//!
//! After a simulated run on any generated input:
//!
//! - every node is awake and `Found`, with no open test and no awaited report;
//! - no edge is still `Basic`, and both endpoints agree on every edge;
//! - exactly two nodes per component observed termination;
//! - levels only ever rose, and never above `floor(log2 n)`;
//! - no duplicate was observed on reliable FIFO links.

use proptest::test_runner::TestCaseResult;

use crate::{
    edge::EdgeState,
    message::NodeState,
    observer::{ProtocolEvent, RecordingObserver},
    scheduler::{Schedule, SchedulerConfig, Simulation},
};

use super::helpers::{fail, fixture_graph};
use super::oracle::sequential_kruskal;
use super::types::GraphFixture;

/// Runs the quiescent-state property under `schedule`.
pub(super) fn run_structural_invariants_property(
    fixture: &GraphFixture,
    schedule: Schedule,
) -> TestCaseResult {
    let graph = fixture_graph(fixture)?;
    let mut simulation = Simulation::new(&graph, SchedulerConfig::for_graph(&graph, schedule));
    simulation.wake_all();
    let mut observer = RecordingObserver::default();
    let stats = simulation
        .run(&mut observer)
        .map_err(|err| fail(fixture, &err))?;

    for node in simulation.nodes() {
        if node.state() != NodeState::Found || node.find_count() != 0 || node.test_edge().is_some()
        {
            return Err(fail(
                fixture,
                &format!(
                    "node {} not settled: state={}, find_count={}, test_edge={:?}",
                    node.id(),
                    node.state(),
                    node.find_count(),
                    node.test_edge()
                ),
            ));
        }
        if let Some((edge, _)) = node
            .classifications()
            .find(|&(_, state)| state == EdgeState::Basic)
        {
            return Err(fail(
                fixture,
                &format!("node {} left edge {edge} unclassified", node.id()),
            ));
        }
    }

    for edge in graph.edges() {
        let views: Vec<_> = [edge.a(), edge.b()]
            .iter()
            .filter_map(|&id| graph.index_of(id))
            .filter_map(|position| simulation.nodes().get(position))
            .map(|node| node.edge_state(edge.id()))
            .collect();
        if views.len() != 2 || views[0] != views[1] {
            return Err(fail(
                fixture,
                &format!("edge {} views disagree: {views:?}", edge.id()),
            ));
        }
    }

    let components = sequential_kruskal(&fixture.edges).component_count;
    if stats.halted_nodes != 2 * components {
        return Err(fail(
            fixture,
            &format!(
                "{} halted nodes for {components} components",
                stats.halted_nodes
            ),
        ));
    }
    if stats.duplicates != 0 {
        return Err(fail(
            fixture,
            &format!("{} duplicates on reliable links", stats.duplicates),
        ));
    }

    let level_cap = graph.node_count().ilog2();
    for event in observer.events() {
        if let ProtocolEvent::LevelRaised { node, from, to, .. } = event
            && (to <= from || to.get() > level_cap)
        {
            return Err(fail(
                fixture,
                &format!("node {node} moved from level {from} to {to} (cap {level_cap})"),
            ));
        }
    }
    Ok(())
}
