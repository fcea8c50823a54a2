//! Property 3: Schedule independence, determinism, and idempotent delivery.
//!
//! - Any fair interleaving yields the tree the round-robin schedule yields.
//! - The threaded runtime yields the same tree.
//! - A seeded schedule replays the exact same event sequence.
//! - Re-delivering handled envelopes changes nothing but the duplicate count.

use proptest::test_runner::TestCaseResult;

use crate::{
    builder::{GhsBuilder, Runtime},
    observer::{NoopObserver, RecordingObserver},
    node::Disposition,
    scheduler::{Schedule, SchedulerConfig, Simulation},
    tree::extract,
};

use super::helpers::{fail, fixture_graph, tree_triples};
use super::oracle::sequential_kruskal;
use super::types::GraphFixture;

fn run_tree(
    fixture: &GraphFixture,
    runtime: Runtime,
    schedule: Schedule,
) -> Result<Vec<(i64, i64, i64)>, proptest::test_runner::TestCaseError> {
    let ghs = GhsBuilder::new()
        .with_runtime(runtime)
        .with_schedule(schedule)
        .build()
        .map_err(|err| fail(fixture, &err))?;
    let tree = ghs
        .run(&fixture.edges)
        .map_err(|err| fail(fixture, &err))?;
    Ok(tree_triples(&tree))
}

/// Checks that a shuffled schedule agrees with round-robin.
pub(super) fn run_schedule_independence_property(fixture: &GraphFixture, seed: u64) -> TestCaseResult {
    let baseline = run_tree(fixture, Runtime::Simulated, Schedule::RoundRobin)?;
    let shuffled = run_tree(fixture, Runtime::Simulated, Schedule::Shuffled { seed })?;
    if baseline != shuffled {
        return Err(fail(
            fixture,
            &format!("seed {seed} produced {shuffled:?}, round-robin produced {baseline:?}"),
        ));
    }
    Ok(())
}

/// Checks that the threaded runtime agrees with round-robin.
#[cfg(feature = "threaded")]
pub(super) fn run_threaded_equivalence_property(fixture: &GraphFixture) -> TestCaseResult {
    let baseline = run_tree(fixture, Runtime::Simulated, Schedule::RoundRobin)?;
    let threaded = run_tree(fixture, Runtime::Threaded, Schedule::RoundRobin)?;
    if baseline != threaded {
        return Err(fail(
            fixture,
            &format!("threaded produced {threaded:?}, simulated produced {baseline:?}"),
        ));
    }
    Ok(())
}

/// Checks that a seeded schedule replays identically.
pub(super) fn run_determinism_property(fixture: &GraphFixture, seed: u64) -> TestCaseResult {
    let graph = fixture_graph(fixture)?;
    let record = || {
        let mut simulation = Simulation::new(
            &graph,
            SchedulerConfig::for_graph(&graph, Schedule::Shuffled { seed }),
        );
        simulation.wake_all();
        let mut observer = RecordingObserver::default();
        simulation
            .run(&mut observer)
            .map(|stats| (stats, observer.into_events()))
            .map_err(|err| fail(fixture, &err))
    };
    let (first_stats, first_events) = record()?;
    let (second_stats, second_events) = record()?;
    if first_stats != second_stats || first_events != second_events {
        return Err(fail(fixture, &format!("seed {seed} did not replay identically")));
    }
    Ok(())
}

/// Re-injects every `stride`-th handled envelope and checks the outcome.
pub(super) fn run_redelivery_property(fixture: &GraphFixture, stride: usize) -> TestCaseResult {
    let graph = fixture_graph(fixture)?;
    let mut simulation = Simulation::new(
        &graph,
        SchedulerConfig::for_graph(&graph, Schedule::RoundRobin),
    );
    simulation.wake_all();

    let mut handled = 0_usize;
    let mut injected = 0_usize;
    while let Some(step) = simulation
        .step(&mut NoopObserver)
        .map_err(|err| fail(fixture, &err))?
    {
        if step.disposition != Disposition::Handled || step.envelope.origin().is_none() {
            continue;
        }
        handled += 1;
        if handled % stride.max(1) == 0 {
            simulation
                .inject(step.node, step.envelope)
                .map_err(|err| fail(fixture, &err))?;
            injected += 1;
        }
    }

    let stats = simulation.stats();
    if stats.duplicates != injected {
        return Err(fail(
            fixture,
            &format!("{injected} copies injected, {} dropped", stats.duplicates),
        ));
    }

    let oracle = sequential_kruskal(&fixture.edges);
    match extract(&graph, simulation.nodes()).map(|(tree, _)| tree) {
        Ok(tree) if tree_triples(&tree) == oracle.edges => Ok(()),
        Ok(tree) => Err(fail(
            fixture,
            &format!("tree {:?} differs from oracle {:?}", tree_triples(&tree), oracle.edges),
        )),
        Err(err) if oracle.component_count > 1 => {
            if err.is_non_termination() {
                Ok(())
            } else {
                Err(fail(fixture, &err))
            }
        }
        Err(err) => Err(fail(fixture, &err)),
    }
}
