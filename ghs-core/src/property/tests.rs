//! Property-based test runners for the GHS protocol.
//!
//! Hosts proptest runners for every property, rstest parameterised cases
//! for targeted topology coverage, and unit tests for the sequential oracle
//! itself.

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::scheduler::Schedule;
use crate::test_utils::{suite_proptest_config, triples};

use super::equivalence::run_oracle_equivalence_property;
use super::oracle::{SequentialMstResult, sequential_kruskal};
#[cfg(feature = "threaded")]
use super::schedules::run_threaded_equivalence_property;
use super::schedules::{
    run_determinism_property, run_redelivery_property, run_schedule_independence_property,
};
use super::strategies::{connected_fixture_strategy, fixture_strategy, generate_fixture};
use super::structural::run_structural_invariants_property;
use super::types::{GraphFixture, Topology};

fn fixture(topology: Topology, seed: u64) -> GraphFixture {
    let mut rng = SmallRng::seed_from_u64(seed);
    generate_fixture(topology, &mut rng)
}

/// Generates an rstest-parameterised function that exercises a property
/// runner across a fixed set of topologies and seeds.
macro_rules! parameterised_property_test {
    ($test_name:ident, |$fixture:ident, $seed:ident| $body:expr, $expectation:expr) => {
        #[rstest::rstest]
        #[case::path_42(Topology::Path, 42)]
        #[case::star_42(Topology::Star, 42)]
        #[case::sparse_42(Topology::Sparse, 42)]
        #[case::sparse_999(Topology::Sparse, 999)]
        #[case::dense_42(Topology::Dense, 42)]
        #[case::dense_999(Topology::Dense, 999)]
        #[case::multigraph_42(Topology::Multigraph, 42)]
        #[case::multigraph_7777(Topology::Multigraph, 7777)]
        #[case::disconnected_42(Topology::Disconnected, 42)]
        #[case::disconnected_999(Topology::Disconnected, 999)]
        fn $test_name(#[case] topology: Topology, #[case] $seed: u64) {
            let $fixture = fixture(topology, $seed);
            ($body).expect($expectation);
        }
    };
}

proptest! {
    #![proptest_config(suite_proptest_config(128))]

    #[test]
    fn ghs_oracle_equivalence(fixture in fixture_strategy()) {
        run_oracle_equivalence_property(&fixture, Schedule::RoundRobin)?;
    }

    #[test]
    fn ghs_oracle_equivalence_shuffled(fixture in fixture_strategy(), seed in any::<u64>()) {
        run_oracle_equivalence_property(&fixture, Schedule::Shuffled { seed })?;
    }

    #[test]
    fn ghs_structural_invariants(fixture in fixture_strategy(), seed in any::<u64>()) {
        run_structural_invariants_property(&fixture, Schedule::Shuffled { seed })?;
    }

    #[test]
    fn ghs_schedule_independence(fixture in connected_fixture_strategy(), seed in any::<u64>()) {
        run_schedule_independence_property(&fixture, seed)?;
    }

    #[test]
    fn ghs_seeded_runs_replay(fixture in fixture_strategy(), seed in any::<u64>()) {
        run_determinism_property(&fixture, seed)?;
    }

    #[test]
    fn ghs_redelivery_is_harmless(fixture in fixture_strategy(), stride in 1_usize..5) {
        run_redelivery_property(&fixture, stride)?;
    }
}

#[cfg(feature = "threaded")]
proptest! {
    #![proptest_config(suite_proptest_config(32))]

    #[test]
    fn ghs_threaded_equivalence(fixture in connected_fixture_strategy()) {
        run_threaded_equivalence_property(&fixture)?;
    }
}

parameterised_property_test!(
    oracle_equivalence_rstest,
    |fixture, seed| run_oracle_equivalence_property(&fixture, Schedule::Shuffled { seed }),
    "oracle equivalence must hold"
);

parameterised_property_test!(
    structural_invariants_rstest,
    |fixture, seed| run_structural_invariants_property(&fixture, Schedule::Shuffled { seed }),
    "structural invariants must hold"
);

parameterised_property_test!(
    redelivery_rstest,
    |fixture, seed| run_redelivery_property(&fixture, usize::try_from(seed % 4).unwrap_or(1) + 1),
    "redelivery must be harmless"
);

// ========================================================================
// Oracle Unit Tests
// ========================================================================

fn assert_oracle(result: &SequentialMstResult, total: i128, edges: usize, components: usize) {
    assert_eq!(result.total_weight, total, "total weight");
    assert_eq!(result.edges.len(), edges, "edge count");
    assert_eq!(result.component_count, components, "component count");
}

#[test]
fn oracle_triangle() {
    let result = sequential_kruskal(&triples(&[(1, 2, 1), (2, 3, 2), (1, 3, 3)]));
    assert_oracle(&result, 3, 2, 1);
    assert_eq!(result.edges, [(1, 2, 1), (2, 3, 2)]);
}

#[test]
fn oracle_ignores_self_loops_and_keeps_lightest_parallel_edge() {
    let result = sequential_kruskal(&triples(&[(1, 1, -9), (2, 1, 4), (1, 2, 3)]));
    assert_oracle(&result, 3, 1, 1);
    assert_eq!(result.edges, [(1, 2, 3)]);
}

#[test]
fn oracle_disconnected_pairs() {
    let result = sequential_kruskal(&triples(&[(1, 2, 1), (3, 4, 2)]));
    assert_oracle(&result, 3, 2, 2);
}

#[test]
fn oracle_negative_weights() {
    let result = sequential_kruskal(&triples(&[(0, 1, -5), (1, 2, -7), (0, 2, -6)]));
    assert_oracle(&result, -13, 2, 1);
}

#[rstest::rstest]
#[case(Topology::Path)]
#[case(Topology::Star)]
#[case(Topology::Sparse)]
#[case(Topology::Dense)]
#[case(Topology::Multigraph)]
fn connected_topologies_have_one_component(#[case] topology: Topology) {
    for seed in [1, 2, 3] {
        let fixture = fixture(topology, seed);
        let result = sequential_kruskal(&fixture.edges);
        assert_eq!(result.component_count, 1, "{topology:?} seed {seed}");
        assert_eq!(result.edges.len(), fixture.node_count - 1);
    }
}

#[test]
fn generated_weights_are_distinct() {
    for seed in 0..16 {
        let fixture = fixture(Topology::Dense, seed);
        let mut weights: Vec<_> = fixture.edges.iter().map(|edge| edge.weight).collect();
        weights.sort_unstable();
        weights.dedup();
        assert_eq!(weights.len(), fixture.edges.len());
    }
}

#[test]
fn disconnected_topology_has_several_components() {
    let result = sequential_kruskal(&fixture(Topology::Disconnected, 5).edges);
    assert!(result.component_count >= 2);
}
