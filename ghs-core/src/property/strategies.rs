//! Strategy builders for GHS property-based tests.
//!
//! Every generator first decides which node pairs are joined and only then
//! assigns weights from a shuffled arithmetic progression, so weights are
//! always distinct. Node identifiers are shifted by a random offset so that
//! negative and non-contiguous identifiers are exercised.

use std::collections::BTreeSet;

use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::graph::WeightedEdge;

use super::types::{GraphFixture, Topology};

/// Minimum node count for generated graphs.
const MIN_NODES: usize = 2;
/// Maximum node count for generated graphs.
const MAX_NODES: usize = 40;
/// Maximum node count for dense graphs.
const DENSE_MAX_NODES: usize = 18;

/// Generates fixtures across every topology.
pub(super) fn fixture_strategy() -> impl Strategy<Value = GraphFixture> {
    (any::<Topology>(), any::<u64>()).prop_map(|(topology, seed)| {
        let mut rng = SmallRng::seed_from_u64(seed);
        generate_fixture(topology, &mut rng)
    })
}

/// Generates fixtures whose graphs are always connected.
pub(super) fn connected_fixture_strategy() -> impl Strategy<Value = GraphFixture> {
    fixture_strategy().prop_filter("graph must be connected", |fixture| {
        fixture.topology != Topology::Disconnected
    })
}

/// Generates a fixture for a specific topology.
pub(super) fn generate_fixture(topology: Topology, rng: &mut SmallRng) -> GraphFixture {
    let pairs = match topology {
        Topology::Path => path_pairs(rng),
        Topology::Star => star_pairs(rng),
        Topology::Sparse => sparse_pairs(rng),
        Topology::Dense => dense_pairs(rng),
        Topology::Multigraph => multigraph_pairs(rng),
        Topology::Disconnected => disconnected_pairs(rng),
    };
    let edges = weigh(pairs, rng);
    let node_count = edges
        .iter()
        .filter(|edge| edge.a != edge.b)
        .flat_map(|edge| [edge.a, edge.b])
        .collect::<BTreeSet<_>>()
        .len();
    GraphFixture {
        node_count,
        edges,
        topology,
    }
}

fn node_count(rng: &mut SmallRng, max: usize) -> usize {
    rng.gen_range(MIN_NODES..=max)
}

fn path_pairs(rng: &mut SmallRng) -> Vec<(usize, usize)> {
    let n = node_count(rng, MAX_NODES);
    let order = permutation(n, rng);
    order.windows(2).map(|pair| (pair[0], pair[1])).collect()
}

fn star_pairs(rng: &mut SmallRng) -> Vec<(usize, usize)> {
    let n = node_count(rng, MAX_NODES);
    let hub = rng.gen_range(0..n);
    (0..n).filter(|&leaf| leaf != hub).map(|leaf| (hub, leaf)).collect()
}

/// Random spanning tree over `0..n` built by attaching each node of a
/// random permutation to an earlier one.
fn random_tree(n: usize, rng: &mut SmallRng) -> Vec<(usize, usize)> {
    let order = permutation(n, rng);
    (1..n)
        .map(|position| {
            let parent = order[rng.gen_range(0..position)];
            (parent, order[position])
        })
        .collect()
}

fn sparse_pairs(rng: &mut SmallRng) -> Vec<(usize, usize)> {
    let n = node_count(rng, MAX_NODES);
    let mut pairs = random_tree(n, rng);
    let extra = rng.gen_range(0..=n);
    for _ in 0..extra {
        let a = rng.gen_range(0..n);
        let b = rng.gen_range(0..n);
        // Includes the occasional self-loop, which the graph ignores.
        pairs.push((a, b));
    }
    pairs
}

fn dense_pairs(rng: &mut SmallRng) -> Vec<(usize, usize)> {
    let n = node_count(rng, DENSE_MAX_NODES);
    let probability: f64 = rng.gen_range(0.6..=0.95);
    let mut pairs = random_tree(n, rng);
    for a in 0..n {
        for b in (a + 1)..n {
            if rng.gen_bool(probability) {
                pairs.push((a, b));
            }
        }
    }
    pairs
}

fn multigraph_pairs(rng: &mut SmallRng) -> Vec<(usize, usize)> {
    let n = node_count(rng, MAX_NODES);
    let tree = random_tree(n, rng);
    let mut pairs = tree.clone();
    for &(a, b) in &tree {
        if rng.gen_bool(0.4) {
            pairs.push((b, a));
        }
    }
    pairs
}

fn disconnected_pairs(rng: &mut SmallRng) -> Vec<(usize, usize)> {
    let components = rng.gen_range(2..=4);
    let mut pairs = Vec::new();
    let mut offset = 0;
    for _ in 0..components {
        let size = rng.gen_range(2..=10);
        pairs.extend(
            random_tree(size, rng)
                .into_iter()
                .map(|(a, b)| (a + offset, b + offset)),
        );
        offset += size;
    }
    pairs
}

/// Assigns distinct weights and shifted identifiers to node pairs.
fn weigh(pairs: Vec<(usize, usize)>, rng: &mut SmallRng) -> Vec<WeightedEdge> {
    let id_offset: i64 = rng.gen_range(-50..=50);
    let weight_offset: i64 = rng.gen_range(-500..=500);
    let stride: i64 = rng.gen_range(1..=7);
    let ranks = permutation(pairs.len(), rng);
    let id = |node: usize| i64::try_from(node).map_or(i64::MAX, |raw| raw + id_offset);

    pairs
        .into_iter()
        .zip(ranks)
        .map(|((a, b), rank)| {
            let rank = i64::try_from(rank).unwrap_or(i64::MAX);
            WeightedEdge::new(id(a), id(b), weight_offset + rank * stride)
        })
        .collect()
}

/// Fisher-Yates shuffle of `0..n`.
fn permutation(n: usize, rng: &mut SmallRng) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let j = rng.gen_range(0..=i);
        order.swap(i, j);
    }
    order
}
