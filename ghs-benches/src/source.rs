//! Synthetic connected graphs for benchmarking.
//!
//! [`SyntheticGraph`] builds a random spanning tree over `node_count` nodes
//! and adds `extra_edges` random chords. Weights are a seeded permutation of
//! `1..=edges`, so they are always distinct.

use ghs_core::{GraphError, GraphSource, WeightedEdge};
use rand::{Rng, SeedableRng, rngs::SmallRng, seq::SliceRandom};

/// Errors that may occur during synthetic graph generation.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum SyntheticError {
    /// A graph needs at least two nodes to have an edge.
    #[error("node count must be at least 2 (got {got})")]
    TooFewNodes {
        /// The requested node count.
        got: usize,
    },
}

/// Configuration for synthetic graph generation.
#[derive(Clone, Debug)]
pub struct SyntheticConfig {
    /// Number of nodes.
    pub node_count: usize,
    /// Edges added on top of the spanning tree.
    pub extra_edges: usize,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

/// A seeded connected graph with distinct weights.
///
/// # Examples
///
/// ```
/// use ghs_benches::source::{SyntheticConfig, SyntheticGraph};
/// use ghs_core::GraphSource;
///
/// let config = SyntheticConfig { node_count: 10, extra_edges: 5, seed: 42 };
/// let graph = SyntheticGraph::generate(&config).expect("valid config");
/// assert_eq!(graph.edges().expect("edges").len(), 14);
/// ```
#[derive(Clone, Debug)]
pub struct SyntheticGraph {
    edges: Vec<WeightedEdge>,
}

impl SyntheticGraph {
    /// Generates the graph eagerly.
    ///
    /// # Errors
    ///
    /// Returns [`SyntheticError::TooFewNodes`] if `node_count < 2`.
    pub fn generate(config: &SyntheticConfig) -> Result<Self, SyntheticError> {
        if config.node_count < 2 {
            return Err(SyntheticError::TooFewNodes {
                got: config.node_count,
            });
        }
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let nodes = i64::try_from(config.node_count).unwrap_or(i64::MAX);

        let mut pairs = Vec::with_capacity(config.node_count - 1 + config.extra_edges);
        for node in 1..nodes {
            pairs.push((rng.gen_range(0..node), node));
        }
        while pairs.len() < config.node_count - 1 + config.extra_edges {
            let a = rng.gen_range(0..nodes);
            let b = rng.gen_range(0..nodes);
            if a != b {
                pairs.push((a, b));
            }
        }

        let mut weights: Vec<i64> = (1..).take(pairs.len()).collect();
        weights.shuffle(&mut rng);
        let edges = pairs
            .into_iter()
            .zip(weights)
            .map(|((a, b), weight)| WeightedEdge::new(a, b, weight))
            .collect();
        Ok(Self { edges })
    }

    /// Number of edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

impl GraphSource for SyntheticGraph {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn edges(&self) -> Result<Vec<WeightedEdge>, GraphError> {
        Ok(self.edges.clone())
    }
}
