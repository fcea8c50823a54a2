//! Shared graph sources for integration tests.

use std::sync::Arc;

use ghs_core::{GraphError, GraphSource, WeightedEdge};

/// In-memory source with a configurable name.
#[derive(Clone, Debug)]
pub struct Fixed {
    name: &'static str,
    edges: Vec<WeightedEdge>,
}

impl Fixed {
    pub fn new(name: &'static str, triples: &[(i64, i64, i64)]) -> Self {
        Self {
            name,
            edges: triples
                .iter()
                .map(|&(a, b, weight)| WeightedEdge::new(a, b, weight))
                .collect(),
        }
    }
}

impl GraphSource for Fixed {
    fn name(&self) -> &str {
        self.name
    }

    fn edges(&self) -> Result<Vec<WeightedEdge>, GraphError> {
        Ok(self.edges.clone())
    }
}

/// Source whose edges can never be read.
#[derive(Clone, Copy, Debug)]
pub struct Unreadable;

impl GraphSource for Unreadable {
    fn name(&self) -> &str {
        "unreadable"
    }

    fn edges(&self) -> Result<Vec<WeightedEdge>, GraphError> {
        Err(GraphError::Source {
            reason: Arc::from("device not ready"),
        })
    }
}
