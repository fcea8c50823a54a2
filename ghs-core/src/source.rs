//! Graph source abstraction for the GHS runtime.

use crate::{error::GraphError, graph::WeightedEdge};

/// Supplies the weighted edges of an input graph.
///
/// # Examples
/// ```
/// use ghs_core::{GraphError, GraphSource, WeightedEdge};
///
/// struct Fixed(Vec<WeightedEdge>);
///
/// impl GraphSource for Fixed {
///     fn name(&self) -> &str { "fixed" }
///     fn edges(&self) -> Result<Vec<WeightedEdge>, GraphError> { Ok(self.0.clone()) }
/// }
///
/// let source = Fixed(vec![WeightedEdge::new(1, 2, 3)]);
/// assert_eq!(source.name(), "fixed");
/// assert_eq!(source.edges()?.len(), 1);
/// # Ok::<(), GraphError>(())
/// ```
pub trait GraphSource {
    /// Returns a human-readable name used in logs and errors.
    fn name(&self) -> &str;

    /// Returns every input triple in source order.
    ///
    /// # Errors
    /// Returns [`GraphError::Source`] when the edges cannot be produced.
    fn edges(&self) -> Result<Vec<WeightedEdge>, GraphError>;
}

impl GraphSource for [WeightedEdge] {
    fn name(&self) -> &str {
        "inline"
    }

    fn edges(&self) -> Result<Vec<WeightedEdge>, GraphError> {
        Ok(self.to_vec())
    }
}

impl GraphSource for Vec<WeightedEdge> {
    fn name(&self) -> &str {
        "inline"
    }

    fn edges(&self) -> Result<Vec<WeightedEdge>, GraphError> {
        Ok(self.clone())
    }
}
