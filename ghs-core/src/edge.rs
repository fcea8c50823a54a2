//! Edge identity, weights, and classification.
//!
//! Weights are globally distinct integers. A weight also serves as the name of
//! the fragment founded across that edge, so [`WeightBound`] extends weights
//! with the `+∞` sentinel used while searching for a minimum outgoing edge.

use std::fmt;

use crate::graph::NodeId;

/// Integer edge weight; unique across a graph.
pub type Weight = i64;

/// Dense index of an edge within a [`crate::Graph`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EdgeId(usize);

impl EdgeId {
    /// Wraps a raw edge index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// A weight or the `+∞` sentinel.
///
/// `Infinite` orders above every finite weight, so the derived ordering is
/// the one the minimum-outgoing-edge search needs.
///
/// # Examples
/// ```
/// use ghs_core::WeightBound;
///
/// assert!(WeightBound::Finite(i64::MAX) < WeightBound::Infinite);
/// assert!(WeightBound::Finite(-3) < WeightBound::Finite(2));
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum WeightBound {
    /// A concrete edge weight.
    Finite(Weight),
    /// No candidate edge exists.
    Infinite,
}

impl WeightBound {
    /// Returns `true` for the `+∞` sentinel.
    #[must_use]
    pub const fn is_infinite(self) -> bool {
        matches!(self, Self::Infinite)
    }
}

impl From<Weight> for WeightBound {
    fn from(weight: Weight) -> Self {
        Self::Finite(weight)
    }
}

impl fmt::Display for WeightBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(weight) => write!(f, "{weight}"),
            Self::Infinite => f.write_str("inf"),
        }
    }
}

/// Classification of an edge as seen by one endpoint.
///
/// Transitions are monotone: `Basic` may become `Branch` or `Rejected`, and
/// neither of those ever changes again.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum EdgeState {
    /// Not yet known to be inside or outside the tree.
    #[default]
    Basic,
    /// Confirmed tree edge.
    Branch,
    /// Confirmed non-tree edge.
    Rejected,
}

impl EdgeState {
    /// Returns `true` when moving from `self` to `next` respects monotonicity.
    ///
    /// Re-asserting the current classification is allowed.
    #[must_use]
    pub const fn can_become(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Basic, _) | (Self::Branch, Self::Branch) | (Self::Rejected, Self::Rejected)
        )
    }

    /// Returns the symbolic name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "BASIC",
            Self::Branch => "BRANCH",
            Self::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for EdgeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An undirected weighted edge between two graph nodes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Edge {
    id: EdgeId,
    a: NodeId,
    b: NodeId,
    weight: Weight,
}

impl Edge {
    pub(crate) const fn new(id: EdgeId, a: NodeId, b: NodeId, weight: Weight) -> Self {
        Self { id, a, b, weight }
    }

    /// Returns the edge identifier.
    #[must_use]
    pub const fn id(&self) -> EdgeId {
        self.id
    }

    /// Returns the first endpoint as supplied by the input.
    #[must_use]
    pub const fn a(&self) -> NodeId {
        self.a
    }

    /// Returns the second endpoint as supplied by the input.
    #[must_use]
    pub const fn b(&self) -> NodeId {
        self.b
    }

    /// Returns the edge weight.
    #[must_use]
    pub const fn weight(&self) -> Weight {
        self.weight
    }

    /// Returns the endpoint opposite `node`, or `None` if `node` is not an
    /// endpoint.
    #[must_use]
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if node == self.a {
            Some(self.b)
        } else if node == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}
