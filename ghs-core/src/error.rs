//! Error types for the GHS core library.
//!
//! Defines error enums exposed by the public API and a convenient result alias.

use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::{
    builder::Runtime,
    edge::{EdgeId, EdgeState, Weight},
    graph::NodeId,
};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced while loading or validating an input graph.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GraphError {
    /// The input contained no usable edges.
    #[error("graph contains no edges")]
    Empty,
    /// Two edges share a weight; GHS needs globally distinct weights.
    #[error(
        "weight {weight} is used by both ({first_a}, {first_b}) and ({second_a}, {second_b})"
    )]
    DuplicateWeight {
        /// The repeated weight.
        weight: Weight,
        /// First endpoint of the earlier edge.
        first_a: NodeId,
        /// Second endpoint of the earlier edge.
        first_b: NodeId,
        /// First endpoint of the later edge.
        second_a: NodeId,
        /// Second endpoint of the later edge.
        second_b: NodeId,
    },
    /// The source could not produce its edges.
    #[error("graph source failed: {reason}")]
    Source {
        /// Human readable description supplied by the source.
        reason: Arc<str>,
    },
}

define_error_codes! {
    /// Stable codes describing [`GraphError`] variants.
    enum GraphErrorCode for GraphError {
        /// The input contained no usable edges.
        Empty => Empty => "GRAPH_EMPTY",
        /// Two edges share a weight.
        DuplicateWeight => DuplicateWeight { .. } => "GRAPH_DUPLICATE_WEIGHT",
        /// The source could not produce its edges.
        Source => Source { .. } => "GRAPH_SOURCE_FAILURE",
    }
}

/// Error type produced when constructing or running [`crate::Ghs`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GhsError {
    /// The delivery ceiling must be greater than zero.
    #[error("delivery ceiling must be at least 1 (got {got})")]
    InvalidDeliveryCeiling {
        /// The invalid ceiling supplied by the caller.
        got: usize,
    },
    /// The supplied graph could not be loaded.
    #[error("graph `{graph}` is invalid: {error}")]
    Graph {
        /// Identifier for the graph source.
        graph: Arc<str>,
        /// Underlying graph error.
        #[source]
        error: GraphError,
    },
    /// The requested runtime is unavailable in the current build.
    #[error("the requested runtime {requested:?} is not available in this build")]
    RuntimeUnavailable {
        /// Runtime that could not be satisfied by the current build.
        requested: Runtime,
    },
    /// A message or node referenced something outside the graph.
    #[error("node {node} has no link on edge {edge}")]
    UnknownLink {
        /// The node that received the message.
        node: NodeId,
        /// The edge the message claimed to arrive on.
        edge: EdgeId,
    },
    /// A node identifier was not part of the graph.
    #[error("node {node} is not part of the graph")]
    UnknownNode {
        /// The unknown identifier.
        node: NodeId,
    },
    /// A node observed a message or state that the protocol rules forbid.
    #[error("protocol violation at node {node}: {violation}")]
    ProtocolViolation {
        /// Node whose handler detected the violation.
        node: NodeId,
        /// Static description of the violated rule.
        violation: &'static str,
    },
    /// An edge classification attempted to move backwards.
    #[error("node {node} tried to reclassify edge {edge} from {from} to {to}")]
    ClassificationReverted {
        /// Node owning the local edge view.
        node: NodeId,
        /// The affected edge.
        edge: EdgeId,
        /// Classification before the attempted change.
        from: EdgeState,
        /// Requested classification.
        to: EdgeState,
    },
    /// The two endpoints of an edge disagree about its final classification.
    #[error("edge {edge} ended as {left} at one endpoint and {right} at the other")]
    ClassificationMismatch {
        /// The affected edge.
        edge: EdgeId,
        /// Classification at the first endpoint.
        left: EdgeState,
        /// Classification at the second endpoint.
        right: EdgeState,
    },
    /// Every pending message is blocked and nothing else can unblock it.
    #[error("protocol stalled with {pending} deferred messages and no progress")]
    Stalled {
        /// Messages still parked when the stall was detected.
        pending: usize,
    },
    /// The run handled more messages than the configured ceiling allows.
    #[error("protocol did not terminate within {ceiling} handled messages")]
    DeliveryCeilingExceeded {
        /// The ceiling that was exceeded.
        ceiling: usize,
    },
    /// The protocol quiesced with more than one fragment.
    #[error("graph is not connected: {fragments} fragments remain at quiescence")]
    NotConnected {
        /// Number of disjoint fragments left when the run went quiet.
        fragments: usize,
    },
    /// A node worker thread could not be joined.
    #[error("node worker for {node} panicked")]
    WorkerPanicked {
        /// Node whose worker panicked.
        node: NodeId,
    },
}

define_error_codes! {
    /// Stable codes describing [`GhsError`] variants.
    enum GhsErrorCode for GhsError {
        /// The delivery ceiling must be greater than zero.
        InvalidDeliveryCeiling => InvalidDeliveryCeiling { .. } => "GHS_INVALID_DELIVERY_CEILING",
        /// The supplied graph could not be loaded.
        GraphFailure => Graph { .. } => "GHS_GRAPH_FAILURE",
        /// The requested runtime is unavailable in the current build.
        RuntimeUnavailable => RuntimeUnavailable { .. } => "GHS_RUNTIME_UNAVAILABLE",
        /// A message referenced a link the node does not have.
        UnknownLink => UnknownLink { .. } => "GHS_UNKNOWN_LINK",
        /// A node identifier was not part of the graph.
        UnknownNode => UnknownNode { .. } => "GHS_UNKNOWN_NODE",
        /// A protocol rule was violated.
        ProtocolViolation => ProtocolViolation { .. } => "GHS_PROTOCOL_VIOLATION",
        /// An edge classification attempted to move backwards.
        ClassificationReverted => ClassificationReverted { .. } => "GHS_CLASSIFICATION_REVERTED",
        /// Endpoints disagree about an edge's final classification.
        ClassificationMismatch => ClassificationMismatch { .. } => "GHS_CLASSIFICATION_MISMATCH",
        /// Every pending message is blocked.
        Stalled => Stalled { .. } => "GHS_STALLED",
        /// The delivery ceiling was exceeded.
        DeliveryCeilingExceeded => DeliveryCeilingExceeded { .. } => "GHS_DELIVERY_CEILING_EXCEEDED",
        /// The graph is not connected.
        NotConnected => NotConnected { .. } => "GHS_GRAPH_NOT_CONNECTED",
        /// A node worker thread panicked.
        WorkerPanicked => WorkerPanicked { .. } => "GHS_WORKER_PANICKED",
    }
}

impl GhsError {
    /// Retrieve the inner [`GraphErrorCode`] when the error originated in graph loading.
    pub const fn graph_code(&self) -> Option<GraphErrorCode> {
        match self {
            Self::Graph { error, .. } => Some(error.code()),
            _ => None,
        }
    }

    /// Returns `true` when the error signals that the protocol never reached a
    /// spanning configuration.
    #[must_use]
    pub const fn is_non_termination(&self) -> bool {
        matches!(
            self,
            Self::Stalled { .. } | Self::DeliveryCeilingExceeded { .. } | Self::NotConnected { .. }
        )
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, GhsError>;
