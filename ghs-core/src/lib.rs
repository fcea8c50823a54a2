//! GHS core library.
//!
//! Computes the minimum spanning tree of an undirected graph with distinct
//! edge weights by running the Gallager-Humblet-Spira protocol: every node is
//! an independent state machine that only exchanges messages with its
//! neighbours. Runs are driven either by a deterministic [`Simulation`] or,
//! with the `threaded` feature, by one OS thread per node.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod edge;
mod error;
mod ghs;
mod graph;
mod message;
mod node;
mod observer;
mod scheduler;
mod source;
mod tree;
mod union_find;

#[cfg(test)]
mod property;
#[cfg(test)]
mod test_utils;

pub use crate::{
    builder::{GhsBuilder, Runtime},
    edge::{Edge, EdgeId, EdgeState, Weight, WeightBound},
    error::{GhsError, GhsErrorCode, GraphError, GraphErrorCode, Result},
    ghs::{Ghs, RunReport},
    graph::{Graph, NodeId, WeightedEdge},
    message::{Envelope, FragmentName, Level, Message, MessageKind, NodeState, Origin},
    node::{Disposition, Node},
    observer::{NoopObserver, Observer, ProtocolEvent, RecordingObserver, Tee, TracingObserver},
    scheduler::{RunStats, Schedule, SchedulerConfig, Simulation, Step, default_delivery_ceiling},
    source::GraphSource,
    tree::{ClassifiedEdge, SpanningTree, TreeEdge},
};
