//! Event sink for protocol activity.
//!
//! Nodes never print. Every send, delivery, deferral, state change, and edge
//! classification is reported to an [`Observer`] supplied by the caller.
//! [`TracingObserver`] forwards events to `tracing`; [`RecordingObserver`]
//! keeps them for assertions.

use tracing::{debug, trace};

use crate::{
    edge::{EdgeId, EdgeState, WeightBound},
    graph::NodeId,
    message::{Envelope, FragmentName, Level, Message, NodeState},
};

/// A single observable protocol event.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProtocolEvent {
    /// `from` queued `message` for `to` over `edge`.
    Sent {
        /// Sending node.
        from: NodeId,
        /// Receiving node.
        to: NodeId,
        /// Carrying edge.
        edge: EdgeId,
        /// Message sent.
        message: Message,
    },
    /// `node` handled `envelope`.
    Delivered {
        /// Receiving node.
        node: NodeId,
        /// The handled envelope.
        envelope: Envelope,
    },
    /// `node` could not act on `envelope` yet and parked it.
    Deferred {
        /// Receiving node.
        node: NodeId,
        /// The parked envelope.
        envelope: Envelope,
    },
    /// `node` received a copy of an envelope it had already handled.
    DuplicateDropped {
        /// Receiving node.
        node: NodeId,
        /// The discarded copy.
        envelope: Envelope,
    },
    /// `node` moved between protocol states.
    StateChanged {
        /// Affected node.
        node: NodeId,
        /// Previous state.
        from: NodeState,
        /// New state.
        to: NodeState,
    },
    /// `node` joined a fragment at a new level.
    LevelRaised {
        /// Affected node.
        node: NodeId,
        /// Previous level.
        from: Level,
        /// New level.
        to: Level,
        /// Fragment adopted at the new level.
        fragment: FragmentName,
    },
    /// `node` changed its local classification of `edge`.
    EdgeClassified {
        /// Node owning the view.
        node: NodeId,
        /// Affected edge.
        edge: EdgeId,
        /// Previous classification.
        from: EdgeState,
        /// New classification.
        to: EdgeState,
    },
    /// `node` learned that its fragment has no outgoing edge left.
    Halted {
        /// Fragment root that observed termination.
        node: NodeId,
        /// Final fragment name.
        fragment: Option<FragmentName>,
        /// The terminating report weight (always `+∞`).
        weight: WeightBound,
    },
}

/// Receives protocol events as they happen.
pub trait Observer {
    /// Called once per event, in the order events occur at a node.
    fn observe(&mut self, event: &ProtocolEvent);
}

impl<O: Observer + ?Sized> Observer for &mut O {
    fn observe(&mut self, event: &ProtocolEvent) {
        (**self).observe(event);
    }
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn observe(&mut self, _event: &ProtocolEvent) {}
}

/// Emits every event through `tracing`.
///
/// Message traffic is logged at `trace`; state, level, and classification
/// changes at `debug`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn observe(&mut self, event: &ProtocolEvent) {
        match event {
            ProtocolEvent::Sent {
                from,
                to,
                edge,
                message,
            } => trace!(
                from = %from,
                to = %to,
                edge = %edge,
                kind = %message.kind(),
                "message sent"
            ),
            ProtocolEvent::Delivered { node, envelope } => trace!(
                node = %node,
                kind = %envelope.message().kind(),
                "message handled"
            ),
            ProtocolEvent::Deferred { node, envelope } => trace!(
                node = %node,
                kind = %envelope.message().kind(),
                "message deferred"
            ),
            ProtocolEvent::DuplicateDropped { node, envelope } => debug!(
                node = %node,
                kind = %envelope.message().kind(),
                "duplicate message dropped"
            ),
            ProtocolEvent::StateChanged { node, from, to } => {
                debug!(node = %node, from = %from, to = %to, "node state changed");
            }
            ProtocolEvent::LevelRaised {
                node,
                from,
                to,
                fragment,
            } => debug!(
                node = %node,
                from = %from,
                to = %to,
                fragment = %fragment,
                "node joined fragment"
            ),
            ProtocolEvent::EdgeClassified {
                node,
                edge,
                from,
                to,
            } => debug!(
                node = %node,
                edge = %edge,
                from = %from,
                to = %to,
                "edge classified"
            ),
            ProtocolEvent::Halted { node, fragment, .. } => debug!(
                node = %node,
                fragment = ?fragment,
                "fragment has no outgoing edge"
            ),
        }
    }
}

/// Collects events in arrival order.
#[derive(Clone, Debug, Default)]
pub struct RecordingObserver {
    events: Vec<ProtocolEvent>,
}

impl RecordingObserver {
    /// Returns the recorded events.
    #[must_use]
    pub fn events(&self) -> &[ProtocolEvent] {
        &self.events
    }

    /// Consumes the recorder and returns its events.
    #[must_use]
    pub fn into_events(self) -> Vec<ProtocolEvent> {
        self.events
    }
}

impl Observer for RecordingObserver {
    fn observe(&mut self, event: &ProtocolEvent) {
        self.events.push(event.clone());
    }
}

/// Fans one event out to two observers.
#[derive(Debug, Default)]
pub struct Tee<A, B>(pub A, pub B);

impl<A: Observer, B: Observer> Observer for Tee<A, B> {
    fn observe(&mut self, event: &ProtocolEvent) {
        self.0.observe(event);
        self.1.observe(event);
    }
}
