//! Per-node GHS state machine.
//!
//! A [`Node`] knows only its incident edges. It keeps its own classification
//! of each edge (a [`Link`]), reacts to one [`Envelope`] at a time, and
//! places outgoing messages in an [`Outbox`] that the runtime routes to the
//! neighbours. Nodes never read or write another node's state, so the same
//! state machine runs unchanged under the deterministic simulation and the
//! threaded runtime.
//!
//! Re-delivered envelopes are recognised by their `(edge, sequence)` key and
//! dropped without touching state. Envelopes the node cannot act on yet are
//! reported as [`Disposition::Deferred`] and the runtime parks them for a
//! later retry.

mod handlers;

use std::collections::{HashMap, HashSet};

use crate::{
    edge::{EdgeId, EdgeState, Weight, WeightBound},
    error::{GhsError, Result},
    graph::{Graph, NodeId},
    message::{Envelope, FragmentName, Level, Message, NodeState, Origin},
    observer::{Observer, ProtocolEvent},
};

/// What a node did with a delivered envelope.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Disposition {
    /// The envelope was processed.
    Handled,
    /// The node cannot act yet; the envelope must be retried later.
    Deferred,
    /// The envelope was a copy of one already handled and was ignored.
    Duplicate,
}

/// A message addressed to a neighbour, waiting to be routed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Outgoing {
    pub(crate) to: usize,
    pub(crate) envelope: Envelope,
}

/// Messages produced while handling one envelope, in send order.
#[derive(Debug, Default)]
pub(crate) struct Outbox {
    pending: Vec<Outgoing>,
}

impl Outbox {
    fn push(&mut self, outgoing: Outgoing) {
        self.pending.push(outgoing);
    }

    pub(crate) fn drain(&mut self) -> std::vec::Drain<'_, Outgoing> {
        self.pending.drain(..)
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }
}

/// Borrowed collaborators a node needs while handling an envelope.
pub(crate) struct Context<'a> {
    pub(crate) outbox: &'a mut Outbox,
    pub(crate) observer: &'a mut dyn Observer,
}

/// A node's private view of one incident edge.
#[derive(Clone, Debug)]
struct Link {
    edge: EdgeId,
    peer: usize,
    peer_id: NodeId,
    weight: Weight,
    state: EdgeState,
    next_sequence: u64,
}

/// Outcome of a single protocol handler.
enum Handling {
    Done,
    Defer,
}

/// One participant in the distributed protocol.
#[derive(Clone, Debug)]
pub struct Node {
    id: NodeId,
    links: Vec<Link>,
    slots: HashMap<EdgeId, usize>,
    state: NodeState,
    level: Level,
    fragment: Option<FragmentName>,
    find_count: usize,
    in_branch: Option<usize>,
    best_link: Option<usize>,
    best_weight: WeightBound,
    test_link: Option<usize>,
    handled: HashSet<(EdgeId, u64)>,
    halted: bool,
}

impl Node {
    fn new(id: NodeId, mut links: Vec<Link>) -> Self {
        links.sort_by_key(|link| link.weight);
        let slots = links
            .iter()
            .enumerate()
            .map(|(slot, link)| (link.edge, slot))
            .collect();
        Self {
            id,
            links,
            slots,
            state: NodeState::Sleeping,
            level: Level::ZERO,
            fragment: None,
            find_count: 0,
            in_branch: None,
            best_link: None,
            best_weight: WeightBound::Infinite,
            test_link: None,
            handled: HashSet::new(),
            halted: false,
        }
    }

    /// Returns the node identifier.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the current protocol state.
    #[must_use]
    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Returns the current fragment level.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Returns the current fragment name, if the node has joined a named fragment.
    #[must_use]
    pub fn fragment(&self) -> Option<FragmentName> {
        self.fragment
    }

    /// Returns the number of child reports still awaited.
    #[must_use]
    pub fn find_count(&self) -> usize {
        self.find_count
    }

    /// Returns the best candidate weight found by this node's subtree.
    #[must_use]
    pub fn best_weight(&self) -> WeightBound {
        self.best_weight
    }

    /// Returns `true` once this node has observed that its fragment spans
    /// its whole component.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Returns the edge toward the fragment root.
    #[must_use]
    pub fn in_branch(&self) -> Option<EdgeId> {
        self.edge_at(self.in_branch)
    }

    /// Returns the edge leading to the best candidate.
    #[must_use]
    pub fn best_edge(&self) -> Option<EdgeId> {
        self.edge_at(self.best_link)
    }

    /// Returns the edge currently under test.
    #[must_use]
    pub fn test_edge(&self) -> Option<EdgeId> {
        self.edge_at(self.test_link)
    }

    /// Returns this node's classification of `edge`.
    #[must_use]
    pub fn edge_state(&self, edge: EdgeId) -> Option<EdgeState> {
        self.slots
            .get(&edge)
            .and_then(|&slot| self.links.get(slot))
            .map(|link| link.state)
    }

    /// Iterates over `(edge, classification)` for every incident edge in
    /// ascending weight order.
    pub fn classifications(&self) -> impl Iterator<Item = (EdgeId, EdgeState)> + '_ {
        self.links.iter().map(|link| (link.edge, link.state))
    }

    fn edge_at(&self, slot: Option<usize>) -> Option<EdgeId> {
        slot.and_then(|slot| self.links.get(slot)).map(|link| link.edge)
    }

    /// Handles one envelope.
    ///
    /// # Errors
    /// Returns [`GhsError::UnknownLink`] when the envelope names an edge this
    /// node is not incident to, and [`GhsError::ProtocolViolation`] or
    /// [`GhsError::ClassificationReverted`] when a protocol rule is broken.
    pub(crate) fn deliver(
        &mut self,
        envelope: Envelope,
        cx: &mut Context<'_>,
    ) -> Result<Disposition> {
        let handling = match envelope.origin() {
            None => self.dispatch_local(envelope.message(), cx)?,
            Some(origin) => {
                if self.handled.contains(&(origin.edge, origin.sequence)) {
                    cx.observer.observe(&ProtocolEvent::DuplicateDropped {
                        node: self.id,
                        envelope,
                    });
                    return Ok(Disposition::Duplicate);
                }
                let handling = self.dispatch_remote(origin, envelope.message(), cx)?;
                if matches!(handling, Handling::Done) {
                    self.handled.insert((origin.edge, origin.sequence));
                }
                handling
            }
        };

        match handling {
            Handling::Done => {
                cx.observer.observe(&ProtocolEvent::Delivered {
                    node: self.id,
                    envelope,
                });
                Ok(Disposition::Handled)
            }
            Handling::Defer => {
                cx.observer.observe(&ProtocolEvent::Deferred {
                    node: self.id,
                    envelope,
                });
                Ok(Disposition::Deferred)
            }
        }
    }

    fn dispatch_local(&mut self, message: Message, cx: &mut Context<'_>) -> Result<Handling> {
        match message {
            Message::Wakeup => {
                self.ensure_awake(cx)?;
                Ok(Handling::Done)
            }
            _ => Err(self.violation("only WAKEUP may arrive without an edge")),
        }
    }

    fn dispatch_remote(
        &mut self,
        origin: Origin,
        message: Message,
        cx: &mut Context<'_>,
    ) -> Result<Handling> {
        let slot = self.slot_of(origin.edge)?;
        match message {
            Message::Wakeup => Err(self.violation("WAKEUP must not travel over an edge")),
            Message::Connect { level } => self.process_connect(slot, level, cx),
            Message::Initiate {
                level,
                fragment,
                state,
            } => self.process_initiate(slot, level, fragment, state, cx),
            Message::Test { level, fragment } => self.process_test(slot, level, fragment, cx),
            Message::Accept => self.process_accept(slot, cx),
            Message::Reject => self.process_reject(slot, cx),
            Message::Report { weight } => self.process_report(slot, weight, cx),
            Message::ChangeRoot => self.process_change_root(cx),
        }
    }

    fn slot_of(&self, edge: EdgeId) -> Result<usize> {
        self.slots.get(&edge).copied().ok_or(GhsError::UnknownLink {
            node: self.id,
            edge,
        })
    }

    fn link(&self, slot: usize) -> Result<&Link> {
        self.links
            .get(slot)
            .ok_or_else(|| self.violation("link slot out of range"))
    }

    const fn violation(&self, violation: &'static str) -> GhsError {
        GhsError::ProtocolViolation {
            node: self.id,
            violation,
        }
    }

    fn send(&mut self, slot: usize, message: Message, cx: &mut Context<'_>) -> Result<()> {
        let sender = self.id;
        let Some(link) = self.links.get_mut(slot) else {
            return Err(self.violation("link slot out of range"));
        };
        let origin = Origin {
            edge: link.edge,
            sender,
            sequence: link.next_sequence,
        };
        link.next_sequence = link.next_sequence.saturating_add(1);
        cx.observer.observe(&ProtocolEvent::Sent {
            from: sender,
            to: link.peer_id,
            edge: link.edge,
            message,
        });
        cx.outbox.push(Outgoing {
            to: link.peer,
            envelope: Envelope::sent(origin, message),
        });
        Ok(())
    }

    fn classify(&mut self, slot: usize, to: EdgeState, cx: &mut Context<'_>) -> Result<()> {
        let node = self.id;
        let Some(link) = self.links.get_mut(slot) else {
            return Err(self.violation("link slot out of range"));
        };
        let from = link.state;
        if from == to {
            return Ok(());
        }
        if !from.can_become(to) {
            return Err(GhsError::ClassificationReverted {
                node,
                edge: link.edge,
                from,
                to,
            });
        }
        link.state = to;
        cx.observer.observe(&ProtocolEvent::EdgeClassified {
            node,
            edge: link.edge,
            from,
            to,
        });
        Ok(())
    }

    fn set_state(&mut self, to: NodeState, cx: &mut Context<'_>) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        cx.observer.observe(&ProtocolEvent::StateChanged {
            node: self.id,
            from,
            to,
        });
    }
}

/// Builds one [`Node`] per graph node, in graph index order.
pub(crate) fn build_nodes(graph: &Graph) -> Vec<Node> {
    graph
        .nodes()
        .iter()
        .enumerate()
        .map(|(index, &id)| {
            let links = graph
                .incident(index)
                .iter()
                .filter_map(|&edge| link_for(graph, index, edge))
                .collect();
            Node::new(id, links)
        })
        .collect()
}

fn link_for(graph: &Graph, index: usize, edge: EdgeId) -> Option<Link> {
    let (left, right) = graph.endpoints(edge)?;
    let peer = if left == index { right } else { left };
    Some(Link {
        edge,
        peer,
        peer_id: *graph.nodes().get(peer)?,
        weight: graph.edge(edge)?.weight(),
        state: EdgeState::Basic,
        next_sequence: 0,
    })
}
