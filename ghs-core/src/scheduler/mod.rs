//! Deterministic single-threaded message scheduler.
//!
//! The [`Simulation`] owns every [`Node`] and one FIFO inbox per node. Each
//! [`Simulation::step`] pops one envelope, delivers it, and routes whatever
//! the node sent into the neighbours' inboxes. Per-node FIFO inboxes keep
//! every directed edge in FIFO order. Deferred envelopes go back to the tail
//! of their inbox and stay pending.
//!
//! The run fails instead of spinning when no pending envelope can make
//! progress, or when the number of handled envelopes exceeds the configured
//! ceiling.

mod active;
#[cfg(feature = "threaded")]
pub(crate) mod threaded;

use std::collections::{HashMap, VecDeque};

use rand::{SeedableRng, rngs::SmallRng};

use self::active::ActiveSet;
use crate::{
    error::{GhsError, Result},
    graph::{Graph, NodeId},
    message::Envelope,
    node::{Context, Disposition, Node, Outbox, build_nodes},
    observer::Observer,
};

/// Order in which the simulation visits nodes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Schedule {
    /// Visit nodes in ascending id order; each visit drains the envelopes
    /// queued at the start of the visit.
    #[default]
    RoundRobin,
    /// Each step picks a uniformly random node with pending envelopes.
    Shuffled {
        /// Seed for the step-selection generator.
        seed: u64,
    },
}

/// Scheduler settings.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SchedulerConfig {
    /// Visit order.
    pub schedule: Schedule,
    /// Maximum number of handled envelopes before the run is abandoned.
    pub delivery_ceiling: usize,
}

impl SchedulerConfig {
    /// Builds a configuration with the default ceiling for `graph`.
    #[must_use]
    pub fn for_graph(graph: &Graph, schedule: Schedule) -> Self {
        Self {
            schedule,
            delivery_ceiling: default_delivery_ceiling(graph.node_count(), graph.edge_count()),
        }
    }
}

/// Default handled-message ceiling for a graph with `nodes` nodes and
/// `edges` edges.
///
/// GHS needs at most `5 n log2 n + 2 e` messages; the ceiling leaves an
/// eightfold margin plus a constant for tiny graphs.
///
/// # Examples
/// ```
/// use ghs_core::default_delivery_ceiling;
///
/// assert_eq!(default_delivery_ceiling(1, 0), 64);
/// assert_eq!(default_delivery_ceiling(4, 3), 8 * (5 * 4 * 2 + 6) + 64);
/// ```
#[must_use]
pub fn default_delivery_ceiling(nodes: usize, edges: usize) -> usize {
    let log = if nodes > 1 {
        (usize::BITS - (nodes - 1).leading_zeros()) as usize
    } else {
        0
    };
    nodes
        .saturating_mul(log)
        .saturating_mul(5)
        .saturating_add(edges.saturating_mul(2))
        .saturating_mul(8)
        .saturating_add(64)
}

/// Counters describing a finished run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RunStats {
    /// Envelopes handled, wake-ups included.
    pub delivered: usize,
    /// Times an envelope was parked for a retry.
    pub deferred: usize,
    /// Re-delivered envelopes that were dropped.
    pub duplicates: usize,
    /// Nodes that observed their fragment was complete.
    pub halted_nodes: usize,
}

/// One executed scheduling step.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Step {
    /// Node that received the envelope.
    pub node: NodeId,
    /// The envelope delivered.
    pub envelope: Envelope,
    /// What the node did with it.
    pub disposition: Disposition,
}

#[derive(Debug)]
enum Cursor {
    RoundRobin { next: usize, current: usize, budget: usize },
    Shuffled { rng: SmallRng },
}

/// Deterministic executor for the protocol.
///
/// # Examples
/// ```
/// use ghs_core::{Graph, NoopObserver, Schedule, SchedulerConfig, Simulation, WeightedEdge};
///
/// let graph = Graph::from_edges([WeightedEdge::new(1, 2, 3), WeightedEdge::new(2, 3, 1)])?;
/// let mut simulation = Simulation::new(&graph, SchedulerConfig::for_graph(&graph, Schedule::RoundRobin));
/// simulation.wake_all();
/// let stats = simulation.run(&mut NoopObserver)?;
/// assert_eq!(stats.halted_nodes, 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Simulation {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
    inboxes: Vec<VecDeque<Envelope>>,
    active: ActiveSet,
    cursor: Cursor,
    ceiling: usize,
    pending: usize,
    epoch: u64,
    stale: usize,
    stats: RunStats,
}

impl Simulation {
    /// Creates a simulation with one sleeping node per graph node.
    #[must_use]
    pub fn new(graph: &Graph, config: SchedulerConfig) -> Self {
        let nodes = build_nodes(graph);
        let index = nodes
            .iter()
            .enumerate()
            .map(|(position, node)| (node.id(), position))
            .collect();
        let cursor = match config.schedule {
            Schedule::RoundRobin => Cursor::RoundRobin {
                next: 0,
                current: 0,
                budget: 0,
            },
            Schedule::Shuffled { seed } => Cursor::Shuffled {
                rng: SmallRng::seed_from_u64(seed),
            },
        };
        Self {
            inboxes: vec![VecDeque::new(); nodes.len()],
            active: ActiveSet::with_capacity(nodes.len()),
            nodes,
            index,
            cursor,
            ceiling: config.delivery_ceiling,
            pending: 0,
            epoch: 0,
            stale: 0,
            stats: RunStats::default(),
        }
    }

    /// Queues `envelope` for `node`.
    ///
    /// # Errors
    /// Returns [`GhsError::UnknownNode`] when `node` is not in the graph.
    pub fn inject(&mut self, node: NodeId, envelope: Envelope) -> Result<()> {
        let position = self
            .index
            .get(&node)
            .copied()
            .ok_or(GhsError::UnknownNode { node })?;
        self.enqueue(position, envelope);
        Ok(())
    }

    /// Queues a wake-up for every node.
    pub fn wake_all(&mut self) {
        for position in 0..self.nodes.len() {
            self.enqueue(position, Envelope::wakeup());
        }
    }

    /// Returns the number of queued envelopes, deferred ones included.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Returns the nodes in ascending id order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Consumes the simulation and returns its nodes.
    #[must_use]
    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    /// Returns the counters accumulated so far.
    #[must_use]
    pub fn stats(&self) -> RunStats {
        RunStats {
            halted_nodes: self.nodes.iter().filter(|node| node.is_halted()).count(),
            ..self.stats
        }
    }

    /// Delivers one envelope.
    ///
    /// Returns `Ok(None)` once nothing is pending.
    ///
    /// # Errors
    /// Returns [`GhsError::Stalled`] when every pending envelope has been
    /// deferred since the last handled one, [`GhsError::DeliveryCeilingExceeded`]
    /// when the ceiling is reached with work still pending, and any error a
    /// node raises while handling the envelope.
    pub fn step<O: Observer>(&mut self, observer: &mut O) -> Result<Option<Step>> {
        if self.pending == 0 {
            return Ok(None);
        }
        if self.stale == self.pending {
            return Err(GhsError::Stalled {
                pending: self.pending,
            });
        }
        if self.stats.delivered >= self.ceiling {
            return Err(GhsError::DeliveryCeilingExceeded {
                ceiling: self.ceiling,
            });
        }

        let (position, envelope) = self.pop().ok_or(GhsError::Stalled {
            pending: self.pending,
        })?;
        if envelope.deferred_at() == Some(self.epoch) {
            self.stale = self.stale.saturating_sub(1);
        }

        let mut outbox = Outbox::default();
        let node = self
            .nodes
            .get_mut(position)
            .ok_or(GhsError::Stalled { pending: self.pending })?;
        let id = node.id();
        let disposition = {
            let mut cx = Context {
                outbox: &mut outbox,
                observer,
            };
            node.deliver(envelope, &mut cx)?
        };

        let produced = outbox.len();
        for outgoing in outbox.drain() {
            self.enqueue(outgoing.to, outgoing.envelope);
        }

        match disposition {
            Disposition::Handled => {
                self.stats.delivered += 1;
                self.advance_epoch();
            }
            Disposition::Deferred => {
                self.stats.deferred += 1;
                if produced > 0 {
                    self.advance_epoch();
                }
                self.enqueue(position, envelope.defer(self.epoch));
                self.stale += 1;
            }
            Disposition::Duplicate => self.stats.duplicates += 1,
        }

        Ok(Some(Step {
            node: id,
            envelope,
            disposition,
        }))
    }

    /// Steps until nothing is pending.
    ///
    /// # Errors
    /// Propagates the first error returned by [`Self::step`].
    pub fn run<O: Observer>(&mut self, observer: &mut O) -> Result<RunStats> {
        while self.step(observer)?.is_some() {}
        Ok(self.stats())
    }

    fn advance_epoch(&mut self) {
        self.epoch += 1;
        self.stale = 0;
    }

    fn enqueue(&mut self, position: usize, envelope: Envelope) {
        if let Some(inbox) = self.inboxes.get_mut(position) {
            inbox.push_back(envelope);
            self.active.insert(position);
            self.pending += 1;
        }
    }

    fn pop(&mut self) -> Option<(usize, Envelope)> {
        let position = self.next_position()?;
        let inbox = self.inboxes.get_mut(position)?;
        let envelope = inbox.pop_front()?;
        if inbox.is_empty() {
            self.active.remove(position);
        }
        self.pending -= 1;
        Some((position, envelope))
    }

    fn next_position(&mut self) -> Option<usize> {
        match &mut self.cursor {
            Cursor::Shuffled { rng } => self.active.pick(rng),
            Cursor::RoundRobin {
                next,
                current,
                budget,
            } => {
                if *budget == 0 {
                    let count = self.inboxes.len();
                    let (position, queued) = (0..count)
                        .map(|offset| (*next + offset) % count)
                        .find_map(|position| {
                            self.inboxes
                                .get(position)
                                .filter(|inbox| !inbox.is_empty())
                                .map(|inbox| (position, inbox.len()))
                        })?;
                    *current = position;
                    *next = (position + 1) % count;
                    *budget = queued;
                }
                *budget -= 1;
                Some(*current)
            }
        }
    }
}
