//! Thread-per-node runtime.
//!
//! Every node runs on a scoped OS thread and blocks only on its own inbound
//! channel. Sends go straight into the neighbour's channel. Envelopes a node
//! cannot act on yet are parked locally and retried after each handled
//! envelope.
//!
//! A shared [`Coordinator`] counts envelopes in flight. A worker adds its
//! outgoing envelopes before retiring the one it processed, so the count
//! reaches zero only when no envelope is queued or being handled anywhere.
//! Parked envelopes left over at that point can never be handled.

use std::{
    collections::VecDeque,
    sync::{
        Condvar, Mutex, MutexGuard, PoisonError,
        mpsc::{self, Receiver, Sender},
    },
    thread,
};

use tracing::debug;

use super::RunStats;
use crate::{
    error::{GhsError, Result},
    graph::{Graph, NodeId},
    message::Envelope,
    node::{Context, Disposition, Node, Outbox, Outgoing, build_nodes},
    observer::{Observer, ProtocolEvent},
};

enum Signal {
    Deliver(Envelope),
    Shutdown,
}

#[derive(Debug, Default)]
struct Progress {
    in_flight: usize,
    parked: usize,
    delivered: usize,
    deferred: usize,
    duplicates: usize,
    failure: Option<GhsError>,
}

/// Work done by one worker while handling one inbound envelope.
#[derive(Debug, Default)]
struct Batch {
    outgoing: Vec<Outgoing>,
    handled: usize,
    deferred: usize,
    duplicates: usize,
}

struct Coordinator {
    progress: Mutex<Progress>,
    settled: Condvar,
    ceiling: usize,
}

impl Coordinator {
    fn new(ceiling: usize, in_flight: usize) -> Self {
        Self {
            progress: Mutex::new(Progress {
                in_flight,
                ..Progress::default()
            }),
            settled: Condvar::new(),
            ceiling,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Progress> {
        self.progress.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fail(&self, error: GhsError) {
        let mut progress = self.lock();
        progress.failure.get_or_insert(error);
        self.settled.notify_all();
    }

    /// Records a finished batch. Returns `false` once the run has failed.
    fn settle(&self, batch: &Batch, parked_before: usize, parked_after: usize) -> bool {
        let mut progress = self.lock();
        if progress.failure.is_some() {
            return false;
        }
        progress.in_flight = (progress.in_flight + batch.outgoing.len()).saturating_sub(1);
        progress.parked = (progress.parked + parked_after).saturating_sub(parked_before);
        progress.delivered += batch.handled;
        progress.deferred += batch.deferred;
        progress.duplicates += batch.duplicates;

        if progress.delivered >= self.ceiling && progress.in_flight > 0 {
            progress.failure = Some(GhsError::DeliveryCeilingExceeded {
                ceiling: self.ceiling,
            });
            self.settled.notify_all();
            return false;
        }
        if progress.in_flight == 0 {
            self.settled.notify_all();
        }
        true
    }

    fn wait(&self) {
        let mut progress = self.lock();
        while progress.in_flight > 0 && progress.failure.is_none() {
            progress = self
                .settled
                .wait(progress)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn into_progress(self) -> Progress {
        self.progress
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Forwards events from one worker to the caller's observer.
struct SharedObserver<'s, 'o, O>(&'s Mutex<&'o mut O>);

impl<O: Observer> Observer for SharedObserver<'_, '_, O> {
    fn observe(&mut self, event: &ProtocolEvent) {
        let mut inner = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        inner.observe(event);
    }
}

/// Runs every node on its own thread until the protocol quiesces.
///
/// Returns the final nodes in graph index order with the run counters.
pub(crate) fn run<O: Observer + Send>(
    graph: &Graph,
    ceiling: usize,
    observer: &mut O,
) -> Result<(Vec<Node>, RunStats)> {
    run_seeded(graph, ceiling, observer, &[])
}

/// Like [`run`], but also queues `seeded` envelopes behind the wake-ups.
///
/// # Errors
/// Returns [`GhsError::UnknownNode`] when a seeded envelope names a node
/// outside the graph.
fn run_seeded<O: Observer + Send>(
    graph: &Graph,
    ceiling: usize,
    observer: &mut O,
    seeded: &[(NodeId, Envelope)],
) -> Result<(Vec<Node>, RunStats)> {
    let nodes = build_nodes(graph);
    let ids: Vec<NodeId> = nodes.iter().map(Node::id).collect();
    let (senders, receivers): (Vec<_>, Vec<_>) =
        (0..nodes.len()).map(|_| mpsc::channel::<Signal>()).unzip();
    for (sender, &node) in senders.iter().zip(&ids) {
        sender
            .send(Signal::Deliver(Envelope::wakeup()))
            .map_err(|_| GhsError::WorkerPanicked { node })?;
    }
    for &(node, envelope) in seeded {
        let sender = graph
            .index_of(node)
            .and_then(|position| senders.get(position))
            .ok_or(GhsError::UnknownNode { node })?;
        sender
            .send(Signal::Deliver(envelope))
            .map_err(|_| GhsError::WorkerPanicked { node })?;
    }

    let coordinator = Coordinator::new(ceiling, nodes.len() + seeded.len());
    let shared = Mutex::new(observer);

    let joined = thread::scope(|scope| {
        let handles: Vec<_> = nodes
            .into_iter()
            .zip(receivers)
            .map(|(node, inbox)| {
                let id = node.id();
                let peers = senders.as_slice();
                let ids = ids.as_slice();
                let coordinator = &coordinator;
                let shared = &shared;
                let handle =
                    scope.spawn(move || work(node, &inbox, peers, ids, coordinator, shared));
                (id, handle)
            })
            .collect();

        coordinator.wait();
        for (sender, node) in senders.iter().zip(&ids) {
            if sender.send(Signal::Shutdown).is_err() {
                debug!(node = %node, "worker exited before shutdown");
            }
        }
        handles
            .into_iter()
            .map(|(node, handle)| {
                handle
                    .join()
                    .map_err(|_| GhsError::WorkerPanicked { node })
            })
            .collect::<Result<Vec<Node>>>()
    });

    let nodes = joined?;
    let progress = coordinator.into_progress();
    if let Some(error) = progress.failure {
        return Err(error);
    }
    if progress.parked > 0 {
        return Err(GhsError::Stalled {
            pending: progress.parked,
        });
    }
    let stats = RunStats {
        delivered: progress.delivered,
        deferred: progress.deferred,
        duplicates: progress.duplicates,
        halted_nodes: nodes.iter().filter(|node| node.is_halted()).count(),
    };
    Ok((nodes, stats))
}

fn work<O: Observer + Send>(
    mut node: Node,
    inbox: &Receiver<Signal>,
    peers: &[Sender<Signal>],
    ids: &[NodeId],
    coordinator: &Coordinator,
    observer: &Mutex<&mut O>,
) -> Node {
    let mut sink = SharedObserver(observer);
    let mut parked: VecDeque<Envelope> = VecDeque::new();
    let mut failed = false;

    while let Ok(Signal::Deliver(envelope)) = inbox.recv() {
        if failed {
            continue;
        }
        let before = parked.len();
        let batch = match process(&mut node, envelope, &mut parked, &mut sink) {
            Ok(batch) => batch,
            Err(error) => {
                coordinator.fail(error);
                failed = true;
                continue;
            }
        };
        if !coordinator.settle(&batch, before, parked.len()) {
            failed = true;
            continue;
        }
        for outgoing in batch.outgoing {
            let delivered = peers
                .get(outgoing.to)
                .is_some_and(|peer| peer.send(Signal::Deliver(outgoing.envelope)).is_ok());
            if !delivered {
                let peer = ids.get(outgoing.to).copied().unwrap_or(node.id());
                coordinator.fail(GhsError::WorkerPanicked { node: peer });
                failed = true;
                break;
            }
        }
    }

    debug!(node = %node.id(), parked = parked.len(), "worker finished");
    node
}

fn process(
    node: &mut Node,
    envelope: Envelope,
    parked: &mut VecDeque<Envelope>,
    observer: &mut dyn Observer,
) -> Result<Batch> {
    let mut outbox = Outbox::default();
    let mut batch = Batch::default();
    let disposition = {
        let mut cx = Context {
            outbox: &mut outbox,
            observer: &mut *observer,
        };
        node.deliver(envelope, &mut cx)?
    };
    match disposition {
        Disposition::Handled => {
            batch.handled += 1;
            retry_parked(node, parked, &mut outbox, observer, &mut batch)?;
        }
        Disposition::Deferred => {
            batch.deferred += 1;
            parked.push_back(envelope);
        }
        Disposition::Duplicate => batch.duplicates += 1,
    }
    batch.outgoing = outbox.drain().collect();
    Ok(batch)
}

/// Retries parked envelopes until a full pass handles none of them.
fn retry_parked(
    node: &mut Node,
    parked: &mut VecDeque<Envelope>,
    outbox: &mut Outbox,
    observer: &mut dyn Observer,
    batch: &mut Batch,
) -> Result<()> {
    loop {
        let mut progressed = false;
        for _ in 0..parked.len() {
            let Some(envelope) = parked.pop_front() else {
                break;
            };
            let mut cx = Context {
                outbox: &mut *outbox,
                observer: &mut *observer,
            };
            match node.deliver(envelope, &mut cx)? {
                Disposition::Handled => {
                    batch.handled += 1;
                    progressed = true;
                }
                Disposition::Deferred => {
                    batch.deferred += 1;
                    parked.push_back(envelope);
                }
                Disposition::Duplicate => batch.duplicates += 1,
            }
        }
        if !progressed {
            return Ok(());
        }
    }
}
