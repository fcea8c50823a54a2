//! Orchestration for computing minimum spanning trees with GHS.
//!
//! Provides the [`Ghs`] entry point: it loads a [`GraphSource`], runs the
//! protocol on the configured runtime, and assembles the resulting tree.

use std::{num::NonZeroUsize, sync::Arc};

use tracing::{info, instrument};

use crate::{
    Result,
    builder::Runtime,
    error::{GhsError, GraphError},
    graph::Graph,
    node::Node,
    observer::{Observer, TracingObserver},
    scheduler::{RunStats, Schedule, SchedulerConfig, Simulation, default_delivery_ceiling},
    source::GraphSource,
    tree::{ClassifiedEdge, SpanningTree, extract},
};

/// A finished run: the tree and the counters describing how it was reached.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunReport {
    tree: SpanningTree,
    classifications: Vec<ClassifiedEdge>,
    stats: RunStats,
}

impl RunReport {
    /// Returns the computed spanning tree.
    #[must_use]
    pub fn tree(&self) -> &SpanningTree {
        &self.tree
    }

    /// Returns the final classification of every graph edge, in input order.
    ///
    /// Every edge of a completed run is either
    /// [`EdgeState::Branch`](crate::EdgeState::Branch) or
    /// [`EdgeState::Rejected`](crate::EdgeState::Rejected).
    #[must_use]
    pub fn classifications(&self) -> &[ClassifiedEdge] {
        &self.classifications
    }

    /// Returns the message counters.
    #[must_use]
    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Consumes the report and returns the tree.
    #[must_use]
    pub fn into_tree(self) -> SpanningTree {
        self.tree
    }
}

/// Entry point for running the distributed MST protocol.
///
/// # Examples
/// ```
/// use ghs_core::{GhsBuilder, WeightedEdge};
///
/// let edges = vec![
///     WeightedEdge::new(1, 2, 1),
///     WeightedEdge::new(2, 3, 2),
///     WeightedEdge::new(1, 3, 3),
/// ];
/// let ghs = GhsBuilder::new().build().expect("builder must succeed");
/// let tree = ghs.run(&edges).expect("run must succeed");
/// assert_eq!(tree.edges().len(), 2);
/// assert_eq!(tree.total_weight(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct Ghs {
    runtime: Runtime,
    schedule: Schedule,
    delivery_ceiling: Option<NonZeroUsize>,
}

impl Ghs {
    pub(crate) const fn new(
        runtime: Runtime,
        schedule: Schedule,
        delivery_ceiling: Option<NonZeroUsize>,
    ) -> Self {
        Self {
            runtime,
            schedule,
            delivery_ceiling,
        }
    }

    /// Returns the runtime used by [`Self::run`].
    #[must_use]
    pub fn runtime(&self) -> Runtime {
        self.runtime
    }

    /// Returns the schedule used by the simulated runtime.
    #[must_use]
    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    /// Returns the explicit delivery ceiling, if one was configured.
    #[must_use]
    pub fn delivery_ceiling(&self) -> Option<NonZeroUsize> {
        self.delivery_ceiling
    }

    /// Computes the minimum spanning tree of the graph supplied by `source`,
    /// forwarding protocol events to `tracing`.
    ///
    /// # Errors
    /// Returns [`GhsError::Graph`] when the source fails or its graph is
    /// invalid, [`GhsError::NotConnected`] when the graph has more than one
    /// component, [`GhsError::Stalled`] or
    /// [`GhsError::DeliveryCeilingExceeded`] when the protocol does not
    /// terminate, and [`GhsError::RuntimeUnavailable`] when the requested
    /// runtime is not compiled in.
    pub fn run<S: GraphSource + ?Sized>(&self, source: &S) -> Result<SpanningTree> {
        self.run_with_observer(source, &mut TracingObserver)
            .map(RunReport::into_tree)
    }

    /// Computes the minimum spanning tree and reports every protocol event to
    /// `observer`.
    ///
    /// # Errors
    /// Fails under the same conditions as [`Self::run`].
    ///
    /// # Examples
    /// ```
    /// use ghs_core::{GhsBuilder, ProtocolEvent, RecordingObserver, WeightedEdge};
    ///
    /// let edges = vec![WeightedEdge::new(1, 2, 4)];
    /// let mut observer = RecordingObserver::default();
    /// let report = GhsBuilder::new()
    ///     .build()?
    ///     .run_with_observer(&edges, &mut observer)?;
    /// assert_eq!(report.stats().halted_nodes, 2);
    /// assert!(observer
    ///     .events()
    ///     .iter()
    ///     .any(|event| matches!(event, ProtocolEvent::Halted { .. })));
    /// # Ok::<(), ghs_core::GhsError>(())
    /// ```
    #[instrument(
        name = "core.run",
        err,
        skip(self, source, observer),
        fields(
            graph_source = %source.name(),
            runtime = ?self.runtime,
            schedule = ?self.schedule,
        ),
    )]
    pub fn run_with_observer<S, O>(&self, source: &S, observer: &mut O) -> Result<RunReport>
    where
        S: GraphSource + ?Sized,
        O: Observer + Send,
    {
        let graph = load_graph(source)?;
        let ceiling = self.delivery_ceiling.map_or_else(
            || default_delivery_ceiling(graph.node_count(), graph.edge_count()),
            NonZeroUsize::get,
        );
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            ceiling,
            "graph loaded"
        );

        let (nodes, stats) = match self.runtime {
            Runtime::Simulated => self.simulate(&graph, ceiling, observer)?,
            #[cfg(feature = "threaded")]
            Runtime::Threaded => run_threads(&graph, ceiling, observer)?,
            #[cfg(not(feature = "threaded"))]
            Runtime::Threaded => {
                return Err(GhsError::RuntimeUnavailable {
                    requested: Runtime::Threaded,
                });
            }
        };
        record_run(&stats);

        let (tree, classifications) = extract(&graph, &nodes)?;
        info!(
            tree_edges = tree.edges().len(),
            total_weight = %tree.total_weight(),
            delivered = stats.delivered,
            deferred = stats.deferred,
            "spanning tree assembled"
        );
        Ok(RunReport {
            tree,
            classifications,
            stats,
        })
    }

    #[instrument(
        name = "core.simulate",
        skip_all,
        fields(nodes = graph.node_count(), schedule = ?self.schedule),
    )]
    fn simulate<O: Observer>(
        &self,
        graph: &Graph,
        ceiling: usize,
        observer: &mut O,
    ) -> Result<(Vec<Node>, RunStats)> {
        let mut simulation = Simulation::new(
            graph,
            SchedulerConfig {
                schedule: self.schedule,
                delivery_ceiling: ceiling,
            },
        );
        simulation.wake_all();
        let stats = simulation.run(observer)?;
        Ok((simulation.into_nodes(), stats))
    }
}

#[cfg(feature = "threaded")]
#[instrument(name = "core.threaded", skip_all, fields(nodes = graph.node_count()))]
fn run_threads<O: Observer + Send>(
    graph: &Graph,
    ceiling: usize,
    observer: &mut O,
) -> Result<(Vec<Node>, RunStats)> {
    crate::scheduler::threaded::run(graph, ceiling, observer)
}

fn load_graph<S: GraphSource + ?Sized>(source: &S) -> Result<Graph> {
    let wrap = |error: GraphError| GhsError::Graph {
        graph: Arc::from(source.name()),
        error,
    };
    let edges = source.edges().map_err(wrap)?;
    Graph::from_edges(edges).map_err(wrap)
}

#[cfg(feature = "metrics")]
fn record_run(stats: &RunStats) {
    let count = |value: usize| u64::try_from(value).unwrap_or(u64::MAX);
    metrics::counter!("ghs_messages_delivered").increment(count(stats.delivered));
    metrics::counter!("ghs_messages_deferred").increment(count(stats.deferred));
    metrics::counter!("ghs_messages_duplicate").increment(count(stats.duplicates));
    metrics::counter!("ghs_runs_completed").increment(1);
}

#[cfg(not(feature = "metrics"))]
fn record_run(_stats: &RunStats) {}
