//! Command implementations and argument parsing for the `ghs` binary.

use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use ghs_core::{
    GhsBuilder, GhsError, GraphErrorCode, GraphSource, RunStats, Runtime, Schedule, SpanningTree,
    TracingObserver,
};
use ghs_providers_edge_list::{EdgeListError, EdgeListSource, render_tree};
use thiserror::Error;
use tracing::{Span, field, info, instrument, warn};

const DEFAULT_SEED: u64 = 0;

/// Top-level options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "ghs",
    about = "Compute a minimum spanning tree with the GHS distributed protocol."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Compute the minimum spanning tree of an edge-list file.
    Run(RunCommand),
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Edge list with one `node node weight` triple per line.
    pub path: PathBuf,

    /// Also write the result to this file.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Runtime driving the node state machines.
    #[arg(long, value_enum, default_value_t = RuntimeArg::Simulated)]
    pub runtime: RuntimeArg,

    /// Delivery order used by the simulated runtime.
    #[arg(long, value_enum, default_value_t = ScheduleArg::RoundRobin)]
    pub schedule: ScheduleArg,

    /// Seed for the shuffled schedule.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Maximum number of handled messages before the run is abandoned.
    #[arg(long = "max-deliveries", value_parser = clap::value_parser!(usize))]
    pub max_deliveries: Option<usize>,

    /// Override name for the graph (defaults to the file stem).
    #[arg(long)]
    pub name: Option<String>,
}

/// Runtime selection exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RuntimeArg {
    /// Deterministic single-threaded simulation.
    Simulated,
    /// One operating-system thread per node.
    Threaded,
}

impl From<RuntimeArg> for Runtime {
    fn from(value: RuntimeArg) -> Self {
        match value {
            RuntimeArg::Simulated => Self::Simulated,
            RuntimeArg::Threaded => Self::Threaded,
        }
    }
}

/// Schedule selection exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScheduleArg {
    /// Visit nodes in identifier order.
    RoundRobin,
    /// Pick a random node with pending messages at every step.
    Shuffled,
}

/// Errors surfaced while executing commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The input file could not be opened.
    #[error("failed to open `{path}`: {source}")]
    Open {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The result file could not be written.
    #[error("failed to write `{path}`: {source}")]
    Write {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The edge list could not be parsed.
    #[error(transparent)]
    EdgeList(#[from] EdgeListError),
    /// The protocol run failed.
    #[error(transparent)]
    Core(#[from] GhsError),
}

impl CliError {
    /// Returns a stable machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Open { .. } => "CLI_OPEN_FAILED",
            Self::Write { .. } => "CLI_WRITE_FAILED",
            Self::EdgeList(error) => error.code(),
            Self::Core(error) => error.code().as_str(),
        }
    }

    /// Returns the graph code when the protocol rejected its input.
    #[must_use]
    pub const fn graph_code(&self) -> Option<GraphErrorCode> {
        match self {
            Self::Core(error) => error.graph_code(),
            _ => None,
        }
    }
}

/// Outcome of a successful `run` command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Name of the graph that was solved.
    pub graph: String,
    /// Input lines that did not describe an edge.
    pub skipped_lines: usize,
    /// The computed minimum spanning tree.
    pub tree: SpanningTree,
    /// Message counters for the run.
    pub stats: RunStats,
}

/// Executes the command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when the input cannot be read, the protocol fails,
/// or the output file cannot be written.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use ghs_cli::cli::{Cli, Command, RunCommand, RuntimeArg, ScheduleArg, run_cli};
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(file.path(), "1 2 1\n2 3 2\n1 3 3\n")?;
/// let cli = Cli {
///     command: Command::Run(RunCommand {
///         path: file.path().to_path_buf(),
///         output: None,
///         runtime: RuntimeArg::Simulated,
///         schedule: ScheduleArg::RoundRobin,
///         seed: None,
///         max_deliveries: None,
///         name: None,
///     }),
/// };
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.tree.total_weight(), 3);
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(run) => {
            Span::current().record("command", field::display("run"));
            run_command(run)
        }
    }
}

#[instrument(
    name = "cli.execute",
    err,
    skip(command),
    fields(path = field::Empty, runtime = ?command.runtime, schedule = field::Empty),
)]
pub(super) fn run_command(command: RunCommand) -> Result<ExecutionSummary, CliError> {
    let span = Span::current();
    span.record("path", field::display(command.path.display()));
    let schedule = resolve_schedule(command.schedule, command.seed);
    span.record("schedule", field::debug(schedule));

    let mut builder = GhsBuilder::new()
        .with_runtime(command.runtime.into())
        .with_schedule(schedule);
    if let Some(ceiling) = command.max_deliveries {
        builder = builder.with_delivery_ceiling(ceiling);
    }
    let ghs = builder.build()?;

    let name = derive_graph_name(&command.path, command.name.as_deref());
    let reader = open_edge_list(&command.path)?;
    let source = EdgeListSource::try_from_reader(name, reader)?;
    if source.skipped_lines() > 0 {
        info!(
            skipped = source.skipped_lines(),
            "ignored lines that do not describe an edge"
        );
    }

    let report = ghs.run_with_observer(&source, &mut TracingObserver)?;
    let summary = ExecutionSummary {
        graph: source.name().to_owned(),
        skipped_lines: source.skipped_lines(),
        stats: report.stats(),
        tree: report.into_tree(),
    };

    if let Some(path) = &command.output {
        write_output(&summary, path)?;
    }
    info!(
        graph = summary.graph.as_str(),
        tree_edges = summary.tree.edges().len(),
        delivered = summary.stats.delivered,
        "command completed"
    );
    Ok(summary)
}

pub(super) fn resolve_schedule(schedule: ScheduleArg, seed: Option<u64>) -> Schedule {
    match schedule {
        ScheduleArg::RoundRobin => {
            if let Some(seed) = seed {
                warn!(seed, "--seed has no effect on the round-robin schedule");
            }
            Schedule::RoundRobin
        }
        ScheduleArg::Shuffled => Schedule::Shuffled {
            seed: seed.unwrap_or(DEFAULT_SEED),
        },
    }
}

#[instrument(name = "cli.open_edge_list", err, fields(path = field::Empty))]
pub(super) fn open_edge_list(path: &Path) -> Result<BufReader<File>, CliError> {
    Span::current().record("path", field::display(path.display()));
    let file = File::open(path).map_err(|source| CliError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

fn write_output(summary: &ExecutionSummary, path: &Path) -> Result<(), CliError> {
    let wrap = |source: io::Error| CliError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut rendered = Vec::new();
    render_summary(summary, &mut rendered).map_err(wrap)?;
    fs::write(path, rendered).map_err(wrap)
}

pub(super) fn derive_graph_name(path: &Path, override_name: Option<&str>) -> String {
    if let Some(name) = override_name {
        return name.to_owned();
    }

    path.file_stem()
        .and_then(|value| value.to_str())
        .map_or_else(|| "graph".to_owned(), ToOwned::to_owned)
}

/// Renders `summary` in the result text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to `writer` fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use ghs_cli::cli::{ExecutionSummary, render_summary};
/// # use ghs_core::{NodeId, RunStats, SpanningTree, TreeEdge};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let summary = ExecutionSummary {
///     graph: "demo".into(),
///     skipped_lines: 0,
///     tree: SpanningTree::from_edges(vec![TreeEdge::new(NodeId::new(1), NodeId::new(2), 7)], 2),
///     stats: RunStats::default(),
/// };
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// assert_eq!(
///     String::from_utf8(buffer)?,
///     "Edge (1, 2) with weight 7\nTotal weight of the MST: 7\n",
/// );
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    render_tree(&summary.tree, &mut writer)
}
