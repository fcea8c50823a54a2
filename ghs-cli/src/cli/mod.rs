//! Command-line interface for computing minimum spanning trees.
//!
//! The `run` command loads a whitespace edge list, runs the GHS protocol on
//! the selected runtime, and prints the tree in the result text format.

mod commands;

pub use commands::{
    Cli, CliError, Command, ExecutionSummary, RunCommand, RuntimeArg, ScheduleArg,
    render_summary, run_cli,
};
