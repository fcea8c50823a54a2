//! Support library for the `ghs` binary.
//!
//! Exposes the command pipeline and logging bootstrap so tests can drive
//! them without spawning a subprocess.

pub mod cli;
pub mod logging;
