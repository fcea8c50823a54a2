//! Benchmark support crate for GHS.
//!
//! Provides seeded synthetic graphs and parameter labels for the Criterion
//! benchmarks that drive both runtimes.

pub mod params;
pub mod source;
