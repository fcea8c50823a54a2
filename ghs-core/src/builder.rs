//! Builder utilities for configuring GHS runs.
//!
//! Exposes the runtime and schedule selection surface and the validation
//! performed before constructing [`Ghs`] instances.

use std::num::NonZeroUsize;

use crate::{Result, error::GhsError, ghs::Ghs, scheduler::Schedule};

/// Selects the executor that delivers protocol messages.
///
/// `Simulated` runs every node on the calling thread under a deterministic
/// [`Schedule`]. `Threaded` gives every node its own OS thread and is only
/// available when the `threaded` feature is enabled.
///
/// # Examples
/// ```
/// use ghs_core::Runtime;
///
/// assert_eq!(Runtime::default(), Runtime::Simulated);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Runtime {
    /// Deterministic single-threaded scheduler.
    #[default]
    Simulated,
    /// One OS thread per node.
    Threaded,
}

/// Configures and constructs [`Ghs`] instances.
///
/// # Examples
/// ```
/// use ghs_core::{GhsBuilder, Runtime, Schedule};
///
/// let ghs = GhsBuilder::new()
///     .with_schedule(Schedule::Shuffled { seed: 7 })
///     .with_delivery_ceiling(10_000)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(ghs.runtime(), Runtime::Simulated);
/// assert_eq!(ghs.delivery_ceiling().map(|c| c.get()), Some(10_000));
/// ```
#[derive(Clone, Debug, Default)]
pub struct GhsBuilder {
    runtime: Runtime,
    schedule: Schedule,
    delivery_ceiling: Option<usize>,
}

impl GhsBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use ghs_core::{GhsBuilder, Runtime, Schedule};
    ///
    /// let builder = GhsBuilder::new();
    /// assert_eq!(builder.runtime(), Runtime::Simulated);
    /// assert_eq!(builder.schedule(), Schedule::RoundRobin);
    /// assert_eq!(builder.delivery_ceiling(), None);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the runtime.
    #[must_use]
    pub fn with_runtime(mut self, runtime: Runtime) -> Self {
        self.runtime = runtime;
        self
    }

    /// Returns the configured runtime.
    #[must_use]
    pub fn runtime(&self) -> Runtime {
        self.runtime
    }

    /// Selects the visit order used by the simulated runtime.
    ///
    /// The threaded runtime ignores the schedule.
    #[must_use]
    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Returns the configured schedule.
    #[must_use]
    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    /// Overrides the number of handled messages after which a run is
    /// declared non-terminating.
    ///
    /// When unset the ceiling is derived from the graph size.
    ///
    /// # Examples
    /// ```
    /// use ghs_core::GhsBuilder;
    ///
    /// let builder = GhsBuilder::new().with_delivery_ceiling(500);
    /// assert_eq!(builder.delivery_ceiling(), Some(500));
    /// ```
    #[must_use]
    pub fn with_delivery_ceiling(mut self, ceiling: usize) -> Self {
        self.delivery_ceiling = Some(ceiling);
        self
    }

    /// Returns the explicit delivery ceiling, if one was set.
    #[must_use]
    pub fn delivery_ceiling(&self) -> Option<usize> {
        self.delivery_ceiling
    }

    /// Validates the configuration and constructs a [`Ghs`] instance.
    ///
    /// # Errors
    /// Returns [`GhsError::InvalidDeliveryCeiling`] when an explicit ceiling
    /// of zero was configured.
    ///
    /// # Examples
    /// ```
    /// use ghs_core::{GhsBuilder, GhsErrorCode};
    ///
    /// let err = GhsBuilder::new()
    ///     .with_delivery_ceiling(0)
    ///     .build()
    ///     .expect_err("zero ceiling is rejected");
    /// assert_eq!(err.code(), GhsErrorCode::InvalidDeliveryCeiling);
    /// ```
    pub fn build(self) -> Result<Ghs> {
        let delivery_ceiling = self
            .delivery_ceiling
            .map(|got| NonZeroUsize::new(got).ok_or(GhsError::InvalidDeliveryCeiling { got }))
            .transpose()?;
        Ok(Ghs::new(self.runtime, self.schedule, delivery_ceiling))
    }
}
