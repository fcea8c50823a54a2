//! Property-based tests for the GHS protocol.
//!
//! Verifies the protocol against a sequential Kruskal oracle, validates the
//! quiescent state of every node, and checks that results do not depend on
//! the delivery schedule or on re-delivered messages.

mod equivalence;
mod helpers;
mod oracle;
mod schedules;
mod strategies;
mod structural;
#[cfg(test)]
mod tests;
mod types;
