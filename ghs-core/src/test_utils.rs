//! Shared test utilities for `ghs-core`.

use ghs_test_support::ci::property_test_profile::ProptestRunProfile;
use proptest::test_runner::Config as ProptestConfig;

use crate::graph::WeightedEdge;

/// Builds a standard proptest configuration from the shared CI profile.
///
/// This keeps property suites aligned on the same `PROGTEST_CASES` and
/// `GHS_PBT_FORK` interpretation.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// Converts `(a, b, weight)` triples into input edges.
pub(crate) fn triples(raw: &[(i64, i64, i64)]) -> Vec<WeightedEdge> {
    raw.iter()
        .map(|&(a, b, weight)| WeightedEdge::new(a, b, weight))
        .collect()
}
