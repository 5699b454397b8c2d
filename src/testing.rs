//! Assertions shared by unit tests.

use assert_float_eq::*;

use crate::scoregrid::MatchOutcomeProbs;

/// Pairs up the elements of two slices of equal length, skipping those that are bit-identical.
fn differing<'a>(expected: &'a [f64], actual: &'a [f64]) -> impl Iterator<Item = (f64, f64)> + 'a {
    assert_eq!(expected.len(), actual.len(), "slice lengths differ");
    expected
        .iter()
        .zip(actual)
        .map(|(&expected, &actual)| (expected, actual))
        .filter(|(expected, actual)| expected != actual)
}

/// Element-wise comparison within `distance` ULPs.
pub fn assert_slice_f64_near(expected: &[f64], actual: &[f64], distance: u32) {
    for (expected, actual) in differing(expected, actual) {
        assert_f64_near!(expected, actual, distance);
    }
}

/// Element-wise comparison within a relative `epsilon`.
pub fn assert_slice_f64_relative(expected: &[f64], actual: &[f64], epsilon: f64) {
    for (expected, actual) in differing(expected, actual) {
        assert_float_relative_eq!(expected, actual, epsilon);
    }
}

/// Compares home win, draw and away win in turn, within an absolute `epsilon`.
pub fn assert_outcome_probs(expected: [f64; 3], actual: &MatchOutcomeProbs, epsilon: f64) {
    assert_float_absolute_eq!(expected[0], actual.home_win, epsilon);
    assert_float_absolute_eq!(expected[1], actual.draw, epsilon);
    assert_float_absolute_eq!(expected[2], actual.away_win, epsilon);
}
