use assert_float_eq::*;
use tinyrand::{Rand, StdRand};

use super::*;
use crate::testing::assert_outcome_probs;

fn create_test_4x4_scoregrid() -> Matrix<f64> {
    let mut scoregrid = Matrix::allocate(4, 4);
    scoregrid
        .row_slice_mut(0)
        .copy_from_slice(&[0.04, 0.03, 0.02, 0.01]);
    scoregrid
        .row_slice_mut(1)
        .copy_from_slice(&[0.08, 0.06, 0.04, 0.02]);
    scoregrid
        .row_slice_mut(2)
        .copy_from_slice(&[0.12, 0.09, 0.06, 0.03]);
    scoregrid
        .row_slice_mut(3)
        .copy_from_slice(&[0.16, 0.12, 0.08, 0.04]);
    scoregrid
}

fn random_xg(rand: &mut impl Rand, max: f64) -> f64 {
    rand.next_u64() as f64 / u64::MAX as f64 * max
}

#[test]
pub fn outcome_win_gather() {
    let scoregrid = create_test_4x4_scoregrid();
    assert_float_absolute_eq!(0.65, Outcome::Win(Side::Home).gather(&scoregrid), 1e-12);
    assert_float_absolute_eq!(0.15, Outcome::Win(Side::Away).gather(&scoregrid), 1e-12);
}

#[test]
pub fn outcome_draw_gather() {
    let scoregrid = create_test_4x4_scoregrid();
    assert_float_absolute_eq!(0.2, Outcome::Draw.gather(&scoregrid), 1e-12);
}

#[test]
pub fn outcome_correct_score_gather() {
    let scoregrid = create_test_4x4_scoregrid();
    assert_eq!(0.04, Outcome::CorrectScore(Score::new(0, 0)).gather(&scoregrid));
    assert_eq!(0.08, Outcome::CorrectScore(Score::new(3, 2)).gather(&scoregrid));
    assert_eq!(0.0, Outcome::CorrectScore(Score::new(4, 0)).gather(&scoregrid));
}

#[test]
pub fn univariate_poisson_cells() {
    let mut scoregrid = Matrix::allocate(3, 3);
    let scale = from_univariate_poisson(1.0, 2.5, &mut scoregrid).exp();
    assert_eq!(1.0, scoregrid[(1, 2)]);
    assert_float_relative_eq!(0.36787944117144233 * 0.0820849986238988, scoregrid[(0, 0)] * scale);
    assert_float_relative_eq!(0.18393972058572117 * 0.205212496559747, scoregrid[(2, 1)] * scale);
    assert_float_relative_eq!(0.36787944117144233 * 0.25651562069968376, scoregrid[(1, 2)] * scale);
}

#[test]
pub fn worked_example() {
    let distribution = distribution(2.0, 1.0, 10).unwrap();
    assert_outcome_probs(
        [0.6056998712596812, 0.21171384505523885, 0.18258628368508],
        &distribution.outcome_probs(),
        1e-12,
    );
    assert_float_absolute_eq!(0.9999916817279486, distribution.enumerated_mass(), 1e-12);
    assert_float_absolute_eq!(8.3182720514e-6, distribution.truncated_mass(), 1e-12);
}

#[test]
pub fn renormalisation_corrects_coarse_truncation() {
    // with a single goal per side the grid holds under a third of the mass
    let distribution = distribution(2.0, 1.0, 1).unwrap();
    assert_float_absolute_eq!(0.2987224102071837, distribution.enumerated_mass(), 1e-12);
    let probs = distribution.outcome_probs();
    assert_outcome_probs([1.0 / 3.0, 0.5, 1.0 / 6.0], &probs, 1e-12);
    assert_float_absolute_eq!(1.0, probs.sum(), 1e-12);
}

#[test]
pub fn probabilities_sum_to_one() {
    let mut rand = StdRand::default();
    for max_goals in [1, 2, 5, 10, 20] {
        for _ in 0..200 {
            let home_xg = random_xg(&mut rand, 6.0);
            let away_xg = random_xg(&mut rand, 6.0);
            let probs = distribution(home_xg, away_xg, max_goals)
                .unwrap()
                .outcome_probs();
            assert_float_absolute_eq!(1.0, probs.sum(), 1e-9);
            assert!(probs.home_win >= 0.0 && probs.draw >= 0.0 && probs.away_win >= 0.0);
        }
    }
}

#[test]
pub fn zero_xg_for_one_side() {
    let distribution = distribution(0.0, 1.2, 10).unwrap();
    let probs = distribution.outcome_probs();
    assert_eq!(0.0, probs.home_win);
    assert_float_absolute_eq!(0.30119423065738127, probs.draw, 1e-12);
    assert_float_absolute_eq!(0.6988057693426186, probs.away_win, 1e-12);
    for away_goals in 0..=10 {
        assert_eq!(0.0, distribution.grid()[(1, away_goals)]);
    }
}

#[test]
pub fn zero_xg_for_both_sides() {
    let distribution = distribution(0.0, 0.0, 10).unwrap();
    assert_eq!(1.0, distribution.enumerated_mass());
    let probs = distribution.outcome_probs();
    assert_eq!(1.0, probs.draw);
    assert_eq!(0.0, probs.home_win);
    assert_eq!(0.0, probs.away_win);
    assert_eq!(Score::nil_all(), distribution.most_likely());
}

#[test]
pub fn rejects_negative_xg() {
    assert_eq!(
        Err(InvalidInput::NegativeXg {
            side: Side::Home,
            value: -0.5
        }),
        distribution(-0.5, 1.0, 10)
    );
    assert_eq!(
        Err(InvalidInput::NegativeXg {
            side: Side::Away,
            value: -0.01
        }),
        distribution(1.0, -0.01, 10)
    );
}

#[test]
pub fn rejects_non_finite_xg() {
    assert!(matches!(
        distribution(f64::NAN, 1.0, 10),
        Err(InvalidInput::NonFiniteXg { side: Side::Home, .. })
    ));
    assert!(matches!(
        distribution(1.0, f64::INFINITY, 10),
        Err(InvalidInput::NonFiniteXg { side: Side::Away, .. })
    ));
}

#[test]
pub fn rejects_zero_max_goals() {
    assert_eq!(Err(InvalidInput::MaxGoals(0)), distribution(1.0, 1.0, 0));
}

#[test]
pub fn large_xg_stays_normalised() {
    for (home_xg, away_xg) in [(408.0, 408.0), (500.0, 500.0), (1000.0, 1.0), (0.5, 1e6), (1e300, 1e300)] {
        let distribution = distribution(home_xg, away_xg, 10).unwrap();
        let probs = distribution.outcome_probs();
        assert_float_absolute_eq!(1.0, probs.sum(), 1e-12);
        for prob in [probs.home_win, probs.draw, probs.away_win] {
            assert!((0.0..=1.0).contains(&prob), "{prob} for xG {home_xg}:{away_xg}");
        }
        assert!((0.0..=1.0).contains(&distribution.enumerated_mass()));
    }

    // both sides pile up against the bound, so the (10, 10) cell dominates
    let probs = distribution(500.0, 500.0, 10).unwrap().outcome_probs();
    assert!(probs.draw > 0.9);
    assert_float_absolute_eq!(probs.home_win, probs.away_win, 1e-12);
    let distribution = distribution(1000.0, 1.0, 10).unwrap();
    assert_float_absolute_eq!(1.0, distribution.outcome_probs().home_win, 1e-6);
    assert_eq!(Score::new(10, 0), distribution.most_likely());
    assert_eq!(0.0, distribution.enumerated_mass());
}

#[test]
pub fn monotonic_in_home_xg() {
    let mut prev = distribution(0.0, 1.3, 10).unwrap().outcome_probs();
    for step in 1..=40 {
        let home_xg = step as f64 * 0.1;
        let probs = distribution(home_xg, 1.3, 10).unwrap().outcome_probs();
        assert!(
            probs.home_win > prev.home_win,
            "P(home_win) did not increase at home_xg={home_xg}"
        );
        assert!(probs.away_win < prev.away_win);
        prev = probs;
    }
}

#[test]
pub fn most_likely_and_expectations() {
    assert_eq!(Score::new(2, 0), distribution(2.6, 0.7, 10).unwrap().most_likely());

    // (1, 0), (1, 1), (2, 0) and (2, 1) carry identical mass here
    let distribution = distribution(2.0, 1.0, 10).unwrap();
    assert_eq!(Score::new(1, 0), distribution.most_likely());
    let (home, away) = distribution.expectations();
    assert_float_absolute_eq!(2.0, home, 1e-3);
    assert_float_absolute_eq!(1.0, away, 1e-3);
    assert_float_relative_eq!(
        distribution.grid()[(2, 1)] / distribution.grid().flatten().sum(),
        distribution.probability(&Outcome::CorrectScore(Score::new(2, 1)))
    );
    assert_float_absolute_eq!(
        0.0,
        distribution.probability(&Outcome::CorrectScore(Score::new(2, 1)))
            - 2.0 * (-2.0f64).exp() * (-1.0f64).exp() / distribution.enumerated_mass(),
        1e-12
    );
}

#[test]
pub fn accessors() {
    let distribution = distribution(1.4, 0.6, 6).unwrap();
    assert_eq!(1.4, distribution.home_xg());
    assert_eq!(0.6, distribution.away_xg());
    assert_eq!(6, distribution.max_goals());
    assert_eq!(7, distribution.grid().rows());
    assert_eq!(7, distribution.grid().cols());
}
