//! Expected points from a pair of expected-goals figures.

use serde::{Deserialize, Serialize};

use crate::domain::error::{check_max_goals, InvalidInput};
use crate::domain::Side;
use crate::scoregrid;
use crate::scoregrid::{MatchOutcomeProbs, DEFAULT_MAX_GOALS};

pub const WIN_POINTS: f64 = 3.0;
pub const DRAW_POINTS: f64 = 1.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchXp {
    pub home_xp: f64,
    pub away_xp: f64,
    pub probs: MatchOutcomeProbs,
}
impl MatchXp {
    pub fn from_probs(probs: MatchOutcomeProbs) -> Self {
        Self {
            home_xp: WIN_POINTS * probs.home_win + DRAW_POINTS * probs.draw,
            away_xp: WIN_POINTS * probs.away_win + DRAW_POINTS * probs.draw,
            probs,
        }
    }

    pub fn xp(&self, side: &Side) -> f64 {
        match side {
            Side::Home => self.home_xp,
            Side::Away => self.away_xp,
        }
    }
}

/// Stateless; one instance may be shared across threads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpCalculator {
    max_goals: u8,
}
impl XpCalculator {
    pub fn new(max_goals: u8) -> Result<Self, InvalidInput> {
        Ok(Self {
            max_goals: check_max_goals(max_goals)?,
        })
    }

    pub fn max_goals(&self) -> u8 {
        self.max_goals
    }

    pub fn outcome_probs(&self, home_xg: f64, away_xg: f64) -> Result<MatchOutcomeProbs, InvalidInput> {
        Ok(scoregrid::distribution(home_xg, away_xg, self.max_goals)?.outcome_probs())
    }

    pub fn compute(&self, home_xg: f64, away_xg: f64) -> Result<MatchXp, InvalidInput> {
        self.outcome_probs(home_xg, away_xg).map(MatchXp::from_probs)
    }

    /// Computes xP for a batch of xG pairs. Pairs with a missing side yield `None`; any
    /// invalid figure fails the whole batch.
    pub fn annotate(
        &self,
        pairs: impl IntoIterator<Item = (Option<f64>, Option<f64>)>,
    ) -> Result<Vec<Option<MatchXp>>, InvalidInput> {
        pairs
            .into_iter()
            .map(|pair| match pair {
                (Some(home_xg), Some(away_xg)) => self.compute(home_xg, away_xg).map(Some),
                _ => Ok(None),
            })
            .collect()
    }
}

impl Default for XpCalculator {
    fn default() -> Self {
        Self {
            max_goals: DEFAULT_MAX_GOALS,
        }
    }
}

/// Expected points under the default grid bound.
pub fn expected_points(home_xg: f64, away_xg: f64) -> Result<MatchXp, InvalidInput> {
    XpCalculator::default().compute(home_xg, away_xg)
}

#[cfg(test)]
mod tests {
    use std::thread;

    use assert_float_eq::*;
    use tinyrand::{Rand, StdRand};

    use super::*;

    #[test]
    fn worked_example() {
        let xp = expected_points(2.0, 1.0).unwrap();
        assert_float_absolute_eq!(2.028813458834282, xp.home_xp, 1e-12);
        assert_float_absolute_eq!(0.7594726961104789, xp.away_xp, 1e-12);
        assert_float_absolute_eq!(0.6056998712596812, xp.probs.home_win, 1e-12);
    }

    #[test]
    fn nil_nil() {
        let xp = expected_points(0.0, 0.0).unwrap();
        assert_float_absolute_eq!(1.0, xp.probs.draw, 1e-12);
        assert_float_absolute_eq!(1.0, xp.home_xp, 1e-12);
        assert_float_absolute_eq!(1.0, xp.away_xp, 1e-12);
    }

    #[test]
    fn equal_xg_gives_equal_xp() {
        let xp = expected_points(1.5, 1.5).unwrap();
        assert_float_absolute_eq!(1.3784996888428633, xp.home_xp, 1e-12);
        assert_float_absolute_eq!(xp.home_xp, xp.away_xp, 1e-12);
    }

    #[test]
    fn swapping_venues_swaps_roles() {
        let mut rand = StdRand::default();
        for _ in 0..500 {
            let a = rand.next_u64() as f64 / u64::MAX as f64 * 5.0;
            let b = rand.next_u64() as f64 / u64::MAX as f64 * 5.0;
            let forward = expected_points(a, b).unwrap();
            let reverse = expected_points(b, a).unwrap();
            assert_float_absolute_eq!(forward.home_xp, reverse.away_xp, 1e-12);
            assert_float_absolute_eq!(forward.away_xp, reverse.home_xp, 1e-12);
        }
    }

    #[test]
    fn bounded_by_zero_and_three() {
        for (home_xg, away_xg) in [(0.0, 6.0), (6.0, 0.0), (0.01, 0.01), (4.5, 4.4)] {
            let xp = expected_points(home_xg, away_xg).unwrap();
            for side in [Side::Home, Side::Away] {
                assert!((0.0..=3.0).contains(&xp.xp(&side)), "{side:?} xP {}", xp.xp(&side));
            }
        }
    }

    #[test]
    fn finite_for_extreme_xg() {
        for xg in [408.0, 500.0, 1e6] {
            let xp = expected_points(xg, xg).unwrap();
            assert_float_absolute_eq!(1.0, xp.probs.sum(), 1e-12);
            assert_float_absolute_eq!(xp.home_xp, xp.away_xp, 1e-12);
            assert!((0.0..=3.0).contains(&xp.home_xp), "xP {} for xG {xg}", xp.home_xp);
        }
    }

    #[test]
    fn home_xp_non_decreasing_in_home_xg() {
        let calculator = XpCalculator::default();
        let mut prev = calculator.compute(0.0, 1.1).unwrap().home_xp;
        for step in 1..=60 {
            let xp = calculator.compute(step as f64 * 0.1, 1.1).unwrap().home_xp;
            assert!(xp >= prev);
            prev = xp;
        }
    }

    #[test]
    fn rejects_invalid_xg() {
        assert!(matches!(
            expected_points(-1.0, 1.0),
            Err(InvalidInput::NegativeXg { side: Side::Home, .. })
        ));
        assert!(matches!(
            expected_points(1.0, f64::NAN),
            Err(InvalidInput::NonFiniteXg { side: Side::Away, .. })
        ));
    }

    #[test]
    fn rejects_zero_max_goals() {
        assert_eq!(Err(InvalidInput::MaxGoals(0)), XpCalculator::new(0));
        assert_eq!(1, XpCalculator::new(1).unwrap().max_goals());
        assert_eq!(DEFAULT_MAX_GOALS, XpCalculator::default().max_goals());
    }

    #[test]
    fn repeatable_across_threads() {
        let calculator = XpCalculator::default();
        let expected = calculator.compute(1.6, 0.9).unwrap();
        let handles = (0..4)
            .map(|_| thread::spawn(move || calculator.compute(1.6, 0.9).unwrap()))
            .collect::<Vec<_>>();
        for handle in handles {
            assert_eq!(expected, handle.join().unwrap());
        }
    }

    #[test]
    fn annotate_skips_missing_pairs() {
        let calculator = XpCalculator::default();
        let annotated = calculator
            .annotate([(Some(1.2), Some(0.8)), (None, Some(0.4)), (Some(0.8), Some(1.2))])
            .unwrap();
        assert_eq!(3, annotated.len());
        assert_float_absolute_eq!(1.6618241833840655, annotated[0].as_ref().unwrap().home_xp, 1e-12);
        assert!(annotated[1].is_none());
        assert_float_absolute_eq!(1.6618241833840655, annotated[2].as_ref().unwrap().away_xp, 1e-12);
    }

    #[test]
    fn annotate_fails_on_invalid_pair() {
        let calculator = XpCalculator::default();
        assert!(calculator.annotate([(Some(1.0), Some(1.0)), (Some(-0.2), Some(1.0))]).is_err());
    }
}
