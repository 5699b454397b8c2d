//! The scoreline model: a grid of joint probabilities over `(home_goals, away_goals)` under
//! independent Poisson goal counts, and the outcome probabilities gathered from it.
//!
//! The grid is truncated at `max_goals` per side. Everything beyond it is not enumerated;
//! instead, outcome probabilities are renormalised by the enumerated mass so that they sum
//! to exactly one. Cells are held as weights relative to the modal scoreline; their sum is
//! at least one however large the xG.

use serde::{Deserialize, Serialize};

use crate::domain::error::{check_max_goals, check_xg, InvalidInput};
use crate::domain::{Score, Side};
use crate::linear::Matrix;
use crate::poisson;
use crate::probs::SliceExt;

pub const DEFAULT_MAX_GOALS: u8 = 10;

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Outcome {
    Win(Side),
    Draw,
    CorrectScore(Score),
}
impl Outcome {
    /// Raw (unnormalised) mass of this outcome within the grid.
    pub fn gather(&self, scoregrid: &Matrix<f64>) -> f64 {
        match self {
            Outcome::Win(side) => Self::gather_win(side, scoregrid),
            Outcome::Draw => Self::gather_draw(scoregrid),
            Outcome::CorrectScore(score) => Self::gather_correct_score(score, scoregrid),
        }
    }

    fn gather_win(side: &Side, scoregrid: &Matrix<f64>) -> f64 {
        let mut prob = 0.0;
        match side {
            Side::Home => {
                for row in 1..scoregrid.rows() {
                    for col in 0..usize::min(row, scoregrid.cols()) {
                        prob += scoregrid[(row, col)];
                    }
                }
            }
            Side::Away => {
                for col in 1..scoregrid.cols() {
                    for row in 0..usize::min(col, scoregrid.rows()) {
                        prob += scoregrid[(row, col)];
                    }
                }
            }
        }
        prob
    }

    fn gather_draw(scoregrid: &Matrix<f64>) -> f64 {
        let mut prob = 0.0;
        for index in 0..usize::min(scoregrid.rows(), scoregrid.cols()) {
            prob += scoregrid[(index, index)];
        }
        prob
    }

    fn gather_correct_score(score: &Score, scoregrid: &Matrix<f64>) -> f64 {
        if (score.home as usize) < scoregrid.rows() && (score.away as usize) < scoregrid.cols() {
            scoregrid[(score.home as usize, score.away as usize)]
        } else {
            0.0
        }
    }
}

/// Fills `scoregrid` with weights proportional to the product of two independent Poisson
/// distributions; rows are home goals and columns are away goals. Each marginal is scaled so
/// that its modal cell is one, hence the grid always holds a cell of weight one.
///
/// Returns the natural log of the scaling factor, such that `weight * exp(ln_scale)` is the
/// raw probability of a cell.
pub fn from_univariate_poisson(home_rate: f64, away_rate: f64, scoregrid: &mut Matrix<f64>) -> f64 {
    let mut home_weights = vec![0.0; scoregrid.rows()];
    let mut away_weights = vec![0.0; scoregrid.cols()];
    let home_ln_scale = poisson::fill_scaled(home_rate, &mut home_weights);
    let away_ln_scale = poisson::fill_scaled(away_rate, &mut away_weights);
    for (home_goals, &home_weight) in home_weights.iter().enumerate() {
        let row_slice = scoregrid.row_slice_mut(home_goals);
        for (away_goals, &away_weight) in away_weights.iter().enumerate() {
            row_slice[away_goals] = home_weight * away_weight;
        }
    }
    home_ln_scale + away_ln_scale
}

pub fn home_away_expectations(scoregrid: &Matrix<f64>) -> (f64, f64) {
    let (mut home_expectation, mut away_expectation) = (0.0, 0.0);
    for ((home_goals, away_goals), &prob) in scoregrid.cells() {
        home_expectation += home_goals as f64 * prob;
        away_expectation += away_goals as f64 * prob;
    }
    (home_expectation, away_expectation)
}

/// Win/draw/win probabilities; they sum to one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcomeProbs {
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
}
impl MatchOutcomeProbs {
    pub fn win(&self, side: &Side) -> f64 {
        match side {
            Side::Home => self.home_win,
            Side::Away => self.away_win,
        }
    }

    pub fn sum(&self) -> f64 {
        [self.home_win, self.draw, self.away_win].sum()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScorelineDistribution {
    home_xg: f64,
    away_xg: f64,
    grid: Matrix<f64>,
    weight: f64,
    ln_scale: f64,
}
impl ScorelineDistribution {
    pub fn home_xg(&self) -> f64 {
        self.home_xg
    }

    pub fn away_xg(&self) -> f64 {
        self.away_xg
    }

    pub fn max_goals(&self) -> u8 {
        (self.grid.rows() - 1) as u8
    }

    /// Cell weights, proportional to the raw cell probabilities. The most probable cell has a
    /// weight of one.
    pub fn grid(&self) -> &Matrix<f64> {
        &self.grid
    }

    /// Total probability held by the enumerated cells, in `[0, 1]`. Underflows to zero when
    /// the xG lies far beyond `max_goals`; outcome probabilities remain well-defined regardless.
    pub fn enumerated_mass(&self) -> f64 {
        self.weight * self.ln_scale.exp()
    }

    /// Mass of the scorelines beyond `max_goals` that were not enumerated.
    pub fn truncated_mass(&self) -> f64 {
        1.0 - self.enumerated_mass()
    }

    /// Probability of `outcome`, conditional on the scoreline falling within the grid.
    pub fn probability(&self, outcome: &Outcome) -> f64 {
        outcome.gather(&self.grid) / self.weight
    }

    pub fn outcome_probs(&self) -> MatchOutcomeProbs {
        let mut probs = [
            Outcome::Win(Side::Home).gather(&self.grid),
            Outcome::Draw.gather(&self.grid),
            Outcome::Win(Side::Away).gather(&self.grid),
        ];
        probs.normalise(1.0);
        MatchOutcomeProbs {
            home_win: probs[0],
            draw: probs[1],
            away_win: probs[2],
        }
    }

    /// The single most probable scoreline. Ties go to the lowest-scoring cell in row-major
    /// order.
    pub fn most_likely(&self) -> Score {
        let mut best = ((0, 0), f64::MIN);
        for ((home_goals, away_goals), &prob) in self.grid.cells() {
            if prob > best.1 {
                best = ((home_goals, away_goals), prob);
            }
        }
        let ((home, away), _) = best;
        Score::new(home as u8, away as u8)
    }

    /// Mean goals per side within the grid, renormalised by the enumerated mass.
    pub fn expectations(&self) -> (f64, f64) {
        let (home, away) = home_away_expectations(&self.grid);
        (home / self.weight, away / self.weight)
    }
}

/// Derives the truncated scoreline grid for the given xG pair.
pub fn distribution(
    home_xg: f64,
    away_xg: f64,
    max_goals: u8,
) -> Result<ScorelineDistribution, InvalidInput> {
    let home_xg = check_xg(Side::Home, home_xg)?;
    let away_xg = check_xg(Side::Away, away_xg)?;
    let max_goals = check_max_goals(max_goals)?;

    let dim = max_goals as usize + 1;
    let mut grid = Matrix::allocate(dim, dim);
    let ln_scale = from_univariate_poisson(home_xg, away_xg, &mut grid);
    let weight = grid.flatten().sum();
    Ok(ScorelineDistribution {
        home_xg,
        away_xg,
        grid,
        weight,
        ln_scale,
    })
}

#[cfg(test)]
mod tests;
