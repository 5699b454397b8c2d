use thiserror::Error;

use crate::domain::Side;

/// Numeric input that would corrupt the probability mass if it were let through.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInput {
    #[error("{side:?} xG must be finite, got {value}")]
    NonFiniteXg { side: Side, value: f64 },

    #[error("{side:?} xG must be non-negative, got {value}")]
    NegativeXg { side: Side, value: f64 },

    #[error("max goals must be at least 1, got {0}")]
    MaxGoals(u8),
}

pub fn check_xg(side: Side, value: f64) -> Result<f64, InvalidInput> {
    if !value.is_finite() {
        Err(InvalidInput::NonFiniteXg { side, value })
    } else if value < 0.0 {
        Err(InvalidInput::NegativeXg { side, value })
    } else {
        Ok(value)
    }
}

pub fn check_max_goals(max_goals: u8) -> Result<u8, InvalidInput> {
    if max_goals == 0 {
        Err(InvalidInput::MaxGoals(max_goals))
    } else {
        Ok(max_goals)
    }
}
