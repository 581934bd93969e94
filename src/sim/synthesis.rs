//! Synthesis evaluation: one operator applied to two operands
//!
//! Pure and side-effect free. Failures come back as values so the caller can
//! show a transient message and clear the selection.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::cell::Operator;

/// Recoverable synthesis failures. The round always continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum SynthesisError {
    #[error("cannot divide by zero")]
    DivisionByZero,
    #[error("{0} is not evenly divisible by {1}")]
    NotDivisible(i64, i64),
    #[error("result cannot be negative")]
    NegativeResult,
    #[error("result is too large")]
    Overflow,
}

/// Apply `op` to `lhs` and `rhs`.
///
/// Division must be exact. Any negative result is rejected, whichever
/// operator produced it.
pub fn evaluate(lhs: i64, op: Operator, rhs: i64) -> Result<i64, SynthesisError> {
    let result = match op {
        Operator::Add => lhs.checked_add(rhs),
        Operator::Sub => lhs.checked_sub(rhs),
        Operator::Mul => lhs.checked_mul(rhs),
        Operator::Div => {
            if rhs == 0 {
                return Err(SynthesisError::DivisionByZero);
            }
            if lhs % rhs != 0 {
                return Err(SynthesisError::NotDivisible(lhs, rhs));
            }
            lhs.checked_div(rhs)
        }
    }
    .ok_or(SynthesisError::Overflow)?;

    if result < 0 {
        return Err(SynthesisError::NegativeResult);
    }
    Ok(result)
}
