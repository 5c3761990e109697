//! Arithmetic operations and the result payload stored in the cache.

use std::fmt;

use serde::Serialize;

use crate::error::{CalcError, Result};

/// One of the four supported calculator operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    /// Name used in routes, cache keys and responses.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Divide => "divide",
        }
    }

    /// Applies the operation. Any non-finite answer is a math error.
    pub fn apply(self, x: f64, y: f64) -> Result<f64> {
        let answer = match self {
            Operation::Add => x + y,
            Operation::Subtract => x - y,
            Operation::Multiply => x * y,
            Operation::Divide => {
                if y == 0.0 {
                    return Err(CalcError::Math("division by zero".to_string()));
                }
                x / y
            }
        };

        if answer.is_finite() {
            Ok(answer)
        } else {
            Err(CalcError::Math(format!(
                "{} of {} and {} overflows",
                self.name(),
                x,
                y
            )))
        }
    }

    /// Applies the operation and packages the full result.
    pub fn evaluate(self, x: f64, y: f64) -> Result<Calculation> {
        let answer = self.apply(x, y)?;
        Ok(Calculation {
            action: self,
            x,
            y,
            answer,
        })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A computed answer. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calculation {
    pub action: Operation,
    pub x: f64,
    pub y: f64,
    pub answer: f64,
}
