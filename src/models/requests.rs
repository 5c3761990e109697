//! Request DTOs for the calculator API
//!
//! Defines the query string accepted by every operation endpoint.

use crate::error::{CalcError, Result};

/// Query string for `GET /{operation}?x=..&y=..`
///
/// Operands arrive as raw strings so that missing, empty and malformed
/// values all surface as the same request error. A repeated parameter
/// keeps its first value; unknown parameters are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalcQuery {
    pub x: Option<String>,
    pub y: Option<String>,
}

impl FromIterator<(String, String)> for CalcQuery {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut query = CalcQuery::default();
        for (name, value) in pairs {
            let slot = match name.as_str() {
                "x" => &mut query.x,
                "y" => &mut query.y,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }
}

impl CalcQuery {
    /// Parses both operands.
    pub fn operands(&self) -> Result<(f64, f64)> {
        let x = parse_operand("x", self.x.as_deref())?;
        let y = parse_operand("y", self.y.as_deref())?;
        Ok((x, y))
    }
}

fn parse_operand(name: &str, raw: Option<&str>) -> Result<f64> {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Err(CalcError::Request(format!("missing operand `{}`", name))),
    };

    let value: f64 = raw.parse().map_err(|_| {
        CalcError::Request(format!("operand `{}` is not a number: '{}'", name, raw))
    })?;

    if !value.is_finite() {
        return Err(CalcError::Request(format!(
            "operand `{}` must be finite: '{}'",
            name, raw
        )));
    }
    Ok(value)
}
