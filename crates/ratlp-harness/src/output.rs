//! Decoding of the solver's stdout.
//!
//! Two forms are understood. Structured output is a block of `key: value`
//! lines and is recognized by a line starting with `status:`:
//!
//! ```text
//! status: optimal
//! objective: 125/2
//! pivots: 7
//! ```
//!
//! Anything else is treated as free text and searched for the status
//! keywords, then for `objective function is: <value>` and
//! `number of pivots is: <count>`, each followed by a line starting with
//! `The`.

use ratlp_model::{BigInt, BigRational, parse_rational, rational_to_f64};
use ratlp_solver::OracleStatus;

use crate::error::OutputError;

const OBJECTIVE_MARKER: &str = "objective function is: ";
const PIVOTS_MARKER: &str = "number of pivots is: ";
const OBJECTIVE_PATTERN: &str = "objective function is: <value>\\nThe";

/// What the solver under test reported
#[derive(Debug, Clone, PartialEq)]
pub struct SolverReport {
    pub status: OracleStatus,
    /// Present iff `status` is optimal
    pub objective: Option<BigRational>,
    pub pivots: Option<u64>,
}

impl SolverReport {
    pub fn objective_f64(&self) -> Option<f64> {
        self.objective.as_ref().map(rational_to_f64)
    }
}

pub fn parse_output(stdout: &str) -> Result<SolverReport, OutputError> {
    if stdout.lines().any(|line| line.trim_start().starts_with("status:")) {
        parse_structured(stdout)
    } else {
        parse_free_text(stdout)
    }
}

fn parse_structured(stdout: &str) -> Result<SolverReport, OutputError> {
    let mut status = None;
    let mut objective = None;
    let mut pivots = None;

    for line in stdout.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "status" => {
                status = Some(
                    value
                        .parse::<OracleStatus>()
                        .map_err(|_| OutputError::UnknownStatus(value.to_string()))?,
                );
            }
            "objective" => objective = Some(parse_value(value)?),
            "pivots" => pivots = Some(parse_pivots(value)?),
            _ => {}
        }
    }

    // detection guarantees a status line
    let status = status.ok_or_else(|| OutputError::UnknownStatus(String::new()))?;
    let objective = match status {
        OracleStatus::Optimal => Some(objective.ok_or(OutputError::MissingObjective)?),
        _ => None,
    };
    Ok(SolverReport {
        status,
        objective,
        pivots,
    })
}

fn parse_free_text(stdout: &str) -> Result<SolverReport, OutputError> {
    let keyword = [OracleStatus::Infeasible, OracleStatus::Unbounded]
        .into_iter()
        .filter_map(|status| stdout.find(status.as_str()).map(|pos| (pos, status)))
        .min_by_key(|(pos, _)| *pos);
    if let Some((_, status)) = keyword {
        return Ok(SolverReport {
            status,
            objective: None,
            pivots: None,
        });
    }

    let value = line_before_the(stdout, OBJECTIVE_MARKER).ok_or(OutputError::MissingPattern {
        pattern: OBJECTIVE_PATTERN,
    })?;
    let objective = parse_value(value)?;
    let pivots = line_before_the(stdout, PIVOTS_MARKER).map(parse_pivots).transpose()?;

    Ok(SolverReport {
        status: OracleStatus::Optimal,
        objective: Some(objective),
        pivots,
    })
}

/// Rest of the first line following `marker` whose next line starts with `The`.
fn line_before_the<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    text.match_indices(marker).find_map(|(pos, _)| {
        let rest = &text[pos + marker.len()..];
        let end = rest.find('\n')?;
        rest[end + 1..].starts_with("The").then(|| &rest[..end])
    })
}

fn parse_pivots(text: &str) -> Result<u64, OutputError> {
    text.trim()
        .parse()
        .map_err(|_| OutputError::InvalidPivots(text.trim().to_string()))
}

/// Accepts `p/q`, `p`, and plain decimals such as `-12.375`.
fn parse_value(text: &str) -> Result<BigRational, OutputError> {
    let text = text.trim();
    parse_rational(text)
        .or_else(|| parse_decimal(text))
        .ok_or_else(|| OutputError::InvalidObjective(text.to_string()))
}

fn parse_decimal(text: &str) -> Option<BigRational> {
    let (whole, frac) = text.split_once('.')?;
    if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // at most one sign, then digits only
    let (negative, whole) = match whole.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, whole.strip_prefix('+').unwrap_or(whole)),
    };
    if !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits = format!("{}{}", whole, frac);
    let mut numer: BigInt = digits.parse().ok()?;
    if negative {
        numer = -numer;
    }
    let denom = BigInt::from(10).pow(frac.len() as u32);
    Some(BigRational::new(numer, denom))
}
