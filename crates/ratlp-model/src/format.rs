//! Canonical text encoding of an [`LpInstance`].
//!
//! ```text
//! n
//! m
//! c_1 ... c_n
//! b_1 ... b_m
//! A_11 ... A_1n
//! ...
//! A_m1 ... A_mn
//! ```
//!
//! Every scalar is written as `p/q`, or as a bare `p` when `q = 1`.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;
use thiserror::Error;

use crate::instance::{LpInstance, ModelError};

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Line {line}: expected {expected}, found end of input")]
    MissingLine { line: usize, expected: &'static str },
    #[error("Line {line}: invalid {what} count '{found}'")]
    InvalidCount {
        line: usize,
        what: &'static str,
        found: String,
    },
    #[error("Line {line}: expected {expected} values, found {found}")]
    TokenCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Line {line}: invalid rational '{token}'")]
    InvalidRational { line: usize, token: String },
    #[error("Line {line}: zero denominator in '{token}'")]
    ZeroDenominator { line: usize, token: String },
    #[error("Line {line}: unexpected trailing content")]
    TrailingContent { line: usize },
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parses one `p/q` or `p` token.
pub fn parse_rational(token: &str) -> Option<BigRational> {
    parse_token(token, 0).ok()
}

fn parse_token(token: &str, line: usize) -> Result<BigRational, FormatError> {
    let invalid = || FormatError::InvalidRational {
        line,
        token: token.to_string(),
    };
    let (numer, denom) = token.split_once('/').unwrap_or((token, "1"));
    let numer = BigInt::from_str(numer).map_err(|_| invalid())?;
    let denom = BigInt::from_str(denom).map_err(|_| invalid())?;
    if denom.is_zero() {
        return Err(FormatError::ZeroDenominator {
            line,
            token: token.to_string(),
        });
    }
    Ok(BigRational::new(numer, denom))
}

struct LineReader<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> LineReader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
        }
    }

    /// Returns the next line with its 1-based number.
    fn next(&mut self, expected: &'static str, last: usize) -> Result<(usize, &'a str), FormatError> {
        self.lines
            .next()
            .map(|(i, line)| (i + 1, line))
            .ok_or(FormatError::MissingLine { line: last + 1, expected })
    }

    fn count(&mut self, what: &'static str, last: usize) -> Result<(usize, usize), FormatError> {
        let (line, text) = self.next(what, last)?;
        let value = text.trim().parse::<usize>().map_err(|_| FormatError::InvalidCount {
            line,
            what,
            found: text.trim().to_string(),
        })?;
        Ok((line, value))
    }

    fn rationals(
        &mut self,
        expected_name: &'static str,
        len: usize,
        last: usize,
    ) -> Result<(usize, Vec<BigRational>), FormatError> {
        let (line, text) = self.next(expected_name, last)?;
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() != len {
            return Err(FormatError::TokenCount {
                line,
                expected: len,
                found: tokens.len(),
            });
        }
        let values = tokens
            .into_iter()
            .map(|token| parse_token(token, line))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((line, values))
    }
}

fn write_row(out: &mut String, row: &[BigRational]) {
    let mut first = true;
    for value in row {
        if !first {
            out.push(' ');
        }
        first = false;
        // Ratio's Display already drops a denominator of 1
        let _ = write!(out, "{}", value);
    }
    out.push('\n');
}

impl LpInstance {
    /// Encodes the instance in the canonical text format.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.num_variables());
        let _ = writeln!(out, "{}", self.num_constraints());
        write_row(&mut out, self.c());
        write_row(&mut out, self.b());
        for row in self.a() {
            write_row(&mut out, row);
        }
        out
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), FormatError> {
        let path = path.as_ref();
        let io_err = |source: std::io::Error| FormatError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
        writer.write_all(self.to_text().as_bytes()).map_err(io_err)?;
        writer.flush().map_err(io_err)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, FormatError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| FormatError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        text.parse()
    }

    /// Decodes the canonical text format.
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        let mut reader = LineReader::new(text);
        let (line, n) = reader.count("variable", 0)?;
        let (line, m) = reader.count("constraint", line)?;
        let (line, c) = reader.rationals("cost vector", n, line)?;
        let (mut line, b) = reader.rationals("right-hand side", m, line)?;
        let mut a = Vec::with_capacity(m);
        for _ in 0..m {
            let (row_line, row) = reader.rationals("constraint row", n, line)?;
            line = row_line;
            a.push(row);
        }
        for (i, rest) in reader.lines {
            if !rest.trim().is_empty() {
                return Err(FormatError::TrailingContent { line: i + 1 });
            }
        }
        Ok(LpInstance::from_rationals(a, b, c)?)
    }
}

impl FromStr for LpInstance {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LpInstance::parse(s)
    }
}
