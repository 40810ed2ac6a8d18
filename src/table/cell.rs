//! Cell values held by a result table.
//!
//! A cell is either a plain scalar or a foldable pass/fail cell whose detail
//! is hidden behind a `<details>` summary when rendered.

use std::fmt;

/// Text used for a passing outcome
pub const PASS: &str = "pass";
/// Text used for a failing outcome
pub const FAIL: &str = "FAIL";
/// Text used for "not applicable"
pub const NA: &str = "NA";

/// A scalar cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Not applicable (distinct from a missing value, which rows never have)
    Na,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// A single table cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Scalar(Scalar),
    /// Visible `summary`, hidden `detail`
    Foldable { summary: String, detail: String },
}

impl Cell {
    pub fn na() -> Self {
        Cell::Scalar(Scalar::Na)
    }

    pub fn text(s: impl Into<String>) -> Self {
        Cell::Scalar(Scalar::Text(s.into()))
    }

    pub fn fold(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Cell::Foldable { summary: summary.into(), detail: detail.into() }
    }

    pub fn is_na(&self) -> bool {
        matches!(self, Cell::Scalar(Scalar::Na))
    }

    /// The value used when counting cells: the string form of a scalar,
    /// or the visible summary of a foldable cell.
    pub fn tag(&self) -> String {
        match self {
            Cell::Scalar(s) => s.to_string(),
            Cell::Foldable { summary, .. } => summary.clone(),
        }
    }

    /// Falsy values mean "no error" in an outcome column.
    pub fn is_falsy(&self) -> bool {
        match self {
            Cell::Scalar(Scalar::Bool(b)) => !b,
            Cell::Scalar(Scalar::Int(i)) => *i == 0,
            Cell::Scalar(Scalar::Float(f)) => *f == 0.0,
            Cell::Scalar(Scalar::Text(t)) => t.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Na => f.write_str(NA),
            Scalar::Bool(true) => f.write_str(PASS),
            Scalar::Bool(false) => f.write_str(FAIL),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Text(t) => f.write_str(t),
        }
    }
}

/// The one conversion from cell to markdown text.
///
/// The detail of a foldable cell is written as-is; callers normalize
/// text that came from error messages before storing it.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Scalar(s) => s.fmt(f),
            Cell::Foldable { summary, detail } => f.write_str(&super::markdown::make_fold(summary, detail)),
        }
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Scalar(Scalar::Bool(b))
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Cell::Scalar(Scalar::Int(i))
    }
}

impl From<usize> for Cell {
    fn from(i: usize) -> Self {
        Cell::Scalar(Scalar::Int(i as i64))
    }
}

impl From<f64> for Cell {
    fn from(x: f64) -> Self {
        Cell::Scalar(Scalar::Float(x))
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::text(s)
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::text(s)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_else(Cell::na)
    }
}
