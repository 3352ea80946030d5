use std::fmt;

use chrono::NaiveDateTime;
use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// Which input a table came from. Left is the internal collection ledger,
/// right is the third-party ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// A single typed cell value.
///
/// Equality is exact and typed: `Text("1")` never equals `Int(1)`.
/// Loaders store integral spreadsheet floats as `Int`, so `Float` only
/// holds values with a fractional part.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Int(i64),
    Float(OrderedFloat<f64>),
    Bool(bool),
    DateTime(NaiveDateTime),
    Text(String),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn float(n: f64) -> Self {
        Cell::Float(OrderedFloat(n))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Int(n) => write!(f, "{n}"),
            Cell::Float(n) => write!(f, "{}", n.0),
            Cell::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Cell::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Int(n)
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// An in-memory table: ordered, uniquely named columns and rows of cells.
///
/// Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table, checking that every row matches the header width.
    pub fn new(
        name: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<Cell>>,
    ) -> Result<Self, ReconError> {
        let name = name.into();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(ReconError::Load {
                    path: name,
                    cause: format!(
                        "row {} has {} fields, header has {}",
                        i + 1,
                        row.len(),
                        columns.len()
                    ),
                });
            }
        }
        Ok(Self { name, columns, rows })
    }

    /// Empty table with the given header.
    pub fn with_columns(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Index of a column that must exist, or `MissingColumn` naming the side.
    pub fn require_column(&self, column: &str, side: Side) -> Result<usize, ReconError> {
        self.column_index(column).ok_or_else(|| ReconError::MissingColumn {
            side,
            column: column.to_string(),
        })
    }

    /// Cell at (row, named column), if both exist.
    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[col])
    }

    /// Consume the table and replace its header. Width must not change.
    pub(crate) fn with_renamed_columns(self, columns: Vec<String>) -> Self {
        debug_assert_eq!(columns.len(), self.columns.len());
        Self {
            name: self.name,
            columns,
            rows: self.rows,
        }
    }

    pub(crate) fn push_row(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }
}
