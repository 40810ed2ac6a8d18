//! Result table - accumulates per-case outcomes and renders them as markdown.
//!
//! This module handles:
//! - Column-typed row storage where every row always covers every column
//! - Progressive fill-in of the current row as a test case runs through its stages
//! - Summary row computation (counts, pass/NA/FAIL breakdowns, error categories)
//! - Rendering a pipe-delimited markdown table
//!
//! # Module Organization
//!
//! - `cell` - Cell values (scalar or foldable)
//! - `markdown` - Text normalization and fold markup
//! - `summary` - Summary row builders
//! - `categorize` - Regex error category registry and outcome column processing
//! - `error` - Table usage errors

mod categorize;
mod cell;
mod error;
mod markdown;
mod summary;

pub use categorize::ErrorCategories;
pub use cell::{Cell, FAIL, PASS};
pub use error::TableError;
pub use markdown::{breaks_table, make_fold, safe_md_string};

use log::debug;
use markdown::table_line;
use std::collections::HashMap;
use std::io::Write;

/// Values for one row, keyed by column id.
///
/// Built explicitly by the caller so only the fields that belong to the row
/// end up in it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowValues {
    values: Vec<(String, Cell)>,
}

impl RowValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, builder style. A later value for the same key wins.
    pub fn with(mut self, key: &str, value: impl Into<Cell>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<Cell>) {
        let value = value.into();
        if let Some(slot) = self.values.iter_mut().find(|(k, _)| k == key) {
            slot.1 = value;
        } else {
            self.values.push((key.to_string(), value));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// An ordered, column-typed accumulator of test outcomes.
#[derive(Debug, Clone)]
pub struct ResultTable {
    columns: Vec<String>,
    labels: Vec<String>,
    index: HashMap<String, usize>,
    /// Each row holds exactly one cell per column, in column order
    rows: Vec<Vec<Cell>>,
    summary: Option<Vec<String>>,
}

impl ResultTable {
    /// Create a table from `(column_id, label)` pairs.
    pub fn new(spec: &[(&str, &str)]) -> Result<Self, TableError> {
        let mut columns = Vec::with_capacity(spec.len());
        let mut labels = Vec::with_capacity(spec.len());
        let mut index = HashMap::new();

        for (i, (id, label)) in spec.iter().enumerate() {
            if id.is_empty() {
                return Err(TableError::EmptyColumnId);
            }
            if index.insert(id.to_string(), i).is_some() {
                return Err(TableError::DuplicateColumn(id.to_string()));
            }
            columns.push(id.to_string());
            labels.push(label.to_string());
        }

        Ok(Self { columns, labels, index, rows: Vec::new(), summary: None })
    }

    /// Create a table from `|`-separated label and key lists,
    /// e.g. `from_spec("case|valid-sbml", "case|valid_sbml")`.
    pub fn from_spec(labels: &str, keys: &str) -> Result<Self, TableError> {
        let labels: Vec<&str> = labels.split('|').map(str::trim).collect();
        let keys: Vec<&str> = keys.split('|').map(str::trim).collect();
        if labels.len() != keys.len() {
            return Err(TableError::SpecMismatch { labels: labels.len(), keys: keys.len() });
        }
        let spec: Vec<(&str, &str)> = keys.into_iter().zip(labels).collect();
        Self::new(&spec)
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn label(&self, id: &str) -> Result<&str, TableError> {
        let col = self.column_index(id)?;
        Ok(&self.labels[col])
    }

    fn column_index(&self, id: &str) -> Result<usize, TableError> {
        self.index.get(id).copied().ok_or_else(|| TableError::UnknownColumn(id.to_string()))
    }

    /// Resolve every key up front so a bad key leaves the table untouched.
    fn resolve(&self, values: &RowValues) -> Result<Vec<(usize, Cell)>, TableError> {
        values.iter().map(|(k, v)| Ok((self.column_index(k)?, v.clone()))).collect()
    }

    /// Append a new row. Columns not in `values` are set to `NA`.
    ///
    /// Keys that are not declared columns are rejected and no row is added.
    pub fn new_row(&mut self, values: RowValues) -> Result<(), TableError> {
        let resolved = self.resolve(&values)?;
        let mut row = vec![Cell::na(); self.columns.len()];
        for (col, value) in resolved {
            row[col] = value;
        }
        self.rows.push(row);
        Ok(())
    }

    /// Overwrite the named cells of the current (last) row, leaving the others as they are.
    pub fn update_row(&mut self, values: RowValues) -> Result<(), TableError> {
        let resolved = self.resolve(&values)?;
        let row = self.rows.last_mut().ok_or(TableError::NoRows)?;
        for (col, value) in resolved {
            row[col] = value;
        }
        Ok(())
    }

    /// Overwrite one cell of the current row.
    pub fn set_cell(&mut self, id: &str, value: impl Into<Cell>) -> Result<(), TableError> {
        let col = self.column_index(id)?;
        let row = self.rows.last_mut().ok_or(TableError::NoRows)?;
        row[col] = value.into();
        Ok(())
    }

    /// Read one cell of the current row.
    pub fn last_cell(&self, id: &str) -> Result<&Cell, TableError> {
        let col = self.column_index(id)?;
        let row = self.rows.last().ok_or(TableError::NoRows)?;
        Ok(&row[col])
    }

    /// Read the cell at `row` in column `id`.
    pub fn cell(&self, row: usize, id: &str) -> Result<&Cell, TableError> {
        let col = self.column_index(id)?;
        self.rows.get(row).map(|r| &r[col]).ok_or(TableError::RowOutOfRange(row))
    }

    /// The cells of row `i`, in column order.
    pub fn row(&self, i: usize) -> Result<&[Cell], TableError> {
        self.rows.get(i).map(Vec::as_slice).ok_or(TableError::RowOutOfRange(i))
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, id: &str) -> Result<Vec<&Cell>, TableError> {
        let col = self.column_index(id)?;
        Ok(self.rows.iter().map(|r| &r[col]).collect())
    }

    /// Space-joined text of the current row, for debug output.
    pub fn last_row_text(&self) -> String {
        match self.rows.last() {
            Some(row) => row.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(" "),
            None => "-".to_string(),
        }
    }

    /// Set one summary cell, creating an otherwise empty summary row on first use.
    pub fn add_summary(&mut self, id: &str, value: impl Into<String>) -> Result<(), TableError> {
        let col = self.column_index(id)?;
        let n = self.columns.len();
        let summary = self.summary.get_or_insert_with(|| vec![String::new(); n]);
        summary[col] = value.into();
        Ok(())
    }

    pub fn summary_cell(&self, id: &str) -> Option<&str> {
        let col = self.column_index(id).ok()?;
        self.summary.as_ref().map(|s| s[col].as_str())
    }

    /// Replace every cell of a column with `formatter(cell)`.
    ///
    /// Without a formatter the default [`format_cell`] is used, which freezes
    /// each cell into its final markdown text.
    pub fn transform_column(&mut self, id: &str, formatter: Option<&dyn Fn(&Cell) -> Cell>) -> Result<(), TableError> {
        let col = self.column_index(id)?;
        for row in &mut self.rows {
            row[col] = match formatter {
                Some(f) => f(&row[col]),
                None => format_cell(&row[col]),
            };
        }
        Ok(())
    }

    pub(crate) fn column_mut(&mut self, id: &str) -> Result<impl Iterator<Item = &mut Cell>, TableError> {
        let col = self.column_index(id)?;
        Ok(self.rows.iter_mut().map(move |r| &mut r[col]))
    }

    /// Render every line, checking that no text would break the table.
    fn lines(&self) -> Result<Vec<String>, TableError> {
        let check = |row: Option<usize>, col: usize, text: String| -> Result<String, TableError> {
            if breaks_table(&text) {
                return Err(TableError::UnsafeCell { row, column: self.columns[col].clone(), text });
            }
            Ok(text)
        };

        let mut lines = Vec::with_capacity(self.rows.len() + 3);

        let header = self.labels.iter().enumerate().map(|(c, l)| check(None, c, l.clone())).collect::<Result<Vec<_>, _>>()?;
        lines.push(table_line(&header));
        lines.push(table_line(&vec!["---"; self.columns.len()]));

        if let Some(ref summary) = self.summary {
            let cells = summary.iter().enumerate().map(|(c, s)| check(None, c, s.clone())).collect::<Result<Vec<_>, _>>()?;
            lines.push(table_line(&cells));
        }

        for (r, row) in self.rows.iter().enumerate() {
            let cells =
                row.iter().enumerate().map(|(c, cell)| check(Some(r), c, cell.to_string())).collect::<Result<Vec<_>, _>>()?;
            lines.push(table_line(&cells));
        }

        Ok(lines)
    }

    /// Write the table as markdown: header, separator, optional summary, rows.
    ///
    /// Nothing is written if any cell would break the table syntax.
    pub fn render<W: Write>(&self, out: &mut W) -> Result<(), TableError> {
        let lines = self.lines()?;
        debug!("rendering table: {} columns, {} rows", self.n_cols(), self.n_rows());
        for line in lines {
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }

    pub fn to_markdown(&self) -> Result<String, TableError> {
        let mut out = Vec::new();
        self.render(&mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

/// Default cell formatter: a foldable cell becomes its `<details>` markup with
/// the detail normalized, any scalar becomes text of its string form.
pub fn format_cell(cell: &Cell) -> Cell {
    match cell {
        Cell::Foldable { summary, detail } => Cell::text(make_fold(summary, &safe_md_string(detail))),
        Cell::Scalar(s) => Cell::text(s.to_string()),
    }
}
