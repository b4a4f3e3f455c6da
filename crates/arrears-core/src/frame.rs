//! Tabular frame: ordered, uniquely named columns over rows of nullable scalars
//!
//! The report builders never touch worksheet cells directly while filtering
//! or aggregating; they move data through a [`Frame`] and only write it back
//! with [`Frame::write_to_sheet`].

use std::collections::HashMap;
use std::fmt;

use crate::cell::CellValue;
use crate::error::{Error, Result};
use crate::worksheet::Worksheet;

/// A non-null frame value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
}

/// A nullable frame cell
pub type Scalar = Option<Value>;

impl Value {
    /// Create a text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        Value::Text(s.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    /// Text that is empty after trimming
    pub fn is_blank(&self) -> bool {
        matches!(self, Value::Text(s) if s.trim().is_empty())
    }

    /// Convert a cell's effective value; empty and uncached formulas become null
    pub fn from_cell(value: &CellValue) -> Scalar {
        match value.effective_value() {
            CellValue::Empty | CellValue::Formula { .. } => None,
            CellValue::Number(n) => Some(Value::Number(*n)),
            CellValue::String(s) => Some(Value::Text(s.clone())),
            CellValue::Boolean(b) => Some(Value::text(if *b { "TRUE" } else { "FALSE" })),
        }
    }

    /// Convert into a cell value for writing
    pub fn to_cell(&self) -> CellValue {
        match self {
            Value::Text(s) => CellValue::String(s.clone()),
            Value::Number(n) => CellValue::Number(*n),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            Value::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

/// Disambiguate repeated names: the second `x` becomes `x (2)`, the third `x (3)`
pub fn dedupe_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen: HashMap<String, usize> = HashMap::new();
    names
        .into_iter()
        .map(|name| {
            let name = name.into();
            let count = seen.entry(name.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                name
            } else {
                format!("{} ({})", name, count)
            }
        })
        .collect()
}

/// An ordered table of named columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Scalar>>,
}

/// Read-only view of one frame row, addressed by column name
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    frame: &'a Frame,
    index: usize,
}

impl<'a> RowRef<'a> {
    /// Position of the row in its frame
    pub fn index(&self) -> usize {
        self.index
    }

    /// Cell in the named column; `None` when null or when the column is absent
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        let col = self.frame.column_index(column)?;
        self.frame.rows[self.index][col].as_ref()
    }

    /// Text cell in the named column
    pub fn text(&self, column: &str) -> Option<&'a str> {
        self.get(column).and_then(Value::as_text)
    }

    /// Numeric cell in the named column
    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Value::as_number)
    }

    /// All cells in column order
    pub fn values(&self) -> &'a [Scalar] {
        &self.frame.rows[self.index]
    }
}

impl Frame {
    /// Create an empty frame; duplicate column names are disambiguated
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: dedupe_names(columns),
            rows: Vec::new(),
        }
    }

    /// Column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row, padded with nulls or truncated to the column count
    pub fn push_row(&mut self, mut row: Vec<Scalar>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    /// Iterate over row views
    pub fn iter(&self) -> impl Iterator<Item = RowRef<'_>> {
        (0..self.rows.len()).map(move |index| RowRef { frame: self, index })
    }

    /// View of row `index`
    pub fn row(&self, index: usize) -> Option<RowRef<'_>> {
        (index < self.rows.len()).then_some(RowRef { frame: self, index })
    }

    /// Cell at (`row`, `column`), `None` when null or out of range
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.row(row).and_then(|r| r.get(column))
    }

    /// Set a cell; fails when the column does not exist
    pub fn set(&mut self, row: usize, column: &str, value: Scalar) -> Result<()> {
        let col = self
            .column_index(column)
            .ok_or_else(|| Error::ColumnNotFound(column.to_string()))?;
        let rows = self.rows.len();
        let cells = self
            .rows
            .get_mut(row)
            .ok_or(Error::FrameRowOutOfRange { row, rows })?;
        cells[col] = value;
        Ok(())
    }

    /// Values of one column, or `None` when the column is absent
    pub fn column(&self, name: &str) -> Option<Vec<&Scalar>> {
        let col = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[col]).collect())
    }

    /// Replace a column's values, appending the column when it is absent
    pub fn set_column(&mut self, name: &str, values: Vec<Scalar>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(Error::ColumnLength {
                column: name.to_string(),
                values: values.len(),
                rows: self.rows.len(),
            });
        }
        let col = match self.column_index(name) {
            Some(col) => col,
            None => {
                self.columns.push(name.to_string());
                for row in &mut self.rows {
                    row.push(None);
                }
                self.columns.len() - 1
            }
        };
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[col] = value;
        }
        Ok(())
    }

    /// Rewrite every cell of a column in place. Returns false when the column is absent.
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> bool
    where
        F: FnMut(&Scalar) -> Scalar,
    {
        let Some(col) = self.column_index(name) else {
            return false;
        };
        for row in &mut self.rows {
            row[col] = f(&row[col]);
        }
        true
    }

    /// Keep only rows matching `keep`; returns the number removed
    pub fn retain_rows<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(RowRef<'_>) -> bool,
    {
        let mask: Vec<bool> = self.iter().map(&mut keep).collect();
        let before = self.rows.len();
        let mut mask = mask.into_iter();
        self.rows.retain(|_| mask.next().unwrap_or(true));
        before - self.rows.len()
    }

    /// Rows matching `keep`, as a new frame with the same columns
    pub fn filtered<F>(&self, keep: F) -> Frame
    where
        F: FnMut(RowRef<'_>) -> bool,
    {
        let mut out = self.clone();
        out.retain_rows(keep);
        out
    }

    /// Project onto `names` in that order; names absent here become all-null columns
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Frame {
        let sources: Vec<Option<usize>> =
            names.iter().map(|n| self.column_index(n.as_ref())).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                sources
                    .iter()
                    .map(|src| src.and_then(|c| row[c].clone()))
                    .collect()
            })
            .collect();
        Frame {
            columns: dedupe_names(names.iter().map(|n| n.as_ref().to_string())),
            rows,
        }
    }

    /// Sum of the numeric cells of a column, ignoring nulls and text
    pub fn column_sum(&self, name: &str) -> f64 {
        self.column(name)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|v| v.as_ref().and_then(Value::as_number))
            .sum()
    }

    /// Group rows by the trimmed text of `key` and sum `value_columns`
    ///
    /// Groups keep first-seen order. Blank or null keys are reported as
    /// `blank_label`. A group/column pair with no numeric contributor stays
    /// null instead of becoming zero. Value columns absent from the frame are
    /// skipped.
    pub fn group_sum<S: AsRef<str>>(
        &self,
        key: &str,
        value_columns: &[S],
        blank_label: &str,
    ) -> Result<Frame> {
        let key_col = self
            .column_index(key)
            .ok_or_else(|| Error::ColumnNotFound(key.to_string()))?;
        let value_cols: Vec<(String, usize)> = value_columns
            .iter()
            .filter_map(|n| self.column_index(n.as_ref()).map(|c| (n.as_ref().to_string(), c)))
            .collect();

        let mut order: Vec<String> = Vec::new();
        let mut sums: HashMap<String, Vec<Option<f64>>> = HashMap::new();
        for row in &self.rows {
            let label = match &row[key_col] {
                Some(v) => v.to_string().trim().to_string(),
                None => String::new(),
            };
            let label = if label.is_empty() {
                blank_label.to_string()
            } else {
                label
            };
            let acc = sums.entry(label.clone()).or_insert_with(|| {
                order.push(label);
                vec![None; value_cols.len()]
            });
            for (slot, (_, col)) in acc.iter_mut().zip(&value_cols) {
                if let Some(n) = row[*col].as_ref().and_then(Value::as_number) {
                    *slot = Some(slot.unwrap_or(0.0) + n);
                }
            }
        }

        let mut out = Frame::new(
            std::iter::once(key.to_string()).chain(value_cols.iter().map(|(n, _)| n.clone())),
        );
        for label in order {
            let acc = sums.remove(&label).unwrap_or_default();
            let mut row = vec![Some(Value::Text(label))];
            row.extend(acc.into_iter().map(|s| s.map(Value::Number)));
            out.push_row(row);
        }
        Ok(out)
    }

    /// Build a frame from the rows below `header_row`, reading `columns.len()` cells per row
    pub fn from_sheet_rows(sheet: &Worksheet, header_row: u32, columns: Vec<String>) -> Frame {
        let width = columns.len() as u16;
        let mut frame = Frame::new(columns);
        for row in header_row + 1..sheet.row_count() {
            let cells = sheet
                .row_values(row, width)
                .iter()
                .map(Value::from_cell)
                .collect();
            frame.push_row(cells);
        }
        frame
    }

    /// Write the header row at `start_row` and the data rows below it
    ///
    /// Returns the 0-based index of the last row written.
    pub fn write_to_sheet(&self, sheet: &mut Worksheet, start_row: u32) -> Result<u32> {
        for (col, name) in self.columns.iter().enumerate() {
            sheet.set_cell_value_at(start_row, col as u16, name.as_str())?;
        }
        for (i, row) in self.rows.iter().enumerate() {
            let r = start_row + 1 + i as u32;
            for (col, value) in row.iter().enumerate() {
                if let Some(value) = value {
                    sheet.set_cell_value_at(r, col as u16, value.to_cell())?;
                }
            }
        }
        Ok(start_row + self.rows.len() as u32)
    }
}
