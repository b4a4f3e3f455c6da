//! Worksheet type

use std::collections::BTreeMap;

use crate::cell::{CellAddress, CellData, CellRange, CellValue};
use crate::error::{Error, Result};
use crate::style::CellStyle;
use crate::{MAX_COLS, MAX_ROWS};

/// Frozen pane position: rows above `row` and columns left of `col` stay visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreezePanes {
    pub row: u32,
    pub col: u16,
}

/// A worksheet (single sheet in a workbook)
///
/// Cells are stored sparsely as `BTreeMap<row, BTreeMap<col, CellData>>`, so
/// iteration is always row-major, which the XLSX writer relies on.
#[derive(Debug, Clone, Default)]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Row index → column map
    rows: BTreeMap<u32, BTreeMap<u16, CellData>>,
    /// Merged cell regions
    merged: Vec<CellRange>,
    /// Freeze pane settings
    freeze_panes: Option<FreezePanes>,
    /// Sheet is displayed right-to-left
    right_to_left: bool,
    /// Custom column widths in characters
    column_widths: BTreeMap<u16, f64>,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    // === Cell Access ===

    /// Get a cell by row and column indices
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&CellData> {
        self.rows.get(&row).and_then(|r| r.get(&col))
    }

    /// Get cell value (convenience method)
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(address)?;
        Ok(self.get_value_at(addr.row, addr.col))
    }

    /// Get cell value by indices
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.cell_at(row, col)
            .map(|c| c.value.clone())
            .unwrap_or_default()
    }

    /// Trimmed display text of the cell's effective value, "" when empty
    pub fn text_at(&self, row: u32, col: u16) -> String {
        self.cell_at(row, col)
            .map(|c| c.value.effective_value().to_string().trim().to_string())
            .unwrap_or_default()
    }

    /// Get a cell's explicit style
    pub fn style_at(&self, row: u32, col: u16) -> Option<&CellStyle> {
        self.cell_at(row, col).and_then(|c| c.style.as_ref())
    }

    // === Cell Modification ===

    /// Set a cell value by address string
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Set a cell value by row and column indices, keeping its style
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        self.validate_cell_position(row, col)?;
        self.rows.entry(row).or_default().entry(col).or_default().value = value.into();
        self.prune(row, col);
        Ok(())
    }

    /// Set a cell formula by row and column indices
    pub fn set_cell_formula_at(&mut self, row: u32, col: u16, formula: &str) -> Result<()> {
        // Ensure formula starts with '='
        let formula = if formula.starts_with('=') {
            formula.to_string()
        } else {
            format!("={}", formula)
        };

        self.set_cell_value_at(row, col, CellValue::formula(formula))
    }

    /// Replace a cell's style
    pub fn set_cell_style_at(&mut self, row: u32, col: u16, style: CellStyle) -> Result<()> {
        self.validate_cell_position(row, col)?;
        let cell = self.rows.entry(row).or_default().entry(col).or_default();
        cell.style = if style.is_default() { None } else { Some(style) };
        self.prune(row, col);
        Ok(())
    }

    /// Edit a cell's style in place, starting from its current style
    pub fn update_style_at<F>(&mut self, row: u32, col: u16, f: F) -> Result<()>
    where
        F: FnOnce(&mut CellStyle),
    {
        let mut style = self.style_at(row, col).cloned().unwrap_or_default();
        f(&mut style);
        self.set_cell_style_at(row, col, style)
    }

    /// Clear a cell by indices (value and style)
    pub fn clear_cell_at(&mut self, row: u32, col: u16) {
        if let Some(r) = self.rows.get_mut(&row) {
            r.remove(&col);
            if r.is_empty() {
                self.rows.remove(&row);
            }
        }
    }

    /// Drop the cell entry if it carries nothing
    fn prune(&mut self, row: u32, col: u16) {
        if self.cell_at(row, col).is_some_and(CellData::is_empty) {
            self.clear_cell_at(row, col);
        }
    }

    fn validate_cell_position(&self, row: u32, col: u16) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        Ok(())
    }

    // === Dimensions and Rows ===

    /// Number of rows up to and including the last stored row
    pub fn row_count(&self) -> u32 {
        self.rows.keys().next_back().map_or(0, |r| r + 1)
    }

    /// Number of columns up to and including the rightmost stored cell
    pub fn col_count(&self) -> u16 {
        self.rows
            .values()
            .filter_map(|r| r.keys().next_back())
            .max()
            .map_or(0, |c| c + 1)
    }

    /// Whether the sheet holds no cells
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Effective values of one row, padded to `width` columns
    pub fn row_values(&self, row: u32, width: u16) -> Vec<CellValue> {
        (0..width)
            .map(|col| {
                self.cell_at(row, col)
                    .map(|c| c.value.effective_value().clone())
                    .unwrap_or_default()
            })
            .collect()
    }

    /// True when every cell of the row is empty or whitespace (formulas count as content)
    pub fn is_row_blank(&self, row: u32) -> bool {
        self.rows
            .get(&row)
            .map_or(true, |r| r.values().all(|c| c.value.is_blank()))
    }

    /// Map of trimmed header text to column index for one row (first wins)
    pub fn header_map(&self, row: u32) -> BTreeMap<String, u16> {
        let mut map = BTreeMap::new();
        if let Some(r) = self.rows.get(&row) {
            for (&col, cell) in r {
                let text = cell.value.effective_value().to_string().trim().to_string();
                if !text.is_empty() {
                    map.entry(text).or_insert(col);
                }
            }
        }
        map
    }

    /// Write `values` into the row after the last stored row
    pub fn append_row<V: Into<CellValue>>(&mut self, values: Vec<V>) -> Result<u32> {
        let row = self.row_count();
        for (col, value) in values.into_iter().enumerate() {
            self.set_cell_value_at(row, col as u16, value)?;
        }
        Ok(row)
    }

    /// Insert `count` empty rows at `at`, shifting later rows down
    ///
    /// Formulas are not rewritten.
    pub fn insert_rows(&mut self, at: u32, count: u32) {
        if count == 0 {
            return;
        }
        let tail = self.rows.split_off(&at);
        for (row, cells) in tail {
            self.rows.insert(row + count, cells);
        }
        for region in &mut self.merged {
            if region.start.row >= at {
                region.start.row += count;
                region.end.row += count;
            } else if region.end.row >= at {
                region.end.row += count;
            }
        }
    }

    /// Delete `count` rows starting at `at`, shifting later rows up
    pub fn delete_rows(&mut self, at: u32, count: u32) {
        if count == 0 {
            return;
        }
        let mut tail = self.rows.split_off(&at);
        let kept = tail.split_off(&(at + count));
        for (row, cells) in kept {
            self.rows.insert(row - count, cells);
        }
        self.merged
            .retain(|r| r.end.row < at || r.start.row >= at + count);
        for region in &mut self.merged {
            if region.start.row >= at + count {
                region.start.row -= count;
                region.end.row -= count;
            }
        }
    }

    /// Insert `count` empty columns at `at`, shifting later columns right
    ///
    /// Formulas are not rewritten.
    pub fn insert_columns(&mut self, at: u16, count: u16) {
        if count == 0 {
            return;
        }
        for cells in self.rows.values_mut() {
            let tail = cells.split_off(&at);
            for (col, cell) in tail {
                cells.insert(col + count, cell);
            }
        }
        for region in &mut self.merged {
            if region.start.col >= at {
                region.start.col += count;
                region.end.col += count;
            } else if region.end.col >= at {
                region.end.col += count;
            }
        }
        let tail = self.column_widths.split_off(&at);
        for (col, width) in tail {
            self.column_widths.insert(col + count, width);
        }
    }

    /// Iterate over stored cells in row-major order
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.rows
            .iter()
            .flat_map(|(&row, cols)| cols.iter().map(move |(&col, cell)| (row, col, cell)))
    }

    // === Merged Cells ===

    /// Get merged regions
    pub fn merged_regions(&self) -> &[CellRange] {
        &self.merged
    }

    /// Merge cells
    pub fn merge_cells(&mut self, range: &CellRange) -> Result<()> {
        if self.merged.iter().any(|existing| range.overlaps(existing)) {
            return Err(Error::MergedCellConflict(range.to_string()));
        }
        self.merged.push(*range);
        Ok(())
    }

    /// Unmerge every region, copying each region's top-left value into all
    /// of its member cells. Returns the number of regions expanded.
    pub fn expand_merged_regions(&mut self) -> Result<usize> {
        let regions = std::mem::take(&mut self.merged);
        for region in &regions {
            let value = self.get_value_at(region.start.row, region.start.col);
            if value.is_empty() {
                continue;
            }
            for addr in region.cells().skip(1) {
                self.set_cell_value_at(addr.row, addr.col, value.clone())?;
            }
        }
        Ok(regions.len())
    }

    // === View Settings ===

    /// Get freeze pane settings
    pub fn freeze_panes(&self) -> Option<&FreezePanes> {
        self.freeze_panes.as_ref()
    }

    /// Set freeze panes; (0, 0) removes them
    pub fn set_freeze_panes(&mut self, row: u32, col: u16) {
        if row == 0 && col == 0 {
            self.freeze_panes = None;
        } else {
            self.freeze_panes = Some(FreezePanes { row, col });
        }
    }

    /// Whether the sheet is displayed right-to-left
    pub fn is_right_to_left(&self) -> bool {
        self.right_to_left
    }

    /// Set right-to-left display
    pub fn set_right_to_left(&mut self, rtl: bool) {
        self.right_to_left = rtl;
    }

    /// Get a custom column width
    pub fn column_width(&self, col: u16) -> Option<f64> {
        self.column_widths.get(&col).copied()
    }

    /// Set a custom column width in characters
    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.column_widths.insert(col, width);
    }

    /// All custom column widths (column index → width)
    pub fn column_widths(&self) -> &BTreeMap<u16, f64> {
        &self.column_widths
    }
}
