//! Sheet cosmetics
//!
//! Nothing here changes a cell value; only styles, widths and view settings.

use arrears_core::Worksheet;

use crate::config::{ColumnNames, HeaderColors};
use crate::error::Result;
use crate::rollup::{RollupColumns, RollupTree, COL_DIFF, COL_RATIO};

/// Header row fill
pub const HEADER_FILL: u32 = 0xF0F0F0;

/// Column A shading of the first three by-agent groups
const GROUP_FILLS: [u32; 3] = [0xE6F4EA, 0xFFF2CC, 0xE8F4FD];

const MIN_WIDTH: f64 = 12.0;
const MAX_WIDTH: f64 = 60.0;

/// Bold, centred, filled header row; frozen below it; right-to-left view
pub fn style_header(sheet: &mut Worksheet) -> Result<()> {
    for col in 0..sheet.col_count() {
        sheet.update_style_at(0, col, |s| {
            s.bold = true;
            s.centered = true;
            s.fill_rgb = Some(HEADER_FILL);
        })?;
    }
    sheet.set_freeze_panes(1, 0);
    sheet.set_right_to_left(true);
    Ok(())
}

/// Width each column to its longest value: `min(max(12, len + 2), 60)`
pub fn autosize(sheet: &mut Worksheet) {
    let mut longest = vec![0usize; sheet.col_count() as usize];
    for (_, col, cell) in sheet.iter_cells() {
        let len = cell.value.to_string().chars().count();
        let slot = &mut longest[col as usize];
        *slot = (*slot).max(len);
    }
    for (col, len) in longest.into_iter().enumerate() {
        let width = (len as f64 + 2.0).max(MIN_WIDTH).min(MAX_WIDTH);
        sheet.set_column_width(col as u16, width);
    }
}

/// Fill the manager-sheet header cells H, I and J..N
pub fn color_manager_headers(sheet: &mut Worksheet, colors: &HeaderColors) -> Result<()> {
    let (total, today, months) = colors.rgb()?;
    let width = sheet.col_count();
    let fills = [(7u16, total), (8, today)]
        .into_iter()
        .chain((9..width.min(14)).map(|c| (c, months)));
    for (col, rgb) in fills {
        if col < width {
            sheet.update_style_at(0, col, |s| s.fill_rgb = Some(rgb))?;
        }
    }
    Ok(())
}

/// Fixed widths, group shading and bold subtotal rows of the by-agent sheet
pub fn by_agent_layout(sheet: &mut Worksheet, tree: &RollupTree, names: &ColumnNames) -> Result<()> {
    style_header(sheet)?;
    let cols = RollupColumns::read(sheet, names);

    sheet.set_column_width(cols.agent, 24.0);
    sheet.set_column_width(cols.channel, 12.0);
    for col in COL_RATIO..=COL_DIFF {
        sheet.set_column_width(col, 12.0);
    }
    sheet.set_column_width(cols.total, 18.0);
    sheet.set_column_width(cols.today, 18.0);
    for &col in &cols.months {
        sheet.set_column_width(col, 16.0);
    }
    if let Some(lag) = cols.lag {
        sheet.set_column_width(lag, 18.0);
    }

    let group_ends = tree.subtotal_labels();
    let bold = tree.bold_labels();
    let width = sheet.col_count();
    let mut group_start = 1;
    let mut groups_seen = 0;
    for row in 1..sheet.row_count() {
        let label = sheet.text_at(row, cols.agent);
        if !group_ends.contains(label.as_str()) {
            continue;
        }
        if let Some(&fill) = GROUP_FILLS.get(groups_seen) {
            for r in group_start..=row {
                sheet.update_style_at(r, cols.agent, |s| s.fill_rgb = Some(fill))?;
            }
        }
        if bold.contains(label.as_str()) {
            for col in 0..width {
                sheet.update_style_at(row, col, |s| s.bold = true)?;
            }
        }
        groups_seen += 1;
        group_start = row + 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrears_core::CellValue;

    #[test]
    fn test_header_and_autosize() {
        let mut sheet = Worksheet::new("s");
        sheet.append_row(vec!["א", "כותרת ארוכה מאוד מאוד מאוד"]).unwrap();
        sheet.append_row(vec![CellValue::from(1.5), "x".repeat(80).into()]).unwrap();

        style_header(&mut sheet).unwrap();
        autosize(&mut sheet);

        let header = sheet.style_at(0, 1).unwrap();
        assert!(header.bold && header.centered);
        assert_eq!(header.fill_rgb, Some(HEADER_FILL));
        assert!(sheet.is_right_to_left());
        assert_eq!(sheet.freeze_panes().map(|f| (f.row, f.col)), Some((1, 0)));
        assert_eq!(sheet.column_width(0), Some(12.0));
        assert_eq!(sheet.column_width(1), Some(60.0));
        // values are untouched
        assert_eq!(sheet.get_value_at(1, 0), CellValue::Number(1.5));
    }

    #[test]
    fn test_manager_header_colours() {
        let mut sheet = Worksheet::new("s");
        sheet
            .append_row((0..16).map(|i| format!("h{}", i)).collect::<Vec<_>>())
            .unwrap();
        color_manager_headers(&mut sheet, &HeaderColors::default()).unwrap();

        let fill = |c| sheet.style_at(0, c).and_then(|s| s.fill_rgb);
        assert_eq!(fill(6), None);
        assert_eq!(fill(7), Some(0xBFEE90));
        assert_eq!(fill(8), Some(0x90BFEE));
        assert_eq!(fill(13), Some(0xEEBF90));
        assert_eq!(fill(14), None);
    }
}
