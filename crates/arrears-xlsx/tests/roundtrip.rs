//! Write a report-shaped workbook to disk and read it back.

use arrears_core::{CellRange, CellStyle, CellValue, Workbook};
use arrears_xlsx::{XlsxReader, XlsxWriter};
use pretty_assertions::assert_eq;

fn report_workbook() -> Workbook {
    let mut wb = Workbook::new();
    let ws = wb.replace_worksheet("מעובד").unwrap();
    ws.append_row(vec!["מנהל סחר", "סוכן", "סה\"כ סכום יתרת חוב"])
        .unwrap();
    ws.append_row(vec![
        CellValue::string("רפי מור יוסף- סחר"),
        CellValue::string("  דנה & <שות'> "),
        CellValue::Number(-1234.5),
    ])
    .unwrap();
    ws.set_cell_formula_at(3, 2, "=SUM(C2:C2)").unwrap();
    ws.set_cell_style_at(0, 0, CellStyle::new().bold().centered().fill(0xF0F0F0))
        .unwrap();
    ws.set_cell_style_at(3, 2, CellStyle::new().bold().number_format("#,##0.00"))
        .unwrap();
    ws.set_freeze_panes(1, 0);
    ws.set_right_to_left(true);
    ws.set_column_width(0, 24.0);
    ws.merge_cells(&CellRange::parse("A5:B5").unwrap()).unwrap();

    let other = wb.replace_worksheet("לפי סוכן").unwrap();
    other
        .set_cell_formula_at(1, 5, "=LOOKUP(2,1/('ארז ביתן'!H:H<>\"\"),'ארז ביתן'!H:H)")
        .unwrap();
    wb
}

#[test]
fn test_write_then_read_preserves_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.xlsx");

    XlsxWriter::write_file(&report_workbook(), &path).unwrap();
    let wb = XlsxReader::read_file(&path).unwrap();

    assert_eq!(wb.sheet_names(), vec!["מעובד", "לפי סוכן"]);

    let ws = wb.worksheet_by_name("מעובד").unwrap();
    assert_eq!(ws.text_at(0, 2), "סה\"כ סכום יתרת חוב");
    assert_eq!(
        ws.get_value_at(1, 1),
        CellValue::string("  דנה & <שות'> ")
    );
    assert_eq!(ws.get_value_at(1, 2), CellValue::Number(-1234.5));
    assert_eq!(ws.get_value_at(3, 2).formula_text(), Some("=SUM(C2:C2)"));
    assert_eq!(ws.merged_regions().len(), 1);

    let by_agent = wb.worksheet_by_name("לפי סוכן").unwrap();
    assert_eq!(
        by_agent.get_value_at(1, 5).formula_text(),
        Some("=LOOKUP(2,1/('ארז ביתן'!H:H<>\"\"),'ארז ביתן'!H:H)")
    );
}

#[test]
fn test_values_view_drops_uncached_formulas() {
    let mut bytes = std::io::Cursor::new(Vec::new());
    XlsxWriter::write(&report_workbook(), &mut bytes).unwrap();
    bytes.set_position(0);

    let wb = XlsxReader::read_values(bytes).unwrap();
    let ws = wb.worksheet_by_name("מעובד").unwrap();
    assert!(ws.get_value_at(3, 2).is_empty());
    assert_eq!(ws.get_value_at(1, 2), CellValue::Number(-1234.5));
}
