//! XLSX writer
//!
//! Every part of the package is rendered to a string first and then stored
//! in the archive in one pass. Strings go out inline (`t="inlineStr"`), so
//! no shared-string table is written.

use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::{escape_xml_attr, XlsxStyleTable};
use arrears_core::{CellAddress, CellData, CellValue, Workbook, Worksheet};

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const CT_PREFIX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml";

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Create (or truncate) `path` and write the workbook into it
    pub fn write_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> XlsxResult<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| XlsxError::create(path, e))?;
        Self::write(workbook, file)
    }

    pub fn write<W: Write + Seek>(workbook: &Workbook, writer: W) -> XlsxResult<()> {
        if workbook.is_empty() {
            return Err(XlsxError::NoWorksheets);
        }
        let styles = XlsxStyleTable::build(workbook);

        let mut parts: Vec<(String, String)> = vec![
            ("[Content_Types].xml".into(), Self::content_types_xml(workbook.sheet_count())),
            ("_rels/.rels".into(), Self::root_rels_xml()),
            ("xl/workbook.xml".into(), Self::workbook_xml(workbook)),
            ("xl/_rels/workbook.xml.rels".into(), Self::workbook_rels_xml(workbook.sheet_count())),
            ("xl/styles.xml".into(), styles.to_styles_xml()),
        ];
        parts.extend(workbook.worksheets().enumerate().map(|(i, sheet)| {
            (
                format!("xl/worksheets/sheet{}.xml", i + 1),
                Self::worksheet_xml(sheet, i, &styles),
            )
        }));

        let mut zip = zip::ZipWriter::new(writer);
        let options = zip::write::SimpleFileOptions::default();
        for (name, body) in &parts {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(body.as_bytes())?;
        }
        zip.finish()?;
        Ok(())
    }

    fn content_types_xml(sheets: usize) -> String {
        let overrides: String = (1..=sheets)
            .map(|n| {
                format!(
                    r#"<Override PartName="/xl/worksheets/sheet{n}.xml" ContentType="{CT_PREFIX}.worksheet+xml"/>"#
                )
            })
            .collect();
        format!(
            concat!(
                "{decl}\n<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">",
                "<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>",
                "<Default Extension=\"xml\" ContentType=\"application/xml\"/>",
                "<Override PartName=\"/xl/workbook.xml\" ContentType=\"{ct}.sheet.main+xml\"/>",
                "<Override PartName=\"/xl/styles.xml\" ContentType=\"{ct}.styles+xml\"/>",
                "{overrides}</Types>"
            ),
            decl = XML_DECL,
            ct = CT_PREFIX,
            overrides = overrides
        )
    }

    fn root_rels_xml() -> String {
        format!(
            r#"{XML_DECL}
<Relationships xmlns="{PKG_REL_NS}"><Relationship Id="rId1" Type="{REL_NS}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
        )
    }

    /// Sheet list plus `fullCalcOnLoad`, since formulas are stored without results
    fn workbook_xml(workbook: &Workbook) -> String {
        let sheets: String = workbook
            .worksheets()
            .enumerate()
            .map(|(i, sheet)| {
                format!(
                    r#"<sheet name="{}" sheetId="{n}" r:id="rId{n}"/>"#,
                    escape_xml_attr(sheet.name()),
                    n = i + 1
                )
            })
            .collect();
        format!(
            r#"{XML_DECL}
<workbook xmlns="{MAIN_NS}" xmlns:r="{REL_NS}"><sheets>{sheets}</sheets><calcPr calcId="191029" fullCalcOnLoad="1"/></workbook>"#
        )
    }

    /// Worksheets take `rId1..=rIdN`; styles come last
    fn workbook_rels_xml(sheets: usize) -> String {
        let mut rels: String = (1..=sheets)
            .map(|n| {
                format!(r#"<Relationship Id="rId{n}" Type="{REL_NS}/worksheet" Target="worksheets/sheet{n}.xml"/>"#)
            })
            .collect();
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="{REL_NS}/styles" Target="styles.xml"/>"#,
            sheets + 1
        ));
        format!(r#"{XML_DECL}
<Relationships xmlns="{PKG_REL_NS}">{rels}</Relationships>"#)
    }

    fn worksheet_xml(sheet: &Worksheet, index: usize, styles: &XlsxStyleTable) -> String {
        let mut rows: Vec<(u32, String)> = Vec::new();
        for (row, col, cell) in sheet.iter_cells() {
            let Some(xml) = Self::cell_xml(CellAddress::new(row, col), cell, styles) else {
                continue;
            };
            match rows.last_mut() {
                Some((r, body)) if *r == row => body.push_str(&xml),
                _ => rows.push((row, xml)),
            }
        }
        let sheet_data: String = rows
            .iter()
            .map(|(row, body)| format!(r#"<row r="{}">{}</row>"#, row + 1, body))
            .collect();

        let merges = sheet.merged_regions();
        let merge_xml = if merges.is_empty() {
            String::new()
        } else {
            let refs: String = merges
                .iter()
                .map(|range| format!(r#"<mergeCell ref="{}"/>"#, range))
                .collect();
            format!(r#"<mergeCells count="{}">{}</mergeCells>"#, merges.len(), refs)
        };

        format!(
            r#"{XML_DECL}
<worksheet xmlns="{MAIN_NS}">{}{}<sheetData>{}</sheetData>{}</worksheet>"#,
            Self::sheet_views_xml(sheet, index),
            Self::cols_xml(sheet),
            sheet_data,
            merge_xml
        )
    }

    /// One `<c>` element; `None` for a cell with neither value nor style
    fn cell_xml(at: CellAddress, cell: &CellData, styles: &XlsxStyleTable) -> Option<String> {
        let style = match styles.xf_id_for(cell.style.as_ref()) {
            0 => String::new(),
            xf => format!(r#" s="{}""#, xf),
        };
        let xml = match &cell.value {
            CellValue::Empty if style.is_empty() => return None,
            CellValue::Empty => format!(r#"<c r="{at}"{style}/>"#),
            CellValue::Number(n) => format!(r#"<c r="{at}"{style}><v>{n}</v></c>"#),
            CellValue::Boolean(b) => {
                format!(r#"<c r="{at}"{style} t="b"><v>{}</v></c>"#, u8::from(*b))
            }
            CellValue::String(s) => format!(
                r#"<c r="{at}"{style} t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                escape_xml(s)
            ),
            CellValue::Formula { text, .. } => format!(
                r#"<c r="{at}"{style}><f>{}</f></c>"#,
                escape_xml(text.strip_prefix('=').unwrap_or(text))
            ),
        };
        Some(xml)
    }

    /// `<sheetViews>` with the right-to-left flag and a frozen pane
    fn sheet_views_xml(sheet: &Worksheet, index: usize) -> String {
        let mut attrs = String::new();
        if sheet.is_right_to_left() {
            attrs.push_str(r#" rightToLeft="1""#);
        }
        if index == 0 {
            attrs.push_str(r#" tabSelected="1""#);
        }

        let pane = sheet.freeze_panes().map(|freeze| {
            let mut split = String::new();
            if freeze.col > 0 {
                split.push_str(&format!(r#" xSplit="{}""#, freeze.col));
            }
            if freeze.row > 0 {
                split.push_str(&format!(r#" ySplit="{}""#, freeze.row));
            }
            let active = match (freeze.row > 0, freeze.col > 0) {
                (true, true) => "bottomRight",
                (true, false) => "bottomLeft",
                _ => "topRight",
            };
            format!(
                r#"<pane{} topLeftCell="{}" activePane="{}" state="frozen"/>"#,
                split,
                CellAddress::new(freeze.row, freeze.col),
                active
            )
        });

        match pane {
            Some(pane) => format!(
                r#"<sheetViews><sheetView{attrs} workbookViewId="0">{pane}</sheetView></sheetViews>"#
            ),
            None => format!(r#"<sheetViews><sheetView{attrs} workbookViewId="0"/></sheetViews>"#),
        }
    }

    /// `<cols>` for custom column widths, empty when there are none
    fn cols_xml(sheet: &Worksheet) -> String {
        let widths = sheet.column_widths();
        if widths.is_empty() {
            return String::new();
        }
        let cols: String = widths
            .iter()
            .map(|(&col, &width)| {
                format!(
                    r#"<col min="{n}" max="{n}" width="{width}" customWidth="1"/>"#,
                    n = col + 1
                )
            })
            .collect();
        format!("<cols>{}</cols>", cols)
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frozen_rtl_sheet_view() {
        let mut ws = Worksheet::new("לפי סוכן");
        ws.set_right_to_left(true);
        ws.set_freeze_panes(1, 0);

        let xml = XlsxWriter::sheet_views_xml(&ws, 0);
        assert!(xml.contains("rightToLeft=\"1\""));
        assert!(xml.contains("<pane ySplit=\"1\" topLeftCell=\"A2\" activePane=\"bottomLeft\" state=\"frozen\"/>"));
    }

    #[test]
    fn test_cols_xml() {
        let mut ws = Worksheet::new("s");
        assert_eq!(XlsxWriter::cols_xml(&ws), "");
        ws.set_column_width(1, 24.0);
        assert!(XlsxWriter::cols_xml(&ws).contains("<col min=\"2\" max=\"2\" width=\"24\" customWidth=\"1\"/>"));
    }

    #[test]
    fn test_empty_workbook_is_rejected() {
        let mut out = std::io::Cursor::new(Vec::new());
        assert!(matches!(
            XlsxWriter::write(&Workbook::new(), &mut out),
            Err(XlsxError::NoWorksheets)
        ));
    }

    #[test]
    fn test_cell_xml() {
        let styles = XlsxStyleTable::build(&Workbook::new());
        let at = CellAddress::new(1, 2);
        let xml = |value: CellValue| XlsxWriter::cell_xml(at, &CellData::new(value), &styles);

        assert_eq!(xml(CellValue::Empty), None);
        assert_eq!(xml(CellValue::Number(2.5)).as_deref(), Some(r#"<c r="C2"><v>2.5</v></c>"#));
        assert_eq!(xml(CellValue::Boolean(true)).as_deref(), Some(r#"<c r="C2" t="b"><v>1</v></c>"#));
        assert_eq!(
            xml(CellValue::formula("=SUM(A1:A2)<0")).as_deref(),
            Some(r#"<c r="C2"><f>SUM(A1:A2)&lt;0</f></c>"#)
        );
    }
}
