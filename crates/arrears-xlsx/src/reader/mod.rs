//! XLSX reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use arrears_core::{CellAddress, CellRange, CellValue, Workbook, Worksheet};

const SHARED_STRINGS: &str = "xl/sharedStrings.xml";
const WORKBOOK: &str = "xl/workbook.xml";
const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x005f_` = Underscore (escaped underscore)
fn decode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(c) => {
                result.push(c);
                rest = &candidate[7..];
            }
            None => {
                result.push_str("_x");
                rest = &candidate[2..];
            }
        }
    }
    result.push_str(rest);

    result
}

/// Value of a named attribute, unescaped
fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|s| s.to_string()))
}

/// Raw pieces of one `<c>` element
#[derive(Default)]
struct PendingCell {
    reference: Option<String>,
    cell_type: Option<String>,
    value: Option<String>,
    formula: Option<String>,
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| XlsxError::open(path, e))?;
        Self::read(file)
    }

    /// Read a workbook from a file path with formulas replaced by their cached values
    pub fn read_file_values<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| XlsxError::open(path, e))?;
        Self::read_values(file)
    }

    /// Read a workbook with formulas replaced by their cached values
    ///
    /// A formula cell with no cached value becomes empty.
    pub fn read_values<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let source = Self::read(reader)?;
        let mut workbook = Workbook::new();
        for sheet in source.worksheets() {
            let mut flat = sheet.clone();
            for (row, col, cell) in sheet.iter_cells() {
                if cell.value.is_formula() {
                    flat.set_cell_value_at(row, col, cell.value.effective_value().clone())?;
                }
            }
            workbook.add_existing_worksheet(flat)?;
        }
        Ok(workbook)
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::NotXlsx);
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let sheet_info = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut workbook = Workbook::new();

        for (name, r_id) in &sheet_info {
            let Some(path) = sheet_paths.get(r_id) else {
                log::warn!("sheet '{}' has no worksheet relationship ({})", name, r_id);
                continue;
            };
            let mut worksheet = Worksheet::new(name.as_str());
            Self::read_worksheet(&mut archive, path, &mut worksheet, &shared_strings)?;
            workbook.add_existing_worksheet(worksheet)?;
        }

        if workbook.is_empty() {
            return Err(XlsxError::NoWorksheets);
        }

        Ok(workbook)
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name(SHARED_STRINGS) {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        // Rich-text runs carry significant leading/trailing spaces
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"t" if in_si => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => strings.push(String::new()),
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current_string));
                        current_string.clear();
                        in_si = false;
                    }
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    if let Ok(text) = e.unescape() {
                        current_string.push_str(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::xml(SHARED_STRINGS, e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Read workbook.xml to get sheet names and rIds
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<(String, String)>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart(WORKBOOK.into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"sheet" => {
                    if let (Some(name), Some(r_id)) =
                        (attr_value(&e, b"name"), attr_value(&e, b"r:id"))
                    {
                        sheets.push((name, r_id));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::xml(WORKBOOK, e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read workbook.xml.rels to get sheet file paths
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart(WORKBOOK_RELS.into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let id = attr_value(&e, b"Id");
                    let target = attr_value(&e, b"Target");
                    let rel_type = attr_value(&e, b"Type");

                    // Only include worksheet relationships
                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Target is relative to xl/ folder
                            let full_path = match target.strip_prefix('/') {
                                Some(absolute) => absolute.to_string(),
                                None => format!("xl/{}", target),
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::xml(WORKBOOK_RELS, e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read one worksheet part: cell values, formulas and merged regions
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        worksheet: &mut Worksheet,
        shared_strings: &[String],
    ) -> XlsxResult<()> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut cell = PendingCell::default();
        let mut in_cell = false;
        let mut in_value = false;
        let mut in_formula = false;
        let mut in_inline_text = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"c" => {
                        in_cell = true;
                        cell = PendingCell {
                            reference: attr_value(&e, b"r"),
                            cell_type: attr_value(&e, b"t"),
                            ..PendingCell::default()
                        };
                    }
                    b"v" if in_cell => in_value = true,
                    b"f" if in_cell => in_formula = true,
                    b"t" if in_cell => in_inline_text = true,
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"c" => {
                        Self::process_cell(worksheet, &cell, shared_strings)?;
                        in_cell = false;
                    }
                    b"v" => in_value = false,
                    b"f" => in_formula = false,
                    b"t" => in_inline_text = false,
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    let Ok(text) = e.unescape() else {
                        buf.clear();
                        continue;
                    };
                    if in_value {
                        cell.value = Some(text.to_string());
                    } else if in_formula {
                        cell.formula = Some(text.to_string());
                    } else if in_inline_text {
                        // Rich inline strings arrive as several <t> runs
                        cell.value.get_or_insert_with(String::new).push_str(&text);
                        cell.cell_type = Some("inlineStr".to_string());
                    }
                }
                Ok(Event::Empty(e)) => {
                    if e.name().as_ref() == b"mergeCell" {
                        if let Some(reference) = attr_value(&e, b"ref") {
                            match CellRange::parse(&reference) {
                                Ok(range) => {
                                    if let Err(err) = worksheet.merge_cells(&range) {
                                        log::debug!("skipping merge {}: {}", reference, err);
                                    }
                                }
                                Err(err) => log::debug!("bad merge ref {}: {}", reference, err),
                            }
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::xml(path, e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    /// Convert the collected pieces of a `<c>` element into a cell value
    fn process_cell(
        worksheet: &mut Worksheet,
        cell: &PendingCell,
        shared_strings: &[String],
    ) -> XlsxResult<()> {
        let Some(cell_ref) = cell.reference.as_deref() else {
            log::debug!("cell without reference in sheet '{}'", worksheet.name());
            return Ok(());
        };
        let bad_cell = |reason: String| XlsxError::BadCell {
            sheet: worksheet.name().to_string(),
            cell: cell_ref.to_string(),
            reason,
        };
        let addr = CellAddress::parse(cell_ref).map_err(|e| bad_cell(e.to_string()))?;

        let plain = match cell.value.as_deref() {
            Some(v) => Self::typed_value(cell.cell_type.as_deref(), v, shared_strings)
                .map_err(bad_cell)?,
            None => CellValue::Empty,
        };

        let value = match cell.formula.as_deref() {
            Some(f) => CellValue::Formula {
                text: if f.starts_with('=') {
                    f.to_string()
                } else {
                    format!("={}", f)
                },
                cached_value: (!plain.is_empty()).then(|| Box::new(plain)),
            },
            None => plain,
        };

        if !value.is_empty() {
            worksheet.set_cell_value_at(addr.row, addr.col, value)?;
        }
        Ok(())
    }

    fn typed_value(
        cell_type: Option<&str>,
        value: &str,
        shared_strings: &[String],
    ) -> Result<CellValue, String> {
        Ok(match cell_type {
            // Shared string
            Some("s") => {
                let idx: usize = value
                    .parse()
                    .map_err(|_| format!("shared string index '{}' is not a number", value))?;
                let s = shared_strings
                    .get(idx)
                    .ok_or_else(|| format!("shared string {} out of range", idx))?;
                CellValue::String(s.clone())
            }

            Some("b") => CellValue::Boolean(value == "1" || value.eq_ignore_ascii_case("true")),

            // Inline or formula string - decode Excel escape sequences
            Some("inlineStr") | Some("str") => CellValue::String(decode_excel_escapes(value)),

            // Number (default type or explicit "n")
            None | Some("n") => match value.parse::<f64>() {
                Ok(n) => CellValue::Number(n),
                Err(_) => CellValue::String(value.to_string()),
            },

            // Errors and unknown types are kept as their text
            Some(_) => CellValue::String(value.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_decode_excel_escapes() {
        assert_eq!(decode_excel_escapes("hello_x000d_world"), "hello\rworld");
        assert_eq!(decode_excel_escapes("under_x005f_score"), "under_score");
        assert_eq!(decode_excel_escapes("plain text"), "plain text");
        assert_eq!(decode_excel_escapes("_x000D__x000A_"), "\r\n");
    }

    #[test]
    fn test_decode_excel_escapes_partial_sequence() {
        // Incomplete sequences should be left as-is
        assert_eq!(decode_excel_escapes("_x00"), "_x00");
        assert_eq!(decode_excel_escapes("_x000d"), "_x000d");
        assert_eq!(decode_excel_escapes("a_xyzw_b"), "a_xyzw_b");
    }

    fn minimal_package(sheet_xml: &str) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        let parts = [
            ("[Content_Types].xml", "<Types/>".to_string()),
            (
                "xl/workbook.xml",
                r#"<workbook xmlns:r="r"><sheets><sheet name="sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#.to_string(),
            ),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<Relationships><Relationship Id="rId1" Type="http://x/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#.to_string(),
            ),
            (
                "xl/sharedStrings.xml",
                "<sst><si><t>סוכן</t></si><si><r><t>מנהל </t></r><r><t>סחר</t></r></si></sst>".to_string(),
            ),
            ("xl/worksheets/sheet1.xml", sheet_xml.to_string()),
        ];
        for (name, body) in parts {
            zip.start_file(name, options).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_read_cell_types_and_merges() {
        let sheet = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>
            <row r="2"><c r="A2"><v>12.5</v></c><c r="B2" t="inlineStr"><is><t>ערוץ</t></is></c>
              <c r="C2"><f>SUM(A2:A2)</f><v>12.5</v></c><c r="D2" t="b"><v>1</v></c></row>
            </sheetData><mergeCells count="1"><mergeCell ref="A3:B3"/></mergeCells></worksheet>"#;

        let wb = XlsxReader::read(Cursor::new(minimal_package(sheet))).unwrap();
        let ws = wb.worksheet_by_name("sheet1").unwrap();

        assert_eq!(ws.text_at(0, 0), "סוכן");
        assert_eq!(ws.text_at(0, 1), "מנהל סחר");
        assert_eq!(ws.get_value_at(1, 0), CellValue::Number(12.5));
        assert_eq!(ws.text_at(1, 1), "ערוץ");
        assert_eq!(ws.get_value_at(1, 2).formula_text(), Some("=SUM(A2:A2)"));
        assert_eq!(ws.get_value_at(1, 2).as_number(), Some(12.5));
        assert_eq!(ws.get_value_at(1, 3), CellValue::Boolean(true));
        assert_eq!(ws.merged_regions().len(), 1);

        let flat = XlsxReader::read_values(Cursor::new(minimal_package(sheet))).unwrap();
        let ws = flat.worksheet(0).unwrap();
        assert_eq!(ws.get_value_at(1, 2), CellValue::Number(12.5));
    }

    #[test]
    fn test_rejects_non_xlsx_zip() {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("hello.txt", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"hi").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        assert!(matches!(
            XlsxReader::read(Cursor::new(bytes)),
            Err(XlsxError::NotXlsx)
        ));
    }

    #[test]
    fn test_bad_shared_string_names_sheet_and_cell() {
        let sheet = r#"<worksheet><sheetData>
            <row r="4"><c r="C4" t="s"><v>7</v></c></row>
            </sheetData></worksheet>"#;

        match XlsxReader::read(Cursor::new(minimal_package(sheet))) {
            Err(XlsxError::BadCell { sheet, cell, reason }) => {
                assert_eq!(sheet, "sheet1");
                assert_eq!(cell, "C4");
                assert_eq!(reason, "shared string 7 out of range");
            }
            other => panic!("expected a bad cell error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.xlsx");
        let err = XlsxReader::read_file_values(&path).unwrap_err();
        assert!(matches!(&err, XlsxError::Open { path: p, .. } if p == &path));
        assert!(err.to_string().contains("absent.xlsx"));
    }
}
