//! Workbook-wide style table for the XLSX writer
//!
//! Every distinct [`CellStyle`] used in the workbook becomes one `cellXfs`
//! entry. Fonts, fills and number formats are deduplicated separately.

use ahash::AHashMap;

use arrears_core::{CellStyle, Workbook};

/// Number formats that Excel defines without a `<numFmt>` entry
const BUILTIN_NUM_FMTS: &[(&str, u32)] = &[
    ("0", 1),
    ("0.00", 2),
    ("#,##0", 3),
    ("#,##0.00", 4),
    ("0%", 9),
    ("0.00%", 10),
];

/// First id available for custom number formats
const FIRST_CUSTOM_NUM_FMT: u32 = 164;

#[derive(Debug, Clone, Copy)]
struct ResolvedXfIds {
    font_id: u32,
    fill_id: u32,
    num_fmt_id: u32,
}

pub(crate) struct XlsxStyleTable {
    /// Distinct styles; index == xf id, 0 is the default style
    styles: Vec<CellStyle>,
    style_to_xf: AHashMap<CellStyle, u32>,
}

impl XlsxStyleTable {
    pub(crate) fn build(workbook: &Workbook) -> Self {
        let mut table = Self {
            styles: vec![CellStyle::default()],
            style_to_xf: AHashMap::new(),
        };
        table.style_to_xf.insert(CellStyle::default(), 0);

        for sheet in workbook.worksheets() {
            for (_row, _col, cell) in sheet.iter_cells() {
                if let Some(style) = &cell.style {
                    if !table.style_to_xf.contains_key(style) {
                        let id = table.styles.len() as u32;
                        table.styles.push(style.clone());
                        table.style_to_xf.insert(style.clone(), id);
                    }
                }
            }
        }

        table
    }

    /// xf id of a cell style, 0 for the default
    pub(crate) fn xf_id_for(&self, style: Option<&CellStyle>) -> u32 {
        style
            .and_then(|s| self.style_to_xf.get(s).copied())
            .unwrap_or(0)
    }

    pub(crate) fn to_styles_xml(&self) -> String {
        let mut font_ids: AHashMap<bool, u32> = AHashMap::new();
        let mut fonts: Vec<bool> = vec![false];
        font_ids.insert(false, 0);

        // Excel requires the first two fills to be: none and gray125
        let mut fill_ids: AHashMap<u32, u32> = AHashMap::new();
        let mut fills: Vec<u32> = Vec::new();

        let mut numfmt_ids: AHashMap<String, u32> = AHashMap::new();
        let mut numfmts: Vec<(u32, String)> = Vec::new();
        let mut next_numfmt_id = FIRST_CUSTOM_NUM_FMT;

        let mut resolved: Vec<ResolvedXfIds> = Vec::with_capacity(self.styles.len());

        for style in &self.styles {
            let font_id = *font_ids.entry(style.bold).or_insert_with(|| {
                fonts.push(style.bold);
                fonts.len() as u32 - 1
            });

            let fill_id = match style.fill_rgb {
                None => 0,
                Some(rgb) => *fill_ids.entry(rgb).or_insert_with(|| {
                    fills.push(rgb);
                    fills.len() as u32 + 1
                }),
            };

            let num_fmt_id = match style.number_format.as_deref() {
                None | Some("General") => 0,
                Some(code) => match BUILTIN_NUM_FMTS.iter().find(|(c, _)| *c == code) {
                    Some((_, id)) => *id,
                    None => *numfmt_ids.entry(code.to_string()).or_insert_with(|| {
                        let id = next_numfmt_id;
                        next_numfmt_id += 1;
                        numfmts.push((id, code.to_string()));
                        id
                    }),
                },
            };

            resolved.push(ResolvedXfIds {
                font_id,
                fill_id,
                num_fmt_id,
            });
        }

        let mut xml = String::new();
        xml.push_str(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !numfmts.is_empty() {
            xml.push_str(&format!("\n  <numFmts count=\"{}\">", numfmts.len()));
            for (id, code) in &numfmts {
                xml.push_str(&format!(
                    "\n    <numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                    id,
                    escape_xml_attr(code)
                ));
            }
            xml.push_str("\n  </numFmts>");
        }

        xml.push_str(&format!("\n  <fonts count=\"{}\">", fonts.len()));
        for bold in &fonts {
            xml.push_str(&format!(
                "\n    <font>{}<sz val=\"11\"/><name val=\"Calibri\"/><family val=\"2\"/></font>",
                if *bold { "<b/>" } else { "" }
            ));
        }
        xml.push_str("\n  </fonts>");

        xml.push_str(&format!("\n  <fills count=\"{}\">", fills.len() + 2));
        xml.push_str("\n    <fill><patternFill patternType=\"none\"/></fill>");
        xml.push_str("\n    <fill><patternFill patternType=\"gray125\"/></fill>");
        for rgb in &fills {
            xml.push_str(&format!(
                "\n    <fill><patternFill patternType=\"solid\"><fgColor rgb=\"FF{:06X}\"/><bgColor indexed=\"64\"/></patternFill></fill>",
                rgb
            ));
        }
        xml.push_str("\n  </fills>");

        xml.push_str(
            r#"
  <borders count="1">
    <border><left/><right/><top/><bottom/><diagonal/></border>
  </borders>
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>"#,
        );

        xml.push_str(&format!("\n  <cellXfs count=\"{}\">", self.styles.len()));
        for (style, ids) in self.styles.iter().zip(&resolved) {
            xml.push_str("\n    ");
            xml.push_str(&write_xf(style, *ids));
        }
        xml.push_str("\n  </cellXfs>");

        xml.push_str(
            r#"
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>
  <dxfs count="0"/>
  <tableStyles count="0" defaultTableStyle="TableStyleMedium9" defaultPivotStyle="PivotStyleLight16"/>
</styleSheet>"#,
        );
        xml
    }
}

fn write_xf(style: &CellStyle, ids: ResolvedXfIds) -> String {
    let mut attrs = format!(
        "numFmtId=\"{}\" fontId=\"{}\" fillId=\"{}\" borderId=\"0\" xfId=\"0\"",
        ids.num_fmt_id, ids.font_id, ids.fill_id
    );
    if ids.num_fmt_id != 0 {
        attrs.push_str(" applyNumberFormat=\"1\"");
    }
    if ids.font_id != 0 {
        attrs.push_str(" applyFont=\"1\"");
    }
    if ids.fill_id != 0 {
        attrs.push_str(" applyFill=\"1\"");
    }
    if style.centered {
        format!(
            "<xf {} applyAlignment=\"1\"><alignment horizontal=\"center\" vertical=\"center\"/></xf>",
            attrs
        )
    } else {
        format!("<xf {}/>", attrs)
    }
}

pub(crate) fn escape_xml_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_styles_are_deduplicated() {
        let mut wb = Workbook::new();
        let idx = wb.add_worksheet_with_name("s").unwrap();
        let ws = wb.worksheet_mut(idx).unwrap();
        let header = CellStyle::new().bold().centered().fill(0xF0F0F0);
        ws.set_cell_style_at(0, 0, header.clone()).unwrap();
        ws.set_cell_style_at(0, 1, header.clone()).unwrap();
        ws.set_cell_style_at(1, 0, CellStyle::new().number_format("#,##0.00"))
            .unwrap();
        ws.set_cell_style_at(1, 1, CellStyle::new().number_format("0.000"))
            .unwrap();

        let table = XlsxStyleTable::build(&wb);
        assert_eq!(table.styles.len(), 4);
        assert_eq!(table.xf_id_for(Some(&header)), 1);
        assert_eq!(table.xf_id_for(None), 0);

        let xml = table.to_styles_xml();
        assert!(xml.contains("<numFmt numFmtId=\"164\" formatCode=\"0.000\"/>"));
        assert!(!xml.contains("formatCode=\"#,##0.00\""));
        assert!(xml.contains("rgb=\"FFF0F0F0\""));
        assert!(xml.contains("<fills count=\"3\">"));
        assert!(xml.contains("<alignment horizontal=\"center\""));
    }
}
