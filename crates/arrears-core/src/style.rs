//! Cell formatting
//!
//! Only the attributes the generated reports use are modelled: bold text,
//! centred alignment, a solid background fill and a number format code.

/// Formatting applied to a single cell
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CellStyle {
    /// Bold font
    pub bold: bool,
    /// Horizontally (and vertically) centred
    pub centered: bool,
    /// Solid fill as 0xRRGGBB
    pub fill_rgb: Option<u32>,
    /// Number format code (e.g., "#,##0.00")
    pub number_format: Option<String>,
}

impl CellStyle {
    /// Create a default style
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bold
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Set centred alignment
    pub fn centered(mut self) -> Self {
        self.centered = true;
        self
    }

    /// Set a solid fill color
    pub fn fill(mut self, rgb: u32) -> Self {
        self.fill_rgb = Some(rgb);
        self
    }

    /// Set the number format code
    pub fn number_format<S: Into<String>>(mut self, code: S) -> Self {
        self.number_format = Some(code.into());
        self
    }

    /// Whether the style differs from the default
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Parse "RRGGBB" or "#RRGGBB" into 0xRRGGBB
    pub fn parse_rgb(hex: &str) -> Option<u32> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }
        u32::from_str_radix(hex, 16).ok()
    }
}
