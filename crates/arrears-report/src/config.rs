//! Report configuration
//!
//! Every data-specific literal the pipeline matches against lives here:
//! column names, filter values, market definitions, the rollup tree. The
//! defaults describe the commission workbook the reports were built for; a
//! JSON file can override any subset of them.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use arrears_core::CellStyle;
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::rollup::RollupTree;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Names of the source and template columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub manager: String,
    pub region: String,
    /// Alternate spelling of the region column seen in some exports
    pub region_alt: String,
    pub agent: String,
    pub channel: String,
    pub customer_code: String,
    pub customer_name: String,
    pub payer_code: String,
    pub payer_name: String,
    pub agent_code: String,
    /// Total debt balance; the default `sum_header`
    pub total: String,
    /// Debt balance due up to today
    pub today: String,
    /// Row-wise sum of the dynamic month columns in derived sheets
    pub helper: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            manager: "מנהל סחר".into(),
            region: "מנהל אזור".into(),
            region_alt: "מנהל איזור".into(),
            agent: "סוכן".into(),
            channel: "ערוץ".into(),
            customer_code: "קוד לקוח קצה".into(),
            customer_name: "לקוח קצה".into(),
            payer_code: "קוד לקוח משלם".into(),
            payer_name: "לקוח משלם".into(),
            agent_code: "קוד סוכן".into(),
            total: "סה\"כ סכום יתרת חוב".into(),
            today: "סה\"כ סכום יתרת חוב עד היום".into(),
            helper: "טור עזר".into(),
        }
    }
}

/// Literals used by the master filter chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Agent-code values that bypass digit-only normalization
    pub agent_code_keep: Vec<String>,
    /// Case-insensitive pattern marking summary rows in the agent-code column
    pub summary_pattern: String,
    pub export_channel: String,
    /// Values treated as "other" in the manager/region columns
    pub other_values: Vec<String>,
    pub other_columns: Vec<String>,
    /// A row must carry a value in at least one of these columns
    pub required_identity: Vec<String>,
    /// Known agent-name misspellings mapped to their canonical form
    pub agent_renames: BTreeMap<String, String>,
    /// Agent names whose rows are excluded outright
    pub bad_agents: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        let agent_renames = [("יעל כץ מלונות", "יעל כץ"), ("יעל כץ תדמיתי", "יעל כץ")]
            .into_iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();
        Self {
            agent_code_keep: strings(&["אחר"]),
            summary_pattern: r#"(?i)(?:סה"כ|סהכ|Total|סיכום)"#.into(),
            export_channel: "ייצוא".into(),
            other_values: strings(&["אחר", "אחר אחר"]),
            other_columns: strings(&["מנהל סחר", "מנהל אזור", "מנהל איזור"]),
            required_identity: strings(&["קוד סוכן", "קוד לקוח קצה", "לקוח קצה"]),
            agent_renames,
            bad_agents: strings(&["חובות מסופקים", "לקוחות שוק קמעונאי"]),
        }
    }
}

/// Selection of master rows by manager and, optionally, channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketFilter {
    /// Name of the sheet the selection is written to
    pub sheet: String,
    pub manager: String,
    pub channel: Option<String>,
    /// Rows whose region contains this text are dropped before writing
    #[serde(default)]
    pub exclude_region: Option<String>,
}

/// Derived sheet settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivedConfig {
    /// Dynamic month columns kept after the anchor column
    pub max_dynamic_columns: usize,
    pub suppression_threshold: f64,
    pub suppression_marker: String,
    /// Label written left of the column sums
    pub sum_label: String,
    pub private_market: MarketFilter,
    pub image_market: MarketFilter,
    pub region_general_sheet: String,
    /// Managers that never get a sheet of their own
    pub manager_skip: Vec<String>,
    /// Manager sheets whose name contains this text are narrowed to its rows
    pub refine_base: String,
    /// Manager/region text written into the narrowed sheet
    pub refine_display: String,
    pub header_colors: HeaderColors,
}

impl Default for DerivedConfig {
    fn default() -> Self {
        Self {
            max_dynamic_columns: 4,
            suppression_threshold: -1000.0,
            suppression_marker: "-".into(),
            sum_label: "סכום :".into(),
            private_market: MarketFilter {
                sheet: "שוק פרטי".into(),
                manager: "רפי מור יוסף- סחר".into(),
                channel: Some("שוק פרטי".into()),
                exclude_region: Some("רפי מור יוסף- סחר".into()),
            },
            image_market: MarketFilter {
                sheet: "שוק תדמיתי".into(),
                manager: "עמי חכמון".into(),
                channel: None,
                exclude_region: None,
            },
            region_general_sheet: "מנהל אזור כללי".into(),
            manager_skip: strings(&["עמי חכמון"]),
            refine_base: "רפי מור יוסף".into(),
            refine_display: "רפי מור יוסף- סחר".into(),
            header_colors: HeaderColors::default(),
        }
    }
}

/// Header fills for the amount columns of manager and by-agent sheets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderColors {
    /// Column H
    pub total: String,
    /// Column I
    pub today: String,
    /// Columns J..N
    pub months: String,
}

impl Default for HeaderColors {
    fn default() -> Self {
        Self {
            total: "#BFEE90".into(),
            today: "#90BFEE".into(),
            months: "#EEBF90".into(),
        }
    }
}

impl HeaderColors {
    /// Parsed (total, today, months) fills
    pub fn rgb(&self) -> Result<(u32, u32, u32)> {
        let parse = |hex: &str| {
            CellStyle::parse_rgb(hex)
                .ok_or_else(|| ReportError::Config(format!("invalid colour '{}'", hex)))
        };
        Ok((parse(&self.total)?, parse(&self.today)?, parse(&self.months)?))
    }
}

/// Pivot sheet settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PivotConfig {
    pub private: MarketFilter,
    pub image: MarketFilter,
    /// Label for rows whose agent is blank
    pub blank_label: String,
}

impl Default for PivotConfig {
    fn default() -> Self {
        Self {
            private: MarketFilter {
                sheet: "פיבוט פרטי".into(),
                manager: "רפי מור יוסף-סחר".into(),
                channel: Some("שוק פרטי".into()),
                exclude_region: None,
            },
            image: MarketFilter {
                sheet: "פיבוט תדמיתי".into(),
                manager: "עמי חכמון".into(),
                channel: None,
                exclude_region: None,
            },
            blank_label: "(ריק)".into(),
        }
    }
}

/// Complete report configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub columns: ColumnNames,
    /// Identity columns copied to the master sheet, in this order, when present
    pub front_candidates: Vec<String>,
    /// Fixed columns leading the inferred header order
    pub inference_prefix: Vec<String>,
    /// Source columns kept after the sum column
    pub trailing_amount_columns: usize,
    pub header_scan_rows: usize,
    pub header_min_cells: usize,
    pub master_sheet: String,
    /// Label written above the grand total in the master trailer
    pub master_sum_label: String,
    pub filters: FilterConfig,
    pub derived: DerivedConfig,
    pub pivots: PivotConfig,
    pub rollup: RollupTree,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            front_candidates: strings(&[
                "מנהל סחר",
                "מנהל אזור",
                "מנהל איזור",
                "סוכן",
                "ערוץ",
                "שיטת תשלום לקוח משלם",
                "קוד לקוח קצה",
                "לקוח קצה",
                "קוד סוכן",
            ]),
            inference_prefix: strings(&[
                "מנהל סחר",
                "מנהל אזור",
                "סוכן",
                "ערוץ",
                "קוד לקוח קצה",
                "לקוח קצה",
                "קוד סוכן",
                "סה\"כ סכום יתרת חוב",
                "סה\"כ סכום יתרת חוב עד היום",
            ]),
            trailing_amount_columns: 5,
            header_scan_rows: 120,
            header_min_cells: 5,
            master_sheet: "מעובד".into(),
            master_sum_label: "סכום".into(),
            filters: FilterConfig::default(),
            derived: DerivedConfig::default(),
            pivots: PivotConfig::default(),
            rollup: RollupTree::default(),
        }
    }
}

impl ReportConfig {
    /// Load a configuration from a JSON file; missing keys keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: ReportConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values that can only fail at run time
    pub fn validate(&self) -> Result<()> {
        regex::Regex::new(&self.filters.summary_pattern).map_err(|e| {
            ReportError::Config(format!("summary_pattern: {}", e))
        })?;
        self.derived.header_colors.rgb()?;
        if self.header_min_cells == 0 {
            return Err(ReportError::Config("header_min_cells must be at least 1".into()));
        }
        if self.derived.max_dynamic_columns == 0 {
            return Err(ReportError::Config(
                "max_dynamic_columns must be at least 1".into(),
            ));
        }
        self.rollup.validate()
    }
}

/// Options for a single run
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// Preferred source sheet, matched case-insensitively; the first sheet otherwise
    pub sheet_hint: String,
    /// Overrides the configured total column as the column summed in the trailer
    pub sum_header: Option<String>,
    /// Drop fully empty rows and rows without any identity value
    pub drop_empty: bool,
    /// Keep rows whose manager/region is "other"
    pub keep_other: bool,
    /// Keep the `_temp` working directory
    pub keep_temp: bool,
    pub split_by_manager: bool,
    pub market_private: bool,
    pub market_image: bool,
    pub region_general: bool,
    pub pivot_private: bool,
    pub pivot_image: bool,
    pub by_agent: bool,
}

impl RunOptions {
    /// Options with every optional stage and derived sheet turned off
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(input: P, output_dir: Q) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            sheet_hint: "sheet1".into(),
            sum_header: None,
            drop_empty: false,
            keep_other: false,
            keep_temp: false,
            split_by_manager: false,
            market_private: false,
            market_image: false,
            region_general: false,
            pivot_private: false,
            pivot_image: false,
            by_agent: false,
        }
    }

    /// Turn on every derived sheet
    pub fn with_all_reports(mut self) -> Self {
        self.split_by_manager = true;
        self.market_private = true;
        self.market_image = true;
        self.region_general = true;
        self.pivot_private = true;
        self.pivot_image = true;
        self.by_agent = true;
        self
    }

    /// The column summed into the master trailer
    pub fn sum_header<'a>(&'a self, config: &'a ReportConfig) -> &'a str {
        self.sum_header.as_deref().unwrap_or(&config.columns.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"filters": {{"bad_agents": ["סוכן בדיקה"]}}, "header_scan_rows": 40}}"#
        )
        .unwrap();

        let config = ReportConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.filters.bad_agents, vec!["סוכן בדיקה"]);
        assert_eq!(config.header_scan_rows, 40);
        assert_eq!(config.filters.export_channel, "ייצוא");
        assert_eq!(config.rollup, RollupTree::default());
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let mut config = ReportConfig::default();
        config.filters.summary_pattern = "(".into();
        assert!(matches!(config.validate(), Err(ReportError::Config(_))));

        let mut config = ReportConfig::default();
        config.derived.header_colors.months = "orange".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sum_header_override() {
        let config = ReportConfig::default();
        let mut options = RunOptions::new("in.xlsx", "out");
        assert_eq!(options.sum_header(&config), "סה\"כ סכום יתרת חוב");
        options.sum_header = Some("יתרה".into());
        assert_eq!(options.sum_header(&config), "יתרה");
    }
}
