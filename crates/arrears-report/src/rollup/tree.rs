//! The by-agent hierarchy as data
//!
//! The sheet is described by an ordered list of [`Section`]s. The build pass
//! writes them top to bottom and the rebind pass walks the same list to
//! find every row again after rows have been inserted.

use std::collections::HashSet;

use arrears_core::MAX_SHEET_NAME_LEN;
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

/// Reference to an earlier row of the sheet
///
/// Without a channel the key names a subtotal row; with one it names a
/// [`Section::Single`] agent row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowKey {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

impl RowKey {
    pub fn subtotal<S: Into<String>>(label: S) -> Self {
        Self {
            label: label.into(),
            channel: None,
        }
    }

    pub fn agent<S: Into<String>, C: Into<String>>(label: S, channel: C) -> Self {
        Self {
            label: label.into(),
            channel: Some(channel.into()),
        }
    }
}

/// One block of the by-agent sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Section {
    /// Member rows followed by a subtotal row labelled `label`
    Group {
        label: String,
        members: Vec<String>,
        /// Channel written next to each member and used to look up its pivot record
        channel: String,
        #[serde(default)]
        bold: bool,
        /// Members are filled from their own manager sheets; rows are matched by name only
        #[serde(default)]
        linked: bool,
    },
    /// A lone agent row
    Single { name: String, channel: String },
    /// A subtotal over rows written earlier
    SubtotalOf {
        label: String,
        parts: Vec<RowKey>,
        #[serde(default)]
        bold: bool,
    },
}

impl Section {
    /// Label of the row closing the section, if it has one
    pub fn subtotal_label(&self) -> Option<&str> {
        match self {
            Section::Group { label, .. } | Section::SubtotalOf { label, .. } => Some(label),
            Section::Single { .. } => None,
        }
    }

    pub fn is_bold(&self) -> bool {
        match self {
            Section::Group { bold, .. } | Section::SubtotalOf { bold, .. } => *bold,
            Section::Single { .. } => false,
        }
    }
}

/// Layout of the by-agent sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollupTree {
    pub sheet_name: String,
    /// Channel of records read from the private pivot
    pub private_channel: String,
    /// Channel of records read from the image pivot
    pub image_channel: String,
    /// Channel written next to linked members
    pub national_channel: String,
    /// A blank row is kept above each row whose label is listed here
    pub separators_before: Vec<String>,
    pub sections: Vec<Section>,
}

fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for RollupTree {
    fn default() -> Self {
        let private = "שוק פרטי";
        let image = "שוק תדמיתי";
        let group = |label: &str, members: &[&str], channel: &str, bold: bool| Section::Group {
            label: label.into(),
            members: names(members),
            channel: channel.into(),
            bold,
            linked: false,
        };

        let sections = vec![
            group(
                "שמעון כהן - מנהל אזור",
                &["אמנון ידידי", "יואב מימון", "משה כספי", "עובדיה אבימלך"],
                private,
                true,
            ),
            group(
                "ישראל דנון- מנהל אזור",
                &["מרים בואזיזה", "דוד פדלון", "שמוליק מטרני", "דניאל חורי"],
                private,
                true,
            ),
            group(
                "גיל רפאל",
                &["חאזם קדורה", "חן בן דוד", "לירון בן מוחה", "גיא אלמוזנינו- סוכן", "אוהד אסולין"],
                private,
                true,
            ),
            group("סה\"כ מוקד", &["גילי סופר", "בטי רובין"], private, false),
            Section::Single {
                name: "אריק יחזקאל".into(),
                channel: private.into(),
            },
            Section::SubtotalOf {
                label: "סיכום שוק פרטי".into(),
                parts: vec![
                    RowKey::subtotal("ישראל דנון- מנהל אזור"),
                    RowKey::subtotal("גיל רפאל"),
                    RowKey::subtotal("סה\"כ מוקד"),
                    RowKey::agent("אריק יחזקאל", private),
                ],
                bold: false,
            },
            group("סה\"כ", &["יעל כץ", "אריק יחזקאל"], image, true),
            group("עמי חכמון", &["משה רחמים", "חיים שלו", "ניר עזרא"], image, true),
            Section::Group {
                label: "סה\"כ רשתות ארציות".into(),
                members: names(&[
                    "ארז ביתן",
                    "הילה אלסיאן- סחר",
                    "אלירן דהן",
                    "ליאור לוי - סחר",
                    "עינב כורם",
                    "מנהל אזור כללי",
                ]),
                channel: String::new(),
                bold: true,
                linked: true,
            },
            Section::SubtotalOf {
                label: "סה\"כ".into(),
                parts: vec![
                    RowKey::subtotal("סיכום שוק פרטי"),
                    RowKey::subtotal("סה\"כ"),
                    RowKey::subtotal("עמי חכמון"),
                    RowKey::subtotal("סה\"כ רשתות ארציות"),
                ],
                bold: true,
            },
        ];

        Self {
            sheet_name: "לפי סוכן".into(),
            private_channel: private.into(),
            image_channel: image.into(),
            national_channel: "רשתות ארציות".into(),
            separators_before: names(&["גילי סופר", "יעל כץ", "ארז ביתן", "סיכום שוק פרטי"]),
            sections,
        }
    }
}

impl RollupTree {
    /// Labels of rows that close a section
    pub fn subtotal_labels(&self) -> HashSet<&str> {
        self.sections.iter().filter_map(Section::subtotal_label).collect()
    }

    /// Labels of section rows rendered bold
    pub fn bold_labels(&self) -> HashSet<&str> {
        self.sections
            .iter()
            .filter(|s| s.is_bold())
            .filter_map(Section::subtotal_label)
            .collect()
    }

    /// Members whose figures come from a manager sheet of the same name
    pub fn linked_members(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().flat_map(|s| match s {
            Section::Group {
                members,
                linked: true,
                ..
            } => members.iter().map(String::as_str).collect::<Vec<_>>(),
            _ => Vec::new(),
        })
    }

    /// Check names and that every subtotal part refers to a row written before it
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ReportError::Config(format!("rollup: {}", msg)));

        if self.sheet_name.trim().is_empty()
            || self.sheet_name.chars().count() > MAX_SHEET_NAME_LEN
        {
            return invalid(format!("invalid sheet name '{}'", self.sheet_name));
        }

        let mut known: HashSet<RowKey> = HashSet::new();
        for section in &self.sections {
            match section {
                Section::Group { label, members, .. } => {
                    if label.trim().is_empty() || members.is_empty() {
                        return invalid(format!("group '{}' needs a label and members", label));
                    }
                    known.insert(RowKey::subtotal(label.as_str()));
                }
                Section::Single { name, channel } => {
                    if name.trim().is_empty() {
                        return invalid("single row without a name".into());
                    }
                    known.insert(RowKey::agent(name.as_str(), channel.as_str()));
                }
                Section::SubtotalOf { label, parts, .. } => {
                    if let Some(missing) = parts.iter().find(|p| !known.contains(*p)) {
                        return invalid(format!(
                            "'{}' refers to '{}' before it is written",
                            label, missing.label
                        ));
                    }
                    known.insert(RowKey::subtotal(label.as_str()));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tree_is_valid() {
        let tree = RollupTree::default();
        tree.validate().unwrap();
        assert_eq!(tree.sections.len(), 10);
        assert_eq!(tree.linked_members().count(), 6);
        assert!(tree.bold_labels().contains("עמי חכמון"));
        assert!(!tree.bold_labels().contains("סה\"כ מוקד"));
    }

    #[test]
    fn test_forward_reference_is_rejected() {
        let mut tree = RollupTree::default();
        tree.sections.insert(
            0,
            Section::SubtotalOf {
                label: "מוקדם".into(),
                parts: vec![RowKey::subtotal("גיל רפאל")],
                bold: false,
            },
        );
        assert!(matches!(tree.validate(), Err(ReportError::Config(_))));
    }

    #[test]
    fn test_tree_round_trips_through_json() {
        let tree = RollupTree::default();
        let json = serde_json::to_string(&tree).unwrap();
        assert!(json.contains("\"kind\":\"subtotal_of\""));
        let back: RollupTree = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
    }
}
