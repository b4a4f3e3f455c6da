//! The workbook: an ordered set of uniquely named sheets
//!
//! Report passes take the workbook by `&mut` and leave it consistent, so any
//! pass can run against an in-memory fixture.

use crate::error::{Error, Result};
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

const FORBIDDEN_IN_SHEET_NAME: [char; 7] = [':', '\\', '/', '?', '*', '[', ']'];

#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Worksheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.sheets.get(index)
    }

    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.sheets.get_mut(index)
    }

    /// Exact-name lookup
    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.sheet_index(name).map(|i| &self.sheets[i])
    }

    pub fn worksheet_by_name_mut(&mut self, name: &str) -> Option<&mut Worksheet> {
        let index = self.sheet_index(name)?;
        self.sheets.get_mut(index)
    }

    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.sheets.iter().position(|ws| ws.name() == name)
    }

    /// Excel treats sheet names case-insensitively; so does the source-sheet hint
    pub fn sheet_index_ignore_case(&self, name: &str) -> Option<usize> {
        let wanted = name.to_lowercase();
        self.sheets
            .iter()
            .position(|ws| ws.name().to_lowercase() == wanted)
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.worksheets().map(|ws| ws.name().to_string()).collect()
    }

    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.sheets.iter()
    }

    /// Append an empty sheet; returns its index
    pub fn add_worksheet_with_name(&mut self, name: &str) -> Result<usize> {
        self.add_existing_worksheet(Worksheet::new(name))
    }

    /// Append `worksheet` under its own name; returns its index
    pub fn add_existing_worksheet(&mut self, worksheet: Worksheet) -> Result<usize> {
        self.check_new_name(worksheet.name())?;
        self.sheets.push(worksheet);
        Ok(self.sheets.len() - 1)
    }

    /// Take a sheet out of the workbook
    pub fn remove_worksheet(&mut self, index: usize) -> Result<Worksheet> {
        if index < self.sheets.len() {
            Ok(self.sheets.remove(index))
        } else {
            Err(Error::SheetOutOfBounds(index, self.sheets.len()))
        }
    }

    /// Drop the sheet called `name`, if any; true when one was dropped
    pub fn remove_worksheet_by_name(&mut self, name: &str) -> bool {
        self.sheet_index(name)
            .map(|index| self.sheets.remove(index))
            .is_some()
    }

    /// Delete any sheet called `name` and append a fresh empty one
    ///
    /// Builders use this so a re-run replaces their sheet instead of failing
    /// on the duplicate name.
    pub fn replace_worksheet(&mut self, name: &str) -> Result<&mut Worksheet> {
        self.remove_worksheet_by_name(name);
        let index = self.add_worksheet_with_name(name)?;
        self.sheets
            .get_mut(index)
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))
    }

    fn check_new_name(&self, name: &str) -> Result<()> {
        let reject = |why: String| Err(Error::InvalidSheetName(format!("'{}': {}", name, why)));
        if name.is_empty() {
            return reject("empty name".into());
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return reject(format!("longer than {} characters", MAX_SHEET_NAME_LEN));
        }
        if let Some(c) = name.chars().find(|c| FORBIDDEN_IN_SHEET_NAME.contains(c)) {
            return reject(format!("contains '{}'", c));
        }
        if self.sheet_index_ignore_case(name).is_some() {
            return Err(Error::DuplicateSheetName(name.into()));
        }
        Ok(())
    }
}
