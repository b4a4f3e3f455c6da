//! A1 references
//!
//! Rows and columns are 0-based everywhere in the model and only become
//! 1-based letters/numbers when rendered. `$` anchors are accepted on input
//! and dropped; nothing in the reports writes absolute references.

use std::fmt;

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};

/// A single cell position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    pub row: u32,
    pub col: u16,
}

impl CellAddress {
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parse `H12` or `$H$12`
    ///
    /// ```
    /// use arrears_core::CellAddress;
    ///
    /// assert_eq!(CellAddress::parse("B2").unwrap(), CellAddress::new(1, 1));
    /// assert_eq!(CellAddress::parse("$H$10").unwrap().col, 7);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let text = s.trim();
        let invalid = |why: &str| Error::InvalidAddress(format!("'{}': {}", text, why));

        let body = text.strip_prefix('$').unwrap_or(text);
        let split = body
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(body.len());
        let (letters, rest) = body.split_at(split);
        if letters.is_empty() {
            return Err(invalid("no column letters"));
        }
        let digits = rest.strip_prefix('$').unwrap_or(rest);
        if digits.is_empty() {
            return Err(invalid("no row number"));
        }

        let col = Self::letters_to_column(letters)?;
        let row = match digits.parse::<u32>() {
            Ok(0) => return Err(invalid("rows start at 1")),
            Ok(n) => n - 1,
            Err(_) => return Err(invalid("row is not a number")),
        };
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        Ok(Self { row, col })
    }

    /// `0 -> A`, `25 -> Z`, `26 -> AA`
    pub fn column_to_letters(col: u16) -> String {
        let mut letters = Vec::new();
        let mut n = u32::from(col) + 1;
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push(b'A' + rem as u8);
            n = (n - 1) / 26;
        }
        letters.iter().rev().map(|&b| b as char).collect()
    }

    /// Inverse of [`column_to_letters`](Self::column_to_letters), case-insensitive
    pub fn letters_to_column(letters: &str) -> Result<u16> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }
        let number = letters.chars().try_fold(0u32, |acc, c| {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!("'{}' is not a column letter", c)));
            }
            let next = acc * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
            if next > u32::from(MAX_COLS) {
                return Err(Error::ColumnOutOfBounds(u16::MAX, MAX_COLS - 1));
            }
            Ok(next)
        })?;
        Ok((number - 1) as u16)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::column_to_letters(self.col), self.row + 1)
    }
}

/// Inclusive rectangle, always stored top-left to bottom-right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub start: CellAddress,
    pub end: CellAddress,
}

impl CellRange {
    /// Corners may be given in any order
    pub fn new(a: CellAddress, b: CellAddress) -> Self {
        Self {
            start: CellAddress::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellAddress::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    /// `A1:B10`, or a single address for a one-cell range
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().split_once(':') {
            Some((a, b)) => Ok(Self::new(CellAddress::parse(a)?, CellAddress::parse(b)?)),
            None => {
                let cell = CellAddress::parse(s)?;
                Ok(Self::new(cell, cell))
            }
        }
    }

    pub fn overlaps(&self, other: &CellRange) -> bool {
        let rows = self.start.row <= other.end.row && other.start.row <= self.end.row;
        let cols = self.start.col <= other.end.col && other.start.col <= self.end.col;
        rows && cols
    }

    /// Every address in the range, row by row
    pub fn cells(&self) -> impl Iterator<Item = CellAddress> {
        let (cols_from, cols_to) = (self.start.col, self.end.col);
        (self.start.row..=self.end.row)
            .flat_map(move |row| (cols_from..=cols_to).map(move |col| CellAddress::new(row, col)))
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}
