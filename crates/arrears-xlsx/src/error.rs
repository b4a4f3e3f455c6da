//! Package-level failures, each naming the file, archive part or cell involved

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

#[derive(Debug, Error)]
pub enum XlsxError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot create {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Write failure inside an already opened package
    #[error("write failed: {0}")]
    Io(#[from] io::Error),

    #[error("not a zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A zip archive without the xlsx content-types part
    #[error("not an xlsx package: [Content_Types].xml is missing")]
    NotXlsx,

    #[error("package part {0} is missing")]
    MissingPart(String),

    #[error("malformed XML in {part}: {source}")]
    Xml {
        part: String,
        #[source]
        source: quick_xml::Error,
    },

    #[error("sheet '{sheet}' cell {cell}: {reason}")]
    BadCell {
        sheet: String,
        cell: String,
        reason: String,
    },

    #[error("workbook has no worksheets")]
    NoWorksheets,

    #[error(transparent)]
    Model(#[from] arrears_core::Error),
}

impl XlsxError {
    pub(crate) fn open(path: &Path, source: io::Error) -> Self {
        XlsxError::Open {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn create(path: &Path, source: io::Error) -> Self {
        XlsxError::Create {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn xml(part: &str, source: quick_xml::Error) -> Self {
        XlsxError::Xml {
            part: part.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failing_place() {
        let err = XlsxError::open(Path::new("/data/in.xlsx"), io::ErrorKind::NotFound.into());
        assert!(err.to_string().starts_with("cannot open /data/in.xlsx: "));

        let err = XlsxError::BadCell {
            sheet: "Sheet1".into(),
            cell: "B7".into(),
            reason: "shared string 12 out of range".into(),
        };
        assert_eq!(
            err.to_string(),
            "sheet 'Sheet1' cell B7: shared string 12 out of range"
        );
    }
}
