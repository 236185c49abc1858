use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::station::StationId;

/// Which of the two input files a load error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Stations,
    Trips,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Stations => f.write_str("station"),
            FileKind::Trips => f.write_str("trip"),
        }
    }
}

/// A load failure. No partial dataset is ever returned alongside one.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to open {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {file} file")]
    Csv {
        file: FileKind,
        #[source]
        source: csv::Error,
    },

    #[error("Error reading {file} on line {line} ({row}): {kind}")]
    Row {
        file: FileKind,
        line: u64,
        row: String,
        kind: RowError,
    },
}

impl LoadError {
    /// The row-level cause, if this error came from a bad row.
    pub fn row_error(&self) -> Option<&RowError> {
        match self {
            LoadError::Row { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("expected at least {expected} fields, found {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("invalid {field} {value:?}: {reason}")]
    InvalidField {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("unknown station {0}")]
    UnknownStation(StationId),

    #[error("unknown gender {0:?}")]
    UnknownGender(String),
}
