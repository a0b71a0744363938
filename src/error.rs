//! Typed failures for reference-table lookups, model inputs, and file I/O.

use std::io;
use std::path::{Path, PathBuf};

/// Coarse classification of a [`LogisticsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ErrorKind {
    /// A schedule, reference row, building, or column is absent.
    Lookup,
    /// A denominator (capacity, efficiency) is zero or negative.
    Configuration,
    /// Reference tables disagree on shape or keys.
    IndexMismatch,
    /// An input file is missing or unreadable, or an output is unwritable.
    Io,
}

/// Errors raised while deriving or writing logistics loads.
///
/// Every failure is attributable to a single building (or to the shared
/// reference tables, in which case every building fails the same way).
#[derive(Debug, thiserror::Error)]
pub enum LogisticsError {
    #[error("no entry for `{key}` in {table}")]
    Lookup { table: String, key: String },

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("index mismatch: {0}")]
    IndexMismatch(String),

    #[error("cannot access \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed CSV in \"{}\": {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("cannot parse \"{}\": {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

impl LogisticsError {
    pub fn lookup(table: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Lookup {
            table: table.into(),
            key: key.into(),
        }
    }

    pub fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn parse(path: &Path, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Returns the failure class this error belongs to.
    ///
    /// Malformed CSV and unparseable cells are input-file problems and are
    /// reported as [`ErrorKind::Io`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Lookup { .. } => ErrorKind::Lookup,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::IndexMismatch(_) => ErrorKind::IndexMismatch,
            Self::Io { .. } | Self::Csv { .. } | Self::Parse { .. } => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, LogisticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_variants() {
        assert_eq!(
            LogisticsError::lookup("schedules", "COLD").kind(),
            ErrorKind::Lookup
        );
        assert_eq!(
            LogisticsError::Configuration("zero".into()).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            LogisticsError::parse(Path::new("a.csv"), "bad").kind(),
            ErrorKind::Io
        );
    }

    #[test]
    fn io_message_names_path() {
        let err = LogisticsError::io(
            Path::new("demand/B001.csv"),
            io::Error::new(io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("demand/B001.csv"));
    }
}
