//! Per-building hourly demand series: read, augment, rewrite.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::{LogisticsError, Result};

/// An hourly demand table kept as text, so columns this crate does not
/// touch are written back exactly as read.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandSeries {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DemandSeries {
    /// Reads a demand series from disk.
    ///
    /// # Errors
    ///
    /// `Io` if the file is missing or unreadable, `Csv` if it is malformed.
    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| LogisticsError::io(path, e))?;
        Self::from_reader(file, path)
    }

    /// Parses a demand series from any reader; `path` is kept for messages and writing.
    pub fn from_reader(reader: impl io::Read, path: &Path) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().from_reader(reader);
        let headers = rdr
            .headers()
            .map_err(|e| LogisticsError::csv(path, e))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(|e| LogisticsError::csv(path, e))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            rows,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Text cells of one column.
    ///
    /// # Errors
    ///
    /// `Lookup` if the column is absent.
    pub fn column(&self, column: &str) -> Result<Vec<&str>> {
        let idx = self.column_index(column).ok_or_else(|| {
            LogisticsError::lookup(self.path.display().to_string(), format!("column {column}"))
        })?;
        Ok(self
            .rows
            .iter()
            .map(|row| row.get(idx).map(String::as_str).unwrap_or_default())
            .collect())
    }

    /// Parses the timestamp column.
    ///
    /// # Errors
    ///
    /// `Lookup` if the column is absent, `Parse` on the first unreadable timestamp.
    pub fn timestamps(&self, column: &str) -> Result<Vec<NaiveDateTime>> {
        self.column(column)?
            .into_iter()
            .enumerate()
            .map(|(i, cell)| {
                parse_timestamp(cell).ok_or_else(|| {
                    LogisticsError::parse(&self.path, format!("row {}: \"{cell}\" is not a timestamp", i + 1))
                })
            })
            .collect()
    }

    /// Overwrites a numeric column, appending it if absent.
    ///
    /// # Errors
    ///
    /// `IndexMismatch` if `values` does not have one entry per row.
    pub fn set_column(&mut self, column: &str, values: &[f64]) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(LogisticsError::IndexMismatch(format!(
                "{} values for column {column} but {} rows in \"{}\"",
                values.len(),
                self.rows.len(),
                self.path.display()
            )));
        }

        let idx = match self.column_index(column) {
            Some(idx) => idx,
            None => {
                self.headers.push(column.to_string());
                self.headers.len() - 1
            }
        };
        for (row, value) in self.rows.iter_mut().zip(values) {
            if row.len() <= idx {
                row.resize(idx + 1, String::new());
            }
            row[idx] = value.to_string();
        }
        Ok(())
    }

    /// Writes the series as CSV to any writer.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if writing fails.
    pub fn write_csv(&self, writer: impl Write) -> io::Result<()> {
        let mut wtr = csv::WriterBuilder::new().from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Writes the series back to the file it was read from.
    ///
    /// The new content goes to a sibling `.tmp` file that then replaces the
    /// original, so a failed write leaves the original intact.
    ///
    /// # Errors
    ///
    /// `Io` if the temporary file cannot be written or renamed.
    pub fn persist(&self) -> Result<()> {
        let tmp = self.staging_path();
        let written = File::create(&tmp).and_then(|file| {
            let mut buf = BufWriter::new(file);
            self.write_csv(&mut buf)?;
            buf.into_inner().map_err(|e| e.into_error())?.sync_all()
        });
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(LogisticsError::io(&tmp, e));
        }
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            LogisticsError::io(&self.path, e)
        })
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Parses an ISO-8601 timestamp, with or without UTC offset, to its local wall-clock time.
///
/// Fractional seconds are accepted, and a bare date reads as midnight.
///
/// ```
/// use logistic_load::io::demand::parse_timestamp;
/// use chrono::Timelike;
///
/// let ts = parse_timestamp("2005-01-01 07:00:00+08:00").unwrap();
/// assert_eq!(ts.hour(), 7);
/// assert!(parse_timestamp("2005-01-01T07:00:00").is_some());
/// assert!(parse_timestamp("2005-01-01 07:00:00.5").is_some());
/// assert_eq!(parse_timestamp("2005-01-01").unwrap().hour(), 0);
/// assert!(parse_timestamp("yesterday").is_none());
/// ```
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    // `%.f` also matches when the fraction is absent.
    const OFFSET_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f%:z",
        "%Y-%m-%dT%H:%M:%S%.f%:z",
        "%Y-%m-%d %H:%M:%S%.f%z",
        "%Y-%m-%dT%H:%M:%S%.f%z",
    ];
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];

    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.naive_local());
    }
    OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(value, fmt).ok())
        .map(|ts| ts.naive_local())
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
