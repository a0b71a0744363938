//! Labelled reference tables read from CSV.

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{LogisticsError, Result};

/// A CSV table whose rows are keyed by one index column.
///
/// Cells are kept as text and parsed on access, so unused non-numeric
/// columns never cause a failure.
#[derive(Debug, Clone)]
pub struct LabeledTable {
    path: PathBuf,
    index: String,
    columns: Vec<String>,
    rows: Vec<(String, Vec<String>)>,
}

impl LabeledTable {
    /// Reads a table from disk, keyed by the `index` column.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be opened, `Csv` if it is malformed, `Lookup`
    /// if the index column is absent.
    pub fn read(path: &Path, index: &str) -> Result<Self> {
        let file = File::open(path).map_err(|e| LogisticsError::io(path, e))?;
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(file);
        let table = Self::from_reader(reader, path, index)?;
        debug!(
            path = %path.display(),
            rows = table.rows.len(),
            columns = table.columns.len(),
            "loaded reference table"
        );
        Ok(table)
    }

    /// Parses a table from CSV text; `path` is only used in error messages.
    pub fn from_csv_str(content: &str, path: &Path, index: &str) -> Result<Self> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        Self::from_reader(reader, path, index)
    }

    fn from_reader<R: std::io::Read>(mut reader: csv::Reader<R>, path: &Path, index: &str) -> Result<Self> {
        let headers = reader
            .headers()
            .map_err(|e| LogisticsError::csv(path, e))?
            .clone();
        let index_pos = headers
            .iter()
            .position(|h| h == index)
            .ok_or_else(|| LogisticsError::lookup(path.display().to_string(), index))?;
        let columns = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index_pos)
            .map(|(_, h)| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| LogisticsError::csv(path, e))?;
            let label = record.get(index_pos).unwrap_or_default().to_string();
            let cells = record
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index_pos)
                .map(|(_, c)| c.to_string())
                .collect();
            rows.push((label, cells));
        }

        Ok(Self {
            path: path.to_path_buf(),
            index: index.to_string(),
            columns,
            rows,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Non-index column headers, in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row labels, in file order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|(label, _)| label.as_str())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn table_name(&self) -> String {
        format!("{} ({})", self.path.display(), self.index)
    }

    fn column_index(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| LogisticsError::lookup(self.table_name(), format!("column {column}")))
    }

    fn row_cells(&self, label: &str) -> Result<&[String]> {
        self.rows
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, cells)| cells.as_slice())
            .ok_or_else(|| LogisticsError::lookup(self.table_name(), label))
    }

    fn parse_cell(&self, label: &str, column: &str, cell: &str) -> Result<f64> {
        cell.parse::<f64>().map_err(|_| {
            LogisticsError::parse(
                &self.path,
                format!("row `{label}`, column `{column}`: \"{cell}\" is not a number"),
            )
        })
    }

    /// Text of one cell.
    pub fn text(&self, label: &str, column: &str) -> Result<&str> {
        let col = self.column_index(column)?;
        let cells = self.row_cells(label)?;
        Ok(cells.get(col).map(String::as_str).unwrap_or_default())
    }

    /// Numeric value of one cell.
    ///
    /// # Errors
    ///
    /// `Lookup` if the row or column is absent, `Parse` if the cell is not a number.
    pub fn value(&self, label: &str, column: &str) -> Result<f64> {
        let text = self.text(label, column)?;
        self.parse_cell(label, column, text)
    }

    /// All numeric cells of one row, in column order.
    pub fn row(&self, label: &str) -> Result<Vec<f64>> {
        let cells = self.row_cells(label)?;
        self.columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let cell = cells.get(i).map(String::as_str).unwrap_or_default();
                self.parse_cell(label, column, cell)
            })
            .collect()
    }

    /// Numeric values encoded in the column headers (e.g. `18.33km` -> 18.33).
    ///
    /// # Errors
    ///
    /// `Parse` if a header carries no number.
    pub fn header_values(&self) -> Result<Vec<f64>> {
        self.columns
            .iter()
            .map(|header| {
                parse_header_value(header).ok_or_else(|| {
                    LogisticsError::parse(
                        &self.path,
                        format!("column header \"{header}\" does not start with a number"),
                    )
                })
            })
            .collect()
    }
}

/// Parses the number at the start of a header, ignoring a trailing unit.
///
/// ```
/// use logistic_load::io::table::parse_header_value;
///
/// assert_eq!(parse_header_value("18.33km"), Some(18.33));
/// assert_eq!(parse_header_value("2.5 t"), Some(2.5));
/// assert_eq!(parse_header_value("11"), Some(11.0));
/// assert_eq!(parse_header_value("km"), None);
/// ```
pub fn parse_header_value(header: &str) -> Option<f64> {
    let trimmed = header.trim();
    let number = trimmed.trim_end_matches(|c: char| c.is_alphabetic() || c.is_whitespace());
    number.parse::<f64>().ok()
}
