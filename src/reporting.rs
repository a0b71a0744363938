//! Batch summary for the console and as JSON.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ErrorKind;
use crate::job::JobSummary;
use crate::runner::{DispatchMode, JobOutcome};

/// Failure of one building, flattened for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureReport {
    pub kind: ErrorKind,
    pub message: String,
}

/// Outcome of one building.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BuildingStatus {
    Ok(JobSummary),
    Failed(FailureReport),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingReport {
    pub building: String,
    #[serde(flatten)]
    pub status: BuildingStatus,
}

/// Every building of one scenario run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub scenario: PathBuf,
    pub mode: String,
    pub buildings: Vec<BuildingReport>,
}

impl BatchReport {
    pub fn from_outcomes(scenario: &Path, mode: &DispatchMode, outcomes: Vec<JobOutcome>) -> Self {
        let buildings = outcomes
            .into_iter()
            .map(|outcome| BuildingReport {
                building: outcome.building,
                status: match outcome.result {
                    Ok(summary) => BuildingStatus::Ok(summary),
                    Err(err) => BuildingStatus::Failed(FailureReport {
                        kind: err.kind(),
                        message: err.to_string(),
                    }),
                },
            })
            .collect();
        Self {
            scenario: scenario.to_path_buf(),
            mode: mode.label(),
            buildings,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.buildings.len() - self.failed()
    }

    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &FailureReport)> {
        self.buildings.iter().filter_map(|b| match &b.status {
            BuildingStatus::Failed(failure) => Some((b.building.as_str(), failure)),
            BuildingStatus::Ok(_) => None,
        })
    }

    pub fn building(&self, name: &str) -> Option<&BuildingStatus> {
        self.buildings
            .iter()
            .find(|b| b.building == name)
            .map(|b| &b.status)
    }

    /// Writes the report as pretty-printed JSON to any writer.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if serialisation or writing fails.
    pub fn write_json(&self, mut writer: impl Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        writer.flush()
    }

    /// Writes the report as JSON to a file.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if file creation or writing fails.
    pub fn export_json(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        self.write_json(BufWriter::new(file))
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Logistics Load Report ---")?;
        writeln!(f, "Scenario:   {}", self.scenario.display())?;
        writeln!(f, "Dispatch:   {}", self.mode)?;
        writeln!(f, "Buildings:  {} ok, {} failed", self.succeeded(), self.failed())?;
        for b in &self.buildings {
            match &b.status {
                BuildingStatus::Ok(summary) => {
                    write!(
                        f,
                        "  {:<12} ok      {:>6} h  forklift {:.2} kWh",
                        b.building, summary.rows, summary.forklift
                    )?;
                    for (carrier, total) in &summary.truck {
                        write!(f, "  truck_{carrier} {total:.2}")?;
                    }
                    writeln!(f)?;
                }
                BuildingStatus::Failed(failure) => {
                    writeln!(
                        f,
                        "  {:<12} FAILED  [{:?}] {}",
                        b.building, failure.kind, failure.message
                    )?;
                }
            }
        }
        Ok(())
    }
}
