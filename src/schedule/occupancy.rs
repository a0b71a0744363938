use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::config::ScenarioPaths;
use crate::error::{LogisticsError, Result};
use crate::schedule::calendar::{AnnualDayTypeCalendar, DayType};
use crate::usage::UsageCategory;

/// Hourly occupancy weights of one usage, split by day type.
///
/// Weights are relative intensities. They are not normalised per curve; the
/// annual operating-hour denominator in [`OccupancySchedule::total_hours`]
/// spreads an annual total across them.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancySchedule {
    usage: UsageCategory,
    curves: BTreeMap<DayType, Vec<f64>>,
    total_hours: u64,
}

impl OccupancySchedule {
    /// Builds a schedule from explicit curves.
    ///
    /// # Errors
    ///
    /// * `Lookup` if a day type has no curve.
    /// * `Configuration` if a weight is negative or not finite, or if the
    ///   curves imply zero annual operating hours.
    pub fn from_curves(
        usage: UsageCategory,
        mut curves: BTreeMap<DayType, Vec<f64>>,
        calendar: &AnnualDayTypeCalendar,
    ) -> Result<Self> {
        let mut lengths = [0usize; 3];
        for (slot, day) in lengths.iter_mut().zip(DayType::ALL) {
            let curve = curves.entry(day).or_default();
            if curve.is_empty() {
                return Err(LogisticsError::lookup(
                    format!("occupancy schedule {usage}"),
                    day.label(),
                ));
            }
            if let Some(bad) = curve.iter().find(|w| !w.is_finite() || **w < 0.0) {
                return Err(LogisticsError::Configuration(format!(
                    "occupancy weight {bad} for {usage} {day} must be finite and non-negative"
                )));
            }
            *slot = curve.len();
        }

        let total_hours = calendar.total_hours(lengths[0], lengths[1], lengths[2]);
        if total_hours == 0 {
            return Err(LogisticsError::Configuration(format!(
                "occupancy schedule of {usage} implies zero annual operating hours"
            )));
        }
        Ok(Self {
            usage,
            curves,
            total_hours,
        })
    }

    /// Parses an occupancy table: `metadata_rows` preamble lines, then a CSV
    /// header with at least `DAY` and `OCCUPANCY`.
    ///
    /// Rows keep file order within each day type; rows with other day labels
    /// are ignored.
    pub fn parse(
        usage: UsageCategory,
        content: &str,
        metadata_rows: usize,
        calendar: &AnnualDayTypeCalendar,
        path: &Path,
    ) -> Result<Self> {
        let body = skip_lines(content, metadata_rows);
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(body.as_bytes());

        let mut curves: BTreeMap<DayType, Vec<f64>> = BTreeMap::new();
        for record in reader.deserialize::<OccupancyRecord>() {
            let record = record.map_err(|e| LogisticsError::csv(path, e))?;
            if let Ok(day) = record.day.parse::<DayType>() {
                curves.entry(day).or_default().push(record.occupancy);
            }
        }

        Self::from_curves(usage, curves, calendar)
    }

    pub fn usage(&self) -> &UsageCategory {
        &self.usage
    }

    /// Annual operating hours implied by the curve lengths.
    pub fn total_hours(&self) -> u64 {
        self.total_hours
    }

    pub fn curve(&self, day: DayType) -> &[f64] {
        self.curves.get(&day).map(Vec::as_slice).unwrap_or_default()
    }

    /// Weight of one hour of one day type.
    ///
    /// # Errors
    ///
    /// `IndexMismatch` if the curve is shorter than `hour + 1`.
    pub fn weight(&self, day: DayType, hour: usize) -> Result<f64> {
        let curve = self.curve(day);
        curve.get(hour).copied().ok_or_else(|| {
            LogisticsError::IndexMismatch(format!(
                "hour {hour} is beyond the {}-hour {day} curve of {}",
                curve.len(),
                self.usage
            ))
        })
    }
}

#[derive(Debug, Deserialize)]
struct OccupancyRecord {
    #[serde(rename = "DAY")]
    day: String,
    #[serde(rename = "OCCUPANCY")]
    occupancy: f64,
}

fn skip_lines(content: &str, n: usize) -> &str {
    let mut rest = content;
    for _ in 0..n {
        match rest.find('\n') {
            Some(idx) => rest = &rest[idx + 1..],
            None => return "",
        }
    }
    rest
}

/// Loads usage occupancy schedules from a scenario's use-type directory.
#[derive(Debug, Clone)]
pub struct OccupancyScheduleResolver {
    paths: ScenarioPaths,
    metadata_rows: usize,
    calendar: AnnualDayTypeCalendar,
}

impl OccupancyScheduleResolver {
    pub fn new(paths: ScenarioPaths, metadata_rows: usize) -> Self {
        Self {
            paths,
            metadata_rows,
            calendar: AnnualDayTypeCalendar::STANDARD,
        }
    }

    /// Loads the schedule of one usage.
    ///
    /// # Errors
    ///
    /// `Lookup` if the usage has no schedule file, `Io` if it cannot be read,
    /// plus any error of [`OccupancySchedule::parse`].
    pub fn resolve(&self, usage: &UsageCategory) -> Result<OccupancySchedule> {
        let path = self.paths.use_type(usage.code());
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => LogisticsError::lookup("occupancy schedules", usage.code()),
            _ => LogisticsError::io(&path, e),
        })?;
        let schedule =
            OccupancySchedule::parse(usage.clone(), &content, self.metadata_rows, &self.calendar, &path)?;
        debug!(
            usage = %usage,
            total_hours = schedule.total_hours(),
            "loaded occupancy schedule"
        );
        Ok(schedule)
    }
}
