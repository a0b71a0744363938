//! Per-building logistics load computation.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::config::ColumnsConfig;
use crate::error::Result;
use crate::io::buildings::Building;
use crate::io::demand::DemandSeries;
use crate::logistics::RateDeriver;
use crate::schedule::{HourlyEnergyAllocator, OccupancyScheduleResolver};

/// Read-only inputs shared by every job of a batch.
#[derive(Debug, Clone)]
pub struct JobContext {
    pub schedules: OccupancyScheduleResolver,
    pub rates: RateDeriver,
    pub columns: ColumnsConfig,
}

/// Totals written for one building.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSummary {
    /// Hourly rows in the demand series.
    pub rows: usize,
    /// Sum of the forklift column (kWh).
    pub forklift: f64,
    /// Sum of each truck carrier column, keyed by carrier.
    pub truck: BTreeMap<String, f64>,
}

/// Adds forklift and truck energy columns to one building's demand series.
#[derive(Debug, Clone)]
pub struct BuildingLoadJob {
    pub building: Building,
    pub demand_path: PathBuf,
}

impl BuildingLoadJob {
    pub fn new(building: Building, demand_path: PathBuf) -> Self {
        Self {
            building,
            demand_path,
        }
    }

    /// Computes every logistics column and rewrites the demand file in place.
    ///
    /// Only this building's demand file is touched.
    ///
    /// # Errors
    ///
    /// `Io` if the demand file is missing or cannot be rewritten, `Lookup` if
    /// the usage has no schedule or internal loads row, plus any error of the
    /// rate derivation or hourly allocation.
    #[instrument(skip_all, fields(building = %self.building.name))]
    pub fn run(&self, ctx: &JobContext) -> Result<JobSummary> {
        let usage = &self.building.usage;
        let mut series = DemandSeries::read(&self.demand_path)?;
        if series.is_empty() {
            warn!(path = %series.path().display(), "demand series has no rows");
        }

        // Non-logistics usages get zeros without reading the timestamp column.
        let timestamps = if usage.is_logistics() {
            Some(series.timestamps(&ctx.columns.date)?)
        } else {
            warn!(usage = %usage, "not a logistics usage; writing zero loads");
            None
        };
        let rates = ctx.rates.rates_for(usage)?;
        let allocator = HourlyEnergyAllocator::resolve(usage, &ctx.schedules)?;
        let rows = series.len();

        let forklift = self.allocate(&allocator, timestamps.as_deref(), rows, rates.forklift)?;
        series.set_column(&ctx.columns.forklift, &forklift)?;

        let mut truck: BTreeMap<String, f64> = BTreeMap::new();
        for (carrier, rate) in &rates.truck {
            let hourly = self.allocate(&allocator, timestamps.as_deref(), rows, *rate)?;
            series.set_column(&ctx.columns.truck_column(carrier), &hourly)?;
            truck.insert(carrier.clone(), hourly.iter().sum());
        }

        series.persist()?;

        let summary = JobSummary {
            rows,
            forklift: forklift.iter().sum(),
            truck,
        };
        debug!(
            path = %series.path().display(),
            rows,
            forklift = summary.forklift,
            "rewrote demand series"
        );
        Ok(summary)
    }

    fn allocate(
        &self,
        allocator: &HourlyEnergyAllocator,
        timestamps: Option<&[NaiveDateTime]>,
        rows: usize,
        annual_rate: f64,
    ) -> Result<Vec<f64>> {
        match timestamps {
            Some(timestamps) => timestamps
                .iter()
                .map(|ts| allocator.energy(ts, self.building.floor_area, annual_rate))
                .collect(),
            None => Ok(vec![0.0; rows]),
        }
    }
}
