//! Batch execution of building jobs over a scenario.

use std::num::NonZeroUsize;
use std::path::Path;
use std::thread;

use rayon::prelude::*;
use tracing::{error, info};

use crate::config::{DispatchConfig, LogisticsConfig};
use crate::error::{LogisticsError, Result};
use crate::io::buildings::BuildingJoin;
use crate::job::{BuildingLoadJob, JobContext, JobSummary};
use crate::logistics::RateDeriver;
use crate::reporting::BatchReport;
use crate::schedule::OccupancyScheduleResolver;

/// How building jobs are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    Sequential,
    Parallel { workers: usize },
}

impl DispatchMode {
    /// Parallel over `workers`, or over available parallelism minus one when unset.
    pub fn from_config(dispatch: &DispatchConfig) -> Self {
        if !dispatch.parallel {
            return Self::Sequential;
        }
        let workers = dispatch.workers.unwrap_or_else(default_workers);
        Self::Parallel { workers }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Sequential => "sequential".to_string(),
            Self::Parallel { workers } => format!("parallel ({workers} workers)"),
        }
    }
}

fn default_workers() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}

/// Result of one building, success or its own failure.
#[derive(Debug)]
pub struct JobOutcome {
    pub building: String,
    pub result: Result<JobSummary>,
}

/// Runs building jobs sequentially or on a bounded worker pool.
///
/// Jobs share only the read-only [`JobContext`], so both modes write the same
/// bytes for every building. Outcomes come back in job order.
#[derive(Debug, Clone, Copy)]
pub struct ParallelDispatcher {
    mode: DispatchMode,
}

impl ParallelDispatcher {
    pub fn new(mode: DispatchMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// # Errors
    ///
    /// `Configuration` if the worker pool cannot be built. Job failures are
    /// reported per building in the returned outcomes.
    pub fn run(&self, jobs: &[BuildingLoadJob], ctx: &JobContext) -> Result<Vec<JobOutcome>> {
        match self.mode {
            DispatchMode::Sequential => Ok(jobs.iter().map(|job| run_one(job, ctx)).collect()),
            DispatchMode::Parallel { workers } => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(workers.max(1))
                    .thread_name(|i| format!("building-worker-{i}"))
                    .build()
                    .map_err(|e| LogisticsError::Configuration(format!("cannot start worker pool: {e}")))?;
                Ok(pool.install(|| jobs.par_iter().map(|job| run_one(job, ctx)).collect()))
            }
        }
    }
}

fn run_one(job: &BuildingLoadJob, ctx: &JobContext) -> JobOutcome {
    let result = job.run(ctx);
    if let Err(err) = &result {
        error!(building = %job.building.name, kind = ?err.kind(), error = %err, "building failed");
    }
    JobOutcome {
        building: job.building.name.clone(),
        result,
    }
}

/// Loads the shared reference data of a scenario and runs one job per building.
///
/// Buildings missing from the attribute tables are reported as failed
/// without running a job.
///
/// # Errors
///
/// Fails only if a shared input (building tables, internal loads, logistics
/// tables) cannot be loaded, or the worker pool cannot start.
pub fn run_scenario(root: &Path, config: &LogisticsConfig) -> Result<BatchReport> {
    let paths = config.scenario_paths(root);
    let join = BuildingJoin::load(&paths)?;
    let ctx = JobContext {
        schedules: OccupancyScheduleResolver::new(paths.clone(), config.schedule.metadata_rows),
        rates: RateDeriver::load(&paths, &config.forklift)?,
        columns: config.columns.clone(),
    };

    let truck = ctx.rates.truck_model();
    info!(
        average_truck_capacity = truck.distribution().weighted_average_capacity,
        inbound_km = truck.distance().inbound,
        outbound_km = truck.distance().outbound,
        carriers = ?truck.carriers().collect::<Vec<_>>(),
        "loaded logistics reference tables"
    );

    let dispatcher = ParallelDispatcher::new(DispatchMode::from_config(&config.dispatch));
    info!(
        scenario = %paths.root().display(),
        buildings = join.buildings.len(),
        unresolved = join.unresolved.len(),
        mode = %dispatcher.mode().label(),
        "dispatching building jobs"
    );

    let jobs: Vec<BuildingLoadJob> = join
        .buildings
        .into_iter()
        .map(|building| {
            let demand_path = paths.demand(&building.name);
            BuildingLoadJob::new(building, demand_path)
        })
        .collect();

    let mut outcomes = dispatcher.run(&jobs, &ctx)?;
    outcomes.extend(join.unresolved.into_iter().map(|(building, err)| JobOutcome {
        building,
        result: Err(err),
    }));

    let report = BatchReport::from_outcomes(root, &dispatcher.mode(), outcomes);
    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        "batch finished"
    );
    Ok(report)
}
