use chrono::{NaiveDateTime, Timelike};

use crate::error::Result;
use crate::schedule::calendar::DayType;
use crate::schedule::occupancy::{OccupancySchedule, OccupancyScheduleResolver};
use crate::usage::UsageCategory;

/// Spreads an annual per-area energy rate over the hours of a year.
///
/// The energy of one hour is
/// `annual_rate * floor_area / total_hours * weight(day_type, hour)`, so a
/// full calendar of hours sums back to `annual_rate * floor_area` when the
/// curves average to one. Usages outside the logistics set always get zero.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use chrono::NaiveDate;
/// use logistic_load::schedule::{
///     AnnualDayTypeCalendar, DayType, HourlyEnergyAllocator, OccupancySchedule,
/// };
///
/// let curves = BTreeMap::from([
///     (DayType::Weekday, (1..=24).map(f64::from).collect()),
///     (DayType::Saturday, vec![1.0, 1.0]),
///     (DayType::Sunday, vec![1.0]),
/// ]);
/// let schedule =
///     OccupancySchedule::from_curves("COLD".into(), curves, &AnnualDayTypeCalendar::STANDARD)
///         .unwrap();
/// let allocator = HourlyEnergyAllocator::with_schedule(schedule);
///
/// // 2024-01-01 is a Monday
/// let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let total_hours = (24 * 246 + 2 * 52 + 67) as f64;
/// let energy = allocator.energy(&monday, 100.0, 2.0).unwrap();
/// assert!((energy - 2.0 * 100.0 / total_hours).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct HourlyEnergyAllocator {
    usage: UsageCategory,
    schedule: Option<OccupancySchedule>,
}

impl HourlyEnergyAllocator {
    /// Allocator for a usage, loading its schedule only if it is a logistics usage.
    ///
    /// # Errors
    ///
    /// Any error of [`OccupancyScheduleResolver::resolve`].
    pub fn resolve(usage: &UsageCategory, resolver: &OccupancyScheduleResolver) -> Result<Self> {
        if !usage.is_logistics() {
            return Ok(Self::inactive(usage.clone()));
        }
        Ok(Self::with_schedule(resolver.resolve(usage)?))
    }

    pub fn with_schedule(schedule: OccupancySchedule) -> Self {
        Self {
            usage: schedule.usage().clone(),
            schedule: Some(schedule),
        }
    }

    /// Allocator that returns zero for every hour.
    pub fn inactive(usage: UsageCategory) -> Self {
        Self {
            usage,
            schedule: None,
        }
    }

    /// Energy attributed to the hour starting at `timestamp`.
    ///
    /// # Errors
    ///
    /// `IndexMismatch` if the hour of day lies beyond the day type's curve.
    pub fn energy(&self, timestamp: &NaiveDateTime, floor_area: f64, annual_rate: f64) -> Result<f64> {
        let schedule = match &self.schedule {
            Some(schedule) if self.usage.is_logistics() => schedule,
            _ => return Ok(0.0),
        };

        let day = DayType::of(timestamp);
        let weight = schedule.weight(day, timestamp.hour() as usize)?;
        Ok(annual_rate * floor_area / schedule.total_hours() as f64 * weight)
    }
}
