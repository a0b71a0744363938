//! Occupancy schedules and hour-by-hour energy allocation.

/// Allocation of an annual energy rate to single hours.
pub mod allocator;
/// Day types and their annual day counts.
pub mod calendar;
/// Per-usage occupancy curve loading.
pub mod occupancy;

pub use allocator::HourlyEnergyAllocator;
pub use calendar::{AnnualDayTypeCalendar, DayType};
pub use occupancy::{OccupancySchedule, OccupancyScheduleResolver};
