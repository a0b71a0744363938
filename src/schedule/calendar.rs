use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDateTime};

/// One of the three day types an occupancy schedule distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DayType {
    Weekday,
    Saturday,
    Sunday,
}

impl DayType {
    pub const ALL: [DayType; 3] = [DayType::Weekday, DayType::Saturday, DayType::Sunday];

    /// Day type of a weekday index (0 = Monday .. 6 = Sunday).
    pub fn from_weekday_index(index: u32) -> Self {
        match index {
            0..=4 => DayType::Weekday,
            5 => DayType::Saturday,
            _ => DayType::Sunday,
        }
    }

    pub fn of(timestamp: &NaiveDateTime) -> Self {
        Self::from_weekday_index(timestamp.weekday().num_days_from_monday())
    }

    /// Label used in usage occupancy files.
    pub fn label(self) -> &'static str {
        match self {
            DayType::Weekday => "WEEKDAY",
            DayType::Saturday => "SATURDAY",
            DayType::Sunday => "SUNDAY",
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DayType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "WEEKDAY" => Ok(DayType::Weekday),
            "SATURDAY" => Ok(DayType::Saturday),
            "SUNDAY" => Ok(DayType::Sunday),
            other => Err(format!("unknown day type \"{other}\"")),
        }
    }
}

/// Number of days of each [`DayType`] in a year.
///
/// # Examples
///
/// ```
/// use logistic_load::schedule::{AnnualDayTypeCalendar, DayType};
///
/// let cal = AnnualDayTypeCalendar::STANDARD;
/// assert_eq!(cal.days(DayType::Saturday), 52);
/// assert_eq!(cal.total_hours(24, 24, 24), 8760);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnualDayTypeCalendar {
    pub weekdays: u32,
    pub saturdays: u32,
    pub sundays: u32,
}

impl AnnualDayTypeCalendar {
    /// 246 working days, 52 Saturdays, 67 Sundays and holidays.
    pub const STANDARD: Self = Self {
        weekdays: 246,
        saturdays: 52,
        sundays: 67,
    };

    pub fn days(&self, day: DayType) -> u32 {
        match day {
            DayType::Weekday => self.weekdays,
            DayType::Saturday => self.saturdays,
            DayType::Sunday => self.sundays,
        }
    }

    /// Annual operating hours implied by the length of each day-type curve.
    pub fn total_hours(&self, weekday_len: usize, saturday_len: usize, sunday_len: usize) -> u64 {
        [weekday_len, saturday_len, sunday_len]
            .into_iter()
            .zip(DayType::ALL)
            .map(|(len, day)| len as u64 * u64::from(self.days(day)))
            .sum()
    }
}

impl Default for AnnualDayTypeCalendar {
    fn default() -> Self {
        Self::STANDARD
    }
}
