//! Distribution of activity units over a date range
//!
//! The planner turns a requested volume into a [`Schedule`]: date-ordered
//! entries of how many units land on each day.

mod planner;
mod policy;

pub use planner::{plan, plan_policy, plan_spaced, plan_total};
pub use policy::{DayFilter, FrequencyPolicy, Volume};

use crate::error::{Error, Result};
use chrono::{Days, NaiveDate};

/// Inclusive range of calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range; `start` must not be after `end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::Config(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse two `YYYY-MM-DD` strings
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// First date
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last date
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days in the range (at least one)
    pub fn day_count(&self) -> usize {
        usize::try_from((self.end - self.start).num_days()).unwrap_or(0) + 1
    }

    /// Every date in the range, ascending
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Whether `date` lies within the range
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Date at `offset` days after the start
    pub fn offset(&self, offset: usize) -> Option<NaiveDate> {
        self.start
            .checked_add_days(Days::new(offset as u64))
            .filter(|d| *d <= self.end)
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| Error::InvalidDate(input.to_string()))
}

/// Number of units scheduled on one date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleEntry {
    /// Calendar date
    pub date: NaiveDate,
    /// Units on that date (never zero inside a [`Schedule`])
    pub count: usize,
}

/// Date-ordered plan for one repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    entries: Vec<ScheduleEntry>,
}

impl Schedule {
    /// Build from entries; zero-count entries are dropped and dates sorted
    pub fn from_entries(mut entries: Vec<ScheduleEntry>) -> Self {
        entries.retain(|e| e.count > 0);
        entries.sort_by_key(|e| e.date);
        Self { entries }
    }

    /// Entries in ascending date order
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    /// Total scheduled units
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Whether nothing is scheduled
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(date, index)` for every unit, with a run-wide increasing index
    pub fn units(&self) -> impl Iterator<Item = (NaiveDate, usize)> + '_ {
        self.entries
            .iter()
            .flat_map(|e| std::iter::repeat_n(e.date, e.count))
            .enumerate()
            .map(|(index, date)| (date, index))
    }

    /// First and last scheduled dates
    pub fn span(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.entries.first()?.date, self.entries.last()?.date))
    }
}
