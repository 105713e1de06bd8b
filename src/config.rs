//! Settings that change how the dashboard validates and stores expenses.

use clap::ValueEnum;
use time::OffsetDateTime;

use crate::{Error, timezone::current_local_year};

/// What to do when an expense is created for a service and month that already has one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DuplicatePolicy {
    /// Do not create the expense. Offer to update the existing expense's amount instead.
    #[default]
    ConfirmUpdate,
    /// Create the expense anyway.
    Allow,
}

/// The range of years an expense may belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearBounds {
    /// The earliest accepted year.
    pub min: i32,
    /// The latest accepted year.
    pub max: i32,
}

impl YearBounds {
    /// Accept years from `min` up to `years_ahead` years after `current_year`.
    pub fn new(min: i32, current_year: i32, years_ahead: u16) -> Self {
        Self {
            min,
            max: current_year + i32::from(years_ahead),
        }
    }

    /// Accept years from `min` up to `years_ahead` years after the current
    /// year in `local_timezone`.
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezoneError] if `local_timezone` is not a
    /// canonical timezone name.
    pub fn for_local_timezone(
        min: i32,
        years_ahead: u16,
        local_timezone: &str,
    ) -> Result<Self, Error> {
        let current_year = current_local_year(local_timezone)
            .ok_or_else(|| Error::InvalidTimezoneError(local_timezone.to_owned()))?;

        Ok(Self::new(min, current_year, years_ahead))
    }

    /// Check that `year` lies within the bounds.
    ///
    /// # Errors
    /// Returns [Error::InvalidYear] if `year` is out of bounds.
    pub fn check(&self, year: i64) -> Result<i32, Error> {
        if (i64::from(self.min)..=i64::from(self.max)).contains(&year) {
            Ok(year as i32)
        } else {
            Err(Error::InvalidYear {
                year,
                min: self.min,
                max: self.max,
            })
        }
    }
}

impl Default for YearBounds {
    fn default() -> Self {
        Self::new(2000, OffsetDateTime::now_utc().year(), 10)
    }
}

/// The settings for creating and updating expenses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardConfig {
    /// How to handle a second expense for the same service and month.
    pub duplicate_policy: DuplicatePolicy,
    /// The years that expenses may belong to.
    pub year_bounds: YearBounds,
}
