//! Calendar-month stock periods.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::ledger::LedgerError;

/// A calendar month used for closing and snapshots.
///
/// A snapshot labelled with period P describes the units on hand at the
/// first day of P.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StockPeriod {
    year: i32,
    month: u32,
}

impl StockPeriod {
    /// Creates a period, validating the year and month.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidPeriod` if the month is outside 1-12 or
    /// the year is outside 1-9999.
    pub fn new(year: i32, month: u32) -> Result<Self, LedgerError> {
        if !(1..=12).contains(&month) || !(1..=9999).contains(&year) {
            return Err(LedgerError::InvalidPeriod { year, month });
        }
        Ok(Self { year, month })
    }

    /// Returns the period containing `date`.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Resolves an optional year/month pair, defaulting to `today`'s period.
    ///
    /// A missing year takes today's year; a missing month takes today's month.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidPeriod` for an impossible pair.
    pub fn resolve(
        year: Option<i32>,
        month: Option<u32>,
        today: NaiveDate,
    ) -> Result<Self, LedgerError> {
        let fallback = Self::of(today);
        Self::new(
            year.unwrap_or(fallback.year),
            month.unwrap_or(fallback.month),
        )
    }

    /// Resolves the period a scheduled closing run should close.
    ///
    /// With neither year nor month given this is the month before `today`,
    /// the latest one that has fully ended. Anything else resolves like
    /// [`Self::resolve`].
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidPeriod` for an impossible pair.
    pub fn resolve_ended(
        year: Option<i32>,
        month: Option<u32>,
        today: NaiveDate,
    ) -> Result<Self, LedgerError> {
        match (year, month) {
            (None, None) => Ok(Self::of(today).previous()),
            _ => Self::resolve(year, month, today),
        }
    }

    /// Returns the year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Returns the month (1-12).
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// Returns the following month.
    #[must_use]
    pub const fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Returns the preceding month.
    #[must_use]
    pub const fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Returns the first day of the period.
    #[must_use]
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Returns the last day of the period.
    #[must_use]
    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .first_day()
            .pred_opt()
            .unwrap_or_else(|| self.first_day())
    }
}

impl fmt::Display for StockPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
