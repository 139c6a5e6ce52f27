//! Date helpers.
//!
//! Every calendar computation in the crate works on `NaiveDate` values taken
//! at local midnight, so subtracting two dates always yields whole days
//! regardless of time of day or DST shifts.

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::ValidationError;

/// Format used for every persisted date.
pub const ISO_DATE: &str = "%Y-%m-%d";

pub const PROGRAM_START: NaiveDate = match NaiveDate::from_ymd_opt(2025, 11, 7) {
    Some(d) => d,
    None => panic!("invalid program start"),
};

pub const PROGRAM_END: NaiveDate = match NaiveDate::from_ymd_opt(2026, 1, 31) {
    Some(d) => d,
    None => panic!("invalid program end"),
};

/// Fixed calendar interval the daily progress is measured against.
///
/// Invariant: `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgramWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl ProgramWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Inclusive number of days in the window.
    pub fn total_days(&self) -> i64 {
        days_between(self.start, self.end) + 1
    }
}

impl Default for ProgramWindow {
    fn default() -> Self {
        Self {
            start: PROGRAM_START,
            end: PROGRAM_END,
        }
    }
}

/// Current local date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Current local date as `YYYY-MM-DD`.
pub fn today_iso() -> String {
    to_iso(today())
}

pub fn to_iso(date: NaiveDate) -> String {
    date.format(ISO_DATE).to_string()
}

/// Parse an ISO date string.
pub fn parse_iso(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), ISO_DATE)
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

/// The moment at local midnight of an ISO date, or `None` when unparsable.
pub fn at_midnight(s: &str) -> Option<NaiveDateTime> {
    parse_iso(s).ok().and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Whole days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// Standard three-way clamp.
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
