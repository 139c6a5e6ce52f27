//! Logbook range filtering.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::dates::parse_iso;
use crate::error::ValidationError;
use crate::state::{AppState, DailyRecord};

/// Reporting range for log exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum LogRange {
    #[default]
    Last30,
    Last60,
    All,
}

impl LogRange {
    /// Lookback in days, `None` for [`LogRange::All`].
    pub fn days(self) -> Option<u64> {
        match self {
            LogRange::Last30 => Some(30),
            LogRange::Last60 => Some(60),
            LogRange::All => None,
        }
    }
}

impl FromStr for LogRange {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "30" => Ok(LogRange::Last30),
            "60" => Ok(LogRange::Last60),
            "all" => Ok(LogRange::All),
            other => Err(ValidationError::invalid(
                "range",
                format!("expected 30, 60 or all, got {other:?}"),
            )),
        }
    }
}

impl fmt::Display for LogRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogRange::Last30 => f.write_str("30"),
            LogRange::Last60 => f.write_str("60"),
            LogRange::All => f.write_str("all"),
        }
    }
}

/// Records inside `range`, ordered by date ascending.
///
/// Ranged filters keep records dated on or after `today - N days` and drop
/// records whose date does not parse. `All` keeps everything; unparsable
/// dates sort first. Ties keep their input order.
pub fn filter_logs_by_range(
    records: &[DailyRecord],
    range: LogRange,
    today: NaiveDate,
) -> Vec<DailyRecord> {
    let cut = range
        .days()
        .map(|n| today.checked_sub_days(Days::new(n)).unwrap_or(NaiveDate::MIN));

    let mut keyed: Vec<(Option<NaiveDate>, &DailyRecord)> = records
        .iter()
        .map(|r| (parse_iso(&r.date).ok(), r))
        .filter(|(date, _)| match (cut, date) {
            (None, _) => true,
            (Some(cut), Some(date)) => *date >= cut,
            (Some(_), None) => false,
        })
        .collect();
    keyed.sort_by_key(|(date, _)| *date);
    keyed.into_iter().map(|(_, r)| r.clone()).collect()
}

/// Number of distinct dates in the logbook.
pub fn distinct_log_days(logbook: &[DailyRecord]) -> usize {
    logbook
        .iter()
        .map(|r| r.date.as_str())
        .collect::<BTreeSet<_>>()
        .len()
}

/// Logbook copy with the current day upserted by date.
pub fn logs_with_current_day(state: &AppState) -> Vec<DailyRecord> {
    let mut logs = state.logbook.clone();
    match logs.iter_mut().find(|r| r.date == state.daily.date) {
        Some(existing) => *existing = state.daily.clone(),
        None => logs.push(state.daily.clone()),
    }
    logs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(date: &str, minutes: u32) -> DailyRecord {
        DailyRecord {
            active_minutes: minutes,
            ..DailyRecord::for_date(date)
        }
    }

    fn day(s: &str) -> NaiveDate {
        parse_iso(s).unwrap()
    }

    #[test]
    fn parses_range_names() {
        assert_eq!("30".parse::<LogRange>().unwrap(), LogRange::Last30);
        assert_eq!("60".parse::<LogRange>().unwrap(), LogRange::Last60);
        assert_eq!("all".parse::<LogRange>().unwrap(), LogRange::All);
        assert!("90".parse::<LogRange>().is_err());
        assert_eq!(LogRange::Last60.to_string(), "60");
    }

    #[test]
    fn last_30_includes_boundary_and_sorts() {
        let records = vec![
            rec("2025-12-01", 1),
            rec("2025-10-31", 2),
            rec("2025-11-01", 3),
            rec("garbage", 4),
        ];
        let out = filter_logs_by_range(&records, LogRange::Last30, day("2025-12-01"));
        let dates: Vec<&str> = out.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2025-11-01", "2025-12-01"]);
    }

    #[test]
    fn last_60_reaches_past_the_30_day_cut() {
        let records = vec![
            rec("2025-10-01", 1),
            rec("2025-11-15", 2),
            rec("2025-10-31", 3),
            rec("2025-10-02", 4),
            rec("not-a-date", 5),
        ];
        let today = day("2025-12-01");
        let out = filter_logs_by_range(&records, LogRange::Last60, today);
        let dates: Vec<&str> = out.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2025-10-02", "2025-10-31", "2025-11-15"]);
        assert_eq!(filter_logs_by_range(&records, LogRange::Last30, today).len(), 1);
    }

    #[test]
    fn all_keeps_unparsable_first_and_is_stable() {
        let records = vec![
            rec("2025-11-02", 1),
            rec("", 2),
            rec("2025-11-01", 3),
            rec("2025-11-02", 4),
        ];
        let out = filter_logs_by_range(&records, LogRange::All, day("2025-12-01"));
        let minutes: Vec<u32> = out.iter().map(|r| r.active_minutes).collect();
        assert_eq!(minutes, vec![2, 3, 1, 4]);
    }

    #[test]
    fn current_day_is_upserted() {
        let window = crate::dates::ProgramWindow::default();
        let mut state = AppState::seed(&window);
        state.logbook = vec![rec("2025-11-01", 10), rec("2025-11-02", 20)];
        state.daily = rec("2025-11-02", 99);
        let logs = logs_with_current_day(&state);
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[1].active_minutes, 99);

        state.daily = rec("2025-11-03", 5);
        assert_eq!(logs_with_current_day(&state).len(), 3);
        assert_eq!(distinct_log_days(&state.logbook), 2);
    }
}
